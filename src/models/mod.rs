pub mod booking;
pub mod catalog;
pub mod requests;
pub mod stats;
pub mod validation;

pub use booking::{
    minute_stamp, now_stamp, Booking, BookingPatch, BookingSource, BookingStatus, CallOutcome,
    CallStatus, CancelledBy, HairType, PaymentMethod, PaymentStatus, RevisitIntent, RuleViolation,
    SkinType, MAX_RESCHEDULES,
};
pub use catalog::{ServiceCatalog, ServiceOffering};
pub use requests::{
    CallUpdate, CancelRequest, CompleteRequest, FeedbackUpdate, NewBooking, PaymentUpdate,
    RescheduleRequest,
};
pub use stats::{BreakdownEntry, DashboardStats};
pub use validation::{Cancellation, Reschedule, ValidationError};
