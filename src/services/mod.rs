pub mod lifecycle;
pub mod stats;

pub use lifecycle::BookingService;
pub use stats::compute_stats;
