use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of times a booking may be moved to a new slot.
pub const MAX_RESCHEDULES: u8 = 3;

/// A lifecycle transition the stored booking does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("only pending bookings can be confirmed")]
    NotPending,

    #[error("booking is already cancelled")]
    AlreadyCancelled,

    #[error("cannot cancel completed booking")]
    CancelCompleted,

    #[error("cannot reschedule cancelled booking")]
    RescheduleCancelled,

    #[error("maximum rescheduling limit reached ({} times)", MAX_RESCHEDULES)]
    RescheduleLimit,

    #[error("only confirmed bookings can be completed")]
    NotConfirmed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,

    pub customer_name: String,
    pub email: String,
    pub phone_number: String,

    pub service: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub total_price: f64,
    pub status: BookingStatus,
    pub booking_source: BookingSource,
    pub staff_assigned: String,
    pub estimated_duration: u32,
    pub actual_duration: u32,

    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_amount: f64,

    pub customer_notes: String,
    pub internal_notes: String,
    pub reminder_sent: bool,
    pub reminder_sent_at: Option<NaiveDateTime>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_notes: String,

    pub preferred_staff: String,
    pub service_preferences: String,
    pub allergic_reactions: String,
    pub skin_type: Option<SkinType>,
    pub hair_type: Option<HairType>,

    pub customer_satisfaction: Option<u8>,
    pub feedback: String,
    pub would_recommend: bool,
    pub revisit_intent: Option<RevisitIntent>,

    pub rescheduling_reason: String,
    pub rescheduling_count: u8,
    pub original_date: Option<NaiveDate>,
    pub original_time: String,

    pub cancellation_reason: String,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancelled_by: Option<CancelledBy>,

    pub call_id: String,
    pub call_transcript: String,
    pub call_summary: String,
    pub call_duration: u32,
    pub call_recording_url: String,
    pub call_status: CallStatus,
    pub call_outcome: CallOutcome,

    pub notes: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Current UTC time at the precision bookings are persisted with.
pub fn now_stamp() -> NaiveDateTime {
    minute_stamp(Utc::now().naive_utc())
}

pub fn minute_stamp(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Fields a single store update may overwrite. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub actual_duration: Option<u32>,

    pub rescheduling_reason: Option<String>,
    pub rescheduling_count: Option<u8>,
    pub original_date: Option<NaiveDate>,
    pub original_time: Option<String>,

    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancelled_by: Option<CancelledBy>,

    pub call_id: Option<String>,
    pub call_transcript: Option<String>,
    pub call_summary: Option<String>,
    pub call_duration: Option<u32>,
    pub call_recording_url: Option<String>,
    pub call_status: Option<CallStatus>,
    pub call_outcome: Option<CallOutcome>,

    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_amount: Option<f64>,

    pub customer_satisfaction: Option<u8>,
    pub feedback: Option<String>,
    pub would_recommend: Option<bool>,
    pub revisit_intent: Option<RevisitIntent>,
}

impl BookingPatch {
    pub fn apply(&self, booking: &mut Booking) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_some<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut booking.status, &self.status);
        set(&mut booking.preferred_date, &self.preferred_date);
        set(&mut booking.preferred_time, &self.preferred_time);
        set(&mut booking.actual_duration, &self.actual_duration);

        set(&mut booking.rescheduling_reason, &self.rescheduling_reason);
        set(&mut booking.rescheduling_count, &self.rescheduling_count);
        set_some(&mut booking.original_date, &self.original_date);
        set(&mut booking.original_time, &self.original_time);

        set(&mut booking.cancellation_reason, &self.cancellation_reason);
        set_some(&mut booking.cancelled_at, &self.cancelled_at);
        set_some(&mut booking.cancelled_by, &self.cancelled_by);

        set(&mut booking.call_id, &self.call_id);
        set(&mut booking.call_transcript, &self.call_transcript);
        set(&mut booking.call_summary, &self.call_summary);
        set(&mut booking.call_duration, &self.call_duration);
        set(&mut booking.call_recording_url, &self.call_recording_url);
        set(&mut booking.call_status, &self.call_status);
        set(&mut booking.call_outcome, &self.call_outcome);

        set(&mut booking.payment_status, &self.payment_status);
        set_some(&mut booking.payment_method, &self.payment_method);
        set(&mut booking.payment_amount, &self.payment_amount);

        set_some(&mut booking.customer_satisfaction, &self.customer_satisfaction);
        set(&mut booking.feedback, &self.feedback);
        set(&mut booking.would_recommend, &self.would_recommend);
        set_some(&mut booking.revisit_intent, &self.revisit_intent);
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Strict parse: unknown text is `None`, never coerced.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

string_enum!(BookingSource {
    Website => "website",
    Phone => "phone",
    Whatsapp => "whatsapp",
    WalkIn => "walk_in",
    VoiceAssistant => "voice_assistant",
});

string_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Partial => "partial",
    Refunded => "refunded",
});

string_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    Upi => "upi",
    Online => "online",
    Wallet => "wallet",
});

string_enum!(SkinType {
    Normal => "normal",
    Dry => "dry",
    Oily => "oily",
    Combination => "combination",
    Sensitive => "sensitive",
});

string_enum!(HairType {
    Straight => "straight",
    Wavy => "wavy",
    Curly => "curly",
    Coily => "coily",
});

string_enum!(RevisitIntent {
    Definitely => "definitely",
    Probably => "probably",
    Maybe => "maybe",
    ProbablyNot => "probably_not",
    DefinitelyNot => "definitely_not",
});

string_enum!(CancelledBy {
    Customer => "customer",
    Salon => "salon",
});

string_enum!(CallStatus {
    NotCalled => "not_called",
    Incoming => "incoming",
    Outgoing => "outgoing",
    Completed => "completed",
    Missed => "missed",
    Failed => "failed",
});

string_enum!(CallOutcome {
    Pending => "pending",
    Booked => "booked",
    Rescheduled => "rescheduled",
    Cancelled => "cancelled",
    NoAnswer => "no_answer",
    CallbackRequested => "callback_requested",
});

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl Default for BookingSource {
    fn default() -> Self {
        BookingSource::Website
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl Default for CallStatus {
    fn default() -> Self {
        CallStatus::NotCalled
    }
}

impl Default for CallOutcome {
    fn default() -> Self {
        CallOutcome::Pending
    }
}
