use chrono::{DateTime, NaiveDate};

use crate::models::booking::{
    Booking, BookingPatch, BookingSource, BookingStatus, CallOutcome, CallStatus, CancelledBy,
    HairType, PaymentMethod, PaymentStatus, RevisitIntent, SkinType,
};
use crate::models::catalog::ServiceCatalog;
use crate::models::requests::{
    CallUpdate, CancelRequest, CompleteRequest, FeedbackUpdate, NewBooking, PaymentUpdate,
    RescheduleRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

/// A validated new slot for an existing booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Reschedule {
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
}

/// A validated cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    pub reason: String,
    pub cancelled_by: CancelledBy,
}

impl NewBooking {
    /// Checks every field and produces the booking to persist. Price and
    /// duration come from the catalog; `id` and timestamps are left for the
    /// store to assign.
    pub fn validate(&self, catalog: &ServiceCatalog) -> Result<Booking> {
        let customer_name = required(&self.customer_name, "customerName")?;
        let email = required(&self.email, "email")?.to_lowercase();
        let phone_number = required(&self.phone_number, "phoneNumber")?;
        let service = required(&self.service, "service")?;
        let preferred_date = required(&self.preferred_date, "preferredDate")?;
        let preferred_time = required(&self.preferred_time, "preferredTime")?;

        check_len(&customer_name, "customerName", 100)?;
        if !is_valid_email(&email) {
            return Err(ValidationError::new("email", "must be a valid email address"));
        }
        if !is_valid_phone(&phone_number) {
            return Err(ValidationError::new(
                "phoneNumber",
                "must be a 10-digit number starting with 6-9",
            ));
        }
        let offering = catalog
            .lookup(&service)
            .ok_or_else(|| ValidationError::new("service", format!("is not offered: {service}")))?;
        let preferred_date = parse_date(&preferred_date).ok_or_else(invalid_date)?;
        let preferred_time = normalize_time(&preferred_time).ok_or_else(invalid_time)?;

        let call_duration = match self.call_duration {
            Some(d) => non_negative_u32(d, "callDuration")?,
            None => 0,
        };
        let call_recording_url = optional_text(&self.call_recording_url, "callRecordingUrl", 2048)?;
        check_url(&call_recording_url, "callRecordingUrl")?;

        Ok(Booking {
            customer_name,
            email,
            phone_number,
            service: offering.name.clone(),
            preferred_date,
            preferred_time: preferred_time.clone(),
            total_price: offering.price,
            status: BookingStatus::Pending,
            booking_source: optional_enum(
                &self.booking_source,
                "bookingSource",
                BookingSource::parse,
            )?
            .unwrap_or_default(),
            staff_assigned: optional_text(&self.staff_assigned, "staffAssigned", 100)?,
            estimated_duration: offering.duration_minutes,
            customer_notes: optional_text(&self.customer_notes, "customerNotes", 1000)?,
            internal_notes: optional_text(&self.internal_notes, "internalNotes", 2000)?,
            preferred_staff: optional_text(&self.preferred_staff, "preferredStaff", 100)?,
            service_preferences: optional_text(
                &self.service_preferences,
                "servicePreferences",
                500,
            )?,
            allergic_reactions: optional_text(&self.allergic_reactions, "allergicReactions", 500)?,
            skin_type: optional_enum(&self.skin_type, "skinType", SkinType::parse)?,
            hair_type: optional_enum(&self.hair_type, "hairType", HairType::parse)?,
            rescheduling_count: 0,
            original_date: Some(preferred_date),
            original_time: preferred_time,
            call_id: optional_text(&self.call_id, "callId", 200)?,
            call_transcript: optional_text(&self.call_transcript, "callTranscript", 10_000)?,
            call_summary: optional_text(&self.call_summary, "callSummary", 2000)?,
            call_duration,
            call_recording_url,
            call_status: optional_enum(&self.call_status, "callStatus", CallStatus::parse)?
                .unwrap_or_default(),
            call_outcome: optional_enum(&self.call_outcome, "callOutcome", CallOutcome::parse)?
                .unwrap_or_default(),
            notes: optional_text(&self.notes, "notes", 1000)?,
            ..Booking::default()
        })
    }
}

impl RescheduleRequest {
    pub fn validate(&self) -> Result<Reschedule> {
        let date = required(&self.preferred_date, "preferredDate")?;
        let time = required(&self.preferred_time, "preferredTime")?;

        Ok(Reschedule {
            date: parse_date(&date).ok_or_else(invalid_date)?,
            time: normalize_time(&time).ok_or_else(invalid_time)?,
            reason: optional_text(&self.rescheduling_reason, "reschedulingReason", 500)?,
        })
    }
}

impl CancelRequest {
    pub fn validate(&self) -> Result<Cancellation> {
        Ok(Cancellation {
            reason: optional_text(&self.cancellation_reason, "cancellationReason", 500)?,
            cancelled_by: optional_enum(&self.cancelled_by, "cancelledBy", CancelledBy::parse)?
                .unwrap_or(CancelledBy::Customer),
        })
    }
}

impl CompleteRequest {
    pub fn validate(&self) -> Result<Option<u32>> {
        self.actual_duration
            .map(|d| non_negative_u32(d, "actualDuration"))
            .transpose()
    }
}

impl CallUpdate {
    pub fn validate(&self) -> Result<BookingPatch> {
        let call_recording_url = self
            .call_recording_url
            .as_deref()
            .map(|url| -> Result<String> {
                check_len(url, "callRecordingUrl", 2048)?;
                check_url(url, "callRecordingUrl")?;
                Ok(url.trim().to_string())
            })
            .transpose()?;

        Ok(BookingPatch {
            call_id: provided_text(&self.call_id, "callId", 200)?,
            call_transcript: provided_text(&self.call_transcript, "callTranscript", 10_000)?,
            call_summary: provided_text(&self.call_summary, "callSummary", 2000)?,
            call_duration: self
                .call_duration
                .map(|d| non_negative_u32(d, "callDuration"))
                .transpose()?,
            call_recording_url,
            call_status: provided_enum(&self.call_status, "callStatus", CallStatus::parse)?,
            call_outcome: provided_enum(&self.call_outcome, "callOutcome", CallOutcome::parse)?,
            ..BookingPatch::default()
        })
    }
}

impl PaymentUpdate {
    pub fn validate(&self) -> Result<BookingPatch> {
        if let Some(amount) = self.payment_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ValidationError::new("paymentAmount", "must not be negative"));
            }
        }

        Ok(BookingPatch {
            payment_status: provided_enum(
                &self.payment_status,
                "paymentStatus",
                PaymentStatus::parse,
            )?,
            payment_method: provided_enum(
                &self.payment_method,
                "paymentMethod",
                PaymentMethod::parse,
            )?,
            payment_amount: self.payment_amount,
            ..BookingPatch::default()
        })
    }
}

impl FeedbackUpdate {
    pub fn validate(&self) -> Result<BookingPatch> {
        let customer_satisfaction = match self.customer_satisfaction {
            Some(score @ 1..=5) => Some(score as u8),
            Some(_) => {
                return Err(ValidationError::new(
                    "customerSatisfaction",
                    "must be between 1 and 5",
                ))
            }
            None => None,
        };

        Ok(BookingPatch {
            customer_satisfaction,
            feedback: provided_text(&self.feedback, "feedback", 2000)?,
            would_recommend: self.would_recommend,
            revisit_intent: provided_enum(
                &self.revisit_intent,
                "revisitIntent",
                RevisitIntent::parse,
            )?,
            ..BookingPatch::default()
        })
    }
}

// ── Field rules ──

/// Ten digits, the first one 6-9.
pub fn is_valid_phone(s: &str) -> bool {
    s.len() == 10
        && s.chars().all(|c| c.is_ascii_digit())
        && matches!(s.as_bytes()[0], b'6'..=b'9')
}

pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    is_dotted_words(local)
        && is_dotted_words(host)
        && (2..=3).contains(&tld.len())
        && tld.chars().all(is_word_char)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is used).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Accepts `H:MM` or `HH:MM` on a 24-hour clock and returns it zero-padded.
pub fn normalize_time(s: &str) -> Option<String> {
    let (hour, minute) = s.trim().split_once(':')?;
    if hour.is_empty()
        || hour.len() > 2
        || minute.len() != 2
        || !hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Word characters optionally joined by single '.' or '-' separators.
fn is_dotted_words(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| is_word_char(c) || c == '.' || c == '-')
        && s.starts_with(is_word_char)
        && s.ends_with(is_word_char)
        && !s
            .as_bytes()
            .windows(2)
            .any(|w| !is_word_char(w[0] as char) && !is_word_char(w[1] as char))
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::new(field, "is required")),
    }
}

fn check_len(value: &str, field: &'static str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("cannot exceed {max} characters"),
        ));
    }
    Ok(())
}

fn check_url(value: &str, field: &'static str) -> Result<()> {
    let value = value.trim();
    if !value.is_empty() && !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ValidationError::new(field, "must be an http(s) URL"));
    }
    Ok(())
}

/// Absent text becomes the empty string.
fn optional_text(value: &Option<String>, field: &'static str, max: usize) -> Result<String> {
    Ok(provided_text(value, field, max)?.unwrap_or_default())
}

/// Text that overwrites a stored field only when the caller sent it.
fn provided_text(
    value: &Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>> {
    match value {
        Some(v) => {
            check_len(v, field, max)?;
            Ok(Some(v.trim().to_string()))
        }
        None => Ok(None),
    }
}

fn optional_enum<T>(
    value: &Option<String>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse(v)
            .map(Some)
            .ok_or_else(|| ValidationError::new(field, format!("has an unsupported value: {v}"))),
    }
}

/// Update payloads: a value that was sent must be valid, blank included.
fn provided_enum<T>(
    value: &Option<String>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some(v) => parse(v)
            .map(Some)
            .ok_or_else(|| ValidationError::new(field, format!("has an unsupported value: {v:?}"))),
    }
}

fn invalid_date() -> ValidationError {
    ValidationError::new("preferredDate", "must be a date (YYYY-MM-DD)")
}

fn invalid_time() -> ValidationError {
    ValidationError::new("preferredTime", "must be a 24-hour time (HH:MM)")
}

fn non_negative_u32(value: i64, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| ValidationError::new(field, "must be a non-negative number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewBooking {
        NewBooking {
            customer_name: Some("Priya Sharma".to_string()),
            email: Some("Priya.Sharma@Example.com".to_string()),
            phone_number: Some("9876543210".to_string()),
            service: Some("Haircut + Styling".to_string()),
            preferred_date: Some("2025-06-16".to_string()),
            preferred_time: Some("14:30".to_string()),
            ..NewBooking::default()
        }
    }

    #[test]
    fn test_valid_booking_gets_catalog_values() {
        let booking = valid_input().validate(&ServiceCatalog::default()).unwrap();
        assert_eq!(booking.total_price, 700.0);
        assert_eq!(booking.estimated_duration, 45);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.rescheduling_count, 0);
        assert_eq!(booking.email, "priya.sharma@example.com");
        assert_eq!(booking.booking_source, BookingSource::Website);
        assert_eq!(booking.call_status, CallStatus::NotCalled);
        assert_eq!(booking.call_outcome, CallOutcome::Pending);
        assert_eq!(booking.original_date, Some(booking.preferred_date));
        assert_eq!(booking.original_time, "14:30");
    }

    #[test]
    fn test_missing_required_field() {
        let required = [
            "customerName",
            "email",
            "phoneNumber",
            "service",
            "preferredDate",
            "preferredTime",
        ];
        for field in required {
            let mut input = valid_input();
            match field {
                "customerName" => input.customer_name = None,
                "email" => input.email = Some("  ".to_string()),
                "phoneNumber" => input.phone_number = None,
                "service" => input.service = None,
                "preferredDate" => input.preferred_date = Some(String::new()),
                _ => input.preferred_time = None,
            }
            let err = input.validate(&ServiceCatalog::default()).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.to_string(), format!("{field} is required"));
        }
    }

    #[test]
    fn test_unknown_service_rejected() {
        let mut input = valid_input();
        input.service = Some("Massage".to_string());
        let err = input.validate(&ServiceCatalog::default()).unwrap_err();
        assert_eq!(err.field, "service");
    }

    #[test]
    fn test_phone_rules() {
        assert!(is_valid_phone("6123456789"));
        assert!(is_valid_phone("9999999999"));
        assert!(!is_valid_phone("5123456789"));
        assert!(!is_valid_phone("912345678"));
        assert!(!is_valid_phone("91234567890"));
        assert!(!is_valid_phone("98765x3210"));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last-name@mail.example.com"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@example.info"));
        assert!(!is_valid_email(".user@example.com"));
        assert!(!is_valid_email("us..er@example.com"));
    }

    #[test]
    fn test_time_rules() {
        assert_eq!(normalize_time("09:30").as_deref(), Some("09:30"));
        assert_eq!(normalize_time("9:05").as_deref(), Some("09:05"));
        assert_eq!(normalize_time("23:59").as_deref(), Some("23:59"));
        assert!(normalize_time("24:00").is_none());
        assert!(normalize_time("12:60").is_none());
        assert!(normalize_time("12:5").is_none());
        assert!(normalize_time("noon").is_none());
    }

    #[test]
    fn test_date_accepts_iso_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(parse_date("2025-06-16"), Some(expected));
        assert_eq!(parse_date("2025-06-16T00:00:00Z"), Some(expected));
        assert!(parse_date("16/06/2025").is_none());
    }

    #[test]
    fn test_invalid_enum_is_rejected_not_coerced() {
        let mut input = valid_input();
        input.booking_source = Some("billboard".to_string());
        let err = input.validate(&ServiceCatalog::default()).unwrap_err();
        assert_eq!(err.field, "bookingSource");

        let mut input = valid_input();
        input.booking_source = Some("walk_in".to_string());
        input.hair_type = Some("curly".to_string());
        let booking = input.validate(&ServiceCatalog::default()).unwrap();
        assert_eq!(booking.booking_source, BookingSource::WalkIn);
        assert_eq!(booking.hair_type, Some(HairType::Curly));
    }

    #[test]
    fn test_name_length_limit() {
        let mut input = valid_input();
        input.customer_name = Some("x".repeat(101));
        assert_eq!(input.validate(&ServiceCatalog::default()).unwrap_err().field, "customerName");
    }

    #[test]
    fn test_recording_url_must_be_http() {
        let mut input = valid_input();
        input.call_recording_url = Some("ftp://calls/1.mp3".to_string());
        assert_eq!(
            input.validate(&ServiceCatalog::default()).unwrap_err().field,
            "callRecordingUrl"
        );
    }

    #[test]
    fn test_cancel_defaults_to_customer() {
        let cancellation = CancelRequest::default().validate().unwrap();
        assert_eq!(cancellation.cancelled_by, CancelledBy::Customer);

        let bad = CancelRequest {
            cancelled_by: Some("manager".to_string()),
            ..CancelRequest::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reschedule_requires_slot() {
        let request = RescheduleRequest {
            preferred_date: Some("2025-07-01".to_string()),
            ..RescheduleRequest::default()
        };
        assert_eq!(request.validate().unwrap_err().field, "preferredTime");
    }

    #[test]
    fn test_call_update_only_sets_provided_fields() {
        let update = CallUpdate {
            call_duration: Some(180),
            call_status: Some("completed".to_string()),
            ..CallUpdate::default()
        };
        let patch = update.validate().unwrap();
        assert_eq!(patch.call_duration, Some(180));
        assert_eq!(patch.call_status, Some(CallStatus::Completed));
        assert!(patch.call_summary.is_none());
        assert!(patch.call_outcome.is_none());

        let negative = CallUpdate {
            call_duration: Some(-5),
            ..CallUpdate::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_feedback_score_range() {
        let update = FeedbackUpdate {
            customer_satisfaction: Some(6),
            ..FeedbackUpdate::default()
        };
        assert_eq!(update.validate().unwrap_err().field, "customerSatisfaction");

        let update = FeedbackUpdate {
            customer_satisfaction: Some(5),
            would_recommend: Some(true),
            revisit_intent: Some("probably".to_string()),
            ..FeedbackUpdate::default()
        };
        let patch = update.validate().unwrap();
        assert_eq!(patch.customer_satisfaction, Some(5));
        assert_eq!(patch.revisit_intent, Some(RevisitIntent::Probably));
    }

    #[test]
    fn test_payment_amount_not_negative() {
        let update = PaymentUpdate {
            payment_amount: Some(-1.0),
            ..PaymentUpdate::default()
        };
        assert!(update.validate().is_err());

        let update = PaymentUpdate {
            payment_status: Some("paid".to_string()),
            payment_method: Some("upi".to_string()),
            payment_amount: Some(700.0),
        };
        let patch = update.validate().unwrap();
        assert_eq!(patch.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(patch.payment_method, Some(PaymentMethod::Upi));
    }

    #[test]
    fn test_blank_enum_in_update_is_rejected() {
        let call = CallUpdate {
            call_status: Some(String::new()),
            ..CallUpdate::default()
        };
        assert_eq!(call.validate().unwrap_err().field, "callStatus");

        let payment = PaymentUpdate {
            payment_method: Some("  ".to_string()),
            ..PaymentUpdate::default()
        };
        assert_eq!(payment.validate().unwrap_err().field, "paymentMethod");

        let feedback = FeedbackUpdate {
            revisit_intent: Some(String::new()),
            ..FeedbackUpdate::default()
        };
        assert_eq!(feedback.validate().unwrap_err().field, "revisitIntent");

        let mut input = valid_input();
        input.skin_type = Some(String::new());
        assert_eq!(input.validate(&ServiceCatalog::default()).unwrap().skin_type, None);
    }
}
