//! Fixed-column row form of a booking for the append log.
//!
//! Every field has a fixed column index. Decoding tolerates short rows: a
//! missing or empty cell yields the field's zero value.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{
    Booking, BookingSource, BookingStatus, CallOutcome, CallStatus, CancelledBy, HairType,
    PaymentMethod, PaymentStatus, RevisitIntent, SkinType,
};
use crate::store::error::{Result, StoreError};

pub const COLUMNS: [&str; 49] = [
    "id",
    "customerName",
    "email",
    "phoneNumber",
    "service",
    "preferredDate",
    "preferredTime",
    "totalPrice",
    "status",
    "bookingSource",
    "staffAssigned",
    "estimatedDuration",
    "actualDuration",
    "paymentStatus",
    "paymentMethod",
    "paymentAmount",
    "customerNotes",
    "internalNotes",
    "reminderSent",
    "reminderSentAt",
    "followUpRequired",
    "followUpDate",
    "followUpNotes",
    "preferredStaff",
    "servicePreferences",
    "allergicReactions",
    "skinType",
    "hairType",
    "customerSatisfaction",
    "feedback",
    "wouldRecommend",
    "revisitIntent",
    "reschedulingReason",
    "reschedulingCount",
    "originalDate",
    "originalTime",
    "cancellationReason",
    "cancelledAt",
    "cancelledBy",
    "callId",
    "callTranscript",
    "callSummary",
    "callDuration",
    "callRecordingUrl",
    "callStatus",
    "callOutcome",
    "notes",
    "createdAt",
    "updatedAt",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn header_row() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

pub fn encode_row(b: &Booking) -> Vec<String> {
    vec![
        b.id.clone(),
        b.customer_name.clone(),
        b.email.clone(),
        b.phone_number.clone(),
        b.service.clone(),
        b.preferred_date.format(DATE_FORMAT).to_string(),
        b.preferred_time.clone(),
        b.total_price.to_string(),
        b.status.as_str().to_string(),
        b.booking_source.as_str().to_string(),
        b.staff_assigned.clone(),
        b.estimated_duration.to_string(),
        b.actual_duration.to_string(),
        b.payment_status.as_str().to_string(),
        opt_enum(b.payment_method.map(|m| m.as_str())),
        b.payment_amount.to_string(),
        b.customer_notes.clone(),
        b.internal_notes.clone(),
        yes_no(b.reminder_sent),
        opt_timestamp(b.reminder_sent_at),
        yes_no(b.follow_up_required),
        opt_date(b.follow_up_date),
        b.follow_up_notes.clone(),
        b.preferred_staff.clone(),
        b.service_preferences.clone(),
        b.allergic_reactions.clone(),
        opt_enum(b.skin_type.map(|s| s.as_str())),
        opt_enum(b.hair_type.map(|h| h.as_str())),
        b.customer_satisfaction.map(|s| s.to_string()).unwrap_or_default(),
        b.feedback.clone(),
        yes_no(b.would_recommend),
        opt_enum(b.revisit_intent.map(|r| r.as_str())),
        b.rescheduling_reason.clone(),
        b.rescheduling_count.to_string(),
        opt_date(b.original_date),
        b.original_time.clone(),
        b.cancellation_reason.clone(),
        opt_timestamp(b.cancelled_at),
        opt_enum(b.cancelled_by.map(|c| c.as_str())),
        b.call_id.clone(),
        b.call_transcript.clone(),
        b.call_summary.clone(),
        b.call_duration.to_string(),
        b.call_recording_url.clone(),
        b.call_status.as_str().to_string(),
        b.call_outcome.as_str().to_string(),
        b.notes.clone(),
        b.created_at.format(TIMESTAMP_FORMAT).to_string(),
        b.updated_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}

/// Decodes the row at sheet position `position` (0 is the header). Returns
/// `None` for a structurally blank row, i.e. one with an empty id.
pub fn decode_row(row: &[String], position: usize) -> Result<Option<Booking>> {
    let cells = Cells { row, position };
    if cells.text(0).trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(Booking {
        id: cells.text(0),
        customer_name: cells.text(1),
        email: cells.text(2),
        phone_number: cells.text(3),
        service: cells.text(4),
        preferred_date: cells.date(5)?.unwrap_or_default(),
        preferred_time: cells.text(6),
        total_price: cells.number(7)?,
        status: cells.choice(8, BookingStatus::parse)?.unwrap_or_default(),
        booking_source: cells.choice(9, BookingSource::parse)?.unwrap_or_default(),
        staff_assigned: cells.text(10),
        estimated_duration: cells.number(11)?,
        actual_duration: cells.number(12)?,
        payment_status: cells.choice(13, PaymentStatus::parse)?.unwrap_or_default(),
        payment_method: cells.choice(14, PaymentMethod::parse)?,
        payment_amount: cells.number(15)?,
        customer_notes: cells.text(16),
        internal_notes: cells.text(17),
        reminder_sent: cells.flag(18),
        reminder_sent_at: cells.timestamp(19)?,
        follow_up_required: cells.flag(20),
        follow_up_date: cells.date(21)?,
        follow_up_notes: cells.text(22),
        preferred_staff: cells.text(23),
        service_preferences: cells.text(24),
        allergic_reactions: cells.text(25),
        skin_type: cells.choice(26, SkinType::parse)?,
        hair_type: cells.choice(27, HairType::parse)?,
        customer_satisfaction: cells.optional_number(28)?,
        feedback: cells.text(29),
        would_recommend: cells.flag(30),
        revisit_intent: cells.choice(31, RevisitIntent::parse)?,
        rescheduling_reason: cells.text(32),
        rescheduling_count: cells.number(33)?,
        original_date: cells.date(34)?,
        original_time: cells.text(35),
        cancellation_reason: cells.text(36),
        cancelled_at: cells.timestamp(37)?,
        cancelled_by: cells.choice(38, CancelledBy::parse)?,
        call_id: cells.text(39),
        call_transcript: cells.text(40),
        call_summary: cells.text(41),
        call_duration: cells.number(42)?,
        call_recording_url: cells.text(43),
        call_status: cells.choice(44, CallStatus::parse)?.unwrap_or_default(),
        call_outcome: cells.choice(45, CallOutcome::parse)?.unwrap_or_default(),
        notes: cells.text(46),
        created_at: cells.timestamp(47)?.unwrap_or_default(),
        updated_at: cells.timestamp(48)?.unwrap_or_default(),
    }))
}

fn yes_no(value: bool) -> String {
    let cell = if value { "Yes" } else { "No" };
    cell.to_string()
}

fn opt_enum(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn opt_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn opt_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

struct Cells<'a> {
    row: &'a [String],
    position: usize,
}

impl Cells<'_> {
    fn raw(&self, index: usize) -> &str {
        self.row.get(index).map(String::as_str).unwrap_or("")
    }

    fn text(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    fn flag(&self, index: usize) -> bool {
        self.raw(index) == "Yes"
    }

    fn number<T: FromStr + Default>(&self, index: usize) -> Result<T> {
        Ok(self.optional_number(index)?.unwrap_or_default())
    }

    fn optional_number<T: FromStr>(&self, index: usize) -> Result<Option<T>> {
        let raw = self.raw(index).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|_| self.corrupt(index, raw))
    }

    fn date(&self, index: usize) -> Result<Option<NaiveDate>> {
        let raw = self.raw(index).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| self.corrupt(index, raw))
    }

    fn timestamp(&self, index: usize) -> Result<Option<NaiveDateTime>> {
        let raw = self.raw(index).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .map(Some)
            .map_err(|_| self.corrupt(index, raw))
    }

    fn choice<T>(&self, index: usize, parse: fn(&str) -> Option<T>) -> Result<Option<T>> {
        let raw = self.raw(index).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse(raw).map(Some).ok_or_else(|| self.corrupt(index, raw))
    }

    fn corrupt(&self, index: usize, raw: &str) -> StoreError {
        StoreError::CorruptRow {
            row: self.position + 1,
            reason: format!("unreadable {} value: {raw:?}", COLUMNS[index]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn full_booking() -> Booking {
        Booking {
            id: "BK42".to_string(),
            customer_name: "Meera Iyer".to_string(),
            email: "meera@example.com".to_string(),
            phone_number: "9123456789".to_string(),
            service: "Hair Spa".to_string(),
            preferred_date: date("2025-07-01"),
            preferred_time: "11:15".to_string(),
            total_price: 1200.0,
            status: BookingStatus::Cancelled,
            booking_source: BookingSource::VoiceAssistant,
            staff_assigned: "Kiran".to_string(),
            estimated_duration: 60,
            actual_duration: 55,
            payment_status: PaymentStatus::Refunded,
            payment_method: Some(PaymentMethod::Upi),
            payment_amount: 1199.5,
            customer_notes: "window seat, please".to_string(),
            internal_notes: "regular".to_string(),
            reminder_sent: true,
            reminder_sent_at: Some(dt("2025-06-30 09:00")),
            follow_up_required: true,
            follow_up_date: Some(date("2025-07-10")),
            follow_up_notes: "offer discount".to_string(),
            preferred_staff: "Kiran".to_string(),
            service_preferences: "mild products".to_string(),
            allergic_reactions: "none".to_string(),
            skin_type: Some(SkinType::Combination),
            hair_type: Some(HairType::Wavy),
            customer_satisfaction: Some(4),
            feedback: "lovely".to_string(),
            would_recommend: true,
            revisit_intent: Some(RevisitIntent::ProbablyNot),
            rescheduling_reason: "travel".to_string(),
            rescheduling_count: 2,
            original_date: Some(date("2025-06-28")),
            original_time: "10:00".to_string(),
            cancellation_reason: "moved away".to_string(),
            cancelled_at: Some(dt("2025-06-30 18:45")),
            cancelled_by: Some(CancelledBy::Customer),
            call_id: "call-77".to_string(),
            call_transcript: "Hello, I'd like to book".to_string(),
            call_summary: "booked hair spa".to_string(),
            call_duration: 183,
            call_recording_url: "https://calls.example.com/77.mp3".to_string(),
            call_status: CallStatus::Completed,
            call_outcome: CallOutcome::Booked,
            notes: "first visit".to_string(),
            created_at: dt("2025-06-20 08:30"),
            updated_at: dt("2025-06-30 18:45"),
        }
    }

    #[test]
    fn test_header_has_fixed_order() {
        let header = header_row();
        assert_eq!(header.len(), 49);
        assert_eq!(header[0], "id");
        assert_eq!(header[33], "reschedulingCount");
        assert_eq!(header[46], "notes");
        assert_eq!(header[48], "updatedAt");
    }

    #[test]
    fn test_round_trip_all_fields() {
        let booking = full_booking();
        let row = encode_row(&booking);
        assert_eq!(row.len(), COLUMNS.len());

        let decoded = decode_row(&row, 3).unwrap().unwrap();
        assert_eq!(decoded, booking);
    }

    #[test]
    fn test_round_trip_sparse_booking() {
        let booking = Booking {
            id: "BK1".to_string(),
            customer_name: "Ravi".to_string(),
            preferred_date: date("2025-06-16"),
            created_at: dt("2025-06-15 12:00"),
            updated_at: dt("2025-06-15 12:00"),
            ..Booking::default()
        };
        let decoded = decode_row(&encode_row(&booking), 1).unwrap().unwrap();
        assert_eq!(decoded, booking);
    }

    #[test]
    fn test_encodes_literal_cells() {
        let row = encode_row(&full_booking());
        assert_eq!(row[5], "2025-07-01");
        assert_eq!(row[7], "1200");
        assert_eq!(row[18], "Yes");
        assert_eq!(row[19], "2025-06-30 09:00");
        assert_eq!(row[30], "Yes");
        assert_eq!(row[47], "2025-06-20 08:30");

        let row = encode_row(&Booking::default());
        assert_eq!(row[18], "No");
        assert_eq!(row[14], "");
        assert_eq!(row[28], "");
    }

    #[test]
    fn test_short_row_uses_zero_values() {
        let row: Vec<String> = ["BK9", "Ravi", "ravi@example.com", "9876543210", "Haircut"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let booking = decode_row(&row, 5).unwrap().unwrap();
        assert_eq!(booking.id, "BK9");
        assert_eq!(booking.service, "Haircut");
        assert_eq!(booking.total_price, 0.0);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.rescheduling_count, 0);
        assert!(!booking.would_recommend);
        assert!(booking.cancelled_at.is_none());
        assert_eq!(booking.notes, "");
    }

    #[test]
    fn test_blank_id_is_skipped() {
        let mut row = encode_row(&full_booking());
        row[0] = String::new();
        assert!(decode_row(&row, 2).unwrap().is_none());
        assert!(decode_row(&[], 2).unwrap().is_none());
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let mut row = encode_row(&full_booking());
        row[8] = "archived".to_string();
        let err = decode_row(&row, 6).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { row: 7, .. }));
    }
}
