use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::models::stats::sort_breakdown;
use crate::models::{
    Booking, BookingStatus, BreakdownEntry, CallStatus, DashboardStats, PaymentStatus,
};

/// Start of the day, month and year containing `now`.
pub struct PeriodStarts {
    pub today: NaiveDateTime,
    pub month: NaiveDateTime,
    pub year: NaiveDateTime,
}

impl PeriodStarts {
    pub fn at(now: NaiveDateTime) -> Self {
        let date = now.date();
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).unwrap_or(now);
        let month_start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let year_start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);

        Self {
            today: midnight(date),
            month: midnight(month_start),
            year: midnight(year_start),
        }
    }
}

/// Dashboard figures computed in memory over a full booking set.
pub fn compute_stats(bookings: &[Booking], now: NaiveDateTime) -> DashboardStats {
    let periods = PeriodStarts::at(now);
    let since =
        |start: NaiveDateTime| bookings.iter().filter(|b| b.created_at >= start).count() as u64;
    let with_status =
        |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count() as u64;

    let total_revenue = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed && b.payment_status == PaymentStatus::Paid)
        .map(|b| b.total_price)
        .sum();

    let call_durations: Vec<u32> = bookings
        .iter()
        .map(|b| b.call_duration)
        .filter(|d| *d > 0)
        .collect();
    let average_call_duration = if call_durations.is_empty() {
        0.0
    } else {
        call_durations.iter().map(|d| f64::from(*d)).sum::<f64>() / call_durations.len() as f64
    };

    DashboardStats {
        total_bookings: bookings.len() as u64,
        today_bookings: since(periods.today),
        month_bookings: since(periods.month),
        year_bookings: since(periods.year),
        pending_bookings: with_status(BookingStatus::Pending),
        confirmed_bookings: with_status(BookingStatus::Confirmed),
        completed_bookings: with_status(BookingStatus::Completed),
        cancelled_bookings: with_status(BookingStatus::Cancelled),
        total_revenue,
        calls_completed: bookings
            .iter()
            .filter(|b| b.call_status == CallStatus::Completed)
            .count() as u64,
        average_call_duration,
        booking_sources: count_by(bookings, |b| b.booking_source.as_str().to_string()),
        services: count_by(bookings, |b| b.service.clone()),
    }
}

fn count_by(bookings: &[Booking], key: impl Fn(&Booking) -> String) -> Vec<BreakdownEntry> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for booking in bookings {
        *counts.entry(key(booking)).or_default() += 1;
    }

    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(name, count)| BreakdownEntry { name, count })
        .collect();
    sort_breakdown(&mut entries);
    entries
}
