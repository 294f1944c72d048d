use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: u64,
    pub today_bookings: u64,
    pub month_bookings: u64,
    pub year_bookings: u64,

    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub completed_bookings: u64,
    pub cancelled_bookings: u64,

    pub total_revenue: f64,

    pub calls_completed: u64,
    pub average_call_duration: f64,

    pub booking_sources: Vec<BreakdownEntry>,
    pub services: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub count: u64,
}

/// Orders a breakdown by count descending, then name.
pub fn sort_breakdown(entries: &mut [BreakdownEntry]) {
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
}
