//! Booking persistence behind a single contract.
//!
//! Two adapters implement [`BookingStore`]: [`SqliteStore`] keeps indexed
//! columns and answers filters, ordering and aggregates in SQL, while
//! [`AppendLogStore`] sits on a flat sheet of rows and re-reads the whole
//! log for every non-append operation. Callers hold an
//! `Arc<dyn BookingStore>` picked once by [`open_store`].

pub mod error;
pub mod migrations;
pub mod sheet;
pub mod sqlite;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::config::{AppConfig, StorageBackend};
use crate::models::{Booking, BookingPatch, BookingStatus, DashboardStats, RuleViolation};

pub use error::{Result, StoreError};
pub use sheet::{AppendLogStore, MemorySheet, SheetBackend, SheetsHttpBackend};
pub use sqlite::SqliteStore;

/// Decides the patch for a booking from its stored state, or refuses.
pub type TransitionPlan<'a> =
    &'a (dyn Fn(&Booking) -> std::result::Result<BookingPatch, RuleViolation> + Send + Sync);

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists `draft` under a fresh id. The draft's `id`, `created_at` and
    /// `updated_at` are ignored and assigned here.
    async fn create(&self, draft: Booking) -> Result<Booking>;

    /// Bookings matching `filter`, newest `created_at` first.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;

    async fn get(&self, id: &str) -> Result<Option<Booking>>;

    /// Merges `patch` into the stored booking and refreshes `updated_at`.
    async fn update(&self, id: &str, patch: &BookingPatch) -> Result<Booking> {
        let unconditional =
            |_: &Booking| -> std::result::Result<BookingPatch, RuleViolation> { Ok(patch.clone()) };
        self.update_checked(id, &unconditional).await
    }

    /// Runs `plan` against the booking as stored and writes the patch it
    /// returns. A refusal surfaces as [`StoreError::Rejected`] and nothing is
    /// written. The sqlite adapter reads, checks and writes in one transaction.
    async fn update_checked(&self, id: &str, plan: TransitionPlan<'_>) -> Result<Booking>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Statistics over every stored booking; period counts are relative to `now`.
    async fn aggregate_stats(&self, now: NaiveDateTime) -> Result<DashboardStats>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }
        if let Some(date) = self.date {
            if booking.preferred_date != date {
                return false;
            }
        }
        if let Some(needle) = self.search_term() {
            let needle = needle.to_lowercase();
            return [&booking.customer_name, &booking.email, &booking.phone_number]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }

    /// The search text, if any non-blank text was given.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

pub fn new_booking_id() -> String {
    format!("BK{}", uuid::Uuid::new_v4().simple())
}

pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BookingStore>> {
    match config.storage_backend {
        StorageBackend::Sqlite => {
            tracing::info!(path = %config.database_url, "using sqlite booking store");
            let store = SqliteStore::open(&config.database_url)?;
            Ok(Arc::new(store))
        }
        StorageBackend::Sheets => {
            anyhow::ensure!(
                !config.sheet_id.is_empty(),
                "GOOGLE_SHEET_ID must be set when STORAGE_BACKEND=sheets"
            );
            anyhow::ensure!(
                !config.sheets_access_token.is_empty(),
                "SHEETS_ACCESS_TOKEN must be set when STORAGE_BACKEND=sheets"
            );
            tracing::info!(
                sheet = %config.sheet_id,
                tab = %config.sheet_tab,
                "using spreadsheet booking store"
            );
            let backend = SheetsHttpBackend::new(
                &config.sheets_api_url,
                config.sheet_id.clone(),
                config.sheet_tab.clone(),
                config.sheets_access_token.clone(),
            )?;
            let store = AppendLogStore::open(backend)
                .await
                .context("failed to open spreadsheet booking store")?;
            Ok(Arc::new(store))
        }
    }
}
