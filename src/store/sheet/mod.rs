//! Append Log Store: bookings kept as rows in a flat sheet with one header
//! row and no index.
//!
//! Every read, update and delete fetches the whole sheet, decodes each row
//! and finds its target by linear scan; updates and deletes then write a
//! single row back by position. That read-then-write-by-position sequence is
//! not atomic. Two concurrent writers that both read before either writes can
//! overwrite each other and the first write is lost. The same window applies
//! to guarded updates: the rule check sees the row as read, not as written.
//! No locking is layered on top; deployments that need strong consistency use
//! the sqlite store.

pub mod http;
pub mod memory;
pub mod row;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{now_stamp, Booking, DashboardStats};
use crate::services::stats::compute_stats;
use crate::store::error::{Result, StoreError};
use crate::store::{new_booking_id, BookingFilter, BookingStore, TransitionPlan};

pub use http::SheetsHttpBackend;
pub use memory::MemorySheet;
pub use row::{decode_row, encode_row, header_row, COLUMNS};

/// Row-level access to the sheet backing an [`AppendLogStore`]. Positions are
/// 0-based and include the header row at position 0.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn read_rows(&self) -> Result<Vec<Vec<String>>>;

    async fn append_row(&self, row: Vec<String>) -> Result<()>;

    async fn write_row(&self, position: usize, row: Vec<String>) -> Result<()>;

    /// Blanks the row in place; later rows keep their positions.
    async fn clear_row(&self, position: usize) -> Result<()>;
}

pub struct AppendLogStore<B> {
    backend: B,
}

impl<B: SheetBackend> AppendLogStore<B> {
    /// Wraps `backend`, writing the header row if the sheet is empty.
    pub async fn open(backend: B) -> Result<Self> {
        let rows = backend.read_rows().await?;
        if rows.is_empty() {
            backend.append_row(header_row()).await?;
            tracing::info!("initialised booking sheet header");
        }
        Ok(Self { backend })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Every decodable booking with its sheet position, in sheet order.
    async fn load(&self) -> Result<Vec<(usize, Booking)>> {
        let rows = self.backend.read_rows().await?;

        let mut bookings = Vec::with_capacity(rows.len().saturating_sub(1));
        for (position, row) in rows.iter().enumerate().skip(1) {
            if let Some(booking) = decode_row(row, position)? {
                bookings.push((position, booking));
            }
        }
        Ok(bookings)
    }

    async fn locate(&self, id: &str) -> Result<(usize, Booking)> {
        self.load()
            .await?
            .into_iter()
            .find(|(_, booking)| booking.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<B: SheetBackend> BookingStore for AppendLogStore<B> {
    async fn create(&self, draft: Booking) -> Result<Booking> {
        let now = now_stamp();
        let booking = Booking {
            id: new_booking_id(),
            created_at: now,
            updated_at: now,
            ..draft
        };

        self.backend.append_row(encode_row(&booking)).await?;
        Ok(booking)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut matched: Vec<(usize, Booking)> = self
            .load()
            .await?
            .into_iter()
            .filter(|(_, booking)| filter.matches(booking))
            .collect();

        // Newest first; rows appended later win ties within the same minute.
        matched.sort_by(|(pa, a), (pb, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| pb.cmp(pa))
        });

        Ok(matched.into_iter().map(|(_, booking)| booking).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .map(|(_, booking)| booking)
            .find(|booking| booking.id == id))
    }

    async fn update_checked(&self, id: &str, plan: TransitionPlan<'_>) -> Result<Booking> {
        let (position, mut booking) = self.locate(id).await?;

        let patch = plan(&booking)?;
        patch.apply(&mut booking);
        booking.updated_at = now_stamp();

        self.backend.write_row(position, encode_row(&booking)).await?;
        Ok(booking)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let (position, _) = self.locate(id).await?;
        self.backend.clear_row(position).await
    }

    async fn aggregate_stats(&self, now: NaiveDateTime) -> Result<DashboardStats> {
        let bookings: Vec<Booking> = self
            .load()
            .await?
            .into_iter()
            .map(|(_, booking)| booking)
            .collect();
        Ok(compute_stats(&bookings, now))
    }
}
