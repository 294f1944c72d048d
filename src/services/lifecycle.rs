//! Booking lifecycle: pending → confirmed → completed, with cancellation and
//! bounded rescheduling. Rules are pure functions of the stored booking. The
//! store runs them at write time, so the check and the write see the same row.

use std::sync::Arc;

use chrono::Utc;

use crate::errors::AppError;
use crate::models::{
    now_stamp, Booking, BookingPatch, BookingStatus, CallUpdate, CancelRequest, Cancellation,
    CompleteRequest, DashboardStats, FeedbackUpdate, NewBooking, PaymentUpdate, Reschedule,
    RescheduleRequest, RuleViolation, ServiceCatalog, MAX_RESCHEDULES,
};
use crate::store::{BookingFilter, BookingStore, StoreError, TransitionPlan};

pub type Result<T> = std::result::Result<T, AppError>;

pub fn confirm_patch(booking: &Booking) -> std::result::Result<BookingPatch, RuleViolation> {
    if booking.status != BookingStatus::Pending {
        return Err(RuleViolation::NotPending);
    }
    Ok(BookingPatch {
        status: Some(BookingStatus::Confirmed),
        ..BookingPatch::default()
    })
}

pub fn cancel_patch(
    booking: &Booking,
    cancellation: Cancellation,
) -> std::result::Result<BookingPatch, RuleViolation> {
    match booking.status {
        BookingStatus::Cancelled => Err(RuleViolation::AlreadyCancelled),
        BookingStatus::Completed => Err(RuleViolation::CancelCompleted),
        BookingStatus::Pending | BookingStatus::Confirmed => Ok(BookingPatch {
            status: Some(BookingStatus::Cancelled),
            cancellation_reason: Some(cancellation.reason),
            cancelled_at: Some(now_stamp()),
            cancelled_by: Some(cancellation.cancelled_by),
            ..BookingPatch::default()
        }),
    }
}

/// Moves the booking to the new slot, keeping the slot it leaves in
/// `original*`.
pub fn reschedule_patch(
    booking: &Booking,
    reschedule: Reschedule,
) -> std::result::Result<BookingPatch, RuleViolation> {
    if booking.status == BookingStatus::Cancelled {
        return Err(RuleViolation::RescheduleCancelled);
    }
    if booking.rescheduling_count >= MAX_RESCHEDULES {
        return Err(RuleViolation::RescheduleLimit);
    }
    Ok(BookingPatch {
        original_date: Some(booking.preferred_date),
        original_time: Some(booking.preferred_time.clone()),
        preferred_date: Some(reschedule.date),
        preferred_time: Some(reschedule.time),
        rescheduling_reason: Some(reschedule.reason),
        rescheduling_count: Some(booking.rescheduling_count + 1),
        ..BookingPatch::default()
    })
}

pub fn complete_patch(
    booking: &Booking,
    actual_duration: Option<u32>,
) -> std::result::Result<BookingPatch, RuleViolation> {
    if booking.status != BookingStatus::Confirmed {
        return Err(RuleViolation::NotConfirmed);
    }
    Ok(BookingPatch {
        status: Some(BookingStatus::Completed),
        actual_duration,
        ..BookingPatch::default()
    })
}

/// The Lifecycle Service. Holds no backend-specific logic; any
/// [`BookingStore`] works.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    catalog: Arc<ServiceCatalog>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, catalog: Arc<ServiceCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub async fn create(&self, input: &NewBooking) -> Result<Booking> {
        let draft = input.validate(&self.catalog)?;
        let booking = self.store.create(draft).await?;

        tracing::info!(
            id = %booking.id,
            service = %booking.service,
            date = %booking.preferred_date,
            time = %booking.preferred_time,
            "booking created"
        );
        Ok(booking)
    }

    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Booking> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub async fn confirm(&self, id: &str) -> Result<Booking> {
        self.transition(id, "confirm", "confirmed", &confirm_patch).await
    }

    pub async fn cancel(&self, id: &str, input: &CancelRequest) -> Result<Booking> {
        let cancellation = input.validate()?;
        let plan = move |booking: &Booking| cancel_patch(booking, cancellation.clone());
        self.transition(id, "cancel", "cancelled", &plan).await
    }

    pub async fn reschedule(&self, id: &str, input: &RescheduleRequest) -> Result<Booking> {
        let reschedule = input.validate()?;
        let plan = move |booking: &Booking| reschedule_patch(booking, reschedule.clone());
        self.transition(id, "reschedule", "rescheduled", &plan).await
    }

    pub async fn complete(&self, id: &str, input: &CompleteRequest) -> Result<Booking> {
        let actual_duration = input.validate()?;
        let plan = move |booking: &Booking| complete_patch(booking, actual_duration);
        self.transition(id, "complete", "completed", &plan).await
    }

    pub async fn update_call(&self, id: &str, input: &CallUpdate) -> Result<Booking> {
        let patch = input.validate()?;
        self.apply(id, "call details updated", &patch).await
    }

    pub async fn update_payment(&self, id: &str, input: &PaymentUpdate) -> Result<Booking> {
        let patch = input.validate()?;
        self.apply(id, "payment updated", &patch).await
    }

    pub async fn update_feedback(&self, id: &str, input: &FeedbackUpdate) -> Result<Booking> {
        let patch = input.validate()?;
        self.apply(id, "feedback updated", &patch).await
    }

    /// Removes the booking permanently.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(id, "booking deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        Ok(self.store.aggregate_stats(Utc::now().naive_utc()).await?)
    }

    async fn apply(&self, id: &str, event: &str, patch: &BookingPatch) -> Result<Booking> {
        let booking = self.store.update(id, patch).await?;
        tracing::info!(id, status = %booking.status, "booking {event}");
        Ok(booking)
    }

    async fn transition(
        &self,
        id: &str,
        operation: &str,
        event: &str,
        plan: TransitionPlan<'_>,
    ) -> Result<Booking> {
        match self.store.update_checked(id, plan).await {
            Ok(booking) => {
                tracing::info!(id, status = %booking.status, "booking {event}");
                Ok(booking)
            }
            Err(StoreError::Rejected(rule)) => {
                tracing::warn!(id, operation, reason = %rule, "lifecycle transition rejected");
                Err(AppError::BusinessRule(rule))
            }
            Err(err) => Err(err.into()),
        }
    }
}
