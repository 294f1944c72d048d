use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::validation::parse_date;
use crate::models::{
    Booking, BookingStatus, CallUpdate, CancelRequest, CompleteRequest, DashboardStats,
    FeedbackUpdate, NewBooking, PaymentUpdate, RescheduleRequest, ValidationError,
};
use crate::state::AppState;
use crate::store::BookingFilter;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

type BookingResponse = Result<Json<ApiResponse<Booking>>, AppError>;

/// Request bodies are parsed by hand so malformed JSON surfaces as a
/// validation error in the usual envelope. An empty body reads as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        AppError::from(ValidationError::new(
            "body",
            format!("must be a valid JSON object: {e}"),
        ))
    })
}

// POST /api/bookings
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let input: NewBooking = parse_body(&body)?;
    let booking = state.bookings.create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Booking created successfully", booking)),
    ))
}

// GET /api/bookings
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl ListQuery {
    fn filter(&self) -> Result<BookingFilter, ValidationError> {
        let status = match non_blank(&self.status) {
            Some(s) => Some(
                BookingStatus::parse(s)
                    .ok_or_else(|| ValidationError::new("status", format!("is not valid: {s}")))?,
            ),
            None => None,
        };
        let date = match non_blank(&self.date) {
            Some(d) => Some(
                parse_date(d)
                    .ok_or_else(|| ValidationError::new("date", "must be a date (YYYY-MM-DD)"))?,
            ),
            None => None,
        };

        Ok(BookingFilter {
            status,
            date,
            search: self.search.clone(),
        })
    }

    fn page(&self) -> Result<(usize, usize), ValidationError> {
        let page = match non_blank(&self.page) {
            Some(p) => p
                .parse::<usize>()
                .ok()
                .filter(|&p| p >= 1)
                .ok_or_else(|| ValidationError::new("page", "must be a positive integer"))?,
            None => 1,
        };
        let limit = match non_blank(&self.limit) {
            Some(l) => l
                .parse::<usize>()
                .ok()
                .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
                .ok_or_else(|| {
                    ValidationError::new("limit", format!("must be between 1 and {MAX_PAGE_SIZE}"))
                })?,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok((page, limit))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Slices one page out of `items`; pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, Pagination) {
    let total = items.len();
    let pagination = Pagination {
        page,
        limit,
        total,
        pages: total.div_ceil(limit),
    };
    let start = (page - 1).saturating_mul(limit);
    let items = items.into_iter().skip(start).take(limit).collect();
    (items, pagination)
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let filter = query.filter()?;
    let (page, limit) = query.page()?;

    let bookings = state.bookings.list(&filter).await?;
    let (items, pagination) = paginate(bookings, page, limit);

    Ok(Json(ApiResponse {
        pagination: Some(pagination),
        ..ApiResponse::ok(items)
    }))
}

// GET /api/bookings/stats/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = state.bookings.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> BookingResponse {
    let booking = state.bookings.get(&id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.bookings.delete(&id).await?;
    Ok(Json(ApiResponse::message_only("Booking deleted successfully")))
}

// PUT /api/bookings/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> BookingResponse {
    let booking = state.bookings.confirm(&id).await?;
    Ok(Json(ApiResponse::with_message("Booking confirmed successfully", booking)))
}

// PUT /api/bookings/:id/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: CancelRequest = parse_body(&body)?;
    let booking = state.bookings.cancel(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Booking cancelled successfully", booking)))
}

// PUT /api/bookings/:id/reschedule
pub async fn reschedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: RescheduleRequest = parse_body(&body)?;
    let booking = state.bookings.reschedule(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Booking rescheduled successfully", booking)))
}

// PUT /api/bookings/:id/complete
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: CompleteRequest = parse_body(&body)?;
    let booking = state.bookings.complete(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Booking completed successfully", booking)))
}

// PUT /api/bookings/:id/call-update
pub async fn call_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: CallUpdate = parse_body(&body)?;
    let booking = state.bookings.update_call(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Call information updated successfully", booking)))
}

// PUT /api/bookings/:id/payment-update
pub async fn payment_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: PaymentUpdate = parse_body(&body)?;
    let booking = state.bookings.update_payment(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Payment information updated successfully", booking)))
}

// PUT /api/bookings/:id/feedback
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> BookingResponse {
    let input: FeedbackUpdate = parse_body(&body)?;
    let booking = state.bookings.update_feedback(&id, &input).await?;
    Ok(Json(ApiResponse::with_message("Feedback added successfully", booking)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..ListQuery::default()
        }
    }

    #[test]
    fn test_paginate() {
        let (items, p) = paginate((1..=23).collect::<Vec<_>>(), 3, 10);
        assert_eq!(items, vec![21, 22, 23]);
        assert_eq!(
            p,
            Pagination {
                page: 3,
                limit: 10,
                total: 23,
                pages: 3
            }
        );

        let (items, p) = paginate(Vec::<u8>::new(), 1, 10);
        assert!(items.is_empty());
        assert_eq!(p.pages, 0);

        let (items, _) = paginate(vec![1, 2], 5, 10);
        assert!(items.is_empty());
    }

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(query(None, None).page().unwrap(), (1, 10));
        assert_eq!(query(Some("2"), Some("25")).page().unwrap(), (2, 25));
        assert!(query(Some("0"), None).page().is_err());
        assert!(query(None, Some("500")).page().is_err());
        assert!(query(Some("abc"), None).page().is_err());
    }

    #[test]
    fn test_filter_is_strict() {
        let q = ListQuery {
            status: Some("done".to_string()),
            ..ListQuery::default()
        };
        assert_eq!(q.filter().unwrap_err().field, "status");

        let q = ListQuery {
            status: Some("completed".to_string()),
            date: Some("2025-06-16".to_string()),
            search: Some("ravi".to_string()),
            ..ListQuery::default()
        };
        let filter = q.filter().unwrap();
        assert_eq!(filter.status, Some(BookingStatus::Completed));
        assert!(filter.date.is_some());
        assert_eq!(filter.search_term(), Some("ravi"));
    }

    #[test]
    fn test_parse_body() {
        let empty: CancelRequest = parse_body(&Bytes::from_static(b"")).unwrap();
        assert!(empty.cancelled_by.is_none());

        let err = parse_body::<CancelRequest>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
