use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::calendar::CalendarError;
use super::domain::{ActorRole, BookingId, BookingRequest, RegistrationStatus, VenueCategory};
use super::ledger::LedgerError;
use super::lifecycle::LifecycleError;
use super::repository::{
    BookingRecord, BookingRepository, NotificationPublisher, RepositoryError,
};
use super::service::{SchedulingError, SlotAllocationService};

/// Router builder exposing HTTP endpoints for booking intake, lifecycle
/// transitions, and availability views.
pub fn scheduling_router<R, N>(service: Arc<SlotAllocationService<R, N>>) -> Router
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/scheduling/bookings", post(request_handler::<R, N>))
        .route(
            "/api/v1/scheduling/bookings/:booking_id/status",
            post(advance_handler::<R, N>),
        )
        .route(
            "/api/v1/scheduling/bookings/:booking_id",
            axum::routing::delete(release_handler::<R, N>),
        )
        .route(
            "/api/v1/scheduling/calendar/:year/:month",
            get(calendar_handler::<R, N>),
        )
        .route("/api/v1/scheduling/days/:date", get(day_handler::<R, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdvanceStatusRequest {
    pub(crate) target: RegistrationStatus,
    pub(crate) actor_role: ActorRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarQuery {
    pub(crate) venue: VenueCategory,
}

pub(crate) async fn request_handler<R, N>(
    State(service): State<Arc<SlotAllocationService<R, N>>>,
    axum::Json(request): axum::Json<BookingRequest>,
) -> Response
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.request_booking(request) {
        Ok(booking) => {
            let view = BookingRecord::active(booking).status_view();
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => scheduling_error_response(error),
    }
}

pub(crate) async fn advance_handler<R, N>(
    State(service): State<Arc<SlotAllocationService<R, N>>>,
    Path(booking_id): Path<String>,
    axum::Json(request): axum::Json<AdvanceStatusRequest>,
) -> Response
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = BookingId(booking_id);
    match service.advance_status(&id, request.target, request.actor_role) {
        Ok(booking) => {
            let view = BookingRecord::active(booking).status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => scheduling_error_response(error),
    }
}

pub(crate) async fn release_handler<R, N>(
    State(service): State<Arc<SlotAllocationService<R, N>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = BookingId(booking_id);
    match service.release_booking(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => scheduling_error_response(error),
    }
}

pub(crate) async fn calendar_handler<R, N>(
    State(service): State<Arc<SlotAllocationService<R, N>>>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.month_calendar(year, month, query.venue) {
        Ok(days) => {
            let view = json!({
                "year": year,
                "month": month,
                "venue": query.venue.label(),
                "days": days,
            });
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => scheduling_error_response(error),
    }
}

pub(crate) async fn day_handler<R, N>(
    State(service): State<Arc<SlotAllocationService<R, N>>>,
    Path(date): Path<String>,
) -> Response
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let date = match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            let payload = json!({ "error": "date must be formatted YYYY-MM-DD" });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.daily_slots(date) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => scheduling_error_response(error),
    }
}

/// Map engine errors onto HTTP statuses: caller mistakes are 4xx, capacity
/// exhaustion is a conflict the caller resolves by picking another slot,
/// and `Busy` asks the caller to retry.
fn scheduling_error_response(error: SchedulingError) -> Response {
    let status = match &error {
        SchedulingError::Ledger(LedgerError::SlotInvalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulingError::Ledger(
            LedgerError::CategoryFull { .. } | LedgerError::CombinedFull { .. },
        ) => StatusCode::CONFLICT,
        SchedulingError::Ledger(LedgerError::NotFound { .. }) => StatusCode::NOT_FOUND,
        SchedulingError::Ledger(LedgerError::Busy { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        SchedulingError::Ledger(LedgerError::Repository(RepositoryError::Conflict)) => {
            StatusCode::CONFLICT
        }
        SchedulingError::Lifecycle(
            LifecycleError::InvalidTransition { .. } | LifecycleError::RoleNotPermitted { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulingError::Calendar(CalendarError::InvalidMonth { .. }) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
