use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::{
    at, booking_request, build_service, march, read_json_body, scheduling_router_with_service,
};
use crate::scheduling::domain::{ActorRole, RegistrationStatus, VenueCategory};
use crate::scheduling::router::{self, AdvanceStatusRequest, CalendarQuery};
use crate::scheduling::service::SlotAllocationService;
use crate::scheduling::tests_support::{MemoryNotifications, UnavailableRepository};

#[tokio::test]
async fn booking_route_returns_created() {
    let (service, _, _) = build_service();
    let router = scheduling_router_with_service(service);

    let request = booking_request("A", march(10), at(9), VenueCategory::OnPremise);
    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/scheduling/bookings")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&request).expect("request serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload.get("booking_id").is_some());
    assert_eq!(payload["status"], json!("draft"));
    assert_eq!(payload["venue"], json!("on-premise"));
}

#[tokio::test]
async fn exhausted_slot_maps_to_conflict() {
    let (service, _, _) = build_service();
    service
        .request_booking(booking_request("A", march(11), at(9), VenueCategory::OnPremise))
        .expect("first admission fits");

    let response = router::request_handler(
        State(Arc::new(service)),
        axum::Json(booking_request("B", march(11), at(9), VenueCategory::OnPremise)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error text")
        .contains("capacity"));
}

#[tokio::test]
async fn off_grid_time_maps_to_unprocessable() {
    let (service, _, _) = build_service();
    let half_past = chrono::NaiveTime::from_hms_opt(9, 30, 0).expect("valid time");

    let response = router::request_handler(
        State(Arc::new(service)),
        axum::Json(booking_request("A", march(12), half_past, VenueCategory::OffPremise)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn repository_outage_maps_to_internal_error() {
    let service = SlotAllocationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifications::default()),
    );

    let response = router::request_handler(
        State(Arc::new(service)),
        axum::Json(booking_request("A", march(13), at(9), VenueCategory::OnPremise)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_route_advances_and_reports_the_new_status() {
    let (service, _, _) = build_service();
    let booking = service
        .request_booking(booking_request("A", march(14), at(9), VenueCategory::OnPremise))
        .expect("admission succeeds");

    let response = router::advance_handler(
        State(Arc::new(service)),
        Path(booking.id.0.clone()),
        axum::Json(AdvanceStatusRequest {
            target: RegistrationStatus::Approved,
            actor_role: ActorRole::Staff,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("approved"));
}

#[tokio::test]
async fn forbidden_transition_maps_to_unprocessable() {
    let (service, _, _) = build_service();
    let booking = service
        .request_booking(booking_request("A", march(15), at(9), VenueCategory::OnPremise))
        .expect("admission succeeds");

    let response = router::advance_handler(
        State(Arc::new(service)),
        Path(booking.id.0.clone()),
        axum::Json(AdvanceStatusRequest {
            target: RegistrationStatus::Approved,
            actor_role: ActorRole::Registrant,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_booking_maps_to_not_found() {
    let (service, _, _) = build_service();

    let response = router::advance_handler(
        State(Arc::new(service)),
        Path("bkg-missing".to_string()),
        axum::Json(AdvanceStatusRequest {
            target: RegistrationStatus::Approved,
            actor_role: ActorRole::Staff,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn release_route_returns_no_content() {
    let (service, _, _) = build_service();
    let booking = service
        .request_booking(booking_request("A", march(16), at(9), VenueCategory::OffPremise))
        .expect("admission succeeds");

    let response =
        router::release_handler(State(Arc::new(service)), Path(booking.id.0.clone())).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn calendar_route_lists_the_month() {
    let (service, _, _) = build_service();
    let router = scheduling_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/scheduling/calendar/2025/3?venue=off_premise")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["venue"], json!("off-premise"));
    assert_eq!(payload["days"].as_array().map(Vec::len), Some(31));
}

#[tokio::test]
async fn nonexistent_month_maps_to_bad_request() {
    let (service, _, _) = build_service();

    let response = router::calendar_handler(
        State(Arc::new(service)),
        Path((2025, 13)),
        Query(CalendarQuery {
            venue: VenueCategory::OnPremise,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn day_route_reports_slot_occupancy() {
    let (service, _, _) = build_service();
    service
        .request_booking(booking_request("A", march(17), at(9), VenueCategory::OffPremise))
        .expect("admission succeeds");
    let router = scheduling_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/scheduling/days/2025-03-17")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["slots"].as_array().map(Vec::len), Some(9));
}

#[tokio::test]
async fn malformed_date_maps_to_bad_request() {
    let (service, _, _) = build_service();

    let response = router::day_handler(State(Arc::new(service)), Path("17-03-2025".to_string())).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
