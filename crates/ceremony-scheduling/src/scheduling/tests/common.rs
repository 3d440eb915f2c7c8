use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::scheduling::domain::{
    ActorRole, Booking, BookingRequest, RegistrationId, VenueCategory,
};
use crate::scheduling::ledger::{CapacityLedger, LedgerError};
use crate::scheduling::router::scheduling_router;
use crate::scheduling::service::{SchedulingError, SlotAllocationService};
use crate::scheduling::tests_support::{MemoryNotifications, MemoryRepository};
use crate::scheduling::SlotGrid;

pub(super) fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
}

pub(super) fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
}

pub(super) fn registration(suffix: &str) -> RegistrationId {
    RegistrationId(format!("REG-{suffix}"))
}

pub(super) fn booking_request(
    suffix: &str,
    date: NaiveDate,
    slot: NaiveTime,
    category: VenueCategory,
) -> BookingRequest {
    BookingRequest {
        registration_id: registration(suffix),
        date,
        slot,
        category,
        actor_role: ActorRole::Registrant,
    }
}

pub(super) fn build_ledger() -> CapacityLedger<MemoryRepository> {
    CapacityLedger::new(SlotGrid::office_hours(), Arc::new(MemoryRepository::default()))
}

pub(super) fn build_service() -> (
    SlotAllocationService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = SlotAllocationService::new(repository.clone(), notifications.clone());
    (service, repository, notifications)
}

/// Admit a booking, absorbing the bounded-retry `Busy` outcome that can
/// surface under heavy contention.
pub(super) fn admit_with_retry(
    ledger: &CapacityLedger<MemoryRepository>,
    suffix: &str,
    date: NaiveDate,
    slot: NaiveTime,
    category: VenueCategory,
) -> Result<Booking, LedgerError> {
    loop {
        match ledger.try_admit(registration(suffix), date, slot, category) {
            Err(LedgerError::Busy { .. }) => continue,
            other => return other,
        }
    }
}

pub(super) fn scheduling_router_with_service(
    service: SlotAllocationService<MemoryRepository, MemoryNotifications>,
) -> axum::Router {
    scheduling_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_category_full(result: Result<Booking, SchedulingError>) {
    match result {
        Err(SchedulingError::Ledger(LedgerError::CategoryFull { .. })) => {}
        other => panic!("expected category full, got {other:?}"),
    }
}
