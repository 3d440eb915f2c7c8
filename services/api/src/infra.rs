use ceremony_scheduling::scheduling::{
    BookingId, BookingRecord, BookingRepository, NotificationError, NotificationPublisher,
    RepositoryError, StatusChangeEvent, VenueCategory,
};
use chrono::{NaiveDate, NaiveTime};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Booking store used until the office database adapter lands. One active
/// booking per registration; withdrawn records stay for the archive.
#[derive(Default)]
pub(crate) struct InMemoryBookingRepository {
    records: Mutex<HashMap<BookingId, BookingRecord>>,
}

impl BookingRepository for InMemoryBookingRepository {
    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.booking.id) {
            return Err(RepositoryError::Conflict);
        }
        let duplicate_registration = guard.values().any(|existing| {
            !existing.released
                && existing.booking.registration_id == record.booking.registration_id
        });
        if duplicate_registration {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.booking.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: BookingRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.booking.id) {
            guard.insert(record.booking.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_slot(
        &self,
        date: NaiveDate,
        slot: NaiveTime,
    ) -> Result<Vec<BookingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.booking.date == date && record.booking.slot == slot)
            .cloned()
            .collect())
    }

    fn list_day(&self, date: NaiveDate) -> Result<Vec<BookingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.booking.date == date)
            .cloned()
            .collect())
    }
}

/// Hands status-change events to the notification dispatcher's queue. The
/// engine never formats messages; this adapter only records the handoff.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationDispatcher {
    events: Arc<Mutex<Vec<StatusChangeEvent>>>,
}

impl LoggingNotificationDispatcher {
    pub(crate) fn events(&self) -> Vec<StatusChangeEvent> {
        self.events.lock().expect("dispatcher mutex poisoned").clone()
    }
}

impl NotificationPublisher for LoggingNotificationDispatcher {
    fn publish(&self, event: StatusChangeEvent) -> Result<(), NotificationError> {
        info!(
            registration_id = %event.registration_id,
            booking_id = %event.booking_id,
            from = %event.old_status,
            to = %event.new_status,
            "status change queued for notification"
        );
        self.events
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_venue(raw: &str) -> Result<VenueCategory, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "on_premise" => Ok(VenueCategory::OnPremise),
        "off_premise" => Ok(VenueCategory::OffPremise),
        other => Err(format!("'{other}' is not a venue (on-premise | off-premise)")),
    }
}
