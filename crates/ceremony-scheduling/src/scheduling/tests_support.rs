//! In-memory fakes shared by the engine's unit tests and the importer
//! tests. Mirrors the adapters the service binary wires in production.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

use super::repository::{
    BookingRecord, BookingRepository, NotificationError, NotificationPublisher, RepositoryError,
    StatusChangeEvent,
};
use crate::scheduling::domain::BookingId;

#[derive(Default)]
pub(crate) struct MemoryRepository {
    records: Mutex<HashMap<BookingId, BookingRecord>>,
}

impl BookingRepository for MemoryRepository {
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

#[derive(Default, Clone)]
pub(crate) struct MemoryNotifications {
    events: Arc<Mutex<Vec<StatusChangeEvent>>>,
}

impl MemoryNotifications {
    pub(crate) fn events(&self) -> Vec<StatusChangeEvent> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, event: StatusChangeEvent) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Repository that refuses every write, for exercising failure paths.
pub(crate) struct UnavailableRepository;

impl BookingRepository for UnavailableRepository {
    fn insert(&self, _record: BookingRecord) -> Result<BookingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: BookingRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_slot(
        &self,
        _date: NaiveDate,
        _slot: NaiveTime,
    ) -> Result<Vec<BookingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_day(&self, _date: NaiveDate) -> Result<Vec<BookingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
