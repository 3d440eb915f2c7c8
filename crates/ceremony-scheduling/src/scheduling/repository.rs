use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::domain::{Booking, BookingId, RegistrationId, RegistrationStatus};

/// Persisted booking row. `released` marks a permanently withdrawn claim;
/// the record is kept for the archive but never counts again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking: Booking,
    pub released: bool,
}

impl BookingRecord {
    pub fn active(booking: Booking) -> Self {
        Self {
            booking,
            released: false,
        }
    }

    pub fn status_view(&self) -> BookingStatusView {
        BookingStatusView {
            booking_id: self.booking.id.clone(),
            registration_id: self.booking.registration_id.clone(),
            date: self.booking.date,
            slot: self.booking.slot,
            venue: self.booking.category.label(),
            status: self.booking.status.label(),
            released: self.released,
        }
    }
}

/// Storage abstraction so the ledger can be exercised against in-memory
/// fakes in tests and a real store in the service binary. Implementations
/// must index records by `(date, slot)` for occupancy scans.
pub trait BookingRepository: Send + Sync {
    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError>;
    fn update(&self, record: BookingRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError>;
    fn list_slot(
        &self,
        date: NaiveDate,
        slot: NaiveTime,
    ) -> Result<Vec<BookingRecord>, RepositoryError>;
    fn list_day(&self, date: NaiveDate) -> Result<Vec<BookingRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a booking for this registration already exists")]
    Conflict,
    #[error("booking record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Side-channel event emitted after a successful status transition. The
/// engine never formats or delivers notifications itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub registration_id: RegistrationId,
    pub booking_id: BookingId,
    pub old_status: RegistrationStatus,
    pub new_status: RegistrationStatus,
}

/// Trait describing the outbound notification hook (SMS/e-mail dispatcher).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, event: StatusChangeEvent) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Serialized representation of a booking's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusView {
    pub booking_id: BookingId,
    pub registration_id: RegistrationId,
    pub date: NaiveDate,
    pub slot: NaiveTime,
    pub venue: &'static str,
    pub status: &'static str,
    pub released: bool,
}
