//! Slot capacity allocation engine.
//!
//! The grid defines the finite set of bookable time points, the quota
//! policy decides which registration statuses still occupy capacity, the
//! lifecycle governs status transitions, and the ledger admits or rejects
//! bookings under the per-category and combined caps. The calendar builder
//! derives day- and month-level availability from ledger snapshots, and the
//! allocation service is the façade the rest of the application calls.

pub mod calendar;
pub mod domain;
pub mod grid;
pub mod ledger;
pub mod lifecycle;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;
#[cfg(test)]
pub(crate) mod tests_support;

pub use calendar::{AvailabilityCalendarBuilder, CalendarError, DaySummary, MonthCalendar};
pub use domain::{
    ActorRole, Booking, BookingId, BookingRequest, DayAvailability, RegistrationId,
    RegistrationStatus, SlotOccupancy, VenueCategory,
};
pub use grid::SlotGrid;
pub use ledger::{CapacityLedger, LedgerError};
pub use lifecycle::{Capability, LifecycleError, RegistrationLifecycle, StatusChange};
pub use policy::QuotaPolicy;
pub use repository::{
    BookingRecord, BookingRepository, BookingStatusView, NotificationError, NotificationPublisher,
    RepositoryError, StatusChangeEvent,
};
pub use router::scheduling_router;
pub use service::{DayScheduleView, SchedulingError, SlotAllocationService, SlotOccupancyView};
