//! Slot capacity allocation engine for marriage ceremony scheduling.
//!
//! The `scheduling` module owns the bookable slot grid, the registration
//! lifecycle, and the capacity ledger that admits or rejects bookings. The
//! surrounding intake forms, approval dashboards, and notification senders
//! are external callers of [`scheduling::SlotAllocationService`].

pub mod config;
pub mod error;
pub mod importer;
pub mod scheduling;
pub mod telemetry;

pub use error::AppError;
pub use scheduling::{
    AvailabilityCalendarBuilder, Booking, BookingRequest, CapacityLedger, DayAvailability,
    QuotaPolicy, RegistrationLifecycle, RegistrationStatus, SlotAllocationService, SlotGrid,
    VenueCategory,
};
