use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;

use super::calendar::{AvailabilityCalendarBuilder, CalendarError, DaySummary};
use super::domain::{
    ActorRole, Booking, BookingId, BookingRequest, DayAvailability, RegistrationStatus,
    VenueCategory,
};
use super::grid::SlotGrid;
use super::ledger::{CapacityLedger, LedgerError};
use super::lifecycle::{LifecycleError, RegistrationLifecycle};
use super::repository::{
    BookingRepository, NotificationError, NotificationPublisher, StatusChangeEvent,
};

/// Façade composing the grid, lifecycle, ledger, and calendar builder.
/// Everything outside the engine talks to this type.
pub struct SlotAllocationService<R, N> {
    ledger: CapacityLedger<R>,
    notifications: Arc<N>,
}

impl<R, N> SlotAllocationService<R, N>
where
    R: BookingRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>) -> Self {
        Self::with_grid(SlotGrid::office_hours(), repository, notifications)
    }

    pub fn with_grid(grid: SlotGrid, repository: Arc<R>, notifications: Arc<N>) -> Self {
        Self {
            ledger: CapacityLedger::new(grid, repository),
            notifications,
        }
    }

    pub fn ledger(&self) -> &CapacityLedger<R> {
        &self.ledger
    }

    /// Admit a booking request. The slot must be a legal grid point and the
    /// venue-specific and combined caps must both leave room; the new
    /// booking starts in `Draft`, which already counts toward capacity.
    pub fn request_booking(&self, request: BookingRequest) -> Result<Booking, SchedulingError> {
        let BookingRequest {
            registration_id,
            date,
            slot,
            category,
            actor_role,
        } = request;

        let booking = self
            .ledger
            .try_admit(registration_id, date, slot, category)?;

        info!(
            booking_id = %booking.id,
            registration_id = %booking.registration_id,
            %date,
            %slot,
            %category,
            role = %actor_role,
            "booking admitted"
        );
        Ok(booking)
    }

    /// Drive a registration through one lifecycle transition, update the
    /// ledger's counted set, and announce the change to the notification
    /// dispatcher.
    pub fn advance_status(
        &self,
        booking_id: &BookingId,
        target: RegistrationStatus,
        actor_role: ActorRole,
    ) -> Result<Booking, SchedulingError> {
        let record = self.ledger.booking(booking_id)?;
        let change = RegistrationLifecycle::transition(
            &record.booking.registration_id,
            record.booking.status,
            target,
            actor_role,
        )?;

        let booking = self.ledger.update_status(booking_id, change.to)?;

        self.notifications.publish(StatusChangeEvent {
            registration_id: change.registration_id,
            booking_id: booking_id.clone(),
            old_status: change.from,
            new_status: change.to,
        })?;

        info!(%booking_id, from = %change.from, to = %change.to, role = %actor_role, "status advanced");
        Ok(booking)
    }

    /// Permanently withdraw a booking. Idempotent at the ledger.
    pub fn release_booking(&self, booking_id: &BookingId) -> Result<(), SchedulingError> {
        self.ledger.release(booking_id)?;
        Ok(())
    }

    pub fn day_availability(
        &self,
        date: NaiveDate,
        category: VenueCategory,
    ) -> Result<DayAvailability, SchedulingError> {
        let builder = AvailabilityCalendarBuilder::new(&self.ledger);
        builder
            .day_availability(date, category)
            .map_err(flatten_calendar)
    }

    /// Collected month view for calendar rendering.
    pub fn month_calendar(
        &self,
        year: i32,
        month: u32,
        category: VenueCategory,
    ) -> Result<Vec<DaySummary>, SchedulingError> {
        let builder = AvailabilityCalendarBuilder::new(&self.ledger);
        builder
            .month_calendar(year, month, category)
            .map_err(flatten_calendar)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(flatten_calendar)
    }

    /// Per-slot occupancy of both categories with remaining headroom, for
    /// intake forms re-rendering their choices after a rejection.
    pub fn daily_slots(&self, date: NaiveDate) -> Result<DayScheduleView, SchedulingError> {
        let grid = self.ledger.grid();
        let combined_capacity = grid.combined_capacity();
        let on_premise_capacity = grid.capacity_for(VenueCategory::OnPremise);
        let off_premise_capacity = grid.capacity_for(VenueCategory::OffPremise);

        let slots = self
            .ledger
            .day_occupancy(date)?
            .into_iter()
            .map(|occupancy| SlotOccupancyView {
                slot: occupancy.slot,
                on_premise: occupancy.on_premise,
                on_premise_remaining: on_premise_capacity.saturating_sub(occupancy.on_premise),
                off_premise: occupancy.off_premise,
                off_premise_remaining: off_premise_capacity.saturating_sub(occupancy.off_premise),
                combined_remaining: combined_capacity.saturating_sub(occupancy.combined()),
            })
            .collect();

        Ok(DayScheduleView { date, slots })
    }

    /// Verify that the slot counters of `date` agree with the stored
    /// bookings. Drift is a fatal invariant violation.
    pub fn audit_day(&self, date: NaiveDate) -> Result<(), SchedulingError> {
        self.ledger.audit(date)?;
        Ok(())
    }
}

/// Detail view of one day's slots for both venue categories.
#[derive(Debug, Clone, Serialize)]
pub struct DayScheduleView {
    pub date: NaiveDate,
    pub slots: Vec<SlotOccupancyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotOccupancyView {
    pub slot: NaiveTime,
    pub on_premise: u8,
    pub on_premise_remaining: u8,
    pub off_premise: u8,
    pub off_premise_remaining: u8,
    pub combined_remaining: u8,
}

/// Error raised by the allocation façade.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Calendar(CalendarError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// Ledger failures surfacing through the calendar keep their own kind so
/// callers map them (busy, repository outage) like any other ledger error.
fn flatten_calendar(error: CalendarError) -> SchedulingError {
    match error {
        CalendarError::Ledger(inner) => SchedulingError::Ledger(inner),
        other => SchedulingError::Calendar(other),
    }
}
