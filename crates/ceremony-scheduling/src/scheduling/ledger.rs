use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use super::domain::{
    Booking, BookingId, RegistrationId, RegistrationStatus, SlotOccupancy, VenueCategory,
};
use super::grid::SlotGrid;
use super::policy::QuotaPolicy;
use super::repository::{BookingRecord, BookingRepository, RepositoryError};

const LOCK_ATTEMPTS: u32 = 3;
const LOCK_BACKOFF: Duration = Duration::from_millis(2);

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_booking_id() -> BookingId {
    let id = BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BookingId(format!("bkg-{id:06}"))
}

type SlotKey = (NaiveDate, NaiveTime);

/// Counted occupancy of one slot. Kept under the slot's own mutex so checks
/// and increments form a single critical section.
#[derive(Debug, Clone, Copy, Default)]
struct SlotCounters {
    on_premise: u8,
    off_premise: u8,
}

impl SlotCounters {
    const fn count_for(&self, category: VenueCategory) -> u8 {
        match category {
            VenueCategory::OnPremise => self.on_premise,
            VenueCategory::OffPremise => self.off_premise,
        }
    }

    const fn combined(&self) -> u8 {
        self.on_premise + self.off_premise
    }

    fn add(&mut self, category: VenueCategory) {
        match category {
            VenueCategory::OnPremise => self.on_premise += 1,
            VenueCategory::OffPremise => self.off_premise += 1,
        }
    }

    fn remove(&mut self, category: VenueCategory) {
        match category {
            VenueCategory::OnPremise => self.on_premise = self.on_premise.saturating_sub(1),
            VenueCategory::OffPremise => self.off_premise = self.off_premise.saturating_sub(1),
        }
    }
}

/// Error raised by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{slot} on {date} is not a bookable time point")]
    SlotInvalid { date: NaiveDate, slot: NaiveTime },
    #[error("{category} capacity exhausted at {slot} on {date}")]
    CategoryFull {
        date: NaiveDate,
        slot: NaiveTime,
        category: VenueCategory,
    },
    #[error("combined capacity exhausted at {slot} on {date}")]
    CombinedFull { date: NaiveDate, slot: NaiveTime },
    #[error("booking {booking_id} not found")]
    NotFound { booking_id: BookingId },
    #[error("slot {slot} on {date} is busy, retry later")]
    Busy { date: NaiveDate, slot: NaiveTime },
    #[error(
        "counter drift at {slot} on {date} for {category}: recorded {recorded}, counted {counted}"
    )]
    CounterDrift {
        date: NaiveDate,
        slot: NaiveTime,
        category: VenueCategory,
        recorded: u8,
        counted: u8,
    },
    #[error("slot state poisoned at {slot} on {date}")]
    Poisoned { date: NaiveDate, slot: NaiveTime },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Authoritative per-date, per-slot, per-category occupancy counts, and the
/// gatekeeper for admission.
///
/// Mutations to one slot are serialized behind that slot's mutex; unrelated
/// slots stay independent. Storage is injected so tests build a fresh
/// ledger per case.
pub struct CapacityLedger<R> {
    grid: SlotGrid,
    repository: Arc<R>,
    slots: Mutex<HashMap<SlotKey, Arc<Mutex<SlotCounters>>>>,
}

impl<R> CapacityLedger<R>
where
    R: BookingRepository,
{
    pub fn new(grid: SlotGrid, repository: Arc<R>) -> Self {
        Self {
            grid,
            repository,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Admit a new booking into `(date, slot)` if both the venue-specific
    /// and combined caps allow one more. Limits are inclusive: the request
    /// that exactly fills a cap is admitted, the next one is rejected.
    /// Either the booking is persisted and counted, or nothing changes.
    pub fn try_admit(
        &self,
        registration_id: RegistrationId,
        date: NaiveDate,
        slot: NaiveTime,
        category: VenueCategory,
    ) -> Result<Booking, LedgerError> {
        if !self.grid.is_valid_slot(slot) {
            return Err(LedgerError::SlotInvalid { date, slot });
        }

        let handle = self.slot_handle(date, slot);
        let mut counters = self.lock_slot(&handle, date, slot)?;

        if counters.count_for(category) + 1 > self.grid.capacity_for(category) {
            debug!(%registration_id, %date, %slot, %category, "admission rejected, category full");
            return Err(LedgerError::CategoryFull {
                date,
                slot,
                category,
            });
        }
        if counters.combined() + 1 > self.grid.combined_capacity() {
            debug!(%registration_id, %date, %slot, %category, "admission rejected, combined full");
            return Err(LedgerError::CombinedFull { date, slot });
        }

        let booking = Booking {
            id: next_booking_id(),
            registration_id,
            date,
            slot,
            category,
            status: RegistrationStatus::Draft,
        };

        // Persist before counting: a failed insert must leave the counters
        // untouched, and the slot mutex is still held either way.
        self.repository.insert(BookingRecord::active(booking.clone()))?;
        counters.add(category);

        debug!(booking_id = %booking.id, %date, %slot, %category, "booking admitted");
        Ok(booking)
    }

    /// Remove a booking's contribution from its slot and archive the record.
    /// Idempotent: releasing an already-released booking is a no-op.
    pub fn release(&self, booking_id: &BookingId) -> Result<(), LedgerError> {
        let record = self.booking(booking_id)?;
        let (date, slot) = (record.booking.date, record.booking.slot);

        let handle = self.slot_handle(date, slot);
        let mut counters = self.lock_slot(&handle, date, slot)?;

        // Re-read under the slot lock; a concurrent release may have won.
        let mut record = self.booking(booking_id)?;
        if record.released {
            return Ok(());
        }

        record.released = true;
        self.repository.update(record.clone())?;
        if QuotaPolicy::is_counted(record.booking.status) {
            counters.remove(record.booking.category);
        }

        debug!(%booking_id, %date, %slot, "booking released");
        Ok(())
    }

    /// Apply a status change decided by the lifecycle. When the booking's
    /// counted-ness flips, the slot counters are adjusted in the same
    /// critical section; a booking never double-counts.
    pub fn update_status(
        &self,
        booking_id: &BookingId,
        new_status: RegistrationStatus,
    ) -> Result<Booking, LedgerError> {
        let record = self.booking(booking_id)?;
        let (date, slot) = (record.booking.date, record.booking.slot);

        let handle = self.slot_handle(date, slot);
        let mut counters = self.lock_slot(&handle, date, slot)?;

        let mut record = self.booking(booking_id)?;
        if record.released {
            // Withdrawn bookings are archive-only.
            return Err(LedgerError::NotFound {
                booking_id: booking_id.clone(),
            });
        }

        let counted_before = QuotaPolicy::is_counted(record.booking.status);
        let counted_after = QuotaPolicy::is_counted(new_status);

        record.booking.status = new_status;
        self.repository.update(record.clone())?;

        match (counted_before, counted_after) {
            (true, false) => counters.remove(record.booking.category),
            (false, true) => counters.add(record.booking.category),
            _ => {}
        }

        Ok(record.booking)
    }

    /// Read-only snapshot of one slot's counted occupancy.
    pub fn occupancy_of(
        &self,
        date: NaiveDate,
        slot: NaiveTime,
    ) -> Result<SlotOccupancy, LedgerError> {
        if !self.grid.is_valid_slot(slot) {
            return Err(LedgerError::SlotInvalid { date, slot });
        }

        let handle = self.slot_handle(date, slot);
        let counters = self.lock_slot(&handle, date, slot)?;

        Ok(SlotOccupancy {
            date,
            slot,
            on_premise: counters.on_premise,
            off_premise: counters.off_premise,
        })
    }

    /// Occupancy snapshots for every slot of a day, in grid order.
    pub fn day_occupancy(&self, date: NaiveDate) -> Result<Vec<SlotOccupancy>, LedgerError> {
        self.grid
            .slot_times()
            .into_iter()
            .map(|slot| self.occupancy_of(date, slot))
            .collect()
    }

    /// Fetch a booking record, mapping an unknown id to `NotFound`.
    pub fn booking(&self, booking_id: &BookingId) -> Result<BookingRecord, LedgerError> {
        self.repository
            .fetch(booking_id)?
            .ok_or_else(|| LedgerError::NotFound {
                booking_id: booking_id.clone(),
            })
    }

    /// Compare every slot counter of `date` against the counted bookings in
    /// the repository. Drift means the ledger state is corrupt and must not
    /// be silently tolerated.
    pub fn audit(&self, date: NaiveDate) -> Result<(), LedgerError> {
        for slot in self.grid.slot_times() {
            let handle = self.slot_handle(date, slot);
            let counters = self.lock_slot(&handle, date, slot)?;

            let records = self.repository.list_slot(date, slot)?;
            for category in VenueCategory::ordered() {
                let counted = records
                    .iter()
                    .filter(|record| {
                        !record.released
                            && record.booking.category == category
                            && QuotaPolicy::is_counted(record.booking.status)
                    })
                    .count() as u8;
                let recorded = counters.count_for(category);

                if counted != recorded {
                    warn!(%date, %slot, %category, recorded, counted, "ledger counter drift");
                    return Err(LedgerError::CounterDrift {
                        date,
                        slot,
                        category,
                        recorded,
                        counted,
                    });
                }
            }
        }

        Ok(())
    }

    fn slot_handle(&self, date: NaiveDate, slot: NaiveTime) -> Arc<Mutex<SlotCounters>> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| {
            // The outer map only grows; the entries themselves carry no
            // invariant, so recover the map rather than wedging every slot.
            poisoned.into_inner()
        });
        slots.entry((date, slot)).or_default().clone()
    }

    fn lock_slot<'a>(
        &self,
        handle: &'a Mutex<SlotCounters>,
        date: NaiveDate,
        slot: NaiveTime,
    ) -> Result<MutexGuard<'a, SlotCounters>, LedgerError> {
        for attempt in 1..=LOCK_ATTEMPTS {
            match handle.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(LedgerError::Poisoned { date, slot });
                }
                Err(TryLockError::WouldBlock) if attempt < LOCK_ATTEMPTS => {
                    thread::sleep(LOCK_BACKOFF * attempt);
                }
                Err(TryLockError::WouldBlock) => break,
            }
        }

        Err(LedgerError::Busy { date, slot })
    }
}
