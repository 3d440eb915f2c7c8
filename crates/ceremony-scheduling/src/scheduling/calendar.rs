use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::{DayAvailability, SlotOccupancy, VenueCategory};
use super::ledger::{CapacityLedger, LedgerError};
use super::repository::BookingRepository;

/// One day of the month calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub availability: DayAvailability,
}

/// Error raised when a calendar request names a month that does not exist.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("{year}-{month:02} is not a calendar month")]
    InvalidMonth { year: i32, month: u32 },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Derives day- and month-level availability from ledger snapshots for
/// calendar rendering. Never mutates ledger state; safe to call while
/// admissions are in flight.
pub struct AvailabilityCalendarBuilder<'a, R> {
    ledger: &'a CapacityLedger<R>,
}

impl<'a, R> AvailabilityCalendarBuilder<'a, R>
where
    R: BookingRepository,
{
    pub fn new(ledger: &'a CapacityLedger<R>) -> Self {
        Self { ledger }
    }

    /// Classify a whole day for one venue category: `Full` only when every
    /// slot is blocked for that category, `Available` when none are.
    pub fn day_availability(
        &self,
        date: NaiveDate,
        category: VenueCategory,
    ) -> Result<DayAvailability, CalendarError> {
        let occupancies = self.ledger.day_occupancy(date)?;
        let blocked = occupancies
            .iter()
            .filter(|occupancy| self.is_blocked(occupancy, category))
            .count();

        let availability = if blocked == occupancies.len() {
            DayAvailability::Full
        } else if blocked == 0 {
            DayAvailability::Available
        } else {
            DayAvailability::PartiallyAvailable
        };

        Ok(availability)
    }

    /// Lazy month view, produced one day at a time so unrendered months are
    /// never materialized.
    pub fn month_calendar(
        &self,
        year: i32,
        month: u32,
        category: VenueCategory,
    ) -> Result<MonthCalendar<'a, '_, R>, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;

        Ok(MonthCalendar {
            builder: self,
            cursor: Some(first),
            month,
            category,
        })
    }

    /// A slot blocks a category when the category's own cap or the combined
    /// cap leaves no room for one more booking.
    fn is_blocked(&self, occupancy: &SlotOccupancy, category: VenueCategory) -> bool {
        let grid = self.ledger.grid();
        occupancy.count_for(category) >= grid.capacity_for(category)
            || occupancy.combined() >= grid.combined_capacity()
    }
}

/// Iterator over `(date, availability)` for one month.
pub struct MonthCalendar<'a, 'b, R> {
    builder: &'b AvailabilityCalendarBuilder<'a, R>,
    cursor: Option<NaiveDate>,
    month: u32,
    category: VenueCategory,
}

impl<R> Iterator for MonthCalendar<'_, '_, R>
where
    R: BookingRepository,
{
    type Item = Result<DaySummary, CalendarError>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.cursor?;
        if date.month() != self.month {
            self.cursor = None;
            return None;
        }

        self.cursor = date.succ_opt();

        let category = self.category;
        Some(
            self.builder
                .day_availability(date, category)
                .map(|availability| DaySummary { date, availability }),
        )
    }
}
