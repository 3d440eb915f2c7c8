use chrono::NaiveTime;

use super::domain::VenueCategory;

const DEFAULT_FIRST_HOUR: u32 = 8;
const DEFAULT_LAST_HOUR: u32 = 16;
const DEFAULT_ON_PREMISE_CAPACITY: u8 = 1;
const DEFAULT_OFF_PREMISE_CAPACITY: u8 = 3;
const DEFAULT_COMBINED_CAPACITY: u8 = 3;

/// Static structure of a bookable day: the hourly time points the office
/// accepts ceremonies at, and the capacity limit of each venue category.
///
/// Stateless and freely shared; every date exposes the same grid.
#[derive(Debug, Clone, Copy)]
pub struct SlotGrid {
    first_hour: u32,
    last_hour: u32,
    on_premise_capacity: u8,
    off_premise_capacity: u8,
    combined_capacity: u8,
}

impl SlotGrid {
    /// Grid with the office's published operating hours and limits:
    /// hourly points 08:00 through 16:00, one on-premise ceremony per slot,
    /// three off-premise, three combined.
    pub const fn office_hours() -> Self {
        Self {
            first_hour: DEFAULT_FIRST_HOUR,
            last_hour: DEFAULT_LAST_HOUR,
            on_premise_capacity: DEFAULT_ON_PREMISE_CAPACITY,
            off_premise_capacity: DEFAULT_OFF_PREMISE_CAPACITY,
            combined_capacity: DEFAULT_COMBINED_CAPACITY,
        }
    }

    /// Ordered hourly time points of one day. Finite and restartable.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        (self.first_hour..=self.last_hour)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect()
    }

    pub fn slot_count(&self) -> usize {
        (self.last_hour - self.first_hour + 1) as usize
    }

    /// A slot is legal only when it sits exactly on an operating hour.
    /// Off-hour times are invalid, not merely full.
    pub fn is_valid_slot(&self, slot: NaiveTime) -> bool {
        use chrono::Timelike;

        slot.minute() == 0
            && slot.second() == 0
            && slot.nanosecond() == 0
            && slot.hour() >= self.first_hour
            && slot.hour() <= self.last_hour
    }

    pub const fn capacity_for(&self, category: VenueCategory) -> u8 {
        match category {
            VenueCategory::OnPremise => self.on_premise_capacity,
            VenueCategory::OffPremise => self.off_premise_capacity,
        }
    }

    pub const fn combined_capacity(&self) -> u8 {
        self.combined_capacity
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::office_hours()
    }
}
