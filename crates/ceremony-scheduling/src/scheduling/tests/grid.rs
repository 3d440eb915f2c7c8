use super::common::at;
use crate::scheduling::domain::VenueCategory;
use crate::scheduling::grid::SlotGrid;
use chrono::NaiveTime;

#[test]
fn office_hours_expose_nine_hourly_points() {
    let grid = SlotGrid::office_hours();
    let slots = grid.slot_times();

    assert_eq!(slots.len(), 9);
    assert_eq!(grid.slot_count(), 9);
    assert_eq!(slots.first().copied(), Some(at(8)));
    assert_eq!(slots.last().copied(), Some(at(16)));

    // Restartable: a second listing is identical.
    assert_eq!(grid.slot_times(), slots);
}

#[test]
fn only_on_the_hour_points_inside_operating_hours_are_valid() {
    let grid = SlotGrid::office_hours();

    for slot in grid.slot_times() {
        assert!(grid.is_valid_slot(slot), "{slot} should be bookable");
    }

    assert!(!grid.is_valid_slot(at(7)));
    assert!(!grid.is_valid_slot(at(17)));
    assert!(!grid.is_valid_slot(
        NaiveTime::from_hms_opt(9, 30, 0).expect("valid time")
    ));
    assert!(!grid.is_valid_slot(
        NaiveTime::from_hms_opt(9, 0, 1).expect("valid time")
    ));
}

#[test]
fn capacities_match_the_published_limits() {
    let grid = SlotGrid::office_hours();

    assert_eq!(grid.capacity_for(VenueCategory::OnPremise), 1);
    assert_eq!(grid.capacity_for(VenueCategory::OffPremise), 3);
    assert_eq!(grid.combined_capacity(), 3);
}
