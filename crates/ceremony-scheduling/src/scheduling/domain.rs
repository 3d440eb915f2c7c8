use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registrations owned by the intake system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

/// Identifier wrapper for a registration's claim on a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the ceremony is held. The office hall takes a single couple per
/// slot; external venues share a wider allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueCategory {
    OnPremise,
    OffPremise,
}

impl VenueCategory {
    pub const fn ordered() -> [Self; 2] {
        [Self::OnPremise, Self::OffPremise]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OnPremise => "on-premise",
            Self::OffPremise => "off-premise",
        }
    }
}

impl fmt::Display for VenueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a registration. Mutated only through
/// [`super::RegistrationLifecycle`] transitions, never assigned directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Draft,
    Approved,
    AwaitingAssignment,
    OfficiantAssigned,
    Completed,
    Rejected,
}

impl RegistrationStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Draft,
            Self::Approved,
            Self::AwaitingAssignment,
            Self::OfficiantAssigned,
            Self::Completed,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::AwaitingAssignment => "awaiting_assignment",
            Self::OfficiantAssigned => "officiant_assigned",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Completed and rejected registrations admit no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller identity attached to booking and transition requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Registrant,
    Staff,
    Supervisor,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registrant => "registrant",
            Self::Staff => "staff",
            Self::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One registration's claim on one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub registration_id: RegistrationId,
    pub date: NaiveDate,
    pub slot: NaiveTime,
    pub category: VenueCategory,
    pub status: RegistrationStatus,
}

/// Intake payload for a new booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub registration_id: RegistrationId,
    pub date: NaiveDate,
    pub slot: NaiveTime,
    pub category: VenueCategory,
    pub actor_role: ActorRole,
}

/// Counted occupancy of one slot, split by venue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOccupancy {
    pub date: NaiveDate,
    pub slot: NaiveTime,
    pub on_premise: u8,
    pub off_premise: u8,
}

impl SlotOccupancy {
    pub const fn count_for(&self, category: VenueCategory) -> u8 {
        match category {
            VenueCategory::OnPremise => self.on_premise,
            VenueCategory::OffPremise => self.off_premise,
        }
    }

    pub const fn combined(&self) -> u8 {
        self.on_premise + self.off_premise
    }
}

/// Aggregate availability of a whole day for one venue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAvailability {
    Available,
    PartiallyAvailable,
    Full,
}

impl DayAvailability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::PartiallyAvailable => "partially_available",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for DayAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
