use serde::{Deserialize, Serialize};

use super::domain::{ActorRole, RegistrationId, RegistrationStatus};

/// Permission required to drive a particular lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Approve a submitted draft (staff).
    Approval,
    /// Assign an officiant to an approved registration (supervisor).
    Assignment,
    /// Advance, reject, or complete a registration under review.
    Review,
}

impl ActorRole {
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            ActorRole::Registrant => &[],
            ActorRole::Staff => &[Capability::Approval, Capability::Review],
            ActorRole::Supervisor => &[Capability::Assignment, Capability::Review],
        }
    }

    pub fn has_capability(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Outcome of a successful transition, handed to the ledger so counted-ness
/// can be re-evaluated, and to the notification publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub registration_id: RegistrationId,
    pub from: RegistrationStatus,
    pub to: RegistrationStatus,
}

/// Lifecycle rule violation. Permanent caller errors; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("transition {from} -> {to} is not defined for registrations")]
    InvalidTransition {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },
    #[error("role {role} may not perform transition {from} -> {to}")]
    RoleNotPermitted {
        role: ActorRole,
        from: RegistrationStatus,
        to: RegistrationStatus,
    },
}

/// The finite state machine governing registration statuses.
///
/// Draft -> Approved -> AwaitingAssignment -> OfficiantAssigned -> Completed,
/// with a terminal Rejected branch out of Draft and Approved.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationLifecycle;

impl RegistrationLifecycle {
    pub const fn allowed_targets(current: RegistrationStatus) -> &'static [RegistrationStatus] {
        match current {
            RegistrationStatus::Draft => {
                &[RegistrationStatus::Approved, RegistrationStatus::Rejected]
            }
            RegistrationStatus::Approved => &[
                RegistrationStatus::AwaitingAssignment,
                RegistrationStatus::Rejected,
            ],
            RegistrationStatus::AwaitingAssignment => &[RegistrationStatus::OfficiantAssigned],
            RegistrationStatus::OfficiantAssigned => &[RegistrationStatus::Completed],
            RegistrationStatus::Completed | RegistrationStatus::Rejected => &[],
        }
    }

    /// Capability gate for a transition present in the table. `None` means
    /// the pair is not a defined transition at all.
    pub fn required_capability(
        current: RegistrationStatus,
        target: RegistrationStatus,
    ) -> Option<Capability> {
        if !Self::allowed_targets(current).contains(&target) {
            return None;
        }

        let capability = match (current, target) {
            (RegistrationStatus::Draft, RegistrationStatus::Approved) => Capability::Approval,
            (RegistrationStatus::AwaitingAssignment, RegistrationStatus::OfficiantAssigned) => {
                Capability::Assignment
            }
            _ => Capability::Review,
        };

        Some(capability)
    }

    pub fn can_transition(
        current: RegistrationStatus,
        target: RegistrationStatus,
        role: ActorRole,
    ) -> bool {
        Self::required_capability(current, target)
            .map(|capability| role.has_capability(capability))
            .unwrap_or(false)
    }

    /// Validate and perform a transition, returning the change to apply to
    /// the ledger and to announce to the notification dispatcher.
    pub fn transition(
        registration_id: &RegistrationId,
        current: RegistrationStatus,
        target: RegistrationStatus,
        role: ActorRole,
    ) -> Result<StatusChange, LifecycleError> {
        let capability = Self::required_capability(current, target).ok_or(
            LifecycleError::InvalidTransition {
                from: current,
                to: target,
            },
        )?;

        if !role.has_capability(capability) {
            return Err(LifecycleError::RoleNotPermitted {
                role,
                from: current,
                to: target,
            });
        }

        Ok(StatusChange {
            registration_id: registration_id.clone(),
            from: current,
            to: target,
        })
    }
}
