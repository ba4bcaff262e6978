// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Process macro-status and the transition table.
//!
//! Every legal transition is listed in [`TRANSITIONS`] together with the
//! roles that own it and the precondition that must hold. Anything not in
//! the table is rejected. Preconditions that depend on surrounding state
//! (ODNs, route readiness, route assignment) are named here and evaluated
//! by the core `apply` function.

use crate::error::DomainError;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Macro-status of a facility's process for one reporting period.
///
/// Variants are declared in workflow order; `rank` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// O2C has started; ODNs may be added.
    O2cStarted,
    /// Returned to O2C for corrections; ODNs may be edited again.
    Completed,
    /// O2C finished, waiting for EWM.
    O2cCompleted,
    /// EWM finished; counts towards route readiness.
    EwmCompleted,
    /// PI requested a vehicle for the route.
    VehicleRequested,
    /// A vehicle has been assigned to the route.
    VehicleAssigned,
    /// Goods left the warehouse. Terminal.
    Dispatched,
}

impl ProcessStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 7] = [
        Self::O2cStarted,
        Self::Completed,
        Self::O2cCompleted,
        Self::EwmCompleted,
        Self::VehicleRequested,
        Self::VehicleAssigned,
        Self::Dispatched,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::O2cStarted => "o2c_started",
            Self::Completed => "completed",
            Self::O2cCompleted => "o2c_completed",
            Self::EwmCompleted => "ewm_completed",
            Self::VehicleRequested => "vehicle_requested",
            Self::VehicleAssigned => "vehicle_assigned",
            Self::Dispatched => "dispatched",
        }
    }

    /// Position of the status in the workflow.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::O2cStarted => 0,
            Self::Completed => 1,
            Self::O2cCompleted => 2,
            Self::EwmCompleted => 3,
            Self::VehicleRequested => 4,
            Self::VehicleAssigned => 5,
            Self::Dispatched => 6,
        }
    }

    /// Returns true if this status is at or beyond `stage`.
    #[must_use]
    pub const fn has_reached(&self, stage: Self) -> bool {
        self.rank() >= stage.rank()
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Dispatched)
    }

    /// Returns true while the O2C owner may add, edit and delete ODNs.
    #[must_use]
    pub const fn allows_odn_edits(&self) -> bool {
        matches!(self, Self::O2cStarted | Self::Completed)
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidProcessStatus {
                status: s.to_string(),
            })
    }
}

/// Stage whose officer is recorded when a transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    O2c,
    Ewm,
    Pi,
    Tm,
    Dispatch,
}

/// Precondition attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Nothing beyond role and source state.
    None,
    /// At least one ODN, or the caller accepts the "RRF not sent" sentinel.
    OdnsOrSentinel,
    /// Every facility on the route has reached EWM completion.
    RouteReady,
    /// A route assignment exists for the route and period.
    AssignmentExists,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Source status.
    pub from: ProcessStatus,
    /// Target status.
    pub to: ProcessStatus,
    /// Roles allowed to apply the transition.
    pub owners: &'static [Role],
    /// Only the officer who started O2C may apply the transition.
    pub owner_only: bool,
    /// Precondition evaluated against surrounding state.
    pub precondition: Precondition,
    /// Stage whose officer is recorded, if any.
    pub records: Option<Stage>,
    /// Action name used for audit events.
    pub action: &'static str,
}

/// The complete transition table.
pub const TRANSITIONS: [TransitionRule; 8] = [
    TransitionRule {
        from: ProcessStatus::O2cStarted,
        to: ProcessStatus::O2cCompleted,
        owners: &[Role::O2cOfficer],
        owner_only: true,
        precondition: Precondition::OdnsOrSentinel,
        records: None,
        action: "CompleteO2c",
    },
    TransitionRule {
        from: ProcessStatus::Completed,
        to: ProcessStatus::O2cCompleted,
        owners: &[Role::O2cOfficer],
        owner_only: true,
        precondition: Precondition::OdnsOrSentinel,
        records: None,
        action: "CompleteO2c",
    },
    TransitionRule {
        from: ProcessStatus::O2cCompleted,
        to: ProcessStatus::Completed,
        owners: &[Role::EwmOfficer, Role::DocumentationOfficer],
        owner_only: false,
        precondition: Precondition::None,
        records: None,
        action: "ReturnForCorrection",
    },
    TransitionRule {
        from: ProcessStatus::O2cCompleted,
        to: ProcessStatus::EwmCompleted,
        owners: &[Role::EwmOfficer],
        owner_only: false,
        precondition: Precondition::None,
        records: Some(Stage::Ewm),
        action: "CompleteEwm",
    },
    TransitionRule {
        from: ProcessStatus::EwmCompleted,
        to: ProcessStatus::O2cStarted,
        owners: &[Role::EwmOfficer],
        owner_only: false,
        precondition: Precondition::None,
        records: None,
        action: "RevertEwm",
    },
    TransitionRule {
        from: ProcessStatus::EwmCompleted,
        to: ProcessStatus::VehicleRequested,
        owners: &[Role::PiOfficer],
        owner_only: false,
        precondition: Precondition::RouteReady,
        records: Some(Stage::Pi),
        action: "RequestVehicle",
    },
    TransitionRule {
        from: ProcessStatus::VehicleRequested,
        to: ProcessStatus::VehicleAssigned,
        owners: &[Role::PiOfficer, Role::TmManager],
        owner_only: false,
        precondition: Precondition::AssignmentExists,
        records: Some(Stage::Tm),
        action: "AssignVehicle",
    },
    TransitionRule {
        from: ProcessStatus::VehicleAssigned,
        to: ProcessStatus::Dispatched,
        owners: &[Role::Dispatcher],
        owner_only: false,
        precondition: Precondition::None,
        records: Some(Stage::Dispatch),
        action: "Dispatch",
    },
];

/// Looks up the rule for a `(from, to)` pair.
#[must_use]
pub fn find_transition(from: ProcessStatus, to: ProcessStatus) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.to == to)
}

/// Validates that `role` may move a process from `from` to `to`.
///
/// Only the table and role ownership are checked here; owner identity and
/// state-dependent preconditions are checked by the caller.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if the pair is not in the table
/// or the role does not own it.
pub fn validate_transition(
    from: ProcessStatus,
    to: ProcessStatus,
    role: Role,
) -> Result<&'static TransitionRule, DomainError> {
    let Some(rule) = find_transition(from, to) else {
        return Err(DomainError::InvalidTransition {
            actor: role.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            reason: String::from("transition not permitted by process lifecycle rules"),
        });
    };

    if !rule.owners.contains(&role) {
        let owners: Vec<&str> = rule.owners.iter().map(Role::as_str).collect();
        return Err(DomainError::InvalidTransition {
            actor: role.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            reason: format!("transition is owned by {}", owners.join(" or ")),
        });
    }

    Ok(rule)
}
