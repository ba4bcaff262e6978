// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::process_status::ProcessStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A transition was attempted by the wrong role, from the wrong state,
    /// or with a failed precondition.
    InvalidTransition {
        /// The role that attempted the transition.
        actor: String,
        /// The state the unit was in.
        from: String,
        /// The requested target state or action.
        to: String,
        /// Which rule rejected the transition.
        reason: String,
    },
    /// The ODN number already exists within the process.
    DuplicateOdn {
        /// The duplicate ODN number.
        odn_number: String,
    },
    /// The ODN can no longer be changed because its process has moved on.
    OdnLocked {
        /// The ODN number.
        odn_number: String,
        /// The status of the parent process.
        process_status: ProcessStatus,
    },
    /// A non-confirmation was recorded without the mandatory reason.
    MissingReason,
    /// ODN number is empty or invalid.
    InvalidOdnNumber(String),
    /// POD number is empty or invalid.
    InvalidPodNumber(String),
    /// Arrival kilometer must not be negative.
    NegativeArrivalKilometer {
        /// The rejected value.
        value: i64,
    },
    /// Facility name is empty or invalid.
    InvalidFacilityName(String),
    /// Facility period class string is not recognised.
    InvalidFacilityPeriod(String),
    /// Process status string is not recognised.
    InvalidProcessStatus {
        /// The rejected status string.
        status: String,
    },
    /// Role string is not recognised.
    InvalidRole(String),
    /// Eligibility mode string is not recognised.
    InvalidEligibilityMode(String),
    /// ODN flag string is not recognised.
    InvalidOdnFlag(String),
    /// A month index outside `0..=12` was supplied.
    InvalidMonthIndex {
        /// The rejected index.
        index: u8,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// The facility is not eligible for the reporting period.
    FacilityNotEligible {
        /// The facility identifier.
        facility_id: i64,
        /// The reporting period key.
        period: String,
        /// The eligibility mode that was evaluated.
        mode: String,
    },
    /// An open process already exists for the facility and period.
    ProcessAlreadyOpen {
        /// The facility identifier.
        facility_id: i64,
        /// The reporting period key.
        period: String,
    },
    /// Some facilities on the route have not reached EWM completion.
    RouteNotReady {
        /// The route code.
        route: String,
        /// The reporting period key.
        period: String,
        /// Facilities still blocking the route.
        remaining: usize,
    },
    /// No route assignment exists for the route and period.
    AssignmentMissing {
        /// The route code.
        route: String,
        /// The reporting period key.
        period: String,
    },
    /// A route assignment already exists for the route and period.
    DuplicateAssignment {
        /// The route code.
        route: String,
        /// The reporting period key.
        period: String,
    },
    /// The ODN does not belong to the process.
    OdnNotFound {
        /// The ODN identifier.
        odn_id: i64,
    },
    /// A vehicle, driver or deliverer is flagged unavailable.
    ResourceUnavailable {
        /// The resource kind.
        resource: &'static str,
        /// The resource identifier.
        id: i64,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition {
                actor,
                from,
                to,
                reason,
            } => {
                write!(
                    f,
                    "Invalid transition by {actor} from '{from}' to '{to}': {reason}"
                )
            }
            Self::DuplicateOdn { odn_number } => {
                write!(f, "ODN '{odn_number}' already exists in this process")
            }
            Self::OdnLocked {
                odn_number,
                process_status,
            } => {
                write!(
                    f,
                    "ODN '{odn_number}' is locked: process is already {process_status}"
                )
            }
            Self::MissingReason => {
                write!(f, "A reason is required when POD is not confirmed")
            }
            Self::InvalidOdnNumber(msg) => write!(f, "Invalid ODN number: {msg}"),
            Self::InvalidPodNumber(msg) => write!(f, "Invalid POD number: {msg}"),
            Self::NegativeArrivalKilometer { value } => {
                write!(f, "Arrival kilometer must not be negative, got {value}")
            }
            Self::InvalidFacilityName(msg) => write!(f, "Invalid facility name: {msg}"),
            Self::InvalidFacilityPeriod(value) => {
                write!(
                    f,
                    "Invalid facility period '{value}': expected odd, even or monthly"
                )
            }
            Self::InvalidProcessStatus { status } => {
                write!(f, "Invalid process status: {status}")
            }
            Self::InvalidRole(value) => write!(f, "Invalid role: {value}"),
            Self::InvalidEligibilityMode(value) => {
                write!(
                    f,
                    "Invalid eligibility mode '{value}': expected regular or emergency"
                )
            }
            Self::InvalidOdnFlag(value) => write!(f, "Invalid ODN flag: {value}"),
            Self::InvalidMonthIndex { index } => {
                write!(f, "Invalid month index: {index}. Must be between 0 and 12")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::FacilityNotEligible {
                facility_id,
                period,
                mode,
            } => {
                write!(
                    f,
                    "Facility {facility_id} is not eligible for {period} in {mode} mode"
                )
            }
            Self::ProcessAlreadyOpen {
                facility_id,
                period,
            } => {
                write!(
                    f,
                    "Facility {facility_id} already has an open process for {period}"
                )
            }
            Self::RouteNotReady {
                route,
                period,
                remaining,
            } => {
                write!(
                    f,
                    "Route '{route}' is not ready for {period}: {remaining} facilities have not completed EWM"
                )
            }
            Self::AssignmentMissing { route, period } => {
                write!(
                    f,
                    "No vehicle has been assigned to route '{route}' for {period}"
                )
            }
            Self::DuplicateAssignment { route, period } => {
                write!(
                    f,
                    "Route '{route}' already has a vehicle assignment for {period}"
                )
            }
            Self::OdnNotFound { odn_id } => write!(f, "ODN {odn_id} not found in process"),
            Self::ResourceUnavailable { resource, id } => {
                write!(f, "{resource} {id} is not available")
            }
        }
    }
}

impl std::error::Error for DomainError {}
