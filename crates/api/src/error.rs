// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use odn_flow::CoreError;
use odn_flow_domain::DomainError;
use odn_flow_persistence::PersistenceError;

use crate::csv_import::CsvFormatError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The supplied actor could not be accepted.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and form the
/// contract seen by callers. Every variant is recoverable: a failed operation
/// leaves stored state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The role does not own the transition, the process is in the wrong
    /// state, or a precondition does not hold.
    InvalidTransition {
        /// A human-readable description naming the actor, state and rule.
        message: String,
    },
    /// The ODN number already exists in the process.
    DuplicateOdn {
        /// The duplicate ODN number.
        odn_number: String,
    },
    /// The route already has an assignment for the period.
    DuplicateAssignment {
        /// The route code.
        route: String,
        /// The reporting period key.
        period: String,
    },
    /// The ODN can no longer be edited.
    OdnLocked {
        /// The ODN number.
        odn_number: String,
        /// The status of the parent process.
        process_status: String,
    },
    /// A POD non-confirmation was submitted without a reason.
    MissingReason,
    /// The row changed since the caller read it.
    StaleWrite {
        /// The kind of row.
        entity: String,
        /// The row identifier.
        id: i64,
        /// The version the caller expected.
        expected_version: i64,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The actor could not be accepted.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role may not perform an administrative operation.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns a stable machine-readable name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DuplicateOdn { .. } => "duplicate_odn",
            Self::DuplicateAssignment { .. } => "duplicate_assignment",
            Self::OdnLocked { .. } => "odn_locked",
            Self::MissingReason => "missing_reason",
            Self::StaleWrite { .. } => "stale_write",
            Self::NotFound { .. } => "not_found",
            Self::InvalidInput { .. } => "invalid_input",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { message } => write!(f, "{message}"),
            Self::DuplicateOdn { odn_number } => {
                write!(f, "ODN '{odn_number}' already exists in this process")
            }
            Self::DuplicateAssignment { route, period } => {
                write!(f, "Route '{route}' already has a vehicle assignment for {period}")
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
            Self::StaleWrite {
                entity,
                id,
                expected_version,
            } => {
                write!(
                    f,
                    "{entity} {id} was modified by someone else (expected version {expected_version})"
                )
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<CsvFormatError> for ApiError {
    fn from(err: CsvFormatError) -> Self {
        Self::InvalidInput {
            field: String::from("csv_content"),
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(message) => Self::NotFound {
                resource_type: String::from("Record"),
                message,
            },
            PersistenceError::StaleWrite {
                entity,
                id,
                expected_version,
            } => Self::StaleWrite {
                entity: entity.to_string(),
                id,
                expected_version,
            },
            PersistenceError::DuplicateAssignment { route, period } => {
                Self::DuplicateAssignment { route, period }
            }
            PersistenceError::DuplicateOdn { odn_number } => Self::DuplicateOdn { odn_number },
            PersistenceError::ProcessAlreadyOpen {
                facility_id,
                period,
            } => translate_domain_error(DomainError::ProcessAlreadyOpen {
                facility_id,
                period,
            }),
            PersistenceError::DuplicatePlateNumber { plate_number } => Self::InvalidInput {
                field: String::from("plate_number"),
                message: format!("Vehicle with plate '{plate_number}' is already registered"),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTransition { .. }
        | DomainError::FacilityNotEligible { .. }
        | DomainError::ProcessAlreadyOpen { .. }
        | DomainError::RouteNotReady { .. }
        | DomainError::AssignmentMissing { .. }
        | DomainError::ResourceUnavailable { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
        DomainError::DuplicateOdn { odn_number } => ApiError::DuplicateOdn { odn_number },
        DomainError::OdnLocked {
            odn_number,
            process_status,
        } => ApiError::OdnLocked {
            odn_number,
            process_status: process_status.to_string(),
        },
        DomainError::MissingReason => ApiError::MissingReason,
        DomainError::DuplicateAssignment { route, period } => {
            ApiError::DuplicateAssignment { route, period }
        }
        DomainError::OdnNotFound { odn_id } => ApiError::NotFound {
            resource_type: String::from("ODN"),
            message: format!("ODN {odn_id} does not exist in the process"),
        },
        DomainError::InvalidOdnNumber(_) => invalid_input("odn_number", &err),
        DomainError::InvalidPodNumber(_) => invalid_input("pod_number", &err),
        DomainError::NegativeArrivalKilometer { .. } => invalid_input("arrival_kilometer", &err),
        DomainError::InvalidFacilityName(_) => invalid_input("name", &err),
        DomainError::InvalidFacilityPeriod(_) => invalid_input("period", &err),
        DomainError::InvalidProcessStatus { .. } => invalid_input("status", &err),
        DomainError::InvalidRole(_) => invalid_input("role", &err),
        DomainError::InvalidEligibilityMode(_) => invalid_input("mode", &err),
        DomainError::InvalidOdnFlag(_) => invalid_input("flag", &err),
        DomainError::InvalidMonthIndex { .. } => invalid_input("month_index", &err),
        DomainError::DateArithmeticOverflow { .. } => invalid_input("date", &err),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Internal(msg) => ApiError::Internal { message: msg },
    }
}
