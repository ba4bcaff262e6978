// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Officer roles.
///
/// Each role owns a single stage of the workflow. Roles are always passed
/// explicitly by the caller; nothing in the workflow reads ambient session
/// state to decide who is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Starts processes, maintains ODNs, completes O2C.
    O2cOfficer,
    /// Completes or reverts EWM, returns processes for correction.
    EwmOfficer,
    /// Requests vehicles once a route is ready.
    PiOfficer,
    /// Assigns vehicles, drivers and deliverers to routes.
    TmManager,
    /// Marks assigned processes as dispatched.
    Dispatcher,
    /// Records proof of delivery, may return processes for correction.
    DocumentationOfficer,
    /// Tracks document signing and handover.
    DocumentFollower,
    /// Records quality evaluation.
    QualityOfficer,
    /// Registers facilities and resources, corrects ODN flags.
    Admin,
}

impl Role {
    /// Every role, in stage order.
    pub const ALL: [Self; 9] = [
        Self::O2cOfficer,
        Self::EwmOfficer,
        Self::PiOfficer,
        Self::TmManager,
        Self::Dispatcher,
        Self::DocumentationOfficer,
        Self::DocumentFollower,
        Self::QualityOfficer,
        Self::Admin,
    ];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::O2cOfficer => "o2c_officer",
            Self::EwmOfficer => "ewm_officer",
            Self::PiOfficer => "pi_officer",
            Self::TmManager => "tm_manager",
            Self::Dispatcher => "dispatcher",
            Self::DocumentationOfficer => "documentation_officer",
            Self::DocumentFollower => "document_follower",
            Self::QualityOfficer => "quality_officer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}
