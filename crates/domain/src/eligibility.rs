// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility eligibility for a reporting period.
//!
//! Eligibility is **computed**, not stored. It is a pure function of the
//! facility configuration, the current period and the requested mode.

use crate::calendar::{PeriodClass, ReportingPeriod};
use crate::error::DomainError;
use crate::types::{Facility, FacilityPeriod};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How eligibility is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityMode {
    /// Period class must match the current period.
    #[default]
    Regular,
    /// Any HP-classified facility, regardless of the current period.
    Emergency,
}

impl EligibilityMode {
    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for EligibilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EligibilityMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "emergency" => Ok(Self::Emergency),
            _ => Err(DomainError::InvalidEligibilityMode(s.to_string())),
        }
    }
}

/// Decides whether a facility is in scope for the current period.
///
/// # Arguments
///
/// * `facility` - The facility configuration
/// * `current_period` - The active reporting period
/// * `mode` - Regular or Emergency evaluation
#[must_use]
pub fn is_eligible(
    facility: &Facility,
    current_period: &ReportingPeriod,
    mode: EligibilityMode,
) -> bool {
    if facility.route().is_none() {
        return false;
    }
    let Some(facility_period) = facility.period else {
        return false;
    };

    match mode {
        EligibilityMode::Emergency => true,
        EligibilityMode::Regular => match (facility_period, current_period.period_class()) {
            (FacilityPeriod::Monthly, _) => true,
            (FacilityPeriod::Even, Some(PeriodClass::Even))
            | (FacilityPeriod::Odd, Some(PeriodClass::Odd)) => true,
            (FacilityPeriod::Even | FacilityPeriod::Odd, _) => false,
        },
    }
}

/// Returns the eligible facilities, preserving input order.
#[must_use]
pub fn filter_eligible<'a>(
    facilities: &'a [Facility],
    current_period: &ReportingPeriod,
    mode: EligibilityMode,
) -> Vec<&'a Facility> {
    facilities
        .iter()
        .filter(|f| is_eligible(f, current_period, mode))
        .collect()
}
