// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::calendar::ReportingPeriod;
use crate::eligibility::EligibilityMode;
use crate::error::DomainError;
use crate::process_status::{ProcessStatus, Stage};
use serde::{Deserialize, Serialize};

/// Period class configured on a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityPeriod {
    /// Served in odd months.
    Odd,
    /// Served in even months.
    Even,
    /// Served every month, including Pagume.
    Monthly,
}

impl FacilityPeriod {
    /// Returns the string representation of the period class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Monthly => "monthly",
        }
    }

    /// Parses an optional period class.
    ///
    /// Matching is case-insensitive; a blank value means "unset".
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFacilityPeriod` for any other value.
    pub fn parse_optional(value: &str) -> Result<Option<Self>, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "odd" => Ok(Some(Self::Odd)),
            "even" => Ok(Some(Self::Even)),
            "monthly" => Ok(Some(Self::Monthly)),
            _ => Err(DomainError::InvalidFacilityPeriod(value.to_string())),
        }
    }
}

impl std::fmt::Display for FacilityPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A physical delivery destination.
///
/// Facilities are never deleted; processes reference them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the facility has not been persisted yet.
    pub facility_id: Option<i64>,
    pub name: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    /// Assigned route code. Blank routes are stored as `None`.
    pub route: Option<String>,
    /// Configured period class.
    pub period: Option<FacilityPeriod>,
}

impl Facility {
    /// Creates a new, unpersisted facility.
    ///
    /// The route is trimmed and a blank route is normalized to `None`.
    #[must_use]
    pub fn new(
        name: &str,
        region: &str,
        zone: &str,
        woreda: &str,
        route: Option<&str>,
        period: Option<FacilityPeriod>,
    ) -> Self {
        Self {
            facility_id: None,
            name: name.trim().to_string(),
            region: region.trim().to_string(),
            zone: zone.trim().to_string(),
            woreda: woreda.trim().to_string(),
            route: normalize_route(route),
            period,
        }
    }

    /// Returns a copy of this facility carrying a persisted id.
    #[must_use]
    pub fn with_id(mut self, facility_id: i64) -> Self {
        self.facility_id = Some(facility_id);
        self
    }

    /// Returns the assigned route, if any.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// A facility is HP-classified when it has both a route and a period class.
    #[must_use]
    pub const fn is_hp_classified(&self) -> bool {
        self.route.is_some() && self.period.is_some()
    }
}

/// Trims a route code and maps blank codes to `None`.
#[must_use]
pub fn normalize_route(route: Option<&str>) -> Option<String> {
    route
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
}

/// Officer recorded per stage at the moment the stage was entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOfficers {
    pub o2c: Option<String>,
    pub ewm: Option<String>,
    pub pi: Option<String>,
    pub tm: Option<String>,
    pub dispatch: Option<String>,
}

impl StageOfficers {
    /// Returns the officer recorded for a stage.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::O2c => self.o2c.as_deref(),
            Stage::Ewm => self.ewm.as_deref(),
            Stage::Pi => self.pi.as_deref(),
            Stage::Tm => self.tm.as_deref(),
            Stage::Dispatch => self.dispatch.as_deref(),
        }
    }

    /// Records the officer for a stage, replacing any earlier one.
    pub fn record(&mut self, stage: Stage, actor_id: &str) {
        let slot: &mut Option<String> = match stage {
            Stage::O2c => &mut self.o2c,
            Stage::Ewm => &mut self.ewm,
            Stage::Pi => &mut self.pi,
            Stage::Tm => &mut self.tm,
            Stage::Dispatch => &mut self.dispatch,
        };
        *slot = Some(actor_id.to_string());
    }
}

/// One facility's work unit for one reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// `None` until persisted.
    pub process_id: Option<i64>,
    pub facility_id: i64,
    /// Route of the facility when the process was started.
    pub route: String,
    pub period: ReportingPeriod,
    pub mode: EligibilityMode,
    pub status: ProcessStatus,
    pub officers: StageOfficers,
    pub started_at: String,
    pub updated_at: String,
    /// Optimistic concurrency counter, incremented on every write.
    pub version: i64,
}

impl Process {
    /// Returns true if `actor_id` started O2C on this process.
    #[must_use]
    pub fn is_o2c_owner(&self, actor_id: &str) -> bool {
        self.officers.o2c.as_deref() == Some(actor_id)
    }
}

/// Vehicle, driver and optional deliverer bound to a route for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub assignment_id: Option<i64>,
    pub route: String,
    pub period: ReportingPeriod,
    pub vehicle_id: i64,
    pub driver_id: i64,
    pub deliverer_id: Option<i64>,
    pub assigned_by: String,
    pub created_at: String,
}

/// A vehicle available for route assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: Option<i64>,
    pub plate_number: String,
    pub description: Option<String>,
    pub is_available: bool,
}

/// A driver available for route assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub is_available: bool,
}

/// A deliverer who may accompany a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverer {
    pub deliverer_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub is_available: bool,
}
