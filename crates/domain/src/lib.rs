// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod eligibility;
mod error;
mod odn;
mod process_status;
mod role;
mod route;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use calendar::{
    MONTH_NAMES, PAGUME_INDEX, PeriodClass, ReportingPeriod, is_gregorian_leap_year,
    new_year_date, to_reporting_period,
};
pub use eligibility::{EligibilityMode, filter_eligible, is_eligible};
pub use odn::{
    CorrectableFlag, FlagStamp, Odn, OdnStatusUpdate, PodOutcome, PodRecord, QualityRecord,
    RRF_NOT_SENT, normalize_odn_number, validate_odn_unique, validate_pod_outcome,
};
pub use process_status::{
    Precondition, ProcessStatus, Stage, TRANSITIONS, TransitionRule, find_transition,
    validate_transition,
};
pub use role::Role;
pub use route::{RouteReadiness, evaluate_route_readiness};

// Re-export public types
pub use error::DomainError;
pub use types::{
    Deliverer, Driver, Facility, FacilityPeriod, Process, RouteAssignment, StageOfficers, Vehicle,
    normalize_route,
};
pub use validation::{
    normalize_optional_text, validate_facility_fields, validate_facility_names_unique,
};
