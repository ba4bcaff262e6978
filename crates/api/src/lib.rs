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
    clippy::unwrap_used,
    clippy::expect_used
)]

//! API boundary for the ODN workflow.
//!
//! Callers supply an explicit actor and role with every request. This crate
//! authenticates the actor, loads state, runs the pure core inside a single
//! persistence transaction, and translates every lower-level error into an
//! [`ApiError`].

mod admin;
mod auth;
mod calendar;
mod csv_import;
mod error;
mod handlers;
mod request_response;
mod views;

#[cfg(test)]
mod tests;

pub use admin::{
    get_audit_trail, import_facilities_csv, list_deliverers, list_drivers, list_facilities,
    list_vehicles, preview_facilities_csv, register_deliverer, register_driver,
    register_facility, register_vehicle, update_facility_routing,
};
pub use auth::{AuthenticatedActor, AuthorizationService, authenticate};
pub use calendar::{
    DEFAULT_TIME_ZONE, compute_period, current_period, date_in_zone, parse_time_zone,
    today_in_zone,
};
pub use csv_import::{CsvFormatError, ParsedRow, parse_facility_csv};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    add_odn, advance, advance_route, correct_odn, create_route_assignment, delete_odn, edit_odn,
    list_eligible_facilities, list_route_assignments, list_route_readiness, revert_start,
    route_readiness, set_odn_status, start_process,
};
pub use request_response::{
    AddOdnRequest, AdvanceRequest, AdvanceRouteRequest, CorrectOdnRequest,
    CreateRouteAssignmentRequest, CsvImportRowResult, CsvImportRowStatus, CsvRowPreview,
    CsvRowStatus, DeleteOdnRequest, EditOdnRequest, ImportFacilitiesCsvRequest,
    ImportFacilitiesCsvResponse, PeriodInfo, PeriodRef, PreviewFacilitiesCsvRequest,
    PreviewFacilitiesCsvResponse, ProcessDetail, RegisterDelivererRequest, RegisterDriverRequest,
    RegisterFacilityRequest, RegisterVehicleRequest, RevertStartRequest, RevertStartResponse,
    SetOdnStatusRequest, StartProcessRequest, UpdateFacilityRoutingRequest, WorkUnit,
    WorkUnitKind, WorkflowAction,
};
pub use views::{apply, list_actionable};
