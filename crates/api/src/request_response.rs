// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use odn_flow_domain::{
    CorrectableFlag, EligibilityMode, Facility, Odn, OdnStatusUpdate, PeriodClass, Process,
    ProcessStatus, ReportingPeriod,
};

use crate::error::{ApiError, translate_domain_error};

/// A reporting period as sent by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PeriodRef {
    /// Organization calendar year.
    pub year: i32,
    /// Zero-based month index (0..=12).
    pub month_index: u8,
}

impl PeriodRef {
    /// Validates the reference and returns the period.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the month index is out of range.
    pub fn resolve(&self) -> Result<ReportingPeriod, ApiError> {
        ReportingPeriod::from_parts(self.year, self.month_index).map_err(translate_domain_error)
    }
}

impl From<ReportingPeriod> for PeriodRef {
    fn from(period: ReportingPeriod) -> Self {
        Self {
            year: period.year(),
            month_index: period.month_index(),
        }
    }
}

/// A reporting period with its derived labels.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PeriodInfo {
    pub year: i32,
    pub month_index: u8,
    pub month_name: String,
    /// `None` for the thirteenth month.
    pub period_class: Option<PeriodClass>,
    /// Display key, e.g. `2017-Meskerem`.
    pub key: String,
}

impl From<ReportingPeriod> for PeriodInfo {
    fn from(period: ReportingPeriod) -> Self {
        Self {
            year: period.year(),
            month_index: period.month_index(),
            month_name: period.month_name().to_string(),
            period_class: period.period_class(),
            key: period.key(),
        }
    }
}

// ============================================================================
// Processes
// ============================================================================

/// API request to start O2C for a facility.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StartProcessRequest {
    pub facility_id: i64,
    pub period: PeriodRef,
    #[serde(default)]
    pub mode: EligibilityMode,
}

/// API request to move a process to another status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdvanceRequest {
    pub process_id: i64,
    pub target: ProcessStatus,
    /// Version the caller last saw; a mismatch is rejected as stale.
    #[serde(default)]
    pub expected_version: Option<i64>,
    /// Seed the "RRF not sent" ODN when completing O2C with no ODNs.
    #[serde(default)]
    pub accept_rrf_not_sent: bool,
}

/// API request to move every matching process on a route at once.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdvanceRouteRequest {
    pub route: String,
    pub period: PeriodRef,
    pub target: ProcessStatus,
}

/// API request to undo a start that has no ODNs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevertStartRequest {
    pub process_id: i64,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// API response for a reverted start.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevertStartResponse {
    pub facility_id: i64,
    pub process_id: i64,
    pub period: PeriodInfo,
    pub message: String,
}

/// A process with its facility and ODNs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessDetail {
    pub facility: Facility,
    pub process: Process,
    pub odns: Vec<Odn>,
}

// ============================================================================
// ODNs
// ============================================================================

/// API request to add an ODN to a process.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddOdnRequest {
    pub process_id: i64,
    pub odn_number: String,
}

/// API request to rename an ODN.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EditOdnRequest {
    pub odn_id: i64,
    pub odn_number: String,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// API request to delete an ODN.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteOdnRequest {
    pub odn_id: i64,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// API request to set one ODN sub-status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetOdnStatusRequest {
    pub odn_id: i64,
    pub update: OdnStatusUpdate,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// API request to clear a confirmed ODN flag.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CorrectOdnRequest {
    pub odn_id: i64,
    pub flag: CorrectableFlag,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

// ============================================================================
// Routes
// ============================================================================

/// API request to bind a vehicle, driver and optional deliverer to a route.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateRouteAssignmentRequest {
    pub route: String,
    pub period: PeriodRef,
    pub vehicle_id: i64,
    pub driver_id: i64,
    #[serde(default)]
    pub deliverer_id: Option<i64>,
}

// ============================================================================
// Role views
// ============================================================================

/// What a work unit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkUnitKind {
    /// A facility and its process, if one was started.
    Process,
    /// A single ODN of a dispatched process.
    Odn,
}

/// One row of a role's work list.
///
/// Units the role has already handled stay in the list with `is_inactive`
/// set, so they can be shown read-only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkUnit {
    pub kind: WorkUnitKind,
    pub facility: Facility,
    /// `None` for an eligible facility that has not been started.
    pub process: Option<Process>,
    /// Every ODN of the process, or exactly one for an ODN unit.
    pub odns: Vec<Odn>,
    pub is_inactive: bool,
}

/// A workflow operation submitted through the generic action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowAction {
    StartProcess(StartProcessRequest),
    RevertStart(RevertStartRequest),
    Advance(AdvanceRequest),
    AddOdn(AddOdnRequest),
    EditOdn(EditOdnRequest),
    DeleteOdn(DeleteOdnRequest),
    SetOdnStatus(SetOdnStatusRequest),
    CorrectOdn(CorrectOdnRequest),
}

// ============================================================================
// Administration
// ============================================================================

/// API request to register a facility.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterFacilityRequest {
    pub name: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    #[serde(default)]
    pub route: Option<String>,
    /// `odd`, `even` or `monthly`; blank means unset.
    #[serde(default)]
    pub period: Option<String>,
}

/// API request to reassign a facility's route and period class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateFacilityRoutingRequest {
    pub facility_id: i64,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

/// API request to register a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterVehicleRequest {
    pub plate_number: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// API request to register a driver.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// API request to register a deliverer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterDelivererRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// API request to validate a facility CSV without importing it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewFacilitiesCsvRequest {
    pub csv_content: String,
}

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// Preview result for a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvRowPreview {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    pub name: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub woreda: Option<String>,
    pub route: Option<String>,
    pub period: Option<String>,
    pub status: CsvRowStatus,
    /// Zero or more validation error messages.
    pub errors: Vec<String>,
}

/// API response for CSV preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewFacilitiesCsvResponse {
    pub rows: Vec<CsvRowPreview>,
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// API request to import facilities from CSV.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportFacilitiesCsvRequest {
    pub csv_content: String,
    /// Row numbers to import (1-based). `None` imports every row.
    #[serde(default)]
    pub selected_rows: Option<Vec<usize>>,
}

/// Status of a single CSV row import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvImportRowStatus {
    /// Row was successfully imported.
    Success,
    /// Row import failed.
    Failed,
}

/// Import result for a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CsvImportRowResult {
    pub row_number: usize,
    pub name: Option<String>,
    pub status: CsvImportRowStatus,
    /// Identifier of the created facility.
    pub facility_id: Option<i64>,
    /// Error message if the import failed.
    pub error: Option<String>,
}

/// API response for CSV import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportFacilitiesCsvResponse {
    pub results: Vec<CsvImportRowResult>,
    pub total_selected: usize,
    pub successful_count: usize,
    pub failed_count: usize,
}
