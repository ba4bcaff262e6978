// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion to domain values.
//!
//! Audit payloads are stored as JSON columns through the `*Data` structs.
//! Every other table maps to a `*Row` struct read with `as_select()`.

use diesel::prelude::*;
use odn_flow_domain::{
    Deliverer, Driver, EligibilityMode, Facility, FacilityPeriod, FlagStamp, Odn, PodOutcome,
    PodRecord, Process, ProcessStatus, QualityRecord, ReportingPeriod, RouteAssignment,
    StageOfficers, Vehicle,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::diesel_schema::{
    deliverers, drivers, facilities, odns, processes, route_assignments, vehicles,
};
use crate::error::PersistenceError;

pub const POD_CONFIRMED: &str = "confirmed";
pub const POD_NOT_CONFIRMED: &str = "not_confirmed";

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub role: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Rebuilds a reporting period from its stored columns.
pub fn period_from_columns(
    year: i32,
    month_index: i32,
) -> Result<ReportingPeriod, PersistenceError> {
    let index: u8 = u8::try_from(month_index).map_err(|_| {
        PersistenceError::ReconstructionError(format!("month index {month_index} out of range"))
    })?;
    ReportingPeriod::from_parts(year, index)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

/// Returns the stored month index column of a period.
pub fn month_index_column(period: &ReportingPeriod) -> i32 {
    i32::from(period.month_index())
}

fn reconstruct<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<T, PersistenceError> {
    result.map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

fn stamp(by: Option<String>, at: Option<String>) -> Option<FlagStamp> {
    match (by, at) {
        (Some(by), Some(at)) => Some(FlagStamp { by, at }),
        _ => None,
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = facilities)]
pub struct FacilityRow {
    pub facility_id: i64,
    pub name: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    pub route: Option<String>,
    pub period_class: Option<String>,
    #[allow(dead_code)]
    pub created_at: String,
}

impl FacilityRow {
    pub fn into_domain(self) -> Result<Facility, PersistenceError> {
        let period: Option<FacilityPeriod> = match self.period_class.as_deref() {
            Some(value) => reconstruct(FacilityPeriod::parse_optional(value))?,
            None => None,
        };
        Ok(Facility {
            facility_id: Some(self.facility_id),
            name: self.name,
            region: self.region,
            zone: self.zone,
            woreda: self.woreda,
            route: self.route,
            period,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = processes)]
pub struct ProcessRow {
    pub process_id: i64,
    pub facility_id: i64,
    pub route: String,
    pub period_year: i32,
    pub period_month_index: i32,
    pub mode: String,
    pub status: String,
    pub o2c_officer: Option<String>,
    pub ewm_officer: Option<String>,
    pub pi_officer: Option<String>,
    pub tm_officer: Option<String>,
    pub dispatch_officer: Option<String>,
    pub started_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl ProcessRow {
    pub fn into_domain(self) -> Result<Process, PersistenceError> {
        Ok(Process {
            process_id: Some(self.process_id),
            facility_id: self.facility_id,
            route: self.route,
            period: period_from_columns(self.period_year, self.period_month_index)?,
            mode: reconstruct(EligibilityMode::from_str(&self.mode))?,
            status: reconstruct(ProcessStatus::from_str(&self.status))?,
            officers: StageOfficers {
                o2c: self.o2c_officer,
                ewm: self.ewm_officer,
                pi: self.pi_officer,
                tm: self.tm_officer,
                dispatch: self.dispatch_officer,
            },
            started_at: self.started_at,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = odns)]
pub struct OdnRow {
    pub odn_id: i64,
    pub process_id: i64,
    pub odn_number: String,
    pub ewm_completed_by: Option<String>,
    pub ewm_completed_at: Option<String>,
    pub pod_status: Option<String>,
    pub pod_number: Option<String>,
    pub arrival_kilometer: Option<i64>,
    pub pod_reason: Option<String>,
    pub pod_by: Option<String>,
    pub pod_at: Option<String>,
    pub quality_feedback: Option<String>,
    pub quality_by: Option<String>,
    pub quality_at: Option<String>,
    pub documents_signed_by: Option<String>,
    pub documents_signed_at: Option<String>,
    pub documents_handover_by: Option<String>,
    pub documents_handover_at: Option<String>,
    pub updated_at: String,
    pub version: i64,
}

impl OdnRow {
    pub fn into_domain(self) -> Result<Odn, PersistenceError> {
        let pod: Option<PodRecord> = match stamp(self.pod_by, self.pod_at) {
            None => None,
            Some(pod_stamp) => {
                let outcome: PodOutcome = match self.pod_status.as_deref() {
                    Some(POD_CONFIRMED) => PodOutcome::Confirmed {
                        pod_number: self.pod_number.unwrap_or_default(),
                        arrival_kilometer: self.arrival_kilometer.unwrap_or_default(),
                    },
                    Some(POD_NOT_CONFIRMED) => PodOutcome::NotConfirmed {
                        reason: self.pod_reason.unwrap_or_default(),
                    },
                    other => {
                        return Err(PersistenceError::ReconstructionError(format!(
                            "ODN {} has an invalid POD status {other:?}",
                            self.odn_id
                        )));
                    }
                };
                Some(PodRecord {
                    outcome,
                    stamp: pod_stamp,
                })
            }
        };

        let quality: Option<QualityRecord> =
            stamp(self.quality_by, self.quality_at).map(|quality_stamp| QualityRecord {
                feedback: self.quality_feedback,
                stamp: quality_stamp,
            });

        Ok(Odn {
            odn_id: Some(self.odn_id),
            process_id: self.process_id,
            odn_number: self.odn_number,
            ewm_completed: stamp(self.ewm_completed_by, self.ewm_completed_at),
            pod,
            quality,
            documents_signed: stamp(self.documents_signed_by, self.documents_signed_at),
            documents_handover: stamp(self.documents_handover_by, self.documents_handover_at),
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = route_assignments)]
pub struct RouteAssignmentRow {
    pub assignment_id: i64,
    pub route: String,
    pub period_year: i32,
    pub period_month_index: i32,
    pub vehicle_id: i64,
    pub driver_id: i64,
    pub deliverer_id: Option<i64>,
    pub assigned_by: String,
    pub created_at: String,
}

impl RouteAssignmentRow {
    pub fn into_domain(self) -> Result<RouteAssignment, PersistenceError> {
        Ok(RouteAssignment {
            assignment_id: Some(self.assignment_id),
            route: self.route,
            period: period_from_columns(self.period_year, self.period_month_index)?,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            deliverer_id: self.deliverer_id,
            assigned_by: self.assigned_by,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vehicles)]
pub struct VehicleRow {
    pub vehicle_id: i64,
    pub plate_number: String,
    pub description: Option<String>,
    pub is_available: i32,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            vehicle_id: Some(row.vehicle_id),
            plate_number: row.plate_number,
            description: row.description,
            is_available: row.is_available != 0,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = drivers)]
pub struct DriverRow {
    pub driver_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub is_available: i32,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            driver_id: Some(row.driver_id),
            name: row.name,
            phone: row.phone,
            is_available: row.is_available != 0,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = deliverers)]
pub struct DelivererRow {
    pub deliverer_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub is_available: i32,
}

impl From<DelivererRow> for Deliverer {
    fn from(row: DelivererRow) -> Self {
        Self {
            deliverer_id: Some(row.deliverer_id),
            name: row.name,
            phone: row.phone,
            is_available: row.is_available != 0,
        }
    }
}
