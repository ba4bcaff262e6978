// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-role work lists and the generic action entry point.
//!
//! Each role sees the units of work at its stage. Units a role has already
//! handled remain visible but are marked inactive.

use std::collections::BTreeMap;

use odn_flow_audit::Cause;
use odn_flow_domain::{
    EligibilityMode, Facility, Odn, Process, ProcessStatus, ReportingPeriod, Role,
    filter_eligible,
};
use odn_flow_persistence::SqlitePersistence;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::handlers::{self, load_detail};
use crate::request_response::{
    ProcessDetail, RevertStartResponse, WorkUnit, WorkUnitKind, WorkflowAction,
};

/// The statuses at which a stage role works on a whole process.
///
/// A process is listed once it has reached `from` and becomes inactive once
/// it has moved beyond `until`.
struct StageWindow {
    from: ProcessStatus,
    until: ProcessStatus,
}

impl StageWindow {
    const fn contains(&self, status: ProcessStatus) -> bool {
        status.has_reached(self.from)
    }

    const fn is_done(&self, status: ProcessStatus) -> bool {
        status.rank() > self.until.rank()
    }
}

const fn stage_window(role: Role) -> Option<StageWindow> {
    let (from, until) = match role {
        Role::O2cOfficer => (ProcessStatus::O2cStarted, ProcessStatus::Completed),
        Role::EwmOfficer => (ProcessStatus::O2cCompleted, ProcessStatus::O2cCompleted),
        Role::PiOfficer => (ProcessStatus::EwmCompleted, ProcessStatus::EwmCompleted),
        Role::TmManager => (ProcessStatus::VehicleRequested, ProcessStatus::VehicleRequested),
        Role::Dispatcher => (ProcessStatus::VehicleAssigned, ProcessStatus::VehicleAssigned),
        Role::DocumentationOfficer
        | Role::DocumentFollower
        | Role::QualityOfficer
        | Role::Admin => return None,
    };
    Some(StageWindow { from, until })
}

/// Whether a role is finished with a single ODN.
fn odn_done_for(role: Role, odn: &Odn) -> bool {
    match role {
        Role::DocumentationOfficer => odn.is_pod_confirmed(),
        Role::DocumentFollower => odn.is_documentation_closed(),
        Role::QualityOfficer => odn.is_quality_confirmed(),
        _ => false,
    }
}

const fn works_per_odn(role: Role) -> bool {
    matches!(
        role,
        Role::DocumentationOfficer | Role::DocumentFollower | Role::QualityOfficer
    )
}

fn process_unit(facility: Facility, process: Process, odns: Vec<Odn>, role: Role) -> WorkUnit {
    let is_inactive: bool = stage_window(role).is_some_and(|w| w.is_done(process.status));
    WorkUnit {
        kind: WorkUnitKind::Process,
        facility,
        process: Some(process),
        odns,
        is_inactive,
    }
}

fn odn_unit(facility: Facility, process: Process, odn: Odn, role: Role) -> WorkUnit {
    WorkUnit {
        kind: WorkUnitKind::Odn,
        facility,
        is_inactive: odn_done_for(role, &odn),
        process: Some(process),
        odns: vec![odn],
    }
}

/// Splits ODNs by the process they belong to.
fn group_odns(odns: Vec<Odn>) -> BTreeMap<i64, Vec<Odn>> {
    let mut grouped: BTreeMap<i64, Vec<Odn>> = BTreeMap::new();
    for odn in odns {
        grouped.entry(odn.process_id).or_default().push(odn);
    }
    grouped
}

/// Lists the work units a role sees for a period.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `role` - The role whose list is requested
/// * `period` - The reporting period
///
/// # Errors
///
/// Returns an error if the underlying reads fail.
pub fn list_actionable(
    persistence: &mut SqlitePersistence,
    role: Role,
    period: &ReportingPeriod,
) -> Result<Vec<WorkUnit>, ApiError> {
    let (facilities, processes, odns): (Vec<Facility>, Vec<Process>, Vec<Odn>) =
        persistence.read(|tx| {
            let facilities: Vec<Facility> = tx.list_facilities()?;
            let processes: Vec<Process> = tx.list_processes_for_period(period)?;
            let ids: Vec<i64> = processes.iter().filter_map(|p| p.process_id).collect();
            let odns: Vec<Odn> = tx.list_odns_for_processes(&ids)?;
            Ok::<_, ApiError>((facilities, processes, odns))
        })?;

    let by_id: BTreeMap<i64, Facility> = facilities
        .iter()
        .filter_map(|f| f.facility_id.map(|id| (id, f.clone())))
        .collect();
    let mut odns_by_process: BTreeMap<i64, Vec<Odn>> = group_odns(odns);
    let mut take_odns = |process: &Process| -> Vec<Odn> {
        process
            .process_id
            .and_then(|id| odns_by_process.remove(&id))
            .unwrap_or_default()
    };

    let units: Vec<WorkUnit> = if role == Role::O2cOfficer {
        // The most recent process per facility; a facility may restart
        // after an earlier process was dispatched.
        let mut latest: BTreeMap<i64, Process> = BTreeMap::new();
        for process in processes {
            latest.insert(process.facility_id, process);
        }

        let mut listed: Vec<Facility> =
            filter_eligible(&facilities, period, EligibilityMode::Regular)
                .into_iter()
                .cloned()
                .collect();
        for (facility_id, facility) in &by_id {
            let already_listed: bool = listed.iter().any(|f| f.facility_id == Some(*facility_id));
            if !already_listed && latest.contains_key(facility_id) {
                listed.push(facility.clone());
            }
        }
        listed.sort_by_key(|f| f.facility_id);

        listed
            .into_iter()
            .map(|facility| {
                match facility.facility_id.and_then(|id| latest.remove(&id)) {
                    Some(process) => {
                        let odns: Vec<Odn> = take_odns(&process);
                        process_unit(facility, process, odns, role)
                    }
                    None => WorkUnit {
                        kind: WorkUnitKind::Process,
                        facility,
                        process: None,
                        odns: Vec::new(),
                        is_inactive: false,
                    },
                }
            })
            .collect()
    } else if works_per_odn(role) {
        let mut units: Vec<WorkUnit> = Vec::new();
        for process in processes
            .into_iter()
            .filter(|p| p.status == ProcessStatus::Dispatched)
        {
            let Some(facility) = by_id.get(&process.facility_id) else {
                continue;
            };
            for odn in take_odns(&process) {
                units.push(odn_unit(facility.clone(), process.clone(), odn, role));
            }
        }
        units
    } else {
        let window: Option<StageWindow> = stage_window(role);
        let mut units: Vec<WorkUnit> = Vec::new();
        for process in processes {
            if window.as_ref().is_some_and(|w| !w.contains(process.status)) {
                continue;
            }
            let Some(facility) = by_id.get(&process.facility_id) else {
                continue;
            };
            let odns: Vec<Odn> = take_odns(&process);
            units.push(process_unit(facility.clone(), process, odns, role));
        }
        units
    };

    debug!(role = %role, period = %period, count = units.len(), "Listed work units");
    Ok(units)
}

fn unit_for_process(
    persistence: &mut SqlitePersistence,
    process_id: i64,
    role: Role,
) -> Result<WorkUnit, ApiError> {
    let detail: ProcessDetail = persistence.read(|tx| load_detail(tx, process_id))?;
    Ok(process_unit(detail.facility, detail.process, detail.odns, role))
}

fn unit_for_odn(
    persistence: &mut SqlitePersistence,
    odn: Odn,
    role: Role,
) -> Result<WorkUnit, ApiError> {
    let detail: ProcessDetail = persistence.read(|tx| load_detail(tx, odn.process_id))?;
    Ok(odn_unit(detail.facility, detail.process, odn, role))
}

/// Performs a workflow action and returns the refreshed unit of work.
///
/// Status and correction actions return the affected ODN as its own unit;
/// every other action returns the process unit. A reverted start returns
/// the facility with no process.
///
/// # Errors
///
/// Returns whatever error the underlying operation returns.
pub fn apply(
    persistence: &mut SqlitePersistence,
    action: WorkflowAction,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WorkUnit, ApiError> {
    let role: Role = actor.role;
    match action {
        WorkflowAction::StartProcess(request) => {
            let detail: ProcessDetail =
                handlers::start_process(persistence, &request, actor, cause, now)?;
            Ok(process_unit(detail.facility, detail.process, detail.odns, role))
        }
        WorkflowAction::RevertStart(request) => {
            let reverted: RevertStartResponse =
                handlers::revert_start(persistence, &request, actor, cause, now)?;
            let facility: Facility =
                persistence.read(|tx| tx.get_facility(reverted.facility_id))?;
            Ok(WorkUnit {
                kind: WorkUnitKind::Process,
                facility,
                process: None,
                odns: Vec::new(),
                is_inactive: false,
            })
        }
        WorkflowAction::Advance(request) => {
            let detail: ProcessDetail =
                handlers::advance(persistence, &request, actor, cause, now)?;
            Ok(process_unit(detail.facility, detail.process, detail.odns, role))
        }
        WorkflowAction::AddOdn(request) => {
            handlers::add_odn(persistence, &request, actor, cause, now)?;
            unit_for_process(persistence, request.process_id, role)
        }
        WorkflowAction::EditOdn(request) => {
            let odn: Odn = handlers::edit_odn(persistence, &request, actor, cause, now)?;
            unit_for_process(persistence, odn.process_id, role)
        }
        WorkflowAction::DeleteOdn(request) => {
            let detail: ProcessDetail =
                handlers::delete_odn(persistence, &request, actor, cause, now)?;
            Ok(process_unit(detail.facility, detail.process, detail.odns, role))
        }
        WorkflowAction::SetOdnStatus(request) => {
            let odn: Odn = handlers::set_odn_status(persistence, &request, actor, cause, now)?;
            unit_for_odn(persistence, odn, role)
        }
        WorkflowAction::CorrectOdn(request) => {
            let odn: Odn = handlers::correct_odn(persistence, &request, actor, cause, now)?;
            unit_for_odn(persistence, odn, role)
        }
    }
}
