// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workflow operations on processes, ODNs and routes.
//!
//! Every mutating operation runs inside one `Persistence::atomically` call:
//! the state is loaded, the command is applied by the pure core, and the
//! resulting writes and audit event are persisted together. Reads use
//! `Persistence::read` so that each response reflects a single snapshot.

use odn_flow::{
    AssignmentRequest, AssignmentResult, Command, State, TransitionResult, apply, assign_route,
};
use odn_flow_audit::Cause;
use odn_flow_domain::{
    Deliverer, Driver, EligibilityMode, Facility, Odn, Process, ReportingPeriod, RouteAssignment,
    RouteReadiness, TRANSITIONS, Vehicle, filter_eligible, normalize_route,
};
use odn_flow_persistence::{PersistedTransition, SqlitePersistence, WorkflowTransaction};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_core_error};
use crate::request_response::{
    AddOdnRequest, AdvanceRequest, AdvanceRouteRequest, CorrectOdnRequest,
    CreateRouteAssignmentRequest, DeleteOdnRequest, EditOdnRequest, PeriodInfo, ProcessDetail,
    RevertStartRequest, RevertStartResponse, SetOdnStatusRequest, StartProcessRequest,
};

/// Rejects the request if the caller saw an older version of the row.
fn check_expected_version(
    entity: &str,
    id: i64,
    expected: Option<i64>,
    actual: i64,
) -> Result<(), ApiError> {
    match expected {
        Some(expected_version) if expected_version != actual => Err(ApiError::StaleWrite {
            entity: entity.to_string(),
            id,
            expected_version,
        }),
        _ => Ok(()),
    }
}

fn route_code(route: &str) -> Result<String, ApiError> {
    normalize_route(Some(route)).ok_or_else(|| ApiError::InvalidInput {
        field: String::from("route"),
        message: String::from("Route cannot be empty"),
    })
}

/// Applies a command to `state` and persists the result.
///
/// A command that changes nothing writes nothing, not even an audit event.
pub(crate) fn execute(
    tx: &mut WorkflowTransaction<'_>,
    state: &State,
    command: Command,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<PersistedTransition, ApiError> {
    let result: TransitionResult = apply(state, command, actor.to_audit_actor(), cause, now)
        .map_err(translate_core_error)?;

    if result.is_noop() {
        debug!(
            actor = %actor.id,
            role = %actor.role,
            facility_id = ?state.facility.facility_id,
            "Command left state unchanged"
        );
        return Ok(PersistedTransition::default());
    }

    tx.persist_transition(&result).map_err(ApiError::from)
}

fn detail_from_state(state: State) -> Result<ProcessDetail, ApiError> {
    let process: Process = state.process.ok_or_else(|| ApiError::Internal {
        message: String::from("state was loaded without a process"),
    })?;
    Ok(ProcessDetail {
        facility: state.facility,
        process,
        odns: state.odns,
    })
}

pub(crate) fn load_detail(
    tx: &mut WorkflowTransaction<'_>,
    process_id: i64,
) -> Result<ProcessDetail, ApiError> {
    detail_from_state(tx.load_process_state(process_id)?)
}

/// Loads the state of the process an ODN belongs to.
fn load_odn_state(
    tx: &mut WorkflowTransaction<'_>,
    odn_id: i64,
    expected_version: Option<i64>,
) -> Result<State, ApiError> {
    let process_id: i64 = tx.get_odn_process_id(odn_id)?;
    let state: State = tx.load_process_state(process_id)?;
    if let Some(odn) = state.odn(odn_id) {
        check_expected_version("ODN", odn_id, expected_version, odn.version)?;
    }
    Ok(state)
}

fn process_id_of(state: &State) -> Result<i64, ApiError> {
    state
        .process
        .as_ref()
        .and_then(|p| p.process_id)
        .ok_or_else(|| ApiError::Internal {
            message: String::from("state was loaded without a stored process"),
        })
}

fn odn_after(
    tx: &mut WorkflowTransaction<'_>,
    state: &State,
    odn_id: i64,
) -> Result<Odn, ApiError> {
    let process_id: i64 = process_id_of(state)?;
    let detail: ProcessDetail = load_detail(tx, process_id)?;
    detail
        .odns
        .into_iter()
        .find(|o| o.odn_id == Some(odn_id))
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("ODN"),
            message: format!("ODN {odn_id} does not exist"),
        })
}

// ============================================================================
// Facilities in scope
// ============================================================================

/// Lists the facilities eligible in a period, in registration order.
///
/// # Errors
///
/// Returns an error if the facilities cannot be read.
pub fn list_eligible_facilities(
    persistence: &mut SqlitePersistence,
    mode: EligibilityMode,
    period: &ReportingPeriod,
) -> Result<Vec<Facility>, ApiError> {
    persistence.read(|tx| {
        let facilities: Vec<Facility> = tx.list_facilities()?;
        Ok(filter_eligible(&facilities, period, mode)
            .into_iter()
            .cloned()
            .collect())
    })
}

// ============================================================================
// Processes
// ============================================================================

/// Starts O2C for a facility in a period.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The facility, period and eligibility mode
/// * `actor` - The O2C officer starting the process
/// * `cause` - The cause or reason for this action
/// * `now` - The time of the change
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an O2C officer
/// - The facility does not exist or is not eligible in the requested mode
/// - The facility already has an open process for the period
pub fn start_process(
    persistence: &mut SqlitePersistence,
    request: &StartProcessRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ProcessDetail, ApiError> {
    let period: ReportingPeriod = request.period.resolve()?;

    let detail: ProcessDetail = persistence.atomically(|tx| {
        let state: State = tx.load_facility_state(request.facility_id, &period)?;
        let persisted: PersistedTransition = execute(
            tx,
            &state,
            Command::StartProcess { mode: request.mode },
            actor,
            cause,
            now,
        )?;
        let process_id: i64 = persisted.process_id.ok_or_else(|| ApiError::Internal {
            message: String::from("start did not create a process"),
        })?;
        load_detail(tx, process_id)
    })?;

    info!(
        facility_id = request.facility_id,
        process_id = ?detail.process.process_id,
        period = %period,
        mode = %request.mode,
        actor = %actor.id,
        "Started process"
    );
    Ok(detail)
}

/// Moves a process to another status.
///
/// Applying the status the process is already in succeeds without writing.
///
/// # Errors
///
/// Returns an error if:
/// - The process does not exist
/// - `expected_version` is given and does not match
/// - The actor's role does not own the transition, or a precondition fails
pub fn advance(
    persistence: &mut SqlitePersistence,
    request: &AdvanceRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ProcessDetail, ApiError> {
    let detail: ProcessDetail = persistence.atomically(|tx| {
        let state: State = tx.load_process_state(request.process_id)?;
        if let Some(process) = &state.process {
            check_expected_version(
                "Process",
                request.process_id,
                request.expected_version,
                process.version,
            )?;
        }
        execute(
            tx,
            &state,
            Command::Advance {
                target: request.target,
                accept_rrf_not_sent: request.accept_rrf_not_sent,
            },
            actor,
            cause,
            now,
        )?;
        load_detail(tx, request.process_id)
    })?;

    info!(
        process_id = request.process_id,
        status = %detail.process.status,
        version = detail.process.version,
        actor = %actor.id,
        role = %actor.role,
        "Advanced process"
    );
    Ok(detail)
}

/// Applies the same transition to every process on a route.
///
/// Only processes whose current status has a transition to `target` owned
/// by the actor's role are touched. Either every touched process moves or
/// none does.
///
/// # Errors
///
/// Returns an error if any of the transitions is rejected.
pub fn advance_route(
    persistence: &mut SqlitePersistence,
    request: &AdvanceRouteRequest,
    actor: &AuthenticatedActor,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<Vec<Process>, ApiError> {
    let route: String = route_code(&request.route)?;
    let period: ReportingPeriod = request.period.resolve()?;

    let moved: Vec<Process> = persistence.atomically(|tx| {
        let candidates: Vec<i64> = tx
            .list_processes_on_route(&route, &period)?
            .into_iter()
            .filter(|p| {
                TRANSITIONS.iter().any(|rule| {
                    rule.from == p.status
                        && rule.to == request.target
                        && rule.owners.contains(&actor.role)
                })
            })
            .filter_map(|p| p.process_id)
            .collect();

        let mut moved: Vec<Process> = Vec::with_capacity(candidates.len());
        for process_id in candidates {
            let state: State = tx.load_process_state(process_id)?;
            execute(
                tx,
                &state,
                Command::Advance {
                    target: request.target,
                    accept_rrf_not_sent: false,
                },
                actor,
                cause.clone(),
                now,
            )?;
            moved.push(load_detail(tx, process_id)?.process);
        }
        Ok::<Vec<Process>, ApiError>(moved)
    })?;

    info!(
        route = %route,
        period = %period,
        target = %request.target,
        count = moved.len(),
        actor = %actor.id,
        "Advanced route"
    );
    Ok(moved)
}

/// Undoes a start that has no ODNs, deleting the process.
///
/// # Errors
///
/// Returns an error if:
/// - The process does not exist
/// - The actor is not the officer who started O2C
/// - The process has moved on or has ODNs
pub fn revert_start(
    persistence: &mut SqlitePersistence,
    request: &RevertStartRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<RevertStartResponse, ApiError> {
    let (facility_id, period): (i64, ReportingPeriod) = persistence.atomically(|tx| {
        let state: State = tx.load_process_state(request.process_id)?;
        if let Some(process) = &state.process {
            check_expected_version(
                "Process",
                request.process_id,
                request.expected_version,
                process.version,
            )?;
        }
        let facility_id: i64 = state.process.as_ref().map_or(0, |p| p.facility_id);
        let period: ReportingPeriod = state.period;
        execute(tx, &state, Command::RevertStart, actor, cause, now)?;
        Ok::<(i64, ReportingPeriod), ApiError>((facility_id, period))
    })?;

    info!(
        process_id = request.process_id,
        facility_id,
        actor = %actor.id,
        "Reverted process start"
    );
    Ok(RevertStartResponse {
        facility_id,
        process_id: request.process_id,
        period: PeriodInfo::from(period),
        message: format!(
            "Process {} for facility {facility_id} was reverted",
            request.process_id
        ),
    })
}

// ============================================================================
// ODNs
// ============================================================================

/// Adds an ODN to a process.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not the O2C owner of the process
/// - The process is past O2C (`OdnLocked`)
/// - The number is blank or already used in the process
pub fn add_odn(
    persistence: &mut SqlitePersistence,
    request: &AddOdnRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Odn, ApiError> {
    let odn: Odn = persistence.atomically(|tx| {
        let state: State = tx.load_process_state(request.process_id)?;
        let persisted: PersistedTransition = execute(
            tx,
            &state,
            Command::AddOdn {
                odn_number: request.odn_number.clone(),
            },
            actor,
            cause,
            now,
        )?;
        let odn_id: i64 = persisted
            .odn_ids
            .first()
            .copied()
            .ok_or_else(|| ApiError::Internal {
                message: String::from("ODN insert returned no ID"),
            })?;
        odn_after(tx, &state, odn_id)
    })?;

    info!(
        process_id = request.process_id,
        odn_id = ?odn.odn_id,
        odn_number = %odn.odn_number,
        actor = %actor.id,
        "Added ODN"
    );
    Ok(odn)
}

/// Renames an ODN.
///
/// # Errors
///
/// Returns an error if the ODN is locked, the new number is blank or taken,
/// or `expected_version` does not match.
pub fn edit_odn(
    persistence: &mut SqlitePersistence,
    request: &EditOdnRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Odn, ApiError> {
    let odn: Odn = persistence.atomically(|tx| {
        let state: State = load_odn_state(tx, request.odn_id, request.expected_version)?;
        execute(
            tx,
            &state,
            Command::EditOdn {
                odn_id: request.odn_id,
                odn_number: request.odn_number.clone(),
            },
            actor,
            cause,
            now,
        )?;
        odn_after(tx, &state, request.odn_id)
    })?;

    info!(odn_id = request.odn_id, odn_number = %odn.odn_number, "Edited ODN");
    Ok(odn)
}

/// Deletes an ODN and returns the refreshed process.
///
/// # Errors
///
/// Returns an error if the ODN is locked or `expected_version` does not match.
pub fn delete_odn(
    persistence: &mut SqlitePersistence,
    request: &DeleteOdnRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ProcessDetail, ApiError> {
    let detail: ProcessDetail = persistence.atomically(|tx| {
        let state: State = load_odn_state(tx, request.odn_id, request.expected_version)?;
        execute(
            tx,
            &state,
            Command::DeleteOdn {
                odn_id: request.odn_id,
            },
            actor,
            cause,
            now,
        )?;
        load_detail(tx, process_id_of(&state)?)
    })?;

    info!(odn_id = request.odn_id, process_id = ?detail.process.process_id, "Deleted ODN");
    Ok(detail)
}

/// Sets one ODN sub-status.
///
/// # Errors
///
/// Returns an error if:
/// - The actor's role does not own the flag
/// - The parent process has not reached the flag's stage
/// - POD or quality is already confirmed
/// - A POD payload is incomplete (`MissingReason` for a blank reason)
pub fn set_odn_status(
    persistence: &mut SqlitePersistence,
    request: &SetOdnStatusRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Odn, ApiError> {
    let odn: Odn = persistence.atomically(|tx| {
        let state: State = load_odn_state(tx, request.odn_id, request.expected_version)?;
        execute(
            tx,
            &state,
            Command::UpdateOdnStatus {
                odn_id: request.odn_id,
                update: request.update.clone(),
            },
            actor,
            cause,
            now,
        )?;
        odn_after(tx, &state, request.odn_id)
    })?;

    info!(
        odn_id = request.odn_id,
        action = request.update.action_name(),
        actor = %actor.id,
        "Updated ODN status"
    );
    Ok(odn)
}

/// Clears a confirmed quality or document flag. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or `expected_version`
/// does not match.
pub fn correct_odn(
    persistence: &mut SqlitePersistence,
    request: &CorrectOdnRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Odn, ApiError> {
    let odn: Odn = persistence.atomically(|tx| {
        let state: State = load_odn_state(tx, request.odn_id, request.expected_version)?;
        execute(
            tx,
            &state,
            Command::CorrectOdn {
                odn_id: request.odn_id,
                flag: request.flag,
            },
            actor,
            cause,
            now,
        )?;
        odn_after(tx, &state, request.odn_id)
    })?;

    info!(odn_id = request.odn_id, flag = %request.flag, actor = %actor.id, "Corrected ODN");
    Ok(odn)
}

// ============================================================================
// Routes
// ============================================================================

/// Evaluates readiness of a route for a period.
///
/// # Errors
///
/// Returns an error if the route is blank or a query fails.
pub fn route_readiness(
    persistence: &mut SqlitePersistence,
    route: &str,
    period: &ReportingPeriod,
) -> Result<RouteReadiness, ApiError> {
    let route: String = route_code(route)?;
    persistence.read(|tx| tx.route_readiness(&route, period).map_err(ApiError::from))
}

/// Evaluates readiness of every known route for a period.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_route_readiness(
    persistence: &mut SqlitePersistence,
    period: &ReportingPeriod,
) -> Result<Vec<RouteReadiness>, ApiError> {
    persistence.read(|tx| tx.list_route_readiness(period).map_err(ApiError::from))
}

/// Lists the route assignments of a period.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_route_assignments(
    persistence: &mut SqlitePersistence,
    period: &ReportingPeriod,
) -> Result<Vec<RouteAssignment>, ApiError> {
    persistence.read(|tx| tx.list_route_assignments(period).map_err(ApiError::from))
}

/// Binds a vehicle, driver and optional deliverer to a ready route.
///
/// Readiness is re-evaluated inside the transaction that stores the
/// assignment. Processes are not advanced; they move to
/// `vehicle_assigned` through `advance` or `advance_route`.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a PI officer or TM manager
/// - The route is not ready
/// - The route already has an assignment for the period
/// - A resource does not exist or is unavailable
pub fn create_route_assignment(
    persistence: &mut SqlitePersistence,
    request: &CreateRouteAssignmentRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<RouteAssignment, ApiError> {
    let route: String = route_code(&request.route)?;
    let period: ReportingPeriod = request.period.resolve()?;

    let assignment: RouteAssignment = persistence.atomically(|tx| {
        let readiness: RouteReadiness = tx.route_readiness(&route, &period)?;
        let existing: Option<RouteAssignment> = tx.find_route_assignment(&route, &period)?;
        let vehicle: Vehicle = tx.get_vehicle(request.vehicle_id)?;
        let driver: Driver = tx.get_driver(request.driver_id)?;
        let deliverer: Option<Deliverer> = request
            .deliverer_id
            .map(|id| tx.get_deliverer(id))
            .transpose()?;

        let result: AssignmentResult = assign_route(
            &readiness,
            existing.as_ref(),
            AssignmentRequest {
                vehicle: &vehicle,
                driver: &driver,
                deliverer: deliverer.as_ref(),
            },
            actor.to_audit_actor(),
            cause,
            now,
        )
        .map_err(translate_core_error)?;

        let assignment_id: i64 = tx.insert_route_assignment(&result.assignment)?;
        tx.persist_audit_event(&result.audit_event, None)?;
        Ok::<RouteAssignment, ApiError>(RouteAssignment {
            assignment_id: Some(assignment_id),
            ..result.assignment
        })
    })?;

    info!(
        route = %route,
        period = %period,
        assignment_id = ?assignment.assignment_id,
        vehicle_id = assignment.vehicle_id,
        driver_id = assignment.driver_id,
        actor = %actor.id,
        "Created route assignment"
    );
    Ok(assignment)
}
