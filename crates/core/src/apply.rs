// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::ledger;
use crate::state::{Change, State, TransitionResult};
use odn_flow_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::{
    DomainError, EligibilityMode, Odn, Precondition, Process, ProcessStatus, RRF_NOT_SENT,
    RouteReadiness, Role, Stage, StageOfficers, TRANSITIONS, TransitionRule, is_eligible,
    validate_transition,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Formats a timestamp the way it is stored and reported.
///
/// # Errors
///
/// Returns `CoreError::Internal` if the timestamp cannot be formatted.
pub fn format_timestamp(now: OffsetDateTime) -> Result<String, CoreError> {
    now.format(&Rfc3339)
        .map_err(|e| CoreError::Internal(format!("failed to format timestamp: {e}")))
}

/// Applies a command to the current state, producing a new state, the
/// writes needed to persist it and an audit event.
///
/// # Arguments
///
/// * `state` - The current state (immutable)
/// * `command` - The command to apply
/// * `actor` - The officer performing this action, with the role they act in
/// * `cause` - The cause or reason for this action
/// * `now` - The time of the change
///
/// # Errors
///
/// Returns an error if:
/// - The actor's role does not own the transition
/// - A precondition of the transition does not hold
/// - An ODN command violates ledger rules
/// - The state does not contain the process the command needs
pub fn apply(
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let timestamp: String = format_timestamp(now)?;

    match command {
        Command::StartProcess { mode } => start_process(state, mode, actor, cause, timestamp),
        Command::RevertStart => revert_start(state, actor, cause, timestamp),
        Command::Advance {
            target,
            accept_rrf_not_sent,
        } => advance(state, target, accept_rrf_not_sent, actor, cause, timestamp),
        Command::AddOdn { odn_number } => {
            ledger::add_odn(state, &odn_number, actor, cause, timestamp)
        }
        Command::EditOdn { odn_id, odn_number } => {
            ledger::edit_odn(state, odn_id, &odn_number, actor, cause, timestamp)
        }
        Command::DeleteOdn { odn_id } => ledger::delete_odn(state, odn_id, actor, cause, timestamp),
        Command::UpdateOdnStatus { odn_id, update } => {
            ledger::update_odn_status(state, odn_id, update, actor, cause, timestamp)
        }
        Command::CorrectOdn { odn_id, flag } => {
            ledger::correct_odn(state, odn_id, flag, actor, cause, timestamp)
        }
    }
}

pub(crate) fn require_process(state: &State) -> Result<&Process, CoreError> {
    state.process.as_ref().ok_or_else(|| {
        CoreError::Internal(format!(
            "no process loaded for facility {:?} in {}",
            state.facility.facility_id,
            state.period.key()
        ))
    })
}

pub(crate) fn require_process_id(process: &Process) -> Result<i64, CoreError> {
    process
        .process_id
        .ok_or_else(|| CoreError::Internal(String::from("process has not been persisted")))
}

pub(crate) fn rejected(actor: &Actor, from: &str, to: &str, reason: String) -> CoreError {
    CoreError::DomainViolation(DomainError::InvalidTransition {
        actor: actor.role.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        reason,
    })
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn audit(
    actor: Actor,
    cause: Cause,
    name: &str,
    details: String,
    before: StateSnapshot,
    after: StateSnapshot,
    timestamp: String,
    process_id: Option<i64>,
) -> AuditEvent {
    let event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(name.to_string(), Some(details)),
        before,
        after,
        timestamp,
    );
    match process_id {
        Some(id) => event.with_process_id(id),
        None => event,
    }
}

fn start_process(
    state: &State,
    mode: EligibilityMode,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let target: &str = ProcessStatus::O2cStarted.as_str();
    if actor.role != Role::O2cOfficer {
        return Err(rejected(
            &actor,
            "none",
            target,
            format!("process start is owned by {}", Role::O2cOfficer),
        ));
    }

    let facility_id: i64 = state
        .facility
        .facility_id
        .ok_or_else(|| CoreError::Internal(String::from("facility has not been persisted")))?;

    if state.process.as_ref().is_some_and(|p| !p.status.is_terminal()) {
        return Err(CoreError::DomainViolation(DomainError::ProcessAlreadyOpen {
            facility_id,
            period: state.period.key(),
        }));
    }

    if !is_eligible(&state.facility, &state.period, mode) {
        return Err(CoreError::DomainViolation(DomainError::FacilityNotEligible {
            facility_id,
            period: state.period.key(),
            mode: mode.to_string(),
        }));
    }

    let route: String = state
        .facility
        .route()
        .map(ToString::to_string)
        .ok_or_else(|| CoreError::Internal(String::from("eligible facility has no route")))?;

    let mut officers: StageOfficers = StageOfficers::default();
    officers.record(Stage::O2c, &actor.id);

    let process: Process = Process {
        process_id: None,
        facility_id,
        route,
        period: state.period,
        mode,
        status: ProcessStatus::O2cStarted,
        officers,
        started_at: timestamp.clone(),
        updated_at: timestamp.clone(),
        version: 0,
    };

    let before: StateSnapshot = State::new(state.facility.clone(), state.period).to_snapshot();
    let new_state: State = State {
        process: Some(process.clone()),
        odns: Vec::new(),
        ..state.clone()
    };
    let after: StateSnapshot = new_state.to_snapshot();

    let details: String = format!(
        "Started {} process for facility {} ({}) on route {} in {}",
        mode,
        facility_id,
        state.facility.name,
        process.route,
        state.period.key()
    );
    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "StartProcess",
        details,
        before,
        after,
        timestamp,
        None,
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::InsertProcess(process)],
        audit_event: Some(audit_event),
    })
}

fn revert_start(
    state: &State,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    let from: &str = process.status.as_str();

    if actor.role != Role::O2cOfficer || !process.is_o2c_owner(&actor.id) {
        return Err(rejected(
            &actor,
            from,
            "deleted",
            String::from("only the officer who started O2C may revert the start"),
        ));
    }
    if process.status != ProcessStatus::O2cStarted {
        return Err(rejected(
            &actor,
            from,
            "deleted",
            format!("a start can only be reverted while {}", ProcessStatus::O2cStarted),
        ));
    }
    if !state.odns.is_empty() {
        return Err(rejected(
            &actor,
            from,
            "deleted",
            format!("process still has {} ODNs", state.odns.len()),
        ));
    }

    let before: StateSnapshot = state.to_snapshot();
    let new_state: State = State {
        process: None,
        ..state.clone()
    };
    let after: StateSnapshot = new_state.to_snapshot();

    let details: String = format!(
        "Reverted start of process {process_id} for facility {}",
        process.facility_id
    );
    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "RevertStart",
        details,
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::DeleteProcess {
            process_id,
            expected_version: process.version,
        }],
        audit_event: Some(audit_event),
    })
}

/// Returns true if `role` owns some transition into `target`.
fn role_reaches(role: Role, target: ProcessStatus) -> bool {
    TRANSITIONS
        .iter()
        .any(|rule| rule.to == target && rule.owners.contains(&role))
}

#[allow(clippy::too_many_lines)]
fn advance(
    state: &State,
    target: ProcessStatus,
    accept_rrf_not_sent: bool,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;

    if process.status == target && role_reaches(actor.role, target) {
        return Ok(TransitionResult::unchanged(state.clone()));
    }

    let rule: &TransitionRule = validate_transition(process.status, target, actor.role)?;

    if rule.owner_only && !process.is_o2c_owner(&actor.id) {
        return Err(rejected(
            &actor,
            process.status.as_str(),
            target.as_str(),
            String::from("only the officer who started O2C may complete it"),
        ));
    }

    let mut changes: Vec<Change> = Vec::new();
    let mut odns: Vec<Odn> = state.odns.clone();

    match rule.precondition {
        Precondition::None => {}
        Precondition::OdnsOrSentinel => {
            if odns.is_empty() {
                if !accept_rrf_not_sent {
                    return Err(rejected(
                        &actor,
                        process.status.as_str(),
                        target.as_str(),
                        format!("process has no ODNs; confirm '{RRF_NOT_SENT}' to continue"),
                    ));
                }
                let sentinel: Odn = Odn::new(process_id, RRF_NOT_SENT, &timestamp);
                odns.push(sentinel.clone());
                changes.push(Change::InsertOdn(sentinel));
            }
        }
        Precondition::RouteReady => {
            check_route_ready(state, process)?;
        }
        Precondition::AssignmentExists => {
            let assigned: bool = state
                .route_assignment
                .as_ref()
                .is_some_and(|a| a.route == process.route && a.period == process.period);
            if !assigned {
                return Err(CoreError::DomainViolation(DomainError::AssignmentMissing {
                    route: process.route.clone(),
                    period: process.period.key(),
                }));
            }
        }
    }

    let mut updated: Process = process.clone();
    updated.status = target;
    updated.updated_at = timestamp.clone();
    updated.version = process.version + 1;
    if let Some(stage) = rule.records {
        updated.officers.record(stage, &actor.id);
    }

    let before: StateSnapshot = state.to_snapshot();
    let new_state: State = State {
        process: Some(updated.clone()),
        odns,
        ..state.clone()
    };
    let after: StateSnapshot = new_state.to_snapshot();

    changes.push(Change::UpdateProcess {
        process: updated,
        expected_version: process.version,
    });

    let seeded: &str = if changes.len() > 1 {
        " (seeded 'RRF not sent')"
    } else {
        ""
    };
    let details: String = format!(
        "Process {process_id} moved from {} to {target}{seeded}",
        process.status
    );
    let audit_event: AuditEvent = audit(
        actor,
        cause,
        rule.action,
        details,
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes,
        audit_event: Some(audit_event),
    })
}

fn check_route_ready(state: &State, process: &Process) -> Result<(), CoreError> {
    let readiness: Option<&RouteReadiness> = state
        .route_readiness
        .as_ref()
        .filter(|r| r.route == process.route && r.period == process.period);

    match readiness {
        Some(r) if r.ready => Ok(()),
        Some(r) => Err(CoreError::DomainViolation(DomainError::RouteNotReady {
            route: r.route.clone(),
            period: r.period.key(),
            remaining: r.remaining,
        })),
        None => Err(CoreError::Internal(format!(
            "route readiness for '{}' was not loaded",
            process.route
        ))),
    }
}
