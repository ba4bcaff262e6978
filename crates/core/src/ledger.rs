// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ODN commands.
//!
//! Adding, renaming and deleting ODNs belongs to the officer who started
//! O2C and is only possible while the process is `o2c_started` or
//! `completed`. Sub-status flags belong to the downstream roles and only
//! become writable once the parent process has reached the flag's stage.

use crate::apply::{audit, rejected, require_process, require_process_id};
use crate::error::CoreError;
use crate::state::{Change, State, TransitionResult};
use odn_flow_audit::{Actor, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::{
    CorrectableFlag, DomainError, FlagStamp, Odn, OdnStatusUpdate, PodOutcome, PodRecord,
    Process, ProcessStatus, QualityRecord, Role, normalize_odn_number, normalize_optional_text,
    validate_odn_unique, validate_pod_outcome,
};

/// Checks that the actor may add, rename or delete ODNs on the process.
fn check_odn_editable(actor: &Actor, process: &Process, odn_number: &str) -> Result<(), CoreError> {
    if actor.role != Role::O2cOfficer || !process.is_o2c_owner(&actor.id) {
        return Err(rejected(
            actor,
            process.status.as_str(),
            "odn_edit",
            String::from("only the officer who started O2C may change ODNs"),
        ));
    }
    if !process.status.allows_odn_edits() {
        return Err(CoreError::DomainViolation(DomainError::OdnLocked {
            odn_number: odn_number.to_string(),
            process_status: process.status,
        }));
    }
    Ok(())
}

fn find_odn(state: &State, odn_id: i64) -> Result<&Odn, CoreError> {
    state
        .odn(odn_id)
        .ok_or(CoreError::DomainViolation(DomainError::OdnNotFound { odn_id }))
}

fn odn_snapshot(odn: &Odn) -> StateSnapshot {
    StateSnapshot::new(format!(
        "odn={},ewm={},pod={},quality={},signed={},handover={},version={}",
        odn.odn_number,
        odn.ewm_completed.is_some(),
        odn.pod.as_ref().map_or("none", |p| match p.outcome {
            PodOutcome::Confirmed { .. } => "confirmed",
            PodOutcome::NotConfirmed { .. } => "not_confirmed",
        }),
        odn.quality.is_some(),
        odn.documents_signed.is_some(),
        odn.documents_handover.is_some(),
        odn.version
    ))
}

fn replace_odn(state: &State, updated: &Odn) -> State {
    let odns: Vec<Odn> = state
        .odns
        .iter()
        .map(|o| {
            if o.odn_id == updated.odn_id {
                updated.clone()
            } else {
                o.clone()
            }
        })
        .collect();
    State {
        odns,
        ..state.clone()
    }
}

pub(crate) fn add_odn(
    state: &State,
    odn_number: &str,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    check_odn_editable(&actor, process, odn_number.trim())?;
    let odn_number: String = normalize_odn_number(odn_number)?;
    validate_odn_unique(&state.odns, &odn_number, None)?;

    let odn: Odn = Odn::new(process_id, &odn_number, &timestamp);

    let before: StateSnapshot = state.to_snapshot();
    let mut new_state: State = state.clone();
    new_state.odns.push(odn.clone());
    let after: StateSnapshot = new_state.to_snapshot();

    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "AddOdn",
        format!("Added ODN '{odn_number}' to process {process_id}"),
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::InsertOdn(odn)],
        audit_event: Some(audit_event),
    })
}

pub(crate) fn edit_odn(
    state: &State,
    odn_id: i64,
    odn_number: &str,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    let existing: &Odn = find_odn(state, odn_id)?;

    check_odn_editable(&actor, process, &existing.odn_number)?;
    let odn_number: String = normalize_odn_number(odn_number)?;

    if odn_number == existing.odn_number {
        return Ok(TransitionResult::unchanged(state.clone()));
    }
    validate_odn_unique(&state.odns, &odn_number, Some(odn_id))?;

    let mut updated: Odn = existing.clone();
    updated.odn_number.clone_from(&odn_number);
    updated.updated_at.clone_from(&timestamp);
    updated.version = existing.version + 1;

    let before: StateSnapshot = odn_snapshot(existing);
    let after: StateSnapshot = odn_snapshot(&updated);
    let new_state: State = replace_odn(state, &updated);

    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "EditOdn",
        format!(
            "Renamed ODN '{}' to '{odn_number}' in process {process_id}",
            existing.odn_number
        ),
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::UpdateOdn {
            odn: updated,
            expected_version: existing.version,
        }],
        audit_event: Some(audit_event),
    })
}

pub(crate) fn delete_odn(
    state: &State,
    odn_id: i64,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    let existing: &Odn = find_odn(state, odn_id)?;

    check_odn_editable(&actor, process, &existing.odn_number)?;

    let before: StateSnapshot = state.to_snapshot();
    let new_state: State = State {
        odns: state
            .odns
            .iter()
            .filter(|o| o.odn_id != Some(odn_id))
            .cloned()
            .collect(),
        ..state.clone()
    };
    let after: StateSnapshot = new_state.to_snapshot();

    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "DeleteOdn",
        format!(
            "Deleted ODN '{}' from process {process_id}",
            existing.odn_number
        ),
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::DeleteOdn {
            odn_id,
            expected_version: existing.version,
        }],
        audit_event: Some(audit_event),
    })
}

/// Sets one sub-status flag.
///
/// Flags without a payload are idempotent. POD and quality reject a
/// second confirmation; a POD recorded as not confirmed may be
/// overwritten by a later attempt.
pub(crate) fn update_odn_status(
    state: &State,
    odn_id: i64,
    update: OdnStatusUpdate,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    let existing: &Odn = find_odn(state, odn_id)?;
    let action: &'static str = update.action_name();

    let owner: Role = update.owner();
    if actor.role != owner {
        return Err(rejected(
            &actor,
            process.status.as_str(),
            action,
            format!("flag is owned by {owner}"),
        ));
    }
    let visible_from: ProcessStatus = update.visible_from();
    if !process.status.has_reached(visible_from) {
        return Err(rejected(
            &actor,
            process.status.as_str(),
            action,
            format!("process must reach {visible_from} first"),
        ));
    }

    let stamp: FlagStamp = FlagStamp::new(&actor.id, &timestamp);
    let mut updated: Odn = existing.clone();

    match update {
        OdnStatusUpdate::EwmCompleted => {
            if existing.ewm_completed.is_some() {
                return Ok(TransitionResult::unchanged(state.clone()));
            }
            updated.ewm_completed = Some(stamp);
        }
        OdnStatusUpdate::DocumentsSigned => {
            if existing.documents_signed.is_some() {
                return Ok(TransitionResult::unchanged(state.clone()));
            }
            updated.documents_signed = Some(stamp);
        }
        OdnStatusUpdate::DocumentsHandover => {
            if existing.documents_handover.is_some() {
                return Ok(TransitionResult::unchanged(state.clone()));
            }
            updated.documents_handover = Some(stamp);
        }
        OdnStatusUpdate::Pod(outcome) => {
            let outcome: PodOutcome = validate_pod_outcome(&outcome)?;
            if existing.is_pod_confirmed() {
                return Err(rejected(
                    &actor,
                    "pod_confirmed",
                    action,
                    format!("POD for ODN '{}' is already confirmed", existing.odn_number),
                ));
            }
            updated.pod = Some(PodRecord { outcome, stamp });
        }
        OdnStatusUpdate::QualityConfirmed { feedback } => {
            if existing.is_quality_confirmed() {
                return Err(rejected(
                    &actor,
                    "quality_confirmed",
                    action,
                    format!(
                        "quality for ODN '{}' is already confirmed",
                        existing.odn_number
                    ),
                ));
            }
            updated.quality = Some(QualityRecord {
                feedback: normalize_optional_text(feedback.as_deref()),
                stamp,
            });
        }
    }

    updated.updated_at.clone_from(&timestamp);
    updated.version = existing.version + 1;

    let before: StateSnapshot = odn_snapshot(existing);
    let after: StateSnapshot = odn_snapshot(&updated);
    let new_state: State = replace_odn(state, &updated);

    let audit_event: AuditEvent = audit(
        actor,
        cause,
        action,
        format!(
            "ODN '{}' of process {process_id}: {action}",
            existing.odn_number
        ),
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::UpdateOdn {
            odn: updated,
            expected_version: existing.version,
        }],
        audit_event: Some(audit_event),
    })
}

/// Clears a confirmed flag. Clearing an unset flag is a no-op.
pub(crate) fn correct_odn(
    state: &State,
    odn_id: i64,
    flag: CorrectableFlag,
    actor: Actor,
    cause: Cause,
    timestamp: String,
) -> Result<TransitionResult, CoreError> {
    let process: &Process = require_process(state)?;
    let process_id: i64 = require_process_id(process)?;
    let existing: &Odn = find_odn(state, odn_id)?;

    if actor.role != Role::Admin {
        return Err(rejected(
            &actor,
            flag.as_str(),
            "cleared",
            format!("only {} may clear confirmed flags", Role::Admin),
        ));
    }

    let mut updated: Odn = existing.clone();
    let was_set: bool = match flag {
        CorrectableFlag::QualityConfirmed => updated.quality.take().is_some(),
        CorrectableFlag::DocumentsSigned => updated.documents_signed.take().is_some(),
        CorrectableFlag::DocumentsHandover => updated.documents_handover.take().is_some(),
    };
    if !was_set {
        return Ok(TransitionResult::unchanged(state.clone()));
    }

    updated.updated_at.clone_from(&timestamp);
    updated.version = existing.version + 1;

    let before: StateSnapshot = odn_snapshot(existing);
    let after: StateSnapshot = odn_snapshot(&updated);
    let new_state: State = replace_odn(state, &updated);

    let audit_event: AuditEvent = audit(
        actor,
        cause,
        "CorrectOdn",
        format!(
            "Cleared {flag} on ODN '{}' of process {process_id}",
            existing.odn_number
        ),
        before,
        after,
        timestamp,
        Some(process_id),
    );

    Ok(TransitionResult {
        new_state,
        changes: vec![Change::UpdateOdn {
            odn: updated,
            expected_version: existing.version,
        }],
        audit_event: Some(audit_event),
    })
}
