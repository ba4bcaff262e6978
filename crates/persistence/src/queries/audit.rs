// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::Role;
use std::str::FromStr;

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    process_id: Option<i64>,
    #[allow(dead_code)]
    actor_id: String,
    #[allow(dead_code)]
    actor_role: String,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    occurred_at: String,
}

impl AuditEventRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&self.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&self.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&self.after_snapshot_json)?;

        let role: Role = Role::from_str(&actor_data.role)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        Ok(AuditEvent {
            event_id: Some(self.event_id),
            process_id: self.process_id,
            actor: Actor::new(actor_data.id, role),
            cause: Cause::new(cause_data.id, cause_data.description),
            action: Action::new(action_data.name, action_data.details),
            before: StateSnapshot::new(before_data.data),
            after: StateSnapshot::new(after_data.data),
            occurred_at: self.occurred_at,
        })
    }
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: Option<AuditEventRow> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn)
        .optional()?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("Audit event {event_id}")))?
        .into_event()
}

/// Retrieves the audit trail of a process in the order it was written.
///
/// Events of a reverted start stay attached to the deleted process ID.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn list_audit_events_for_process(
    conn: &mut SqliteConnection,
    process_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::process_id.eq(process_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?;

    rows.into_iter().map(AuditEventRow::into_event).collect()
}

/// Counts every stored audit event.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_audit_events(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(audit_events::table.count().get_result::<i64>(conn)?)
}
