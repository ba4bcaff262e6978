// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writing the result of a process or ODN command.
//!
//! Updates and deletes are versioned: the row is only touched if it is
//! still at the version the command was computed from. A write that
//! matches no row fails with `PersistenceError::StaleWrite` and the
//! surrounding transaction is rolled back.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow::{Change, TransitionResult};
use odn_flow_domain::{FlagStamp, Odn, PodOutcome, Process};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{POD_CONFIRMED, POD_NOT_CONFIRMED, month_index_column};
use crate::diesel_schema::{odns, processes};
use crate::error::{PersistenceError, is_unique_violation};
use crate::mutations::audit::persist_audit_event;

/// IDs assigned while persisting a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedTransition {
    /// The process the transition touched, including a freshly inserted one.
    pub process_id: Option<i64>,
    /// IDs of inserted ODNs, in insertion order.
    pub odn_ids: Vec<i64>,
    /// The audit event ID, or `None` for a no-op.
    pub event_id: Option<i64>,
}

/// Flag columns of an ODN row.
struct OdnColumns<'a> {
    ewm_by: Option<&'a str>,
    ewm_at: Option<&'a str>,
    pod_status: Option<&'static str>,
    pod_number: Option<&'a str>,
    arrival_kilometer: Option<i64>,
    pod_reason: Option<&'a str>,
    pod_by: Option<&'a str>,
    pod_at: Option<&'a str>,
    quality_feedback: Option<&'a str>,
    quality_by: Option<&'a str>,
    quality_at: Option<&'a str>,
    signed_by: Option<&'a str>,
    signed_at: Option<&'a str>,
    handover_by: Option<&'a str>,
    handover_at: Option<&'a str>,
}

fn by(stamp: Option<&FlagStamp>) -> Option<&str> {
    stamp.map(|s| s.by.as_str())
}

fn at(stamp: Option<&FlagStamp>) -> Option<&str> {
    stamp.map(|s| s.at.as_str())
}

impl<'a> OdnColumns<'a> {
    fn of(odn: &'a Odn) -> Self {
        let (pod_status, pod_number, arrival_kilometer, pod_reason) =
            match odn.pod.as_ref().map(|p| &p.outcome) {
                Some(PodOutcome::Confirmed {
                    pod_number,
                    arrival_kilometer,
                }) => (
                    Some(POD_CONFIRMED),
                    Some(pod_number.as_str()),
                    Some(*arrival_kilometer),
                    None,
                ),
                Some(PodOutcome::NotConfirmed { reason }) => {
                    (Some(POD_NOT_CONFIRMED), None, None, Some(reason.as_str()))
                }
                None => (None, None, None, None),
            };
        let pod_stamp: Option<&FlagStamp> = odn.pod.as_ref().map(|p| &p.stamp);
        let quality_stamp: Option<&FlagStamp> = odn.quality.as_ref().map(|q| &q.stamp);

        Self {
            ewm_by: by(odn.ewm_completed.as_ref()),
            ewm_at: at(odn.ewm_completed.as_ref()),
            pod_status,
            pod_number,
            arrival_kilometer,
            pod_reason,
            pod_by: by(pod_stamp),
            pod_at: at(pod_stamp),
            quality_feedback: odn.quality.as_ref().and_then(|q| q.feedback.as_deref()),
            quality_by: by(quality_stamp),
            quality_at: at(quality_stamp),
            signed_by: by(odn.documents_signed.as_ref()),
            signed_at: at(odn.documents_signed.as_ref()),
            handover_by: by(odn.documents_handover.as_ref()),
            handover_at: at(odn.documents_handover.as_ref()),
        }
    }
}

fn stale(entity: &'static str, id: i64, expected_version: i64) -> PersistenceError {
    PersistenceError::StaleWrite {
        entity,
        id,
        expected_version,
    }
}

fn insert_process(conn: &mut SqliteConnection, process: &Process) -> Result<i64, PersistenceError> {
    diesel::insert_into(processes::table)
        .values((
            processes::facility_id.eq(process.facility_id),
            processes::route.eq(&process.route),
            processes::period_year.eq(process.period.year()),
            processes::period_month_index.eq(month_index_column(&process.period)),
            processes::mode.eq(process.mode.as_str()),
            processes::status.eq(process.status.as_str()),
            processes::o2c_officer.eq(process.officers.o2c.as_deref()),
            processes::ewm_officer.eq(process.officers.ewm.as_deref()),
            processes::pi_officer.eq(process.officers.pi.as_deref()),
            processes::tm_officer.eq(process.officers.tm.as_deref()),
            processes::dispatch_officer.eq(process.officers.dispatch.as_deref()),
            processes::started_at.eq(&process.started_at),
            processes::updated_at.eq(&process.updated_at),
            processes::version.eq(process.version),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::ProcessAlreadyOpen {
                    facility_id: process.facility_id,
                    period: process.period.key(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let process_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        process_id,
        facility_id = process.facility_id,
        route = %process.route,
        period = %process.period,
        "Inserted process"
    );
    Ok(process_id)
}

fn update_process(
    conn: &mut SqliteConnection,
    process: &Process,
    expected_version: i64,
) -> Result<i64, PersistenceError> {
    let process_id: i64 = process
        .process_id
        .ok_or_else(|| PersistenceError::Other("cannot update an unsaved process".to_string()))?;

    let rows: usize = diesel::update(
        processes::table
            .filter(processes::process_id.eq(process_id))
            .filter(processes::version.eq(expected_version)),
    )
    .set((
        processes::status.eq(process.status.as_str()),
        processes::o2c_officer.eq(process.officers.o2c.as_deref()),
        processes::ewm_officer.eq(process.officers.ewm.as_deref()),
        processes::pi_officer.eq(process.officers.pi.as_deref()),
        processes::tm_officer.eq(process.officers.tm.as_deref()),
        processes::dispatch_officer.eq(process.officers.dispatch.as_deref()),
        processes::updated_at.eq(&process.updated_at),
        processes::version.eq(process.version),
    ))
    .execute(conn)?;

    if rows == 0 {
        return Err(stale("Process", process_id, expected_version));
    }
    debug!(
        process_id,
        status = %process.status,
        version = process.version,
        "Updated process"
    );
    Ok(process_id)
}

fn delete_process(
    conn: &mut SqliteConnection,
    process_id: i64,
    expected_version: i64,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        processes::table
            .filter(processes::process_id.eq(process_id))
            .filter(processes::version.eq(expected_version)),
    )
    .execute(conn)?;

    if rows == 0 {
        return Err(stale("Process", process_id, expected_version));
    }
    info!(process_id, "Deleted process");
    Ok(())
}

fn insert_odn(conn: &mut SqliteConnection, odn: &Odn) -> Result<i64, PersistenceError> {
    let columns: OdnColumns<'_> = OdnColumns::of(odn);
    diesel::insert_into(odns::table)
        .values((
            odns::process_id.eq(odn.process_id),
            odns::odn_number.eq(&odn.odn_number),
            odns::ewm_completed_by.eq(columns.ewm_by),
            odns::ewm_completed_at.eq(columns.ewm_at),
            odns::pod_status.eq(columns.pod_status),
            odns::pod_number.eq(columns.pod_number),
            odns::arrival_kilometer.eq(columns.arrival_kilometer),
            odns::pod_reason.eq(columns.pod_reason),
            odns::pod_by.eq(columns.pod_by),
            odns::pod_at.eq(columns.pod_at),
            odns::quality_feedback.eq(columns.quality_feedback),
            odns::quality_by.eq(columns.quality_by),
            odns::quality_at.eq(columns.quality_at),
            odns::documents_signed_by.eq(columns.signed_by),
            odns::documents_signed_at.eq(columns.signed_at),
            odns::documents_handover_by.eq(columns.handover_by),
            odns::documents_handover_at.eq(columns.handover_at),
            odns::updated_at.eq(&odn.updated_at),
            odns::version.eq(odn.version),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateOdn {
                    odn_number: odn.odn_number.clone(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let odn_id: i64 = conn.get_last_insert_rowid()?;
    debug!(odn_id, process_id = odn.process_id, odn_number = %odn.odn_number, "Inserted ODN");
    Ok(odn_id)
}

fn update_odn(
    conn: &mut SqliteConnection,
    odn: &Odn,
    expected_version: i64,
) -> Result<(), PersistenceError> {
    let odn_id: i64 = odn
        .odn_id
        .ok_or_else(|| PersistenceError::Other("cannot update an unsaved ODN".to_string()))?;
    let columns: OdnColumns<'_> = OdnColumns::of(odn);

    let rows: usize = diesel::update(
        odns::table
            .filter(odns::odn_id.eq(odn_id))
            .filter(odns::version.eq(expected_version)),
    )
    .set((
        odns::odn_number.eq(&odn.odn_number),
        odns::ewm_completed_by.eq(columns.ewm_by),
        odns::ewm_completed_at.eq(columns.ewm_at),
        odns::pod_status.eq(columns.pod_status),
        odns::pod_number.eq(columns.pod_number),
        odns::arrival_kilometer.eq(columns.arrival_kilometer),
        odns::pod_reason.eq(columns.pod_reason),
        odns::pod_by.eq(columns.pod_by),
        odns::pod_at.eq(columns.pod_at),
        odns::quality_feedback.eq(columns.quality_feedback),
        odns::quality_by.eq(columns.quality_by),
        odns::quality_at.eq(columns.quality_at),
        odns::documents_signed_by.eq(columns.signed_by),
        odns::documents_signed_at.eq(columns.signed_at),
        odns::documents_handover_by.eq(columns.handover_by),
        odns::documents_handover_at.eq(columns.handover_at),
        odns::updated_at.eq(&odn.updated_at),
        odns::version.eq(odn.version),
    ))
    .execute(conn)
    .map_err(|e| {
        if is_unique_violation(&e) {
            PersistenceError::DuplicateOdn {
                odn_number: odn.odn_number.clone(),
            }
        } else {
            PersistenceError::from(e)
        }
    })?;

    if rows == 0 {
        return Err(stale("ODN", odn_id, expected_version));
    }
    debug!(odn_id, version = odn.version, "Updated ODN");
    Ok(())
}

fn delete_odn(
    conn: &mut SqliteConnection,
    odn_id: i64,
    expected_version: i64,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::delete(
        odns::table
            .filter(odns::odn_id.eq(odn_id))
            .filter(odns::version.eq(expected_version)),
    )
    .execute(conn)?;

    if rows == 0 {
        return Err(stale("ODN", odn_id, expected_version));
    }
    debug!(odn_id, "Deleted ODN");
    Ok(())
}

/// Persists the changes and audit event of a transition.
///
/// Must run inside a transaction; a failed write leaves earlier writes of
/// the same transition to be rolled back by the caller. A no-op transition
/// writes nothing.
///
/// # Errors
///
/// Returns an error if:
/// - A versioned write finds the row at another version
/// - A unique index rejects a process, ODN number or assignment
/// - The database operation fails
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistedTransition, PersistenceError> {
    let mut persisted: PersistedTransition = PersistedTransition {
        process_id: result
            .new_state
            .process
            .as_ref()
            .and_then(|p| p.process_id),
        ..PersistedTransition::default()
    };

    for change in &result.changes {
        match change {
            Change::InsertProcess(process) => {
                persisted.process_id = Some(insert_process(conn, process)?);
            }
            Change::UpdateProcess {
                process,
                expected_version,
            } => {
                persisted.process_id = Some(update_process(conn, process, *expected_version)?);
            }
            Change::DeleteProcess {
                process_id,
                expected_version,
            } => {
                delete_process(conn, *process_id, *expected_version)?;
                persisted.process_id = Some(*process_id);
            }
            Change::InsertOdn(odn) => {
                persisted.odn_ids.push(insert_odn(conn, odn)?);
            }
            Change::UpdateOdn {
                odn,
                expected_version,
            } => update_odn(conn, odn, *expected_version)?,
            Change::DeleteOdn {
                odn_id,
                expected_version,
            } => delete_odn(conn, *odn_id, *expected_version)?,
        }
    }

    if let Some(event) = &result.audit_event {
        let process_id: Option<i64> = event.process_id.or(persisted.process_id);
        persisted.event_id = Some(persist_audit_event(conn, event, process_id)?);
    }

    Ok(persisted)
}
