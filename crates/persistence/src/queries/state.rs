// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Loading the `State` a command is applied to.
//!
//! Route readiness and the route assignment are loaded alongside the
//! process so that the vehicle request and assignment guards are evaluated
//! against the same transaction that commits their result.

use diesel::SqliteConnection;
use odn_flow::State;
use odn_flow_domain::{Facility, Odn, Process, ReportingPeriod, RouteAssignment, RouteReadiness};

use crate::error::PersistenceError;
use crate::queries::facilities::get_facility;
use crate::queries::odns::list_odns_for_process;
use crate::queries::processes::{find_open_process, get_process};
use crate::queries::routes::{find_route_assignment, route_readiness};

fn state_for_process(
    conn: &mut SqliteConnection,
    facility: Facility,
    process: Process,
) -> Result<State, PersistenceError> {
    let process_id: i64 = process
        .process_id
        .ok_or_else(|| PersistenceError::ReconstructionError("process without ID".to_string()))?;
    let odns: Vec<Odn> = list_odns_for_process(conn, process_id)?;
    let readiness: RouteReadiness = route_readiness(conn, &process.route, &process.period)?;
    let assignment: Option<RouteAssignment> =
        find_route_assignment(conn, &process.route, &process.period)?;

    Ok(State {
        facility,
        period: process.period,
        odns,
        route_readiness: Some(readiness),
        route_assignment: assignment,
        process: Some(process),
    })
}

/// Loads the state of a facility in a period, with its open process if any.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the facility does not exist.
pub fn load_facility_state(
    conn: &mut SqliteConnection,
    facility_id: i64,
    period: &ReportingPeriod,
) -> Result<State, PersistenceError> {
    let facility: Facility = get_facility(conn, facility_id)?;
    match find_open_process(conn, facility_id, period)? {
        Some(process) => state_for_process(conn, facility, process),
        None => Ok(State::new(facility, *period)),
    }
}

/// Loads the state around an existing process.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the process does not exist.
pub fn load_process_state(
    conn: &mut SqliteConnection,
    process_id: i64,
) -> Result<State, PersistenceError> {
    let process: Process = get_process(conn, process_id)?;
    let facility: Facility = get_facility(conn, process.facility_id)?;
    state_for_process(conn, facility, process)
}
