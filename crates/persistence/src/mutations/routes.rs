// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route assignment persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::RouteAssignment;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::month_index_column;
use crate::diesel_schema::route_assignments;
use crate::error::{PersistenceError, is_unique_violation};

/// Inserts a route assignment and returns its ID.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateAssignment` if the route already has
/// an assignment for the period.
pub fn insert_route_assignment(
    conn: &mut SqliteConnection,
    assignment: &RouteAssignment,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(route_assignments::table)
        .values((
            route_assignments::route.eq(&assignment.route),
            route_assignments::period_year.eq(assignment.period.year()),
            route_assignments::period_month_index.eq(month_index_column(&assignment.period)),
            route_assignments::vehicle_id.eq(assignment.vehicle_id),
            route_assignments::driver_id.eq(assignment.driver_id),
            route_assignments::deliverer_id.eq(assignment.deliverer_id),
            route_assignments::assigned_by.eq(&assignment.assigned_by),
            route_assignments::created_at.eq(&assignment.created_at),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateAssignment {
                    route: assignment.route.clone(),
                    period: assignment.period.key(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let assignment_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        assignment_id,
        route = %assignment.route,
        period = %assignment.period,
        vehicle_id = assignment.vehicle_id,
        "Created route assignment"
    );
    Ok(assignment_id)
}
