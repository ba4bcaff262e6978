// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route assignment and readiness queries.
//!
//! Readiness is never stored. It is evaluated from the facilities on the
//! route and the processes of the period every time it is asked for, so
//! callers inside a transaction always see the committed picture.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::{
    EligibilityMode, Facility, Process, ReportingPeriod, RouteAssignment, RouteReadiness,
    evaluate_route_readiness, filter_eligible,
};
use std::collections::BTreeSet;

use crate::data_models::{RouteAssignmentRow, month_index_column};
use crate::diesel_schema::route_assignments;
use crate::error::PersistenceError;
use crate::queries::facilities::{list_facilities_on_route, list_facility_routes};
use crate::queries::processes::list_processes_for_period;

/// Finds the assignment of a route for a period.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_route_assignment(
    conn: &mut SqliteConnection,
    route: &str,
    period: &ReportingPeriod,
) -> Result<Option<RouteAssignment>, PersistenceError> {
    let row: Option<RouteAssignmentRow> = route_assignments::table
        .filter(route_assignments::route.eq(route))
        .filter(route_assignments::period_year.eq(period.year()))
        .filter(route_assignments::period_month_index.eq(month_index_column(period)))
        .select(RouteAssignmentRow::as_select())
        .first::<RouteAssignmentRow>(conn)
        .optional()?;

    row.map(RouteAssignmentRow::into_domain).transpose()
}

/// Lists every assignment made for a period.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_route_assignments(
    conn: &mut SqliteConnection,
    period: &ReportingPeriod,
) -> Result<Vec<RouteAssignment>, PersistenceError> {
    let rows: Vec<RouteAssignmentRow> = route_assignments::table
        .filter(route_assignments::period_year.eq(period.year()))
        .filter(route_assignments::period_month_index.eq(month_index_column(period)))
        .order(route_assignments::route.asc())
        .select(RouteAssignmentRow::as_select())
        .load::<RouteAssignmentRow>(conn)?;

    rows.into_iter()
        .map(RouteAssignmentRow::into_domain)
        .collect()
}

/// Evaluates readiness of a route for a period.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn route_readiness(
    conn: &mut SqliteConnection,
    route: &str,
    period: &ReportingPeriod,
) -> Result<RouteReadiness, PersistenceError> {
    let facilities: Vec<Facility> = list_facilities_on_route(conn, route)?;
    let eligible_ids: Vec<i64> = filter_eligible(&facilities, period, EligibilityMode::Regular)
        .into_iter()
        .filter_map(|f| f.facility_id)
        .collect();
    let processes: Vec<Process> = list_processes_for_period(conn, period)?;

    Ok(evaluate_route_readiness(
        route,
        *period,
        &eligible_ids,
        &processes,
    ))
}

/// Evaluates readiness of every route known for a period.
///
/// Routes are those assigned to a facility plus those recorded on a
/// process of the period, in name order.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn list_route_readiness(
    conn: &mut SqliteConnection,
    period: &ReportingPeriod,
) -> Result<Vec<RouteReadiness>, PersistenceError> {
    let mut routes: BTreeSet<String> = list_facility_routes(conn)?.into_iter().collect();
    routes.extend(
        list_processes_for_period(conn, period)?
            .into_iter()
            .map(|p| p.route),
    );

    routes
        .iter()
        .map(|route| route_readiness(conn, route, period))
        .collect()
}
