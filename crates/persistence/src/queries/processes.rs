// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Process queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::{Process, ProcessStatus, ReportingPeriod};

use crate::data_models::{ProcessRow, month_index_column};
use crate::diesel_schema::processes;
use crate::error::PersistenceError;

/// Retrieves a process by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the process does not exist.
pub fn get_process(
    conn: &mut SqliteConnection,
    process_id: i64,
) -> Result<Process, PersistenceError> {
    let row: Option<ProcessRow> = processes::table
        .filter(processes::process_id.eq(process_id))
        .select(ProcessRow::as_select())
        .first::<ProcessRow>(conn)
        .optional()?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("Process {process_id}")))?
        .into_domain()
}

/// Finds the open (not yet dispatched) process of a facility in a period.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_open_process(
    conn: &mut SqliteConnection,
    facility_id: i64,
    period: &ReportingPeriod,
) -> Result<Option<Process>, PersistenceError> {
    let row: Option<ProcessRow> = processes::table
        .filter(processes::facility_id.eq(facility_id))
        .filter(processes::period_year.eq(period.year()))
        .filter(processes::period_month_index.eq(month_index_column(period)))
        .filter(processes::status.ne(ProcessStatus::Dispatched.as_str()))
        .order(processes::process_id.desc())
        .select(ProcessRow::as_select())
        .first::<ProcessRow>(conn)
        .optional()?;

    row.map(ProcessRow::into_domain).transpose()
}

/// Lists every process recorded for a period, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_processes_for_period(
    conn: &mut SqliteConnection,
    period: &ReportingPeriod,
) -> Result<Vec<Process>, PersistenceError> {
    let rows: Vec<ProcessRow> = processes::table
        .filter(processes::period_year.eq(period.year()))
        .filter(processes::period_month_index.eq(month_index_column(period)))
        .order(processes::process_id.asc())
        .select(ProcessRow::as_select())
        .load::<ProcessRow>(conn)?;

    rows.into_iter().map(ProcessRow::into_domain).collect()
}

/// Lists the processes recorded for a route and period, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_processes_on_route(
    conn: &mut SqliteConnection,
    route: &str,
    period: &ReportingPeriod,
) -> Result<Vec<Process>, PersistenceError> {
    let rows: Vec<ProcessRow> = processes::table
        .filter(processes::route.eq(route))
        .filter(processes::period_year.eq(period.year()))
        .filter(processes::period_month_index.eq(month_index_column(period)))
        .order(processes::process_id.asc())
        .select(ProcessRow::as_select())
        .load::<ProcessRow>(conn)?;

    rows.into_iter().map(ProcessRow::into_domain).collect()
}
