// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ODN queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::Odn;

use crate::data_models::OdnRow;
use crate::diesel_schema::odns;
use crate::error::PersistenceError;

/// Returns the process an ODN belongs to.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the ODN does not exist.
pub fn get_odn_process_id(
    conn: &mut SqliteConnection,
    odn_id: i64,
) -> Result<i64, PersistenceError> {
    odns::table
        .filter(odns::odn_id.eq(odn_id))
        .select(odns::process_id)
        .first::<i64>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("ODN {odn_id}")))
}

/// Lists the ODNs of a process in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_odns_for_process(
    conn: &mut SqliteConnection,
    process_id: i64,
) -> Result<Vec<Odn>, PersistenceError> {
    let rows: Vec<OdnRow> = odns::table
        .filter(odns::process_id.eq(process_id))
        .order(odns::odn_id.asc())
        .select(OdnRow::as_select())
        .load::<OdnRow>(conn)?;

    rows.into_iter().map(OdnRow::into_domain).collect()
}

/// Lists the ODNs of several processes in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_odns_for_processes(
    conn: &mut SqliteConnection,
    process_ids: &[i64],
) -> Result<Vec<Odn>, PersistenceError> {
    if process_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<OdnRow> = odns::table
        .filter(odns::process_id.eq_any(process_ids))
        .order(odns::odn_id.asc())
        .select(OdnRow::as_select())
        .load::<OdnRow>(conn)?;

    rows.into_iter().map(OdnRow::into_domain).collect()
}
