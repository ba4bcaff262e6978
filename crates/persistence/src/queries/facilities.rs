// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::Facility;

use crate::data_models::FacilityRow;
use crate::diesel_schema::facilities;
use crate::error::PersistenceError;

/// Retrieves a facility by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the facility does not exist.
pub fn get_facility(
    conn: &mut SqliteConnection,
    facility_id: i64,
) -> Result<Facility, PersistenceError> {
    let row: Option<FacilityRow> = facilities::table
        .filter(facilities::facility_id.eq(facility_id))
        .select(FacilityRow::as_select())
        .first::<FacilityRow>(conn)
        .optional()?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("Facility {facility_id}")))?
        .into_domain()
}

/// Lists every facility, ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_facilities(conn: &mut SqliteConnection) -> Result<Vec<Facility>, PersistenceError> {
    let rows: Vec<FacilityRow> = facilities::table
        .order(facilities::facility_id.asc())
        .select(FacilityRow::as_select())
        .load::<FacilityRow>(conn)?;

    rows.into_iter().map(FacilityRow::into_domain).collect()
}

/// Lists the facilities currently assigned to a route.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_facilities_on_route(
    conn: &mut SqliteConnection,
    route: &str,
) -> Result<Vec<Facility>, PersistenceError> {
    let rows: Vec<FacilityRow> = facilities::table
        .filter(facilities::route.eq(route))
        .order(facilities::facility_id.asc())
        .select(FacilityRow::as_select())
        .load::<FacilityRow>(conn)?;

    rows.into_iter().map(FacilityRow::into_domain).collect()
}

/// Lists the distinct routes assigned to facilities.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_facility_routes(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    let routes: Vec<Option<String>> = facilities::table
        .select(facilities::route)
        .filter(facilities::route.is_not_null())
        .distinct()
        .load::<Option<String>>(conn)?;

    Ok(routes.into_iter().flatten().collect())
}
