// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility registration and routing.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::{Facility, FacilityPeriod};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::facilities;
use crate::error::PersistenceError;

/// Inserts a new facility.
///
/// # Returns
///
/// The facility ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert_facility(
    conn: &mut SqliteConnection,
    facility: &Facility,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(facilities::table)
        .values((
            facilities::name.eq(&facility.name),
            facilities::region.eq(&facility.region),
            facilities::zone.eq(&facility.zone),
            facilities::woreda.eq(&facility.woreda),
            facilities::route.eq(facility.route()),
            facilities::period_class.eq(facility.period.map(|p| p.as_str())),
            facilities::created_at.eq(created_at),
        ))
        .execute(conn)?;

    let facility_id: i64 = conn.get_last_insert_rowid()?;
    info!(facility_id, name = %facility.name, "Registered facility");
    Ok(facility_id)
}

/// Reassigns a facility's route and period class.
///
/// Processes already started keep the route they were started with.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the facility does not exist.
pub fn update_facility_routing(
    conn: &mut SqliteConnection,
    facility_id: i64,
    route: Option<&str>,
    period: Option<FacilityPeriod>,
) -> Result<(), PersistenceError> {
    let rows: usize =
        diesel::update(facilities::table.filter(facilities::facility_id.eq(facility_id)))
            .set((
                facilities::route.eq(route),
                facilities::period_class.eq(period.map(|p| p.as_str())),
            ))
            .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!("Facility {facility_id}")));
    }
    info!(facility_id, route, "Updated facility routing");
    Ok(())
}
