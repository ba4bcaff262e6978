// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle, driver and deliverer registration.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::{Deliverer, Driver, Vehicle};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{deliverers, drivers, vehicles};
use crate::error::{PersistenceError, is_unique_violation};

/// Inserts a vehicle and returns its ID.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicatePlateNumber` if the plate number is
/// already registered.
pub fn insert_vehicle(
    conn: &mut SqliteConnection,
    vehicle: &Vehicle,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values((
            vehicles::plate_number.eq(&vehicle.plate_number),
            vehicles::description.eq(vehicle.description.as_deref()),
            vehicles::is_available.eq(i32::from(vehicle.is_available)),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicatePlateNumber {
                    plate_number: vehicle.plate_number.clone(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let vehicle_id: i64 = conn.get_last_insert_rowid()?;
    info!(vehicle_id, plate = %vehicle.plate_number, "Registered vehicle");
    Ok(vehicle_id)
}

/// Inserts a driver and returns its ID.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert_driver(
    conn: &mut SqliteConnection,
    driver: &Driver,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(drivers::table)
        .values((
            drivers::name.eq(&driver.name),
            drivers::phone.eq(driver.phone.as_deref()),
            drivers::is_available.eq(i32::from(driver.is_available)),
        ))
        .execute(conn)?;

    let driver_id: i64 = conn.get_last_insert_rowid()?;
    info!(driver_id, name = %driver.name, "Registered driver");
    Ok(driver_id)
}

/// Inserts a deliverer and returns its ID.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert_deliverer(
    conn: &mut SqliteConnection,
    deliverer: &Deliverer,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(deliverers::table)
        .values((
            deliverers::name.eq(&deliverer.name),
            deliverers::phone.eq(deliverer.phone.as_deref()),
            deliverers::is_available.eq(i32::from(deliverer.is_available)),
        ))
        .execute(conn)?;

    let deliverer_id: i64 = conn.get_last_insert_rowid()?;
    info!(deliverer_id, name = %deliverer.name, "Registered deliverer");
    Ok(deliverer_id)
}
