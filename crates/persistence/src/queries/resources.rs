// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle, driver and deliverer lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use odn_flow_domain::{Deliverer, Driver, Vehicle};

use crate::data_models::{DelivererRow, DriverRow, VehicleRow};
use crate::diesel_schema::{deliverers, drivers, vehicles};
use crate::error::PersistenceError;

/// Retrieves a vehicle by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the vehicle does not exist.
pub fn get_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<Vehicle, PersistenceError> {
    vehicles::table
        .filter(vehicles::vehicle_id.eq(vehicle_id))
        .select(VehicleRow::as_select())
        .first::<VehicleRow>(conn)
        .optional()?
        .map(Vehicle::from)
        .ok_or_else(|| PersistenceError::NotFound(format!("Vehicle {vehicle_id}")))
}

/// Retrieves a driver by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the driver does not exist.
pub fn get_driver(conn: &mut SqliteConnection, driver_id: i64) -> Result<Driver, PersistenceError> {
    drivers::table
        .filter(drivers::driver_id.eq(driver_id))
        .select(DriverRow::as_select())
        .first::<DriverRow>(conn)
        .optional()?
        .map(Driver::from)
        .ok_or_else(|| PersistenceError::NotFound(format!("Driver {driver_id}")))
}

/// Retrieves a deliverer by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the deliverer does not exist.
pub fn get_deliverer(
    conn: &mut SqliteConnection,
    deliverer_id: i64,
) -> Result<Deliverer, PersistenceError> {
    deliverers::table
        .filter(deliverers::deliverer_id.eq(deliverer_id))
        .select(DelivererRow::as_select())
        .first::<DelivererRow>(conn)
        .optional()?
        .map(Deliverer::from)
        .ok_or_else(|| PersistenceError::NotFound(format!("Deliverer {deliverer_id}")))
}

/// Lists every vehicle.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(conn: &mut SqliteConnection) -> Result<Vec<Vehicle>, PersistenceError> {
    let rows: Vec<VehicleRow> = vehicles::table
        .order(vehicles::vehicle_id.asc())
        .select(VehicleRow::as_select())
        .load::<VehicleRow>(conn)?;
    Ok(rows.into_iter().map(Vehicle::from).collect())
}

/// Lists every driver.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_drivers(conn: &mut SqliteConnection) -> Result<Vec<Driver>, PersistenceError> {
    let rows: Vec<DriverRow> = drivers::table
        .order(drivers::driver_id.asc())
        .select(DriverRow::as_select())
        .load::<DriverRow>(conn)?;
    Ok(rows.into_iter().map(Driver::from).collect())
}

/// Lists every deliverer.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_deliverers(conn: &mut SqliteConnection) -> Result<Vec<Deliverer>, PersistenceError> {
    let rows: Vec<DelivererRow> = deliverers::table
        .order(deliverers::deliverer_id.asc())
        .select(DelivererRow::as_select())
        .load::<DelivererRow>(conn)?;
    Ok(rows.into_iter().map(Deliverer::from).collect())
}
