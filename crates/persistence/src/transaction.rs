// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use odn_flow::{State, TransitionResult};
use odn_flow_audit::AuditEvent;
use odn_flow_domain::{
    Deliverer, Driver, Facility, FacilityPeriod, Odn, Process, ReportingPeriod, RouteAssignment,
    RouteReadiness, Vehicle,
};

use crate::error::PersistenceError;
use crate::mutations::{self, PersistedTransition};
use crate::queries;

/// A handle on an open database transaction.
///
/// Obtained from `Persistence::atomically` or `Persistence::read`. Every
/// read and write made through the handle belongs to the same transaction.
pub struct WorkflowTransaction<'c> {
    pub(crate) conn: &'c mut SqliteConnection,
}

impl WorkflowTransaction<'_> {
    // ========================================================================
    // Facilities
    // ========================================================================

    /// Retrieves a facility by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the facility does not exist.
    pub fn get_facility(&mut self, facility_id: i64) -> Result<Facility, PersistenceError> {
        queries::facilities::get_facility(self.conn, facility_id)
    }

    /// Lists every facility, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_facilities(&mut self) -> Result<Vec<Facility>, PersistenceError> {
        queries::facilities::list_facilities(self.conn)
    }

    /// Inserts a facility and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_facility(
        &mut self,
        facility: &Facility,
        created_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::facilities::insert_facility(self.conn, facility, created_at)
    }

    /// Reassigns a facility's route and period class.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the facility does not exist.
    pub fn update_facility_routing(
        &mut self,
        facility_id: i64,
        route: Option<&str>,
        period: Option<FacilityPeriod>,
    ) -> Result<(), PersistenceError> {
        mutations::facilities::update_facility_routing(self.conn, facility_id, route, period)
    }

    // ========================================================================
    // Processes and ODNs
    // ========================================================================

    /// Retrieves a process by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the process does not exist.
    pub fn get_process(&mut self, process_id: i64) -> Result<Process, PersistenceError> {
        queries::processes::get_process(self.conn, process_id)
    }

    /// Lists every process of a period, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_processes_for_period(
        &mut self,
        period: &ReportingPeriod,
    ) -> Result<Vec<Process>, PersistenceError> {
        queries::processes::list_processes_for_period(self.conn, period)
    }

    /// Lists the processes of a route and period, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_processes_on_route(
        &mut self,
        route: &str,
        period: &ReportingPeriod,
    ) -> Result<Vec<Process>, PersistenceError> {
        queries::processes::list_processes_on_route(self.conn, route, period)
    }

    /// Returns the process an ODN belongs to.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the ODN does not exist.
    pub fn get_odn_process_id(&mut self, odn_id: i64) -> Result<i64, PersistenceError> {
        queries::odns::get_odn_process_id(self.conn, odn_id)
    }

    /// Lists the ODNs of a process.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_odns_for_process(&mut self, process_id: i64) -> Result<Vec<Odn>, PersistenceError> {
        queries::odns::list_odns_for_process(self.conn, process_id)
    }

    /// Lists the ODNs of several processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_odns_for_processes(
        &mut self,
        process_ids: &[i64],
    ) -> Result<Vec<Odn>, PersistenceError> {
        queries::odns::list_odns_for_processes(self.conn, process_ids)
    }

    /// Loads the state of a facility in a period.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the facility does not exist.
    pub fn load_facility_state(
        &mut self,
        facility_id: i64,
        period: &ReportingPeriod,
    ) -> Result<State, PersistenceError> {
        queries::state::load_facility_state(self.conn, facility_id, period)
    }

    /// Loads the state around an existing process.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the process does not exist.
    pub fn load_process_state(&mut self, process_id: i64) -> Result<State, PersistenceError> {
        queries::state::load_process_state(self.conn, process_id)
    }

    /// Persists the changes and audit event of a transition.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::StaleWrite` if a row moved on since the
    /// state was loaded, or another error if the write fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistedTransition, PersistenceError> {
        mutations::persist_transition(self.conn, result)
    }

    // ========================================================================
    // Routes
    // ========================================================================

    /// Evaluates readiness of a route for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn route_readiness(
        &mut self,
        route: &str,
        period: &ReportingPeriod,
    ) -> Result<RouteReadiness, PersistenceError> {
        queries::routes::route_readiness(self.conn, route, period)
    }

    /// Evaluates readiness of every known route for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn list_route_readiness(
        &mut self,
        period: &ReportingPeriod,
    ) -> Result<Vec<RouteReadiness>, PersistenceError> {
        queries::routes::list_route_readiness(self.conn, period)
    }

    /// Finds the assignment of a route for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_route_assignment(
        &mut self,
        route: &str,
        period: &ReportingPeriod,
    ) -> Result<Option<RouteAssignment>, PersistenceError> {
        queries::routes::find_route_assignment(self.conn, route, period)
    }

    /// Lists the assignments of a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_route_assignments(
        &mut self,
        period: &ReportingPeriod,
    ) -> Result<Vec<RouteAssignment>, PersistenceError> {
        queries::routes::list_route_assignments(self.conn, period)
    }

    /// Inserts a route assignment and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateAssignment` if the route already
    /// has an assignment for the period.
    pub fn insert_route_assignment(
        &mut self,
        assignment: &RouteAssignment,
    ) -> Result<i64, PersistenceError> {
        mutations::routes::insert_route_assignment(self.conn, assignment)
    }

    // ========================================================================
    // Vehicles, drivers and deliverers
    // ========================================================================

    /// Retrieves a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the vehicle does not exist.
    pub fn get_vehicle(&mut self, vehicle_id: i64) -> Result<Vehicle, PersistenceError> {
        queries::resources::get_vehicle(self.conn, vehicle_id)
    }

    /// Retrieves a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the driver does not exist.
    pub fn get_driver(&mut self, driver_id: i64) -> Result<Driver, PersistenceError> {
        queries::resources::get_driver(self.conn, driver_id)
    }

    /// Retrieves a deliverer by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the deliverer does not exist.
    pub fn get_deliverer(&mut self, deliverer_id: i64) -> Result<Deliverer, PersistenceError> {
        queries::resources::get_deliverer(self.conn, deliverer_id)
    }

    /// Lists every vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, PersistenceError> {
        queries::resources::list_vehicles(self.conn)
    }

    /// Lists every driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_drivers(&mut self) -> Result<Vec<Driver>, PersistenceError> {
        queries::resources::list_drivers(self.conn)
    }

    /// Lists every deliverer.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_deliverers(&mut self) -> Result<Vec<Deliverer>, PersistenceError> {
        queries::resources::list_deliverers(self.conn)
    }

    /// Inserts a vehicle and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the plate number is taken or the write fails.
    pub fn insert_vehicle(&mut self, vehicle: &Vehicle) -> Result<i64, PersistenceError> {
        mutations::resources::insert_vehicle(self.conn, vehicle)
    }

    /// Inserts a driver and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_driver(&mut self, driver: &Driver) -> Result<i64, PersistenceError> {
        mutations::resources::insert_driver(self.conn, driver)
    }

    /// Inserts a deliverer and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_deliverer(&mut self, deliverer: &Deliverer) -> Result<i64, PersistenceError> {
        mutations::resources::insert_deliverer(self.conn, deliverer)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or serialization fails.
    pub fn persist_audit_event(
        &mut self,
        event: &AuditEvent,
        process_id: Option<i64>,
    ) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(self.conn, event, process_id)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(self.conn, event_id)
    }

    /// Retrieves the audit trail of a process.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be deserialized.
    pub fn list_audit_events_for_process(
        &mut self,
        process_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_audit_events_for_process(self.conn, process_id)
    }

    /// Counts every stored audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_audit_events(&mut self) -> Result<i64, PersistenceError> {
        queries::audit::count_audit_events(self.conn)
    }
}
