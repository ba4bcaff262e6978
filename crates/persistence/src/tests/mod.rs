// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use odn_flow::{
    AssignmentRequest, AssignmentResult, Command, CoreError, State, TransitionResult, apply,
    assign_route,
};
use odn_flow_audit::{Actor, Cause};
use odn_flow_domain::{
    Driver, EligibilityMode, Facility, FacilityPeriod, ProcessStatus, ReportingPeriod, Role,
    RouteAssignment, RouteReadiness, Vehicle,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{PersistedTransition, Persistence, PersistenceError};

pub const OWNER: &str = "o2c-1";
pub const CREATED_AT: &str = "2026-02-28T08:00:00Z";

/// Either half of a failed workflow operation.
#[derive(Debug)]
pub enum TestError {
    Core(CoreError),
    Persistence(PersistenceError),
}

impl From<CoreError> for TestError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<PersistenceError> for TestError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

pub fn create_test_actor(id: &str, role: Role) -> Actor {
    Actor::new(String::from(id), role)
}

pub fn create_owner() -> Actor {
    create_test_actor(OWNER, Role::O2cOfficer)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

/// Meskerem 2017, an odd month.
pub fn create_test_period() -> ReportingPeriod {
    ReportingPeriod::from_parts(2017, 0).unwrap()
}

pub fn create_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn register_facility(
    persistence: &mut Persistence,
    name: &str,
    route: Option<&str>,
    period: Option<FacilityPeriod>,
) -> i64 {
    let facility: Facility = Facility::new(name, "Oromia", "East Shewa", "Lume", route, period);
    persistence
        .atomically(|tx| tx.insert_facility(&facility, CREATED_AT))
        .expect("facility inserted")
}

/// Applies a command to the state of a facility and persists the result.
pub fn run_on_facility(
    persistence: &mut Persistence,
    facility_id: i64,
    command: Command,
    actor: Actor,
) -> Result<PersistedTransition, TestError> {
    persistence.atomically(|tx| {
        let state: State = tx.load_facility_state(facility_id, &create_test_period())?;
        let result: TransitionResult = apply(&state, command, actor, create_test_cause(), now())?;
        Ok(tx.persist_transition(&result)?)
    })
}

/// Applies a command to the state of a process and persists the result.
pub fn run_on_process(
    persistence: &mut Persistence,
    process_id: i64,
    command: Command,
    actor: Actor,
) -> Result<PersistedTransition, TestError> {
    persistence.atomically(|tx| {
        let state: State = tx.load_process_state(process_id)?;
        let result: TransitionResult = apply(&state, command, actor, create_test_cause(), now())?;
        Ok(tx.persist_transition(&result)?)
    })
}

pub fn start_process(persistence: &mut Persistence, facility_id: i64) -> i64 {
    run_on_facility(
        persistence,
        facility_id,
        Command::StartProcess {
            mode: EligibilityMode::Regular,
        },
        create_owner(),
    )
    .expect("process started")
    .process_id
    .expect("process id")
}

pub fn add_odn(persistence: &mut Persistence, process_id: i64, number: &str) -> i64 {
    let persisted: PersistedTransition = run_on_process(
        persistence,
        process_id,
        Command::AddOdn {
            odn_number: String::from(number),
        },
        create_owner(),
    )
    .expect("ODN added");
    persisted.odn_ids[0]
}

pub fn advance(
    persistence: &mut Persistence,
    process_id: i64,
    target: ProcessStatus,
    role: Role,
) -> Result<PersistedTransition, TestError> {
    let actor: Actor = if role == Role::O2cOfficer {
        create_owner()
    } else {
        create_test_actor(&format!("{role}-1"), role)
    };
    run_on_process(
        persistence,
        process_id,
        Command::Advance {
            target,
            accept_rrf_not_sent: false,
        },
        actor,
    )
}

/// Starts a process with one ODN and moves it to EWM completion.
pub fn process_at_ewm_completed(
    persistence: &mut Persistence,
    facility_id: i64,
    odn_number: &str,
) -> i64 {
    let process_id: i64 = start_process(persistence, facility_id);
    add_odn(persistence, process_id, odn_number);
    advance(
        persistence,
        process_id,
        ProcessStatus::O2cCompleted,
        Role::O2cOfficer,
    )
    .expect("O2C completed");
    advance(
        persistence,
        process_id,
        ProcessStatus::EwmCompleted,
        Role::EwmOfficer,
    )
    .expect("EWM completed");
    process_id
}

/// Registers an available vehicle and driver, returning their IDs.
pub fn register_resources(persistence: &mut Persistence, plate: &str) -> (i64, i64) {
    let vehicle: Vehicle = Vehicle {
        vehicle_id: None,
        plate_number: String::from(plate),
        description: Some(String::from("Isuzu FSR")),
        is_available: true,
    };
    let driver: Driver = Driver {
        driver_id: None,
        name: String::from("Abebe Kebede"),
        phone: Some(String::from("+251911000000")),
        is_available: true,
    };
    persistence
        .atomically(|tx| {
            let vehicle_id: i64 = tx.insert_vehicle(&vehicle)?;
            let driver_id: i64 = tx.insert_driver(&driver)?;
            Ok::<(i64, i64), PersistenceError>((vehicle_id, driver_id))
        })
        .expect("resources registered")
}

/// Assigns a vehicle and driver to a route the way the gateway does.
pub fn assign(
    persistence: &mut Persistence,
    route: &str,
    vehicle_id: i64,
    driver_id: i64,
) -> Result<RouteAssignment, TestError> {
    persistence.atomically(|tx| {
        let period: ReportingPeriod = create_test_period();
        let readiness: RouteReadiness = tx.route_readiness(route, &period)?;
        let existing: Option<RouteAssignment> = tx.find_route_assignment(route, &period)?;
        let vehicle: Vehicle = tx.get_vehicle(vehicle_id)?;
        let driver: Driver = tx.get_driver(driver_id)?;
        let result: AssignmentResult = assign_route(
            &readiness,
            existing.as_ref(),
            AssignmentRequest {
                vehicle: &vehicle,
                driver: &driver,
                deliverer: None,
            },
            create_test_actor("tm-1", Role::TmManager),
            create_test_cause(),
            now(),
        )?;
        let assignment_id: i64 = tx.insert_route_assignment(&result.assignment)?;
        tx.persist_audit_event(&result.audit_event, None)?;
        Ok(RouteAssignment {
            assignment_id: Some(assignment_id),
            ..result.assignment
        })
    })
}

/// Moves a single-facility route through to dispatch.
pub fn dispatched_process(
    persistence: &mut Persistence,
    facility_id: i64,
    route: &str,
    odn_number: &str,
) -> i64 {
    let process_id: i64 = process_at_ewm_completed(persistence, facility_id, odn_number);
    advance(
        persistence,
        process_id,
        ProcessStatus::VehicleRequested,
        Role::PiOfficer,
    )
    .expect("vehicle requested");
    let (vehicle_id, driver_id) = register_resources(persistence, &format!("3-{route}"));
    assign(persistence, route, vehicle_id, driver_id).expect("route assigned");
    advance(
        persistence,
        process_id,
        ProcessStatus::VehicleAssigned,
        Role::TmManager,
    )
    .expect("vehicle assigned");
    advance(
        persistence,
        process_id,
        ProcessStatus::Dispatched,
        Role::Dispatcher,
    )
    .expect("dispatched");
    process_id
}
