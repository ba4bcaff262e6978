// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use odn_flow_audit::Cause;
use odn_flow_domain::{
    Driver, EligibilityMode, Facility, Odn, OdnStatusUpdate, ProcessStatus, ReportingPeriod, Role,
    Vehicle,
};
use odn_flow_persistence::SqlitePersistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AddOdnRequest, AdvanceRequest, AuthenticatedActor, CreateRouteAssignmentRequest, PeriodRef,
    ProcessDetail, RegisterDriverRequest, RegisterFacilityRequest, RegisterVehicleRequest,
    SetOdnStatusRequest, StartProcessRequest, add_odn, advance, create_route_assignment,
    register_driver, register_facility, register_vehicle, set_odn_status, start_process,
};

pub const OWNER: &str = "o2c-1";

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

pub fn create_owner() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from(OWNER), Role::O2cOfficer)
}

/// An officer named after the role, e.g. `ewm_officer-1`.
pub fn officer(role: Role) -> AuthenticatedActor {
    if role == Role::O2cOfficer {
        return create_owner();
    }
    AuthenticatedActor::new(format!("{role}-1"), role)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

/// Meskerem 2017, an odd month.
pub fn create_test_period() -> ReportingPeriod {
    ReportingPeriod::from_parts(2017, 0).unwrap()
}

pub fn period_ref() -> PeriodRef {
    PeriodRef::from(create_test_period())
}

pub fn create_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

pub fn facility_request(
    name: &str,
    route: Option<&str>,
    period: Option<&str>,
) -> RegisterFacilityRequest {
    RegisterFacilityRequest {
        name: String::from(name),
        region: String::from("Oromia"),
        zone: String::from("East Shewa"),
        woreda: String::from("Lume"),
        route: route.map(String::from),
        period: period.map(String::from),
    }
}

/// Registers a facility through the admin API and returns its ID.
pub fn create_facility(
    persistence: &mut SqlitePersistence,
    name: &str,
    route: Option<&str>,
    period: Option<&str>,
) -> i64 {
    let facility: Facility = register_facility(
        persistence,
        &facility_request(name, route, period),
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .expect("facility registered");
    facility.facility_id.expect("facility id")
}

pub fn start(persistence: &mut SqlitePersistence, facility_id: i64) -> ProcessDetail {
    start_process(
        persistence,
        &StartProcessRequest {
            facility_id,
            period: period_ref(),
            mode: EligibilityMode::Regular,
        },
        &create_owner(),
        create_test_cause(),
        now(),
    )
    .expect("process started")
}

pub fn start_id(persistence: &mut SqlitePersistence, facility_id: i64) -> i64 {
    start(persistence, facility_id)
        .process
        .process_id
        .expect("process id")
}

pub fn add(persistence: &mut SqlitePersistence, process_id: i64, number: &str) -> Odn {
    add_odn(
        persistence,
        &AddOdnRequest {
            process_id,
            odn_number: String::from(number),
        },
        &create_owner(),
        create_test_cause(),
        now(),
    )
    .expect("ODN added")
}

pub fn advance_to(
    persistence: &mut SqlitePersistence,
    process_id: i64,
    target: ProcessStatus,
    role: Role,
) -> ProcessDetail {
    advance(
        persistence,
        &AdvanceRequest {
            process_id,
            target,
            expected_version: None,
            accept_rrf_not_sent: false,
        },
        &officer(role),
        create_test_cause(),
        now(),
    )
    .unwrap_or_else(|e| panic!("advance to {target} failed: {e}"))
}

/// Starts a process with one ODN and moves it through EWM.
pub fn process_at_ewm_completed(
    persistence: &mut SqlitePersistence,
    facility_id: i64,
    odn_number: &str,
) -> i64 {
    let process_id: i64 = start_id(persistence, facility_id);
    add(persistence, process_id, odn_number);
    advance_to(
        persistence,
        process_id,
        ProcessStatus::O2cCompleted,
        Role::O2cOfficer,
    );
    advance_to(
        persistence,
        process_id,
        ProcessStatus::EwmCompleted,
        Role::EwmOfficer,
    );
    process_id
}

/// Registers an available vehicle and driver, returning their IDs.
pub fn create_resources(persistence: &mut SqlitePersistence, plate: &str) -> (i64, i64) {
    let vehicle: Vehicle = register_vehicle(
        persistence,
        &RegisterVehicleRequest {
            plate_number: String::from(plate),
            description: Some(String::from("Isuzu FSR")),
        },
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .expect("vehicle registered");
    let driver: Driver = register_driver(
        persistence,
        &RegisterDriverRequest {
            name: String::from("Abebe Kebede"),
            phone: None,
        },
        &create_test_admin(),
        create_test_cause(),
        now(),
    )
    .expect("driver registered");
    (
        vehicle.vehicle_id.expect("vehicle id"),
        driver.driver_id.expect("driver id"),
    )
}

/// Takes a single-facility route all the way to dispatch and returns the
/// process ID and its only ODN ID.
pub fn dispatched_process(persistence: &mut SqlitePersistence, route: &str) -> (i64, i64) {
    let facility_id: i64 = create_facility(persistence, "Bishoftu HC", Some(route), Some("odd"));
    let process_id: i64 = start_id(persistence, facility_id);
    let odn: Odn = add(persistence, process_id, "ODN-900");
    advance_to(
        persistence,
        process_id,
        ProcessStatus::O2cCompleted,
        Role::O2cOfficer,
    );
    advance_to(
        persistence,
        process_id,
        ProcessStatus::EwmCompleted,
        Role::EwmOfficer,
    );
    advance_to(
        persistence,
        process_id,
        ProcessStatus::VehicleRequested,
        Role::PiOfficer,
    );
    let (vehicle_id, driver_id): (i64, i64) = create_resources(persistence, "3-AA-90001");
    create_route_assignment(
        persistence,
        &CreateRouteAssignmentRequest {
            route: String::from(route),
            period: period_ref(),
            vehicle_id,
            driver_id,
            deliverer_id: None,
        },
        &officer(Role::TmManager),
        create_test_cause(),
        now(),
    )
    .expect("route assigned");
    advance_to(
        persistence,
        process_id,
        ProcessStatus::VehicleAssigned,
        Role::TmManager,
    );
    advance_to(
        persistence,
        process_id,
        ProcessStatus::Dispatched,
        Role::Dispatcher,
    );
    (process_id, odn.odn_id.expect("odn id"))
}

pub fn set_flag(
    persistence: &mut SqlitePersistence,
    odn_id: i64,
    update: OdnStatusUpdate,
    role: Role,
) -> Odn {
    set_odn_status(
        persistence,
        &SetOdnStatusRequest {
            odn_id,
            update,
            expected_version: None,
        },
        &officer(role),
        create_test_cause(),
        now(),
    )
    .unwrap_or_else(|e| panic!("status update failed: {e}"))
}
