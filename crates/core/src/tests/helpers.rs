// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::State;
use odn_flow_audit::{Actor, Cause};
use odn_flow_domain::{
    EligibilityMode, Facility, FacilityPeriod, Odn, Process, ProcessStatus, ReportingPeriod,
    Role, Stage, StageOfficers,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const OWNER: &str = "o2c-1";
pub const PROCESS_ID: i64 = 100;

pub fn create_test_actor(id: &str, role: Role) -> Actor {
    Actor::new(String::from(id), role)
}

pub fn create_owner() -> Actor {
    create_test_actor(OWNER, Role::O2cOfficer)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Officer request"))
}

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

/// Meskerem 2017, an odd month.
pub fn create_test_period() -> ReportingPeriod {
    ReportingPeriod::from_parts(2017, 0).unwrap()
}

pub fn create_test_facility(period: Option<FacilityPeriod>) -> Facility {
    Facility::new("Mojo HC", "Oromia", "East Shewa", "Lume", Some("R1"), period).with_id(1)
}

pub fn create_test_process(status: ProcessStatus) -> Process {
    let mut officers: StageOfficers = StageOfficers::default();
    officers.record(Stage::O2c, OWNER);
    Process {
        process_id: Some(PROCESS_ID),
        facility_id: 1,
        route: String::from("R1"),
        period: create_test_period(),
        mode: EligibilityMode::Regular,
        status,
        officers,
        started_at: String::from("2026-02-28T08:00:00Z"),
        updated_at: String::from("2026-02-28T08:00:00Z"),
        version: 3,
    }
}

pub fn create_test_odn(odn_id: i64, number: &str) -> Odn {
    let mut odn: Odn = Odn::new(PROCESS_ID, number, "2026-02-28T09:00:00Z");
    odn.odn_id = Some(odn_id);
    odn.version = 1;
    odn
}

pub fn create_empty_state() -> State {
    State::new(
        create_test_facility(Some(FacilityPeriod::Odd)),
        create_test_period(),
    )
}

pub fn create_state(status: ProcessStatus, odns: Vec<Odn>) -> State {
    let mut state: State = create_empty_state();
    state.process = Some(create_test_process(status));
    state.odns = odns;
    state
}
