// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    EligibilityMode, Process, ProcessStatus, ReportingPeriod, RouteReadiness, StageOfficers,
    evaluate_route_readiness,
};

fn period() -> ReportingPeriod {
    ReportingPeriod::from_parts(2017, 0).unwrap()
}

fn process(facility_id: i64, status: ProcessStatus) -> Process {
    Process {
        process_id: Some(facility_id * 10),
        facility_id,
        route: String::from("R1"),
        period: period(),
        mode: EligibilityMode::Regular,
        status,
        officers: StageOfficers::default(),
        started_at: String::from("2026-01-01T00:00:00Z"),
        updated_at: String::from("2026-01-01T00:00:00Z"),
        version: 0,
    }
}

#[test]
fn test_route_without_processes_is_not_ready() {
    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[], &[]);
    assert_eq!(readiness.remaining, 0);
    assert_eq!(readiness.started, 0);
    assert!(!readiness.ready);
}

#[test]
fn test_unstarted_eligible_facility_blocks_route() {
    let processes: Vec<Process> = vec![process(1, ProcessStatus::EwmCompleted)];
    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[1, 2], &processes);
    assert_eq!(readiness.remaining, 1);
    assert_eq!(readiness.started, 1);
    assert!(!readiness.ready);
}

#[test]
fn test_route_becomes_ready_when_last_facility_completes_ewm() {
    let mut processes: Vec<Process> = vec![
        process(1, ProcessStatus::EwmCompleted),
        process(2, ProcessStatus::O2cCompleted),
    ];
    let before: RouteReadiness = evaluate_route_readiness("R1", period(), &[1, 2], &processes);
    assert_eq!(before.remaining, 1);
    assert!(!before.ready);

    processes[1].status = ProcessStatus::EwmCompleted;
    let after: RouteReadiness = evaluate_route_readiness("R1", period(), &[1, 2], &processes);
    assert_eq!(after.remaining, 0);
    assert!(after.ready);
}

#[test]
fn test_emergency_process_counts_towards_route() {
    // Facility 3 is not Regular-eligible but has a process on the route.
    let mut emergency: Process = process(3, ProcessStatus::O2cStarted);
    emergency.mode = EligibilityMode::Emergency;
    let processes: Vec<Process> = vec![process(1, ProcessStatus::VehicleRequested), emergency];

    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[1], &processes);
    assert_eq!(readiness.remaining, 1);
    assert_eq!(readiness.started, 2);
}

#[test]
fn test_processes_on_other_routes_are_ignored() {
    let mut elsewhere: Process = process(2, ProcessStatus::O2cStarted);
    elsewhere.route = String::from("R2");
    let processes: Vec<Process> = vec![process(1, ProcessStatus::EwmCompleted), elsewhere];

    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[1], &processes);
    assert!(readiness.ready);
}

#[test]
fn test_facility_started_on_another_route_is_not_waited_for() {
    // Facility 2 now sits on R1 but its process runs on R2.
    let mut moved: Process = process(2, ProcessStatus::O2cStarted);
    moved.route = String::from("R2");
    let processes: Vec<Process> = vec![process(1, ProcessStatus::EwmCompleted), moved];

    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[1, 2], &processes);
    assert_eq!(readiness.remaining, 0);
    assert_eq!(readiness.started, 1);
    assert!(readiness.ready);
}

#[test]
fn test_latest_process_wins_for_a_facility() {
    let mut reopened: Process = process(1, ProcessStatus::O2cStarted);
    reopened.process_id = Some(99);
    let processes: Vec<Process> = vec![process(1, ProcessStatus::Dispatched), reopened];

    let readiness: RouteReadiness = evaluate_route_readiness("R1", period(), &[1], &processes);
    assert_eq!(readiness.started, 1);
    assert_eq!(readiness.remaining, 1);
    assert!(!readiness.ready);
}
