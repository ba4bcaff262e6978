// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    OWNER, create_owner, create_state, create_test_actor, create_test_cause, create_test_odn,
    create_test_period, now,
};
use crate::{Change, Command, CoreError, State, TransitionResult, apply};
use odn_flow_audit::Actor;
use odn_flow_domain::{
    DomainError, FlagStamp, Odn, Process, ProcessStatus, RRF_NOT_SENT, Role, RouteAssignment,
    RouteReadiness, Stage,
};

fn advance(
    state: &State,
    actor: Actor,
    target: ProcessStatus,
) -> Result<TransitionResult, CoreError> {
    apply(
        state,
        Command::Advance {
            target,
            accept_rrf_not_sent: false,
        },
        actor,
        create_test_cause(),
        now(),
    )
}

fn readiness(remaining: usize) -> RouteReadiness {
    RouteReadiness {
        route: String::from("R1"),
        period: create_test_period(),
        remaining,
        started: 2,
        ready: remaining == 0,
    }
}

fn is_invalid_transition(result: &Result<TransitionResult, CoreError>) -> bool {
    matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidTransition { .. }
        ))
    )
}

#[test]
fn test_owner_completes_o2c_with_odns() {
    let state: State = create_state(
        ProcessStatus::O2cStarted,
        vec![create_test_odn(1, "ODN-1")],
    );
    let result: TransitionResult =
        advance(&state, create_owner(), ProcessStatus::O2cCompleted).unwrap();

    let process: &Process = result.new_state.process.as_ref().unwrap();
    assert_eq!(process.status, ProcessStatus::O2cCompleted);
    assert_eq!(process.version, 4);
    assert_eq!(result.changes.len(), 1);
    assert!(matches!(
        result.changes[0],
        Change::UpdateProcess {
            expected_version: 3,
            ..
        }
    ));
    assert_eq!(result.audit_event.unwrap().action.name, "CompleteO2c");
}

#[test]
fn test_completing_o2c_without_odns_requires_confirmation() {
    let state: State = create_state(ProcessStatus::O2cStarted, Vec::new());
    let result = advance(&state, create_owner(), ProcessStatus::O2cCompleted);
    assert!(is_invalid_transition(&result));
}

#[test]
fn test_completing_o2c_seeds_sentinel_odn() {
    let state: State = create_state(ProcessStatus::O2cStarted, Vec::new());
    let result: TransitionResult = apply(
        &state,
        Command::Advance {
            target: ProcessStatus::O2cCompleted,
            accept_rrf_not_sent: true,
        },
        create_owner(),
        create_test_cause(),
        now(),
    )
    .unwrap();

    let odns: &Vec<Odn> = &result.new_state.odns;
    assert_eq!(odns.len(), 1);
    assert_eq!(odns[0].odn_number, RRF_NOT_SENT);
    assert!(matches!(result.changes[0], Change::InsertOdn(ref o) if o.is_sentinel()));
    assert!(matches!(result.changes[1], Change::UpdateProcess { .. }));
}

#[test]
fn test_sentinel_not_seeded_when_odns_exist() {
    let state: State = create_state(
        ProcessStatus::Completed,
        vec![create_test_odn(1, "ODN-1")],
    );
    let result: TransitionResult = apply(
        &state,
        Command::Advance {
            target: ProcessStatus::O2cCompleted,
            accept_rrf_not_sent: true,
        },
        create_owner(),
        create_test_cause(),
        now(),
    )
    .unwrap();
    assert_eq!(result.new_state.odns.len(), 1);
    assert_eq!(result.changes.len(), 1);
}

#[test]
fn test_only_owner_completes_o2c() {
    let state: State = create_state(
        ProcessStatus::O2cStarted,
        vec![create_test_odn(1, "ODN-1")],
    );
    let result = advance(
        &state,
        create_test_actor("o2c-2", Role::O2cOfficer),
        ProcessStatus::O2cCompleted,
    );
    assert!(is_invalid_transition(&result));
}

#[test]
fn test_ewm_officer_completes_ewm_and_is_recorded() {
    let state: State = create_state(ProcessStatus::O2cCompleted, Vec::new());
    let result: TransitionResult = advance(
        &state,
        create_test_actor("ewm-1", Role::EwmOfficer),
        ProcessStatus::EwmCompleted,
    )
    .unwrap();

    let process: &Process = result.new_state.process.as_ref().unwrap();
    assert_eq!(process.officers.get(Stage::Ewm), Some("ewm-1"));
    assert_eq!(process.officers.get(Stage::O2c), Some(OWNER));
}

#[test]
fn test_wrong_role_leaves_state_unchanged() {
    let state: State = create_state(ProcessStatus::O2cCompleted, Vec::new());
    let result = advance(
        &state,
        create_test_actor("pi-1", Role::PiOfficer),
        ProcessStatus::EwmCompleted,
    );
    assert!(is_invalid_transition(&result));
    assert_eq!(
        state.process.unwrap().status,
        ProcessStatus::O2cCompleted
    );
}

#[test]
fn test_return_for_correction_by_documentation_officer() {
    let state: State = create_state(ProcessStatus::O2cCompleted, Vec::new());
    let result: TransitionResult = advance(
        &state,
        create_test_actor("doc-1", Role::DocumentationOfficer),
        ProcessStatus::Completed,
    )
    .unwrap();
    assert_eq!(
        result.new_state.process.unwrap().status,
        ProcessStatus::Completed
    );
}

#[test]
fn test_ewm_revert_returns_to_o2c_started() {
    let state: State = create_state(ProcessStatus::EwmCompleted, Vec::new());
    let result: TransitionResult = advance(
        &state,
        create_test_actor("ewm-1", Role::EwmOfficer),
        ProcessStatus::O2cStarted,
    )
    .unwrap();
    assert_eq!(result.audit_event.unwrap().action.name, "RevertEwm");
}

#[test]
fn test_revert_keeps_odn_sub_statuses() {
    let mut odn: Odn = create_test_odn(1, "ODN-1");
    odn.ewm_completed = Some(FlagStamp::new("ewm-1", "2026-02-28T10:00:00Z"));
    let state: State = create_state(ProcessStatus::EwmCompleted, vec![odn]);

    let result: TransitionResult = advance(
        &state,
        create_test_actor("ewm-1", Role::EwmOfficer),
        ProcessStatus::O2cStarted,
    )
    .unwrap();
    assert!(result.new_state.odns[0].ewm_completed.is_some());
}

#[test]
fn test_vehicle_request_requires_ready_route() {
    let mut state: State = create_state(ProcessStatus::EwmCompleted, Vec::new());
    state.route_readiness = Some(readiness(1));

    let result = advance(
        &state,
        create_test_actor("pi-1", Role::PiOfficer),
        ProcessStatus::VehicleRequested,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::RouteNotReady {
            remaining: 1,
            ..
        }))
    ));
}

#[test]
fn test_vehicle_request_succeeds_on_ready_route() {
    let mut state: State = create_state(ProcessStatus::EwmCompleted, Vec::new());
    state.route_readiness = Some(readiness(0));

    let result: TransitionResult = advance(
        &state,
        create_test_actor("pi-1", Role::PiOfficer),
        ProcessStatus::VehicleRequested,
    )
    .unwrap();
    let process: Process = result.new_state.process.unwrap();
    assert_eq!(process.status, ProcessStatus::VehicleRequested);
    assert_eq!(process.officers.get(Stage::Pi), Some("pi-1"));
}

#[test]
fn test_vehicle_assignment_requires_route_assignment() {
    let state: State = create_state(ProcessStatus::VehicleRequested, Vec::new());
    let result = advance(
        &state,
        create_test_actor("tm-1", Role::TmManager),
        ProcessStatus::VehicleAssigned,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::AssignmentMissing { .. }
        ))
    ));
}

#[test]
fn test_vehicle_assignment_and_dispatch() {
    let mut state: State = create_state(ProcessStatus::VehicleRequested, Vec::new());
    state.route_assignment = Some(RouteAssignment {
        assignment_id: Some(1),
        route: String::from("R1"),
        period: create_test_period(),
        vehicle_id: 1,
        driver_id: 1,
        deliverer_id: None,
        assigned_by: String::from("tm-1"),
        created_at: String::from("2026-03-01T07:00:00Z"),
    });

    let assigned: TransitionResult = advance(
        &state,
        create_test_actor("tm-1", Role::TmManager),
        ProcessStatus::VehicleAssigned,
    )
    .unwrap();
    assert_eq!(
        assigned
            .new_state
            .process
            .as_ref()
            .unwrap()
            .officers
            .get(Stage::Tm),
        Some("tm-1")
    );

    let dispatched: TransitionResult = advance(
        &assigned.new_state,
        create_test_actor("disp-1", Role::Dispatcher),
        ProcessStatus::Dispatched,
    )
    .unwrap();
    let process: Process = dispatched.new_state.process.unwrap();
    assert_eq!(process.status, ProcessStatus::Dispatched);
    assert_eq!(process.officers.get(Stage::Dispatch), Some("disp-1"));
}

#[test]
fn test_reapplying_current_status_is_noop() {
    let state: State = create_state(ProcessStatus::EwmCompleted, Vec::new());
    let result: TransitionResult = advance(
        &state,
        create_test_actor("ewm-1", Role::EwmOfficer),
        ProcessStatus::EwmCompleted,
    )
    .unwrap();
    assert!(result.is_noop());
    assert!(result.audit_event.is_none());
    assert_eq!(result.new_state, state);
}

#[test]
fn test_reapplying_status_by_unrelated_role_is_rejected() {
    let state: State = create_state(ProcessStatus::EwmCompleted, Vec::new());
    let result = advance(
        &state,
        create_test_actor("disp-1", Role::Dispatcher),
        ProcessStatus::EwmCompleted,
    );
    assert!(is_invalid_transition(&result));
}

#[test]
fn test_dispatched_is_terminal() {
    let state: State = create_state(ProcessStatus::Dispatched, Vec::new());
    for role in Role::ALL {
        for target in ProcessStatus::ALL {
            if target == ProcessStatus::Dispatched {
                continue;
            }
            let result = advance(&state, create_test_actor("any", role), target);
            assert!(is_invalid_transition(&result), "{role} reached {target}");
        }
    }
}
