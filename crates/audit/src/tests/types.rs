// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::Role;

fn create_event() -> AuditEvent {
    AuditEvent::new(
        Actor::new(String::from("ewm-7"), Role::EwmOfficer),
        Cause::new(String::from("req-1"), String::from("EWM picking done")),
        Action::new(
            String::from("CompleteEwm"),
            Some(String::from("facility 4")),
        ),
        StateSnapshot::new(String::from("status=o2c_completed")),
        StateSnapshot::new(String::from("status=ewm_completed")),
        String::from("2026-03-01T08:00:00Z"),
    )
}

#[test]
fn test_actor_carries_role() {
    let actor: Actor = Actor::new(String::from("pi-1"), Role::PiOfficer);

    assert_eq!(actor.id, "pi-1");
    assert_eq!(actor.role, Role::PiOfficer);
}

#[test]
fn test_cause_creation_requires_all_fields() {
    let cause: Cause = Cause::new(String::from("req-456"), String::from("Officer request"));

    assert_eq!(cause.id, "req-456");
    assert_eq!(cause.description, "Officer request");
}

#[test]
fn test_action_creation_requires_name() {
    let action: Action = Action::new(String::from("Dispatch"), None);

    assert_eq!(action.name, "Dispatch");
    assert_eq!(action.details, None);
}

#[test]
fn test_new_event_has_no_process_or_id() {
    let event: AuditEvent = create_event();

    assert_eq!(event.event_id, None);
    assert_eq!(event.process_id, None);
    assert_eq!(event.before.data, "status=o2c_completed");
    assert_eq!(event.after.data, "status=ewm_completed");
}

#[test]
fn test_event_can_be_tied_to_process() {
    let event: AuditEvent = create_event().with_process_id(42);

    assert_eq!(event.process_id, Some(42));
    assert_eq!(event.action.name, "CompleteEwm");
}

#[test]
fn test_actor_equality() {
    let actor1: Actor = Actor::new(String::from("user-123"), Role::Dispatcher);
    let actor2: Actor = Actor::new(String::from("user-123"), Role::Dispatcher);
    let actor3: Actor = Actor::new(String::from("user-123"), Role::Admin);

    assert_eq!(actor1, actor2);
    assert_ne!(actor1, actor3);
}

#[test]
fn test_snapshot_creation() {
    let snapshot: StateSnapshot = StateSnapshot::new(String::from("state-data"));

    assert_eq!(snapshot.data, "state-data");
}
