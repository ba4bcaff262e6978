// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use odn_flow::CoreError;
use odn_flow_domain::{DomainError, ProcessStatus, Role};
use odn_flow_persistence::PersistenceError;

use crate::{
    ApiError, AuthError, AuthenticatedActor, AuthorizationService, authenticate,
    translate_core_error, translate_domain_error,
};

#[test]
fn test_workflow_rule_violations_become_invalid_transition() {
    let errors: Vec<DomainError> = vec![
        DomainError::InvalidTransition {
            actor: String::from("pi_officer"),
            from: String::from("o2c_started"),
            to: String::from("o2c_completed"),
            reason: String::from("role does not own the transition"),
        },
        DomainError::FacilityNotEligible {
            facility_id: 4,
            period: String::from("2017-Tikimt"),
            mode: String::from("regular"),
        },
        DomainError::RouteNotReady {
            route: String::from("R1"),
            period: String::from("2017-Meskerem"),
            remaining: 2,
        },
    ];

    for err in errors {
        let api: ApiError = translate_domain_error(err);
        assert_eq!(api.kind(), "invalid_transition");
    }
}

#[test]
fn test_locked_odn_keeps_process_status() {
    let api: ApiError = translate_domain_error(DomainError::OdnLocked {
        odn_number: String::from("ODN-1"),
        process_status: ProcessStatus::EwmCompleted,
    });

    assert_eq!(
        api,
        ApiError::OdnLocked {
            odn_number: String::from("ODN-1"),
            process_status: ProcessStatus::EwmCompleted.to_string(),
        }
    );
}

#[test]
fn test_field_errors_name_the_field() {
    let api: ApiError = translate_domain_error(DomainError::InvalidMonthIndex { index: 13 });

    assert!(matches!(api, ApiError::InvalidInput { ref field, .. } if field == "month_index"));
    assert_eq!(
        translate_domain_error(DomainError::MissingReason),
        ApiError::MissingReason
    );
}

#[test]
fn test_core_errors_unwrap_domain_violations() {
    let domain: ApiError = translate_core_error(CoreError::DomainViolation(
        DomainError::DuplicateOdn {
            odn_number: String::from("ODN-2"),
        },
    ));
    let internal: ApiError = translate_core_error(CoreError::Internal(String::from("bad state")));

    assert_eq!(
        domain,
        ApiError::DuplicateOdn {
            odn_number: String::from("ODN-2")
        }
    );
    assert_eq!(internal.kind(), "internal");
}

#[test]
fn test_persistence_errors_map_to_api_kinds() {
    let cases: Vec<(PersistenceError, &str)> = vec![
        (
            PersistenceError::NotFound(String::from("process 9")),
            "not_found",
        ),
        (
            PersistenceError::StaleWrite {
                entity: "process",
                id: 9,
                expected_version: 2,
            },
            "stale_write",
        ),
        (
            PersistenceError::DuplicateAssignment {
                route: String::from("R1"),
                period: String::from("2017-Meskerem"),
            },
            "duplicate_assignment",
        ),
        (
            PersistenceError::ProcessAlreadyOpen {
                facility_id: 3,
                period: String::from("2017-Meskerem"),
            },
            "invalid_transition",
        ),
        (
            PersistenceError::DuplicatePlateNumber {
                plate_number: String::from("3-AA-1"),
            },
            "invalid_input",
        ),
        (
            PersistenceError::QueryFailed(String::from("disk I/O error")),
            "internal",
        ),
    ];

    for (err, kind) in cases {
        assert_eq!(ApiError::from(err).kind(), kind);
    }
}

#[test]
fn test_auth_errors_convert() {
    let actor: AuthenticatedActor = AuthenticatedActor::new(String::from("pi-1"), Role::PiOfficer);

    let err: AuthError =
        AuthorizationService::require_admin(&actor, "register_vehicle").unwrap_err();
    let api: ApiError = ApiError::from(err);

    assert_eq!(api.kind(), "unauthorized");
    assert!(api.to_string().contains("register_vehicle"));
}

#[test]
fn test_authenticate_trims_and_rejects_blank_ids() {
    let actor: AuthenticatedActor = authenticate("  ewm-7 ", Role::EwmOfficer).unwrap();
    assert_eq!(actor.id, "ewm-7");
    assert_eq!(actor.role, Role::EwmOfficer);

    let blank: Result<AuthenticatedActor, AuthError> = authenticate("   ", Role::EwmOfficer);
    assert!(matches!(blank, Err(AuthError::AuthenticationFailed { .. })));
}
