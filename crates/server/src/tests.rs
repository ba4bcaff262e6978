// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use odn_flow_persistence::SqlitePersistence;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::error::status_for;
use crate::routes::{AppState, build_router};
use odn_flow_api::ApiError;

/// Helper to create a router over a fresh in-memory database.
fn create_test_app() -> Router {
    let persistence: SqlitePersistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    build_router(AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        zone: chrono_tz::Africa::Addis_Ababa,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body: Body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };
    let response: Response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn register_facility(app: &Router, name: &str) -> i64 {
    let (status, body): (StatusCode, Value) = post(
        app,
        "/api/facilities",
        json!({
            "actor_id": "admin-1",
            "role": "admin",
            "name": name,
            "region": "Oromia",
            "zone": "East Shewa",
            "woreda": "Lume",
            "route": "R1",
            "period": "odd"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["facility_id"].as_i64().unwrap()
}

async fn start_process(app: &Router, facility_id: i64) -> i64 {
    let (status, body): (StatusCode, Value) = post(
        app,
        "/api/processes/start",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "facility_id": facility_id,
            "period": { "year": 2017, "month_index": 0 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["process"]["process_id"].as_i64().unwrap()
}

async fn add_odn(app: &Router, process_id: i64, number: &str) -> (StatusCode, Value) {
    post(
        app,
        "/api/odns/add",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "process_id": process_id,
            "odn_number": number
        }),
    )
    .await
}

#[test]
fn test_error_status_mapping() {
    let cases: Vec<(ApiError, StatusCode)> = vec![
        (
            ApiError::NotFound {
                resource_type: String::from("Process"),
                message: String::from("9"),
            },
            StatusCode::NOT_FOUND,
        ),
        (
            ApiError::InvalidTransition {
                message: String::from("no"),
            },
            StatusCode::CONFLICT,
        ),
        (
            ApiError::StaleWrite {
                entity: String::from("process"),
                id: 1,
                expected_version: 0,
            },
            StatusCode::CONFLICT,
        ),
        (
            ApiError::OdnLocked {
                odn_number: String::from("ODN-1"),
                process_status: String::from("o2c_completed"),
            },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (ApiError::MissingReason, StatusCode::BAD_REQUEST),
        (
            ApiError::AuthenticationFailed {
                reason: String::from("blank"),
            },
            StatusCode::UNAUTHORIZED,
        ),
        (
            ApiError::Unauthorized {
                action: String::from("register_vehicle"),
                required_role: String::from("admin"),
            },
            StatusCode::FORBIDDEN,
        ),
        (
            ApiError::Internal {
                message: String::from("boom"),
            },
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(status_for(&err), expected, "{err}");
    }
}

#[tokio::test]
async fn test_register_facility_as_admin_succeeds() {
    let app: Router = create_test_app();

    let facility_id: i64 = register_facility(&app, "Mojo HC").await;

    let (status, body): (StatusCode, Value) = get(&app, "/api/facilities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["facility_id"].as_i64(), Some(facility_id));
    assert_eq!(body[0]["period"], "odd");
}

#[tokio::test]
async fn test_register_facility_as_officer_is_forbidden() {
    let app: Router = create_test_app();

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/facilities",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "name": "Mojo HC",
            "region": "Oromia",
            "zone": "East Shewa",
            "woreda": "Lume"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn test_blank_actor_is_unauthenticated() {
    let app: Router = create_test_app();

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/vehicles",
        json!({ "actor_id": "  ", "role": "admin", "plate_number": "3-AA-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "authentication_failed");
}

#[tokio::test]
async fn test_locked_odn_is_unprocessable() {
    let app: Router = create_test_app();
    let facility_id: i64 = register_facility(&app, "Mojo HC").await;
    let process_id: i64 = start_process(&app, facility_id).await;
    let (status, _): (StatusCode, Value) = add_odn(&app, process_id, "ODN-1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/processes/advance",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "process_id": process_id,
            "target": "o2c_completed"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["process"]["status"], "o2c_completed");

    let (status, body): (StatusCode, Value) = add_odn(&app, process_id, "ODN-2").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "odn_locked");
}

#[tokio::test]
async fn test_wrong_role_transition_is_conflict() {
    let app: Router = create_test_app();
    let facility_id: i64 = register_facility(&app, "Mojo HC").await;
    let process_id: i64 = start_process(&app, facility_id).await;

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/processes/advance",
        json!({
            "actor_id": "pi-1",
            "role": "pi_officer",
            "process_id": process_id,
            "target": "o2c_completed"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_transition");
}

#[tokio::test]
async fn test_stale_version_is_conflict() {
    let app: Router = create_test_app();
    let facility_id: i64 = register_facility(&app, "Mojo HC").await;
    let process_id: i64 = start_process(&app, facility_id).await;

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/processes/advance",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "process_id": process_id,
            "target": "o2c_completed",
            "expected_version": 41,
            "accept_rrf_not_sent": true
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "stale_write");
}

#[tokio::test]
async fn test_work_list_and_apply() {
    let app: Router = create_test_app();
    let facility_id: i64 = register_facility(&app, "Mojo HC").await;

    let (status, body): (StatusCode, Value) =
        get(&app, "/api/work?role=o2c_officer&year=2017&month_index=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["process"], Value::Null);

    let (status, body): (StatusCode, Value) = post(
        &app,
        "/api/work/apply",
        json!({
            "actor_id": "o2c-1",
            "role": "o2c_officer",
            "action": "start_process",
            "facility_id": facility_id,
            "period": { "year": 2017, "month_index": 0 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["kind"], "process");
    assert_eq!(body["process"]["status"], "o2c_started");
    assert_eq!(body["is_inactive"], false);
}

#[tokio::test]
async fn test_partial_period_query_is_bad_request() {
    let app: Router = create_test_app();

    let (status, body): (StatusCode, Value) = get(&app, "/api/routes/readiness?year=2017").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_route_readiness_for_started_route() {
    let app: Router = create_test_app();
    let facility_id: i64 = register_facility(&app, "Mojo HC").await;
    start_process(&app, facility_id).await;

    let (status, body): (StatusCode, Value) =
        get(&app, "/api/routes/R1/readiness?year=2017&month_index=0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "R1");
    assert_eq!(body["started"], 1);
    assert_eq!(body["remaining"], 1);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_calendar_lookup_by_date() {
    let app: Router = create_test_app();

    let (status, body): (StatusCode, Value) =
        get(&app, "/api/calendar/period?date=2025-10-11").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "2018-Tikimt");
    assert_eq!(body["month_index"], 1);

    let (status, body): (StatusCode, Value) =
        get(&app, "/api/calendar/period?date=11/10/2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_audit_trail_of_unknown_process_is_not_found() {
    let app: Router = create_test_app();

    let (status, body): (StatusCode, Value) = get(&app, "/api/processes/99/audit").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}
