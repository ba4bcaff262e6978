// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers.
//!
//! Every mutating endpoint takes a JSON body that names the acting officer
//! and role next to the operation's own fields. Handlers lock the single
//! persistence connection, call the gateway, and translate `ApiError` into
//! a status code.

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    routing::{get, post},
};
use chrono_tz::Tz;
use odn_flow_api::{
    AddOdnRequest, AdvanceRequest, AdvanceRouteRequest, ApiError, AuthenticatedActor,
    CorrectOdnRequest, CreateRouteAssignmentRequest, DeleteOdnRequest, EditOdnRequest,
    ImportFacilitiesCsvRequest, ImportFacilitiesCsvResponse, PeriodInfo, PeriodRef,
    PreviewFacilitiesCsvRequest, PreviewFacilitiesCsvResponse, ProcessDetail,
    RegisterDelivererRequest, RegisterDriverRequest, RegisterFacilityRequest,
    RegisterVehicleRequest, RevertStartRequest, RevertStartResponse, SetOdnStatusRequest,
    StartProcessRequest, UpdateFacilityRoutingRequest, WorkUnit, WorkflowAction, add_odn,
    advance, advance_route, apply, authenticate, compute_period, correct_odn,
    create_route_assignment, current_period, delete_odn, edit_odn, get_audit_trail,
    import_facilities_csv, list_actionable, list_deliverers, list_drivers,
    list_eligible_facilities, list_facilities, list_route_assignments, list_route_readiness,
    list_vehicles, preview_facilities_csv, register_deliverer, register_driver,
    register_facility, register_vehicle, revert_start, route_readiness, set_odn_status,
    start_process, update_facility_routing,
};
use odn_flow_audit::{AuditEvent, Cause};
use odn_flow_domain::{
    Deliverer, Driver, EligibilityMode, Facility, Odn, Process, ReportingPeriod, Role,
    RouteAssignment, RouteReadiness, Vehicle,
};
use odn_flow_persistence::SqlitePersistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Date, OffsetDateTime, macros::format_description};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::HttpError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single database connection, serialized behind a mutex.
    pub persistence: Arc<Mutex<SqlitePersistence>>,
    /// Zone used to decide which reporting period is current.
    pub zone: Tz,
}

/// A request body carrying the acting officer alongside the operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActorEnvelope<T> {
    /// The officer performing this action.
    pub actor_id: String,
    /// The role the officer acts in.
    pub role: Role,
    /// Optional correlation id recorded in the audit trail.
    #[serde(default)]
    pub cause_id: Option<String>,
    /// Optional free-text reason recorded in the audit trail.
    #[serde(default)]
    pub cause_description: Option<String>,
    /// The operation's own fields.
    #[serde(flatten)]
    pub request: T,
}

impl<T> ActorEnvelope<T> {
    fn actor(&self) -> Result<AuthenticatedActor, HttpError> {
        authenticate(&self.actor_id, self.role)
            .map_err(|e| HttpError::from(ApiError::from(e)))
    }

    fn cause(&self, operation: &str) -> Cause {
        Cause::new(
            self.cause_id
                .clone()
                .unwrap_or_else(|| format!("http-{operation}")),
            self.cause_description
                .clone()
                .unwrap_or_else(|| format!("HTTP {operation} request")),
        )
    }
}

/// Query parameters selecting a reporting period.
///
/// Both fields absent means the period current in the configured zone.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    year: Option<i32>,
    month_index: Option<u8>,
}

/// Query parameters for the eligible facility list.
#[derive(Debug, Deserialize)]
pub struct EligibleQuery {
    year: Option<i32>,
    month_index: Option<u8>,
    #[serde(default)]
    mode: EligibilityMode,
}

/// Query parameters for a role's work list.
#[derive(Debug, Deserialize)]
pub struct WorkQuery {
    role: Role,
    year: Option<i32>,
    month_index: Option<u8>,
}

/// Query parameters for the calendar lookup.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM-DD`; today in the configured zone when absent.
    date: Option<String>,
}

fn resolve_period(
    app_state: &AppState,
    year: Option<i32>,
    month_index: Option<u8>,
) -> Result<ReportingPeriod, HttpError> {
    match (year, month_index) {
        (Some(year), Some(month_index)) => Ok(PeriodRef { year, month_index }.resolve()?),
        (None, None) => Ok(current_period(app_state.zone)?),
        _ => Err(HttpError::bad_request(
            "period",
            "year and month_index must be given together",
        )),
    }
}

/// Authenticates the envelope and runs a write operation under the lock.
async fn run_write<T, R, F>(
    app_state: &AppState,
    envelope: &ActorEnvelope<T>,
    operation: &'static str,
    handler: F,
) -> Result<Json<R>, HttpError>
where
    F: FnOnce(
        &mut SqlitePersistence,
        &T,
        &AuthenticatedActor,
        Cause,
        OffsetDateTime,
    ) -> Result<R, ApiError>,
{
    info!(
        actor_id = %envelope.actor_id,
        role = %envelope.role,
        operation,
        "Handling request"
    );
    let actor: AuthenticatedActor = envelope.actor()?;
    let cause: Cause = envelope.cause(operation);

    let mut persistence = app_state.persistence.lock().await;
    let result: R = handler(
        &mut persistence,
        &envelope.request,
        &actor,
        cause,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(result))
}

// ============================================================================
// Calendar and facilities
// ============================================================================

/// Handler for GET `/api/calendar/period`.
async fn handle_compute_period(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<PeriodInfo>, HttpError> {
    let info: PeriodInfo = match query.date {
        Some(text) => {
            let date: Date = Date::parse(&text, format_description!("[year]-[month]-[day]"))
                .map_err(|e| HttpError::bad_request("date", e.to_string()))?;
            compute_period(date)?
        }
        None => PeriodInfo::from(current_period(app_state.zone)?),
    };
    Ok(Json(info))
}

/// Handler for GET `/api/facilities`.
async fn handle_list_facilities(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Facility>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_facilities(&mut persistence)?))
}

/// Handler for GET `/api/facilities/eligible`.
async fn handle_list_eligible(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<EligibleQuery>,
) -> Result<Json<Vec<Facility>>, HttpError> {
    let period: ReportingPeriod = resolve_period(&app_state, query.year, query.month_index)?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_eligible_facilities(
        &mut persistence,
        query.mode,
        &period,
    )?))
}

/// Handler for POST `/api/facilities`.
async fn handle_register_facility(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<RegisterFacilityRequest>>,
) -> Result<Json<Facility>, HttpError> {
    run_write(&app_state, &req, "register_facility", register_facility).await
}

/// Handler for POST `/api/facilities/routing`.
async fn handle_update_routing(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<UpdateFacilityRoutingRequest>>,
) -> Result<Json<Facility>, HttpError> {
    run_write(
        &app_state,
        &req,
        "update_facility_routing",
        update_facility_routing,
    )
    .await
}

/// Handler for POST `/api/facilities/csv/preview`.
async fn handle_preview_csv(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<PreviewFacilitiesCsvRequest>>,
) -> Result<Json<PreviewFacilitiesCsvResponse>, HttpError> {
    run_write(
        &app_state,
        &req,
        "preview_facilities_csv",
        |persistence, request, actor, _cause, _now| {
            preview_facilities_csv(persistence, request, actor)
        },
    )
    .await
}

/// Handler for POST `/api/facilities/csv/import`.
async fn handle_import_csv(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<ImportFacilitiesCsvRequest>>,
) -> Result<Json<ImportFacilitiesCsvResponse>, HttpError> {
    run_write(
        &app_state,
        &req,
        "import_facilities_csv",
        |persistence, request, actor, cause, now| {
            import_facilities_csv(persistence, request, actor, &cause, now)
        },
    )
    .await
}

// ============================================================================
// Fleet and staff
// ============================================================================

async fn handle_register_vehicle(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<RegisterVehicleRequest>>,
) -> Result<Json<Vehicle>, HttpError> {
    run_write(&app_state, &req, "register_vehicle", register_vehicle).await
}

async fn handle_list_vehicles(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Vehicle>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_vehicles(&mut persistence)?))
}

async fn handle_register_driver(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<RegisterDriverRequest>>,
) -> Result<Json<Driver>, HttpError> {
    run_write(&app_state, &req, "register_driver", register_driver).await
}

async fn handle_list_drivers(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Driver>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_drivers(&mut persistence)?))
}

async fn handle_register_deliverer(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<RegisterDelivererRequest>>,
) -> Result<Json<Deliverer>, HttpError> {
    run_write(&app_state, &req, "register_deliverer", register_deliverer).await
}

async fn handle_list_deliverers(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<Deliverer>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_deliverers(&mut persistence)?))
}

// ============================================================================
// Processes
// ============================================================================

/// Handler for POST `/api/processes/start`.
async fn handle_start_process(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<StartProcessRequest>>,
) -> Result<Json<ProcessDetail>, HttpError> {
    run_write(&app_state, &req, "start_process", start_process).await
}

/// Handler for POST `/api/processes/advance`.
async fn handle_advance(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<AdvanceRequest>>,
) -> Result<Json<ProcessDetail>, HttpError> {
    run_write(&app_state, &req, "advance", advance).await
}

/// Handler for POST `/api/processes/revert`.
async fn handle_revert_start(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<RevertStartRequest>>,
) -> Result<Json<RevertStartResponse>, HttpError> {
    run_write(&app_state, &req, "revert_start", revert_start).await
}

/// Handler for GET `/api/processes/{process_id}/audit`.
async fn handle_audit_trail(
    AxumState(app_state): AxumState<AppState>,
    Path(process_id): Path<i64>,
) -> Result<Json<Vec<AuditEvent>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_audit_trail(&mut persistence, process_id)?))
}

// ============================================================================
// ODNs
// ============================================================================

async fn handle_add_odn(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<AddOdnRequest>>,
) -> Result<Json<Odn>, HttpError> {
    run_write(&app_state, &req, "add_odn", add_odn).await
}

async fn handle_edit_odn(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<EditOdnRequest>>,
) -> Result<Json<Odn>, HttpError> {
    run_write(&app_state, &req, "edit_odn", edit_odn).await
}

async fn handle_delete_odn(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<DeleteOdnRequest>>,
) -> Result<Json<ProcessDetail>, HttpError> {
    run_write(&app_state, &req, "delete_odn", delete_odn).await
}

async fn handle_set_odn_status(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<SetOdnStatusRequest>>,
) -> Result<Json<Odn>, HttpError> {
    run_write(&app_state, &req, "set_odn_status", set_odn_status).await
}

async fn handle_correct_odn(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<CorrectOdnRequest>>,
) -> Result<Json<Odn>, HttpError> {
    run_write(&app_state, &req, "correct_odn", correct_odn).await
}

// ============================================================================
// Routes
// ============================================================================

/// Handler for POST `/api/routes/advance`.
async fn handle_advance_route(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<AdvanceRouteRequest>>,
) -> Result<Json<Vec<Process>>, HttpError> {
    run_write(
        &app_state,
        &req,
        "advance_route",
        |persistence, request, actor, cause, now| {
            advance_route(persistence, request, actor, &cause, now)
        },
    )
    .await
}

/// Handler for GET `/api/routes/readiness`.
async fn handle_list_readiness(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<RouteReadiness>>, HttpError> {
    let period: ReportingPeriod = resolve_period(&app_state, query.year, query.month_index)?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_route_readiness(&mut persistence, &period)?))
}

/// Handler for GET `/api/routes/{route}/readiness`.
async fn handle_route_readiness(
    AxumState(app_state): AxumState<AppState>,
    Path(route): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<RouteReadiness>, HttpError> {
    let period: ReportingPeriod = resolve_period(&app_state, query.year, query.month_index)?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(route_readiness(&mut persistence, &route, &period)?))
}

/// Handler for GET `/api/routes/assignments`.
async fn handle_list_assignments(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<RouteAssignment>>, HttpError> {
    let period: ReportingPeriod = resolve_period(&app_state, query.year, query.month_index)?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_route_assignments(&mut persistence, &period)?))
}

/// Handler for POST `/api/routes/assignments`.
async fn handle_create_assignment(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<CreateRouteAssignmentRequest>>,
) -> Result<Json<RouteAssignment>, HttpError> {
    run_write(
        &app_state,
        &req,
        "create_route_assignment",
        create_route_assignment,
    )
    .await
}

// ============================================================================
// Role views
// ============================================================================

/// Handler for GET `/api/work`.
async fn handle_list_actionable(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<WorkQuery>,
) -> Result<Json<Vec<WorkUnit>>, HttpError> {
    let period: ReportingPeriod = resolve_period(&app_state, query.year, query.month_index)?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_actionable(&mut persistence, query.role, &period)?))
}

/// Handler for POST `/api/work/apply`.
async fn handle_apply(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorEnvelope<WorkflowAction>>,
) -> Result<Json<WorkUnit>, HttpError> {
    run_write(
        &app_state,
        &req,
        "apply",
        |persistence, action, actor, cause, now| {
            apply(persistence, action.clone(), actor, cause, now)
        },
    )
    .await
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/calendar/period", get(handle_compute_period))
        .route(
            "/api/facilities",
            get(handle_list_facilities).post(handle_register_facility),
        )
        .route("/api/facilities/eligible", get(handle_list_eligible))
        .route("/api/facilities/routing", post(handle_update_routing))
        .route("/api/facilities/csv/preview", post(handle_preview_csv))
        .route("/api/facilities/csv/import", post(handle_import_csv))
        .route(
            "/api/vehicles",
            get(handle_list_vehicles).post(handle_register_vehicle),
        )
        .route(
            "/api/drivers",
            get(handle_list_drivers).post(handle_register_driver),
        )
        .route(
            "/api/deliverers",
            get(handle_list_deliverers).post(handle_register_deliverer),
        )
        .route("/api/processes/start", post(handle_start_process))
        .route("/api/processes/advance", post(handle_advance))
        .route("/api/processes/revert", post(handle_revert_start))
        .route(
            "/api/processes/{process_id}/audit",
            get(handle_audit_trail),
        )
        .route("/api/odns/add", post(handle_add_odn))
        .route("/api/odns/edit", post(handle_edit_odn))
        .route("/api/odns/delete", post(handle_delete_odn))
        .route("/api/odns/status", post(handle_set_odn_status))
        .route("/api/odns/correct", post(handle_correct_odn))
        .route("/api/routes/advance", post(handle_advance_route))
        .route("/api/routes/readiness", get(handle_list_readiness))
        .route("/api/routes/{route}/readiness", get(handle_route_readiness))
        .route(
            "/api/routes/assignments",
            get(handle_list_assignments).post(handle_create_assignment),
        )
        .route("/api/work", get(handle_list_actionable))
        .route("/api/work/apply", post(handle_apply))
        .with_state(app_state)
}
