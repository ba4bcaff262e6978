// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Administrative operations: facility registry, CSV import, fleet and
//! staff resources, and audit trail lookup.
//!
//! Every mutation here requires the Admin role and records an audit event
//! that is not tied to any process.

use std::collections::BTreeSet;

use odn_flow::format_timestamp;
use odn_flow_audit::{Action, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::{
    Deliverer, Driver, Facility, FacilityPeriod, Vehicle, normalize_optional_text,
    validate_facility_fields, validate_facility_names_unique,
};
use odn_flow_persistence::{SqlitePersistence, WorkflowTransaction};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::csv_import::{ParsedRow, parse_facility_csv, summarize};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    CsvImportRowResult, CsvImportRowStatus, ImportFacilitiesCsvRequest,
    ImportFacilitiesCsvResponse, PreviewFacilitiesCsvRequest, PreviewFacilitiesCsvResponse,
    RegisterDelivererRequest, RegisterDriverRequest, RegisterFacilityRequest,
    RegisterVehicleRequest, UpdateFacilityRoutingRequest,
};

/// Builds and stores the audit event of an administrative change.
fn record_admin_event(
    tx: &mut WorkflowTransaction<'_>,
    actor: &AuthenticatedActor,
    cause: Cause,
    action: Action,
    before: &str,
    after: &str,
    now: OffsetDateTime,
) -> Result<i64, ApiError> {
    let occurred_at: String = format_timestamp(now).map_err(translate_core_error)?;
    let event: AuditEvent = AuditEvent::new(
        actor.to_audit_actor(),
        cause,
        action,
        StateSnapshot::new(before.to_string()),
        StateSnapshot::new(after.to_string()),
        occurred_at,
    );
    Ok(tx.persist_audit_event(&event, None)?)
}

fn facility_snapshot(facility: &Facility) -> String {
    format!(
        "facility={},name={},route={},period={}",
        facility
            .facility_id
            .map_or_else(|| String::from("new"), |id| id.to_string()),
        facility.name,
        facility.route().unwrap_or("none"),
        facility.period.map_or("none", |p| p.as_str())
    )
}

fn parse_period(value: Option<&str>) -> Result<Option<FacilityPeriod>, ApiError> {
    FacilityPeriod::parse_optional(value.unwrap_or_default()).map_err(translate_domain_error)
}

fn required_text(field: &str, value: &str) -> Result<String, ApiError> {
    normalize_optional_text(Some(value)).ok_or_else(|| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("{field} cannot be empty"),
    })
}

/// Stores a validated facility, re-checking name uniqueness against the
/// registry as seen inside the transaction.
fn insert_checked_facility(
    tx: &mut WorkflowTransaction<'_>,
    facility: Facility,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Facility, ApiError> {
    let mut registry: Vec<Facility> = tx.list_facilities()?;
    registry.push(facility.clone());
    validate_facility_names_unique(&registry).map_err(translate_domain_error)?;

    let created_at: String = format_timestamp(now).map_err(translate_core_error)?;
    let facility_id: i64 = tx.insert_facility(&facility, &created_at)?;
    let stored: Facility = facility.with_id(facility_id);

    record_admin_event(
        tx,
        actor,
        cause,
        Action::new(
            String::from("RegisterFacility"),
            Some(format!("Registered facility '{}'", stored.name)),
        ),
        "facility=none",
        &facility_snapshot(&stored),
        now,
    )?;
    Ok(stored)
}

// ============================================================================
// Facilities
// ============================================================================

/// Registers a facility.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A required field is blank or the period class is unknown
/// - A facility with the same name exists in the same woreda
pub fn register_facility(
    persistence: &mut SqlitePersistence,
    request: &RegisterFacilityRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Facility, ApiError> {
    AuthorizationService::require_admin(actor, "register_facility")?;

    let facility: Facility = Facility::new(
        &request.name,
        &request.region,
        &request.zone,
        &request.woreda,
        request.route.as_deref(),
        parse_period(request.period.as_deref())?,
    );
    validate_facility_fields(&facility).map_err(translate_domain_error)?;

    let stored: Facility =
        persistence.atomically(|tx| insert_checked_facility(tx, facility, actor, cause, now))?;

    info!(
        facility_id = ?stored.facility_id,
        name = %stored.name,
        actor = %actor.id,
        "Registered facility"
    );
    Ok(stored)
}

/// Changes a facility's route and period class.
///
/// Existing processes keep the route they were started with.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the facility does not
/// exist, or the period class is unknown.
pub fn update_facility_routing(
    persistence: &mut SqlitePersistence,
    request: &UpdateFacilityRoutingRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Facility, ApiError> {
    AuthorizationService::require_admin(actor, "update_facility_routing")?;
    let period: Option<FacilityPeriod> = parse_period(request.period.as_deref())?;

    let updated: Facility = persistence.atomically(|tx| {
        let before: Facility = tx.get_facility(request.facility_id)?;
        let after: Facility = Facility::new(
            &before.name,
            &before.region,
            &before.zone,
            &before.woreda,
            request.route.as_deref(),
            period,
        )
        .with_id(request.facility_id);

        tx.update_facility_routing(request.facility_id, after.route(), after.period)?;
        record_admin_event(
            tx,
            actor,
            cause,
            Action::new(
                String::from("UpdateFacilityRouting"),
                Some(format!("Updated routing of facility '{}'", after.name)),
            ),
            &facility_snapshot(&before),
            &facility_snapshot(&after),
            now,
        )?;
        Ok::<Facility, ApiError>(after)
    })?;

    info!(
        facility_id = request.facility_id,
        route = ?updated.route,
        period = ?updated.period,
        actor = %actor.id,
        "Updated facility routing"
    );
    Ok(updated)
}

/// Lists every registered facility.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_facilities(persistence: &mut SqlitePersistence) -> Result<Vec<Facility>, ApiError> {
    persistence.read(|tx| tx.list_facilities().map_err(ApiError::from))
}

// ============================================================================
// CSV import
// ============================================================================

/// Validates a facility CSV without storing anything.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the CSV structure is
/// unusable. Row-level problems are reported in the response.
pub fn preview_facilities_csv(
    persistence: &mut SqlitePersistence,
    request: &PreviewFacilitiesCsvRequest,
    actor: &AuthenticatedActor,
) -> Result<PreviewFacilitiesCsvResponse, ApiError> {
    AuthorizationService::require_admin(actor, "preview_facilities_csv")?;
    let existing: Vec<Facility> = list_facilities(persistence)?;
    let rows: Vec<ParsedRow> = parse_facility_csv(&request.csv_content, &existing)?;
    Ok(summarize(rows))
}

/// Imports facilities from CSV.
///
/// Each selected row is stored in its own transaction, so one failing row
/// does not prevent the others from being imported.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the CSV structure is
/// unusable.
pub fn import_facilities_csv(
    persistence: &mut SqlitePersistence,
    request: &ImportFacilitiesCsvRequest,
    actor: &AuthenticatedActor,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<ImportFacilitiesCsvResponse, ApiError> {
    AuthorizationService::require_admin(actor, "import_facilities_csv")?;
    let existing: Vec<Facility> = list_facilities(persistence)?;
    let rows: Vec<ParsedRow> = parse_facility_csv(&request.csv_content, &existing)?;

    let selected: Option<BTreeSet<usize>> = request
        .selected_rows
        .as_ref()
        .map(|rows| rows.iter().copied().collect());

    let mut results: Vec<CsvImportRowResult> = Vec::new();
    for row in rows {
        let row_number: usize = row.preview.row_number;
        if selected.as_ref().is_some_and(|s| !s.contains(&row_number)) {
            continue;
        }
        let name: Option<String> = row.preview.name.clone();

        let outcome: Result<Facility, ApiError> = match row.facility {
            Some(facility) => persistence.atomically(|tx| {
                insert_checked_facility(tx, facility, actor, cause.clone(), now)
            }),
            None => Err(ApiError::InvalidInput {
                field: format!("row {row_number}"),
                message: row.preview.errors.join("; "),
            }),
        };

        results.push(match outcome {
            Ok(stored) => CsvImportRowResult {
                row_number,
                name,
                status: CsvImportRowStatus::Success,
                facility_id: stored.facility_id,
                error: None,
            },
            Err(err) => {
                warn!(row_number, error = %err, "Facility CSV row was not imported");
                CsvImportRowResult {
                    row_number,
                    name,
                    status: CsvImportRowStatus::Failed,
                    facility_id: None,
                    error: Some(err.to_string()),
                }
            }
        });
    }

    let successful_count: usize = results
        .iter()
        .filter(|r| r.status == CsvImportRowStatus::Success)
        .count();
    info!(
        total = results.len(),
        successful = successful_count,
        actor = %actor.id,
        "Imported facilities from CSV"
    );

    Ok(ImportFacilitiesCsvResponse {
        total_selected: results.len(),
        successful_count,
        failed_count: results.len() - successful_count,
        results,
    })
}

// ============================================================================
// Fleet and staff
// ============================================================================

/// Registers a vehicle.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the plate is blank, or
/// the plate is already registered.
pub fn register_vehicle(
    persistence: &mut SqlitePersistence,
    request: &RegisterVehicleRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Vehicle, ApiError> {
    AuthorizationService::require_admin(actor, "register_vehicle")?;
    let vehicle: Vehicle = Vehicle {
        vehicle_id: None,
        plate_number: required_text("plate_number", &request.plate_number)?,
        description: normalize_optional_text(request.description.as_deref()),
        is_available: true,
    };

    let stored: Vehicle = persistence.atomically(|tx| {
        let vehicle_id: i64 = tx.insert_vehicle(&vehicle)?;
        record_admin_event(
            tx,
            actor,
            cause,
            Action::new(
                String::from("RegisterVehicle"),
                Some(format!("Registered vehicle {}", vehicle.plate_number)),
            ),
            "vehicle=none",
            &format!("vehicle={vehicle_id},plate={}", vehicle.plate_number),
            now,
        )?;
        Ok::<Vehicle, ApiError>(Vehicle {
            vehicle_id: Some(vehicle_id),
            ..vehicle.clone()
        })
    })?;

    info!(vehicle_id = ?stored.vehicle_id, plate = %stored.plate_number, "Registered vehicle");
    Ok(stored)
}

/// Registers a driver.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the name is blank.
pub fn register_driver(
    persistence: &mut SqlitePersistence,
    request: &RegisterDriverRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Driver, ApiError> {
    AuthorizationService::require_admin(actor, "register_driver")?;
    let driver: Driver = Driver {
        driver_id: None,
        name: required_text("name", &request.name)?,
        phone: normalize_optional_text(request.phone.as_deref()),
        is_available: true,
    };

    let stored: Driver = persistence.atomically(|tx| {
        let driver_id: i64 = tx.insert_driver(&driver)?;
        record_admin_event(
            tx,
            actor,
            cause,
            Action::new(
                String::from("RegisterDriver"),
                Some(format!("Registered driver {}", driver.name)),
            ),
            "driver=none",
            &format!("driver={driver_id},name={}", driver.name),
            now,
        )?;
        Ok::<Driver, ApiError>(Driver {
            driver_id: Some(driver_id),
            ..driver.clone()
        })
    })?;

    info!(driver_id = ?stored.driver_id, name = %stored.name, "Registered driver");
    Ok(stored)
}

/// Registers a deliverer.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the name is blank.
pub fn register_deliverer(
    persistence: &mut SqlitePersistence,
    request: &RegisterDelivererRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<Deliverer, ApiError> {
    AuthorizationService::require_admin(actor, "register_deliverer")?;
    let deliverer: Deliverer = Deliverer {
        deliverer_id: None,
        name: required_text("name", &request.name)?,
        phone: normalize_optional_text(request.phone.as_deref()),
        is_available: true,
    };

    let stored: Deliverer = persistence.atomically(|tx| {
        let deliverer_id: i64 = tx.insert_deliverer(&deliverer)?;
        record_admin_event(
            tx,
            actor,
            cause,
            Action::new(
                String::from("RegisterDeliverer"),
                Some(format!("Registered deliverer {}", deliverer.name)),
            ),
            "deliverer=none",
            &format!("deliverer={deliverer_id},name={}", deliverer.name),
            now,
        )?;
        Ok::<Deliverer, ApiError>(Deliverer {
            deliverer_id: Some(deliverer_id),
            ..deliverer.clone()
        })
    })?;

    info!(deliverer_id = ?stored.deliverer_id, name = %stored.name, "Registered deliverer");
    Ok(stored)
}

/// Lists every vehicle.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(persistence: &mut SqlitePersistence) -> Result<Vec<Vehicle>, ApiError> {
    persistence.read(|tx| tx.list_vehicles().map_err(ApiError::from))
}

/// Lists every driver.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_drivers(persistence: &mut SqlitePersistence) -> Result<Vec<Driver>, ApiError> {
    persistence.read(|tx| tx.list_drivers().map_err(ApiError::from))
}

/// Lists every deliverer.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_deliverers(persistence: &mut SqlitePersistence) -> Result<Vec<Deliverer>, ApiError> {
    persistence.read(|tx| tx.list_deliverers().map_err(ApiError::from))
}

// ============================================================================
// Audit
// ============================================================================

/// Returns the audit trail of a process, oldest first.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the process does not exist. A reverted
/// process no longer exists.
pub fn get_audit_trail(
    persistence: &mut SqlitePersistence,
    process_id: i64,
) -> Result<Vec<AuditEvent>, ApiError> {
    persistence.read(|tx| {
        tx.get_process(process_id)?;
        Ok(tx.list_audit_events_for_process(process_id)?)
    })
}
