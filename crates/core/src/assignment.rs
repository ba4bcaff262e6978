// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::apply::{format_timestamp, rejected};
use crate::error::CoreError;
use crate::state::AssignmentResult;
use odn_flow_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use odn_flow_domain::{
    Deliverer, DomainError, Driver, ProcessStatus, RouteAssignment, RouteReadiness, Vehicle,
    find_transition,
};
use time::OffsetDateTime;

/// The resources an officer wants to bind to a route.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentRequest<'a> {
    pub vehicle: &'a Vehicle,
    pub driver: &'a Driver,
    pub deliverer: Option<&'a Deliverer>,
}

fn require_available(
    resource: &'static str,
    id: Option<i64>,
    is_available: bool,
) -> Result<i64, CoreError> {
    let id: i64 =
        id.ok_or_else(|| CoreError::Internal(format!("{resource} has not been persisted")))?;
    if !is_available {
        return Err(CoreError::DomainViolation(DomainError::ResourceUnavailable {
            resource,
            id,
        }));
    }
    Ok(id)
}

/// Binds a vehicle, driver and optional deliverer to a ready route.
///
/// # Arguments
///
/// * `readiness` - Route readiness evaluated in the current transaction
/// * `existing` - The assignment already stored for the route and period
/// * `request` - The resources to bind
/// * `actor` - The officer making the assignment
/// * `cause` - The cause or reason for this action
/// * `now` - The time of the change
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not allowed to assign vehicles
/// - The route is not ready
/// - The route already has an assignment for the period
/// - A resource is flagged unavailable
pub fn assign_route(
    readiness: &RouteReadiness,
    existing: Option<&RouteAssignment>,
    request: AssignmentRequest<'_>,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<AssignmentResult, CoreError> {
    let owners_allowed: bool =
        find_transition(ProcessStatus::VehicleRequested, ProcessStatus::VehicleAssigned)
            .is_some_and(|rule| rule.owners.contains(&actor.role));
    if !owners_allowed {
        return Err(rejected(
            &actor,
            ProcessStatus::VehicleRequested.as_str(),
            ProcessStatus::VehicleAssigned.as_str(),
            String::from("vehicle assignment is owned by pi_officer or tm_manager"),
        ));
    }

    if !readiness.ready {
        return Err(CoreError::DomainViolation(DomainError::RouteNotReady {
            route: readiness.route.clone(),
            period: readiness.period.key(),
            remaining: readiness.remaining,
        }));
    }

    if existing.is_some() {
        return Err(CoreError::DomainViolation(DomainError::DuplicateAssignment {
            route: readiness.route.clone(),
            period: readiness.period.key(),
        }));
    }

    let vehicle_id: i64 = require_available(
        "Vehicle",
        request.vehicle.vehicle_id,
        request.vehicle.is_available,
    )?;
    let driver_id: i64 = require_available(
        "Driver",
        request.driver.driver_id,
        request.driver.is_available,
    )?;
    let deliverer_id: Option<i64> = request
        .deliverer
        .map(|d| require_available("Deliverer", d.deliverer_id, d.is_available))
        .transpose()?;

    let timestamp: String = format_timestamp(now)?;
    let assignment: RouteAssignment = RouteAssignment {
        assignment_id: None,
        route: readiness.route.clone(),
        period: readiness.period,
        vehicle_id,
        driver_id,
        deliverer_id,
        assigned_by: actor.id.clone(),
        created_at: timestamp.clone(),
    };

    let before: StateSnapshot = StateSnapshot::new(format!(
        "route={},period={},assignment=none",
        assignment.route,
        assignment.period.key()
    ));
    let after: StateSnapshot = StateSnapshot::new(format!(
        "route={},period={},vehicle={},driver={},deliverer={}",
        assignment.route,
        assignment.period.key(),
        vehicle_id,
        driver_id,
        deliverer_id.map_or_else(|| String::from("none"), |id| id.to_string())
    ));
    let action: Action = Action::new(
        String::from("CreateRouteAssignment"),
        Some(format!(
            "Assigned vehicle {} with driver {} to route {} for {}",
            request.vehicle.plate_number,
            request.driver.name,
            assignment.route,
            assignment.period.key()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(actor, cause, action, before, after, timestamp);

    Ok(AssignmentResult {
        assignment,
        audit_event,
    })
}
