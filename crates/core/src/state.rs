// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use odn_flow_audit::{AuditEvent, StateSnapshot};
use odn_flow_domain::{Facility, Odn, Process, ReportingPeriod, RouteAssignment, RouteReadiness};

/// Everything a command needs to know about one facility in one period.
///
/// State is loaded by the caller inside the transaction that will persist
/// the result. `apply` never reads anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// The facility the process belongs to.
    pub facility: Facility,
    /// The reporting period the process belongs to.
    pub period: ReportingPeriod,
    /// The open process, or `None` before O2C starts.
    pub process: Option<Process>,
    /// ODNs of the process.
    pub odns: Vec<Odn>,
    /// Readiness of the process's route, when a vehicle request is possible.
    pub route_readiness: Option<RouteReadiness>,
    /// Vehicle assignment of the process's route, if one exists.
    pub route_assignment: Option<RouteAssignment>,
}

impl State {
    /// Creates a state with no process for a facility and period.
    #[must_use]
    pub const fn new(facility: Facility, period: ReportingPeriod) -> Self {
        Self {
            facility,
            period,
            process: None,
            odns: Vec::new(),
            route_readiness: None,
            route_assignment: None,
        }
    }

    /// Returns the ODN with the given id.
    #[must_use]
    pub fn odn(&self, odn_id: i64) -> Option<&Odn> {
        self.odns.iter().find(|o| o.odn_id == Some(odn_id))
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let facility_id: String = self
            .facility
            .facility_id
            .map_or_else(|| String::from("new"), |id| id.to_string());
        match &self.process {
            Some(process) => StateSnapshot::new(format!(
                "facility={},period={},status={},version={},odns={}",
                facility_id,
                self.period.key(),
                process.status,
                process.version,
                self.odns.len()
            )),
            None => StateSnapshot::new(format!(
                "facility={},period={},status=none",
                facility_id,
                self.period.key()
            )),
        }
    }
}

/// A single row-level write produced by a transition.
///
/// Updates and deletes carry the version the write was based on; the
/// store must reject the write if the row has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    InsertProcess(Process),
    UpdateProcess {
        process: Process,
        expected_version: i64,
    },
    DeleteProcess {
        process_id: i64,
        expected_version: i64,
    },
    InsertOdn(Odn),
    UpdateOdn {
        odn: Odn,
        expected_version: i64,
    },
    DeleteOdn {
        odn_id: i64,
        expected_version: i64,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
/// A transition whose target equals the current state is a no-op: it carries
/// no changes and no audit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// Writes to persist, in order.
    pub changes: Vec<Change>,
    /// The audit event recording this transition.
    pub audit_event: Option<AuditEvent>,
}

impl TransitionResult {
    pub(crate) const fn unchanged(state: State) -> Self {
        Self {
            new_state: state,
            changes: Vec::new(),
            audit_event: None,
        }
    }

    /// Returns true if nothing needs to be written.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The result of binding a vehicle to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    /// The new assignment, not yet persisted.
    pub assignment: RouteAssignment,
    /// The audit event recording the assignment.
    pub audit_event: AuditEvent,
}
