// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

use odn_flow_domain::Role;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// The officer performing an action.
///
/// Actors are always supplied explicitly by the caller. The role is the
/// role the actor acted in, which is what the workflow rules check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role the actor acted in.
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role the actor is acting in
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The specific change that occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`CompleteEwm`", "`ConfirmPod`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact textual snapshot of the affected unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful mutation produces exactly one audit event, written in
/// the same transaction as the mutation. Audit events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The unit before and after the change
/// - The process it belongs to, once known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Assigned by the database. `None` until persisted.
    pub event_id: Option<i64>,
    /// The process the event belongs to, if any.
    pub process_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    /// RFC 3339 timestamp of the change.
    pub occurred_at: String,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` not yet tied to a process.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The unit before the transition
    /// * `after` - The unit after the transition
    /// * `occurred_at` - When the change happened
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        occurred_at: String,
    ) -> Self {
        Self {
            event_id: None,
            process_id: None,
            actor,
            cause,
            action,
            before,
            after,
            occurred_at,
        }
    }

    /// Returns this event tied to a process.
    #[must_use]
    pub const fn with_process_id(mut self, process_id: i64) -> Self {
        self.process_id = Some(process_id);
        self
    }
}
