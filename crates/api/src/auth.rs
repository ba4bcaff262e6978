// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor identification and administrative authorization.
//!
//! Every gateway call names the acting officer and the role they act in.
//! There is no session lookup: the caller is trusted to pass the identity
//! its own authentication layer established. Workflow permissions are
//! enforced by the transition table in the core; this module only guards
//! the administrative operations that sit outside it.

use odn_flow_audit::Actor;
use odn_flow_domain::Role;

use crate::error::AuthError;

/// An officer acting in a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this officer.
    pub id: String,
    /// The role the officer acts in.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this officer
    /// * `role` - The role the officer acts in
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this actor into the audit representation.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

/// Accepts an explicitly supplied actor.
///
/// # Arguments
///
/// * `actor_id` - The identifier of the officer
/// * `role` - The role the officer acts in
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the identifier is blank.
pub fn authenticate(actor_id: &str, role: Role) -> Result<AuthenticatedActor, AuthError> {
    let id: &str = actor_id.trim();
    if id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(id.to_string(), role))
}

/// Role checks for operations outside the process transition table.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an Admin.
    ///
    /// Facility registration, routing changes, CSV import and resource
    /// registration are Admin operations.
    ///
    /// # Arguments
    ///
    /// * `actor` - The acting officer
    /// * `action` - The operation being attempted, for the error message
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.role == Role::Admin {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: Role::Admin.to_string(),
            })
        }
    }
}
