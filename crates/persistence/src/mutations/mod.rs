// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event persistence
//! - `facilities`: Facility registration and routing
//! - `resources`: Vehicle, driver and deliverer registration
//! - `routes`: Route assignments
//! - `workflow`: Versioned writes produced by process and ODN commands

pub mod audit;
pub mod facilities;
pub mod resources;
pub mod routes;
pub mod workflow;

pub use workflow::{PersistedTransition, persist_transition};
