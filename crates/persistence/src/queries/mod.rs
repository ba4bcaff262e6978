// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `audit`: Audit trail
//! - `facilities`: Facility lookups
//! - `odns`: ODNs of a process
//! - `processes`: Processes by facility, route and period
//! - `resources`: Vehicles, drivers and deliverers
//! - `routes`: Route assignments and computed readiness
//! - `state`: The `State` a command is applied to

pub mod audit;
pub mod facilities;
pub mod odns;
pub mod processes;
pub mod resources;
pub mod routes;
pub mod state;
