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
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod assignment;
mod command;
mod error;
mod ledger;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, format_timestamp};
pub use assignment::{AssignmentRequest, assign_route};
pub use command::Command;
pub use error::CoreError;
pub use state::{AssignmentResult, Change, State, TransitionResult};
