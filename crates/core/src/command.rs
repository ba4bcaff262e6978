// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use odn_flow_domain::{CorrectableFlag, EligibilityMode, OdnStatusUpdate, ProcessStatus};

/// A command represents officer intent as data only.
///
/// Commands are the only way to request changes to a process or its ODNs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start O2C for the facility in the state's period.
    StartProcess {
        /// Eligibility mode the facility is started under.
        mode: EligibilityMode,
    },
    /// Undo a start that has no ODNs yet. Deletes the process.
    RevertStart,
    /// Move the process to another macro-status.
    Advance {
        /// The requested status.
        target: ProcessStatus,
        /// Seed the "RRF not sent" ODN when completing O2C with no ODNs.
        accept_rrf_not_sent: bool,
    },
    /// Add an ODN to the process.
    AddOdn {
        odn_number: String,
    },
    /// Rename an ODN.
    EditOdn {
        odn_id: i64,
        odn_number: String,
    },
    DeleteOdn {
        odn_id: i64,
    },
    /// Set one ODN sub-status.
    UpdateOdnStatus {
        odn_id: i64,
        update: OdnStatusUpdate,
    },
    /// Clear a confirmed ODN flag. Admin only.
    CorrectOdn {
        odn_id: i64,
        flag: CorrectableFlag,
    },
}
