// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound delivery numbers and their sub-statuses.
//!
//! An ODN carries independent flags (EWM completion, proof of delivery,
//! quality, document signing and handover). The flags are not ordered
//! against each other; what gates them is the parent process status and
//! the role that owns each flag.

use crate::error::DomainError;
use crate::process_status::ProcessStatus;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ODN number seeded when O2C completes without any ODN.
pub const RRF_NOT_SENT: &str = "RRF not sent";

/// Who set a flag and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagStamp {
    pub by: String,
    pub at: String,
}

impl FlagStamp {
    #[must_use]
    pub fn new(by: &str, at: &str) -> Self {
        Self {
            by: by.to_string(),
            at: at.to_string(),
        }
    }
}

/// Outcome of a proof-of-delivery check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PodOutcome {
    /// Delivery confirmed with a POD document.
    Confirmed {
        pod_number: String,
        arrival_kilometer: i64,
    },
    /// Delivery could not be confirmed; the reason is mandatory.
    NotConfirmed { reason: String },
}

/// A recorded POD outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub outcome: PodOutcome,
    pub stamp: FlagStamp,
}

/// A recorded quality evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub feedback: Option<String>,
    pub stamp: FlagStamp,
}

/// A delivery-line identifier nested under a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odn {
    /// `None` until persisted.
    pub odn_id: Option<i64>,
    pub process_id: i64,
    pub odn_number: String,
    pub ewm_completed: Option<FlagStamp>,
    pub pod: Option<PodRecord>,
    pub quality: Option<QualityRecord>,
    pub documents_signed: Option<FlagStamp>,
    pub documents_handover: Option<FlagStamp>,
    pub updated_at: String,
    pub version: i64,
}

impl Odn {
    /// Creates a new, unpersisted ODN with every flag cleared.
    #[must_use]
    pub fn new(process_id: i64, odn_number: &str, created_at: &str) -> Self {
        Self {
            odn_id: None,
            process_id,
            odn_number: odn_number.to_string(),
            ewm_completed: None,
            pod: None,
            quality: None,
            documents_signed: None,
            documents_handover: None,
            updated_at: created_at.to_string(),
            version: 0,
        }
    }

    /// Returns true if POD was recorded as confirmed.
    #[must_use]
    pub const fn is_pod_confirmed(&self) -> bool {
        matches!(
            self.pod,
            Some(PodRecord {
                outcome: PodOutcome::Confirmed { .. },
                ..
            })
        )
    }

    #[must_use]
    pub const fn is_quality_confirmed(&self) -> bool {
        self.quality.is_some()
    }

    /// Returns true once documents are both signed and handed over.
    #[must_use]
    pub const fn is_documentation_closed(&self) -> bool {
        self.documents_signed.is_some() && self.documents_handover.is_some()
    }

    /// Returns true if this is the seeded "RRF not sent" placeholder.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.odn_number == RRF_NOT_SENT
    }
}

/// A forward-only change to one ODN sub-status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum OdnStatusUpdate {
    EwmCompleted,
    Pod(PodOutcome),
    QualityConfirmed { feedback: Option<String> },
    DocumentsSigned,
    DocumentsHandover,
}

impl OdnStatusUpdate {
    /// Action name used for audit events.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::EwmCompleted => "SetOdnEwmCompleted",
            Self::Pod(PodOutcome::Confirmed { .. }) => "ConfirmPod",
            Self::Pod(PodOutcome::NotConfirmed { .. }) => "RecordPodNotConfirmed",
            Self::QualityConfirmed { .. } => "ConfirmQuality",
            Self::DocumentsSigned => "SetDocumentsSigned",
            Self::DocumentsHandover => "SetDocumentsHandover",
        }
    }

    /// The role that owns this flag.
    #[must_use]
    pub const fn owner(&self) -> Role {
        match self {
            Self::EwmCompleted => Role::EwmOfficer,
            Self::Pod(_) => Role::DocumentationOfficer,
            Self::QualityConfirmed { .. } => Role::QualityOfficer,
            Self::DocumentsSigned | Self::DocumentsHandover => Role::DocumentFollower,
        }
    }

    /// Minimum parent status at which the flag becomes visible.
    #[must_use]
    pub const fn visible_from(&self) -> ProcessStatus {
        match self {
            Self::EwmCompleted => ProcessStatus::O2cCompleted,
            Self::Pod(_)
            | Self::QualityConfirmed { .. }
            | Self::DocumentsSigned
            | Self::DocumentsHandover => ProcessStatus::Dispatched,
        }
    }
}

/// Flags an Admin may clear after confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectableFlag {
    QualityConfirmed,
    DocumentsSigned,
    DocumentsHandover,
}

impl CorrectableFlag {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QualityConfirmed => "quality_confirmed",
            Self::DocumentsSigned => "documents_signed",
            Self::DocumentsHandover => "documents_handover",
        }
    }
}

impl std::fmt::Display for CorrectableFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CorrectableFlag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quality_confirmed" => Ok(Self::QualityConfirmed),
            "documents_signed" => Ok(Self::DocumentsSigned),
            "documents_handover" => Ok(Self::DocumentsHandover),
            _ => Err(DomainError::InvalidOdnFlag(s.to_string())),
        }
    }
}

/// Trims and validates an ODN number.
///
/// # Errors
///
/// Returns `DomainError::InvalidOdnNumber` if the number is blank.
pub fn normalize_odn_number(odn_number: &str) -> Result<String, DomainError> {
    let trimmed: &str = odn_number.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidOdnNumber(String::from(
            "ODN number cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates that an ODN number is unique within its process.
///
/// Matching is exact and case-sensitive. `excluding` skips the ODN being
/// renamed so that saving an unchanged number is not a conflict.
///
/// # Errors
///
/// Returns `DomainError::DuplicateOdn` if another ODN already uses the number.
pub fn validate_odn_unique(
    odns: &[Odn],
    odn_number: &str,
    excluding: Option<i64>,
) -> Result<(), DomainError> {
    let duplicate: bool = odns
        .iter()
        .filter(|o| excluding.is_none() || o.odn_id != excluding)
        .any(|o| o.odn_number == odn_number);

    if duplicate {
        return Err(DomainError::DuplicateOdn {
            odn_number: odn_number.to_string(),
        });
    }
    Ok(())
}

/// Validates and normalizes a POD outcome.
///
/// # Errors
///
/// Returns an error if:
/// - A confirmation has a blank POD number
/// - A confirmation has a negative arrival kilometer
/// - A non-confirmation has a blank reason
pub fn validate_pod_outcome(outcome: &PodOutcome) -> Result<PodOutcome, DomainError> {
    match outcome {
        PodOutcome::Confirmed {
            pod_number,
            arrival_kilometer,
        } => {
            let pod_number: &str = pod_number.trim();
            if pod_number.is_empty() {
                return Err(DomainError::InvalidPodNumber(String::from(
                    "POD number cannot be empty",
                )));
            }
            if *arrival_kilometer < 0 {
                return Err(DomainError::NegativeArrivalKilometer {
                    value: *arrival_kilometer,
                });
            }
            Ok(PodOutcome::Confirmed {
                pod_number: pod_number.to_string(),
                arrival_kilometer: *arrival_kilometer,
            })
        }
        PodOutcome::NotConfirmed { reason } => {
            let reason: &str = reason.trim();
            if reason.is_empty() {
                return Err(DomainError::MissingReason);
            }
            Ok(PodOutcome::NotConfirmed {
                reason: reason.to_string(),
            })
        }
    }
}
