use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::checklist::ClearanceCategory;
use super::clearance::ClearanceSummary;
use super::domain::{non_blank, RelievingRequest, RequestStatus};

/// What moves a request from `Pending` to `InProgress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// The first successful checklist write starts the clearance.
    #[default]
    Automatic,
    /// Only an explicit `InProgress` decision does.
    Manual,
}

impl ProgressPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ProgressPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProgressPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown progress policy '{other}'")),
        }
    }
}

/// Reasons the state machine refuses a transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("request is already {status}; no further changes are accepted")]
    RequestAlreadyFinalized { status: RequestStatus },
    #[error("clearance incomplete for: {}", format_categories(.missing))]
    ClearanceIncomplete { missing: Vec<ClearanceCategory> },
    #[error("admin remarks are required to reject a request")]
    RemarksRequired,
    #[error("cannot move a request from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
}

pub(crate) fn format_categories(categories: &[ClearanceCategory]) -> String {
    categories
        .iter()
        .map(|category| category.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Closed transition table for relieving requests.
///
/// | from                  | to         | guard                         |
/// |-----------------------|------------|-------------------------------|
/// | Pending               | InProgress | none                          |
/// | Pending, InProgress   | Approved   | every category `Completed`    |
/// | Pending, InProgress   | Rejected   | non-blank remarks             |
///
/// Everything else is refused. The input request is never mutated; a successful transition
/// returns the updated copy for the caller to persist.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLifecycle;

impl RequestLifecycle {
    pub fn transition(
        &self,
        request: &RelievingRequest,
        target: RequestStatus,
        remarks: Option<&str>,
        clearance: &ClearanceSummary,
    ) -> Result<RelievingRequest, TransitionError> {
        let from = request.status;
        if from.is_terminal() {
            return Err(TransitionError::RequestAlreadyFinalized { status: from });
        }

        let remarks = non_blank(remarks);
        match (from, target) {
            (RequestStatus::Pending, RequestStatus::InProgress) => {}
            (_, RequestStatus::Approved) => {
                if !clearance.all_complete {
                    return Err(TransitionError::ClearanceIncomplete {
                        missing: clearance.missing.clone(),
                    });
                }
            }
            (_, RequestStatus::Rejected) => {
                if remarks.is_none() {
                    return Err(TransitionError::RemarksRequired);
                }
            }
            (from, to) => return Err(TransitionError::InvalidTransition { from, to }),
        }

        let mut next = request.clone();
        next.status = target;
        if remarks.is_some() {
            next.admin_remarks = remarks;
        }
        Ok(next)
    }

    /// Whether a checklist write should also start the clearance.
    pub fn starts_on_checklist_write(&self, policy: ProgressPolicy, status: RequestStatus) -> bool {
        policy == ProgressPolicy::Automatic && status == RequestStatus::Pending
    }
}
