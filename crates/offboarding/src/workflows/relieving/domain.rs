use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for relieving requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference into the external faculty directory. Not owned by this workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FacultyId(pub String);

impl fmt::Display for FacultyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a relieving request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::InProgress, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Approved and Rejected close the request and its clearance records.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// A faculty member's request to be relieved of duty, together with its decision state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelievingRequest {
    pub id: RequestId,
    pub faculty_id: FacultyId,
    pub applied_date: NaiveDate,
    pub proposed_last_working_day: NaiveDate,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resignation_letter_url: Option<String>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_remarks: Option<String>,
}

/// Intake payload handed over by the request form. Required fields are optional here so the
/// service can report exactly which one is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelievingRequest {
    #[serde(default)]
    pub faculty_id: FacultyId,
    #[serde(default)]
    pub proposed_last_working_day: Option<NaiveDate>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub resignation_letter_url: Option<String>,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
}

/// Optional narrowing applied by `list_requests`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub faculty_id: Option<FacultyId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &RelievingRequest) -> bool {
        self.status.map_or(true, |status| request.status == status)
            && self
                .faculty_id
                .as_ref()
                .map_or(true, |faculty| &request.faculty_id == faculty)
    }
}

/// Display data looked up from the faculty directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyProfile {
    pub name: String,
    pub employee_id: String,
    pub department_id: String,
}

/// Input validation failures. Never defaulted silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("faculty id is required")]
    MissingFaculty,
    #[error("reason for relieving is required")]
    MissingReason,
    #[error("proposed last working day is required")]
    MissingLastWorkingDay,
    #[error("proposed last working day {proposed} precedes the application date {applied}")]
    LastWorkingDayBeforeApplication {
        applied: NaiveDate,
        proposed: NaiveDate,
    },
    #[error("admin remarks are required to reject a request")]
    RemarksRequired,
}

/// Trim optional free text, collapsing blank input to `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
