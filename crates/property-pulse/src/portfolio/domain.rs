use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived maintenance condition of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Complete,
    Pending,
    Overdue,
}

impl PropertyStatus {
    pub fn ordered() -> [PropertyStatus; 3] {
        [
            PropertyStatus::Complete,
            PropertyStatus::Pending,
            PropertyStatus::Overdue,
        ]
    }

    /// Wire value, always lowercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Complete => "complete",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Overdue => "overdue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PropertyStatus::Complete => "Complete",
            PropertyStatus::Pending => "Pending",
            PropertyStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string is not one of the three wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for PropertyStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "complete" => Ok(PropertyStatus::Complete),
            "pending" => Ok(PropertyStatus::Pending),
            "overdue" => Ok(PropertyStatus::Overdue),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Maintenance task tallies for a single property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTaskCounts {
    pub completed: u32,
    pub pending: u32,
    pub overdue: u32,
}

impl PropertyTaskCounts {
    pub fn total(&self) -> u64 {
        u64::from(self.completed) + u64::from(self.pending) + u64::from(self.overdue)
    }
}

/// A managed property as exposed to dashboard clients.
///
/// `maintenance_score` and `status` are derived from `tasks` and `issues`;
/// call [`Property::refresh_derived`] after touching either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    pub units: u32,
    pub status: PropertyStatus,
    pub last_inspection: NaiveDate,
    pub next_inspection: NaiveDate,
    pub maintenance_score: u8,
    pub tasks: PropertyTaskCounts,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Portfolio-wide rollup shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub total_properties: usize,
    pub complete_properties: usize,
    pub pending_properties: usize,
    pub overdue_properties: usize,
    pub total_units: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub task_completion_rate: u8,
}

/// Uniform envelope returned by every portfolio operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            error: None,
        }
    }

    pub fn failure(data: T, error: impl Into<String>) -> Self {
        Self {
            data,
            success: false,
            error: Some(error.into()),
        }
    }
}
