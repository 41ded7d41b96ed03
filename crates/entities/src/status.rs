//! Work status shared by projects and tasks.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Progress status of a Project or Task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished.
    Completed,
    /// Paused.
    #[serde(rename = "On Hold")]
    OnHold,
    /// Abandoned.
    Cancelled,
}

impl WorkStatus {
    /// All statuses in display order.
    pub const ALL: [WorkStatus; 5] = [
        WorkStatus::Pending,
        WorkStatus::InProgress,
        WorkStatus::Completed,
        WorkStatus::OnHold,
        WorkStatus::Cancelled,
    ];

    /// Returns the wire label of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Pending => "Pending",
            WorkStatus::InProgress => "In Progress",
            WorkStatus::Completed => "Completed",
            WorkStatus::OnHold => "On Hold",
            WorkStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown status '{}', expected one of: Pending, In Progress, Completed, On Hold, Cancelled",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for WorkStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
