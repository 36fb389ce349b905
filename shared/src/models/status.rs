//! Approval status shared by timesheets, leave requests and documents

use serde::{Deserialize, Serialize};

/// Three-state approval lifecycle
///
/// Records are created as `Requested` and move exactly once to
/// `Approved` or `Rejected`. Stored as SCREAMING_SNAKE_CASE text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ApprovalStatus {
    /// Awaiting review
    #[default]
    #[serde(rename = "REQUESTED")]
    Requested,
    /// Accepted by a reviewer
    #[serde(rename = "APPROVED")]
    Approved,
    /// Declined by a reviewer
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ApprovalStatus {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether a reviewer has already acted on the record
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Requested)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer decision payload for single approve/reject endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Optional reviewer comment stored with the record
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_requested() {
        assert_eq!(ApprovalStatus::default(), ApprovalStatus::Requested);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(ApprovalStatus::Requested.as_str(), "REQUESTED");
        assert_eq!(ApprovalStatus::Approved.as_str(), "APPROVED");
        assert_eq!(ApprovalStatus::Rejected.as_str(), "REJECTED");
    }

    #[test]
    fn test_is_final() {
        assert!(!ApprovalStatus::Requested.is_final());
        assert!(ApprovalStatus::Approved.is_final());
        assert!(ApprovalStatus::Rejected.is_final());
    }

    #[test]
    fn test_serialize_screaming_snake() {
        let json = serde_json::to_string(&ApprovalStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
    }

    #[test]
    fn test_deserialize() {
        let status: ApprovalStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(status, ApprovalStatus::Rejected);
    }
}
