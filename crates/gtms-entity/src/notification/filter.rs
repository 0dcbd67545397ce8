//! History search filters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read/unread filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadState {
    /// Only read notifications.
    Read,
    /// Only unread notifications.
    Unread,
}

impl ReadState {
    /// Parse `read` / `unread`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Self::Read),
            "unread" => Some(Self::Unread),
            _ => None,
        }
    }
}

/// Filters applied by the notification history search. All fields are
/// optional and combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// Exact notification type.
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    /// Inclusive lower bound on the creation date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub end_date: Option<NaiveDate>,
    /// Read state.
    pub status: Option<ReadState>,
    /// Exact priority.
    pub priority: Option<String>,
    /// Case-insensitive substring of title or body.
    pub search: Option<String>,
}
