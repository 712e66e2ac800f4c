//! Per-user audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a user's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    /// Short verb phrase, e.g. "User created" or "Privileges updated".
    pub action: String,
    /// Name of whoever made the change.
    pub performed_by: String,
    pub details: String,
}

impl AuditEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn now(
        action: impl Into<String>,
        performed_by: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            performed_by: performed_by.into(),
            details: details.into(),
        }
    }
}
