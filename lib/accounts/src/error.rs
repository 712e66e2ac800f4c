//! Error types for the accounts crate.

use pharma_lims_core::UserId;
use std::fmt;

/// Errors from account operations and user list settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// A label did not match any known variant.
    UnknownValue { kind: &'static str, value: String },
    /// Authorization levels stop at 3.
    InvalidAuthorizationLevel { level: u8 },
    /// Page size is not one of the offered options.
    UnsupportedPageSize { size: usize },
    /// No user with this id.
    UserNotFound { user_id: UserId },
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { kind, value } => write!(f, "unknown {kind} '{value}'"),
            Self::InvalidAuthorizationLevel { level } => {
                write!(f, "authorization level {level} is outside 0-3")
            }
            Self::UnsupportedPageSize { size } => {
                write!(f, "page size {size} is not supported")
            }
            Self::UserNotFound { user_id } => write!(f, "user not found: {user_id}"),
        }
    }
}

impl std::error::Error for AccountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_error_names_the_size() {
        let err = AccountError::UnsupportedPageSize { size: 7 };
        assert_eq!(err.to_string(), "page size 7 is not supported");
    }

    #[test]
    fn user_not_found_includes_prefixed_id() {
        let user_id = UserId::new();
        let err = AccountError::UserNotFound { user_id };
        assert!(err.to_string().contains("usr_"));
    }
}
