//! Error types for the notifications crate.

use pharma_lims_core::{NotificationId, NotificationTemplateId};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// A label did not match any known variant.
    UnknownValue { kind: &'static str, value: String },
    TemplateNotFound { template_id: NotificationTemplateId },
    NotificationNotFound { notification_id: NotificationId },
    /// Inactive templates cannot be sent.
    TemplateInactive { template_id: NotificationTemplateId },
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { kind, value } => write!(f, "unknown {kind} '{value}'"),
            Self::TemplateNotFound { template_id } => {
                write!(f, "notification template not found: {template_id}")
            }
            Self::NotificationNotFound { notification_id } => {
                write!(f, "notification not found: {notification_id}")
            }
            Self::TemplateInactive { template_id } => {
                write!(f, "notification template {template_id} is inactive")
            }
        }
    }
}

impl std::error::Error for NotificationError {}
