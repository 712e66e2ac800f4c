//! Error types for console server operations.
//!
//! Store operations return `rootcause::Report<StoreError>`; server functions
//! log the report and hand the browser the user-safe message from
//! [`StoreError::into_server_error`].

use leptos::server_fn::error::ServerFnError;
use pharma_lims_accounts::AccountError;
use pharma_lims_core::FieldErrors;
use pharma_lims_custom_fields::CustomFieldError;
use pharma_lims_notifications::NotificationError;
use pharma_lims_signatures::SignatureError;
use pharma_lims_workflow::WorkflowError;
use std::fmt;

/// Errors raised by the in-memory console store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record of this kind with this id.
    NotFound { entity: &'static str, id: String },
    /// The id could not be parsed.
    InvalidId {
        entity: &'static str,
        id: String,
        reason: String,
    },
    /// A submitted form failed validation.
    Validation { errors: FieldErrors },
    /// The operation is not allowed in the record's current state.
    Rejected { details: String },
    /// A query parameter could not be understood.
    InvalidQuery { param: &'static str, value: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} '{id}' not found"),
            Self::InvalidId { entity, id, reason } => {
                write!(f, "invalid {entity} id '{id}': {reason}")
            }
            Self::Validation { errors } => write!(f, "validation failed: {errors}"),
            Self::Rejected { details } => write!(f, "operation rejected: {details}"),
            Self::InvalidQuery { param, value } => {
                write!(f, "invalid value '{value}' for query parameter '{param}'")
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        match self {
            StoreError::NotFound { entity, .. } => {
                ServerFnError::new(format!("{} not found", capitalize(entity)))
            }
            StoreError::InvalidId { entity, .. } => {
                ServerFnError::new(format!("Invalid {entity} ID"))
            }
            StoreError::Validation { errors } => match errors.iter().next() {
                Some((_, message)) => ServerFnError::new(message.to_string()),
                None => ServerFnError::new("Please check the form and try again"),
            },
            StoreError::Rejected { details } => ServerFnError::new(capitalize(&details)),
            StoreError::InvalidQuery { param, .. } => {
                ServerFnError::new(format!("Invalid filter value for {param}"))
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<FieldErrors> for StoreError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }
}

impl From<AccountError> for StoreError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::UserNotFound { user_id } => Self::NotFound {
                entity: "user",
                id: user_id.to_string(),
            },
            other => Self::Rejected {
                details: other.to_string(),
            },
        }
    }
}

impl From<WorkflowError> for StoreError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::WorkflowNotFound { workflow_id } => Self::NotFound {
                entity: "workflow",
                id: workflow_id.to_string(),
            },
            other => Self::Rejected {
                details: other.to_string(),
            },
        }
    }
}

impl From<SignatureError> for StoreError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::TemplateNotFound { template_id } => Self::NotFound {
                entity: "signature template",
                id: template_id.to_string(),
            },
            SignatureError::DocumentNotFound { document_id } => Self::NotFound {
                entity: "document",
                id: document_id.to_string(),
            },
            SignatureError::SignerNotFound { signer_id } => Self::NotFound {
                entity: "signer",
                id: signer_id.to_string(),
            },
            other => Self::Rejected {
                details: other.to_string(),
            },
        }
    }
}

impl From<NotificationError> for StoreError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::TemplateNotFound { template_id } => Self::NotFound {
                entity: "notification template",
                id: template_id.to_string(),
            },
            NotificationError::NotificationNotFound { notification_id } => Self::NotFound {
                entity: "notification",
                id: notification_id.to_string(),
            },
            other => Self::Rejected {
                details: other.to_string(),
            },
        }
    }
}

impl From<CustomFieldError> for StoreError {
    fn from(err: CustomFieldError) -> Self {
        match err {
            CustomFieldError::PageNotFound { page_id } => Self::NotFound {
                entity: "page",
                id: page_id.to_string(),
            },
            CustomFieldError::FieldNotFound { field_id } => Self::NotFound {
                entity: "field",
                id: field_id.to_string(),
            },
            other => Self::Rejected {
                details: other.to_string(),
            },
        }
    }
}
