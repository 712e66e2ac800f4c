//! Error types for the custom-fields crate.

use pharma_lims_core::{FieldId, ModulePageId};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomFieldError {
    /// A label did not match any known variant.
    UnknownValue { kind: &'static str, value: String },
    PageNotFound { page_id: ModulePageId },
    FieldNotFound { field_id: FieldId },
    /// Another field on the page already uses this key.
    DuplicateKey { key: String },
}

impl fmt::Display for CustomFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { kind, value } => write!(f, "unknown {kind} '{value}'"),
            Self::PageNotFound { page_id } => write!(f, "module page not found: {page_id}"),
            Self::FieldNotFound { field_id } => write!(f, "field not found: {field_id}"),
            Self::DuplicateKey { key } => write!(f, "field key '{key}' is already used on this page"),
        }
    }
}

impl std::error::Error for CustomFieldError {}
