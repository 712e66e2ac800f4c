//! Core domain types and utilities for the Pharma LIMS console.
//!
//! This crate provides the identifiers, error handling foundation and the
//! form validation helpers shared by every module of the console.

pub mod error;
pub mod form;
pub mod id;

pub use error::Result;
pub use form::{FieldErrors, is_valid_email};
pub use id::{
    DocumentId, FieldId, ModulePageId, NotificationId, NotificationTemplateId, ParseIdError,
    SignatureTemplateId, SignerId, UserId, WorkflowId,
};
