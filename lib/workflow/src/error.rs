//! Error types for the workflow crate.

use pharma_lims_core::WorkflowId;
use std::fmt;

/// Errors from workflow operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A string did not name a known enum value.
    UnknownValue { kind: &'static str, value: String },
    /// Workflow with the given ID was not found.
    WorkflowNotFound { workflow_id: WorkflowId },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { kind, value } => write!(f, "unknown {kind}: '{value}'"),
            Self::WorkflowNotFound { workflow_id } => {
                write!(f, "workflow not found: {workflow_id}")
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_value_display() {
        let err = WorkflowError::UnknownValue {
            kind: "category",
            value: "Stability".to_string(),
        };
        assert_eq!(err.to_string(), "unknown category: 'Stability'");
    }

    #[test]
    fn not_found_display_includes_id() {
        let workflow_id = WorkflowId::new();
        let err = WorkflowError::WorkflowNotFound { workflow_id };
        assert!(err.to_string().contains(&workflow_id.to_string()));
    }
}
