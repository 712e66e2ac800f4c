//! Error types for the signatures crate.

use crate::document::SignerStatus;
use pharma_lims_core::{DocumentId, SignatureTemplateId, SignerId};
use std::fmt;

/// Errors from signature operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A label did not match any known variant.
    UnknownValue { kind: &'static str, value: String },
    TemplateNotFound { template_id: SignatureTemplateId },
    DocumentNotFound { document_id: DocumentId },
    /// The signer is not on this document.
    SignerNotFound { signer_id: SignerId },
    /// The signer already signed or rejected.
    AlreadyDecided { signer_id: SignerId, status: SignerStatus },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownValue { kind, value } => write!(f, "unknown {kind} '{value}'"),
            Self::TemplateNotFound { template_id } => {
                write!(f, "signature template not found: {template_id}")
            }
            Self::DocumentNotFound { document_id } => {
                write!(f, "document not found: {document_id}")
            }
            Self::SignerNotFound { signer_id } => write!(f, "signer not found: {signer_id}"),
            Self::AlreadyDecided { signer_id, status } => {
                write!(f, "signer {signer_id} has already {}", status.as_str().to_lowercase())
            }
        }
    }
}

impl std::error::Error for SignatureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_decided_names_the_outcome() {
        let signer_id = SignerId::new();
        let err = SignatureError::AlreadyDecided {
            signer_id,
            status: SignerStatus::Signed,
        };
        assert_eq!(err.to_string(), format!("signer {signer_id} has already signed"));
    }
}
