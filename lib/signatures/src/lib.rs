//! Electronic signatures for the Pharma LIMS console.
//!
//! Templates describe who must sign and with what meaning; documents carry
//! the actual signer rows. A document's status is always derived from its
//! signers and never stored.

pub mod document;
pub mod error;
pub mod template;

pub use document::{
    DocumentDraft, DocumentSigner, DocumentStatus, SignatureDocument, SignerDraft, SignerStatus,
};
pub use error::SignatureError;
pub use template::{SignatureMeaning, SignatureTemplate, SignatureTemplateDraft, TemplateStatus};
