//! Documents routed for electronic signature.
//!
//! Signers carry an `order`, but nothing stops a later signer from signing
//! while an earlier one is still pending.

use crate::error::SignatureError;
use crate::template::SignatureTemplate;
use chrono::{DateTime, NaiveDate, Utc};
use pharma_lims_core::{DocumentId, FieldErrors, SignatureTemplateId, SignerId, is_valid_email};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignerStatus {
    #[default]
    Pending,
    Signed,
    Rejected,
}

impl SignerStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Signed => "Signed",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for SignerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall state of a document, derived from its signers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    Pending,
    Completed,
    Rejected,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One person asked to sign a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSigner {
    pub id: SignerId,
    pub name: String,
    pub email: String,
    pub role: String,
    /// 1-based position in the signing route.
    pub order: u32,
    pub status: SignerStatus,
    pub decided_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

impl DocumentSigner {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id: SignerId::new(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
            order,
            status: SignerStatus::Pending,
            decided_at: None,
            comment: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == SignerStatus::Pending
    }
}

/// A document and its signing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDocument {
    pub id: DocumentId,
    pub title: String,
    pub template_id: SignatureTemplateId,
    pub description: String,
    pub created_by: String,
    pub created_date: NaiveDate,
    pub signers: Vec<DocumentSigner>,
}

impl SignatureDocument {
    /// Rejected if anyone rejected, Completed once everyone signed,
    /// otherwise Pending. A document with no signers stays Pending.
    #[must_use]
    pub fn status(&self) -> DocumentStatus {
        if self
            .signers
            .iter()
            .any(|signer| signer.status == SignerStatus::Rejected)
        {
            DocumentStatus::Rejected
        } else if !self.signers.is_empty()
            && self
                .signers
                .iter()
                .all(|signer| signer.status == SignerStatus::Signed)
        {
            DocumentStatus::Completed
        } else {
            DocumentStatus::Pending
        }
    }

    /// Count of signers who have signed, and the total.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let signed = self
            .signers
            .iter()
            .filter(|signer| signer.status == SignerStatus::Signed)
            .count();
        (signed, self.signers.len())
    }

    #[must_use]
    pub fn signer(&self, signer_id: SignerId) -> Option<&DocumentSigner> {
        self.signers.iter().find(|signer| signer.id == signer_id)
    }

    /// Records a signature and returns the document status afterwards.
    pub fn sign(
        &mut self,
        signer_id: SignerId,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<DocumentStatus, SignatureError> {
        self.decide(signer_id, SignerStatus::Signed, comment, at)
    }

    /// Records a rejection and returns the document status afterwards.
    pub fn reject(
        &mut self,
        signer_id: SignerId,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<DocumentStatus, SignatureError> {
        self.decide(signer_id, SignerStatus::Rejected, comment, at)
    }

    fn decide(
        &mut self,
        signer_id: SignerId,
        outcome: SignerStatus,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<DocumentStatus, SignatureError> {
        let signer = self
            .signers
            .iter_mut()
            .find(|signer| signer.id == signer_id)
            .ok_or(SignatureError::SignerNotFound { signer_id })?;
        if !signer.is_pending() {
            return Err(SignatureError::AlreadyDecided {
                signer_id,
                status: signer.status,
            });
        }

        signer.status = outcome;
        signer.decided_at = Some(at);
        signer.comment = comment.filter(|c| !c.trim().is_empty());

        let status = self.status();
        tracing::info!(
            document_id = %self.id,
            signer_id = %signer_id,
            outcome = %outcome,
            status = %status,
            "Signer decision recorded"
        );
        Ok(status)
    }
}

/// One signer row in the document form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignerDraft {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Form state for routing a new document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: String,
    pub template_id: Option<SignatureTemplateId>,
    pub description: String,
    pub signers: Vec<SignerDraft>,
}

impl DocumentDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a template and seeds one signer row per template role.
    pub fn choose_template(&mut self, template: &SignatureTemplate) {
        self.template_id = Some(template.id);
        self.signers = template
            .signer_roles
            .iter()
            .map(|role| SignerDraft {
                role: role.clone(),
                ..SignerDraft::default()
            })
            .collect();
    }

    /// The Create button stays disabled until a title and template are set.
    #[must_use]
    pub fn can_create(&self) -> bool {
        !self.title.trim().is_empty() && self.template_id.is_some()
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title, "Document title is required");
        if self.template_id.is_none() {
            errors.insert("template_id", "Please select a signature template");
        }
        for (i, signer) in self.signers.iter().enumerate() {
            if signer.name.trim().is_empty() {
                errors.insert(format!("signers.{i}.name"), "Signer name is required");
            }
            if !signer.email.trim().is_empty() && !is_valid_email(signer.email.trim()) {
                errors.insert(
                    format!("signers.{i}.email"),
                    "Please enter a valid email address",
                );
            }
        }
        errors
    }

    pub fn into_document(
        self,
        created_by: &str,
        created_date: NaiveDate,
    ) -> Result<SignatureDocument, FieldErrors> {
        let errors = self.validate();
        let Some(template_id) = self.template_id.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        let signers = self
            .signers
            .into_iter()
            .zip(1..)
            .map(|(signer, order)| {
                DocumentSigner::new(signer.name.trim(), signer.email.trim(), signer.role, order)
            })
            .collect();

        Ok(SignatureDocument {
            id: DocumentId::new(),
            title: self.title.trim().to_string(),
            template_id,
            description: self.description.trim().to_string(),
            created_by: created_by.to_string(),
            created_date,
            signers,
        })
    }
}
