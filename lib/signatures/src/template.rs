//! Signature templates.

use crate::error::SignatureError;
use chrono::NaiveDate;
use pharma_lims_core::{FieldErrors, SignatureTemplateId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The intent a signer attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMeaning {
    Authorship,
    Review,
    Approval,
    Verification,
}

impl SignatureMeaning {
    pub const ALL: [Self; 4] = [
        Self::Authorship,
        Self::Review,
        Self::Approval,
        Self::Verification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authorship => "Authorship",
            Self::Review => "Review",
            Self::Approval => "Approval",
            Self::Verification => "Verification",
        }
    }

    /// The attestation shown next to the signature.
    #[must_use]
    pub const fn statement(self) -> &'static str {
        match self {
            Self::Authorship => "I am the author of this document",
            Self::Review => "I have reviewed this document",
            Self::Approval => "I approve this document",
            Self::Verification => "I have verified the contents of this document",
        }
    }
}

impl fmt::Display for SignatureMeaning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMeaning {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|meaning| meaning.as_str() == s)
            .ok_or_else(|| SignatureError::UnknownValue {
                kind: "signature meaning",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemplateStatus {
    #[default]
    Active,
    Inactive,
}

impl TemplateStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable signing route: meaning plus the roles that sign, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTemplate {
    pub id: SignatureTemplateId,
    pub name: String,
    pub description: String,
    pub meaning: SignatureMeaning,
    pub signer_roles: Vec<String>,
    pub status: TemplateStatus,
    pub created_by: String,
    pub created_date: NaiveDate,
}

impl SignatureTemplate {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        meaning: SignatureMeaning,
        signer_roles: Vec<String>,
        created_by: impl Into<String>,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            id: SignatureTemplateId::new(),
            name: name.into(),
            description: String::new(),
            meaning,
            signer_roles,
            status: TemplateStatus::Active,
            created_by: created_by.into(),
            created_date,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TemplateStatus::Active
    }

    pub fn toggle_status(&mut self) -> TemplateStatus {
        self.status = match self.status {
            TemplateStatus::Active => TemplateStatus::Inactive,
            TemplateStatus::Inactive => TemplateStatus::Active,
        };
        self.status
    }
}

/// Form state for a signature template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureTemplateDraft {
    pub name: String,
    pub description: String,
    pub meaning: Option<SignatureMeaning>,
    pub signer_roles: Vec<String>,
    pub status: TemplateStatus,
}

impl SignatureTemplateDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_template(template: &SignatureTemplate) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            meaning: Some(template.meaning),
            signer_roles: template.signer_roles.clone(),
            status: template.status,
        }
    }

    /// Appends a signer role unless it is blank or already listed.
    pub fn add_signer_role(&mut self, role: &str) -> bool {
        let role = role.trim();
        if role.is_empty() || self.signer_roles.iter().any(|r| r == role) {
            return false;
        }
        self.signer_roles.push(role.to_string());
        true
    }

    pub fn remove_signer_role(&mut self, index: usize) {
        if index < self.signer_roles.len() {
            self.signer_roles.remove(index);
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Template name is required");
        if self.meaning.is_none() {
            errors.insert("meaning", "Signature meaning is required");
        }
        if self.signer_roles.iter().all(|role| role.trim().is_empty()) {
            errors.insert("signer_roles", "At least one signer role is required");
        }
        errors
    }

    pub fn into_template(
        self,
        created_by: &str,
        created_date: NaiveDate,
    ) -> Result<SignatureTemplate, FieldErrors> {
        let meaning = self.checked_meaning()?;
        let mut template = SignatureTemplate::new(
            self.name.trim(),
            meaning,
            clean_roles(self.signer_roles),
            created_by,
            created_date,
        );
        template.description = self.description.trim().to_string();
        template.status = self.status;
        Ok(template)
    }

    pub fn apply_to(self, template: &mut SignatureTemplate) -> Result<(), FieldErrors> {
        let meaning = self.checked_meaning()?;
        template.name = self.name.trim().to_string();
        template.description = self.description.trim().to_string();
        template.meaning = meaning;
        template.signer_roles = clean_roles(self.signer_roles);
        template.status = self.status;
        Ok(())
    }

    fn checked_meaning(&self) -> Result<SignatureMeaning, FieldErrors> {
        let errors = self.validate();
        match self.meaning {
            Some(meaning) if errors.is_empty() => Ok(meaning),
            _ => Err(errors),
        }
    }
}

fn clean_roles(roles: Vec<String>) -> Vec<String> {
    roles
        .into_iter()
        .map(|role| role.trim().to_string())
        .filter(|role| !role.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 20).expect("valid date")
    }

    #[test]
    fn empty_draft_flags_all_required_fields() {
        let errors = SignatureTemplateDraft::new().validate();
        assert!(errors.has("name"));
        assert!(errors.has("meaning"));
        assert_eq!(errors.get("signer_roles"), Some("At least one signer role is required"));
    }

    #[test]
    fn add_signer_role_skips_blanks_and_duplicates() {
        let mut draft = SignatureTemplateDraft::new();
        assert!(draft.add_signer_role("QA Manager"));
        assert!(!draft.add_signer_role(" QA Manager "));
        assert!(!draft.add_signer_role("   "));
        assert!(draft.add_signer_role("Lab Manager"));

        draft.remove_signer_role(0);
        draft.remove_signer_role(9);
        assert_eq!(draft.signer_roles, vec!["Lab Manager".to_string()]);
    }

    #[test]
    fn draft_builds_active_template() {
        let draft = SignatureTemplateDraft {
            name: "Batch Record Approval".to_string(),
            meaning: Some(SignatureMeaning::Approval),
            signer_roles: vec!["Lab Manager".to_string(), " ".to_string(), "QA Manager".to_string()],
            ..SignatureTemplateDraft::default()
        };

        let template = draft.into_template("admin", created()).expect("valid");
        assert!(template.is_active());
        assert_eq!(template.signer_roles, vec!["Lab Manager", "QA Manager"]);
        assert!(template.id.to_string().starts_with("sigt_"));
    }

    #[test]
    fn toggle_status_flips() {
        let mut template = SignatureTemplate::new(
            "SOP Review",
            SignatureMeaning::Review,
            vec!["QA Manager".to_string()],
            "admin",
            created(),
        );
        assert_eq!(template.toggle_status(), TemplateStatus::Inactive);
        assert!(!template.is_active());
    }

    #[test]
    fn meaning_parses_from_label() {
        assert_eq!("Verification".parse::<SignatureMeaning>().ok(), Some(SignatureMeaning::Verification));
        assert!("Witness".parse::<SignatureMeaning>().is_err());
    }
}
