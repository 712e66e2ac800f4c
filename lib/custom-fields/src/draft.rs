//! Builder form models for fields and pages.

use crate::field::{CustomField, FieldType, FieldValidation, key_from_label};
use crate::layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, GridRect};
use crate::page::{LIMS_MODULES, ModulePage};
use chrono::{DateTime, Utc};
use pharma_lims_core::FieldErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Form state for adding or editing a custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDraft {
    pub label: String,
    /// Left blank to derive from the label.
    pub key: String,
    pub field_type: Option<FieldType>,
    pub required: bool,
    pub placeholder: String,
    pub help_text: String,
    pub options: Vec<String>,
    pub validation: FieldValidation,
    pub width: u32,
    pub height: u32,
}

impl Default for FieldDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            key: String::new(),
            field_type: None,
            required: false,
            placeholder: String::new(),
            help_text: String::new(),
            options: Vec::new(),
            validation: FieldValidation::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl FieldDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_field(field: &CustomField) -> Self {
        Self {
            label: field.label.clone(),
            key: field.key.clone(),
            field_type: Some(field.field_type),
            required: field.required,
            placeholder: field.placeholder.clone(),
            help_text: field.help_text.clone(),
            options: field.options.clone(),
            validation: field.validation.clone(),
            width: field.rect.width,
            height: field.rect.height,
        }
    }

    /// The key the field will be saved under.
    #[must_use]
    pub fn effective_key(&self) -> String {
        let key = self.key.trim();
        if key.is_empty() {
            key_from_label(&self.label)
        } else {
            key.to_string()
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("label", &self.label, "Field label is required");
        if self.field_type.is_none() {
            errors.insert("field_type", "Field type is required");
        }

        let key = self.effective_key();
        if !self.label.trim().is_empty() && key.is_empty() {
            errors.insert("key", "Field key must contain a letter or digit");
        } else if key.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
            errors.insert("key", "Field key may only use letters, digits and underscores");
        }

        let bounds = &self.validation;
        if let (Some(min), Some(max)) = (bounds.min, bounds.max)
            && min > max
        {
            errors.insert("validation.max", "Maximum must not be less than minimum");
        }
        if let (Some(min), Some(max)) = (bounds.min_length, bounds.max_length)
            && min > max
        {
            errors.insert(
                "validation.max_length",
                "Maximum length must not be less than minimum length",
            );
        }
        if let Some(pattern) = bounds.pattern.as_deref().filter(|p| !p.is_empty())
            && Regex::new(pattern).is_err()
        {
            errors.insert("validation.pattern", "Pattern is not a valid regular expression");
        }
        errors
    }

    pub fn into_field(self) -> Result<CustomField, FieldErrors> {
        let errors = self.validate();
        let Some(field_type) = self.field_type.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };
        let mut field = CustomField::new(self.label.trim(), field_type);
        field.key = self.effective_key();
        field.required = self.required;
        field.placeholder = self.placeholder.trim().to_string();
        field.help_text = self.help_text.trim().to_string();
        field.options = self
            .options
            .into_iter()
            .map(|option| option.trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();
        field.validation = self.validation;
        if field.validation.pattern.as_deref() == Some("") {
            field.validation.pattern = None;
        }
        field.rect = GridRect {
            width: self.width,
            height: self.height,
            ..GridRect::default()
        }
        .snapped();
        Ok(field)
    }

    /// Builds the replacement for `existing`, keeping its id.
    pub fn into_update(self, existing: &CustomField) -> Result<CustomField, FieldErrors> {
        let mut field = self.into_field()?;
        field.id = existing.id;
        Ok(field)
    }
}

/// Form state for a module page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModulePageDraft {
    pub name: String,
    pub module: String,
    pub description: String,
}

impl ModulePageDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_page(page: &ModulePage) -> Self {
        Self {
            name: page.name.clone(),
            module: page.module.clone(),
            description: page.description.clone(),
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Page name is required");
        errors.require("module", &self.module, "Module is required");
        if !self.module.trim().is_empty() && !LIMS_MODULES.contains(&self.module.trim()) {
            errors.insert("module", "Choose a LIMS module");
        }
        errors
    }

    pub fn into_page(self, at: DateTime<Utc>) -> Result<ModulePage, FieldErrors> {
        self.validate().into_result()?;
        let mut page = ModulePage::new(self.name.trim(), self.module.trim(), at);
        page.description = self.description.trim().to_string();
        Ok(page)
    }

    pub fn apply_to(self, page: &mut ModulePage) -> Result<(), FieldErrors> {
        self.validate().into_result()?;
        page.name = self.name.trim().to_string();
        page.module = self.module.trim().to_string();
        page.description = self.description.trim().to_string();
        page.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_draft_needs_label_and_type() {
        let errors = FieldDraft::new().validate();
        assert_eq!(errors.get("label"), Some("Field label is required"));
        assert_eq!(errors.get("field_type"), Some("Field type is required"));
        assert!(!errors.has("key"));
    }

    #[test]
    fn key_defaults_from_label() {
        let draft = FieldDraft {
            label: "Storage Temperature".to_string(),
            field_type: Some(FieldType::Number),
            ..FieldDraft::default()
        };
        let field = draft.into_field().expect("valid");
        assert_eq!(field.key, "storage_temperature");
    }

    #[test]
    fn bad_key_and_bounds_are_flagged() {
        let draft = FieldDraft {
            label: "Assay".to_string(),
            key: "assay-%".to_string(),
            field_type: Some(FieldType::Number),
            validation: FieldValidation {
                min: Some(10.0),
                max: Some(1.0),
                pattern: Some("(".to_string()),
                ..FieldValidation::default()
            },
            ..FieldDraft::default()
        };
        let errors = draft.validate();
        assert!(errors.has("key"));
        assert!(errors.has("validation.max"));
        assert!(errors.has("validation.pattern"));
    }

    #[test]
    fn select_may_be_saved_without_options() {
        let draft = FieldDraft {
            label: "Container".to_string(),
            field_type: Some(FieldType::Select),
            options: vec!["  ".to_string()],
            ..FieldDraft::default()
        };
        let field = draft.into_field().expect("valid");
        assert!(field.options.is_empty());
    }

    #[test]
    fn size_is_snapped_on_build() {
        let draft = FieldDraft {
            label: "Notes".to_string(),
            field_type: Some(FieldType::Textarea),
            width: 333,
            height: 151,
            ..FieldDraft::default()
        };
        let field = draft.into_field().expect("valid");
        assert_eq!((field.rect.width, field.rect.height), (340, 160));
    }

    #[test]
    fn page_draft_requires_known_module() {
        let mut draft = ModulePageDraft::new();
        draft.name = "Stability Pull".to_string();
        draft.module = "Billing".to_string();
        assert_eq!(draft.validate().get("module"), Some("Choose a LIMS module"));

        draft.module = "Stability Studies".to_string();
        let page = draft.into_page(Utc::now()).expect("valid");
        assert_eq!(page.module, "Stability Studies");
        assert!(page.fields.is_empty());
    }
}
