//! Custom field definitions and value validation.

use crate::error::CustomFieldError;
use crate::layout::GridRect;
use pharma_lims_core::{FieldId, is_valid_email};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The input kind of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Phone,
    Url,
    Date,
    Time,
    Datetime,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    Toggle,
    File,
    Signature,
    Barcode,
    RichText,
}

impl FieldType {
    /// Palette order.
    pub const ALL: [Self; 18] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Email,
        Self::Phone,
        Self::Url,
        Self::Date,
        Self::Time,
        Self::Datetime,
        Self::Select,
        Self::Multiselect,
        Self::Radio,
        Self::Checkbox,
        Self::Toggle,
        Self::File,
        Self::Signature,
        Self::Barcode,
        Self::RichText,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Toggle => "toggle",
            Self::File => "file",
            Self::Signature => "signature",
            Self::Barcode => "barcode",
            Self::RichText => "rich_text",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Textarea => "Text Area",
            Self::Number => "Number",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Url => "URL",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Datetime => "Date & Time",
            Self::Select => "Dropdown",
            Self::Multiselect => "Multi-Select",
            Self::Radio => "Radio Buttons",
            Self::Checkbox => "Checkbox",
            Self::Toggle => "Toggle",
            Self::File => "File Upload",
            Self::Signature => "Signature",
            Self::Barcode => "Barcode",
            Self::RichText => "Rich Text",
        }
    }

    /// Kinds whose values come from the options list.
    #[must_use]
    pub const fn uses_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Radio)
    }

    /// Kinds where length bounds and patterns apply.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Textarea
                | Self::Email
                | Self::Phone
                | Self::Url
                | Self::Barcode
                | Self::RichText
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FieldType {
    type Err = CustomFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CustomFieldError::UnknownValue {
                kind: "field type",
                value: s.to_string(),
            })
    }
}

/// Optional bounds on a field's value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldValidation {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

impl FieldValidation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: FieldId,
    pub label: String,
    /// Machine name, unique within a page.
    pub key: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: FieldValidation,
    pub rect: GridRect,
}

impl CustomField {
    #[must_use]
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        let label = label.into();
        Self {
            id: FieldId::new(),
            key: key_from_label(&label),
            label,
            field_type,
            required: false,
            placeholder: String::new(),
            help_text: String::new(),
            options: Vec::new(),
            validation: FieldValidation::default(),
            rect: GridRect::default(),
        }
    }

    /// Checks an entered value against the field's type and bounds.
    ///
    /// Returns the message to show under the input on failure.
    pub fn check_value(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            if self.required {
                return Err(format!("{} is required", self.label));
            }
            return Ok(());
        }

        match self.field_type {
            FieldType::Number => {
                let number: f64 = value
                    .parse()
                    .map_err(|_| format!("{} must be a number", self.label))?;
                if let Some(min) = self.validation.min.filter(|min| number < *min) {
                    return Err(format!("{} must be at least {min}", self.label));
                }
                if let Some(max) = self.validation.max.filter(|max| number > *max) {
                    return Err(format!("{} must be at most {max}", self.label));
                }
            }
            FieldType::Email if !is_valid_email(value) => {
                return Err("Please enter a valid email address".to_string());
            }
            FieldType::Select | FieldType::Radio if !self.options.iter().any(|o| o == value) => {
                return Err(format!("Choose one of the listed {} options", self.label));
            }
            FieldType::Multiselect => {
                if let Some(unknown) = value
                    .split(',')
                    .map(str::trim)
                    .find(|choice| !self.options.iter().any(|o| o == choice))
                {
                    return Err(format!("'{unknown}' is not a {} option", self.label));
                }
            }
            _ => {}
        }

        if self.field_type.is_textual() {
            let length = value.chars().count();
            if let Some(min) = self.validation.min_length.filter(|min| length < *min) {
                return Err(format!("{} must be at least {min} characters", self.label));
            }
            if let Some(max) = self.validation.max_length.filter(|max| length > *max) {
                return Err(format!("{} must be at most {max} characters", self.label));
            }
            if let Some(pattern) = &self.validation.pattern {
                // Drafts reject bad patterns; one that got through is skipped.
                match Regex::new(pattern) {
                    Ok(re) if !re.is_match(value) => {
                        return Err(format!("{} has an invalid format", self.label));
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(field_id = %self.id, error = %err, "Ignoring invalid field pattern");
                    }
                }
            }
        }
        Ok(())
    }
}

/// Derives a snake_case key from a display label.
#[must_use]
pub fn key_from_label(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            key.push(ch.to_ascii_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    while key.ends_with('_') {
        key.pop();
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_label_slugifies() {
        assert_eq!(key_from_label("Batch Number"), "batch_number");
        assert_eq!(key_from_label("  pH (at 25°C) "), "ph_at_25_c");
        assert_eq!(key_from_label("---"), "");
    }

    #[test]
    fn field_types_cover_palette() {
        assert_eq!(FieldType::ALL.len(), 18);
        assert_eq!("rich_text".parse::<FieldType>().ok(), Some(FieldType::RichText));
        assert!(FieldType::Multiselect.uses_options());
        assert!(!FieldType::Checkbox.uses_options());
    }

    #[test]
    fn required_field_rejects_blank() {
        let mut field = CustomField::new("Lot Number", FieldType::Text);
        assert!(field.check_value("  ").is_ok());

        field.required = true;
        assert_eq!(field.check_value(" "), Err("Lot Number is required".to_string()));
    }

    #[test]
    fn number_bounds_apply() {
        let mut field = CustomField::new("pH", FieldType::Number);
        field.validation.min = Some(0.0);
        field.validation.max = Some(14.0);

        assert!(field.check_value("7.2").is_ok());
        assert_eq!(field.check_value("15"), Err("pH must be at most 14".to_string()));
        assert_eq!(field.check_value("acidic"), Err("pH must be a number".to_string()));
    }

    #[test]
    fn text_length_and_pattern_apply() {
        let mut field = CustomField::new("Sample Code", FieldType::Text);
        field.validation.min_length = Some(4);
        field.validation.pattern = Some(r"^S-\d+$".to_string());

        assert!(field.check_value("S-1042").is_ok());
        assert!(field.check_value("S-1").is_err());
        assert_eq!(
            field.check_value("X-1042"),
            Err("Sample Code has an invalid format".to_string())
        );
    }

    #[test]
    fn select_values_must_be_listed() {
        let mut field = CustomField::new("Storage", FieldType::Select);
        field.options = vec!["Ambient".to_string(), "2-8°C".to_string()];
        assert!(field.check_value("Ambient").is_ok());
        assert!(field.check_value("Frozen").is_err());

        let mut multi = CustomField::new("Hazards", FieldType::Multiselect);
        multi.options = vec!["Flammable".to_string(), "Toxic".to_string()];
        assert!(multi.check_value("Flammable, Toxic").is_ok());
        assert_eq!(
            multi.check_value("Toxic, Radioactive"),
            Err("'Radioactive' is not a Hazards option".to_string())
        );
    }
}
