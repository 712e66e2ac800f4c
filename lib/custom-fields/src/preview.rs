//! What the builder's preview pane renders for a field.

use crate::field::{CustomField, FieldType};
use serde::{Deserialize, Serialize};

/// The control drawn for a field in preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum PreviewControl {
    /// A single-line `<input>` of the given HTML type.
    Input { input_type: String, placeholder: String },
    TextArea { placeholder: String, rich: bool },
    /// A `<select>`; the first rendered option is always the placeholder.
    Select { placeholder: String, options: Vec<String>, multiple: bool },
    RadioGroup { options: Vec<String> },
    Checkbox,
    Toggle,
    FileUpload,
    SignaturePad,
    /// A text input with a scan button.
    Barcode { placeholder: String },
}

impl PreviewControl {
    /// Option labels in render order for select controls, placeholder first.
    #[must_use]
    pub fn rendered_options(&self) -> Vec<&str> {
        match self {
            Self::Select {
                placeholder,
                options,
                ..
            } => std::iter::once(placeholder.as_str())
                .chain(options.iter().map(String::as_str))
                .collect(),
            Self::RadioGroup { options } => options.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPreview {
    pub label: String,
    pub required: bool,
    pub help_text: Option<String>,
    pub control: PreviewControl,
}

impl CustomField {
    #[must_use]
    pub fn preview(&self) -> FieldPreview {
        let placeholder = self.placeholder.clone();
        let input = |input_type: &str| PreviewControl::Input {
            input_type: input_type.to_string(),
            placeholder: placeholder.clone(),
        };
        let control = match self.field_type {
            FieldType::Text => input("text"),
            FieldType::Number => input("number"),
            FieldType::Email => input("email"),
            FieldType::Phone => input("tel"),
            FieldType::Url => input("url"),
            FieldType::Date => input("date"),
            FieldType::Time => input("time"),
            FieldType::Datetime => input("datetime-local"),
            FieldType::Textarea | FieldType::RichText => PreviewControl::TextArea {
                placeholder: placeholder.clone(),
                rich: self.field_type == FieldType::RichText,
            },
            FieldType::Select | FieldType::Multiselect => PreviewControl::Select {
                placeholder: format!("Select {}", self.label),
                options: self.options.clone(),
                multiple: self.field_type == FieldType::Multiselect,
            },
            FieldType::Radio => PreviewControl::RadioGroup {
                options: self.options.clone(),
            },
            FieldType::Checkbox => PreviewControl::Checkbox,
            FieldType::Toggle => PreviewControl::Toggle,
            FieldType::File => PreviewControl::FileUpload,
            FieldType::Signature => PreviewControl::SignaturePad,
            FieldType::Barcode => PreviewControl::Barcode {
                placeholder: placeholder.clone(),
            },
        };

        FieldPreview {
            label: self.label.clone(),
            required: self.required,
            help_text: Some(self.help_text.clone()).filter(|text| !text.trim().is_empty()),
            control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_without_options_shows_only_placeholder() {
        let field = CustomField::new("Container Type", FieldType::Select);
        let preview = field.preview();

        assert_eq!(preview.control.rendered_options(), vec!["Select Container Type"]);
    }

    #[test]
    fn select_lists_options_after_placeholder() {
        let mut field = CustomField::new("Storage", FieldType::Multiselect);
        field.options = vec!["Ambient".to_string(), "Frozen".to_string()];

        let preview = field.preview();
        assert_eq!(
            preview.control.rendered_options(),
            vec!["Select Storage", "Ambient", "Frozen"]
        );
        assert!(matches!(preview.control, PreviewControl::Select { multiple: true, .. }));
    }

    #[test]
    fn radio_without_options_renders_nothing() {
        let field = CustomField::new("Result", FieldType::Radio);
        assert!(field.preview().control.rendered_options().is_empty());
    }

    #[test]
    fn every_type_previews() {
        for field_type in FieldType::ALL {
            let preview = CustomField::new("Any", field_type).preview();
            assert_eq!(preview.label, "Any");
            assert!(preview.help_text.is_none());
        }
    }

    #[test]
    fn phone_uses_tel_input() {
        let mut field = CustomField::new("Contact", FieldType::Phone);
        field.placeholder = "+1 555 0100".to_string();
        assert_eq!(
            field.preview().control,
            PreviewControl::Input {
                input_type: "tel".to_string(),
                placeholder: "+1 555 0100".to_string()
            }
        );
    }

    #[test]
    fn control_serializes_with_a_tag() {
        let json = serde_json::to_value(PreviewControl::Barcode {
            placeholder: "Scan lot".to_string(),
        })
        .unwrap();
        assert_eq!(json["control"], "barcode");
        assert_eq!(json["placeholder"], "Scan lot");
    }
}
