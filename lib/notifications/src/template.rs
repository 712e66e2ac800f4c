//! Notification templates.
//!
//! Subjects and bodies may contain `{{name}}` placeholders. Rendering
//! substitutes known names and leaves unknown ones in place so a missing
//! value is visible in the output.

use crate::kind::{Channel, NotificationKind, Priority};
use pharma_lims_core::{FieldErrors, NotificationTemplateId};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex")
});

/// A subject and body after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub id: NotificationTemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub channels: Vec<Channel>,
    /// Event names that fire this template, e.g. "sample_overdue".
    pub triggers: Vec<String>,
    pub recipient_groups: Vec<String>,
    pub active: bool,
}

impl NotificationTemplate {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationTemplateId::new(),
            name: name.into(),
            subject: subject.into(),
            body: body.into(),
            kind: NotificationKind::Info,
            priority: Priority::Medium,
            channels: vec![Channel::InApp],
            triggers: Vec::new(),
            recipient_groups: Vec::new(),
            active: true,
        }
    }

    /// Distinct placeholder names in subject then body, first occurrence first.
    #[must_use]
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for text in [&self.subject, &self.body] {
            for caps in PLACEHOLDER_RE.captures_iter(text) {
                let name = &caps[1];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    #[must_use]
    pub fn render(&self, values: &BTreeMap<String, String>) -> RenderedMessage {
        RenderedMessage {
            subject: render_text(&self.subject, values),
            body: render_text(&self.body, values),
        }
    }

    /// Renders with every placeholder filled by `[name]`, for the preview pane.
    #[must_use]
    pub fn preview(&self) -> RenderedMessage {
        let values = self
            .placeholders()
            .into_iter()
            .map(|name| {
                let shown = format!("[{name}]");
                (name, shown)
            })
            .collect();
        self.render(&values)
    }

    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }
}

/// Substitutes `{{name}}` tokens from `values`.
#[must_use]
pub fn render_text(text: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Form state for a notification template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplateDraft {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub channels: Vec<Channel>,
    pub triggers: Vec<String>,
    pub recipient_groups: Vec<String>,
    pub active: bool,
}

impl Default for NotificationTemplateDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            subject: String::new(),
            body: String::new(),
            kind: NotificationKind::Info,
            priority: Priority::Medium,
            channels: vec![Channel::InApp],
            triggers: Vec::new(),
            recipient_groups: Vec::new(),
            active: true,
        }
    }
}

impl NotificationTemplateDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_template(template: &NotificationTemplate) -> Self {
        Self {
            name: template.name.clone(),
            subject: template.subject.clone(),
            body: template.body.clone(),
            kind: template.kind,
            priority: template.priority,
            channels: template.channels.clone(),
            triggers: template.triggers.clone(),
            recipient_groups: template.recipient_groups.clone(),
            active: template.active,
        }
    }

    pub fn toggle_channel(&mut self, channel: Channel) {
        if let Some(pos) = self.channels.iter().position(|c| *c == channel) {
            self.channels.remove(pos);
        } else {
            self.channels.push(channel);
            self.channels.sort();
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Template name is required");
        errors.require("subject", &self.subject, "Subject is required");
        errors.require("body", &self.body, "Message body is required");
        if self.channels.is_empty() {
            errors.insert("channels", "Select at least one delivery channel");
        }
        errors
    }

    pub fn into_template(self) -> Result<NotificationTemplate, FieldErrors> {
        self.validate().into_result()?;
        let mut template = NotificationTemplate::new(
            self.name.trim(),
            self.subject.trim(),
            self.body.trim(),
        );
        self.fill(&mut template);
        Ok(template)
    }

    pub fn apply_to(self, template: &mut NotificationTemplate) -> Result<(), FieldErrors> {
        self.validate().into_result()?;
        template.name = self.name.trim().to_string();
        template.subject = self.subject.trim().to_string();
        template.body = self.body.trim().to_string();
        self.fill(template);
        Ok(())
    }

    fn fill(self, template: &mut NotificationTemplate) {
        template.kind = self.kind;
        template.priority = self.priority;
        template.channels = self.channels;
        template.triggers = clean_list(self.triggers);
        template.recipient_groups = clean_list(self.recipient_groups);
        template.active = self.active;
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overdue_template() -> NotificationTemplate {
        NotificationTemplate::new(
            "Sample Overdue",
            "Sample {{sample_id}} is overdue",
            "Sample {{ sample_id }} assigned to {{analyst}} passed its due date {{due_date}}.",
        )
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn placeholders_are_distinct_and_ordered() {
        assert_eq!(
            overdue_template().placeholders(),
            vec!["sample_id", "analyst", "due_date"]
        );
    }

    #[test]
    fn render_substitutes_known_values() {
        let rendered = overdue_template().render(&values(&[
            ("sample_id", "S-2024-0042"),
            ("analyst", "Ana Ruiz"),
            ("due_date", "2024-05-01"),
        ]));

        assert_eq!(rendered.subject, "Sample S-2024-0042 is overdue");
        assert_eq!(
            rendered.body,
            "Sample S-2024-0042 assigned to Ana Ruiz passed its due date 2024-05-01."
        );
    }

    #[test]
    fn unknown_placeholders_stay_visible() {
        let rendered = overdue_template().render(&values(&[("sample_id", "S-1")]));
        assert!(rendered.body.contains("{{analyst}}"));
    }

    #[test]
    fn preview_brackets_every_placeholder() {
        let preview = overdue_template().preview();
        assert_eq!(preview.subject, "Sample [sample_id] is overdue");
    }

    #[test]
    fn draft_requires_core_fields_and_a_channel() {
        let mut draft = NotificationTemplateDraft::new();
        draft.toggle_channel(Channel::InApp);

        let errors = draft.validate();
        assert!(errors.has("name"));
        assert!(errors.has("subject"));
        assert!(errors.has("body"));
        assert_eq!(errors.get("channels"), Some("Select at least one delivery channel"));
    }

    #[test]
    fn draft_builds_template_with_clean_lists() {
        let mut draft = NotificationTemplateDraft::new();
        draft.name = "OOS Result".to_string();
        draft.subject = "OOS result for {{test}}".to_string();
        draft.body = "Investigate {{test}}".to_string();
        draft.priority = Priority::Critical;
        draft.toggle_channel(Channel::Email);
        draft.recipient_groups = vec!["QA Team".to_string(), "  ".to_string()];

        let template = draft.into_template().expect("valid");
        assert_eq!(template.channels, vec![Channel::Email, Channel::InApp]);
        assert_eq!(template.recipient_groups, vec!["QA Team"]);
        assert!(template.active);
    }
}
