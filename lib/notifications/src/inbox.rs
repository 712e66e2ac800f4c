//! Delivered notifications and the inbox that holds them.

use crate::error::NotificationError;
use crate::kind::{NotificationKind, Priority};
use crate::template::NotificationTemplate;
use chrono::{DateTime, Utc};
use pharma_lims_core::{NotificationId, NotificationTemplateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub template_id: Option<NotificationTemplateId>,
}

impl Notification {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            title: title.into(),
            message: message.into(),
            kind,
            priority,
            read: false,
            created_at,
            template_id: None,
        }
    }

    /// Renders an active template into an unread notification.
    pub fn from_template(
        template: &NotificationTemplate,
        values: &BTreeMap<String, String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NotificationError> {
        if !template.active {
            tracing::debug!(template_id = %template.id, "Skipped render of inactive template");
            return Err(NotificationError::TemplateInactive {
                template_id: template.id,
            });
        }
        let rendered = template.render(values);
        let mut notification = Self::new(
            rendered.subject,
            rendered.body,
            template.kind,
            template.priority,
            created_at,
        );
        notification.template_id = Some(template.id);
        Ok(notification)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

/// Which notifications the inbox list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub read: ReadFilter,
    pub kind: Option<NotificationKind>,
    pub priority: Option<Priority>,
}

impl NotificationFilter {
    #[must_use]
    pub fn matches(&self, notification: &Notification) -> bool {
        let read_ok = match self.read {
            ReadFilter::All => true,
            ReadFilter::Unread => !notification.read,
            ReadFilter::Read => notification.read,
        };
        read_ok
            && self.kind.is_none_or(|kind| notification.kind == kind)
            && self
                .priority
                .is_none_or(|priority| notification.priority == priority)
    }
}

/// Notifications ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inbox {
    notifications: Vec<Notification>,
}

impl Inbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notification, keeping newest-first order.
    pub fn push(&mut self, notification: Notification) {
        let at = self
            .notifications
            .iter()
            .position(|n| n.created_at <= notification.created_at)
            .unwrap_or(self.notifications.len());
        self.notifications.insert(at, notification);
    }

    #[must_use]
    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    #[must_use]
    pub fn filtered(&self, filter: &NotificationFilter) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| filter.matches(n))
            .collect()
    }

    pub fn mark_read(&mut self, id: NotificationId) -> Result<(), NotificationError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(NotificationError::NotificationNotFound {
                notification_id: id,
            })?;
        if !notification.read {
            notification.read = true;
            tracing::debug!(notification_id = %id, "Marked notification read");
        }
        Ok(())
    }

    /// Marks everything read and returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        tracing::debug!(changed, "Marked all notifications read");
        changed
    }

    pub fn remove(&mut self, id: NotificationId) -> Result<Notification, NotificationError> {
        let pos = self
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(NotificationError::NotificationNotFound {
                notification_id: id,
            })?;
        let removed = self.notifications.remove(pos);
        tracing::debug!(notification_id = %id, unread = !removed.read, "Removed notification");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn inbox() -> Inbox {
        let now = Utc::now();
        let mut inbox = Inbox::new();
        inbox.push(Notification::new(
            "Calibration due",
            "HPLC-02 calibration due tomorrow",
            NotificationKind::Warning,
            Priority::High,
            now - Duration::hours(2),
        ));
        inbox.push(Notification::new(
            "Batch released",
            "Batch 24-118 released",
            NotificationKind::Success,
            Priority::Low,
            now,
        ));
        inbox.push(Notification::new(
            "OOS result",
            "Assay out of specification",
            NotificationKind::Error,
            Priority::Critical,
            now - Duration::hours(1),
        ));
        inbox
    }

    #[test]
    fn push_keeps_newest_first() {
        let binding = inbox();
        let titles: Vec<&str> = binding.all().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Batch released", "OOS result", "Calibration due"]);
    }

    #[test]
    fn mark_read_and_mark_all_read() {
        let mut inbox = inbox();
        assert_eq!(inbox.unread_count(), 3);

        let first = inbox.all()[0].id;
        inbox.mark_read(first).expect("present");
        assert_eq!(inbox.unread_count(), 2);

        assert_eq!(inbox.mark_all_read(), 2);
        assert_eq!(inbox.unread_count(), 0);
        assert_eq!(inbox.mark_all_read(), 0);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut inbox = inbox();
        let missing = NotificationId::new();
        assert_eq!(
            inbox.mark_read(missing),
            Err(NotificationError::NotificationNotFound {
                notification_id: missing
            })
        );
        assert!(inbox.remove(missing).is_err());
    }

    #[test]
    fn filter_combines_read_state_and_kind() {
        let mut inbox = inbox();
        let oos = inbox.all()[1].id;
        inbox.mark_read(oos).expect("present");

        let unread = NotificationFilter {
            read: ReadFilter::Unread,
            ..NotificationFilter::default()
        };
        assert_eq!(inbox.filtered(&unread).len(), 2);

        let read_errors = NotificationFilter {
            read: ReadFilter::Read,
            kind: Some(NotificationKind::Error),
            priority: None,
        };
        let shown = inbox.filtered(&read_errors);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "OOS result");
    }

    #[test]
    fn read_operations_only_count_real_changes() {
        let mut inbox = inbox();
        let first = inbox.all()[0].id;

        inbox.mark_read(first).expect("present");
        inbox.mark_read(first).expect("marking twice is fine");
        let unread_before = inbox.unread_count();
        assert_eq!(inbox.mark_all_read(), unread_before);
        assert_eq!(inbox.mark_all_read(), 0);

        let removed = inbox.remove(first).expect("present");
        assert!(removed.read);
        assert!(inbox.remove(first).is_err());
    }

    #[test]
    fn from_template_renders_and_links_template() {
        let mut template = NotificationTemplate::new(
            "Sample Received",
            "Sample {{id}} received",
            "Logged by {{user}}",
        );
        let values: BTreeMap<String, String> = [("id", "S-7"), ("user", "Lee Park")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let notification = Notification::from_template(&template, &values, Utc::now()).expect("active");
        assert_eq!(notification.title, "Sample S-7 received");
        assert_eq!(notification.template_id, Some(template.id));
        assert!(!notification.read);

        template.toggle_active();
        assert!(Notification::from_template(&template, &values, Utc::now()).is_err());
    }
}
