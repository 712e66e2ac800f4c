//! Notifications for the Pharma LIMS console.
//!
//! This crate provides:
//! - `NotificationTemplate` with `{{placeholder}}` rendering and its form draft
//! - `Notification`, a delivered in-app message
//! - `Inbox`, the read/unread bookkeeping and filtering behind the bell menu

pub mod error;
pub mod inbox;
pub mod kind;
pub mod template;

pub use error::NotificationError;
pub use inbox::{Inbox, Notification, NotificationFilter, ReadFilter};
pub use kind::{Channel, NotificationKind, Priority};
pub use template::{NotificationTemplate, NotificationTemplateDraft, RenderedMessage};
