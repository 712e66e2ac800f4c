//! Page components for the application.
//!
//! Each page is a Leptos component that renders a specific route,
//! along with any server functions specific to that page.

pub mod custom_fields;
pub mod home;
pub mod notifications;
pub mod signatures;
pub mod users;
pub mod workflow_editor;
pub mod workflows;

mod form;

// Re-export all page components for convenient access
pub use custom_fields::CustomFieldsPage;
pub use home::HomePage;
pub use notifications::NotificationsPage;
pub use signatures::SignaturesPage;
pub use users::UsersPage;
pub use workflow_editor::WorkflowEditorPage;
pub use workflows::WorkflowsPage;
