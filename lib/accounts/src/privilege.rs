//! The privilege catalog.
//!
//! Users store privilege ids only; names and categories come from here.

use crate::role::Role;

/// A grantable privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privilege {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

/// Every privilege the console can grant, grouped by category.
pub const PRIVILEGES: &[Privilege] = &[
    Privilege { id: "sample_view", name: "View Samples", category: "Samples" },
    Privilege { id: "sample_create", name: "Register Samples", category: "Samples" },
    Privilege { id: "sample_dispose", name: "Dispose Samples", category: "Samples" },
    Privilege { id: "result_enter", name: "Enter Results", category: "Testing" },
    Privilege { id: "result_review", name: "Review Results", category: "Testing" },
    Privilege { id: "result_approve", name: "Approve Results", category: "Testing" },
    Privilege { id: "document_sign", name: "Sign Documents", category: "Documents" },
    Privilege { id: "document_manage", name: "Manage Documents", category: "Documents" },
    Privilege { id: "workflow_manage", name: "Manage Workflows", category: "Administration" },
    Privilege { id: "user_manage", name: "Manage Users", category: "Administration" },
    Privilege { id: "system_configure", name: "Configure System", category: "Administration" },
    Privilege { id: "report_view", name: "View Reports", category: "Reporting" },
    Privilege { id: "data_export", name: "Export Data", category: "Reporting" },
    Privilege { id: "audit_view", name: "View Audit Trail", category: "Compliance" },
];

/// Looks up a privilege by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Privilege> {
    PRIVILEGES.iter().find(|p| p.id == id)
}

/// Display name for a privilege id, falling back to the id itself.
#[must_use]
pub fn display_name(id: &str) -> &str {
    find(id).map_or(id, |p| p.name)
}

/// Privileges pre-selected in the form when a role is chosen.
#[must_use]
pub fn defaults_for(role: Role) -> Vec<String> {
    let ids: &[&str] = match role {
        Role::Administrator => return PRIVILEGES.iter().map(|p| p.id.to_string()).collect(),
        Role::LabManager => &[
            "sample_view",
            "sample_create",
            "result_review",
            "result_approve",
            "document_sign",
            "report_view",
        ],
        Role::QaManager => &[
            "result_review",
            "result_approve",
            "document_sign",
            "document_manage",
            "audit_view",
            "report_view",
        ],
        Role::QcAnalyst | Role::LabTechnician => &["sample_view", "sample_create", "result_enter"],
        Role::Researcher => &["sample_view", "result_enter", "report_view"],
        Role::Auditor => &["audit_view", "report_view", "data_export"],
        Role::Viewer => &["sample_view"],
    };
    ids.iter().map(|id| (*id).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn privilege_ids_are_unique() {
        let ids: HashSet<_> = PRIVILEGES.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PRIVILEGES.len());
    }

    #[test]
    fn role_defaults_reference_known_privileges() {
        for role in Role::ALL {
            for id in defaults_for(role) {
                assert!(find(&id).is_some(), "{role} default '{id}' is unknown");
            }
        }
    }

    #[test]
    fn unknown_ids_display_verbatim() {
        assert_eq!(display_name("legacy_flag"), "legacy_flag");
        assert_eq!(display_name("data_export"), "Export Data");
    }
}
