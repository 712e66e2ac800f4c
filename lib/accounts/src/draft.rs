//! The add/edit user form model.

use crate::audit::AuditEntry;
use crate::privilege;
use crate::role::{AuthorizationLevel, Role, SignatureStatus, UserStatus};
use crate::user::User;
use chrono::NaiveDate;
use pharma_lims_core::FieldErrors;
use serde::{Deserialize, Serialize};

/// Form state for creating or editing a user.
///
/// Seeded from defaults in create mode or from an existing user in edit
/// mode; `validate` runs the required-field and email checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub status: UserStatus,
    pub digital_signature_status: SignatureStatus,
    pub privileges: Vec<String>,
    pub authorization_level: u8,
    pub signature_certificate: Option<String>,
}

impl UserDraft {
    /// Empty draft for create mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft seeded from an existing user for edit mode.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: Some(user.role),
            status: user.status,
            digital_signature_status: user.digital_signature_status,
            privileges: user.privileges.clone(),
            authorization_level: user.authorization_level.value(),
            signature_certificate: user.signature_certificate.clone(),
        }
    }

    /// Picks a role and applies its default privileges and level.
    pub fn choose_role(&mut self, role: Role) {
        self.role = Some(role);
        self.privileges = privilege::defaults_for(role);
        self.authorization_level = role.default_authorization_level().value();
    }

    /// Adds or removes one privilege id.
    pub fn toggle_privilege(&mut self, privilege_id: &str) {
        if let Some(pos) = self.privileges.iter().position(|p| p == privilege_id) {
            self.privileges.remove(pos);
        } else {
            self.privileges.push(privilege_id.to_string());
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required");
        errors.require_email("email", &self.email);
        if self.role.is_none() {
            errors.insert("role", "Role is required");
        }
        if AuthorizationLevel::new(self.authorization_level).is_err() {
            errors.insert("authorization_level", "Authorization level must be 0-3");
        }
        errors
    }

    /// Builds a new user from a valid draft.
    pub fn into_user(self, created_date: NaiveDate) -> Result<User, FieldErrors> {
        self.validate().into_result()?;
        let (role, level) = self.checked_role_and_level()?;

        let mut user = User::new(self.name.trim(), self.email.trim(), role, created_date);
        user.status = self.status;
        user.digital_signature_status = self.digital_signature_status;
        user.privileges = self.privileges;
        user.authorization_level = level;
        user.signature_certificate = self.signature_certificate;
        Ok(user)
    }

    /// Writes a valid draft over `user` and records an audit entry.
    pub fn apply_to(self, user: &mut User, performed_by: &str) -> Result<(), FieldErrors> {
        self.validate().into_result()?;
        let (role, level) = self.checked_role_and_level()?;

        let mut changes = Vec::new();
        if user.role != role {
            changes.push(format!("role {} -> {}", user.role, role));
        }
        if user.authorization_level != level {
            changes.push(format!(
                "authorization level {} -> {}",
                user.authorization_level, level
            ));
        }
        if user.privileges != self.privileges {
            changes.push("privileges updated".to_string());
        }

        user.name = self.name.trim().to_string();
        user.email = self.email.trim().to_string();
        user.role = role;
        user.status = self.status;
        user.digital_signature_status = self.digital_signature_status;
        user.privileges = self.privileges;
        user.authorization_level = level;
        user.signature_certificate = self.signature_certificate;

        let details = if changes.is_empty() {
            "Profile details updated".to_string()
        } else {
            changes.join(", ")
        };
        user.record(AuditEntry::now("User updated", performed_by, details));
        Ok(())
    }

    fn checked_role_and_level(&self) -> Result<(Role, AuthorizationLevel), FieldErrors> {
        let mut errors = FieldErrors::new();
        let role = self.role;
        let level = AuthorizationLevel::new(self.authorization_level).ok();
        if role.is_none() {
            errors.insert("role", "Role is required");
        }
        if level.is_none() {
            errors.insert("authorization_level", "Authorization level must be 0-3");
        }
        match (role, level) {
            (Some(role), Some(level)) => Ok((role, level)),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date")
    }

    fn valid_draft() -> UserDraft {
        let mut draft = UserDraft::new();
        draft.name = "Priya Nair".to_string();
        draft.email = "priya.nair@pharmalab.com".to_string();
        draft.choose_role(Role::LabManager);
        draft
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let errors = UserDraft::new().validate();

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("role"), Some("Role is required"));
    }

    #[test]
    fn malformed_email_blocks_submission() {
        let mut draft = valid_draft();
        draft.email = "priya.nair@".to_string();

        let errors = draft.into_user(created()).unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
    }

    #[test]
    fn out_of_range_level_is_a_field_error() {
        let mut draft = valid_draft();
        draft.authorization_level = 5;

        assert!(draft.validate().has("authorization_level"));
    }

    #[test]
    fn choose_role_applies_defaults() {
        let draft = valid_draft();
        assert_eq!(draft.authorization_level, 2);
        assert!(draft.privileges.contains(&"result_approve".to_string()));
    }

    #[test]
    fn toggle_privilege_adds_then_removes() {
        let mut draft = valid_draft();
        draft.toggle_privilege("data_export");
        assert!(draft.privileges.contains(&"data_export".to_string()));
        draft.toggle_privilege("data_export");
        assert!(!draft.privileges.contains(&"data_export".to_string()));
    }

    #[test]
    fn into_user_trims_and_copies_fields() {
        let mut draft = valid_draft();
        draft.name = "  Priya Nair ".to_string();
        draft.signature_certificate = Some("priya.p12".to_string());

        let user = draft.into_user(created()).expect("valid");
        assert_eq!(user.name, "Priya Nair");
        assert_eq!(user.role, Role::LabManager);
        assert_eq!(user.created_date, created());
        assert_eq!(user.signature_certificate.as_deref(), Some("priya.p12"));
    }

    #[test]
    fn edit_round_trip_records_changes() {
        let mut user = valid_draft().into_user(created()).expect("valid");
        let mut draft = UserDraft::from_user(&user);
        draft.choose_role(Role::QaManager);
        draft.authorization_level = 3;

        draft.apply_to(&mut user, "admin").expect("valid");

        assert_eq!(user.role, Role::QaManager);
        assert_eq!(user.authorization_level.value(), 3);
        let entry = user.audit_log.last().expect("audit entry");
        assert_eq!(entry.action, "User updated");
        assert!(entry.details.contains("role Lab Manager -> QA Manager"));
    }

    #[test]
    fn invalid_edit_leaves_user_untouched() {
        let mut user = valid_draft().into_user(created()).expect("valid");
        let before = user.clone();
        let mut draft = UserDraft::from_user(&user);
        draft.name.clear();

        assert!(draft.apply_to(&mut user, "admin").is_err());
        assert_eq!(user, before);
    }
}
