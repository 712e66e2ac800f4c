//! The console user record.
//!
//! A `User` is an account in the LIMS, not a signed-in session: the console
//! manages these records but does not authenticate anyone with them.

use crate::audit::AuditEntry;
use crate::privilege;
use crate::role::{AuthorizationLevel, Role, SignatureStatus, UserStatus};
use chrono::{DateTime, NaiveDate, Utc};
use pharma_lims_core::UserId;
use serde::{Deserialize, Serialize};

/// A LIMS user account.
///
/// No cross-field rule is enforced: a user may have signatures enabled
/// without a certificate on file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    /// `None` for users who have never signed in.
    pub last_login: Option<DateTime<Utc>>,
    pub digital_signature_status: SignatureStatus,
    pub created_date: NaiveDate,
    /// Privilege ids from the catalog in [`crate::privilege`].
    pub privileges: Vec<String>,
    pub authorization_level: AuthorizationLevel,
    /// File name of the uploaded signing certificate.
    pub signature_certificate: Option<String>,
    /// Oldest entry first.
    pub audit_log: Vec<AuditEntry>,
}

impl User {
    /// Creates an active user with the role's default privileges and level.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            last_login: None,
            digital_signature_status: SignatureStatus::Disabled,
            created_date,
            privileges: privilege::defaults_for(role),
            authorization_level: role.default_authorization_level(),
            signature_certificate: None,
            audit_log: Vec::new(),
        }
    }

    /// Appends an entry to the audit trail.
    pub fn record(&mut self, entry: AuditEntry) {
        self.audit_log.push(entry);
    }

    /// Flips Active/Inactive and records who did it.
    pub fn toggle_status(&mut self, performed_by: &str) -> UserStatus {
        self.status = match self.status {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        };
        self.record(AuditEntry::now(
            "Status changed",
            performed_by,
            format!("Status set to {}", self.status),
        ));
        self.status
    }

    /// Enables or disables electronic signatures and records who did it.
    pub fn set_signature_status(&mut self, status: SignatureStatus, performed_by: &str) {
        if self.digital_signature_status == status {
            return;
        }
        self.digital_signature_status = status;
        self.record(AuditEntry::now(
            "Digital signature updated",
            performed_by,
            format!("Digital signature {}", status.as_str().to_lowercase()),
        ));
    }

    /// Stores the file name of an uploaded signing certificate.
    pub fn attach_certificate(&mut self, file_name: impl Into<String>, performed_by: &str) {
        let file_name = file_name.into();
        self.record(AuditEntry::now(
            "Certificate uploaded",
            performed_by,
            format!("Certificate {file_name} attached"),
        ));
        self.signature_certificate = Some(file_name);
    }

    /// Marks a successful sign-in at `at`.
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }

    /// Returns true if the privilege id is granted.
    #[must_use]
    pub fn has_privilege(&self, privilege_id: &str) -> bool {
        self.privileges.iter().any(|p| p == privilege_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
    }

    #[test]
    fn new_user_has_generated_id() {
        let user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());
        assert!(user.id.to_string().starts_with("usr_"));
    }

    #[test]
    fn new_user_is_active_and_never_logged_in() {
        let user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());

        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login.is_none());
        assert!(user.signature_certificate.is_none());
        assert!(user.audit_log.is_empty());
    }

    #[test]
    fn new_user_takes_role_defaults() {
        let user = User::new("Lee Park", "lee.park@pharmalab.com", Role::Auditor, created());

        assert_eq!(user.authorization_level.value(), 0);
        assert!(user.has_privilege("audit_view"));
        assert!(!user.has_privilege("user_manage"));
    }

    #[test]
    fn toggle_status_records_audit_entry() {
        let mut user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());

        assert_eq!(user.toggle_status("admin"), UserStatus::Inactive);
        assert_eq!(user.toggle_status("admin"), UserStatus::Active);

        assert_eq!(user.audit_log.len(), 2);
        assert_eq!(user.audit_log[0].details, "Status set to Inactive");
        assert_eq!(user.audit_log[1].performed_by, "admin");
    }

    #[test]
    fn signature_can_be_enabled_without_certificate() {
        let mut user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());
        user.set_signature_status(SignatureStatus::Enabled, "admin");

        assert!(user.digital_signature_status.is_enabled());
        assert!(user.signature_certificate.is_none());
    }

    #[test]
    fn unchanged_signature_status_is_not_audited() {
        let mut user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());
        user.set_signature_status(SignatureStatus::Disabled, "admin");
        assert!(user.audit_log.is_empty());
    }

    #[test]
    fn attach_certificate_stores_file_name() {
        let mut user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());
        user.attach_certificate("ana_ruiz.p12", "admin");

        assert_eq!(user.signature_certificate.as_deref(), Some("ana_ruiz.p12"));
        assert_eq!(user.audit_log[0].action, "Certificate uploaded");
    }

    #[test]
    fn user_serialization_roundtrip() {
        let mut user = User::new("Ana Ruiz", "ana.ruiz@pharmalab.com", Role::QcAnalyst, created());
        user.record_login(Utc::now());

        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user, parsed);
    }
}
