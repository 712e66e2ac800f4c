//! Roles, account status and signature settings for console users.
//!
//! Every enum here round-trips through its display label, which is what the
//! select inputs in the console submit and what the CSV export writes.

use crate::error::AccountError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job role of a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrator")]
    Administrator,
    #[serde(rename = "Lab Manager")]
    LabManager,
    #[serde(rename = "QA Manager")]
    QaManager,
    #[serde(rename = "QC Analyst")]
    QcAnalyst,
    #[serde(rename = "Lab Technician")]
    LabTechnician,
    #[serde(rename = "Researcher")]
    Researcher,
    #[serde(rename = "Auditor")]
    Auditor,
    #[serde(rename = "Viewer")]
    Viewer,
}

impl Role {
    /// All roles in the order the role selector lists them.
    pub const ALL: [Role; 8] = [
        Role::Administrator,
        Role::LabManager,
        Role::QaManager,
        Role::QcAnalyst,
        Role::LabTechnician,
        Role::Researcher,
        Role::Auditor,
        Role::Viewer,
    ];

    /// Returns the display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::LabManager => "Lab Manager",
            Self::QaManager => "QA Manager",
            Self::QcAnalyst => "QC Analyst",
            Self::LabTechnician => "Lab Technician",
            Self::Researcher => "Researcher",
            Self::Auditor => "Auditor",
            Self::Viewer => "Viewer",
        }
    }

    /// Authorization level suggested when a user is first given this role.
    #[must_use]
    pub fn default_authorization_level(&self) -> AuthorizationLevel {
        let level = match self {
            Self::Administrator => 3,
            Self::LabManager | Self::QaManager => 2,
            Self::QcAnalyst | Self::LabTechnician | Self::Researcher => 1,
            Self::Auditor | Self::Viewer => 0,
        };
        AuthorizationLevel(level)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AccountError::UnknownValue {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Whether an account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub const ALL: [UserStatus; 2] = [UserStatus::Active, UserStatus::Inactive];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            other => Err(AccountError::UnknownValue {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether the user may apply electronic signatures.
///
/// Not tied to the certificate: `Enabled` without a certificate is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignatureStatus {
    Enabled,
    #[default]
    Disabled,
}

impl SignatureStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureStatus {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(Self::Enabled),
            "Disabled" => Ok(Self::Disabled),
            other => Err(AccountError::UnknownValue {
                kind: "digital signature status",
                value: other.to_string(),
            }),
        }
    }
}

/// Authorization level between 0 (read only) and 3 (full control).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct AuthorizationLevel(u8);

impl AuthorizationLevel {
    /// Highest accepted level.
    pub const MAX: u8 = 3;

    /// Creates a level, rejecting values above [`Self::MAX`].
    pub fn new(level: u8) -> Result<Self, AccountError> {
        if level > Self::MAX {
            return Err(AccountError::InvalidAuthorizationLevel { level });
        }
        Ok(Self(level))
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Short description shown next to the level selector.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Read only",
            1 => "Standard operations",
            2 => "Review and approve",
            _ => "Full administrative control",
        }
    }
}

impl TryFrom<u8> for AuthorizationLevel {
    type Error = AccountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthorizationLevel> for u8 {
    fn from(level: AuthorizationLevel) -> Self {
        level.0
    }
}

impl fmt::Display for AuthorizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_round_trip() {
        for role in Role::ALL {
            let parsed: Role = role.as_str().parse().expect("parse label");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_label_is_rejected() {
        let err = "Chemist".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Chemist"));
    }

    #[test]
    fn role_serializes_as_label() {
        let json = serde_json::to_string(&Role::QaManager).expect("serialize");
        assert_eq!(json, "\"QA Manager\"");
    }

    #[test]
    fn default_levels_follow_seniority() {
        assert_eq!(Role::Administrator.default_authorization_level().value(), 3);
        assert_eq!(Role::QaManager.default_authorization_level().value(), 2);
        assert_eq!(Role::LabTechnician.default_authorization_level().value(), 1);
        assert_eq!(Role::Viewer.default_authorization_level().value(), 0);
    }

    #[test]
    fn authorization_level_accepts_zero_through_three() {
        for level in 0..=3 {
            assert!(AuthorizationLevel::new(level).is_ok());
        }
        assert_eq!(
            AuthorizationLevel::new(4),
            Err(AccountError::InvalidAuthorizationLevel { level: 4 })
        );
    }

    #[test]
    fn authorization_level_deserialization_enforces_range() {
        let ok: AuthorizationLevel = serde_json::from_str("2").expect("in range");
        assert_eq!(ok.value(), 2);
        assert!(serde_json::from_str::<AuthorizationLevel>("7").is_err());
    }

    #[test]
    fn status_labels_parse() {
        assert_eq!("Inactive".parse::<UserStatus>(), Ok(UserStatus::Inactive));
        assert_eq!(
            "Enabled".parse::<SignatureStatus>(),
            Ok(SignatureStatus::Enabled)
        );
        assert!("enabled".parse::<SignatureStatus>().is_err());
    }
}
