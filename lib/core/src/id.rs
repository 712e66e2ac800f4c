//! Typed identifiers for console entities.
//!
//! Every id wraps a ULID and prints with a short entity prefix
//! (`usr_01H...`, `doc_01H...`). Parsing accepts the prefixed form or a bare
//! ULID, and rejects an id that carries another entity's prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// An id string that did not name the expected entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    pub id_type: &'static str,
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Strips `prefix_` if present and decodes the remaining ULID.
fn parse_prefixed(raw: &str, prefix: &str, id_type: &'static str) -> Result<Ulid, ParseIdError> {
    let body = match raw.split_once('_') {
        Some((found, rest)) if found == prefix => rest,
        Some((found, _)) => {
            return Err(ParseIdError {
                id_type,
                reason: format!("expected prefix `{prefix}`, found `{found}`"),
            });
        }
        None => raw,
    };
    Ulid::from_str(body).map_err(|e| ParseIdError {
        id_type,
        reason: e.to_string(),
    })
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_prefixed(s.trim(), Self::PREFIX, stringify!($name)).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a console user account.
    UserId,
    "usr"
);

define_id!(
    /// Unique identifier for an approval workflow definition.
    WorkflowId,
    "wf"
);

define_id!(
    /// Unique identifier for a digital-signature template.
    SignatureTemplateId,
    "sigt"
);

define_id!(
    /// Unique identifier for a document routed for signature.
    DocumentId,
    "doc"
);

define_id!(
    /// Unique identifier for one signer slot on a document.
    SignerId,
    "sgn"
);

define_id!(
    /// Unique identifier for a notification template.
    NotificationTemplateId,
    "ntpl"
);

define_id!(
    /// Unique identifier for a delivered notification.
    NotificationId,
    "ntf"
);

define_id!(
    /// Unique identifier for a custom form field.
    FieldId,
    "fld"
);

define_id!(
    /// Unique identifier for a module page that groups custom fields.
    ModulePageId,
    "page"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn display_carries_entity_prefix() {
        assert!(UserId::new().to_string().starts_with("usr_"));
        assert!(DocumentId::new().to_string().starts_with("doc_"));
    }

    #[test]
    fn parses_prefixed_and_bare_forms() {
        let id = WorkflowId::new();
        assert_eq!(id.to_string().parse::<WorkflowId>(), Ok(id));
        assert_eq!(id.as_ulid().to_string().parse::<WorkflowId>(), Ok(id));
    }

    #[test]
    fn rejects_another_entitys_prefix() {
        let doc = DocumentId::new().to_string();
        let err = doc.parse::<UserId>().unwrap_err();
        assert_eq!(err.id_type, "UserId");
        assert!(err.reason.contains("`usr`"));
    }

    #[test]
    fn rejects_malformed_ulid() {
        let err = "page_not-a-ulid".parse::<ModulePageId>().unwrap_err();
        assert_eq!(err.id_type, "ModulePageId");
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let ids: HashSet<SignerId> = (0..16).map(|_| SignerId::new()).collect();
        assert_eq!(ids.len(), 16);
    }

    #[test]
    fn serializes_as_bare_ulid() {
        let id = FieldId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_ulid()));
    }
}
