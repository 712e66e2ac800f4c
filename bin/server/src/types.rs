//! Shared types used across server functions and UI components.

use crate::error::StoreError;
use chrono::NaiveDate;
use pharma_lims_accounts::{
    Role, SortDirection, SortField, UserFilter, UserListState, UserSort, UserStatus,
};
use serde::{Deserialize, Serialize};

/// Console settings the browser needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub history_limit: usize,
    pub default_page_size: usize,
    pub operator_name: String,
}

/// Counts shown on the overview dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleOverview {
    pub users_total: usize,
    pub users_active: usize,
    pub signatures_enabled: usize,
    pub workflows_total: usize,
    pub workflows_active: usize,
    pub documents_pending: usize,
    pub notifications_unread: usize,
    pub module_pages: usize,
    pub custom_fields: usize,
}

/// Query string of `GET /export/users.csv`.
///
/// Every field is the raw text of a form control; blank means "All".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserExportQuery {
    pub role: String,
    pub status: String,
    pub search: String,
    pub created_from: String,
    pub created_to: String,
    pub last_login_from: String,
    pub last_login_to: String,
    pub sort: SortField,
    pub direction: SortDirection,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl UserExportQuery {
    /// Captures the table's current filter and sort.
    #[must_use]
    pub fn from_state(state: &UserListState) -> Self {
        let filter = &state.filter;
        let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
        Self {
            role: filter.role.map(|r| r.to_string()).unwrap_or_default(),
            status: filter.status.map(|s| s.to_string()).unwrap_or_default(),
            search: filter.search.clone(),
            created_from: date(filter.created_from),
            created_to: date(filter.created_to),
            last_login_from: date(filter.last_login_from),
            last_login_to: date(filter.last_login_to),
            sort: state.sort.field,
            direction: state.sort.direction,
        }
    }

    /// `(name, value)` pairs for the export form's hidden inputs.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("role", self.role.clone()),
            ("status", self.status.clone()),
            ("search", self.search.clone()),
            ("created_from", self.created_from.clone()),
            ("created_to", self.created_to.clone()),
            ("last_login_from", self.last_login_from.clone()),
            ("last_login_to", self.last_login_to.clone()),
            ("sort", sort_field_param(self.sort).to_string()),
            ("direction", direction_param(self.direction).to_string()),
        ]
    }

    /// Parses the raw values back into a filter and sort.
    pub fn into_parts(self) -> Result<(UserFilter, UserSort), StoreError> {
        let role = parse_optional::<Role>("role", &self.role)?;
        let status = parse_optional::<UserStatus>("status", &self.status)?;
        let filter = UserFilter {
            role,
            status,
            search: self.search,
            created_from: parse_date("created_from", &self.created_from)?,
            created_to: parse_date("created_to", &self.created_to)?,
            last_login_from: parse_date("last_login_from", &self.last_login_from)?,
            last_login_to: parse_date("last_login_to", &self.last_login_to)?,
        };
        let sort = UserSort {
            field: self.sort,
            direction: self.direction,
        };
        Ok((filter, sort))
    }
}

fn parse_optional<T: std::str::FromStr>(
    param: &'static str,
    value: &str,
) -> Result<Option<T>, StoreError> {
    let value = value.trim();
    if value.is_empty() || value == "All" {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| StoreError::InvalidQuery {
        param,
        value: value.to_string(),
    })
}

fn parse_date(param: &'static str, value: &str) -> Result<Option<NaiveDate>, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| StoreError::InvalidQuery {
            param,
            value: value.to_string(),
        })
}

/// Wire name of a sort column, matching its serde form.
#[must_use]
pub fn sort_field_param(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Email => "email",
        SortField::Role => "role",
        SortField::Status => "status",
        SortField::LastLogin => "last_login",
        SortField::DigitalSignature => "digital_signature",
        SortField::CreatedDate => "created_date",
        SortField::AuthorizationLevel => "authorization_level",
    }
}

fn direction_param(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    }
}
