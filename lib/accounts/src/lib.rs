//! User accounts for the Pharma LIMS console.
//!
//! This crate provides:
//! - The `User` record with its role, status and signature settings
//! - The privilege catalog and per-user audit trail
//! - `UserDraft`, the add/edit form model with its validation
//! - `UserListState`, which derives the visible page of the user table from
//!   filters, a sort key and pagination settings
//! - CSV export of the filtered list
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pharma_lims_accounts::{Role, SortField, UserDraft, UserListState};
//!
//! let created = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut draft = UserDraft::new();
//! draft.name = "Dana Whitfield".to_string();
//! draft.email = "dana.whitfield@pharmalab.com".to_string();
//! draft.role = Some(Role::QcAnalyst);
//! let user = draft.into_user(created).expect("valid draft");
//!
//! let users = vec![user];
//! let mut state = UserListState::default();
//! state.toggle_sort(SortField::Email);
//! let page = state.view(&users);
//! assert_eq!(page.filtered_count, 1);
//! ```

pub mod audit;
pub mod draft;
pub mod error;
pub mod export;
pub mod privilege;
pub mod query;
pub mod role;
pub mod user;

pub use audit::AuditEntry;
pub use draft::UserDraft;
pub use error::AccountError;
pub use export::{CSV_FILENAME, CSV_HEADER, users_to_csv};
pub use privilege::{PRIVILEGES, Privilege};
pub use query::{
    PAGE_SIZE_OPTIONS, Pagination, SortDirection, SortField, UserFilter, UserListState, UserPage,
    UserSort, filter_and_sort,
};
pub use role::{AuthorizationLevel, Role, SignatureStatus, UserStatus};
pub use user::User;
