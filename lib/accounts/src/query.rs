//! Filtering, sorting and pagination of the user table.
//!
//! [`UserListState`] holds the table controls; [`UserListState::view`]
//! recomputes the visible page from the full list every time it is called.
//!
//! Two behaviours are kept as the table has always shown them:
//! - a user who never logged in fails any last-login bound, so they vanish as
//!   soon as either last-login date is set;
//! - sorting compares the lowercased text of the field, so authorization
//!   levels 0, 2 and 10 order as 0, 10, 2.

use crate::error::AccountError;
use crate::role::{Role, UserStatus};
use crate::user::User;
use chrono::NaiveDate;
use pharma_lims_core::UserId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Page sizes offered by the table footer.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 25, 50, 100];

/// Filter criteria; `None` and empty strings mean "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Case-insensitive substring matched against name or email.
    pub search: String,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub last_login_from: Option<NaiveDate>,
    pub last_login_to: Option<NaiveDate>,
}

impl UserFilter {
    /// Returns true if `user` passes every active criterion.
    ///
    /// Date bounds are inclusive and compared by calendar day.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.status.is_some_and(|status| status != user.status) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !user.name.to_lowercase().contains(&needle)
            && !user.email.to_lowercase().contains(&needle)
        {
            return false;
        }

        if !within(Some(user.created_date), self.created_from, self.created_to) {
            return false;
        }

        let last_login = user.last_login.map(|at| at.date_naive());
        within(last_login, self.last_login_from, self.last_login_to)
    }

    /// Returns true if any criterion is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }
}

/// Inclusive range check where a missing value fails any bound.
fn within(value: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    from.is_none_or(|from| value >= from) && to.is_none_or(|to| value <= to)
}

/// Column the table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Email,
    Role,
    Status,
    LastLogin,
    DigitalSignature,
    CreatedDate,
    AuthorizationLevel,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Name,
        SortField::Email,
        SortField::Role,
        SortField::Status,
        SortField::LastLogin,
        SortField::DigitalSignature,
        SortField::CreatedDate,
        SortField::AuthorizationLevel,
    ];

    /// Column heading.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Role => "Role",
            Self::Status => "Status",
            Self::LastLogin => "Last Login",
            Self::DigitalSignature => "Digital Signature",
            Self::CreatedDate => "Created Date",
            Self::AuthorizationLevel => "Authorization Level",
        }
    }

    /// The text a user is compared by for this column, before case folding.
    #[must_use]
    pub fn sort_key(&self, user: &User) -> String {
        match self {
            Self::Name => user.name.clone(),
            Self::Email => user.email.clone(),
            Self::Role => user.role.to_string(),
            Self::Status => user.status.to_string(),
            Self::LastLogin => user
                .last_login
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            Self::DigitalSignature => user.digital_signature_status.to_string(),
            Self::CreatedDate => user.created_date.format("%Y-%m-%d").to_string(),
            Self::AuthorizationLevel => user.authorization_level.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Single-key sort setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl UserSort {
    #[must_use]
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let ordering = compare_text(&self.field.sort_key(a), &self.field.sort_key(b));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Case-insensitive text comparison used for every column.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Filters then stably sorts `users`, without paginating.
///
/// This is also the row set the CSV export writes.
#[must_use]
pub fn filter_and_sort<'a>(users: &'a [User], filter: &UserFilter, sort: UserSort) -> Vec<&'a User> {
    let mut rows: Vec<&User> = users.iter().filter(|u| filter.matches(u)).collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

/// 1-based page position and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Pagination {
    /// `ceil(count / page_size)`; zero when nothing matches.
    #[must_use]
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size.max(1))
    }
}

/// The visible slice of the user table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage<'a> {
    pub users: Vec<&'a User>,
    /// Matches across all pages.
    pub filtered_count: usize,
    pub total_pages: usize,
    /// Page actually shown, clamped to the last page.
    pub page: usize,
    pub page_size: usize,
}

impl UserPage<'_> {
    /// 1-based index of the first row shown, or zero when empty.
    #[must_use]
    pub fn first_row(&self) -> usize {
        if self.users.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    #[must_use]
    pub fn last_row(&self) -> usize {
        if self.users.is_empty() {
            0
        } else {
            self.first_row() + self.users.len() - 1
        }
    }
}

/// Table controls for the user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListState {
    pub filter: UserFilter,
    pub sort: UserSort,
    pub pagination: Pagination,
    pub selection: BTreeSet<UserId>,
}

impl UserListState {
    /// Creates state with a screen-specific page size.
    pub fn with_page_size(page_size: usize) -> Result<Self, AccountError> {
        let mut state = Self::default();
        state.set_page_size(page_size)?;
        Ok(state)
    }

    /// Replaces the filter, returning to page 1 and clearing the selection.
    pub fn set_filter(&mut self, filter: UserFilter) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.pagination.page = 1;
        self.selection.clear();
    }

    /// Clears every filter criterion.
    pub fn clear_filter(&mut self) {
        self.set_filter(UserFilter::default());
    }

    /// Sorts by `field`, flipping direction when it is already the key.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort.field == field {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = UserSort {
                field,
                direction: SortDirection::Ascending,
            };
        }
    }

    /// Moves to a page (minimum 1) and clears the selection.
    pub fn set_page(&mut self, page: usize) {
        self.pagination.page = page.max(1);
        self.selection.clear();
    }

    /// Changes the page size, returning to page 1 and clearing the selection.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), AccountError> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            tracing::debug!(page_size, "Rejected unsupported page size");
            return Err(AccountError::UnsupportedPageSize { size: page_size });
        }
        self.pagination = Pagination { page: 1, page_size };
        self.selection.clear();
        Ok(())
    }

    /// Selects or deselects one user.
    pub fn toggle_selected(&mut self, user_id: UserId) {
        if !self.selection.remove(&user_id) {
            self.selection.insert(user_id);
        }
    }

    /// Selects every user on `page`, or clears if they are all selected.
    pub fn toggle_select_page(&mut self, page: &UserPage<'_>) {
        let ids: Vec<UserId> = page.users.iter().map(|u| u.id).collect();
        if !ids.is_empty() && ids.iter().all(|id| self.selection.contains(id)) {
            self.selection.clear();
        } else {
            self.selection.extend(ids);
        }
    }

    /// Derives the visible page from the full list.
    #[must_use]
    pub fn view<'a>(&self, users: &'a [User]) -> UserPage<'a> {
        let rows = filter_and_sort(users, &self.filter, self.sort);
        let filtered_count = rows.len();
        let page_size = self.pagination.page_size.max(1);
        let total_pages = self.pagination.total_pages(filtered_count);
        let page = self.pagination.page.clamp(1, total_pages.max(1));

        let users = rows
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        UserPage {
            users,
            filtered_count,
            total_pages,
            page,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::AuthorizationLevel;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn user(name: &str, role: Role, created: NaiveDate) -> User {
        let email = format!("{}@pharmalab.com", name.to_lowercase().replace(' ', "."));
        User::new(name, email, role, created)
    }

    fn sample() -> Vec<User> {
        let mut alice = user("Alice Moreau", Role::LabManager, date(2023, 2, 10));
        alice.last_login = Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap());

        let mut bruno = user("Bruno Silva", Role::QcAnalyst, date(2023, 8, 1));
        bruno.last_login = Some(Utc.with_ymd_and_hms(2024, 5, 20, 17, 5, 0).unwrap());
        bruno.status = UserStatus::Inactive;

        let carla = user("Carla Jensen", Role::QcAnalyst, date(2024, 1, 5));

        vec![alice, bruno, carla]
    }

    fn names(page: &UserPage<'_>) -> Vec<String> {
        page.users.iter().map(|u| u.name.clone()).collect()
    }

    #[test]
    fn default_state_shows_everything_sorted_by_name() {
        let users = sample();
        let page = UserListState::default().view(&users);

        assert_eq!(page.filtered_count, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(names(&page), ["Alice Moreau", "Bruno Silva", "Carla Jensen"]);
    }

    #[test]
    fn role_and_status_filters_are_exact() {
        let users = sample();
        let mut state = UserListState::default();
        state.set_filter(UserFilter {
            role: Some(Role::QcAnalyst),
            status: Some(UserStatus::Active),
            ..UserFilter::default()
        });

        assert_eq!(names(&state.view(&users)), ["Carla Jensen"]);
    }

    #[test]
    fn search_matches_name_or_email_case_insensitively() {
        let users = sample();
        let by_name = UserFilter {
            search: "JENSEN".to_string(),
            ..UserFilter::default()
        };
        let by_email = UserFilter {
            search: "bruno.silva@".to_string(),
            ..UserFilter::default()
        };

        assert!(by_name.matches(&users[2]));
        assert!(!by_name.matches(&users[0]));
        assert!(by_email.matches(&users[1]));
    }

    #[test]
    fn created_range_is_inclusive() {
        let users = sample();
        let filter = UserFilter {
            created_from: Some(date(2023, 8, 1)),
            created_to: Some(date(2024, 1, 5)),
            ..UserFilter::default()
        };

        let matched: Vec<_> = users.iter().filter(|u| filter.matches(u)).collect();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn last_login_to_includes_the_whole_day() {
        let users = sample();
        let filter = UserFilter {
            last_login_to: Some(date(2024, 5, 20)),
            ..UserFilter::default()
        };
        assert!(filter.matches(&users[1]));
    }

    #[test]
    fn never_logged_in_users_vanish_under_any_login_bound() {
        let users = sample();
        let carla = &users[2];
        assert!(carla.last_login.is_none());

        let from_only = UserFilter {
            last_login_from: Some(date(2000, 1, 1)),
            ..UserFilter::default()
        };
        let to_only = UserFilter {
            last_login_to: Some(date(2100, 1, 1)),
            ..UserFilter::default()
        };

        assert!(!from_only.matches(carla));
        assert!(!to_only.matches(carla));
        assert!(UserFilter::default().matches(carla));
    }

    #[test]
    fn authorization_level_sorts_as_text() {
        let mut users = sample();
        // Levels stop at 3, so the two-digit case is shown on the comparator.
        let mut keys = vec!["0", "2", "10"];
        keys.sort_by(|a, b| compare_text(a, b));
        assert_eq!(keys, ["0", "10", "2"]);

        users[0].authorization_level = AuthorizationLevel::new(0).unwrap();
        users[1].authorization_level = AuthorizationLevel::new(2).unwrap();
        users[2].authorization_level = AuthorizationLevel::new(1).unwrap();

        let mut state = UserListState::default();
        state.toggle_sort(SortField::AuthorizationLevel);
        let page = state.view(&users);
        assert_eq!(names(&page), ["Alice Moreau", "Carla Jensen", "Bruno Silva"]);
    }

    #[test]
    fn toggle_sort_flips_then_resets() {
        let mut state = UserListState::default();
        state.toggle_sort(SortField::Name);
        assert_eq!(state.sort.direction, SortDirection::Descending);

        state.toggle_sort(SortField::CreatedDate);
        assert_eq!(
            state.sort,
            UserSort {
                field: SortField::CreatedDate,
                direction: SortDirection::Ascending,
            }
        );
    }

    #[test]
    fn descending_name_sort_reverses_order() {
        let users = sample();
        let mut state = UserListState::default();
        state.toggle_sort(SortField::Name);

        assert_eq!(
            names(&state.view(&users)),
            ["Carla Jensen", "Bruno Silva", "Alice Moreau"]
        );
    }

    #[test]
    fn never_logged_in_sorts_first_ascending() {
        let users = sample();
        let mut state = UserListState::default();
        state.toggle_sort(SortField::LastLogin);

        assert_eq!(state.view(&users).users[0].name, "Carla Jensen");
    }

    #[test]
    fn pagination_slices_and_counts_pages() {
        let users: Vec<User> = (0..12)
            .map(|i| user(&format!("User {i:02}"), Role::Viewer, date(2024, 1, 1)))
            .collect();
        let mut state = UserListState::with_page_size(5).expect("supported");
        state.set_page(3);

        let page = state.view(&users);
        assert_eq!(page.total_pages, 3);
        assert_eq!(names(&page), ["User 10", "User 11"]);
        assert_eq!((page.first_row(), page.last_row()), (11, 12));
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let users = sample();
        let mut state = UserListState::default();
        state.set_filter(UserFilter {
            search: "nobody".to_string(),
            ..UserFilter::default()
        });

        let page = state.view(&users);
        assert_eq!(page.total_pages, 0);
        assert!(page.users.is_empty());
        assert_eq!(page.first_row(), 0);
    }

    #[test]
    fn page_past_the_end_is_clamped() {
        let users = sample();
        let mut state = UserListState::default();
        state.set_page(9);
        assert_eq!(state.view(&users).page, 1);
    }

    #[test]
    fn unsupported_page_size_is_rejected() {
        let mut state = UserListState::default();
        assert_eq!(
            state.set_page_size(7),
            Err(AccountError::UnsupportedPageSize { size: 7 })
        );
        assert_eq!(state.pagination.page_size, 10);
    }

    #[test]
    fn page_changes_clear_selection() {
        let users = sample();
        let mut state = UserListState::default();
        state.toggle_selected(users[0].id);
        state.set_page(2);
        assert!(state.selection.is_empty());

        state.toggle_selected(users[1].id);
        state.set_page_size(25).expect("supported");
        assert!(state.selection.is_empty());
        assert_eq!(state.pagination.page, 1);
    }

    #[test]
    fn filter_change_returns_to_first_page() {
        let mut state = UserListState::default();
        state.set_page(4);
        state.set_filter(UserFilter {
            status: Some(UserStatus::Inactive),
            ..UserFilter::default()
        });
        assert_eq!(state.pagination.page, 1);
        assert!(state.filter.is_active());
    }

    #[test]
    fn select_page_toggles_all_rows() {
        let users = sample();
        let mut state = UserListState::default();

        let page = state.clone().view(&users);
        state.toggle_select_page(&page);
        assert_eq!(state.selection.len(), 3);

        state.toggle_select_page(&page);
        assert!(state.selection.is_empty());
    }

    mod proptest_filter {
        use super::*;
        use proptest::prelude::*;

        fn arb_role() -> impl Strategy<Value = Role> {
            prop::sample::select(Role::ALL.to_vec())
        }

        fn arb_date() -> impl Strategy<Value = NaiveDate> {
            (0i64..1500).prop_map(|days| date(2021, 1, 1) + chrono::Duration::days(days))
        }

        fn arb_user() -> impl Strategy<Value = User> {
            (
                "[a-z]{3,8}",
                arb_role(),
                any::<bool>(),
                arb_date(),
                proptest::option::of(arb_date()),
            )
                .prop_map(|(name, role, active, created, login)| {
                    let mut u = User::new(name.clone(), format!("{name}@lab.com"), role, created);
                    if !active {
                        u.status = UserStatus::Inactive;
                    }
                    u.last_login = login.map(|d| d.and_hms_opt(12, 0, 0).unwrap().and_utc());
                    u
                })
        }

        fn arb_filter() -> impl Strategy<Value = UserFilter> {
            (
                proptest::option::of(arb_role()),
                proptest::option::of(prop::sample::select(UserStatus::ALL.to_vec())),
                prop::sample::select(vec!["", "a", "lab", "xyz"]),
                proptest::option::of(arb_date()),
                proptest::option::of(arb_date()),
                proptest::option::of(arb_date()),
                proptest::option::of(arb_date()),
            )
                .prop_map(|(role, status, search, cf, ct, lf, lt)| UserFilter {
                    role,
                    status,
                    search: search.to_string(),
                    created_from: cf,
                    created_to: ct,
                    last_login_from: lf,
                    last_login_to: lt,
                })
        }

        proptest! {
            /// Every returned user satisfies every active predicate, and the
            /// result never outgrows the input.
            #[test]
            fn prop_filtered_users_satisfy_every_predicate(
                users in proptest::collection::vec(arb_user(), 0..30),
                filter in arb_filter(),
            ) {
                let rows = filter_and_sort(&users, &filter, UserSort::default());
                prop_assert!(rows.len() <= users.len());

                for u in rows {
                    if let Some(role) = filter.role {
                        prop_assert_eq!(u.role, role);
                    }
                    if let Some(status) = filter.status {
                        prop_assert_eq!(u.status, status);
                    }
                    let needle = filter.search.to_lowercase();
                    prop_assert!(
                        u.name.to_lowercase().contains(&needle)
                            || u.email.to_lowercase().contains(&needle)
                    );
                    if let Some(from) = filter.created_from {
                        prop_assert!(u.created_date >= from);
                    }
                    if let Some(to) = filter.created_to {
                        prop_assert!(u.created_date <= to);
                    }
                    if filter.last_login_from.is_some() || filter.last_login_to.is_some() {
                        let login = u.last_login.map(|at| at.date_naive());
                        prop_assert!(login.is_some());
                        let login = login.unwrap();
                        if let Some(from) = filter.last_login_from {
                            prop_assert!(login >= from);
                        }
                        if let Some(to) = filter.last_login_to {
                            prop_assert!(login <= to);
                        }
                    }
                }
            }

            /// Pages never exceed the page size and together cover the matches.
            #[test]
            fn prop_pages_partition_matches(
                users in proptest::collection::vec(arb_user(), 0..40),
                size_idx in 0usize..5,
            ) {
                let mut state = UserListState::default();
                state.set_page_size(PAGE_SIZE_OPTIONS[size_idx]).unwrap();
                let total = state.view(&users).total_pages;

                let mut seen = 0;
                for page in 1..=total {
                    state.set_page(page);
                    let view = state.view(&users);
                    prop_assert!(view.users.len() <= view.page_size);
                    seen += view.users.len();
                }
                prop_assert_eq!(seen, users.len());
            }
        }
    }
}
