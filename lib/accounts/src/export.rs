//! CSV export of the user table.
//!
//! Fields are written verbatim with no quoting or escaping, so a comma
//! inside a value shifts the rest of that row by one column.

use crate::user::User;

/// Download name for the exported file.
pub const CSV_FILENAME: &str = "users.csv";

/// Header line of the export.
pub const CSV_HEADER: &str = "Name,Email,Role,Status,Last Login,Digital Signature,Created Date";

/// Renders one row per user after the header, joined by `\n`.
///
/// Pass the filtered, sorted and unpaginated rows.
#[must_use]
pub fn users_to_csv<'a>(users: impl IntoIterator<Item = &'a User>) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(users.into_iter().map(csv_row));
    lines.join("\n")
}

fn csv_row(user: &User) -> String {
    let last_login = user
        .last_login
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Never".to_string());

    [
        user.name.as_str(),
        user.email.as_str(),
        user.role.as_str(),
        user.status.as_str(),
        last_login.as_str(),
        user.digital_signature_status.as_str(),
        &user.created_date.format("%Y-%m-%d").to_string(),
    ]
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{Role, SignatureStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 7).expect("valid date")
    }

    fn three_users() -> Vec<User> {
        let mut first = User::new("Dana Whitfield", "dana@pharmalab.com", Role::QaManager, created());
        first.last_login = Some(Utc.with_ymd_and_hms(2024, 4, 1, 8, 15, 0).unwrap());
        first.digital_signature_status = SignatureStatus::Enabled;
        let second = User::new("Eli Novak", "eli@pharmalab.com", Role::Researcher, created());
        let third = User::new("Femi Ade", "femi@pharmalab.com", Role::Viewer, created());
        vec![first, second, third]
    }

    #[test]
    fn three_users_export_as_four_lines() {
        let users = three_users();
        let csv = users_to_csv(&users);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Name,Email,Role,Status,Last Login,Digital Signature,Created Date"
        );
    }

    #[test]
    fn rows_use_display_labels() {
        let users = three_users();
        let csv = users_to_csv(&users);

        assert_eq!(
            csv.lines().nth(1),
            Some("Dana Whitfield,dana@pharmalab.com,QA Manager,Active,2024-04-01 08:15,Enabled,2023-11-07")
        );
        assert_eq!(
            csv.lines().nth(2),
            Some("Eli Novak,eli@pharmalab.com,Researcher,Active,Never,Disabled,2023-11-07")
        );
    }

    #[test]
    fn empty_list_exports_header_only() {
        assert_eq!(users_to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn comma_in_name_adds_a_column() {
        let user = User::new("Novak, Eli", "eli@pharmalab.com", Role::Researcher, created());
        let csv = users_to_csv([&user]);

        let header_columns = CSV_HEADER.split(',').count();
        let row_columns = csv.lines().nth(1).expect("row").split(',').count();
        assert_eq!(row_columns, header_columns + 1);
    }
}
