//! `GET /export/users.csv`: the filtered user list as a download.

use crate::error::StoreError;
use crate::state::ConsoleStore;
use crate::types::UserExportQuery;
use axum::Extension;
use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use pharma_lims_accounts::CSV_FILENAME;

/// Streams the users matching the query, sorted and unpaginated.
pub async fn export_users(
    Extension(store): Extension<ConsoleStore>,
    Query(query): Query<UserExportQuery>,
) -> Response {
    match store.read(|data| data.export_users_csv(query)).await {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_FILENAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(report) => {
            tracing::debug!(error = %report, "Rejected export query");
            let status = match report.current_context() {
                StoreError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, report.current_context().clone().into_server_error().to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_data;
    use axum::body::to_bytes;
    use pharma_lims_accounts::CSV_HEADER;

    fn store() -> ConsoleStore {
        ConsoleStore::new(sample_data("Test Admin"))
    }

    #[tokio::test]
    async fn export_is_an_attachment_with_header_row() {
        let response = export_users(
            Extension(store()),
            Query(UserExportQuery {
                role: "QA Manager".to_string(),
                ..UserExportQuery::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(disposition.as_deref(), Some("attachment; filename=\"users.csv\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let text = String::from_utf8(body.to_vec()).expect("utf-8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert!(lines.next().is_some_and(|row| row.starts_with("Priya Raman,")));
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn bad_date_is_a_bad_request() {
        let response = export_users(
            Extension(store()),
            Query(UserExportQuery {
                created_from: "yesterday".to_string(),
                ..UserExportQuery::default()
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
