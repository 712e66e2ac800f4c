//! Helper functions for server functions with proper error handling and logging.

use crate::error::StoreError;
use crate::state::ConsoleStore;
use crate::types::ClientSettings;
use axum::Extension;
use leptos::prelude::*;
use rootcause::Report;
use std::str::FromStr;

/// Gets the console store from the request extensions.
pub async fn get_store() -> Result<ConsoleStore, ServerFnError> {
    let Extension(store): Extension<ConsoleStore> = leptos_axum::extract().await.map_err(|e| {
        tracing::error!(error = %e, "Console store missing from request");
        ServerFnError::new("Console is not available")
    })?;
    Ok(store)
}

/// Gets the browser settings from the request extensions.
pub async fn get_settings() -> Result<ClientSettings, ServerFnError> {
    let Extension(settings): Extension<ClientSettings> = leptos_axum::extract().await?;
    Ok(settings)
}

/// Parses an id received from the browser.
///
/// Logs the failure and returns a user-safe error.
pub fn parse_id<T>(entity: &'static str, raw: &str) -> Result<T, ServerFnError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|e| {
        tracing::debug!(error = %e, id = %raw, entity, "Invalid ID format");
        StoreError::InvalidId {
            entity,
            id: raw.to_string(),
            reason: e.to_string(),
        }
        .into_server_error()
    })
}

/// Logs a failed store operation and converts it for the browser.
///
/// Not-found and validation failures are expected user input and logged at
/// debug; anything else is a warning.
pub fn store_error(operation: &'static str, report: Report<StoreError>) -> ServerFnError {
    let error = report.current_context().clone();
    match error {
        StoreError::Validation { .. } | StoreError::NotFound { .. } => {
            tracing::debug!(error = %report, operation, "Store operation refused input");
        }
        _ => tracing::warn!(error = %report, operation, "Store operation failed"),
    }
    error.into_server_error()
}
