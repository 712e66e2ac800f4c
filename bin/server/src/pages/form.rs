//! Small pieces shared by the page forms.

use leptos::prelude::*;
use pharma_lims_core::FieldErrors;

/// The validation message for one field, if any.
#[component]
pub fn FieldMessage(errors: ReadSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|errors| {
            errors
                .get(field)
                .map(|message| view! { <span class="field-error">{message.to_string()}</span> })
        })
    }
}

/// Server error banner shown at the top of a modal.
#[component]
pub fn SubmitError(error: ReadSignal<Option<String>>) -> impl IntoView {
    move || error.get().map(|e| view! { <p class="error">{e}</p> })
}

/// Splits a comma-separated input into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins a list back into the text shown in its input.
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// Reads an optional number input; blank clears it.
pub fn parse_optional<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() { None } else { raw.parse().ok() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_inputs_drop_blank_entries() {
        assert_eq!(
            split_list(" QA Manager, ,Lab Manager ,"),
            vec!["QA Manager".to_string(), "Lab Manager".to_string()]
        );
        assert_eq!(join_list(&split_list("a,b")), "a, b");
    }

    #[test]
    fn blank_number_is_none() {
        assert_eq!(parse_optional::<f64>("  "), None);
        assert_eq!(parse_optional::<usize>("12"), Some(12));
        assert_eq!(parse_optional::<usize>("twelve"), None);
    }
}
