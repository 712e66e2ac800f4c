//! Overview dashboard.

use crate::types::ConsoleOverview;
use leptos::prelude::*;

/// Server function to count records across the console.
#[server]
pub async fn get_overview() -> Result<ConsoleOverview, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    let overview = store.read(|data| data.overview()).await;
    tracing::debug!(
        users = overview.users_total,
        workflows = overview.workflows_total,
        "Loaded overview"
    );
    Ok(overview)
}

/// The overview page component.
#[component]
pub fn HomePage() -> impl IntoView {
    let overview = Resource::new(|| (), |_| get_overview());

    view! {
        <div class="home-page">
            <h1>"Laboratory Administration"</h1>
            <p>"Manage users, approval workflows, electronic signatures and form extensions."</p>
            <Suspense fallback=move || view! { <p>"Loading..."</p> }>
                {move || {
                    overview.get().map(|result| match result {
                        Ok(o) => view! {
                            <div class="stat-grid">
                                <StatCard
                                    title="Users"
                                    value=o.users_total
                                    detail=format!("{} active", o.users_active)
                                    href="/users"
                                />
                                <StatCard
                                    title="Digital Signatures"
                                    value=o.signatures_enabled
                                    detail="users enabled".to_string()
                                    href="/users"
                                />
                                <StatCard
                                    title="Workflows"
                                    value=o.workflows_total
                                    detail=format!("{} active", o.workflows_active)
                                    href="/workflows"
                                />
                                <StatCard
                                    title="Pending Documents"
                                    value=o.documents_pending
                                    detail="awaiting signatures".to_string()
                                    href="/signatures"
                                />
                                <StatCard
                                    title="Unread Notifications"
                                    value=o.notifications_unread
                                    detail="in the inbox".to_string()
                                    href="/notifications"
                                />
                                <StatCard
                                    title="Custom Fields"
                                    value=o.custom_fields
                                    detail=format!("on {} pages", o.module_pages)
                                    href="/custom-fields"
                                />
                            </div>
                        }.into_any(),
                        Err(e) => view! {
                            <p class="error">{format!("Failed to load overview: {e}")}</p>
                        }.into_any(),
                    })
                }}
            </Suspense>
        </div>
    }
}

#[component]
fn StatCard(
    title: &'static str,
    value: usize,
    detail: String,
    href: &'static str,
) -> impl IntoView {
    view! {
        <a class="stat-card" href=href>
            <span class="stat-title">{title}</span>
            <span class="stat-value">{value}</span>
            <span class="stat-detail">{detail}</span>
        </a>
    }
}
