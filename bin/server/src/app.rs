//! Main Leptos application component and routing.

use crate::pages::{
    CustomFieldsPage, HomePage, NotificationsPage, SignaturesPage, UsersPage, WorkflowEditorPage,
    WorkflowsPage,
};
use crate::types::ClientSettings;
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

/// Server function to get the console settings the browser needs.
#[server]
pub async fn get_client_settings() -> Result<ClientSettings, ServerFnError> {
    use crate::server_helpers::get_settings;

    get_settings().await.map_err(|e| {
        tracing::error!(error = %e, "Client settings missing from request");
        e
    })
}

/// Sidebar entries as `(href, label)`.
const NAV_ITEMS: &[(&str, &str)] = &[
    ("/", "Overview"),
    ("/users", "Users"),
    ("/workflows", "Workflows"),
    ("/signatures", "Signatures"),
    ("/notifications", "Notifications"),
    ("/custom-fields", "Custom Fields"),
];

/// The main application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Pharma LIMS Console"/>
        <Router>
            <div class="console-layout">
                <Sidebar/>
                <main class="container">
                    <Routes fallback=|| "Page not found.".into_view()>
                        <Route path=path!("/") view=HomePage/>
                        <Route path=path!("/users") view=UsersPage/>
                        <Route path=path!("/workflows") view=WorkflowsPage/>
                        <Route path=path!("/workflows/:id") view=WorkflowEditorPage/>
                        <Route path=path!("/signatures") view=SignaturesPage/>
                        <Route path=path!("/notifications") view=NotificationsPage/>
                        <Route path=path!("/custom-fields") view=CustomFieldsPage/>
                    </Routes>
                </main>
            </div>
        </Router>
    }
}

/// Sidebar with module navigation and the acting operator.
#[component]
fn Sidebar() -> impl IntoView {
    let settings = Resource::new(|| (), |_| get_client_settings());

    view! {
        <nav class="sidebar">
            <a href="/" class="logo">"Pharma LIMS"</a>
            <ul class="nav-list">
                {NAV_ITEMS.iter().map(|(href, label)| view! {
                    <li><a href=*href class="nav-link">{*label}</a></li>
                }).collect_view()}
            </ul>
            <div class="sidebar-footer">
                <Suspense fallback=move || view! { <span>"Loading..."</span> }>
                    {move || {
                        settings.get().map(|result| match result {
                            Ok(settings) => view! {
                                <span class="operator-name">{settings.operator_name}</span>
                            }.into_any(),
                            Err(_) => view! {
                                <span class="muted">"Offline"</span>
                            }.into_any(),
                        })
                    }}
                </Suspense>
            </div>
        </nav>
    }
}
