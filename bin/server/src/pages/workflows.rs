//! Workflows page component and server functions.

use crate::pages::form::{FieldMessage, SubmitError};
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use pharma_lims_core::{FieldErrors, WorkflowId};
use pharma_lims_workflow::{Workflow, WorkflowCategory, WorkflowDraft, WorkflowStatus};

/// Server function to list every workflow.
#[server]
pub async fn list_workflows() -> Result<Vec<Workflow>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.workflows.clone()).await)
}

/// Server function to create a workflow with the default start node.
#[server(input = Json)]
pub async fn create_workflow(draft: WorkflowDraft) -> Result<Workflow, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_workflow(draft))
        .await
        .map_err(|report| store_error("create_workflow", report))
}

/// Server function to save a workflow's metadata.
#[server(input = Json)]
pub async fn update_workflow(
    workflow_id: String,
    draft: WorkflowDraft,
) -> Result<Workflow, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: WorkflowId = parse_id("workflow", &workflow_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_workflow(id, draft))
        .await
        .map_err(|report| store_error("update_workflow", report))
}

/// Server function to delete a workflow.
#[server]
pub async fn delete_workflow(workflow_id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: WorkflowId = parse_id("workflow", &workflow_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.delete_workflow(id))
        .await
        .map(|_| ())
        .map_err(|report| store_error("delete_workflow", report))
}

/// Keeps workflows whose name contains `search` and that sit in `category`.
fn matching<'a>(
    workflows: &'a [Workflow],
    search: &str,
    category: Option<WorkflowCategory>,
) -> Vec<&'a Workflow> {
    let needle = search.trim().to_lowercase();
    workflows
        .iter()
        .filter(|wf| category.is_none_or(|c| wf.category == c))
        .filter(|wf| needle.is_empty() || wf.name.to_lowercase().contains(&needle))
        .collect()
}

fn status_class(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Active => "status-enabled",
        WorkflowStatus::Draft => "status-draft",
        WorkflowStatus::Inactive => "status-disabled",
    }
}

/// Workflows list page.
#[component]
pub fn WorkflowsPage() -> impl IntoView {
    let workflows = Resource::new(|| (), |_| list_workflows());

    let (search, set_search) = signal(String::new());
    let (category, set_category) = signal(Option::<WorkflowCategory>::None);

    // Create/edit modal state; `None` inside means create
    let editing = RwSignal::new(Option::<Option<WorkflowId>>::None);
    let draft = RwSignal::new(WorkflowDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    // Delete confirmation state
    let (delete_target, set_delete_target) = signal(Option::<(WorkflowId, String)>::None);
    let (deleting, set_deleting) = signal(false);
    let (delete_error, set_delete_error) = signal(Option::<String>::None);

    let open_modal = move |workflow: Option<&Workflow>| {
        draft.set(workflow.map_or_else(WorkflowDraft::new, WorkflowDraft::from_workflow));
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        editing.set(Some(workflow.map(|wf| wf.id)));
    };

    let on_save = move |_| {
        let Some(target) = editing.get() else {
            return;
        };
        let current = draft.get();
        let found = current.validate();
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_saving.set(true);
        spawn_local(async move {
            let result = match target {
                None => create_workflow(current).await,
                Some(id) => update_workflow(id.to_string(), current).await,
            };
            match result {
                Ok(_) => {
                    editing.set(None);
                    workflows.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    let on_confirm_delete = move |_| {
        let Some((id, _)) = delete_target.get() else {
            return;
        };
        set_deleting.set(true);
        set_delete_error.set(None);
        spawn_local(async move {
            match delete_workflow(id.to_string()).await {
                Ok(()) => {
                    set_delete_target.set(None);
                    workflows.refetch();
                }
                Err(e) => set_delete_error.set(Some(e.to_string())),
            }
            set_deleting.set(false);
        });
    };

    view! {
        <div class="workflows-page">
            <header class="page-header">
                <h1>"Workflows"</h1>
                <button class="primary-btn" on:click=move |_| open_modal(None)>"New Workflow"</button>
            </header>

            <section class="filter-bar">
                <input
                    type="search"
                    placeholder="Search workflows"
                    prop:value=move || search.get()
                    on:input=move |ev| set_search.set(event_target_value(&ev))
                />
                <select on:change=move |ev| set_category.set(event_target_value(&ev).parse().ok())>
                    <option value="All">"All Categories"</option>
                    {WorkflowCategory::ALL.into_iter().map(|c| view! {
                        <option value=c.as_str()>{c.as_str()}</option>
                    }).collect_view()}
                </select>
            </section>

            <Suspense fallback=move || view! { <p>"Loading workflows..."</p> }>
                {move || {
                    workflows.get().map(|result| match result {
                        Ok(items) => {
                            let shown: Vec<Workflow> = matching(&items, &search.get(), category.get())
                                .into_iter()
                                .cloned()
                                .collect();
                            if shown.is_empty() {
                                return view! {
                                    <p class="empty-state">"No workflows found. Create one to get started."</p>
                                }.into_any();
                            }
                            view! {
                                <table class="workflows-table">
                                    <thead>
                                        <tr>
                                            <th>"Name"</th>
                                            <th>"Category"</th>
                                            <th>"Status"</th>
                                            <th>"Steps"</th>
                                            <th>"Version"</th>
                                            <th>"Last Modified"</th>
                                            <th>"Actions"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {shown.into_iter().map(|wf| {
                                            let id = wf.id;
                                            let name = wf.name.clone();
                                            let for_edit = wf.clone();
                                            view! {
                                                <tr>
                                                    <td>
                                                        <strong>{wf.name.clone()}</strong>
                                                        {(!wf.description.is_empty()).then(|| view! {
                                                            <br/><small>{wf.description.clone()}</small>
                                                        })}
                                                    </td>
                                                    <td>{wf.category.as_str()}</td>
                                                    <td class={status_class(wf.status)}>{wf.status.as_str()}</td>
                                                    <td>{wf.node_count()}</td>
                                                    <td>{format!("v{}", wf.version)}</td>
                                                    <td>
                                                        {wf.last_modified.format("%Y-%m-%d %H:%M").to_string()}
                                                        <br/><small class="muted">{format!("by {}", wf.created_by)}</small>
                                                    </td>
                                                    <td class="workflow-actions">
                                                        <a href=format!("/workflows/{id}") class="edit-btn">"Open Editor"</a>
                                                        <button
                                                            class="toggle-btn"
                                                            on:click=move |_| open_modal(Some(&for_edit))
                                                        >"Details"</button>
                                                        <button
                                                            class="delete-btn"
                                                            on:click=move |_| {
                                                                set_delete_error.set(None);
                                                                set_delete_target.set(Some((id, name.clone())));
                                                            }
                                                        >"Delete"</button>
                                                    </td>
                                                </tr>
                                            }
                                        }).collect_view()}
                                    </tbody>
                                </table>
                            }.into_any()
                        }
                        Err(e) => view! {
                            <p class="error">{format!("Failed to load workflows: {e}")}</p>
                        }.into_any(),
                    })
                }}
            </Suspense>

            {move || editing.get().map(|target| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>{if target.is_some() { "Workflow Details" } else { "New Workflow" }}</h2>
                        <SubmitError error=submit_error/>
                        <WorkflowForm draft=draft errors=errors/>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
                            <button
                                class="primary-btn"
                                on:click=on_save
                                disabled=move || saving.get()
                            >
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}

            {move || delete_target.get().map(|(_, name)| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>"Delete Workflow?"</h2>
                        <p>"Are you sure you want to delete \""{name}"\"?"</p>
                        <p class="warning">"This action cannot be undone."</p>
                        <SubmitError error=delete_error/>
                        <div class="modal-actions">
                            <button
                                class="secondary-btn"
                                on:click=move |_| set_delete_target.set(None)
                            >"Cancel"</button>
                            <button
                                class="danger-btn"
                                on:click=on_confirm_delete
                                disabled=move || deleting.get()
                            >
                                {move || if deleting.get() { "Deleting..." } else { "Delete" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}
        </div>
    }
}

/// Metadata fields of a workflow draft.
#[component]
fn WorkflowForm(draft: RwSignal<WorkflowDraft>, errors: ReadSignal<FieldErrors>) -> impl IntoView {
    view! {
        <div class="form-group">
            <label>"Name"</label>
            <input
                type="text"
                prop:value=move || draft.with(|d| d.name.clone())
                on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
            />
            <FieldMessage errors=errors field="name"/>
        </div>
        <div class="form-group">
            <label>"Description"</label>
            <textarea
                prop:value=move || draft.with(|d| d.description.clone())
                on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
            ></textarea>
        </div>
        <div class="form-group">
            <label>"Category"</label>
            <select on:change=move |ev| draft.update(|d| d.category = event_target_value(&ev).parse().ok())>
                <option value="" selected=move || draft.with(|d| d.category.is_none())>"Select a category"</option>
                {WorkflowCategory::ALL.into_iter().map(|c| view! {
                    <option
                        value=c.as_str()
                        selected=move || draft.with(|d| d.category == Some(c))
                    >{c.as_str()}</option>
                }).collect_view()}
            </select>
            <FieldMessage errors=errors field="category"/>
        </div>
        <div class="form-group">
            <label>"Status"</label>
            <select on:change=move |ev| {
                if let Ok(status) = event_target_value(&ev).parse() {
                    draft.update(|d| d.status = status);
                }
            }>
                {WorkflowStatus::ALL.into_iter().map(|s| view! {
                    <option
                        value=s.as_str()
                        selected=move || draft.with(|d| d.status == s)
                    >{s.as_str()}</option>
                }).collect_view()}
            </select>
        </div>
        <div class="form-group">
            <label>"Version"</label>
            <input
                type="number"
                min="1"
                prop:value=move || draft.with(|d| d.version.to_string())
                on:input=move |ev| {
                    let version = event_target_value(&ev).parse().unwrap_or(0);
                    draft.update(|d| d.version = version);
                }
            />
            <FieldMessage errors=errors field="version"/>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn workflows() -> Vec<Workflow> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        vec![
            Workflow::new("Sample Receipt", WorkflowCategory::SampleManagement, "admin", date),
            Workflow::new("Batch Release", WorkflowCategory::QualityAssurance, "admin", date),
            Workflow::new("Sample Disposal", WorkflowCategory::SampleManagement, "admin", date),
        ]
    }

    #[test]
    fn search_is_case_insensitive_on_name() {
        let all = workflows();
        let names: Vec<_> = matching(&all, " SAMPLE ", None).iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["Sample Receipt", "Sample Disposal"]);
    }

    #[test]
    fn category_narrows_the_list() {
        let all = workflows();
        let found = matching(&all, "", Some(WorkflowCategory::QualityAssurance));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Batch Release");
        assert!(matching(&all, "release", Some(WorkflowCategory::Training)).is_empty());
    }
}
