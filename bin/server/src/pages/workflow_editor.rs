//! Workflow editor page module.
//!
//! Provides the visual canvas editor for a workflow's graph and a details
//! tab. Edits stay in the browser until the user saves.

mod editor;

use crate::app::get_client_settings;
use crate::types::ClientSettings;
use editor::EditorTabContent;
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use leptos::wasm_bindgen::JsCast;
use leptos_router::{hooks::use_params, params::Params};
use pharma_lims_core::WorkflowId;
use pharma_lims_workflow::{
    CanvasEditor, DEFAULT_HISTORY_LIMIT, EditorCommand, KeyChord, SavedGraph, Workflow,
};

/// URL params for workflow editor.
#[derive(Params, PartialEq, Clone, Debug)]
struct WorkflowParams {
    id: Option<String>,
}

/// Server function to load one workflow for editing.
#[server]
pub async fn get_workflow(workflow_id: String) -> Result<Workflow, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: WorkflowId = parse_id("workflow", &workflow_id)?;
    let store = get_store().await?;
    store
        .read(|data| data.workflow(id).cloned())
        .await
        .map_err(|report| store_error("get_workflow", report))
}

/// Server function to replace a workflow's graph with the editor's.
#[server(input = Json)]
pub async fn save_workflow_graph(
    workflow_id: String,
    graph: SavedGraph,
) -> Result<Workflow, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: WorkflowId = parse_id("workflow", &workflow_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.save_workflow_graph(id, graph))
        .await
        .map_err(|report| store_error("save_workflow_graph", report))
}

/// Which editor tab is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditorTab {
    Canvas,
    Details,
}

/// True for elements that keep their own undo while focused.
fn is_text_entry(tag_name: &str) -> bool {
    ["input", "textarea", "select"]
        .iter()
        .any(|tag| tag_name.eq_ignore_ascii_case(tag))
}

/// The history limit to open the editor with.
fn history_limit(settings: Result<ClientSettings, ServerFnError>) -> usize {
    settings.map_or(DEFAULT_HISTORY_LIMIT, |settings| settings.history_limit)
}

/// Maps a browser key event onto an editor command.
///
/// Keys typed into form controls are left to the browser.
fn command_for(ev: &leptos::ev::KeyboardEvent) -> Option<EditorCommand> {
    if let Some(target) = ev.target() {
        let element: leptos::web_sys::Element = target.unchecked_into();
        if is_text_entry(&element.tag_name()) {
            return None;
        }
    }
    let chord = KeyChord {
        key: ev.key(),
        ctrl: ev.ctrl_key(),
        meta: ev.meta_key(),
        shift: ev.shift_key(),
    };
    EditorCommand::from_chord(&chord)
}

/// Workflow editor page.
#[component]
pub fn WorkflowEditorPage() -> impl IntoView {
    let params = use_params::<WorkflowParams>();
    let workflow_id = Signal::derive(move || params.get().ok().and_then(|p| p.id));

    // Settings load with the workflow; the editor opens once per id
    let workflow = Resource::new(
        move || workflow_id.get(),
        |id| async move {
            let wf = get_workflow(id?).await.ok()?;
            let limit = history_limit(get_client_settings().await);
            Some((wf, limit))
        },
    );

    let editor = RwSignal::new(CanvasEditor::for_new_workflow());
    let (saving, set_saving) = signal(false);
    let (save_message, set_save_message) = signal(Option::<Result<String, String>>::None);
    let (active_tab, set_active_tab) = signal(EditorTab::Canvas);

    // Open the editor over the loaded graph
    Effect::new(move || {
        if let Some(Some((wf, limit))) = workflow.get() {
            editor.set(wf.editor(limit));
        }
    });

    let handle = window_event_listener(leptos::ev::keydown, move |ev| {
        if let Some(command) = command_for(&ev) {
            ev.prevent_default();
            editor.update(|e| {
                e.execute(command);
            });
        }
    });
    on_cleanup(move || handle.remove());

    let on_save = move |_| {
        let Some(wf_id) = workflow_id.get() else {
            return;
        };
        let graph = editor.with(CanvasEditor::save);
        set_saving.set(true);
        set_save_message.set(None);
        spawn_local(async move {
            match save_workflow_graph(wf_id, graph).await {
                Ok(saved) => set_save_message.set(Some(Ok(format!(
                    "Saved {} steps at {}",
                    saved.node_count(),
                    saved.last_modified.format("%H:%M:%S")
                )))),
                Err(e) => set_save_message.set(Some(Err(e.to_string()))),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="workflow-editor-page">
            <Suspense fallback=move || view! { <p>"Loading workflow..."</p> }>
                {move || {
                    match workflow.get() {
                        Some(Some((wf, _))) => {
                            let wf_name = wf.name.clone();
                            view! {
                                <div class="workflow-editor">
                                    <EditorHeader
                                        wf_name=wf_name
                                        saving=saving
                                        on_save=on_save
                                    />
                                    {move || save_message.get().map(|message| match message {
                                        Ok(text) => view! { <p class="success">{text}</p> }.into_any(),
                                        Err(text) => view! { <p class="error">{text}</p> }.into_any(),
                                    })}

                                    <EditorTabs
                                        active_tab=active_tab
                                        set_active_tab=set_active_tab
                                    />

                                    {move || (active_tab.get() == EditorTab::Canvas).then(|| view! {
                                        <EditorTabContent editor=editor/>
                                    })}

                                    {move || (active_tab.get() == EditorTab::Details).then(|| view! {
                                        <DetailsTabContent workflow=wf.clone() editor=editor/>
                                    })}
                                </div>
                            }.into_any()
                        },
                        Some(None) => view! {
                            <div class="not-found">
                                <h1>"Workflow Not Found"</h1>
                                <p>"The workflow you're looking for doesn't exist."</p>
                                <a href="/workflows">"Back to Workflows"</a>
                            </div>
                        }.into_any(),
                        None => view! { <p>"Loading..."</p> }.into_any(),
                    }
                }}
            </Suspense>
        </div>
    }
}

/// Editor header with title and save button.
#[component]
fn EditorHeader(
    wf_name: String,
    saving: ReadSignal<bool>,
    on_save: impl Fn(leptos::web_sys::MouseEvent) + 'static,
) -> impl IntoView {
    view! {
        <header class="editor-header">
            <a href="/workflows" class="back-link">"← Back to Workflows"</a>
            <h1>{wf_name}</h1>
            <button
                class="save-btn primary-btn"
                on:click=on_save
                disabled=move || saving.get()
            >
                {move || if saving.get() { "Saving..." } else { "Save Workflow" }}
            </button>
        </header>
    }
}

/// Tab navigation for the editor.
#[component]
fn EditorTabs(active_tab: ReadSignal<EditorTab>, set_active_tab: WriteSignal<EditorTab>) -> impl IntoView {
    let tab = move |tab: EditorTab, label: &'static str| {
        view! {
            <button
                class=move || if active_tab.get() == tab { "tab active" } else { "tab" }
                on:click=move |_| set_active_tab.set(tab)
            >{label}</button>
        }
    };

    view! {
        <div class="editor-tabs">
            {tab(EditorTab::Canvas, "Canvas")}
            {tab(EditorTab::Details, "Details")}
        </div>
    }
}

/// Read-only metadata plus the live graph summary.
#[component]
fn DetailsTabContent(workflow: Workflow, editor: RwSignal<CanvasEditor>) -> impl IntoView {
    view! {
        <div class="settings-content">
            <dl class="details-list">
                <dt>"Category"</dt>
                <dd>{workflow.category.as_str()}</dd>
                <dt>"Status"</dt>
                <dd>{workflow.status.as_str()}</dd>
                <dt>"Version"</dt>
                <dd>{format!("v{}", workflow.version)}</dd>
                <dt>"Created"</dt>
                <dd>{format!(
                    "{} by {}",
                    workflow.created_date.format("%Y-%m-%d"),
                    workflow.created_by
                )}</dd>
                <dt>"Last Saved"</dt>
                <dd>{workflow.last_modified.format("%Y-%m-%d %H:%M").to_string()}</dd>
                <dt>"Description"</dt>
                <dd>{if workflow.description.is_empty() {
                    "No description".to_string()
                } else {
                    workflow.description.clone()
                }}</dd>
                <dt>"Graph"</dt>
                <dd>{move || editor.with(|e| format!(
                    "{} steps, {} connections",
                    e.nodes().len(),
                    e.edges().len()
                ))}</dd>
                <dt>"History"</dt>
                <dd>{move || editor.with(|e| format!(
                    "step {} of {}",
                    e.history_index() + 1,
                    e.history_len()
                ))}</dd>
            </dl>
            <p class="muted">"Edit name, category and status from the workflows list."</p>
        </div>
    }
}
