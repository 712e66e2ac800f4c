//! Custom field builder.
//!
//! Administrators pick a module page, add fields to it and place them on a
//! snapped grid. A preview pane renders the page the way a lab user would see
//! it and checks typed values against each field's rules.

use crate::pages::form::{FieldMessage, SubmitError, join_list, parse_optional, split_list};
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use pharma_lims_core::{FieldErrors, FieldId, ModulePageId};
use pharma_lims_custom_fields::{
    CustomField, FieldDraft, FieldPreview, FieldType, GRID_SIZE, GridRect, LIMS_MODULES,
    ModulePage, ModulePageDraft, PreviewControl,
};
use std::collections::BTreeSet;

#[server]
pub async fn list_pages() -> Result<Vec<ModulePage>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.pages.clone()).await)
}

#[server(input = Json)]
pub async fn create_page(draft: ModulePageDraft) -> Result<ModulePage, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_page(draft))
        .await
        .map_err(|report| store_error("create_page", report))
}

#[server(input = Json)]
pub async fn update_page(page_id: String, draft: ModulePageDraft) -> Result<ModulePage, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: ModulePageId = parse_id("page", &page_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_page(id, draft))
        .await
        .map_err(|report| store_error("update_page", report))
}

#[server]
pub async fn delete_page(page_id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: ModulePageId = parse_id("page", &page_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.delete_page(id))
        .await
        .map(|_| ())
        .map_err(|report| store_error("delete_page", report))
}

/// Server function to add a field below the page's existing fields.
#[server(input = Json)]
pub async fn add_field(page_id: String, draft: FieldDraft) -> Result<CustomField, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: ModulePageId = parse_id("page", &page_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.add_field(id, draft))
        .await
        .map_err(|report| store_error("add_field", report))
}

#[server(input = Json)]
pub async fn update_field(
    page_id: String,
    field_id: String,
    draft: FieldDraft,
) -> Result<CustomField, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let page: ModulePageId = parse_id("page", &page_id)?;
    let field: FieldId = parse_id("field", &field_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_field(page, field, draft))
        .await
        .map_err(|report| store_error("update_field", report))
}

/// Server function to move a field; returns the snapped box.
#[server]
pub async fn move_field(page_id: String, field_id: String, x: u32, y: u32) -> Result<GridRect, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let page: ModulePageId = parse_id("page", &page_id)?;
    let field: FieldId = parse_id("field", &field_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.move_field(page, field, x, y))
        .await
        .map_err(|report| store_error("move_field", report))
}

/// Server function to resize a field; returns the snapped box.
#[server]
pub async fn resize_field(
    page_id: String,
    field_id: String,
    width: u32,
    height: u32,
) -> Result<GridRect, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let page: ModulePageId = parse_id("page", &page_id)?;
    let field: FieldId = parse_id("field", &field_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.resize_field(page, field, width, height))
        .await
        .map_err(|report| store_error("resize_field", report))
}

#[server]
pub async fn remove_field(page_id: String, field_id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let page: ModulePageId = parse_id("page", &page_id)?;
    let field: FieldId = parse_id("field", &field_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.remove_field(page, field))
        .await
        .map(|_| ())
        .map_err(|report| store_error("remove_field", report))
}

type PagesResource = Resource<Result<Vec<ModulePage>, ServerFnError>>;

/// Which side of a field's box a layout input edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutEdit {
    X,
    Y,
    Width,
    Height,
}

/// Fields that share space with another field on the page.
fn overlapping_ids(page: &ModulePage) -> BTreeSet<FieldId> {
    page.overlapping_fields()
        .into_iter()
        .flat_map(|(a, b)| [a, b])
        .collect()
}

/// The preview the draft would produce once saved, if it has a type yet.
fn draft_preview(draft: &FieldDraft) -> Option<FieldPreview> {
    let field_type = draft.field_type?;
    let mut field = CustomField::new(draft.label.trim(), field_type);
    field.required = draft.required;
    field.placeholder = draft.placeholder.clone();
    field.help_text = draft.help_text.clone();
    field.options = draft.options.clone();
    Some(field.preview())
}

/// Canvas height that fits every field plus one spare row.
fn canvas_height(page: &ModulePage) -> u32 {
    page.next_free_row().max(GRID_SIZE * 10)
}

fn rect_style(rect: GridRect) -> String {
    format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        rect.x, rect.y, rect.width, rect.height
    )
}

/// Custom fields page: module pages on the left, builder on the right.
#[component]
pub fn CustomFieldsPage() -> impl IntoView {
    let pages = Resource::new(|| (), |_| list_pages());
    let selected = RwSignal::new(Option::<ModulePageId>::None);

    let editing = RwSignal::new(Option::<Option<ModulePageId>>::None);
    let draft = RwSignal::new(ModulePageDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);
    let deleting = RwSignal::new(Option::<ModulePage>::None);

    // Keep a page selected once any exist
    Effect::new(move || {
        if selected.get().is_none()
            && let Some(Ok(all)) = pages.get()
            && let Some(first) = all.first()
        {
            selected.set(Some(first.id));
        }
    });

    let open_modal = move |page: Option<&ModulePage>| {
        draft.set(page.map_or_else(ModulePageDraft::new, ModulePageDraft::from_page));
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        editing.set(Some(page.map(|p| p.id)));
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
                None => create_page(current).await,
                Some(id) => update_page(id.to_string(), current).await,
            };
            match result {
                Ok(page) => {
                    editing.set(None);
                    selected.set(Some(page.id));
                    pages.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    let on_delete = move |_| {
        let Some(page) = deleting.get() else {
            return;
        };
        spawn_local(async move {
            if delete_page(page.id.to_string()).await.is_ok() {
                if selected.get_untracked() == Some(page.id) {
                    selected.set(None);
                }
                deleting.set(None);
                pages.refetch();
            }
        });
    };

    view! {
        <div class="custom-fields-page">
            <header class="page-header">
                <h1>"Custom Fields"</h1>
                <button class="primary-btn" on:click=move |_| open_modal(None)>"New Page"</button>
            </header>

            <Suspense fallback=move || view! { <p>"Loading pages..."</p> }>
                {move || pages.get().map(|result| match result {
                    Ok(all) if all.is_empty() => view! {
                        <p class="empty-state">"No module pages yet. Create one to start adding fields."</p>
                    }.into_any(),
                    Ok(all) => {
                        let current = selected.get().and_then(|id| all.iter().find(|p| p.id == id).cloned());
                        view! {
                            <div class="builder-layout">
                                <aside class="page-list">
                                    <ul>
                                        {all.iter().map(|page| {
                                            let id = page.id;
                                            let for_edit = page.clone();
                                            let for_delete = page.clone();
                                            view! {
                                                <li class={move || if selected.get() == Some(id) { "selected" } else { "" }}>
                                                    <button class="link-btn" on:click=move |_| selected.set(Some(id))>
                                                        <strong>{page.name.clone()}</strong>
                                                        <small class="muted">{format!("{} · {} fields", page.module, page.fields.len())}</small>
                                                    </button>
                                                    <div class="workflow-actions">
                                                        <button class="link-btn" on:click=move |_| open_modal(Some(&for_edit))>"Edit"</button>
                                                        <button class="delete-btn" on:click=move |_| deleting.set(Some(for_delete.clone()))>"Delete"</button>
                                                    </div>
                                                </li>
                                            }
                                        }).collect_view()}
                                    </ul>
                                </aside>
                                {match current {
                                    Some(page) => view! { <PageBuilder page=page pages=pages/> }.into_any(),
                                    None => view! { <p class="empty-state">"Select a page."</p> }.into_any(),
                                }}
                            </div>
                        }.into_any()
                    }
                    Err(e) => view! {
                        <p class="error">{format!("Failed to load pages: {e}")}</p>
                    }.into_any(),
                })}
            </Suspense>

            {move || editing.get().map(|target| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>{if target.is_some() { "Edit Page" } else { "New Page" }}</h2>
                        <SubmitError error=submit_error/>
                        <label>
                            "Name"
                            <input
                                type="text"
                                prop:value=move || draft.with(|d| d.name.clone())
                                on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
                            />
                            <FieldMessage errors=errors field="name"/>
                        </label>
                        <label>
                            "Module"
                            <select
                                prop:value=move || draft.with(|d| d.module.clone())
                                on:change=move |ev| draft.update(|d| d.module = event_target_value(&ev))
                            >
                                <option value="">"Select a module"</option>
                                {LIMS_MODULES.iter().map(|m| view! { <option value=*m>{*m}</option> }).collect_view()}
                            </select>
                            <FieldMessage errors=errors field="module"/>
                        </label>
                        <label>
                            "Description"
                            <textarea
                                prop:value=move || draft.with(|d| d.description.clone())
                                on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                            ></textarea>
                        </label>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
                            <button class="primary-btn" on:click=on_save disabled={move || saving.get()}>
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}

            {move || deleting.get().map(|page| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>"Delete Page"</h2>
                        <p>{format!(
                            "Delete \"{}\" and its {} fields? This cannot be undone.",
                            page.name,
                            page.fields.len()
                        )}</p>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| deleting.set(None)>"Cancel"</button>
                            <button class="delete-btn" on:click=on_delete>"Delete"</button>
                        </div>
                    </div>
                </div>
            })}
        </div>
    }
}

/// Grid canvas, layout controls, field modal and preview for one page.
#[component]
fn PageBuilder(page: ModulePage, pages: PagesResource) -> impl IntoView {
    let page_id = page.id;
    let overlaps = overlapping_ids(&page);
    let focused = RwSignal::new(Option::<FieldId>::None);
    let (show_preview, set_show_preview) = signal(false);

    let editing = RwSignal::new(Option::<Option<FieldId>>::None);
    let draft = RwSignal::new(FieldDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);
    let (layout_message, set_layout_message) = signal(Option::<Result<String, String>>::None);

    let open_modal = move |field: Option<&CustomField>| {
        draft.set(field.map_or_else(FieldDraft::new, FieldDraft::from_field));
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        editing.set(Some(field.map(|f| f.id)));
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
                None => add_field(page_id.to_string(), current).await,
                Some(id) => update_field(page_id.to_string(), id.to_string(), current).await,
            };
            match result {
                Ok(field) => {
                    editing.set(None);
                    focused.set(Some(field.id));
                    pages.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    let on_remove = move |field_id: FieldId| {
        spawn_local(async move {
            if remove_field(page_id.to_string(), field_id.to_string()).await.is_ok() {
                focused.set(None);
                pages.refetch();
            }
        });
    };

    let commit_layout = move |field: CustomField, edit: LayoutEdit, value: u32| {
        let rect = field.rect;
        set_layout_message.set(None);
        spawn_local(async move {
            let (page, id) = (page_id.to_string(), field.id.to_string());
            let result = match edit {
                LayoutEdit::X => move_field(page, id, value, rect.y).await,
                LayoutEdit::Y => move_field(page, id, rect.x, value).await,
                LayoutEdit::Width => resize_field(page, id, value, rect.height).await,
                LayoutEdit::Height => resize_field(page, id, rect.width, value).await,
            };
            match result {
                Ok(snapped) => {
                    set_layout_message.set(Some(Ok(format!(
                        "{} snapped to ({}, {}) {}×{}",
                        field.label, snapped.x, snapped.y, snapped.width, snapped.height
                    ))));
                    pages.refetch();
                }
                Err(e) => set_layout_message.set(Some(Err(e.to_string()))),
            }
        });
    };

    let fields = page.fields.clone();
    let canvas_fields = fields.clone();
    let preview_fields = fields.clone();
    let overlap_count = overlaps.len();
    let height = canvas_height(&page);

    view! {
        <section class="page-builder">
            <div class="section-header">
                <div>
                    <h2>{page.name.clone()}</h2>
                    <p class="muted">{format!("{} module", page.module)}</p>
                    {(!page.description.is_empty()).then(|| view! { <p>{page.description.clone()}</p> })}
                </div>
                <div class="workflow-actions">
                    <button
                        class="secondary-btn"
                        on:click=move |_| set_show_preview.update(|shown| *shown = !*shown)
                    >
                        {move || if show_preview.get() { "Back to Builder" } else { "Preview" }}
                    </button>
                    <button class="primary-btn" on:click=move |_| open_modal(None)>"Add Field"</button>
                </div>
            </div>

            {(overlap_count > 0).then(|| view! {
                <p class="warning">{format!("{overlap_count} fields overlap another field.")}</p>
            })}
            {move || layout_message.get().map(|message| match message {
                Ok(text) => view! { <p class="success">{text}</p> }.into_any(),
                Err(text) => view! { <p class="error">{text}</p> }.into_any(),
            })}

            {move || if show_preview.get() {
                view! { <PagePreview fields=preview_fields.clone()/> }.into_any()
            } else {
                let overlaps = overlaps.clone();
                let fields = fields.clone();
                view! {
                    <div class="builder-body">
                        <div
                            class="field-canvas"
                            style=format!("height: {height}px; background-size: {GRID_SIZE}px {GRID_SIZE}px;")
                        >
                            {canvas_fields.iter().map(|field| {
                                let id = field.id;
                                let overlapping = overlaps.contains(&id);
                                view! {
                                    <div
                                        class={move || {
                                            let mut class = String::from("field-box");
                                            if overlapping {
                                                class.push_str(" overlapping");
                                            }
                                            if focused.get() == Some(id) {
                                                class.push_str(" selected");
                                            }
                                            class
                                        }}
                                        style=rect_style(field.rect)
                                        on:click=move |_| focused.set(Some(id))
                                    >
                                        <strong>{field.label.clone()}</strong>
                                        {field.required.then(|| view! { <span class="required">"*"</span> })}
                                        <small class="muted">{field.field_type.label()}</small>
                                    </div>
                                }
                            }).collect_view()}
                        </div>

                        {move || {
                            let field = focused.get().and_then(|id| fields.iter().find(|f| f.id == id).cloned());
                            match field {
                                Some(field) => view! {
                                    <FieldLayoutPanel
                                        field=field
                                        on_layout=commit_layout
                                        on_edit=move |f: CustomField| open_modal(Some(&f))
                                        on_remove=on_remove
                                    />
                                }.into_any(),
                                None => view! {
                                    <p class="muted">"Click a field to adjust its position and size."</p>
                                }.into_any(),
                            }
                        }}
                    </div>
                }.into_any()
            }}

            {move || editing.get().map(|target| view! {
                <div class="modal-overlay">
                    <div class="modal wide">
                        <h2>{if target.is_some() { "Edit Field" } else { "Add Field" }}</h2>
                        <SubmitError error=submit_error/>
                        <FieldForm draft=draft errors=errors/>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
                            <button class="primary-btn" on:click=on_save disabled={move || saving.get()}>
                                {move || if saving.get() { "Saving..." } else { "Save Field" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}
        </section>
    }
}

/// Numeric position and size inputs for the focused field.
#[component]
fn FieldLayoutPanel(
    field: CustomField,
    on_layout: impl Fn(CustomField, LayoutEdit, u32) + Copy + 'static,
    on_edit: impl Fn(CustomField) + Copy + 'static,
    on_remove: impl Fn(FieldId) + Copy + 'static,
) -> impl IntoView {
    let rect = field.rect;
    let id = field.id;
    let input = move |label: &'static str, edit: LayoutEdit, value: u32, field: CustomField| {
        view! {
            <label>
                {label}
                <input
                    type="number"
                    min="0"
                    step=GRID_SIZE
                    value=value
                    on:change=move |ev| {
                        if let Some(value) = parse_optional::<u32>(&event_target_value(&ev)) {
                            on_layout(field.clone(), edit, value);
                        }
                    }
                />
            </label>
        }
    };

    let for_edit = field.clone();
    view! {
        <aside class="node-panel">
            <h3>{field.label.clone()}</h3>
            <p class="muted">{format!("{} · key {}", field.field_type.label(), field.key)}</p>
            <div class="layout-grid">
                {input("X", LayoutEdit::X, rect.x, field.clone())}
                {input("Y", LayoutEdit::Y, rect.y, field.clone())}
                {input("Width", LayoutEdit::Width, rect.width, field.clone())}
                {input("Height", LayoutEdit::Height, rect.height, field.clone())}
            </div>
            <p class="muted">{format!("Values snap to the {GRID_SIZE}px grid.")}</p>
            <div class="workflow-actions">
                <button class="link-btn" on:click=move |_| on_edit(for_edit.clone())>"Edit Field"</button>
                <button class="delete-btn" on:click=move |_| on_remove(id)>"Remove"</button>
            </div>
        </aside>
    }
}

/// Field definition inputs plus a live preview of the control.
#[component]
fn FieldForm(draft: RwSignal<FieldDraft>, errors: ReadSignal<FieldErrors>) -> impl IntoView {
    let field_type = move || draft.with(|d| d.field_type);

    view! {
        <div class="field-form">
            <div class="form-columns">
                <div>
                    <label>
                        "Label"
                        <input
                            type="text"
                            prop:value=move || draft.with(|d| d.label.clone())
                            on:input=move |ev| draft.update(|d| d.label = event_target_value(&ev))
                        />
                        <FieldMessage errors=errors field="label"/>
                    </label>
                    <label>
                        "Key"
                        <input
                            type="text"
                            prop:value=move || draft.with(|d| d.key.clone())
                            placeholder={move || draft.with(FieldDraft::effective_key)}
                            on:input=move |ev| draft.update(|d| d.key = event_target_value(&ev))
                        />
                        <FieldMessage errors=errors field="key"/>
                    </label>
                    <label>
                        "Type"
                        <select
                            prop:value=move || field_type().map(FieldType::as_str).unwrap_or_default()
                            on:change=move |ev| draft.update(|d| d.field_type = event_target_value(&ev).parse().ok())
                        >
                            <option value="">"Select a type"</option>
                            {FieldType::ALL.iter().map(|t| view! { <option value=t.as_str()>{t.label()}</option> }).collect_view()}
                        </select>
                        <FieldMessage errors=errors field="field_type"/>
                    </label>
                    <label class="checkbox-label">
                        <input
                            type="checkbox"
                            prop:checked=move || draft.with(|d| d.required)
                            on:change=move |ev| draft.update(|d| d.required = event_target_checked(&ev))
                        />
                        "Required"
                    </label>
                    <label>
                        "Placeholder"
                        <input
                            type="text"
                            prop:value=move || draft.with(|d| d.placeholder.clone())
                            on:input=move |ev| draft.update(|d| d.placeholder = event_target_value(&ev))
                        />
                    </label>
                    <label>
                        "Help Text"
                        <input
                            type="text"
                            prop:value=move || draft.with(|d| d.help_text.clone())
                            on:input=move |ev| draft.update(|d| d.help_text = event_target_value(&ev))
                        />
                    </label>
                    {move || field_type().filter(|t| t.uses_options()).map(|_| view! {
                        <label>
                            "Options (comma-separated)"
                            <input
                                type="text"
                                prop:value=move || draft.with(|d| join_list(&d.options))
                                on:change=move |ev| draft.update(|d| d.options = split_list(&event_target_value(&ev)))
                            />
                        </label>
                    })}
                </div>

                <div>
                    <fieldset>
                        <legend>"Validation"</legend>
                        {move || (field_type() == Some(FieldType::Number)).then(|| view! {
                            <label>
                                "Minimum"
                                <input
                                    type="number"
                                    prop:value=move || draft.with(|d| d.validation.min.map(|v| v.to_string()).unwrap_or_default())
                                    on:change=move |ev| draft.update(|d| d.validation.min = parse_optional(&event_target_value(&ev)))
                                />
                            </label>
                            <label>
                                "Maximum"
                                <input
                                    type="number"
                                    prop:value=move || draft.with(|d| d.validation.max.map(|v| v.to_string()).unwrap_or_default())
                                    on:change=move |ev| draft.update(|d| d.validation.max = parse_optional(&event_target_value(&ev)))
                                />
                                <FieldMessage errors=errors field="validation.max"/>
                            </label>
                        })}
                        {move || field_type().filter(|t| t.is_textual()).map(|_| view! {
                            <label>
                                "Minimum Length"
                                <input
                                    type="number"
                                    min="0"
                                    prop:value=move || draft.with(|d| d.validation.min_length.map(|v| v.to_string()).unwrap_or_default())
                                    on:change=move |ev| draft.update(|d| d.validation.min_length = parse_optional(&event_target_value(&ev)))
                                />
                            </label>
                            <label>
                                "Maximum Length"
                                <input
                                    type="number"
                                    min="0"
                                    prop:value=move || draft.with(|d| d.validation.max_length.map(|v| v.to_string()).unwrap_or_default())
                                    on:change=move |ev| draft.update(|d| d.validation.max_length = parse_optional(&event_target_value(&ev)))
                                />
                                <FieldMessage errors=errors field="validation.max_length"/>
                            </label>
                            <label>
                                "Pattern"
                                <input
                                    type="text"
                                    prop:value=move || draft.with(|d| d.validation.pattern.clone().unwrap_or_default())
                                    on:input=move |ev| {
                                        let raw = event_target_value(&ev);
                                        draft.update(|d| d.validation.pattern = (!raw.is_empty()).then_some(raw));
                                    }
                                />
                                <FieldMessage errors=errors field="validation.pattern"/>
                            </label>
                        })}
                    </fieldset>
                    <fieldset>
                        <legend>"Size"</legend>
                        <label>
                            "Width"
                            <input
                                type="number"
                                step=GRID_SIZE
                                prop:value=move || draft.with(|d| d.width.to_string())
                                on:change=move |ev| {
                                    if let Some(width) = parse_optional(&event_target_value(&ev)) {
                                        draft.update(|d| d.width = width);
                                    }
                                }
                            />
                        </label>
                        <label>
                            "Height"
                            <input
                                type="number"
                                step=GRID_SIZE
                                prop:value=move || draft.with(|d| d.height.to_string())
                                on:change=move |ev| {
                                    if let Some(height) = parse_optional(&event_target_value(&ev)) {
                                        draft.update(|d| d.height = height);
                                    }
                                }
                            />
                        </label>
                    </fieldset>
                </div>
            </div>

            <div class="template-preview">
                <h3>"Preview"</h3>
                {move || match draft.with(draft_preview) {
                    Some(preview) => view! { <PreviewFieldBody preview=preview/> }.into_any(),
                    None => view! { <p class="muted">"Choose a type to preview the field."</p> }.into_any(),
                }}
            </div>
        </div>
    }
}

/// The page as a lab user would fill it in, with value checks.
#[component]
fn PagePreview(fields: Vec<CustomField>) -> impl IntoView {
    if fields.is_empty() {
        return view! { <p class="empty-state">"This page has no fields yet."</p> }.into_any();
    }
    let mut ordered = fields;
    ordered.sort_by_key(|f| (f.rect.y, f.rect.x));
    view! {
        <form class="page-preview" on:submit=|ev| ev.prevent_default()>
            {ordered.into_iter().map(|field| view! { <PreviewField field=field/> }).collect_view()}
        </form>
    }
    .into_any()
}

/// One previewed field that checks what is typed into it.
#[component]
fn PreviewField(field: CustomField) -> impl IntoView {
    let (message, set_message) = signal(Option::<String>::None);
    let preview = field.preview();
    let check = move |value: String| set_message.set(field.check_value(&value).err());

    view! {
        <div class="preview-field">
            <PreviewFieldBody preview=preview on_value=Callback::new(check)/>
            {move || message.get().map(|m| view! { <span class="field-error">{m}</span> })}
        </div>
    }
}

/// Label, control and help text for a preview.
#[component]
fn PreviewFieldBody(preview: FieldPreview, #[prop(optional)] on_value: Option<Callback<String>>) -> impl IntoView {
    let emit = move |value: String| {
        if let Some(callback) = on_value {
            callback.run(value);
        }
    };

    let control = match preview.control {
        PreviewControl::Input { input_type, placeholder } => view! {
            <input
                type=input_type
                placeholder=placeholder
                on:change=move |ev| emit(event_target_value(&ev))
            />
        }
        .into_any(),
        PreviewControl::TextArea { placeholder, rich } => view! {
            <div class={if rich { "rich-text" } else { "" }}>
                {rich.then(|| view! {
                    <div class="rich-toolbar"><b>"B"</b><i>"I"</i><u>"U"</u></div>
                })}
                <textarea placeholder=placeholder on:change=move |ev| emit(event_target_value(&ev))></textarea>
            </div>
        }
        .into_any(),
        control @ PreviewControl::Select { .. } => {
            let multiple = matches!(control, PreviewControl::Select { multiple: true, .. });
            let options: Vec<String> = control.rendered_options().into_iter().map(str::to_string).collect();
            view! {
                <select multiple=multiple on:change=move |ev| emit(event_target_value(&ev))>
                    {options.into_iter().enumerate().map(|(i, option)| {
                        // The first option is the placeholder and submits nothing
                        let value = if i == 0 { String::new() } else { option.clone() };
                        view! { <option value=value>{option}</option> }
                    }).collect_view()}
                </select>
            }
            .into_any()
        }
        PreviewControl::RadioGroup { options } => {
            let group = format!("preview-{}", preview.label);
            view! {
                <div class="radio-group">
                    {options.into_iter().map(|option| {
                        let value = option.clone();
                        view! {
                            <label class="checkbox-label">
                                <input
                                    type="radio"
                                    name=group.clone()
                                    value=option.clone()
                                    on:change=move |_| emit(value.clone())
                                />
                                {option}
                            </label>
                        }
                    }).collect_view()}
                </div>
            }
            .into_any()
        }
        PreviewControl::Checkbox => view! { <input type="checkbox"/> }.into_any(),
        PreviewControl::Toggle => view! {
            <label class="toggle"><input type="checkbox"/><span class="toggle-slider"></span></label>
        }
        .into_any(),
        PreviewControl::FileUpload => view! { <input type="file"/> }.into_any(),
        PreviewControl::SignaturePad => view! {
            <div class="signature-pad">"Sign here"</div>
        }
        .into_any(),
        PreviewControl::Barcode { placeholder } => view! {
            <div class="barcode-input">
                <input type="text" placeholder=placeholder on:change=move |ev| emit(event_target_value(&ev))/>
                <button type="button" class="secondary-btn">"Scan"</button>
            </div>
        }
        .into_any(),
    };

    view! {
        <label class="preview-label">
            {preview.label}
            {preview.required.then(|| view! { <span class="required">" *"</span> })}
        </label>
        {control}
        {preview.help_text.map(|text| view! { <small class="muted">{text}</small> })}
    }
}
