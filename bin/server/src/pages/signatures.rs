//! Digital signature templates and documents.

use crate::pages::form::{FieldMessage, SubmitError};
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use pharma_lims_core::{DocumentId, FieldErrors, SignatureTemplateId, SignerId};
use pharma_lims_signatures::{
    DocumentDraft, DocumentStatus, SignatureDocument, SignatureMeaning, SignatureTemplate,
    SignatureTemplateDraft, SignerDraft, SignerStatus, TemplateStatus,
};

const TEMPLATE_STATUSES: [TemplateStatus; 2] = [TemplateStatus::Active, TemplateStatus::Inactive];

/// Server function to list signature templates.
#[server]
pub async fn list_signature_templates() -> Result<Vec<SignatureTemplate>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.signature_templates.clone()).await)
}

/// Server function to list documents routed for signature.
#[server]
pub async fn list_documents() -> Result<Vec<SignatureDocument>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.documents.clone()).await)
}

#[server(input = Json)]
pub async fn create_signature_template(
    draft: SignatureTemplateDraft,
) -> Result<SignatureTemplate, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_signature_template(draft))
        .await
        .map_err(|report| store_error("create_signature_template", report))
}

#[server(input = Json)]
pub async fn update_signature_template(
    template_id: String,
    draft: SignatureTemplateDraft,
) -> Result<SignatureTemplate, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: SignatureTemplateId = parse_id("signature template", &template_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_signature_template(id, draft))
        .await
        .map_err(|report| store_error("update_signature_template", report))
}

#[server]
pub async fn toggle_signature_template(template_id: String) -> Result<TemplateStatus, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: SignatureTemplateId = parse_id("signature template", &template_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.toggle_signature_template(id))
        .await
        .map_err(|report| store_error("toggle_signature_template", report))
}

/// Server function to route a new document for signature.
#[server(input = Json)]
pub async fn create_document(draft: DocumentDraft) -> Result<SignatureDocument, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_document(draft))
        .await
        .map_err(|report| store_error("create_document", report))
}

/// Server function to sign or reject on behalf of one signer.
#[server(input = Json)]
pub async fn decide_signature(
    document_id: String,
    signer_id: String,
    approve: bool,
    comment: Option<String>,
) -> Result<DocumentStatus, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let document: DocumentId = parse_id("document", &document_id)?;
    let signer: SignerId = parse_id("signer", &signer_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.decide_signature(document, signer, approve, comment))
        .await
        .map_err(|report| store_error("decide_signature", report))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SignaturesTab {
    Templates,
    Documents,
}

/// A pending sign or reject action awaiting its comment.
#[derive(Clone, Debug, PartialEq)]
struct Decision {
    document_id: DocumentId,
    signer_id: SignerId,
    signer_name: String,
    approve: bool,
}

fn document_status_class(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Completed => "status-enabled",
        DocumentStatus::Pending => "status-draft",
        DocumentStatus::Rejected => "status-disabled",
    }
}

/// Name of the template a document was routed with.
fn template_name(templates: &[SignatureTemplate], id: SignatureTemplateId) -> String {
    templates
        .iter()
        .find(|t| t.id == id)
        .map_or_else(|| "Unknown template".to_string(), |t| t.name.clone())
}

/// Digital signatures page.
#[component]
pub fn SignaturesPage() -> impl IntoView {
    let templates = Resource::new(|| (), |_| list_signature_templates());
    let documents = Resource::new(|| (), |_| list_documents());
    let (active_tab, set_active_tab) = signal(SignaturesTab::Templates);

    view! {
        <div class="signatures-page">
            <header class="page-header">
                <h1>"Digital Signatures"</h1>
            </header>
            <div class="editor-tabs">
                <button
                    class=move || if active_tab.get() == SignaturesTab::Templates { "tab active" } else { "tab" }
                    on:click=move |_| set_active_tab.set(SignaturesTab::Templates)
                >"Templates"</button>
                <button
                    class=move || if active_tab.get() == SignaturesTab::Documents { "tab active" } else { "tab" }
                    on:click=move |_| set_active_tab.set(SignaturesTab::Documents)
                >"Documents"</button>
            </div>

            {move || match active_tab.get() {
                SignaturesTab::Templates => view! { <TemplatesTab templates=templates/> }.into_any(),
                SignaturesTab::Documents => view! {
                    <DocumentsTab templates=templates documents=documents/>
                }.into_any(),
            }}
        </div>
    }
}

type TemplatesResource = Resource<Result<Vec<SignatureTemplate>, ServerFnError>>;

/// Template list with create/edit modal.
#[component]
fn TemplatesTab(templates: TemplatesResource) -> impl IntoView {
    let editing = RwSignal::new(Option::<Option<SignatureTemplateId>>::None);
    let draft = RwSignal::new(SignatureTemplateDraft::new());
    let (new_role, set_new_role) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let open_modal = move |template: Option<&SignatureTemplate>| {
        draft.set(template.map_or_else(
            SignatureTemplateDraft::new,
            SignatureTemplateDraft::from_template,
        ));
        set_new_role.set(String::new());
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        editing.set(Some(template.map(|t| t.id)));
    };

    let add_role = move || {
        let role = new_role.get_untracked();
        let mut added = false;
        draft.update(|d| added = d.add_signer_role(&role));
        if added {
            set_new_role.set(String::new());
        }
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
                None => create_signature_template(current).await,
                Some(id) => update_signature_template(id.to_string(), current).await,
            };
            match result {
                Ok(_) => {
                    editing.set(None);
                    templates.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    view! {
        <section class="templates-tab">
            <div class="section-actions">
                <button class="primary-btn" on:click=move |_| open_modal(None)>"New Template"</button>
            </div>
            <Suspense fallback=move || view! { <p>"Loading templates..."</p> }>
                {move || templates.get().map(|result| match result {
                    Ok(items) if items.is_empty() => view! {
                        <p class="empty-state">"No signature templates yet."</p>
                    }.into_any(),
                    Ok(items) => view! {
                        <table class="workflows-table">
                            <thead>
                                <tr>
                                    <th>"Name"</th>
                                    <th>"Meaning"</th>
                                    <th>"Signer Roles"</th>
                                    <th>"Status"</th>
                                    <th>"Created"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {items.into_iter().map(|t| {
                                    let id = t.id;
                                    let active = t.is_active();
                                    let for_edit = t.clone();
                                    view! {
                                        <tr>
                                            <td>
                                                <strong>{t.name.clone()}</strong>
                                                {(!t.description.is_empty()).then(|| view! {
                                                    <br/><small>{t.description.clone()}</small>
                                                })}
                                            </td>
                                            <td title=t.meaning.statement()>{t.meaning.as_str()}</td>
                                            <td>{t.signer_roles.join(" → ")}</td>
                                            <td class={if active { "status-enabled" } else { "status-disabled" }}>
                                                {t.status.as_str()}
                                            </td>
                                            <td>{format!("{} by {}", t.created_date.format("%Y-%m-%d"), t.created_by)}</td>
                                            <td class="workflow-actions">
                                                <button class="edit-btn" on:click=move |_| open_modal(Some(&for_edit))>"Edit"</button>
                                                <button
                                                    class="toggle-btn"
                                                    on:click=move |_| {
                                                        spawn_local(async move {
                                                            if toggle_signature_template(id.to_string()).await.is_ok() {
                                                                templates.refetch();
                                                            }
                                                        });
                                                    }
                                                >{if active { "Deactivate" } else { "Activate" }}</button>
                                            </td>
                                        </tr>
                                    }
                                }).collect_view()}
                            </tbody>
                        </table>
                    }.into_any(),
                    Err(e) => view! {
                        <p class="error">{format!("Failed to load templates: {e}")}</p>
                    }.into_any(),
                })}
            </Suspense>

            {move || editing.get().map(|target| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>{if target.is_some() { "Edit Template" } else { "New Template" }}</h2>
                        <SubmitError error=submit_error/>
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
                            <label>"Signature Meaning"</label>
                            <select on:change=move |ev| draft.update(|d| d.meaning = event_target_value(&ev).parse().ok())>
                                <option value="" selected=move || draft.with(|d| d.meaning.is_none())>"Select a meaning"</option>
                                {SignatureMeaning::ALL.into_iter().map(|m| view! {
                                    <option
                                        value=m.as_str()
                                        selected=move || draft.with(|d| d.meaning == Some(m))
                                    >{m.as_str()}</option>
                                }).collect_view()}
                            </select>
                            {move || draft.with(|d| d.meaning).map(|m| view! {
                                <small class="muted">{format!("\"{}\"", m.statement())}</small>
                            })}
                            <FieldMessage errors=errors field="meaning"/>
                        </div>
                        <div class="form-group">
                            <label>"Signer Roles (in order)"</label>
                            <ol class="role-list">
                                {move || draft.with(|d| d.signer_roles.clone()).into_iter().enumerate().map(|(i, role)| view! {
                                    <li>
                                        {role}
                                        <button
                                            class="link-btn"
                                            on:click=move |_| draft.update(|d| d.remove_signer_role(i))
                                        >"Remove"</button>
                                    </li>
                                }).collect_view()}
                            </ol>
                            <div class="inline-form">
                                <input
                                    type="text"
                                    placeholder="e.g. QA Manager"
                                    prop:value=move || new_role.get()
                                    on:input=move |ev| set_new_role.set(event_target_value(&ev))
                                    on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                                        if ev.key() == "Enter" {
                                            ev.prevent_default();
                                            add_role();
                                        }
                                    }
                                />
                                <button class="secondary-btn" on:click=move |_| add_role()>"Add Role"</button>
                            </div>
                            <FieldMessage errors=errors field="signer_roles"/>
                        </div>
                        <div class="form-group">
                            <label>"Status"</label>
                            <select on:change=move |ev| {
                                let value = event_target_value(&ev);
                                if let Some(status) = TEMPLATE_STATUSES.into_iter().find(|s| s.as_str() == value) {
                                    draft.update(|d| d.status = status);
                                }
                            }>
                                {TEMPLATE_STATUSES.into_iter().map(|s| view! {
                                    <option
                                        value=s.as_str()
                                        selected=move || draft.with(|d| d.status == s)
                                    >{s.as_str()}</option>
                                }).collect_view()}
                            </select>
                        </div>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
                            <button class="primary-btn" on:click=on_save disabled=move || saving.get()>
                                {move || if saving.get() { "Saving..." } else { "Save Template" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}
        </section>
    }
}

/// Documents with signer progress, signing actions and the create modal.
#[component]
fn DocumentsTab(
    templates: TemplatesResource,
    documents: Resource<Result<Vec<SignatureDocument>, ServerFnError>>,
) -> impl IntoView {
    let creating = RwSignal::new(false);
    let draft = RwSignal::new(DocumentDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let decision = RwSignal::new(Option::<Decision>::None);
    let (comment, set_comment) = signal(String::new());
    let (decision_error, set_decision_error) = signal(Option::<String>::None);

    let all_templates = move || {
        templates
            .get()
            .and_then(Result::ok)
            .unwrap_or_default()
    };

    let open_create = move |_| {
        draft.set(DocumentDraft::new());
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        creating.set(true);
    };

    let on_create = move |_| {
        let current = draft.get();
        let found = current.validate();
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_saving.set(true);
        spawn_local(async move {
            match create_document(current).await {
                Ok(_) => {
                    creating.set(false);
                    documents.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    let open_decision = move |pending: Decision| {
        set_comment.set(String::new());
        set_decision_error.set(None);
        decision.set(Some(pending));
    };

    let on_decide = move |_| {
        let Some(pending) = decision.get() else {
            return;
        };
        let note = comment.get();
        let note = (!note.trim().is_empty()).then(|| note.trim().to_string());
        spawn_local(async move {
            match decide_signature(
                pending.document_id.to_string(),
                pending.signer_id.to_string(),
                pending.approve,
                note,
            )
            .await
            {
                Ok(_) => {
                    decision.set(None);
                    documents.refetch();
                }
                Err(e) => set_decision_error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <section class="documents-tab">
            <div class="section-actions">
                <button class="primary-btn" on:click=open_create>"New Document"</button>
            </div>
            <Suspense fallback=move || view! { <p>"Loading documents..."</p> }>
                {move || documents.get().map(|result| match result {
                    Ok(items) if items.is_empty() => view! {
                        <p class="empty-state">"No documents routed for signature."</p>
                    }.into_any(),
                    Ok(items) => {
                        let known = all_templates();
                        items.into_iter().map(|doc| {
                            let status = doc.status();
                            let (signed, total) = doc.progress();
                            let document_id = doc.id;
                            view! {
                                <article class="document-card">
                                    <header>
                                        <h3>{doc.title.clone()}</h3>
                                        <span class={document_status_class(status)}>{status.as_str()}</span>
                                    </header>
                                    <p class="muted">{format!(
                                        "{} · created {} by {}",
                                        template_name(&known, doc.template_id),
                                        doc.created_date.format("%Y-%m-%d"),
                                        doc.created_by
                                    )}</p>
                                    {(!doc.description.is_empty()).then(|| view! { <p>{doc.description.clone()}</p> })}
                                    <progress max=total.to_string() value=signed.to_string()></progress>
                                    <span>{format!(" {signed} of {total} signed")}</span>
                                    <table class="workflows-table signer-table">
                                        <thead>
                                            <tr>
                                                <th>"#"</th>
                                                <th>"Signer"</th>
                                                <th>"Role"</th>
                                                <th>"Status"</th>
                                                <th>"Decided"</th>
                                                <th>"Comment"</th>
                                                <th></th>
                                            </tr>
                                        </thead>
                                        <tbody>
                                            {doc.signers.iter().map(|signer| {
                                                let pending = signer.status == SignerStatus::Pending;
                                                let sign = Decision {
                                                    document_id,
                                                    signer_id: signer.id,
                                                    signer_name: signer.name.clone(),
                                                    approve: true,
                                                };
                                                let reject = Decision { approve: false, ..sign.clone() };
                                                view! {
                                                    <tr>
                                                        <td>{signer.order}</td>
                                                        <td>
                                                            {signer.name.clone()}
                                                            <br/><small>{signer.email.clone()}</small>
                                                        </td>
                                                        <td>{signer.role.clone()}</td>
                                                        <td>{signer.status.as_str()}</td>
                                                        <td>{signer.decided_at.map(|at| at.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()}</td>
                                                        <td>{signer.comment.clone().unwrap_or_default()}</td>
                                                        <td class="workflow-actions">
                                                            {pending.then(|| view! {
                                                                <button class="edit-btn" on:click=move |_| open_decision(sign.clone())>"Sign"</button>
                                                                <button class="delete-btn" on:click=move |_| open_decision(reject.clone())>"Reject"</button>
                                                            })}
                                                        </td>
                                                    </tr>
                                                }
                                            }).collect_view()}
                                        </tbody>
                                    </table>
                                </article>
                            }
                        }).collect_view().into_any()
                    }
                    Err(e) => view! {
                        <p class="error">{format!("Failed to load documents: {e}")}</p>
                    }.into_any(),
                })}
            </Suspense>

            {move || creating.get().then(|| view! {
                <div class="modal-overlay">
                    <div class="modal modal-wide">
                        <h2>"New Document"</h2>
                        <SubmitError error=submit_error/>
                        <div class="form-group">
                            <label>"Title"</label>
                            <input
                                type="text"
                                prop:value=move || draft.with(|d| d.title.clone())
                                on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                            />
                            <FieldMessage errors=errors field="title"/>
                        </div>
                        <div class="form-group">
                            <label>"Signature Template"</label>
                            <select on:change=move |ev| {
                                let value = event_target_value(&ev);
                                let chosen = all_templates().into_iter().find(|t| t.id.to_string() == value);
                                draft.update(|d| match chosen {
                                    Some(template) => d.choose_template(&template),
                                    None => {
                                        d.template_id = None;
                                        d.signers.clear();
                                    }
                                });
                            }>
                                <option value="" selected=move || draft.with(|d| d.template_id.is_none())>"Select a template"</option>
                                {move || all_templates().into_iter().filter(SignatureTemplate::is_active).map(|t| {
                                    let id = t.id;
                                    view! {
                                        <option
                                            value=id.to_string()
                                            selected=move || draft.with(|d| d.template_id == Some(id))
                                        >{format!("{} ({})", t.name, t.meaning)}</option>
                                    }
                                }).collect_view()}
                            </select>
                            <FieldMessage errors=errors field="template_id"/>
                        </div>
                        <div class="form-group">
                            <label>"Description"</label>
                            <textarea
                                prop:value=move || draft.with(|d| d.description.clone())
                                on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                            ></textarea>
                        </div>
                        <fieldset class="form-group">
                            <legend>"Signers"</legend>
                            {move || {
                                let count = draft.with(|d| d.signers.len());
                                (0..count).map(|i| view! {
                                    <SignerRow draft=draft errors=errors index=i/>
                                }).collect_view()
                            }}
                            <button
                                class="secondary-btn"
                                on:click=move |_| draft.update(|d| d.signers.push(SignerDraft::default()))
                            >"Add Signer"</button>
                        </fieldset>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| creating.set(false)>"Cancel"</button>
                            <button
                                class="primary-btn"
                                on:click=on_create
                                disabled=move || saving.get() || !draft.with(DocumentDraft::can_create)
                            >
                                {move || if saving.get() { "Creating..." } else { "Create Document" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}

            {move || decision.get().map(|pending| view! {
                <div class="modal-overlay">
                    <div class="modal">
                        <h2>{if pending.approve { "Sign Document" } else { "Reject Document" }}</h2>
                        <p>{format!("Recording decision for {}.", pending.signer_name)}</p>
                        <SubmitError error=decision_error/>
                        <div class="form-group">
                            <label>"Comment (optional)"</label>
                            <textarea
                                prop:value=move || comment.get()
                                on:input=move |ev| set_comment.set(event_target_value(&ev))
                            ></textarea>
                        </div>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| decision.set(None)>"Cancel"</button>
                            <button
                                class={if pending.approve { "primary-btn" } else { "danger-btn" }}
                                on:click=on_decide
                            >{if pending.approve { "Sign" } else { "Reject" }}</button>
                        </div>
                    </div>
                </div>
            })}
        </section>
    }
}

/// One editable signer row in the document form.
#[component]
fn SignerRow(draft: RwSignal<DocumentDraft>, errors: ReadSignal<FieldErrors>, index: usize) -> impl IntoView {
    let edit = move |change: fn(&mut SignerDraft, String), value: String| {
        draft.update(|d| {
            if let Some(signer) = d.signers.get_mut(index) {
                change(signer, value);
            }
        });
    };
    let value = move |read: fn(&SignerDraft) -> String| {
        draft.with(|d| d.signers.get(index).map(read).unwrap_or_default())
    };
    let message = move |field: &'static str| {
        let key = format!("signers.{index}.{field}");
        errors.with(|e| e.get(&key).map(|m| view! { <span class="field-error">{m.to_string()}</span> }))
    };

    view! {
        <div class="signer-row">
            <span class="signer-order">{index + 1}</span>
            <div>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value=move || value(|s| s.name.clone())
                    on:input=move |ev| edit(|s, v| s.name = v, event_target_value(&ev))
                />
                {move || message("name")}
            </div>
            <div>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || value(|s| s.email.clone())
                    on:input=move |ev| edit(|s, v| s.email = v, event_target_value(&ev))
                />
                {move || message("email")}
            </div>
            <input
                type="text"
                placeholder="Role"
                prop:value=move || value(|s| s.role.clone())
                on:input=move |ev| edit(|s, v| s.role = v, event_target_value(&ev))
            />
            <button
                class="link-btn"
                on:click=move |_| draft.update(|d| {
                    if index < d.signers.len() {
                        d.signers.remove(index);
                    }
                })
            >"Remove"</button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unknown_template_is_labelled() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date");
        let template = SignatureTemplate::new(
            "Batch Record Approval",
            SignatureMeaning::Approval,
            vec!["QA Manager".to_string()],
            "admin",
            date,
        );
        let templates = vec![template.clone()];

        assert_eq!(template_name(&templates, template.id), "Batch Record Approval");
        assert_eq!(template_name(&templates, SignatureTemplateId::new()), "Unknown template");
    }

    #[test]
    fn status_classes_follow_document_state() {
        assert_eq!(document_status_class(DocumentStatus::Completed), "status-enabled");
        assert_eq!(document_status_class(DocumentStatus::Rejected), "status-disabled");
    }
}
