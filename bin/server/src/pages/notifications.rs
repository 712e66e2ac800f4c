//! Notification templates and the in-app inbox.

use crate::pages::form::{FieldMessage, SubmitError, join_list, split_list};
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use pharma_lims_core::{FieldErrors, NotificationId, NotificationTemplateId};
use pharma_lims_notifications::{
    Channel, Notification, NotificationFilter, NotificationKind, NotificationTemplate,
    NotificationTemplateDraft, Priority, ReadFilter,
};
use std::collections::BTreeMap;

const READ_FILTERS: [(ReadFilter, &str); 3] = [
    (ReadFilter::All, "All"),
    (ReadFilter::Unread, "Unread"),
    (ReadFilter::Read, "Read"),
];

#[server]
pub async fn list_notification_templates() -> Result<Vec<NotificationTemplate>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.notification_templates.clone()).await)
}

/// Server function to list the inbox, newest first.
#[server]
pub async fn list_notifications() -> Result<Vec<Notification>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.inbox.all().to_vec()).await)
}

#[server(input = Json)]
pub async fn create_notification_template(
    draft: NotificationTemplateDraft,
) -> Result<NotificationTemplate, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_notification_template(draft))
        .await
        .map_err(|report| store_error("create_notification_template", report))
}

#[server(input = Json)]
pub async fn update_notification_template(
    template_id: String,
    draft: NotificationTemplateDraft,
) -> Result<NotificationTemplate, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: NotificationTemplateId = parse_id("notification template", &template_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_notification_template(id, draft))
        .await
        .map_err(|report| store_error("update_notification_template", report))
}

/// Server function to flip a template's active flag; returns the new flag.
#[server]
pub async fn toggle_notification_template(template_id: String) -> Result<bool, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: NotificationTemplateId = parse_id("notification template", &template_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.toggle_notification_template(id))
        .await
        .map_err(|report| store_error("toggle_notification_template", report))
}

/// Server function to render a template into the inbox.
#[server(input = Json)]
pub async fn send_notification(
    template_id: String,
    values: BTreeMap<String, String>,
) -> Result<Notification, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: NotificationTemplateId = parse_id("notification template", &template_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.send_notification(id, &values))
        .await
        .map_err(|report| store_error("send_notification", report))
}

#[server]
pub async fn mark_notification_read(notification_id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: NotificationId = parse_id("notification", &notification_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.mark_notification_read(id))
        .await
        .map_err(|report| store_error("mark_notification_read", report))
}

#[server]
pub async fn mark_all_notifications_read() -> Result<usize, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.write(|data| data.mark_all_notifications_read()).await)
}

#[server]
pub async fn delete_notification(notification_id: String) -> Result<(), ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: NotificationId = parse_id("notification", &notification_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.delete_notification(id))
        .await
        .map(|_| ())
        .map_err(|report| store_error("delete_notification", report))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InboxAction {
    MarkRead,
    Delete,
}

fn kind_class(kind: NotificationKind) -> String {
    format!("notification-{}", kind.as_str().to_lowercase())
}

/// Notifications page: inbox on top, templates below.
#[component]
pub fn NotificationsPage() -> impl IntoView {
    let templates = Resource::new(|| (), |_| list_notification_templates());
    let notifications = Resource::new(|| (), |_| list_notifications());

    view! {
        <div class="notifications-page">
            <header class="page-header">
                <h1>"Notifications"</h1>
            </header>
            <InboxSection notifications=notifications/>
            <TemplatesSection templates=templates notifications=notifications/>
        </div>
    }
}

type NotificationsResource = Resource<Result<Vec<Notification>, ServerFnError>>;

/// Inbox list with read/kind/priority filters.
#[component]
fn InboxSection(notifications: NotificationsResource) -> impl IntoView {
    let filter = RwSignal::new(NotificationFilter::default());

    let act = move |action: InboxAction, id: NotificationId| {
        spawn_local(async move {
            let result = match action {
                InboxAction::MarkRead => mark_notification_read(id.to_string()).await,
                InboxAction::Delete => delete_notification(id.to_string()).await,
            };
            if result.is_ok() {
                notifications.refetch();
            }
        });
    };

    view! {
        <section class="inbox-section">
            <div class="section-header">
                <h2>
                    "Inbox "
                    {move || notifications.get().and_then(Result::ok).map(|all| {
                        let unread = all.iter().filter(|n| !n.read).count();
                        (unread > 0).then(|| view! { <span class="badge">{unread}</span> })
                    })}
                </h2>
                <button
                    class="secondary-btn"
                    on:click=move |_| {
                        spawn_local(async move {
                            if mark_all_notifications_read().await.is_ok() {
                                notifications.refetch();
                            }
                        });
                    }
                >"Mark all read"</button>
            </div>

            <div class="filter-bar">
                <select on:change=move |ev| {
                    let value = event_target_value(&ev);
                    if let Some((read, _)) = READ_FILTERS.into_iter().find(|(_, label)| *label == value) {
                        filter.update(|f| f.read = read);
                    }
                }>
                    {READ_FILTERS.into_iter().map(|(_, label)| view! { <option value=label>{label}</option> }).collect_view()}
                </select>
                <select on:change=move |ev| filter.update(|f| f.kind = event_target_value(&ev).parse().ok())>
                    <option value="All">"All Types"</option>
                    {NotificationKind::ALL.iter().map(|k| view! { <option value=k.as_str()>{k.as_str()}</option> }).collect_view()}
                </select>
                <select on:change=move |ev| filter.update(|f| f.priority = event_target_value(&ev).parse().ok())>
                    <option value="All">"All Priorities"</option>
                    {Priority::ALL.iter().map(|p| view! { <option value=p.as_str()>{p.as_str()}</option> }).collect_view()}
                </select>
            </div>

            <Suspense fallback=move || view! { <p>"Loading notifications..."</p> }>
                {move || notifications.get().map(|result| match result {
                    Ok(all) => {
                        let shown: Vec<Notification> = filter.with(|f| {
                            all.into_iter().filter(|n| f.matches(n)).collect()
                        });
                        if shown.is_empty() {
                            return view! { <p class="empty-state">"No notifications."</p> }.into_any();
                        }
                        view! {
                            <ul class="notification-list">
                                {shown.into_iter().map(|n| {
                                    let id = n.id;
                                    view! {
                                        <li class=format!("{} {}", kind_class(n.kind), if n.read { "read" } else { "unread" })>
                                            <div class="notification-body">
                                                <strong>{n.title.clone()}</strong>
                                                <p>{n.message.clone()}</p>
                                                <small class="muted">{format!(
                                                    "{} · {} priority",
                                                    n.created_at.format("%Y-%m-%d %H:%M"),
                                                    n.priority
                                                )}</small>
                                            </div>
                                            <div class="workflow-actions">
                                                {(!n.read).then(|| view! {
                                                    <button class="link-btn" on:click=move |_| act(InboxAction::MarkRead, id)>"Mark read"</button>
                                                })}
                                                <button class="delete-btn" on:click=move |_| act(InboxAction::Delete, id)>"Delete"</button>
                                            </div>
                                        </li>
                                    }
                                }).collect_view()}
                            </ul>
                        }.into_any()
                    }
                    Err(e) => view! {
                        <p class="error">{format!("Failed to load notifications: {e}")}</p>
                    }.into_any(),
                })}
            </Suspense>
        </section>
    }
}

/// Template list with edit, preview and send-test modals.
#[component]
fn TemplatesSection(
    templates: Resource<Result<Vec<NotificationTemplate>, ServerFnError>>,
    notifications: NotificationsResource,
) -> impl IntoView {
    let editing = RwSignal::new(Option::<Option<NotificationTemplateId>>::None);
    let draft = RwSignal::new(NotificationTemplateDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let sending = RwSignal::new(Option::<NotificationTemplate>::None);
    let values = RwSignal::new(BTreeMap::<String, String>::new());
    let (send_error, set_send_error) = signal(Option::<String>::None);

    let open_modal = move |template: Option<&NotificationTemplate>| {
        draft.set(template.map_or_else(
            NotificationTemplateDraft::new,
            NotificationTemplateDraft::from_template,
        ));
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        editing.set(Some(template.map(|t| t.id)));
    };

    let open_send = move |template: NotificationTemplate| {
        values.set(
            template
                .placeholders()
                .into_iter()
                .map(|name| (name, String::new()))
                .collect(),
        );
        set_send_error.set(None);
        sending.set(Some(template));
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
                None => create_notification_template(current).await,
                Some(id) => update_notification_template(id.to_string(), current).await,
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

    let on_send = move |_| {
        let Some(template) = sending.get() else {
            return;
        };
        let filled = values.get();
        spawn_local(async move {
            match send_notification(template.id.to_string(), filled).await {
                Ok(_) => {
                    sending.set(None);
                    notifications.refetch();
                }
                Err(e) => set_send_error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <section class="templates-section">
            <div class="section-header">
                <h2>"Templates"</h2>
                <button class="primary-btn" on:click=move |_| open_modal(None)>"New Template"</button>
            </div>
            <Suspense fallback=move || view! { <p>"Loading templates..."</p> }>
                {move || templates.get().map(|result| match result {
                    Ok(items) if items.is_empty() => view! {
                        <p class="empty-state">"No notification templates yet."</p>
                    }.into_any(),
                    Ok(items) => view! {
                        <table class="workflows-table">
                            <thead>
                                <tr>
                                    <th>"Name"</th>
                                    <th>"Type"</th>
                                    <th>"Priority"</th>
                                    <th>"Channels"</th>
                                    <th>"Triggers"</th>
                                    <th>"Status"</th>
                                    <th>"Actions"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {items.into_iter().map(|t| {
                                    let id = t.id;
                                    let active = t.active;
                                    let for_edit = t.clone();
                                    let for_send = t.clone();
                                    let preview = t.preview();
                                    view! {
                                        <tr>
                                            <td>
                                                <strong>{t.name.clone()}</strong>
                                                <br/><small title={preview.body}>{preview.subject}</small>
                                            </td>
                                            <td class={kind_class(t.kind)}>{t.kind.as_str()}</td>
                                            <td>{t.priority.as_str()}</td>
                                            <td>{t.channels.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")}</td>
                                            <td>{join_list(&t.triggers)}</td>
                                            <td class={if active { "status-enabled" } else { "status-disabled" }}>
                                                {if active { "Active" } else { "Inactive" }}
                                            </td>
                                            <td class="workflow-actions">
                                                <button class="edit-btn" on:click=move |_| open_modal(Some(&for_edit))>"Edit"</button>
                                                <button
                                                    class="link-btn"
                                                    disabled={!active}
                                                    on:click=move |_| open_send(for_send.clone())
                                                >"Send test"</button>
                                                <button
                                                    class="toggle-btn"
                                                    on:click=move |_| {
                                                        spawn_local(async move {
                                                            if toggle_notification_template(id.to_string()).await.is_ok() {
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
                    <div class="modal modal-wide">
                        <h2>{if target.is_some() { "Edit Template" } else { "New Template" }}</h2>
                        <SubmitError error=submit_error/>
                        <TemplateForm draft=draft errors=errors/>
                        <TemplatePreview draft=draft/>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
                            <button class="primary-btn" on:click=on_save disabled=move || saving.get()>
                                {move || if saving.get() { "Saving..." } else { "Save Template" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}

            {move || sending.get().map(|template| {
                let names = template.placeholders();
                let for_preview = template.clone();
                view! {
                    <div class="modal-overlay">
                        <div class="modal">
                            <h2>{format!("Send \"{}\"", template.name)}</h2>
                            <SubmitError error=send_error/>
                            {if names.is_empty() {
                                view! { <p class="muted">"This template has no placeholders."</p> }.into_any()
                            } else {
                                names.into_iter().map(|name| {
                                    let key = name.clone();
                                    view! {
                                        <div class="form-group">
                                            <label>{format!("{{{{{name}}}}}")}</label>
                                            <input
                                                type="text"
                                                on:input=move |ev| {
                                                    let value = event_target_value(&ev);
                                                    values.update(|v| {
                                                        v.insert(key.clone(), value);
                                                    });
                                                }
                                            />
                                        </div>
                                    }
                                }).collect_view().into_any()
                            }}
                            <div class="template-preview">
                                {move || {
                                    let rendered = values.with(|v| for_preview.render(v));
                                    view! {
                                        <strong>{rendered.subject}</strong>
                                        <p>{rendered.body}</p>
                                    }
                                }}
                            </div>
                            <div class="modal-actions">
                                <button class="secondary-btn" on:click=move |_| sending.set(None)>"Cancel"</button>
                                <button class="primary-btn" on:click=on_send>"Send"</button>
                            </div>
                        </div>
                    </div>
                }
            })}
        </section>
    }
}

/// Fields of a notification template draft.
#[component]
fn TemplateForm(draft: RwSignal<NotificationTemplateDraft>, errors: ReadSignal<FieldErrors>) -> impl IntoView {
    view! {
        <div class="form-grid">
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
                <label>"Subject"</label>
                <input
                    type="text"
                    placeholder="Sample {{sample_id}} is ready"
                    prop:value=move || draft.with(|d| d.subject.clone())
                    on:input=move |ev| draft.update(|d| d.subject = event_target_value(&ev))
                />
                <FieldMessage errors=errors field="subject"/>
            </div>
            <div class="form-group form-wide">
                <label>"Body"</label>
                <textarea
                    rows="4"
                    prop:value=move || draft.with(|d| d.body.clone())
                    on:input=move |ev| draft.update(|d| d.body = event_target_value(&ev))
                ></textarea>
                <FieldMessage errors=errors field="body"/>
            </div>
            <div class="form-group">
                <label>"Type"</label>
                <select on:change=move |ev| {
                    if let Ok(kind) = event_target_value(&ev).parse() {
                        draft.update(|d| d.kind = kind);
                    }
                }>
                    {NotificationKind::ALL.iter().copied().map(|k| view! {
                        <option value=k.as_str() selected=move || draft.with(|d| d.kind == k)>{k.as_str()}</option>
                    }).collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"Priority"</label>
                <select on:change=move |ev| {
                    if let Ok(priority) = event_target_value(&ev).parse() {
                        draft.update(|d| d.priority = priority);
                    }
                }>
                    {Priority::ALL.iter().copied().map(|p| view! {
                        <option value=p.as_str() selected=move || draft.with(|d| d.priority == p)>{p.as_str()}</option>
                    }).collect_view()}
                </select>
            </div>
            <fieldset class="form-group">
                <legend>"Channels"</legend>
                {Channel::ALL.iter().copied().map(|c| view! {
                    <label class="checkbox-label">
                        <input
                            type="checkbox"
                            prop:checked=move || draft.with(|d| d.channels.contains(&c))
                            on:change=move |_| draft.update(|d| d.toggle_channel(c))
                        />
                        {c.as_str()}
                    </label>
                }).collect_view()}
                <FieldMessage errors=errors field="channels"/>
            </fieldset>
            <div class="form-group">
                <label>"Triggers"</label>
                <input
                    type="text"
                    placeholder="sample_received, test_completed"
                    prop:value=move || draft.with(|d| join_list(&d.triggers))
                    on:change=move |ev| draft.update(|d| d.triggers = split_list(&event_target_value(&ev)))
                />
            </div>
            <div class="form-group">
                <label>"Recipient Groups"</label>
                <input
                    type="text"
                    placeholder="QA Team, Lab Managers"
                    prop:value=move || draft.with(|d| join_list(&d.recipient_groups))
                    on:change=move |ev| draft.update(|d| d.recipient_groups = split_list(&event_target_value(&ev)))
                />
            </div>
            <label class="checkbox-label">
                <input
                    type="checkbox"
                    prop:checked=move || draft.with(|d| d.active)
                    on:change=move |ev| draft.update(|d| d.active = event_target_checked(&ev))
                />
                "Active"
            </label>
        </div>
    }
}

/// Renders the draft with each placeholder shown as `[name]`.
fn draft_preview(draft: &NotificationTemplateDraft) -> (Vec<String>, String, String) {
    let template = NotificationTemplate::new(&draft.name, &draft.subject, &draft.body);
    let rendered = template.preview();
    (template.placeholders(), rendered.subject, rendered.body)
}

#[component]
fn TemplatePreview(draft: RwSignal<NotificationTemplateDraft>) -> impl IntoView {
    move || {
        let (placeholders, subject, body) = draft.with(draft_preview);
        view! {
            <div class="template-preview">
                <h3>"Preview"</h3>
                <strong>{subject}</strong>
                <p>{body}</p>
                {(!placeholders.is_empty()).then(|| view! {
                    <small class="muted">{format!("Placeholders: {}", placeholders.join(", "))}</small>
                })}
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_preview_brackets_placeholders() {
        let draft = NotificationTemplateDraft {
            subject: "Sample {{sample_id}} received".to_string(),
            body: "Hello {{name}}, sample {{sample_id}} is logged.".to_string(),
            ..NotificationTemplateDraft::new()
        };
        let (placeholders, subject, body) = draft_preview(&draft);
        assert_eq!(placeholders, ["sample_id", "name"]);
        assert_eq!(subject, "Sample [sample_id] received");
        assert_eq!(body, "Hello [name], sample [sample_id] is logged.");
    }

    #[test]
    fn kind_classes_are_lowercase() {
        assert_eq!(kind_class(NotificationKind::Warning), "notification-warning");
    }
}
