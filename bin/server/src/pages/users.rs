//! User management page component and server functions.

use crate::pages::form::{FieldMessage, SubmitError};
use crate::types::UserExportQuery;
use leptos::prelude::*;
use leptos::server_fn::codec::Json;
use leptos::task::spawn_local;
use pharma_lims_accounts::{
    AuthorizationLevel, PAGE_SIZE_OPTIONS, PRIVILEGES, Role, SignatureStatus, SortDirection,
    SortField, User, UserDraft, UserFilter, UserListState, UserStatus,
};
use pharma_lims_core::{FieldErrors, UserId};

const SIGNATURE_STATUSES: [SignatureStatus; 2] = [SignatureStatus::Enabled, SignatureStatus::Disabled];

/// Server function to list every user.
#[server]
pub async fn list_users() -> Result<Vec<User>, ServerFnError> {
    use crate::server_helpers::get_store;

    let store = get_store().await?;
    Ok(store.read(|data| data.users.clone()).await)
}

/// Server function to create a user from a form draft.
#[server(input = Json)]
pub async fn create_user(draft: UserDraft) -> Result<User, ServerFnError> {
    use crate::server_helpers::{get_store, store_error};

    let store = get_store().await?;
    store
        .write(|data| data.create_user(draft))
        .await
        .map_err(|report| store_error("create_user", report))
}

/// Server function to save an edited user.
#[server(input = Json)]
pub async fn update_user(user_id: String, draft: UserDraft) -> Result<User, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: UserId = parse_id("user", &user_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.update_user(id, draft))
        .await
        .map_err(|report| store_error("update_user", report))
}

/// Server function to flip a user between Active and Inactive.
#[server]
pub async fn toggle_user_status(user_id: String) -> Result<UserStatus, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let id: UserId = parse_id("user", &user_id)?;
    let store = get_store().await?;
    store
        .write(|data| data.toggle_user_status(id))
        .await
        .map_err(|report| store_error("toggle_user_status", report))
}

/// Server function to set the status of every selected user.
#[server(input = Json)]
pub async fn set_user_statuses(
    user_ids: Vec<String>,
    status: UserStatus,
) -> Result<usize, ServerFnError> {
    use crate::server_helpers::{get_store, parse_id, store_error};

    let ids = user_ids
        .iter()
        .map(|raw| parse_id::<UserId>("user", raw))
        .collect::<Result<Vec<_>, _>>()?;
    let store = get_store().await?;
    store
        .write(|data| data.set_user_statuses(&ids, status))
        .await
        .map_err(|report| store_error("set_user_statuses", report))
}

/// The visible slice of the table, detached from the user list.
#[derive(Clone, Debug, PartialEq)]
struct TableRows {
    rows: Vec<User>,
    filtered_count: usize,
    total_pages: usize,
    page: usize,
    first_row: usize,
    last_row: usize,
    page_selected: bool,
}

impl TableRows {
    fn new(state: &UserListState, users: &[User]) -> Self {
        let page = state.view(users);
        let page_selected = !page.users.is_empty()
            && page.users.iter().all(|u| state.selection.contains(&u.id));
        Self {
            first_row: page.first_row(),
            last_row: page.last_row(),
            filtered_count: page.filtered_count,
            total_pages: page.total_pages,
            page: page.page,
            rows: page.users.into_iter().cloned().collect(),
            page_selected,
        }
    }
}

/// Which user the modal is editing.
#[derive(Clone, Copy, Debug, PartialEq)]
enum UserModal {
    Create,
    Edit(UserId),
}

fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// User management page.
#[component]
pub fn UsersPage() -> impl IntoView {
    let users = Resource::new(|| (), |_| list_users());
    let settings = Resource::new(|| (), |_| crate::app::get_client_settings());
    let state = RwSignal::new(UserListState::default());

    // Apply the configured page size once settings arrive
    Effect::new(move || {
        if let Some(Ok(settings)) = settings.get() {
            state.update(|s| {
                if s.pagination.page_size != settings.default_page_size {
                    let _ = s.set_page_size(settings.default_page_size);
                }
            });
        }
    });

    let modal = RwSignal::new(Option::<UserModal>::None);
    let draft = RwSignal::new(UserDraft::new());
    let (errors, set_errors) = signal(FieldErrors::new());
    let (submit_error, set_submit_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);
    let (audit_user, set_audit_user) = signal(Option::<User>::None);
    let (bulk_error, set_bulk_error) = signal(Option::<String>::None);

    let open_create = move |_| {
        draft.set(UserDraft::new());
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        modal.set(Some(UserModal::Create));
    };

    let open_edit = move |user: User| {
        draft.set(UserDraft::from_user(&user));
        set_errors.set(FieldErrors::new());
        set_submit_error.set(None);
        modal.set(Some(UserModal::Edit(user.id)));
    };

    let on_submit = move |_| {
        let Some(mode) = modal.get() else {
            return;
        };
        let current = draft.get();
        let found = current.validate();
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_errors.set(FieldErrors::new());
        set_saving.set(true);
        spawn_local(async move {
            let result = match mode {
                UserModal::Create => create_user(current).await,
                UserModal::Edit(id) => update_user(id.to_string(), current).await,
            };
            match result {
                Ok(_) => {
                    modal.set(None);
                    users.refetch();
                }
                Err(e) => set_submit_error.set(Some(e.to_string())),
            }
            set_saving.set(false);
        });
    };

    let on_bulk = move |status: UserStatus| {
        let ids: Vec<String> = state.with(|s| s.selection.iter().map(ToString::to_string).collect());
        if ids.is_empty() {
            return;
        }
        set_bulk_error.set(None);
        spawn_local(async move {
            match set_user_statuses(ids, status).await {
                Ok(_) => {
                    state.update(|s| s.selection.clear());
                    users.refetch();
                }
                Err(e) => set_bulk_error.set(Some(e.to_string())),
            }
        });
    };

    view! {
        <div class="users-page">
            <header class="page-header">
                <h1>"User Management"</h1>
                <div class="page-actions">
                    <ExportForm state=state/>
                    <button class="primary-btn" on:click=open_create>"Add User"</button>
                </div>
            </header>

            <UserFilters state=state/>

            {move || {
                let count = state.with(|s| s.selection.len());
                (count > 0).then(|| view! {
                    <div class="bulk-bar">
                        <span>{format!("{count} selected")}</span>
                        <button class="secondary-btn" on:click=move |_| on_bulk(UserStatus::Active)>"Activate"</button>
                        <button class="secondary-btn" on:click=move |_| on_bulk(UserStatus::Inactive)>"Deactivate"</button>
                        <button class="link-btn" on:click=move |_| state.update(|s| s.selection.clear())>"Clear"</button>
                        <SubmitError error=bulk_error/>
                    </div>
                })
            }}

            <Suspense fallback=move || view! { <p>"Loading users..."</p> }>
                {move || {
                    users.get().map(|result| match result {
                        Ok(all) => {
                            let table = state.with(|s| TableRows::new(s, &all));
                            let all = StoredValue::new(all);
                            view! {
                                <UserTable
                                    table=table
                                    state=state
                                    all=all
                                    on_edit=open_edit
                                    on_audit=move |user| set_audit_user.set(Some(user))
                                    on_toggled=move || users.refetch()
                                />
                            }.into_any()
                        }
                        Err(e) => view! {
                            <p class="error">{format!("Failed to load users: {e}")}</p>
                        }.into_any(),
                    })
                }}
            </Suspense>

            {move || modal.get().map(|mode| view! {
                <div class="modal-overlay">
                    <div class="modal modal-wide">
                        <h2>{match mode {
                            UserModal::Create => "Add User",
                            UserModal::Edit(_) => "Edit User",
                        }}</h2>
                        <SubmitError error=submit_error/>
                        <UserForm draft=draft errors=errors/>
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| modal.set(None)>"Cancel"</button>
                            <button
                                class="primary-btn"
                                on:click=on_submit
                                disabled=move || saving.get()
                            >
                                {move || if saving.get() { "Saving..." } else { "Save User" }}
                            </button>
                        </div>
                    </div>
                </div>
            })}

            {move || audit_user.get().map(|user| view! {
                <div class="modal-overlay">
                    <div class="modal modal-wide">
                        <h2>{format!("Audit Trail: {}", user.name)}</h2>
                        {if user.audit_log.is_empty() {
                            view! { <p class="empty-state">"No audit entries."</p> }.into_any()
                        } else {
                            view! {
                                <table class="workflows-table">
                                    <thead>
                                        <tr>
                                            <th>"When"</th>
                                            <th>"Action"</th>
                                            <th>"By"</th>
                                            <th>"Details"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {user.audit_log.iter().rev().map(|entry| view! {
                                            <tr>
                                                <td>{entry.timestamp.format("%Y-%m-%d %H:%M").to_string()}</td>
                                                <td>{entry.action.clone()}</td>
                                                <td>{entry.performed_by.clone()}</td>
                                                <td>{entry.details.clone()}</td>
                                            </tr>
                                        }).collect_view()}
                                    </tbody>
                                </table>
                            }.into_any()
                        }}
                        <div class="modal-actions">
                            <button class="secondary-btn" on:click=move |_| set_audit_user.set(None)>"Close"</button>
                        </div>
                    </div>
                </div>
            })}
        </div>
    }
}

/// Filter controls above the table.
#[component]
fn UserFilters(state: RwSignal<UserListState>) -> impl IntoView {
    let edit = move |change: fn(&mut UserFilter, String), value: String| {
        state.update(|s| {
            let mut filter = s.filter.clone();
            change(&mut filter, value);
            s.set_filter(filter);
        });
    };

    view! {
        <section class="filter-bar">
            <input
                type="search"
                placeholder="Search name or email"
                prop:value=move || state.with(|s| s.filter.search.clone())
                on:input=move |ev| edit(|f, v| f.search = v, event_target_value(&ev))
            />
            <select on:change=move |ev| edit(|f, v| f.role = v.parse().ok(), event_target_value(&ev))>
                <option value="All" selected=move || state.with(|s| s.filter.role.is_none())>"All Roles"</option>
                {Role::ALL.into_iter().map(|role| view! {
                    <option
                        value=role.as_str()
                        selected=move || state.with(|s| s.filter.role == Some(role))
                    >{role.as_str()}</option>
                }).collect_view()}
            </select>
            <select on:change=move |ev| edit(|f, v| f.status = v.parse().ok(), event_target_value(&ev))>
                <option value="All" selected=move || state.with(|s| s.filter.status.is_none())>"All Statuses"</option>
                {UserStatus::ALL.into_iter().map(|status| view! {
                    <option
                        value=status.as_str()
                        selected=move || state.with(|s| s.filter.status == Some(status))
                    >{status.as_str()}</option>
                }).collect_view()}
            </select>
            <label class="date-range">
                "Created"
                <input
                    type="date"
                    prop:value=move || state.with(|s| format_date(s.filter.created_from))
                    on:change=move |ev| edit(|f, v| f.created_from = parse_date(&v), event_target_value(&ev))
                />
                <input
                    type="date"
                    prop:value=move || state.with(|s| format_date(s.filter.created_to))
                    on:change=move |ev| edit(|f, v| f.created_to = parse_date(&v), event_target_value(&ev))
                />
            </label>
            <label class="date-range">
                "Last login"
                <input
                    type="date"
                    prop:value=move || state.with(|s| format_date(s.filter.last_login_from))
                    on:change=move |ev| edit(|f, v| f.last_login_from = parse_date(&v), event_target_value(&ev))
                />
                <input
                    type="date"
                    prop:value=move || state.with(|s| format_date(s.filter.last_login_to))
                    on:change=move |ev| edit(|f, v| f.last_login_to = parse_date(&v), event_target_value(&ev))
                />
            </label>
            <button
                class="link-btn"
                disabled=move || state.with(|s| !s.filter.is_active())
                on:click=move |_| state.update(UserListState::clear_filter)
            >"Clear filters"</button>
        </section>
    }
}

/// The paginated user table.
#[component]
fn UserTable(
    table: TableRows,
    state: RwSignal<UserListState>,
    all: StoredValue<Vec<User>>,
    on_edit: impl Fn(User) + Copy + Send + Sync + 'static,
    on_audit: impl Fn(User) + Copy + Send + Sync + 'static,
    on_toggled: impl Fn() + Copy + Send + Sync + 'static,
) -> impl IntoView {
    if table.filtered_count == 0 {
        return view! {
            <p class="empty-state">"No users match the current filters."</p>
        }
        .into_any();
    }

    let sort = state.with_untracked(|s| s.sort);
    let page = table.page;
    let total_pages = table.total_pages;

    view! {
        <table class="workflows-table users-table">
            <thead>
                <tr>
                    <th>
                        <input
                            type="checkbox"
                            prop:checked={table.page_selected}
                            on:change=move |_| {
                                all.with_value(|all| state.update(|s| {
                                    let page = s.view(all);
                                    s.toggle_select_page(&page);
                                }));
                            }
                        />
                    </th>
                    {SortField::ALL.into_iter().map(|field| {
                        let arrow = if sort.field == field {
                            match sort.direction {
                                SortDirection::Ascending => " ▲",
                                SortDirection::Descending => " ▼",
                            }
                        } else {
                            ""
                        };
                        view! {
                            <th class="sortable" on:click=move |_| state.update(|s| s.toggle_sort(field))>
                                {field.label()}{arrow}
                            </th>
                        }
                    }).collect_view()}
                    <th>"Actions"</th>
                </tr>
            </thead>
            <tbody>
                {table.rows.into_iter().map(|user| {
                    let id = user.id;
                    let selected = state.with_untracked(|s| s.selection.contains(&id));
                    let active = user.status == UserStatus::Active;
                    let for_edit = user.clone();
                    let for_audit = user.clone();
                    view! {
                        <tr class:selected=selected>
                            <td>
                                <input
                                    type="checkbox"
                                    prop:checked=selected
                                    on:change=move |_| state.update(|s| s.toggle_selected(id))
                                />
                            </td>
                            <td><strong>{user.name.clone()}</strong></td>
                            <td>{user.email.clone()}</td>
                            <td>{user.role.as_str()}</td>
                            <td class={if active { "status-enabled" } else { "status-disabled" }}>
                                {user.status.as_str()}
                            </td>
                            <td>
                                {user.last_login
                                    .map(|at| view! { <span>{at.format("%Y-%m-%d %H:%M").to_string()}</span> }.into_any())
                                    .unwrap_or_else(|| view! { <span class="muted">"Never"</span> }.into_any())}
                            </td>
                            <td>{user.digital_signature_status.as_str()}</td>
                            <td>{user.created_date.format("%Y-%m-%d").to_string()}</td>
                            <td title=user.authorization_level.description()>
                                {user.authorization_level.to_string()}
                            </td>
                            <td class="workflow-actions">
                                <button class="edit-btn" on:click=move |_| on_edit(for_edit.clone())>"Edit"</button>
                                <button
                                    class="toggle-btn"
                                    on:click=move |_| {
                                        spawn_local(async move {
                                            if toggle_user_status(id.to_string()).await.is_ok() {
                                                on_toggled();
                                            }
                                        });
                                    }
                                >
                                    {if active { "Deactivate" } else { "Activate" }}
                                </button>
                                <button class="link-btn" on:click=move |_| on_audit(for_audit.clone())>"Audit"</button>
                            </td>
                        </tr>
                    }
                }).collect_view()}
            </tbody>
        </table>
        <footer class="table-footer">
            <span>{format!(
                "Showing {}-{} of {}",
                table.first_row,
                table.last_row,
                table.filtered_count
            )}</span>
            <label>
                "Rows per page "
                <select on:change=move |ev| {
                    if let Ok(size) = event_target_value(&ev).parse::<usize>() {
                        state.update(|s| {
                            let _ = s.set_page_size(size);
                        });
                    }
                }>
                    {PAGE_SIZE_OPTIONS.into_iter().map(|size| view! {
                        <option
                            value=size.to_string()
                            selected=move || state.with(|s| s.pagination.page_size == size)
                        >{size}</option>
                    }).collect_view()}
                </select>
            </label>
            <div class="pager">
                <button
                    class="secondary-btn"
                    disabled={page <= 1}
                    on:click=move |_| state.update(|s| s.set_page(page - 1))
                >"Previous"</button>
                <span>{format!("Page {page} of {}", total_pages.max(1))}</span>
                <button
                    class="secondary-btn"
                    disabled={page >= total_pages}
                    on:click=move |_| state.update(|s| s.set_page(page + 1))
                >"Next"</button>
            </div>
        </footer>
    }
    .into_any()
}

/// Add/edit form bound to a draft.
#[component]
fn UserForm(draft: RwSignal<UserDraft>, errors: ReadSignal<FieldErrors>) -> impl IntoView {
    view! {
        <div class="form-grid">
            <div class="form-group">
                <label>"Full Name"</label>
                <input
                    type="text"
                    prop:value=move || draft.with(|d| d.name.clone())
                    on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
                />
                <FieldMessage errors=errors field="name"/>
            </div>
            <div class="form-group">
                <label>"Email"</label>
                <input
                    type="email"
                    prop:value=move || draft.with(|d| d.email.clone())
                    on:input=move |ev| draft.update(|d| d.email = event_target_value(&ev))
                />
                <FieldMessage errors=errors field="email"/>
            </div>
            <div class="form-group">
                <label>"Role"</label>
                <select on:change=move |ev| {
                    if let Ok(role) = event_target_value(&ev).parse::<Role>() {
                        draft.update(|d| d.choose_role(role));
                    }
                }>
                    <option value="" selected=move || draft.with(|d| d.role.is_none())>"Select a role"</option>
                    {Role::ALL.into_iter().map(|role| view! {
                        <option
                            value=role.as_str()
                            selected=move || draft.with(|d| d.role == Some(role))
                        >{role.as_str()}</option>
                    }).collect_view()}
                </select>
                <FieldMessage errors=errors field="role"/>
            </div>
            <div class="form-group">
                <label>"Status"</label>
                <select on:change=move |ev| {
                    if let Ok(status) = event_target_value(&ev).parse::<UserStatus>() {
                        draft.update(|d| d.status = status);
                    }
                }>
                    {UserStatus::ALL.into_iter().map(|status| view! {
                        <option
                            value=status.as_str()
                            selected=move || draft.with(|d| d.status == status)
                        >{status.as_str()}</option>
                    }).collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"Authorization Level"</label>
                <select on:change=move |ev| {
                    if let Ok(level) = event_target_value(&ev).parse::<u8>() {
                        draft.update(|d| d.authorization_level = level);
                    }
                }>
                    {(0..=AuthorizationLevel::MAX).filter_map(|n| AuthorizationLevel::new(n).ok()).map(|level| {
                        let value = level.value();
                        view! {
                            <option
                                value=value.to_string()
                                selected=move || draft.with(|d| d.authorization_level == value)
                            >{format!("{value} - {}", level.description())}</option>
                        }
                    }).collect_view()}
                </select>
                <FieldMessage errors=errors field="authorization_level"/>
            </div>
            <div class="form-group">
                <label>"Digital Signature"</label>
                <select on:change=move |ev| {
                    let value = event_target_value(&ev);
                    if let Some(status) = SIGNATURE_STATUSES.into_iter().find(|s| s.as_str() == value) {
                        draft.update(|d| d.digital_signature_status = status);
                    }
                }>
                    {SIGNATURE_STATUSES.into_iter().map(|status| view! {
                        <option
                            value=status.as_str()
                            selected=move || draft.with(|d| d.digital_signature_status == status)
                        >{status.as_str()}</option>
                    }).collect_view()}
                </select>
            </div>
            <div class="form-group">
                <label>"Signature Certificate"</label>
                <input
                    type="text"
                    placeholder="certificate.p12"
                    prop:value=move || draft.with(|d| d.signature_certificate.clone().unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        draft.update(|d| {
                            d.signature_certificate = (!value.trim().is_empty()).then(|| value.trim().to_string());
                        });
                    }
                />
            </div>
            <fieldset class="form-group privileges">
                <legend>"Privileges"</legend>
                {PRIVILEGES.iter().map(|privilege| {
                    let id = privilege.id;
                    view! {
                        <label class="checkbox-label" title=privilege.category>
                            <input
                                type="checkbox"
                                prop:checked=move || draft.with(|d| d.privileges.iter().any(|p| p == id))
                                on:change=move |_| draft.update(|d| d.toggle_privilege(id))
                            />
                            {privilege.name}
                        </label>
                    }
                }).collect_view()}
            </fieldset>
        </div>
    }
}

/// Plain GET form to `/export/users.csv` carrying the table's filter and sort.
#[component]
fn ExportForm(state: RwSignal<UserListState>) -> impl IntoView {
    view! {
        <form method="get" action="/export/users.csv" class="inline-form">
            {move || {
                state.with(|s| UserExportQuery::from_state(s))
                    .params()
                    .into_iter()
                    .map(|(name, value)| view! { <input type="hidden" name=name value=value/> })
                    .collect_view()
            }}
            <button type="submit" class="secondary-btn">"Export CSV"</button>
        </form>
    }
}
