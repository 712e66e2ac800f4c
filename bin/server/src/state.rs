//! The in-memory console store.
//!
//! Every record the console manages lives in one [`ConsoleData`] behind a
//! tokio `RwLock`. Server functions take the lock for the length of one
//! synchronous domain call; nothing is written anywhere else, so a restart
//! returns to the seed data.

use crate::error::StoreError;
use crate::types::{ConsoleOverview, UserExportQuery};
use chrono::{NaiveDate, Utc};
use pharma_lims_accounts::{
    AuditEntry, User, UserDraft, UserStatus, filter_and_sort, users_to_csv,
};
use pharma_lims_core::{
    DocumentId, FieldId, ModulePageId, NotificationId, NotificationTemplateId, SignatureTemplateId,
    SignerId, UserId, WorkflowId,
};
use pharma_lims_custom_fields::{CustomField, FieldDraft, GridRect, ModulePage, ModulePageDraft};
use pharma_lims_notifications::{
    Inbox, Notification, NotificationTemplate, NotificationTemplateDraft,
};
use pharma_lims_signatures::{
    DocumentDraft, DocumentStatus, SignatureDocument, SignatureTemplate, SignatureTemplateDraft,
    TemplateStatus,
};
use pharma_lims_workflow::{SavedGraph, Workflow, WorkflowDraft, WorkflowStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Result of a store operation.
pub type StoreResult<T> = pharma_lims_core::Result<T, StoreError>;

/// Shared handle to the console data, cloned into every request.
#[derive(Clone)]
pub struct ConsoleStore {
    inner: Arc<RwLock<ConsoleData>>,
}

impl ConsoleStore {
    #[must_use]
    pub fn new(data: ConsoleData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Runs `f` under the read lock.
    pub async fn read<T>(&self, f: impl FnOnce(&ConsoleData) -> T) -> T {
        let data = self.inner.read().await;
        f(&data)
    }

    /// Runs `f` under the write lock.
    pub async fn write<T>(&self, f: impl FnOnce(&mut ConsoleData) -> T) -> T {
        let mut data = self.inner.write().await;
        f(&mut data)
    }
}

/// Everything the console manages.
#[derive(Debug, Clone, Default)]
pub struct ConsoleData {
    /// Recorded as `performed_by` and `created_by`.
    pub operator: String,
    pub users: Vec<User>,
    pub workflows: Vec<Workflow>,
    pub signature_templates: Vec<SignatureTemplate>,
    pub documents: Vec<SignatureDocument>,
    pub notification_templates: Vec<NotificationTemplate>,
    pub inbox: Inbox,
    pub pages: Vec<ModulePage>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn not_found(entity: &'static str, id: impl ToString) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

impl ConsoleData {
    /// An empty store acting on behalf of `operator`.
    #[must_use]
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn overview(&self) -> ConsoleOverview {
        ConsoleOverview {
            users_total: self.users.len(),
            users_active: self
                .users
                .iter()
                .filter(|u| u.status == UserStatus::Active)
                .count(),
            signatures_enabled: self
                .users
                .iter()
                .filter(|u| u.digital_signature_status.is_enabled())
                .count(),
            workflows_total: self.workflows.len(),
            workflows_active: self
                .workflows
                .iter()
                .filter(|w| w.status == WorkflowStatus::Active)
                .count(),
            documents_pending: self
                .documents
                .iter()
                .filter(|d| d.status() == DocumentStatus::Pending)
                .count(),
            notifications_unread: self.inbox.unread_count(),
            module_pages: self.pages.len(),
            custom_fields: self.pages.iter().map(|p| p.fields.len()).sum(),
        }
    }

    // Users

    pub fn user(&self, id: UserId) -> StoreResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("user", id).into())
    }

    fn user_mut(&mut self, id: UserId) -> StoreResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("user", id).into())
    }

    /// Rejects `email` when another account already uses it, ignoring case.
    fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> StoreResult<()> {
        let email = email.trim().to_lowercase();
        let taken = self
            .users
            .iter()
            .any(|u| Some(u.id) != owner && u.email.to_lowercase() == email);
        if taken {
            tracing::debug!(%email, "Rejected duplicate user email");
            return Err(StoreError::Rejected {
                details: format!("a user with email {email} already exists"),
            }
            .into());
        }
        Ok(())
    }

    pub fn create_user(&mut self, draft: UserDraft) -> StoreResult<User> {
        self.ensure_email_free(&draft.email, None)?;
        let mut user = draft.into_user(today()).map_err(StoreError::from)?;
        user.record(AuditEntry::now(
            "User created",
            self.operator.as_str(),
            format!("Account created with role {}", user.role),
        ));
        tracing::info!(user_id = %user.id, role = %user.role, "Created user");
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, id: UserId, draft: UserDraft) -> StoreResult<User> {
        self.user_mut(id)?;
        self.ensure_email_free(&draft.email, Some(id))?;
        let operator = self.operator.clone();
        let user = self.user_mut(id)?;
        draft.apply_to(user, &operator).map_err(StoreError::from)?;
        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    pub fn toggle_user_status(&mut self, id: UserId) -> StoreResult<UserStatus> {
        let operator = self.operator.clone();
        let status = self.user_mut(id)?.toggle_status(&operator);
        tracing::info!(user_id = %id, status = %status, "Toggled user status");
        Ok(status)
    }

    /// Sets `status` on every listed user, skipping those already there.
    ///
    /// Returns how many users changed.
    pub fn set_user_statuses(&mut self, ids: &[UserId], status: UserStatus) -> StoreResult<usize> {
        if let Some(missing) = ids.iter().find(|id| !self.users.iter().any(|u| u.id == **id)) {
            return Err(not_found("user", missing).into());
        }
        let operator = self.operator.clone();
        let mut changed = 0;
        for user in self.users.iter_mut().filter(|u| ids.contains(&u.id)) {
            if user.status != status {
                user.toggle_status(&operator);
                changed += 1;
            }
        }
        tracing::info!(requested = ids.len(), changed, status = %status, "Bulk status change");
        Ok(changed)
    }

    /// Renders the filtered, sorted and unpaginated user list as CSV.
    pub fn export_users_csv(&self, query: UserExportQuery) -> StoreResult<String> {
        let (filter, sort) = query.into_parts()?;
        let rows = filter_and_sort(&self.users, &filter, sort);
        tracing::info!(rows = rows.len(), filtered = filter.is_active(), "Exported users");
        Ok(users_to_csv(rows))
    }

    // Workflows

    pub fn workflow(&self, id: WorkflowId) -> StoreResult<&Workflow> {
        self.workflows
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found("workflow", id).into())
    }

    fn workflow_mut(&mut self, id: WorkflowId) -> StoreResult<&mut Workflow> {
        self.workflows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found("workflow", id).into())
    }

    pub fn create_workflow(&mut self, draft: WorkflowDraft) -> StoreResult<Workflow> {
        let workflow = draft
            .into_workflow(&self.operator, today())
            .map_err(StoreError::from)?;
        tracing::info!(
            workflow_id = %workflow.id,
            category = %workflow.category,
            "Created workflow"
        );
        self.workflows.push(workflow.clone());
        Ok(workflow)
    }

    pub fn update_workflow(&mut self, id: WorkflowId, draft: WorkflowDraft) -> StoreResult<Workflow> {
        let workflow = self.workflow_mut(id)?;
        draft.apply_to(workflow).map_err(StoreError::from)?;
        tracing::info!(workflow_id = %id, status = %workflow.status, "Updated workflow details");
        Ok(workflow.clone())
    }

    /// Stores a graph saved from the canvas editor. The graph is not
    /// checked; analysis findings are only logged.
    pub fn save_workflow_graph(&mut self, id: WorkflowId, saved: SavedGraph) -> StoreResult<Workflow> {
        let workflow = self.workflow_mut(id)?;
        workflow.apply_saved(saved);
        let report = pharma_lims_workflow::GraphReport::analyze(&workflow.nodes, &workflow.edges);
        if !report.is_clean() {
            tracing::debug!(
                workflow_id = %id,
                warnings = report.warnings().len(),
                "Saved workflow graph has analysis warnings"
            );
        }
        tracing::info!(
            workflow_id = %id,
            nodes = workflow.nodes.len(),
            edges = workflow.edges.len(),
            "Saved workflow graph"
        );
        Ok(workflow.clone())
    }

    pub fn delete_workflow(&mut self, id: WorkflowId) -> StoreResult<Workflow> {
        let pos = self
            .workflows
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| not_found("workflow", id))?;
        let removed = self.workflows.remove(pos);
        tracing::info!(workflow_id = %id, "Deleted workflow");
        Ok(removed)
    }

    // Signatures

    fn signature_template_mut(&mut self, id: SignatureTemplateId) -> StoreResult<&mut SignatureTemplate> {
        self.signature_templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("signature template", id).into())
    }

    pub fn create_signature_template(&mut self, draft: SignatureTemplateDraft) -> StoreResult<SignatureTemplate> {
        let template = draft
            .into_template(&self.operator, today())
            .map_err(StoreError::from)?;
        tracing::info!(
            template_id = %template.id,
            signers = template.signer_roles.len(),
            "Created signature template"
        );
        self.signature_templates.push(template.clone());
        Ok(template)
    }

    pub fn update_signature_template(
        &mut self,
        id: SignatureTemplateId,
        draft: SignatureTemplateDraft,
    ) -> StoreResult<SignatureTemplate> {
        let template = self.signature_template_mut(id)?;
        draft.apply_to(template).map_err(StoreError::from)?;
        tracing::info!(template_id = %id, "Updated signature template");
        Ok(template.clone())
    }

    pub fn toggle_signature_template(&mut self, id: SignatureTemplateId) -> StoreResult<TemplateStatus> {
        let status = self.signature_template_mut(id)?.toggle_status();
        tracing::info!(template_id = %id, status = %status, "Toggled signature template");
        Ok(status)
    }

    /// Routes a new document; its template must exist and be active.
    pub fn create_document(&mut self, draft: DocumentDraft) -> StoreResult<SignatureDocument> {
        if let Some(template_id) = draft.template_id {
            let template = self
                .signature_templates
                .iter()
                .find(|t| t.id == template_id)
                .ok_or_else(|| not_found("signature template", template_id))?;
            if !template.is_active() {
                return Err(StoreError::Rejected {
                    details: format!("signature template {} is inactive", template.name),
                }
                .into());
            }
        }
        let document = draft
            .into_document(&self.operator, today())
            .map_err(StoreError::from)?;
        tracing::info!(
            document_id = %document.id,
            signers = document.signers.len(),
            "Created signature document"
        );
        self.documents.push(document.clone());
        Ok(document)
    }

    /// Records a signer's signature or rejection.
    pub fn decide_signature(
        &mut self,
        document_id: DocumentId,
        signer_id: SignerId,
        approve: bool,
        comment: Option<String>,
    ) -> StoreResult<DocumentStatus> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("document", document_id))?;
        let at = Utc::now();
        let status = if approve {
            document.sign(signer_id, comment, at)
        } else {
            document.reject(signer_id, comment, at)
        }
        .map_err(StoreError::from)?;
        tracing::info!(
            document_id = %document_id,
            signer_id = %signer_id,
            approve,
            status = %status,
            "Recorded signature decision"
        );
        Ok(status)
    }

    // Notifications

    fn notification_template_mut(
        &mut self,
        id: NotificationTemplateId,
    ) -> StoreResult<&mut NotificationTemplate> {
        self.notification_templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("notification template", id).into())
    }

    pub fn create_notification_template(
        &mut self,
        draft: NotificationTemplateDraft,
    ) -> StoreResult<NotificationTemplate> {
        let template = draft.into_template().map_err(StoreError::from)?;
        tracing::info!(
            template_id = %template.id,
            placeholders = template.placeholders().len(),
            "Created notification template"
        );
        self.notification_templates.push(template.clone());
        Ok(template)
    }

    pub fn update_notification_template(
        &mut self,
        id: NotificationTemplateId,
        draft: NotificationTemplateDraft,
    ) -> StoreResult<NotificationTemplate> {
        let template = self.notification_template_mut(id)?;
        draft.apply_to(template).map_err(StoreError::from)?;
        tracing::info!(template_id = %id, "Updated notification template");
        Ok(template.clone())
    }

    pub fn toggle_notification_template(&mut self, id: NotificationTemplateId) -> StoreResult<bool> {
        let active = self.notification_template_mut(id)?.toggle_active();
        tracing::info!(template_id = %id, active, "Toggled notification template");
        Ok(active)
    }

    /// Renders a template into the inbox.
    pub fn send_notification(
        &mut self,
        template_id: NotificationTemplateId,
        values: &BTreeMap<String, String>,
    ) -> StoreResult<Notification> {
        let template = self
            .notification_templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| not_found("notification template", template_id))?;
        let notification =
            Notification::from_template(template, values, Utc::now()).map_err(StoreError::from)?;
        tracing::info!(
            notification_id = %notification.id,
            template_id = %template_id,
            priority = %notification.priority,
            "Sent notification"
        );
        self.inbox.push(notification.clone());
        Ok(notification)
    }

    pub fn mark_notification_read(&mut self, id: NotificationId) -> StoreResult<()> {
        self.inbox.mark_read(id).map_err(StoreError::from)?;
        Ok(())
    }

    pub fn mark_all_notifications_read(&mut self) -> usize {
        let marked = self.inbox.mark_all_read();
        tracing::info!(marked, "Marked all notifications read");
        marked
    }

    pub fn delete_notification(&mut self, id: NotificationId) -> StoreResult<Notification> {
        let removed = self.inbox.remove(id).map_err(StoreError::from)?;
        tracing::info!(notification_id = %id, "Deleted notification");
        Ok(removed)
    }

    // Custom fields

    pub fn page(&self, id: ModulePageId) -> StoreResult<&ModulePage> {
        self.pages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("page", id).into())
    }

    fn page_mut(&mut self, id: ModulePageId) -> StoreResult<&mut ModulePage> {
        self.pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("page", id).into())
    }

    pub fn create_page(&mut self, draft: ModulePageDraft) -> StoreResult<ModulePage> {
        let page = draft.into_page(Utc::now()).map_err(StoreError::from)?;
        tracing::info!(page_id = %page.id, module = %page.module, "Created module page");
        self.pages.push(page.clone());
        Ok(page)
    }

    pub fn update_page(&mut self, id: ModulePageId, draft: ModulePageDraft) -> StoreResult<ModulePage> {
        let page = self.page_mut(id)?;
        draft.apply_to(page).map_err(StoreError::from)?;
        tracing::info!(page_id = %id, "Updated module page");
        Ok(page.clone())
    }

    pub fn delete_page(&mut self, id: ModulePageId) -> StoreResult<ModulePage> {
        let pos = self
            .pages
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found("page", id))?;
        let removed = self.pages.remove(pos);
        tracing::info!(page_id = %id, fields = removed.fields.len(), "Deleted module page");
        Ok(removed)
    }

    pub fn add_field(&mut self, page_id: ModulePageId, draft: FieldDraft) -> StoreResult<CustomField> {
        let field = draft.into_field().map_err(StoreError::from)?;
        let page = self.page_mut(page_id)?;
        let field_id = page.add_field(field).map_err(StoreError::from)?;
        let field = page
            .field(field_id)
            .cloned()
            .ok_or_else(|| not_found("field", field_id))?;
        tracing::info!(page_id = %page_id, field_id = %field_id, field_type = %field.field_type, "Added custom field");
        Ok(field)
    }

    pub fn update_field(
        &mut self,
        page_id: ModulePageId,
        field_id: FieldId,
        draft: FieldDraft,
    ) -> StoreResult<CustomField> {
        let page = self.page_mut(page_id)?;
        let existing = page
            .field(field_id)
            .ok_or_else(|| not_found("field", field_id))?;
        let field = draft.into_update(existing).map_err(StoreError::from)?;
        page.update_field(field).map_err(StoreError::from)?;
        tracing::info!(page_id = %page_id, field_id = %field_id, "Updated custom field");
        page.field(field_id)
            .cloned()
            .ok_or_else(|| not_found("field", field_id).into())
    }

    pub fn move_field(&mut self, page_id: ModulePageId, field_id: FieldId, x: u32, y: u32) -> StoreResult<GridRect> {
        let rect = self
            .page_mut(page_id)?
            .move_field(field_id, x, y)
            .map_err(StoreError::from)?;
        tracing::debug!(field_id = %field_id, x = rect.x, y = rect.y, "Moved custom field");
        Ok(rect)
    }

    pub fn resize_field(
        &mut self,
        page_id: ModulePageId,
        field_id: FieldId,
        width: u32,
        height: u32,
    ) -> StoreResult<GridRect> {
        let rect = self
            .page_mut(page_id)?
            .resize_field(field_id, width, height)
            .map_err(StoreError::from)?;
        tracing::debug!(field_id = %field_id, width = rect.width, height = rect.height, "Resized custom field");
        Ok(rect)
    }

    pub fn remove_field(&mut self, page_id: ModulePageId, field_id: FieldId) -> StoreResult<CustomField> {
        let removed = self
            .page_mut(page_id)?
            .remove_field(field_id)
            .map_err(StoreError::from)?;
        tracing::info!(page_id = %page_id, field_id = %field_id, "Removed custom field");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_lims_accounts::Role;
    use pharma_lims_custom_fields::FieldType;
    use pharma_lims_signatures::{SignatureMeaning, SignerDraft};
    use pharma_lims_workflow::WorkflowCategory;

    fn store() -> ConsoleStore {
        ConsoleStore::new(ConsoleData::new("Test Admin"))
    }

    fn user_draft(name: &str, email: &str) -> UserDraft {
        let mut draft = UserDraft::new();
        draft.name = name.to_string();
        draft.email = email.to_string();
        draft.choose_role(Role::QcAnalyst);
        draft
    }

    fn context(report: &rootcause::Report<StoreError>) -> &StoreError {
        report.current_context()
    }

    #[tokio::test]
    async fn created_user_is_audited_and_listed() {
        let store = store();
        let user = store
            .write(|data| data.create_user(user_draft("Ana Ruiz", "ana@pharmalab.com")))
            .await
            .expect("valid draft");

        assert_eq!(user.audit_log.len(), 1);
        assert_eq!(user.audit_log[0].performed_by, "Test Admin");
        assert_eq!(store.read(|data| data.users.len()).await, 1);
    }

    #[tokio::test]
    async fn invalid_user_draft_is_a_validation_error() {
        let store = store();
        let err = store
            .write(|data| data.create_user(UserDraft::new()))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = store();
        store
            .write(|data| data.create_user(user_draft("Ana Ruiz", "ana@pharmalab.com")))
            .await
            .expect("first");
        let err = store
            .write(|data| data.create_user(user_draft("Ana R.", "ANA@pharmalab.com")))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn editing_onto_another_users_email_is_rejected() {
        let store = store();
        let (ana, ben) = store
            .write(|data| {
                let a = data.create_user(user_draft("Ana Ruiz", "ana@pharmalab.com")).expect("a").id;
                let b = data.create_user(user_draft("Ben Ode", "ben@pharmalab.com")).expect("b").id;
                (a, b)
            })
            .await;

        let err = store
            .write(|data| data.update_user(ben, user_draft("Ben Ode", "ANA@pharmalab.com")))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::Rejected { .. }));

        let kept = store
            .write(|data| data.update_user(ana, user_draft("Ana Ruiz-Ode", "Ana@PharmaLab.com")))
            .await
            .expect("own email stays free");
        assert_eq!(kept.name, "Ana Ruiz-Ode");
    }

    #[tokio::test]
    async fn bulk_status_change_counts_only_changes() {
        let store = store();
        let (a, b) = store
            .write(|data| {
                let a = data.create_user(user_draft("A", "a@lab.com")).expect("a").id;
                let b = data.create_user(user_draft("B", "b@lab.com")).expect("b").id;
                data.toggle_user_status(b).expect("b exists");
                (a, b)
            })
            .await;

        let changed = store
            .write(|data| data.set_user_statuses(&[a, b], UserStatus::Inactive))
            .await
            .expect("both exist");
        assert_eq!(changed, 1);

        let err = store
            .write(|data| data.set_user_statuses(&[UserId::new()], UserStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::NotFound { entity: "user", .. }));
    }

    #[tokio::test]
    async fn export_honours_the_query() {
        let store = store();
        store
            .write(|data| {
                data.create_user(user_draft("Ana Ruiz", "ana@lab.com")).expect("ana");
                data.create_user(user_draft("Ben Cole", "ben@lab.com")).expect("ben");
            })
            .await;

        let query = UserExportQuery {
            search: "ben".to_string(),
            ..UserExportQuery::default()
        };
        let csv = store
            .read(|data| data.export_users_csv(query))
            .await
            .expect("valid query");
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).is_some_and(|row| row.starts_with("Ben Cole,")));
    }

    #[tokio::test]
    async fn new_workflow_saves_as_draft_with_start_node() {
        let store = store();
        let mut draft = WorkflowDraft::new();
        draft.name = "Sample Receipt".to_string();
        draft.category = Some(WorkflowCategory::SampleManagement);

        let workflow = store
            .write(|data| data.create_workflow(draft))
            .await
            .expect("valid draft");
        assert_eq!(workflow.status, WorkflowStatus::Draft);
        assert_eq!(workflow.nodes.len(), 1);

        let saved = workflow.editor(50).save();
        let stored = store
            .write(|data| data.save_workflow_graph(workflow.id, saved))
            .await
            .expect("exists");
        assert_eq!(stored.status, WorkflowStatus::Draft);
        assert!(stored.edges.is_empty());
    }

    #[tokio::test]
    async fn unknown_workflow_is_not_found() {
        let store = store();
        let err = store
            .write(|data| data.delete_workflow(WorkflowId::new()))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::NotFound { entity: "workflow", .. }));
    }

    #[tokio::test]
    async fn documents_need_an_active_template() {
        let store = store();
        let template = store
            .write(|data| {
                let mut draft = SignatureTemplateDraft::new();
                draft.name = "Batch Release".to_string();
                draft.meaning = Some(SignatureMeaning::Approval);
                draft.add_signer_role("QA Manager");
                data.create_signature_template(draft)
            })
            .await
            .expect("valid template");

        let mut draft = DocumentDraft::new();
        draft.title = "BR-2024-118".to_string();
        draft.choose_template(&template);
        draft.signers = vec![SignerDraft {
            name: "Dana Whitfield".to_string(),
            email: "dana@pharmalab.com".to_string(),
            role: "QA Manager".to_string(),
        }];

        store
            .write(|data| data.toggle_signature_template(template.id))
            .await
            .expect("exists");
        let err = store
            .write(|data| data.create_document(draft.clone()))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::Rejected { .. }));

        store
            .write(|data| data.toggle_signature_template(template.id))
            .await
            .expect("exists");
        let document = store
            .write(|data| data.create_document(draft))
            .await
            .expect("active template");

        let signer = document.signers[0].id;
        let status = store
            .write(|data| data.decide_signature(document.id, signer, true, None))
            .await
            .expect("pending signer");
        assert_eq!(status, DocumentStatus::Completed);

        let err = store
            .write(|data| data.decide_signature(document.id, signer, false, None))
            .await
            .unwrap_err();
        assert!(matches!(context(&err), StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn sent_notification_lands_unread_in_inbox() {
        let store = store();
        let template = store
            .write(|data| {
                let mut draft = NotificationTemplateDraft::new();
                draft.name = "OOS".to_string();
                draft.subject = "OOS result for {{sample_id}}".to_string();
                draft.body = "Investigate {{sample_id}}".to_string();
                data.create_notification_template(draft)
            })
            .await
            .expect("valid template");

        let values = BTreeMap::from([("sample_id".to_string(), "S-1042".to_string())]);
        let sent = store
            .write(|data| data.send_notification(template.id, &values))
            .await
            .expect("active template");
        assert_eq!(sent.title, "OOS result for S-1042");

        let overview = store.read(ConsoleData::overview).await;
        assert_eq!(overview.notifications_unread, 1);

        assert_eq!(store.write(|data| data.mark_all_notifications_read()).await, 1);
        store
            .write(|data| data.delete_notification(sent.id))
            .await
            .expect("present");
        assert!(store.read(|data| data.inbox.is_empty()).await);
    }

    #[tokio::test]
    async fn fields_are_added_moved_and_removed() {
        let store = store();
        let page = store
            .write(|data| {
                let mut draft = ModulePageDraft::new();
                draft.name = "Sample Registration".to_string();
                draft.module = "Sample Management".to_string();
                data.create_page(draft)
            })
            .await
            .expect("valid page");

        let field = store
            .write(|data| {
                let draft = FieldDraft {
                    label: "Batch Number".to_string(),
                    field_type: Some(FieldType::Text),
                    ..FieldDraft::default()
                };
                data.add_field(page.id, draft)
            })
            .await
            .expect("valid field");
        assert_eq!(field.key, "batch_number");

        let rect = store
            .write(|data| data.move_field(page.id, field.id, 47, 51))
            .await
            .expect("present");
        assert_eq!((rect.x, rect.y), (40, 60));

        let duplicate = store
            .write(|data| {
                let draft = FieldDraft {
                    label: "Batch number".to_string(),
                    field_type: Some(FieldType::Barcode),
                    ..FieldDraft::default()
                };
                data.add_field(page.id, draft)
            })
            .await
            .unwrap_err();
        assert!(matches!(context(&duplicate), StoreError::Rejected { .. }));

        store
            .write(|data| data.remove_field(page.id, field.id))
            .await
            .expect("present");
        assert_eq!(store.read(ConsoleData::overview).await.custom_fields, 0);
    }
}
