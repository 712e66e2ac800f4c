//! Demonstration data loaded when `SEED__SAMPLE_DATA` is true.

use crate::state::ConsoleData;
use chrono::{DateTime, NaiveDate, Utc};
use pharma_lims_accounts::{AuthorizationLevel, Role, SignatureStatus, User};
use pharma_lims_core::DocumentId;
use pharma_lims_custom_fields::{CustomField, FieldType, ModulePage};
use pharma_lims_notifications::{
    Channel, Notification, NotificationKind, NotificationTemplate, Priority,
};
use pharma_lims_signatures::{
    DocumentSigner, SignatureDocument, SignatureMeaning, SignatureTemplate,
};
use pharma_lims_workflow::{
    DEFAULT_HISTORY_LIMIT, NodeDataPatch, NodeKind, Workflow, WorkflowCategory, WorkflowStatus,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    day.and_hms_opt(hour, minute, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Builds the sample console.
#[must_use]
pub fn sample_data(operator: &str) -> ConsoleData {
    let mut data = ConsoleData::new(operator);
    data.users = users(operator);
    data.workflows = workflows(operator);
    data.signature_templates = signature_templates(operator);
    data.documents = documents(operator, &data.signature_templates);
    data.notification_templates = notification_templates();
    for notification in notifications() {
        data.inbox.push(notification);
    }
    data.pages = pages();
    tracing::info!(
        users = data.users.len(),
        workflows = data.workflows.len(),
        documents = data.documents.len(),
        pages = data.pages.len(),
        "Loaded sample data"
    );
    data
}

fn users(operator: &str) -> Vec<User> {
    let mut admin = User::new(
        "Dana Whitfield",
        "dana.whitfield@pharmalab.com",
        Role::Administrator,
        date(2023, 1, 9),
    );
    admin.record_login(at(date(2024, 3, 14), 8, 42));
    admin.set_signature_status(SignatureStatus::Enabled, operator);
    admin.attach_certificate("dwhitfield_part11.p12", operator);

    let mut lab_manager = User::new(
        "Marcus Oyelaran",
        "marcus.oyelaran@pharmalab.com",
        Role::LabManager,
        date(2023, 2, 20),
    );
    lab_manager.record_login(at(date(2024, 3, 13), 17, 5));
    lab_manager.set_signature_status(SignatureStatus::Enabled, operator);

    let mut qa = User::new(
        "Priya Raman",
        "priya.raman@pharmalab.com",
        Role::QaManager,
        date(2023, 4, 3),
    );
    qa.record_login(at(date(2024, 3, 12), 9, 30));
    qa.set_signature_status(SignatureStatus::Enabled, operator);
    qa.attach_certificate("praman_part11.p12", operator);

    let mut analyst = User::new(
        "Bruno Silva",
        "bruno.silva@pharmalab.com",
        Role::QcAnalyst,
        date(2023, 8, 1),
    );
    analyst.record_login(at(date(2024, 3, 14), 7, 55));

    let mut technician = User::new(
        "Carla Jensen",
        "carla.jensen@pharmalab.com",
        Role::LabTechnician,
        date(2024, 1, 5),
    );
    if let Ok(level) = AuthorizationLevel::new(0) {
        technician.authorization_level = level;
    }

    let mut researcher = User::new(
        "Lee Park",
        "lee.park@pharmalab.com",
        Role::Researcher,
        date(2023, 11, 17),
    );
    researcher.record_login(at(date(2024, 2, 28), 14, 10));

    let mut auditor = User::new(
        "Hannah Vogel",
        "hannah.vogel@pharmalab.com",
        Role::Auditor,
        date(2023, 6, 12),
    );
    auditor.record_login(at(date(2024, 1, 30), 11, 0));
    auditor.toggle_status(operator);

    let viewer = User::new(
        "Tomás Ferreira",
        "tomas.ferreira@pharmalab.com",
        Role::Viewer,
        date(2024, 2, 2),
    );

    vec![
        admin,
        lab_manager,
        qa,
        analyst,
        technician,
        researcher,
        auditor,
        viewer,
    ]
}

fn workflows(operator: &str) -> Vec<Workflow> {
    let mut receipt = Workflow::new(
        "Sample Receipt and Login",
        WorkflowCategory::SampleManagement,
        operator,
        date(2023, 9, 4),
    )
    .with_description("Receive, label and register incoming samples");
    let mut editor = receipt.editor(DEFAULT_HISTORY_LIMIT);
    let start = editor.nodes()[0].id.clone();
    let inspect = editor.add_node(NodeKind::Process);
    editor.update_node_data(
        &inspect,
        NodeDataPatch {
            label: Some("Inspect container".to_string()),
            assignees: Some(vec!["Lab Technician".to_string()]),
            ..NodeDataPatch::default()
        },
    );
    let intact = editor.add_node(NodeKind::Decision);
    let register = editor.add_node(NodeKind::Process);
    editor.update_node_data(
        &register,
        NodeDataPatch {
            label: Some("Register in LIMS".to_string()),
            ..NodeDataPatch::default()
        },
    );
    let notify = editor.add_node(NodeKind::Notification);
    let end = editor.add_node(NodeKind::End);
    editor.connect(&start, &inspect);
    editor.connect(&inspect, &intact);
    editor.connect(&intact, &register);
    editor.connect(&intact, &notify);
    editor.connect(&register, &end);
    editor.connect(&notify, &end);
    receipt.apply_saved(editor.save());
    receipt.status = WorkflowStatus::Active;
    receipt.version = 3;

    let mut release = Workflow::new(
        "Batch Release Review",
        WorkflowCategory::QualityAssurance,
        operator,
        date(2023, 10, 16),
    )
    .with_description("QA review and approval before batch release");
    let mut editor = release.editor(DEFAULT_HISTORY_LIMIT);
    let start = editor.nodes()[0].id.clone();
    let review = editor.add_node(NodeKind::Review);
    let approval = editor.add_node(NodeKind::Approval);
    editor.update_node_data(
        &approval,
        NodeDataPatch {
            label: Some("QA approval".to_string()),
            assignees: Some(vec!["QA Manager".to_string()]),
            ..NodeDataPatch::default()
        },
    );
    let end = editor.add_node(NodeKind::End);
    editor.connect(&start, &review);
    editor.connect(&review, &approval);
    editor.connect(&approval, &end);
    release.apply_saved(editor.save());
    release.status = WorkflowStatus::Active;
    release.version = 2;

    let deviation = Workflow::new(
        "Deviation Investigation",
        WorkflowCategory::DeviationManagement,
        operator,
        date(2024, 2, 21),
    )
    .with_description("Root cause analysis for laboratory deviations");

    let mut calibration = Workflow::new(
        "Balance Calibration",
        WorkflowCategory::EquipmentQualification,
        operator,
        date(2023, 5, 8),
    );
    calibration.status = WorkflowStatus::Inactive;

    vec![receipt, release, deviation, calibration]
}

fn signature_templates(operator: &str) -> Vec<SignatureTemplate> {
    let mut batch = SignatureTemplate::new(
        "Batch Record Approval",
        SignatureMeaning::Approval,
        vec!["QC Analyst".to_string(), "QA Manager".to_string()],
        operator,
        date(2023, 7, 11),
    );
    batch.description = "Two-step sign-off for executed batch records".to_string();

    let sop = SignatureTemplate::new(
        "SOP Review",
        SignatureMeaning::Review,
        vec![
            "Lab Manager".to_string(),
            "QA Manager".to_string(),
            "Administrator".to_string(),
        ],
        operator,
        date(2023, 9, 29),
    );

    let mut coa = SignatureTemplate::new(
        "Certificate of Analysis",
        SignatureMeaning::Authorship,
        vec!["QC Analyst".to_string()],
        operator,
        date(2022, 12, 1),
    );
    coa.toggle_status();

    vec![batch, sop, coa]
}

fn documents(operator: &str, templates: &[SignatureTemplate]) -> Vec<SignatureDocument> {
    let Some(batch) = templates.first() else {
        return Vec::new();
    };
    let sop = templates.get(1).unwrap_or(batch);

    let mut record = SignatureDocument {
        id: DocumentId::new(),
        title: "BR-2024-031 Executed Batch Record".to_string(),
        template_id: batch.id,
        description: "Paracetamol 500 mg, lot 24C031".to_string(),
        created_by: operator.to_string(),
        created_date: date(2024, 3, 11),
        signers: vec![
            DocumentSigner::new("Bruno Silva", "bruno.silva@pharmalab.com", "QC Analyst", 1),
            DocumentSigner::new("Priya Raman", "priya.raman@pharmalab.com", "QA Manager", 2),
        ],
    };
    let analyst = record.signers[0].id;
    if let Err(err) = record.sign(analyst, None, at(date(2024, 3, 12), 10, 15)) {
        tracing::warn!(error = %err, "Could not pre-sign sample document");
    }

    let revision = SignatureDocument {
        id: DocumentId::new(),
        title: "SOP-QC-014 Rev 6".to_string(),
        template_id: sop.id,
        description: "HPLC system suitability".to_string(),
        created_by: operator.to_string(),
        created_date: date(2024, 2, 26),
        signers: vec![
            DocumentSigner::new(
                "Marcus Oyelaran",
                "marcus.oyelaran@pharmalab.com",
                "Lab Manager",
                1,
            ),
            DocumentSigner::new("Priya Raman", "priya.raman@pharmalab.com", "QA Manager", 2),
        ],
    };

    vec![record, revision]
}

fn notification_templates() -> Vec<NotificationTemplate> {
    let mut oos = NotificationTemplate::new(
        "Out of Specification",
        "OOS result for sample {{sample_id}}",
        "Test {{test_name}} on {{sample_id}} returned {{result}}. Start an investigation.",
    );
    oos.kind = NotificationKind::Error;
    oos.priority = Priority::Critical;
    oos.channels = vec![Channel::Email, Channel::InApp, Channel::Sms];
    oos.triggers = vec!["result_out_of_spec".to_string()];
    oos.recipient_groups = vec!["QA Manager".to_string(), "Lab Manager".to_string()];

    let mut calibration = NotificationTemplate::new(
        "Calibration Due",
        "{{instrument}} calibration due",
        "{{instrument}} is due for calibration on {{due_date}}.",
    );
    calibration.kind = NotificationKind::Warning;
    calibration.priority = Priority::High;
    calibration.channels = vec![Channel::Email, Channel::InApp];
    calibration.triggers = vec!["calibration_due".to_string()];
    calibration.recipient_groups = vec!["Lab Technician".to_string()];

    let mut signed = NotificationTemplate::new(
        "Document Signed",
        "{{document}} signed",
        "{{signer}} signed {{document}}.",
    );
    signed.kind = NotificationKind::Success;
    signed.priority = Priority::Low;
    signed.triggers = vec!["document_signed".to_string()];
    signed.toggle_active();

    vec![oos, calibration, signed]
}

fn notifications() -> Vec<Notification> {
    let mut welcome = Notification::new(
        "Sample S-2024-0412 received",
        "Logged by Carla Jensen",
        NotificationKind::Info,
        Priority::Low,
        at(date(2024, 3, 14), 8, 5),
    );
    welcome.read = true;

    vec![
        welcome,
        Notification::new(
            "HPLC-02 calibration due",
            "HPLC-02 is due for calibration on 2024-03-20.",
            NotificationKind::Warning,
            Priority::High,
            at(date(2024, 3, 14), 9, 0),
        ),
        Notification::new(
            "OOS result for sample S-2024-0398",
            "Assay returned 91.2%. Start an investigation.",
            NotificationKind::Error,
            Priority::Critical,
            at(date(2024, 3, 14), 11, 47),
        ),
    ]
}

fn pages() -> Vec<ModulePage> {
    let created = at(date(2024, 1, 22), 13, 0);
    let mut registration = ModulePage::new("Sample Registration", "Sample Management", created);
    registration.description = "Extra fields captured at sample login".to_string();

    let mut batch = CustomField::new("Batch Number", FieldType::Barcode);
    batch.required = true;
    let mut storage = CustomField::new("Storage Condition", FieldType::Select);
    storage.options = vec![
        "Ambient".to_string(),
        "2-8 °C".to_string(),
        "-20 °C".to_string(),
    ];
    let mut temperature = CustomField::new("Receipt Temperature", FieldType::Number);
    temperature.help_text = "Measured at the loading dock, in °C".to_string();
    temperature.validation.min = Some(-80.0);
    temperature.validation.max = Some(40.0);

    for field in [batch, storage, temperature] {
        let label = field.label.clone();
        if let Err(err) = registration.add_field(field) {
            tracing::warn!(error = %err, field = %label, "Skipped sample field");
        }
    }

    let equipment = ModulePage::new("Instrument Record", "Equipment", created);

    vec![registration, equipment]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_lims_signatures::DocumentStatus;

    #[test]
    fn sample_data_covers_every_area() {
        let data = sample_data("Test Admin");
        let overview = data.overview();
        assert_eq!(overview.users_total, 8);
        assert_eq!(overview.users_active, 7);
        assert_eq!(overview.workflows_active, 2);
        assert_eq!(overview.documents_pending, 2);
        assert_eq!(overview.notifications_unread, 2);
        assert_eq!(overview.custom_fields, 3);
    }

    #[test]
    fn seeded_graphs_analyze_clean() {
        let data = sample_data("Test Admin");
        let receipt = &data.workflows[0];
        assert_eq!(receipt.nodes.len(), 6);
        assert!(receipt.editor(DEFAULT_HISTORY_LIMIT).analyze().is_clean());
    }

    #[test]
    fn partially_signed_document_stays_pending() {
        let data = sample_data("Test Admin");
        let record = &data.documents[0];
        assert_eq!(record.status(), DocumentStatus::Pending);
        assert_eq!(record.progress(), (1, 2));
    }
}
