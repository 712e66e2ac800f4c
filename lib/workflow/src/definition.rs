//! Workflow definitions.
//!
//! A `Workflow` is an approval process owned by the lab: its metadata plus
//! the graph last saved from the canvas editor.

use crate::canvas::{CanvasEditor, SavedGraph};
use crate::edge::WorkflowEdge;
use crate::error::WorkflowError;
use crate::node::WorkflowNode;
use chrono::{DateTime, NaiveDate, Utc};
use pharma_lims_core::{FieldErrors, WorkflowId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The business area a workflow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowCategory {
    #[serde(rename = "Sample Management")]
    SampleManagement,
    #[serde(rename = "Quality Control")]
    QualityControl,
    #[serde(rename = "Quality Assurance")]
    QualityAssurance,
    #[serde(rename = "Document Control")]
    DocumentControl,
    #[serde(rename = "Deviation Management")]
    DeviationManagement,
    #[serde(rename = "Change Control")]
    ChangeControl,
    #[serde(rename = "Equipment Qualification")]
    EquipmentQualification,
    Training,
}

impl WorkflowCategory {
    pub const ALL: [Self; 8] = [
        Self::SampleManagement,
        Self::QualityControl,
        Self::QualityAssurance,
        Self::DocumentControl,
        Self::DeviationManagement,
        Self::ChangeControl,
        Self::EquipmentQualification,
        Self::Training,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SampleManagement => "Sample Management",
            Self::QualityControl => "Quality Control",
            Self::QualityAssurance => "Quality Assurance",
            Self::DocumentControl => "Document Control",
            Self::DeviationManagement => "Deviation Management",
            Self::ChangeControl => "Change Control",
            Self::EquipmentQualification => "Equipment Qualification",
            Self::Training => "Training",
        }
    }
}

impl fmt::Display for WorkflowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowCategory {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| WorkflowError::UnknownValue {
                kind: "workflow category",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl WorkflowStatus {
    pub const ALL: [Self; 3] = [Self::Draft, Self::Active, Self::Inactive];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WorkflowError::UnknownValue {
                kind: "workflow status",
                value: s.to_string(),
            })
    }
}

/// A complete workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub description: String,
    pub category: WorkflowCategory,
    pub status: WorkflowStatus,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    pub created_by: String,
    pub created_date: NaiveDate,
    pub last_modified: DateTime<Utc>,
    /// Bumped by the author; nothing checks it only grows.
    pub version: u32,
}

impl Workflow {
    /// Creates a Draft workflow holding only the default start node.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: WorkflowCategory,
        created_by: impl Into<String>,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            name: name.into(),
            description: String::new(),
            category,
            status: WorkflowStatus::Draft,
            nodes: vec![WorkflowNode::default_start()],
            edges: Vec::new(),
            created_by: created_by.into(),
            created_date,
            last_modified: Utc::now(),
            version: 1,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Opens a canvas editor over this workflow's graph.
    #[must_use]
    pub fn editor(&self, history_limit: usize) -> CanvasEditor {
        CanvasEditor::with_history_limit(self.nodes.clone(), self.edges.clone(), history_limit)
    }

    /// Replaces the graph with one saved from the editor.
    pub fn apply_saved(&mut self, saved: SavedGraph) {
        self.nodes = saved.nodes;
        self.edges = saved.edges;
        self.last_modified = saved.last_modified;
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Marks the workflow as updated.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Form state for creating a workflow or editing its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDraft {
    pub name: String,
    pub description: String,
    pub category: Option<WorkflowCategory>,
    pub status: WorkflowStatus,
    pub version: u32,
}

impl Default for WorkflowDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: None,
            status: WorkflowStatus::Draft,
            version: 1,
        }
    }
}

impl WorkflowDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self {
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            category: Some(workflow.category),
            status: workflow.status,
            version: workflow.version,
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Workflow name is required");
        if self.category.is_none() {
            errors.insert("category", "Category is required");
        }
        if self.version == 0 {
            errors.insert("version", "Version must be at least 1");
        }
        errors
    }

    /// Builds a new workflow with the default start node.
    pub fn into_workflow(
        self,
        created_by: &str,
        created_date: NaiveDate,
    ) -> Result<Workflow, FieldErrors> {
        let category = self.checked_category()?;
        let mut workflow = Workflow::new(self.name.trim(), category, created_by, created_date)
            .with_description(self.description.trim());
        workflow.status = self.status;
        workflow.version = self.version;
        Ok(workflow)
    }

    /// Writes the metadata over `workflow`, leaving its graph alone.
    pub fn apply_to(self, workflow: &mut Workflow) -> Result<(), FieldErrors> {
        let category = self.checked_category()?;
        workflow.name = self.name.trim().to_string();
        workflow.description = self.description.trim().to_string();
        workflow.category = category;
        workflow.status = self.status;
        workflow.version = self.version;
        workflow.touch();
        Ok(())
    }

    fn checked_category(&self) -> Result<WorkflowCategory, FieldErrors> {
        let errors = self.validate();
        match self.category {
            Some(category) if errors.is_empty() => Ok(category),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).expect("valid date")
    }

    #[test]
    fn new_workflow_is_draft_with_start_node() {
        let workflow = Workflow::new("OOS Investigation", WorkflowCategory::QualityControl, "admin", created());

        assert_eq!(workflow.status, WorkflowStatus::Draft);
        assert_eq!(workflow.version, 1);
        assert_eq!(workflow.node_count(), 1);
        assert_eq!(workflow.nodes[0].kind, NodeKind::Start);
        assert!(workflow.edges.is_empty());
    }

    #[test]
    fn saving_start_only_graph_keeps_draft() {
        let mut workflow =
            Workflow::new("Batch Release", WorkflowCategory::QualityAssurance, "admin", created());
        let editor = workflow.editor(50);

        workflow.apply_saved(editor.save());

        assert_eq!(workflow.status, WorkflowStatus::Draft);
        assert_eq!(workflow.node_count(), 1);
        assert!(workflow.edges.is_empty());
    }

    #[test]
    fn saved_graph_replaces_nodes_and_edges() {
        let mut workflow =
            Workflow::new("Deviation Triage", WorkflowCategory::DeviationManagement, "admin", created());
        let mut editor = workflow.editor(50);
        let start = editor.nodes()[0].id.clone();
        let end = editor.add_node(NodeKind::End);
        editor.connect(&start, &end);

        let saved = editor.save();
        let stamp = saved.last_modified;
        workflow.apply_saved(saved);

        assert_eq!(workflow.node_count(), 2);
        assert_eq!(workflow.edges.len(), 1);
        assert_eq!(workflow.last_modified, stamp);
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&WorkflowCategory::EquipmentQualification).expect("serialize");
        assert_eq!(json, "\"Equipment Qualification\"");
        assert_eq!(
            "Change Control".parse::<WorkflowCategory>().ok(),
            Some(WorkflowCategory::ChangeControl)
        );
    }

    #[test]
    fn draft_requires_name_and_category() {
        let errors = WorkflowDraft::new().validate();
        assert_eq!(errors.get("name"), Some("Workflow name is required"));
        assert_eq!(errors.get("category"), Some("Category is required"));
        assert!(!errors.has("version"));
    }

    #[test]
    fn draft_builds_and_edits_workflow() {
        let draft = WorkflowDraft {
            name: " Sample Receipt ".to_string(),
            category: Some(WorkflowCategory::SampleManagement),
            ..WorkflowDraft::default()
        };
        let mut workflow = draft.into_workflow("admin", created()).expect("valid");
        assert_eq!(workflow.name, "Sample Receipt");

        let mut edit = WorkflowDraft::from_workflow(&workflow);
        edit.status = WorkflowStatus::Active;
        edit.version = 2;
        edit.apply_to(&mut workflow).expect("valid");

        assert_eq!(workflow.status, WorkflowStatus::Active);
        assert_eq!(workflow.version, 2);
        assert_eq!(workflow.node_count(), 1);
    }

    #[test]
    fn zero_version_is_rejected() {
        let draft = WorkflowDraft {
            name: "Training Sign-off".to_string(),
            category: Some(WorkflowCategory::Training),
            version: 0,
            ..WorkflowDraft::default()
        };
        assert!(draft.into_workflow("admin", created()).is_err());
    }
}
