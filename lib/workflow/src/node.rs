//! Workflow node types.
//!
//! Every node on the canvas has:
//! - An id unique within its workflow (`node_1`, `node_2`, ...)
//! - A kind from the single canonical palette
//! - Display data (label, description, assignees)
//! - A pixel position on the canvas

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal distance between palette drop slots.
pub const GRID_COLUMN_SPACING: f64 = 200.0;
/// Vertical distance between palette drop slots.
pub const GRID_ROW_SPACING: f64 = 120.0;
/// Number of slots per row before wrapping.
pub const GRID_COLUMNS: usize = 3;
/// Top-left corner of the first slot.
pub const GRID_ORIGIN: Position = Position { x: 80.0, y: 80.0 };

/// Identifier of a node within one workflow graph.
///
/// Canvas ids are short strings rather than ULIDs so saved graphs stay
/// readable; the editor hands them out from a monotonic counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id for the `n`th node handed out by an editor.
    #[must_use]
    pub fn numbered(n: u64) -> Self {
        Self(format!("node_{n}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a workflow node.
///
/// The palette and the stored type share this one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point of the workflow.
    Start,
    /// A unit of lab work.
    Process,
    /// A branch on a condition.
    Decision,
    /// A sign-off that can block progress.
    Approval,
    /// A non-blocking review step.
    Review,
    /// Sends a notification to the assignees.
    Notification,
    /// Raises the issue to a higher authority.
    Escalation,
    /// Pauses until a time or event.
    Wait,
    /// Terminal step.
    End,
}

impl NodeKind {
    /// Palette order.
    pub const ALL: [Self; 9] = [
        Self::Start,
        Self::Process,
        Self::Decision,
        Self::Approval,
        Self::Review,
        Self::Notification,
        Self::Escalation,
        Self::Wait,
        Self::End,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Approval => "approval",
            Self::Review => "review",
            Self::Notification => "notification",
            Self::Escalation => "escalation",
            Self::Wait => "wait",
            Self::End => "end",
        }
    }

    /// Default label for a freshly dropped node.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Process => "Process",
            Self::Decision => "Decision",
            Self::Approval => "Approval",
            Self::Review => "Review",
            Self::Notification => "Notification",
            Self::Escalation => "Escalation",
            Self::Wait => "Wait",
            Self::End => "End",
        }
    }

    /// One-line palette hint.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Workflow entry point",
            Self::Process => "Perform a lab or office task",
            Self::Decision => "Branch on a condition",
            Self::Approval => "Require a sign-off",
            Self::Review => "Request a review",
            Self::Notification => "Notify assignees",
            Self::Escalation => "Escalate to a manager",
            Self::Wait => "Pause for a time or event",
            Self::End => "Workflow completion",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| WorkflowError::UnknownValue {
                kind: "node kind",
                value: s.to_string(),
            })
    }
}

/// A canvas position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The drop slot for the `index`th node: three columns, then wrap.
    #[must_use]
    pub fn grid_slot(index: usize) -> Self {
        let col = index % GRID_COLUMNS;
        let row = index / GRID_COLUMNS;
        Self {
            x: GRID_ORIGIN.x + col as f64 * GRID_COLUMN_SPACING,
            y: GRID_ORIGIN.y + row as f64 * GRID_ROW_SPACING,
        }
    }
}

/// Display data carried by a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Names of the people or roles the step is assigned to.
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// A partial update to [`NodeData`]; `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub assignees: Option<Vec<String>>,
}

impl NodeDataPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.description.is_none() && self.assignees.is_none()
    }

    pub fn merge_into(self, data: &mut NodeData) {
        if let Some(label) = self.label {
            data.label = label;
        }
        if let Some(description) = self.description {
            data.description = description;
        }
        if let Some(assignees) = self.assignees {
            data.assignees = assignees;
        }
    }
}

/// A node placed on the workflow canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub data: NodeData,
    pub position: Position,
}

impl WorkflowNode {
    /// Creates a node labelled with its kind's display name.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            data: NodeData {
                label: kind.label().to_string(),
                ..NodeData::default()
            },
            position,
        }
    }

    /// The start node every new workflow begins with.
    #[must_use]
    pub fn default_start() -> Self {
        Self::new(NodeId::numbered(1), NodeKind::Start, Position::grid_slot(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_slots_wrap_after_three_columns() {
        assert_eq!(Position::grid_slot(0), Position::new(80.0, 80.0));
        assert_eq!(Position::grid_slot(2), Position::new(480.0, 80.0));
        assert_eq!(Position::grid_slot(3), Position::new(80.0, 200.0));
        assert_eq!(Position::grid_slot(7), Position::new(280.0, 320.0));
    }

    #[test]
    fn node_kind_parses_case_insensitively() {
        assert_eq!("Approval".parse::<NodeKind>().ok(), Some(NodeKind::Approval));
        assert_eq!("wait".parse::<NodeKind>().ok(), Some(NodeKind::Wait));
        assert!("trigger".parse::<NodeKind>().is_err());
    }

    #[test]
    fn node_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::Escalation).expect("serialize");
        assert_eq!(json, "\"escalation\"");
    }

    #[test]
    fn new_node_takes_kind_label() {
        let node = WorkflowNode::new(NodeId::numbered(4), NodeKind::Review, Position::default());
        assert_eq!(node.data.label, "Review");
        assert!(node.data.assignees.is_empty());
        assert_eq!(node.id.as_str(), "node_4");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut data = NodeData {
            label: "QA Review".to_string(),
            description: "Check batch record".to_string(),
            assignees: vec!["QA Manager".to_string()],
        };
        NodeDataPatch {
            description: Some("Check batch record and COA".to_string()),
            ..NodeDataPatch::default()
        }
        .merge_into(&mut data);

        assert_eq!(data.label, "QA Review");
        assert_eq!(data.description, "Check batch record and COA");
        assert_eq!(data.assignees, vec!["QA Manager".to_string()]);
    }
}
