//! Edge types for workflow graphs.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an edge within one workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id for the `n`th edge handed out by an editor.
    #[must_use]
    pub fn numbered(n: u64) -> Self {
        Self(format!("edge_{n}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed connection between two nodes.
///
/// Endpoints are not checked against the node list; a saved graph may
/// carry edges whose nodes were since removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WorkflowEdge {
    #[must_use]
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true if this edge connects `source` to `target`.
    #[must_use]
    pub fn joins(&self, source: &NodeId, target: &NodeId) -> bool {
        &self.source == source && &self.target == target
    }

    /// Returns true if either endpoint is `node`.
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_is_directional() {
        let a = NodeId::numbered(1);
        let b = NodeId::numbered(2);
        let edge = WorkflowEdge::new(EdgeId::numbered(1), a.clone(), b.clone());

        assert!(edge.joins(&a, &b));
        assert!(!edge.joins(&b, &a));
        assert!(edge.touches(&b));
    }

    #[test]
    fn unlabelled_edge_omits_label_in_json() {
        let edge = WorkflowEdge::new(EdgeId::numbered(3), NodeId::numbered(1), NodeId::numbered(2));
        let json = serde_json::to_string(&edge).expect("serialize");
        assert_eq!(json, r#"{"id":"edge_3","source":"node_1","target":"node_2"}"#);

        let labelled = edge.with_label("Pass");
        let parsed: WorkflowEdge =
            serde_json::from_str(&serde_json::to_string(&labelled).expect("serialize"))
                .expect("deserialize");
        assert_eq!(parsed.label.as_deref(), Some("Pass"));
    }
}
