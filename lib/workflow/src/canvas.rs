//! The workflow canvas editor model.
//!
//! `CanvasEditor` owns the node and edge lists shown on the canvas plus a
//! bounded history of snapshots. Every mutation that changes the graph
//! pushes exactly one snapshot; `undo`/`redo` restore a snapshot wholesale.
//! The editor never validates graph shape. Use [`CanvasEditor::analyze`] for
//! advisory warnings.

use crate::edge::{EdgeId, WorkflowEdge};
use crate::graph::GraphReport;
use crate::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::node::{NodeDataPatch, NodeId, NodeKind, Position, WorkflowNode};
use crate::shortcut::EditorCommand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The node and edge lists at one point in the edit history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// What the editor hands back to the workflow on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    pub last_modified: DateTime<Utc>,
}

/// A node change reported by the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeChange {
    /// The node was dragged to a new position.
    Position { id: NodeId, position: Position },
    /// The node was deleted; its edges go with it.
    Remove { id: NodeId },
}

/// An edge change reported by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeChange {
    Remove { id: EdgeId },
}

/// Editing state for one workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEditor {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    history: History<GraphSnapshot>,
    next_node: u64,
    next_edge: u64,
}

impl CanvasEditor {
    /// Opens an editor over an existing graph with the default history limit.
    #[must_use]
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self::with_history_limit(nodes, edges, DEFAULT_HISTORY_LIMIT)
    }

    #[must_use]
    pub fn with_history_limit(
        nodes: Vec<WorkflowNode>,
        edges: Vec<WorkflowEdge>,
        limit: usize,
    ) -> Self {
        let snapshot = GraphSnapshot {
            nodes: nodes.clone(),
            edges: edges.clone(),
        };
        Self {
            next_node: nodes.len() as u64 + 1,
            next_edge: edges.len() as u64 + 1,
            nodes,
            edges,
            history: History::new(snapshot, limit),
        }
    }

    /// An editor holding only the default start node.
    #[must_use]
    pub fn for_new_workflow() -> Self {
        Self::new(vec![WorkflowNode::default_start()], Vec::new())
    }

    #[must_use]
    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    /// Drops a node of `kind` into the next grid slot and returns its id.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.fresh_node_id();
        let position = Position::grid_slot(self.nodes.len());
        self.nodes.push(WorkflowNode::new(id.clone(), kind, position));
        self.snapshot();
        id
    }

    /// Connects `source` to `target`.
    ///
    /// Self-loops and exact duplicates are ignored. Returns whether an edge
    /// was added; history only moves when it was.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> bool {
        if source == target || self.edges.iter().any(|edge| edge.joins(source, target)) {
            tracing::debug!(%source, %target, "Ignored self-loop or duplicate connection");
            return false;
        }
        let id = self.fresh_edge_id();
        self.edges
            .push(WorkflowEdge::new(id, source.clone(), target.clone()));
        self.snapshot();
        true
    }

    /// Applies a batch of node changes as a single history step.
    pub fn apply_node_changes(&mut self, changes: impl IntoIterator<Item = NodeChange>) {
        let mut applied = false;
        for change in changes {
            applied = true;
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
                        node.position = position;
                    }
                }
                NodeChange::Remove { id } => {
                    self.nodes.retain(|node| node.id != id);
                    self.edges.retain(|edge| !edge.touches(&id));
                }
            }
        }
        if applied {
            self.snapshot();
        }
    }

    /// Applies a batch of edge changes as a single history step.
    pub fn apply_edge_changes(&mut self, changes: impl IntoIterator<Item = EdgeChange>) {
        let mut applied = false;
        for change in changes {
            applied = true;
            match change {
                EdgeChange::Remove { id } => self.edges.retain(|edge| edge.id != id),
            }
        }
        if applied {
            self.snapshot();
        }
    }

    /// Merges `patch` into one node's data. Unknown ids change nothing.
    pub fn update_node_data(&mut self, id: &NodeId, patch: NodeDataPatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|node| &node.id == id) else {
            return false;
        };
        patch.merge_into(&mut node.data);
        self.snapshot();
        true
    }

    /// Restores the previous snapshot. Returns false at the oldest one.
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot. Returns false at the newest one.
    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Runs a keyboard command.
    pub fn execute(&mut self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
        }
    }

    /// Copies the current graph out for the owning workflow.
    #[must_use]
    pub fn save(&self) -> SavedGraph {
        SavedGraph {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            last_modified: Utc::now(),
        }
    }

    /// Advisory checks over the current graph.
    #[must_use]
    pub fn analyze(&self) -> GraphReport {
        GraphReport::analyze(&self.nodes, &self.edges)
    }

    fn snapshot(&mut self) {
        self.history.push(GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        });
    }

    fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
    }

    // Counters only move forward, so an id removed and then undone is never
    // handed to a different node.
    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::numbered(self.next_node);
            self.next_node += 1;
            if self.node_id_in_use(&id) {
                continue;
            }
            return id;
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            let id = EdgeId::numbered(self.next_edge);
            self.next_edge += 1;
            if self.edges.iter().any(|edge| edge.id == id) {
                continue;
            }
            return id;
        }
    }

    fn node_id_in_use(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|node| &node.id == id)
            || self.edges.iter().any(|edge| edge.touches(id))
    }
}

impl Default for CanvasEditor {
    fn default() -> Self {
        Self::for_new_workflow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(editor: &CanvasEditor) -> Vec<&str> {
        editor.nodes().iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn new_workflow_editor_holds_start_node() {
        let editor = CanvasEditor::for_new_workflow();
        assert_eq!(ids(&editor), vec!["node_1"]);
        assert_eq!(editor.nodes()[0].kind, NodeKind::Start);
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn add_node_uses_grid_and_fresh_id() {
        let mut editor = CanvasEditor::for_new_workflow();
        let id = editor.add_node(NodeKind::Approval);

        assert_eq!(id.as_str(), "node_2");
        let node = editor.node(&id).expect("added");
        assert_eq!(node.position, Position::new(280.0, 80.0));
        assert_eq!(node.data.label, "Approval");
        assert_eq!(editor.history_len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut editor = CanvasEditor::for_new_workflow();
        let first = editor.add_node(NodeKind::Process);
        editor.apply_node_changes([NodeChange::Remove { id: first.clone() }]);
        let second = editor.add_node(NodeKind::Process);

        assert_ne!(first, second);
    }

    #[test]
    fn undo_redo_walks_every_add_node_step() {
        let mut editor = CanvasEditor::for_new_workflow();
        let mut states = vec![editor.nodes().to_vec()];
        for n in 0..40 {
            editor.add_node(NodeKind::ALL[n % NodeKind::ALL.len()]);
            states.push(editor.nodes().to_vec());
        }

        for expected in states.iter().rev().skip(1) {
            assert!(editor.undo());
            assert_eq!(editor.nodes(), expected.as_slice());
        }
        assert!(!editor.undo());
        assert_eq!(editor.history_index(), 0);

        for expected in states.iter().skip(1) {
            assert!(editor.redo());
            assert_eq!(editor.nodes(), expected.as_slice());
        }
        assert!(!editor.redo());
        assert_eq!(editor.history_index(), editor.history_len() - 1);
    }

    #[test]
    fn history_overflow_keeps_index_consistent() {
        let mut editor = CanvasEditor::for_new_workflow();
        for _ in 0..60 {
            editor.add_node(NodeKind::Process);
        }

        assert_eq!(editor.history_len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(editor.history_index(), DEFAULT_HISTORY_LIMIT - 1);
        assert!(!editor.redo());

        let mut undone = 0;
        while editor.undo() {
            undone += 1;
        }
        assert_eq!(undone, DEFAULT_HISTORY_LIMIT - 1);
        assert_eq!(editor.nodes().len(), 61 - (DEFAULT_HISTORY_LIMIT - 1));
    }

    #[test]
    fn connect_rejects_self_loops_and_duplicates() {
        let mut editor = CanvasEditor::for_new_workflow();
        let start = editor.nodes()[0].id.clone();
        let end = editor.add_node(NodeKind::End);
        let steps = editor.history_len();

        assert!(editor.connect(&start, &end));
        assert!(!editor.connect(&start, &end));
        assert!(!editor.connect(&end, &end));
        assert!(editor.connect(&end, &start));

        assert_eq!(editor.edges().len(), 2);
        assert_eq!(editor.history_len(), steps + 2);
    }

    #[test]
    fn removing_node_drops_incident_edges_in_one_step() {
        let mut editor = CanvasEditor::for_new_workflow();
        let start = editor.nodes()[0].id.clone();
        let review = editor.add_node(NodeKind::Review);
        let end = editor.add_node(NodeKind::End);
        editor.connect(&start, &review);
        editor.connect(&review, &end);
        let steps = editor.history_len();

        editor.apply_node_changes([NodeChange::Remove { id: review }]);

        assert_eq!(ids(&editor), vec!["node_1", "node_3"]);
        assert!(editor.edges().is_empty());
        assert_eq!(editor.history_len(), steps + 1);

        assert!(editor.undo());
        assert_eq!(editor.edges().len(), 2);
    }

    #[test]
    fn position_batch_is_one_history_step() {
        let mut editor = CanvasEditor::for_new_workflow();
        let a = editor.nodes()[0].id.clone();
        let b = editor.add_node(NodeKind::Wait);
        let steps = editor.history_len();

        editor.apply_node_changes([
            NodeChange::Position { id: a.clone(), position: Position::new(10.0, 20.0) },
            NodeChange::Position { id: b, position: Position::new(30.0, 40.0) },
        ]);
        editor.apply_node_changes(Vec::new());

        assert_eq!(editor.history_len(), steps + 1);
        assert_eq!(editor.node(&a).map(|n| n.position), Some(Position::new(10.0, 20.0)));
    }

    #[test]
    fn edge_removal_is_undoable() {
        let mut editor = CanvasEditor::for_new_workflow();
        let start = editor.nodes()[0].id.clone();
        let end = editor.add_node(NodeKind::End);
        editor.connect(&start, &end);
        let edge = editor.edges()[0].id.clone();

        editor.apply_edge_changes([EdgeChange::Remove { id: edge }]);
        assert!(editor.edges().is_empty());
        assert!(editor.undo());
        assert_eq!(editor.edges().len(), 1);
    }

    #[test]
    fn update_node_data_merges_and_ignores_unknown_ids() {
        let mut editor = CanvasEditor::for_new_workflow();
        let id = editor.add_node(NodeKind::Approval);
        let steps = editor.history_len();

        let patch = NodeDataPatch {
            assignees: Some(vec!["QA Manager".to_string()]),
            ..NodeDataPatch::default()
        };
        assert!(editor.update_node_data(&id, patch.clone()));
        assert!(!editor.update_node_data(&NodeId::new("node_99"), patch));

        let node = editor.node(&id).expect("present");
        assert_eq!(node.data.label, "Approval");
        assert_eq!(node.data.assignees, vec!["QA Manager".to_string()]);
        assert_eq!(editor.history_len(), steps + 1);
    }

    #[test]
    fn mutation_after_undo_discards_redo() {
        let mut editor = CanvasEditor::for_new_workflow();
        editor.add_node(NodeKind::Process);
        editor.add_node(NodeKind::Decision);
        editor.undo();
        editor.add_node(NodeKind::End);

        assert!(!editor.can_redo());
        assert_eq!(editor.nodes().last().map(|n| n.kind), Some(NodeKind::End));
    }

    #[test]
    fn start_only_graph_saves_without_validation() {
        let editor = CanvasEditor::for_new_workflow();
        let saved = editor.save();

        assert_eq!(saved.nodes.len(), 1);
        assert!(saved.edges.is_empty());
    }

    #[test]
    fn execute_dispatches_shortcuts() {
        let mut editor = CanvasEditor::for_new_workflow();
        editor.add_node(NodeKind::Process);

        assert!(editor.execute(EditorCommand::Undo));
        assert_eq!(editor.nodes().len(), 1);
        assert!(editor.execute(EditorCommand::Redo));
        assert_eq!(editor.nodes().len(), 2);
    }
}
