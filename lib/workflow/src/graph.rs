//! Advisory graph analysis using petgraph.
//!
//! Workflows are saved whatever their shape; this report only feeds the
//! warnings panel in the editor.

use crate::edge::{EdgeId, WorkflowEdge};
use crate::node::{NodeId, NodeKind, WorkflowNode};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structural observations about a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphReport {
    pub start_nodes: usize,
    pub end_nodes: usize,
    /// Edges whose source or target is not on the canvas.
    pub dangling_edges: Vec<EdgeId>,
    /// Nodes no start node can reach. Empty when there is no start node.
    pub unreachable_nodes: Vec<NodeId>,
    pub has_cycle: bool,
}

impl GraphReport {
    #[must_use]
    pub fn analyze(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Self {
        let mut graph: DiGraph<&NodeId, ()> = DiGraph::new();
        let index: HashMap<&NodeId, NodeIndex> = nodes
            .iter()
            .map(|node| (&node.id, graph.add_node(&node.id)))
            .collect();

        let mut dangling_edges = Vec::new();
        for edge in edges {
            match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => dangling_edges.push(edge.id.clone()),
            }
        }

        let starts: Vec<NodeIndex> = nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Start)
            .filter_map(|node| index.get(&node.id).copied())
            .collect();

        let mut unreachable_nodes = Vec::new();
        if let Some(&first) = starts.first() {
            let mut dfs = Dfs::new(&graph, first);
            for &start in &starts {
                dfs.move_to(start);
                while dfs.next(&graph).is_some() {}
            }
            unreachable_nodes = nodes
                .iter()
                .filter(|node| {
                    index
                        .get(&node.id)
                        .is_some_and(|&ix| !dfs.discovered.contains(ix.index()))
                })
                .map(|node| node.id.clone())
                .collect();
        }

        Self {
            start_nodes: starts.len(),
            end_nodes: nodes.iter().filter(|node| node.kind == NodeKind::End).count(),
            dangling_edges,
            unreachable_nodes,
            has_cycle: petgraph::algo::is_cyclic_directed(&graph),
        }
    }

    /// Human-readable warnings, empty for a well-formed graph.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.start_nodes {
            0 => warnings.push("Workflow has no start node".to_string()),
            1 => {}
            n => warnings.push(format!("Workflow has {n} start nodes")),
        }
        if self.end_nodes == 0 {
            warnings.push("Workflow has no end node".to_string());
        }
        for edge in &self.dangling_edges {
            warnings.push(format!("Edge {edge} points at a missing node"));
        }
        for node in &self.unreachable_nodes {
            warnings.push(format!("Node {node} is not reachable from a start node"));
        }
        if self.has_cycle {
            warnings.push("Workflow contains a cycle".to_string());
        }
        warnings
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Position;

    fn node(n: u64, kind: NodeKind) -> WorkflowNode {
        WorkflowNode::new(NodeId::numbered(n), kind, Position::grid_slot(n as usize))
    }

    fn edge(n: u64, source: u64, target: u64) -> WorkflowEdge {
        WorkflowEdge::new(
            EdgeId::numbered(n),
            NodeId::numbered(source),
            NodeId::numbered(target),
        )
    }

    #[test]
    fn linear_graph_is_clean() {
        let nodes = vec![
            node(1, NodeKind::Start),
            node(2, NodeKind::Approval),
            node(3, NodeKind::End),
        ];
        let edges = vec![edge(1, 1, 2), edge(2, 2, 3)];

        let report = GraphReport::analyze(&nodes, &edges);
        assert!(report.is_clean(), "{:?}", report.warnings());
    }

    #[test]
    fn start_only_graph_warns_about_missing_end() {
        let report = GraphReport::analyze(&[node(1, NodeKind::Start)], &[]);
        assert_eq!(report.start_nodes, 1);
        assert_eq!(report.warnings(), vec!["Workflow has no end node".to_string()]);
    }

    #[test]
    fn detects_unreachable_and_dangling() {
        let nodes = vec![
            node(1, NodeKind::Start),
            node(2, NodeKind::Process),
            node(3, NodeKind::End),
        ];
        let edges = vec![edge(1, 1, 3), edge(2, 9, 2)];

        let report = GraphReport::analyze(&nodes, &edges);
        assert_eq!(report.unreachable_nodes, vec![NodeId::numbered(2)]);
        assert_eq!(report.dangling_edges, vec![EdgeId::numbered(2)]);
        assert!(!report.has_cycle);
    }

    #[test]
    fn detects_rework_loop() {
        let nodes = vec![
            node(1, NodeKind::Start),
            node(2, NodeKind::Review),
            node(3, NodeKind::Decision),
            node(4, NodeKind::End),
        ];
        let edges = vec![edge(1, 1, 2), edge(2, 2, 3), edge(3, 3, 2), edge(4, 3, 4)];

        let report = GraphReport::analyze(&nodes, &edges);
        assert!(report.has_cycle);
        assert!(report.unreachable_nodes.is_empty());
    }

    #[test]
    fn no_start_node_skips_reachability() {
        let report = GraphReport::analyze(&[node(1, NodeKind::Process)], &[]);
        assert_eq!(report.start_nodes, 0);
        assert!(report.unreachable_nodes.is_empty());
        assert!(report.warnings().contains(&"Workflow has no start node".to_string()));
    }
}
