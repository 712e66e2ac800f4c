//! Approval workflows for the Pharma LIMS console.
//!
//! This crate provides:
//!
//! - **Definitions**: `Workflow` metadata, categories, status and the form draft
//! - **Graph Model**: nodes drawn from one canonical `NodeKind` palette, and edges
//! - **Canvas Editor**: add/connect/move/remove with bounded undo/redo history
//! - **Shortcuts**: key chord to editor command mapping
//! - **Analysis**: advisory petgraph checks that never block saving

pub mod canvas;
pub mod definition;
pub mod edge;
pub mod error;
pub mod graph;
pub mod history;
pub mod node;
pub mod shortcut;

pub use canvas::{CanvasEditor, EdgeChange, GraphSnapshot, NodeChange, SavedGraph};
pub use definition::{Workflow, WorkflowCategory, WorkflowDraft, WorkflowStatus};
pub use edge::{EdgeId, WorkflowEdge};
pub use error::WorkflowError;
pub use graph::GraphReport;
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use node::{NodeData, NodeDataPatch, NodeId, NodeKind, Position, WorkflowNode};
pub use shortcut::{EditorCommand, KeyChord};
