//! Canvas tab: node palette, SVG canvas and node panel.

use crate::pages::form::{join_list, split_list};
use leptos::prelude::*;
use pharma_lims_workflow::{
    CanvasEditor, EdgeChange, NodeChange, NodeDataPatch, NodeId, NodeKind, Position, WorkflowNode,
};

/// Node dimensions for layout calculations.
const NODE_WIDTH: f64 = 160.0;
const NODE_HEIGHT: f64 = 60.0;

/// A node being dragged and where it would land.
#[derive(Clone, Debug, PartialEq)]
struct Drag {
    id: NodeId,
    position: Position,
    last_mouse: (f64, f64),
}

/// Bezier path from a source's output port to a target's input port.
fn edge_path(source: Position, target: Position) -> String {
    let x1 = source.x + NODE_WIDTH;
    let y1 = source.y + NODE_HEIGHT / 2.0;
    let x2 = target.x;
    let y2 = target.y + NODE_HEIGHT / 2.0;
    let ctrl_offset = ((x2 - x1).abs() / 2.0).max(50.0);
    format!(
        "M {} {} C {} {} {} {} {} {}",
        x1,
        y1,
        x1 + ctrl_offset,
        y1,
        x2 - ctrl_offset,
        y2,
        x2,
        y2
    )
}

/// Where `node` is drawn, taking an in-flight drag into account.
fn drawn_position(node: &WorkflowNode, drag: Option<&Drag>) -> Position {
    match drag {
        Some(drag) if drag.id == node.id => drag.position,
        _ => node.position,
    }
}

/// Canvas tab content: palette toolbar, canvas and node panel.
#[component]
pub fn EditorTabContent(editor: RwSignal<CanvasEditor>) -> impl IntoView {
    let (selected, set_selected) = signal(Option::<NodeId>::None);
    let (connecting_from, set_connecting_from) = signal(Option::<NodeId>::None);

    let add_node = move |kind: NodeKind| {
        let mut id = None;
        editor.update(|e| id = Some(e.add_node(kind)));
        set_selected.set(id);
    };

    view! {
        <div class="editor-content">
            <div class="node-toolbar">
                <span class="toolbar-label">"Add Step:"</span>
                {NodeKind::ALL.into_iter().map(|kind| view! {
                    <button
                        class=format!("toolbar-btn {}", kind.as_str())
                        title=kind.description()
                        on:click=move |_| add_node(kind)
                    >{kind.label()}</button>
                }).collect_view()}
                <span class="toolbar-spacer"></span>
                <button
                    class="toolbar-btn"
                    title="Undo (Ctrl+Z)"
                    disabled=move || editor.with(|e| !e.can_undo())
                    on:click=move |_| editor.update(|e| {
                        e.undo();
                    })
                >"Undo"</button>
                <button
                    class="toolbar-btn"
                    title="Redo (Ctrl+Y)"
                    disabled=move || editor.with(|e| !e.can_redo())
                    on:click=move |_| editor.update(|e| {
                        e.redo();
                    })
                >"Redo"</button>
                {move || connecting_from.get().map(|_| view! {
                    <span class="connecting-hint">"Click a step to connect, or "</span>
                    <button class="cancel-btn" on:click=move |_| set_connecting_from.set(None)>"Cancel"</button>
                })}
            </div>

            <AnalysisWarnings editor=editor/>

            <div class="editor-layout">
                <NodeCanvas
                    editor=editor
                    selected=selected
                    set_selected=set_selected
                    connecting_from=connecting_from
                    set_connecting_from=set_connecting_from
                />

                <NodePanel
                    editor=editor
                    selected=selected
                    set_selected=set_selected
                />
            </div>
        </div>
    }
}

/// Advisory graph checks; saving is never blocked by them.
#[component]
fn AnalysisWarnings(editor: RwSignal<CanvasEditor>) -> impl IntoView {
    move || {
        let warnings = editor.with(|e| e.analyze().warnings());
        (!warnings.is_empty()).then(|| view! {
            <ul class="analysis-warnings">
                {warnings.into_iter().map(|w| view! { <li class="warning">{w}</li> }).collect_view()}
            </ul>
        })
    }
}

/// SVG-based visual node canvas.
#[component]
fn NodeCanvas(
    editor: RwSignal<CanvasEditor>,
    selected: ReadSignal<Option<NodeId>>,
    set_selected: WriteSignal<Option<NodeId>>,
    connecting_from: ReadSignal<Option<NodeId>>,
    set_connecting_from: WriteSignal<Option<NodeId>>,
) -> impl IntoView {
    // Dragging moves a preview; the editor sees one change on release
    let drag = RwSignal::new(Option::<Drag>::None);

    let on_mouse_move = move |ev: leptos::ev::MouseEvent| {
        if drag.with_untracked(Option::is_none) {
            return;
        }
        let current = (f64::from(ev.client_x()), f64::from(ev.client_y()));
        drag.update(|d| {
            if let Some(d) = d {
                d.position.x += current.0 - d.last_mouse.0;
                d.position.y += current.1 - d.last_mouse.1;
                d.last_mouse = current;
            }
        });
    };

    let finish_drag = move || {
        let Some(done) = drag.get_untracked() else {
            return;
        };
        drag.set(None);
        let moved = editor
            .with_untracked(|e| e.node(&done.id).map(|n| n.position != done.position))
            .unwrap_or(false);
        if moved {
            editor.update(|e| {
                e.apply_node_changes([NodeChange::Position {
                    id: done.id,
                    position: done.position,
                }]);
            });
        }
    };

    let delete_node = move |id: NodeId| {
        if selected.get_untracked().as_ref() == Some(&id) {
            set_selected.set(None);
        }
        editor.update(|e| e.apply_node_changes([NodeChange::Remove { id }]));
    };

    view! {
        <div class="node-canvas-container">
            <svg
                class="node-canvas-svg"
                viewBox="0 0 800 500"
                on:mousemove=on_mouse_move
                on:mouseup=move |_| finish_drag()
                on:mouseleave=move |_| finish_drag()
            >
                <defs>
                    <pattern id="grid" width="20" height="20" patternUnits="userSpaceOnUse">
                        <path d="M 20 0 L 0 0 0 20" fill="none" stroke="#2a2a2a" stroke-width="0.5"/>
                    </pattern>
                    <marker id="arrowhead" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto">
                        <polygon points="0 0, 10 3.5, 0 7" fill="#666"/>
                    </marker>
                </defs>
                <rect width="100%" height="100%" fill="url(#grid)"/>

                // Edges under nodes
                {move || {
                    let current = drag.get();
                    editor.with(|e| {
                        e.edges().iter().filter_map(|edge| {
                            let source = e.node(&edge.source)?;
                            let target = e.node(&edge.target)?;
                            let path = edge_path(
                                drawn_position(source, current.as_ref()),
                                drawn_position(target, current.as_ref()),
                            );
                            let edge_id = edge.id.clone();
                            Some(view! {
                                <g class="edge-group">
                                    <path
                                        class="edge-path"
                                        d=path.clone()
                                        fill="none"
                                        stroke="#666"
                                        stroke-width="2"
                                        marker-end="url(#arrowhead)"
                                    />
                                    <path
                                        class="edge-hitbox"
                                        d=path
                                        fill="none"
                                        stroke="transparent"
                                        stroke-width="10"
                                        on:click=move |_| {
                                            let id = edge_id.clone();
                                            editor.update(|e| e.apply_edge_changes([EdgeChange::Remove { id }]));
                                        }
                                    />
                                    {edge.label.clone().map(|label| {
                                        let mid = edge_midpoint(
                                            drawn_position(source, current.as_ref()),
                                            drawn_position(target, current.as_ref()),
                                        );
                                        view! {
                                            <text class="edge-label" x=mid.x y=mid.y text-anchor="middle">{label}</text>
                                        }
                                    })}
                                </g>
                            })
                        }).collect_view()
                    })
                }}

                // Nodes
                {move || {
                    let current = drag.get();
                    let sel_id = selected.get();
                    let is_connecting = connecting_from.get().is_some();
                    editor.with(|e| {
                        e.nodes().iter().map(|node| {
                            let position = drawn_position(node, current.as_ref());
                            let is_selected = sel_id.as_ref() == Some(&node.id);
                            let id_down = node.id.clone();
                            let id_port = node.id.clone();
                            let id_delete = node.id.clone();
                            view! {
                                <g
                                    class=format!(
                                        "workflow-node node-type-{} {}",
                                        node.kind.as_str(),
                                        if is_selected { "selected" } else { "" }
                                    )
                                    transform=format!("translate({}, {})", position.x, position.y)
                                    on:mousedown=move |ev: leptos::ev::MouseEvent| {
                                        ev.prevent_default();
                                        if let Some(from) = connecting_from.get_untracked() {
                                            editor.update(|e| {
                                                e.connect(&from, &id_down);
                                            });
                                            set_connecting_from.set(None);
                                        } else {
                                            set_selected.set(Some(id_down.clone()));
                                            drag.set(Some(Drag {
                                                id: id_down.clone(),
                                                position,
                                                last_mouse: (f64::from(ev.client_x()), f64::from(ev.client_y())),
                                            }));
                                        }
                                    }
                                >
                                    <rect class="node-bg" width=NODE_WIDTH height=NODE_HEIGHT rx="6" ry="6"/>
                                    <rect class="node-type-bar" width=NODE_WIDTH height="6" rx="6" ry="6"/>
                                    <rect class="node-type-bar-bottom" y="3" width=NODE_WIDTH height="3"/>
                                    <text class="node-label" x=NODE_WIDTH / 2.0 y="28" text-anchor="middle">
                                        {node.data.label.clone()}
                                    </text>
                                    <text class="node-type-text" x=NODE_WIDTH / 2.0 y="45" text-anchor="middle">
                                        {node.kind.label()}
                                    </text>

                                    <circle class="port input-port" cx="0" cy=NODE_HEIGHT / 2.0 r="6"/>
                                    <circle
                                        class=format!("port output-port {}", if is_connecting { "connecting" } else { "" })
                                        cx=NODE_WIDTH
                                        cy=NODE_HEIGHT / 2.0
                                        r="6"
                                        on:mousedown=move |ev: leptos::ev::MouseEvent| {
                                            ev.stop_propagation();
                                            set_connecting_from.set(Some(id_port.clone()));
                                        }
                                    />

                                    <g
                                        class="delete-btn"
                                        transform=format!("translate({}, 0)", NODE_WIDTH - 16.0)
                                        on:mousedown=move |ev: leptos::ev::MouseEvent| {
                                            ev.stop_propagation();
                                            delete_node(id_delete.clone());
                                        }
                                    >
                                        <circle cx="8" cy="8" r="8" class="delete-bg"/>
                                        <text x="8" y="12" text-anchor="middle" class="delete-x">"×"</text>
                                    </g>
                                </g>
                            }
                        }).collect_view()
                    })
                }}
            </svg>

            {move || editor.with(|e| e.nodes().is_empty()).then(|| view! {
                <div class="canvas-empty-state">
                    <p>"No steps yet."</p>
                    <p>"Add steps using the toolbar above, then connect them by clicking output ports."</p>
                </div>
            })}
        </div>
    }
}

fn edge_midpoint(source: Position, target: Position) -> Position {
    Position::new(
        (source.x + NODE_WIDTH + target.x) / 2.0,
        (source.y + target.y + NODE_HEIGHT) / 2.0 - 6.0,
    )
}

/// Side panel editing the selected node's data.
///
/// Inputs commit on change; each commit is one undo step.
#[component]
fn NodePanel(
    editor: RwSignal<CanvasEditor>,
    selected: ReadSignal<Option<NodeId>>,
    set_selected: WriteSignal<Option<NodeId>>,
) -> impl IntoView {
    let commit = move |id: NodeId, patch: NodeDataPatch| {
        if patch.is_empty() {
            return;
        }
        editor.update(|e| {
            e.update_node_data(&id, patch);
        });
    };

    view! {
        <div class="node-config-panel">
            {move || {
                let node = selected
                    .get()
                    .and_then(|id| editor.with(|e| e.node(&id).cloned()));
                match node {
                    Some(node) => {
                        let id_label = node.id.clone();
                        let id_desc = node.id.clone();
                        let id_assign = node.id.clone();
                        view! {
                            <div class="config-content">
                                <div class="config-header">
                                    <h3>"Step Configuration"</h3>
                                    <button class="close-config" on:click=move |_| set_selected.set(None)>"×"</button>
                                </div>
                                <p class="muted">{format!("{} ({})", node.kind.label(), node.id)}</p>

                                <div class="form-group">
                                    <label>"Label"</label>
                                    <input
                                        type="text"
                                        prop:value=node.data.label.clone()
                                        on:change=move |ev| commit(id_label.clone(), NodeDataPatch {
                                            label: Some(event_target_value(&ev)),
                                            ..NodeDataPatch::default()
                                        })
                                    />
                                </div>
                                <div class="form-group">
                                    <label>"Description"</label>
                                    <textarea
                                        rows="3"
                                        prop:value=node.data.description.clone()
                                        on:change=move |ev| commit(id_desc.clone(), NodeDataPatch {
                                            description: Some(event_target_value(&ev)),
                                            ..NodeDataPatch::default()
                                        })
                                    ></textarea>
                                </div>
                                <div class="form-group">
                                    <label>"Assignees"</label>
                                    <input
                                        type="text"
                                        placeholder="QA Manager, Lab Manager"
                                        prop:value=join_list(&node.data.assignees)
                                        on:change=move |ev| commit(id_assign.clone(), NodeDataPatch {
                                            assignees: Some(split_list(&event_target_value(&ev))),
                                            ..NodeDataPatch::default()
                                        })
                                    />
                                </div>
                            </div>
                        }.into_any()
                    }
                    None => view! {
                        <div class="config-empty">
                            <p>"Select a step to configure it."</p>
                        </div>
                    }.into_any(),
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_path_runs_port_to_port() {
        let path = edge_path(Position::new(0.0, 0.0), Position::new(300.0, 100.0));
        // Output port at (160, 30), input port at (300, 130), offset 70
        assert_eq!(path, "M 160 30 C 230 30 230 130 300 130");
    }

    #[test]
    fn close_nodes_keep_minimum_curve() {
        let path = edge_path(Position::new(0.0, 0.0), Position::new(180.0, 0.0));
        assert_eq!(path, "M 160 30 C 210 30 130 30 180 30");
    }

    #[test]
    fn drag_preview_only_moves_dragged_node() {
        let mut editor = CanvasEditor::for_new_workflow();
        let added = editor.add_node(NodeKind::Approval);
        let drag = Drag {
            id: added.clone(),
            position: Position::new(400.0, 300.0),
            last_mouse: (0.0, 0.0),
        };

        for node in editor.nodes() {
            let drawn = drawn_position(node, Some(&drag));
            if node.id == added {
                assert_eq!(drawn, Position::new(400.0, 300.0));
            } else {
                assert_eq!(drawn, node.position);
            }
        }
    }
}
