//! Render records for the frontend.
//!
//! These structs are serialized to JSON and handed to the host, which draws
//! them without recomputing anything about tree shape.

use serde::Serialize;

use crate::layout::path::{branch_path, handle_anchor};
use crate::layout::{node_rect, LayoutConfig, Rect};
use crate::model::topology::{find_node, parent_of, side_of};
use crate::model::{Edge, EdgeKind, HandleId, Node, Point, Side};

/// A node ready for the host to display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub text: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    pub bounds: Rect,
    pub is_main: bool,
    pub has_parent: bool,
    /// Root-like nodes show a handle on each border
    pub show_both_handles: bool,
    /// Border the single handle sits on, for nodes with a parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_side: Option<Side>,
    pub show_input_box: bool,
    /// Current drop candidate of a drag
    pub is_hovered: bool,
}

impl NodeView {
    pub fn build(node: &Node, nodes: &[Node], edges: &[Edge], hovered: Option<&str>, cfg: &LayoutConfig) -> Self {
        let has_parent = parent_of(&node.id, edges).is_some();
        // Single handle sits on the outer border, away from the root
        let handle_side = side_of(&node.id, nodes, edges, cfg);
        Self {
            id: node.id.0.clone(),
            text: node.data.text.clone(),
            color: node.data.color.clone(),
            text_color: node.data.text_color.clone(),
            bounds: node_rect(node, cfg),
            is_main: node.data.is_main,
            has_parent,
            show_both_handles: node.data.is_main || !has_parent,
            handle_side,
            show_input_box: node.data.show_input_box,
            is_hovered: hovered == Some(node.id.0.as_str()),
        }
    }
}

/// An edge with its routed path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub: Option<Point>,
    /// SVG path data; empty for dangling edges
    pub path: String,
}

/// Border a path end attaches to: the fixed side of a left/right handle, or the
/// node's own side for a floating `*-side` handle.
fn anchor_side(node: &Node, handle: Option<HandleId>, fallback: Side, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Side {
    handle
        .and_then(|h| h.fixed_side().or_else(|| side_of(&node.id, nodes, edges, cfg)))
        .unwrap_or(fallback)
}

impl EdgeView {
    pub fn build(edge: &Edge, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Self {
        let path = match (find_node(&edge.source, nodes), find_node(&edge.target, nodes)) {
            (Some(source), Some(target)) => {
                let side = edge.data.side.unwrap_or(Side::Right);
                let source_side = anchor_side(source, edge.source_handle, side, nodes, edges, cfg);
                let target_side = anchor_side(target, edge.target_handle, side.flipped(), nodes, edges, cfg);
                branch_path(
                    handle_anchor(source, source_side, cfg),
                    edge.data.hub,
                    handle_anchor(target, target_side, cfg),
                    cfg.edge_corner_radius,
                )
            }
            _ => String::new(),
        };
        Self {
            id: edge.id.0.clone(),
            source: edge.source.0.clone(),
            target: edge.target.0.clone(),
            kind: edge.kind,
            source_handle: edge.source_handle,
            target_handle: edge.target_handle,
            hub: edge.data.hub,
            path,
        }
    }
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasOutput {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub phase: String,
}
