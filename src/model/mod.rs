//! Node/edge data model shared by every part of the engine.
//!
//! Positions are top-left canvas coordinates. Everything derived from tree
//! shape (parents, sides, handles, hubs) is recomputed from these records by
//! `topology` and `layout::edges`, never stored on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

mod store;
pub mod topology;

pub use store::GraphStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        EdgeId(s.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Horizontal side of a node relative to its reference axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// +1 for right, -1 for left.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Connection handle identifiers exposed by a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleId {
    #[serde(rename = "source-left")]
    SourceLeft,
    #[serde(rename = "source-right")]
    SourceRight,
    #[serde(rename = "source-side")]
    SourceSide,
    #[serde(rename = "target-left")]
    TargetLeft,
    #[serde(rename = "target-right")]
    TargetRight,
    #[serde(rename = "target-side")]
    TargetSide,
}

impl HandleId {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleId::SourceLeft => "source-left",
            HandleId::SourceRight => "source-right",
            HandleId::SourceSide => "source-side",
            HandleId::TargetLeft => "target-left",
            HandleId::TargetRight => "target-right",
            HandleId::TargetSide => "target-side",
        }
    }

    pub fn parse(s: &str) -> Option<HandleId> {
        match s {
            "source-left" => Some(HandleId::SourceLeft),
            "source-right" => Some(HandleId::SourceRight),
            "source-side" => Some(HandleId::SourceSide),
            "target-left" => Some(HandleId::TargetLeft),
            "target-right" => Some(HandleId::TargetRight),
            "target-side" => Some(HandleId::TargetSide),
            _ => None,
        }
    }

    /// Fixed side of a left/right handle. `*-side` handles float and return None.
    pub fn fixed_side(self) -> Option<Side> {
        match self {
            HandleId::SourceLeft | HandleId::TargetLeft => Some(Side::Left),
            HandleId::SourceRight | HandleId::TargetRight => Some(Side::Right),
            HandleId::SourceSide | HandleId::TargetSide => None,
        }
    }

    pub fn source_for(side: Side) -> HandleId {
        match side {
            Side::Left => HandleId::SourceLeft,
            Side::Right => HandleId::SourceRight,
        }
    }

    pub fn target_for(side: Side) -> HandleId {
        match side {
            Side::Left => HandleId::TargetLeft,
            Side::Right => HandleId::TargetRight,
        }
    }
}

/// Per-node fields. Presentation flags and domain fields are explicit here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub text: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    /// Detail/input box open next to the node
    #[serde(default)]
    pub show_input_box: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl NodeData {
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
            text_color: None,
            is_main: false,
            show_input_box: false,
            body: None,
            starred: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn main(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self { is_main: true, ..Self::new(text, color) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    /// Size reported by the renderer after layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,
    pub data: NodeData,
    /// Graph this node was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, position: Point, data: NodeData) -> Self {
        Self { id: NodeId(id.into()), position, measured: None, data, graph_id: None }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Branch,
    Default,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    /// Routing waypoint for the orthogonal branch path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub source_handle: Option<HandleId>,
    #[serde(default)]
    pub target_handle: Option<HandleId>,
    #[serde(default)]
    pub data: EdgeData,
}

impl Edge {
    /// A bare parent -> child edge; handles and hub are filled in by the presentation builder.
    pub fn new(id: impl Into<String>, source: &NodeId, target: &NodeId) -> Self {
        Self {
            id: EdgeId(id.into()),
            source: source.clone(),
            target: target.clone(),
            kind: EdgeKind::Branch,
            source_handle: None,
            target_handle: None,
            data: EdgeData::default(),
        }
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}
