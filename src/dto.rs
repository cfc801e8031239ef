//! Wire format of the whiteboard API and conversion to and from the store.
//!
//! Inbound documents may arrive wrapped in the `ApiResponse` envelope or bare.
//! Every field is defaulted so partial documents still load. Persisted edge
//! handles are ignored: presentation is always re-derived from positions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::layout::edges::refresh_edges;
use crate::layout::LayoutConfig;
use crate::model::topology::ancestors_of;
use crate::model::{Edge, EdgeId, EdgeKind, GraphStore, Node, NodeData, NodeId, Point};
use crate::palette::text_for_background;
use crate::seed::{school_mindmap, SEED_GRAPH_ID};

/// Node type marking the head of a subtree.
pub const MAIN_NODE_TYPE: &str = "PROJECT";
pub const NODE_TYPE: &str = "NODE";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub result_type: String,
    pub error: Option<ApiError>,
    pub success: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhiteboardResponse {
    pub whiteboard_id: String,
    pub graphs: Vec<GraphDto>,
    pub meta: WhiteboardMeta,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhiteboardMeta {
    pub name: String,
    pub version: u64,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphDto {
    pub graph_id: String,
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
    pub meta: GraphMeta,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphMeta {
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDto {
    pub node_id: String,
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub position: Point,
    pub color: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMeta {
    pub starred: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeDto {
    pub edge_id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Document-level fields kept across a load/save cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentInfo {
    pub whiteboard_id: String,
    pub meta: WhiteboardMeta,
    /// Graphs in load order
    pub graphs: Vec<(String, GraphMeta)>,
}

impl DocumentInfo {
    /// Graph that receives nodes created without one.
    pub fn default_graph(&self) -> String {
        self.graphs.first().map(|(id, _)| id.clone()).unwrap_or_else(|| SEED_GRAPH_ID.to_string())
    }
}

/// Parse either an `ApiResponse` envelope or a bare whiteboard document.
/// An envelope carrying an error becomes `Error::Api`.
pub fn parse_document(json: &str) -> Result<WhiteboardResponse> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let is_envelope = ["resultType", "success", "error"].iter().any(|k| value.get(*k).is_some());
    if !is_envelope {
        return Ok(serde_json::from_value(value)?);
    }

    let envelope: ApiResponse<WhiteboardResponse> = serde_json::from_value(value)?;
    if let Some(err) = envelope.error {
        return Err(Error::Api { code: err.code, message: err.message });
    }
    Ok(envelope.success.unwrap_or_default())
}

fn node_from_dto(dto: &NodeDto, graph_id: &str) -> Node {
    let meta = dto.meta.clone().unwrap_or_default();
    let mut data = NodeData::new(dto.title.clone(), dto.color.clone());
    data.text_color = text_for_background(&dto.color).map(str::to_string);
    data.is_main = dto.node_type == MAIN_NODE_TYPE;
    data.body = dto.body.clone();
    data.starred = meta.starred;
    data.created_at = meta.created_at;
    data.updated_at = meta.updated_at;

    let mut node = Node::new(dto.node_id.clone(), dto.position, data);
    node.graph_id = Some(graph_id.to_string());
    node
}

fn edge_from_dto(dto: &EdgeDto) -> Edge {
    let mut edge = Edge::new(dto.edge_id.clone(), &NodeId(dto.source.clone()), &NodeId(dto.target.clone()));
    if dto.kind.as_deref() == Some("default") {
        edge.kind = EdgeKind::Default;
    }
    edge
}

/// Keep only edges that preserve single-parent and acyclicity, in input order.
fn admit_edges(candidates: Vec<Edge>) -> Vec<Edge> {
    let mut kept: Vec<Edge> = Vec::with_capacity(candidates.len());
    let mut ids: HashSet<EdgeId> = HashSet::new();
    for edge in candidates {
        if edge.source == edge.target
            || kept.iter().any(|e| e.target == edge.target)
            || ancestors_of(&edge.source, &kept).contains(&edge.target)
            || !ids.insert(edge.id.clone())
        {
            log::warn!("dropping edge {} ({} -> {}) on load", edge.id, edge.source, edge.target);
            continue;
        }
        kept.push(edge);
    }
    kept
}

/// Build a store from a document. Returns None when there is nothing to load.
pub fn from_response(doc: &WhiteboardResponse, cfg: &LayoutConfig) -> Option<(GraphStore, DocumentInfo)> {
    let nodes: Vec<Node> = doc
        .graphs
        .iter()
        .flat_map(|g| g.nodes.iter().map(move |n| node_from_dto(n, &g.graph_id)))
        .collect();
    if nodes.is_empty() {
        return None;
    }

    let candidates = doc.graphs.iter().flat_map(|g| g.edges.iter().map(edge_from_dto)).collect();
    let mut edges = admit_edges(candidates);
    refresh_edges(&mut edges, &nodes, cfg);

    let info = DocumentInfo {
        whiteboard_id: doc.whiteboard_id.clone(),
        meta: doc.meta.clone(),
        graphs: doc.graphs.iter().map(|g| (g.graph_id.clone(), g.meta.clone())).collect(),
    };
    log::info!("loaded whiteboard {:?}: {} nodes, {} edges", info.whiteboard_id, nodes.len(), edges.len());
    Some((GraphStore::new(nodes, edges), info))
}

/// The built-in seed graph as a store.
pub fn seed_store(cfg: &LayoutConfig) -> (GraphStore, DocumentInfo) {
    let (nodes, mut edges) = school_mindmap();
    refresh_edges(&mut edges, &nodes, cfg);
    let info = DocumentInfo {
        whiteboard_id: String::new(),
        meta: WhiteboardMeta::default(),
        graphs: vec![(SEED_GRAPH_ID.to_string(), GraphMeta::default())],
    };
    (GraphStore::new(nodes, edges), info)
}

/// Load a JSON document, falling back to the seed graph on anything unusable.
pub fn load_or_seed(json: &str, cfg: &LayoutConfig) -> (GraphStore, DocumentInfo) {
    match parse_document(json) {
        Ok(doc) => match from_response(&doc, cfg) {
            Some(loaded) => loaded,
            None => {
                log::warn!("whiteboard has no nodes, using seed graph");
                seed_store(cfg)
            }
        },
        Err(e) => {
            log::warn!("could not load whiteboard ({}), using seed graph", e);
            seed_store(cfg)
        }
    }
}

fn node_to_dto(node: &Node) -> NodeDto {
    let d = &node.data;
    NodeDto {
        node_id: node.id.0.clone(),
        node_type: if d.is_main { MAIN_NODE_TYPE } else { NODE_TYPE }.to_string(),
        content_type: None,
        position: node.position,
        color: d.color.clone(),
        title: d.text.clone(),
        body: d.body.clone(),
        meta: Some(NodeMeta { starred: d.starred, created_at: d.created_at.clone(), updated_at: d.updated_at.clone() }),
    }
}

fn edge_to_dto(edge: &Edge) -> EdgeDto {
    EdgeDto {
        edge_id: edge.id.0.clone(),
        source: edge.source.0.clone(),
        target: edge.target.0.clone(),
        kind: Some(match edge.kind {
            EdgeKind::Branch => "branch".to_string(),
            EdgeKind::Default => "default".to_string(),
        }),
        source_handle: edge.source_handle.map(|h| h.as_str().to_string()),
        target_handle: edge.target_handle.map(|h| h.as_str().to_string()),
    }
}

/// Serialize the store back into the document shape.
///
/// Nodes go to the graph they came from (new nodes to the first graph), edges
/// go with their source node's graph.
pub fn to_response(store: &GraphStore, info: &DocumentInfo) -> WhiteboardResponse {
    let fallback = info.default_graph();
    let graph_of = |node: &Node| node.graph_id.clone().unwrap_or_else(|| fallback.clone());

    let mut graphs: Vec<GraphDto> = info
        .graphs
        .iter()
        .map(|(id, meta)| GraphDto { graph_id: id.clone(), meta: meta.clone(), ..GraphDto::default() })
        .collect();

    let slot = |graphs: &mut Vec<GraphDto>, id: String| -> usize {
        match graphs.iter().position(|g| g.graph_id == id) {
            Some(i) => i,
            None => {
                graphs.push(GraphDto { graph_id: id, ..GraphDto::default() });
                graphs.len() - 1
            }
        }
    };

    for node in store.nodes() {
        let i = slot(&mut graphs, graph_of(node));
        graphs[i].nodes.push(node_to_dto(node));
    }
    for edge in store.edges() {
        let gid = store.node(&edge.source).map(graph_of).unwrap_or_else(|| fallback.clone());
        let i = slot(&mut graphs, gid);
        graphs[i].edges.push(edge_to_dto(edge));
    }

    WhiteboardResponse { whiteboard_id: info.whiteboard_id.clone(), graphs, meta: info.meta.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HandleId;

    const DOC: &str = r##"{
        "resultType": "SUCCESS",
        "error": null,
        "success": {
            "whiteboardId": "wb-1",
            "graphs": [{
                "graphId": "g1",
                "nodes": [
                    { "nodeId": "p", "nodeType": "PROJECT", "position": { "x": 0, "y": 0 }, "color": "rgb(var(--ds-sub-blue))", "title": "Project" },
                    { "nodeId": "c", "nodeType": "NODE", "position": { "x": 300, "y": 0 }, "color": "#fff", "title": "Child",
                      "meta": { "starred": true, "createdAt": "2024-01-01" } }
                ],
                "edges": [
                    { "edgeId": "e1", "source": "p", "target": "c", "type": "branch", "sourceHandle": "source-side", "targetHandle": "target-left" }
                ],
                "meta": { "updatedAt": "2024-01-02" }
            }],
            "meta": { "name": "Board", "version": 3, "updatedAt": "2024-01-02" }
        }
    }"##;

    #[test]
    fn test_parse_envelope() {
        let doc = parse_document(DOC).unwrap();
        assert_eq!(doc.whiteboard_id, "wb-1");
        assert_eq!(doc.graphs[0].nodes.len(), 2);
        assert_eq!(doc.meta.version, 3);
    }

    #[test]
    fn test_parse_bare_document() {
        let doc = parse_document(r#"{ "whiteboardId": "w", "graphs": [] }"#).unwrap();
        assert_eq!(doc.whiteboard_id, "w");
        assert!(doc.graphs.is_empty());
    }

    #[test]
    fn test_envelope_error() {
        let err = parse_document(r#"{ "resultType": "FAIL", "error": { "code": "404", "message": "gone" }, "success": null }"#)
            .unwrap_err();
        assert!(matches!(err, Error::Api { ref code, .. } if code == "404"));
    }

    #[test]
    fn test_conversion_rederives_handles() {
        let cfg = LayoutConfig::default();
        let doc = parse_document(DOC).unwrap();
        let (store, info) = from_response(&doc, &cfg).unwrap();

        let p = store.node(&"p".into()).unwrap();
        assert!(p.data.is_main);
        assert_eq!(p.data.text, "Project");
        assert_eq!(p.data.text_color.as_deref(), Some("rgb(var(--ds-text-blue))"));
        let c = store.node(&"c".into()).unwrap();
        assert!(!c.data.is_main);
        assert!(c.data.starred);
        assert_eq!(c.graph_id.as_deref(), Some("g1"));

        let e = &store.edges()[0];
        assert_eq!(e.source_handle, Some(HandleId::SourceRight));
        assert_eq!(e.target_handle, Some(HandleId::TargetSide));
        assert_eq!(info.graphs[0].0, "g1");
    }

    #[test]
    fn test_load_drops_second_parent_and_cycles() {
        let cfg = LayoutConfig::default();
        let n = |id: &str| NodeDto { node_id: id.to_string(), ..NodeDto::default() };
        let e = |id: &str, s: &str, t: &str| EdgeDto {
            edge_id: id.to_string(),
            source: s.to_string(),
            target: t.to_string(),
            ..EdgeDto::default()
        };
        let doc = WhiteboardResponse {
            graphs: vec![GraphDto {
                graph_id: "g".to_string(),
                nodes: vec![n("a"), n("b"), n("c")],
                edges: vec![e("1", "a", "b"), e("2", "c", "b"), e("3", "b", "c"), e("4", "c", "a")],
                ..GraphDto::default()
            }],
            ..WhiteboardResponse::default()
        };
        let (store, _) = from_response(&doc, &cfg).unwrap();
        let ids: Vec<&str> = store.edges().iter().map(|e| e.id.0.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_empty_or_malformed_falls_back_to_seed() {
        let cfg = LayoutConfig::default();
        let (empty, _) = load_or_seed(r#"{ "graphs": [] }"#, &cfg);
        assert_eq!(empty.nodes().len(), 10);
        let (broken, _) = load_or_seed("not json", &cfg);
        assert_eq!(broken.nodes().len(), 10);
        let (failed, _) = load_or_seed(r#"{ "error": { "code": "500", "message": "x" } }"#, &cfg);
        assert!(failed.contains(&"school".into()));
    }

    #[test]
    fn test_export_groups_by_graph() {
        let cfg = LayoutConfig::default();
        let doc = parse_document(DOC).unwrap();
        let (mut store, info) = from_response(&doc, &cfg).unwrap();
        let id = store.create_node(Point::new(0.0, 200.0), NodeData::new("new", "#EFEFEF"), 1.0);

        let out = to_response(&store, &info);
        assert_eq!(out.whiteboard_id, "wb-1");
        assert_eq!(out.graphs.len(), 1);
        assert_eq!(out.graphs[0].nodes.len(), 3);
        assert!(out.graphs[0].nodes.iter().any(|n| n.node_id == id.0 && n.node_type == NODE_TYPE));
        assert_eq!(out.graphs[0].edges[0].source_handle.as_deref(), Some("source-right"));
        assert_eq!(out.graphs[0].meta.updated_at, "2024-01-02");
    }
}
