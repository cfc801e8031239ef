//! Drag/connect interaction state machine.
//!
//! `Canvas` owns the store, the collision simulation and the viewport, and is
//! the only thing the host talks to. Pointer samples write pinned positions
//! straight into the store; `tick` relaxes everything else and writes the
//! result back. Rejected gestures leave the store unchanged and are only
//! logged.
//!
//! Drag phases: Idle -> Dragging -> HoveringCandidate* -> (drop) -> Idle.
//! Connecting runs separately and starts from a handle.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::dto::{load_or_seed, to_response, DocumentInfo, WhiteboardResponse};
use crate::error::{Error, Result};
use crate::layout::placement::child_position;
use crate::layout::simulation::Simulation;
use crate::layout::spatial_grid::SpatialGrid;
use crate::layout::validate::{validate_connection, Rejection};
use crate::layout::{node_rect, node_size, Rect};
use crate::model::topology::{descendants_of, parent_of, root_of, side_against_axis, side_of};
use crate::model::{EdgeId, GraphStore, HandleId, Node, NodeData, NodeId, Point, Side, Size};
use crate::output::{CanvasOutput, EdgeView, NodeView};
use crate::palette::text_for_background;
use crate::persist::SaveSink;

pub mod viewport;

pub use viewport::Viewport;

/// `MouseEvent.button` of the main button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Detach the node from its parent when the drag starts
    pub alt: bool,
    /// Move only the node itself, leaving its subtree in place
    pub shift: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Dragging,
    HoveringCandidate,
    Connecting,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Dragging => "dragging",
            Phase::HoveringCandidate => "hovering_candidate",
            Phase::Connecting => "connecting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// No drag of that node was in progress
    Ignored,
    Moved,
    Reparented { parent: NodeId, edge: EdgeId },
    Rejected { candidate: NodeId, reason: Rejection },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectOutcome {
    Ignored,
    Connected { edge: EdgeId },
    /// Dropped on empty canvas: a new child was created
    Created { node: NodeId, edge: EdgeId },
    Rejected { reason: Rejection },
    /// Refused for a reason other than a connection rule
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Ignored,
    ClosedInputBox,
    /// Swallowed because a connect gesture just ended
    Suppressed,
    Created { node: NodeId },
}

/// Generic node change coming from the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeChange {
    Remove { id: NodeId },
    Position { id: NodeId, position: Point },
    Dimensions { id: NodeId, dimensions: Size },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeChange {
    Remove { id: EdgeId },
}

#[derive(Debug, Clone)]
struct DragSession {
    id: NodeId,
    /// Dragged node position after the previous sample
    last: Point,
    /// Side against the root axis after the previous sample
    side: Option<Side>,
    subtree: Vec<NodeId>,
    hover: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct ConnectSession {
    source: NodeId,
    handle: HandleId,
}

pub struct Canvas {
    cfg: EngineConfig,
    store: GraphStore,
    info: DocumentInfo,
    sim: Simulation,
    viewport: Viewport,
    sink: Box<dyn SaveSink>,
    drag: Option<DragSession>,
    connect: Option<ConnectSession>,
    last_connect_end_ms: Option<f64>,
    /// A released drag is still coasting; saved again once it comes to rest
    settling: bool,
}

impl Canvas {
    pub fn new(cfg: EngineConfig, mut store: GraphStore, info: DocumentInfo, sink: Box<dyn SaveSink>) -> Self {
        store.refresh_presentation(&cfg.layout);
        let sim = Simulation::new(cfg.simulation.clone());
        Self {
            cfg,
            store,
            info,
            sim,
            viewport: Viewport::default(),
            sink,
            drag: None,
            connect: None,
            last_connect_end_ms: None,
            settling: false,
        }
    }

    /// Load a document, falling back to the seed graph.
    pub fn from_json(json: &str, cfg: EngineConfig, sink: Box<dyn SaveSink>) -> Self {
        let (store, info) = load_or_seed(json, &cfg.layout);
        Self::new(cfg, store, info, sink)
    }

    /// Replace the whole document. Any gesture in progress is dropped.
    pub fn load(&mut self, json: &str) {
        let (mut store, info) = load_or_seed(json, &self.cfg.layout);
        store.refresh_presentation(&self.cfg.layout);
        self.store = store;
        self.info = info;
        self.dispose();
    }

    /// Drop simulation state and any gesture in progress.
    pub fn dispose(&mut self) {
        self.sim.dispose();
        self.drag = None;
        self.connect = None;
        self.last_connect_end_ms = None;
        self.settling = false;
    }

    pub fn set_sink(&mut self, sink: Box<dyn SaveSink>) {
        self.sink = sink;
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.viewport = Viewport::new(x, y, zoom);
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.drag.as_ref().and_then(|s| s.hover.as_ref())
    }

    pub fn phase(&self) -> Phase {
        match &self.drag {
            Some(s) if s.hover.is_some() => Phase::HoveringCandidate,
            Some(_) => Phase::Dragging,
            None if self.connect.is_some() => Phase::Connecting,
            None => Phase::Idle,
        }
    }

    pub fn export(&self) -> WhiteboardResponse {
        to_response(&self.store, &self.info)
    }

    fn commit(&mut self) {
        self.store.refresh_presentation(&self.cfg.layout);
        let doc = self.export();
        self.sink.save(&doc);
    }

    // ------------------------------------------------------------------
    // Drag
    // ------------------------------------------------------------------

    pub fn drag_start(&mut self, id: &NodeId, modifiers: Modifiers) -> bool {
        let Some(position) = self.store.node(id).map(|n| n.position) else {
            log::debug!("drag start on unknown node {}", id);
            return false;
        };

        if modifiers.alt {
            if let Some(edge) = self.store.disconnect(id) {
                log::debug!("detached {} from {}", id, edge.source);
                self.store.refresh_presentation(&self.cfg.layout);
            }
        }

        let subtree = descendants_of(id, self.store.edges());
        self.sim.sync(self.store.nodes(), &self.cfg.layout);
        self.pin_subtree(id, &subtree);
        self.sim.start();
        self.settling = false;

        let side = side_of(id, self.store.nodes(), self.store.edges(), &self.cfg.layout);
        self.drag = Some(DragSession { id: id.clone(), last: position, side, subtree, hover: None });
        true
    }

    /// One pointer sample. `position` is the dragged node's new top-left corner.
    pub fn drag_move(&mut self, id: &NodeId, position: Point, modifiers: Modifiers) -> bool {
        let Some(session) = self.drag.as_ref().filter(|s| &s.id == id) else {
            return false;
        };
        let (last, prev_side, subtree) = (session.last, session.side, session.subtree.clone());
        let layout = self.cfg.layout.clone();

        let Some(width) = self.store.node(id).map(|n| node_size(n, &layout).width) else {
            return false;
        };
        let axis = position.x + width / 2.0;
        let side = self.root_axis(id).map(|root_axis| side_against_axis(axis, root_axis));
        let flipped = matches!((prev_side, side), (Some(a), Some(b)) if a != b);

        if !modifiers.shift {
            self.store.translate(&subtree, position.x - last.x, position.y - last.y);
            if flipped {
                // Children were carried along; reflect them to the other side of the node
                self.store.mirror_subtree(id, axis, &layout);
            }
        }
        if let Err(e) = self.store.set_position(id, position) {
            log::debug!("drag move: {}", e);
            return false;
        }
        self.pin_subtree(id, &subtree);

        let hover = self.find_hover_candidate(id, &subtree);
        if let Some(s) = self.drag.as_mut() {
            s.last = position;
            s.side = side;
            s.hover = hover;
        }
        self.store.refresh_presentation(&layout);
        true
    }

    /// End the drag. Pins are released and the simulation starts cooling in this
    /// same call.
    pub fn drag_stop(&mut self, id: &NodeId, now_ms: f64) -> DropOutcome {
        let Some(session) = self.drag.take_if(|s| &s.id == id) else {
            return DropOutcome::Ignored;
        };
        self.sim.stop();
        self.settling = true;

        let outcome = match session.hover {
            None => DropOutcome::Moved,
            Some(candidate) => match self.store.connect(&candidate, id, self.cfg.interaction.policy, now_ms) {
                Ok(edge) => {
                    log::debug!("reparented {} under {}", id, candidate);
                    self.inherit_colors(&candidate, id);
                    DropOutcome::Reparented { parent: candidate, edge }
                }
                Err(e) => {
                    log::debug!("drop of {} onto {} refused: {}", id, candidate, e);
                    match e.rejection() {
                        Some(reason) => DropOutcome::Rejected { candidate, reason },
                        None => DropOutcome::Moved,
                    }
                }
            },
        };
        self.commit();
        outcome
    }

    /// Advance the simulation one step. Returns true if any node moved.
    pub fn tick(&mut self) -> bool {
        let moved = self.sim.tick();
        for (id, p) in &moved {
            if self.store.set_position(id, *p).is_err() {
                log::debug!("simulation moved unknown node {}", id);
            }
        }
        if !moved.is_empty() {
            self.store.refresh_presentation(&self.cfg.layout);
        }
        if self.settling && self.sim.is_idle() {
            self.settling = false;
            self.commit();
        }
        !moved.is_empty()
    }

    fn pin_subtree(&mut self, id: &NodeId, subtree: &[NodeId]) {
        for n in std::iter::once(id).chain(subtree) {
            if let Some(p) = self.store.node(n).map(|node| node.position) {
                self.sim.pin(n, p);
            }
        }
    }

    /// Centre x of the topological root, for nodes that have a parent.
    fn root_axis(&self, id: &NodeId) -> Option<f64> {
        let edges = self.store.edges();
        parent_of(id, edges)?;
        let root = self.store.node(&root_of(id, edges))?;
        Some(node_rect(root, &self.cfg.layout).center_x())
    }

    /// Nearest node, by centre distance, that shares a vertical band with the
    /// dragged box and lies within the hover threshold horizontally.
    fn find_hover_candidate(&self, id: &NodeId, subtree: &[NodeId]) -> Option<NodeId> {
        let layout = &self.cfg.layout;
        let nodes = self.store.nodes();
        let edges = self.store.edges();
        let dragged = node_rect(self.store.node(id)?, layout);
        let reach = self.viewport.screen_len(self.cfg.interaction.hover_threshold_px);

        let rects: Vec<Rect> = nodes.iter().map(|n| node_rect(n, layout)).collect();
        let grid = SpatialGrid::from_rects(layout.node_size.width.max(reach), &rects);
        let reach_rect = Rect { x: dragged.x - reach, w: dragged.w + 2.0 * reach, ..dragged };

        let excluded: HashSet<&NodeId> = subtree.iter().chain(std::iter::once(id)).collect();
        let distance = |r: &Rect| (r.center_x() - dragged.center_x()).hypot(r.center_y() - dragged.center_y());

        grid.query(&reach_rect)
            .into_iter()
            .filter(|&i| !excluded.contains(&nodes[i].id))
            .filter(|&i| {
                let r = &rects[i];
                r.y < dragged.bottom() && dragged.y < r.bottom() && dragged.gap_x(r) <= reach
            })
            .filter(|&i| validate_connection(&nodes[i].id, id, edges, self.cfg.interaction.policy).is_ok())
            .min_by(|&a, &b| distance(&rects[a]).total_cmp(&distance(&rects[b])))
            .map(|i| nodes[i].id.clone())
    }

    /// Give `child` (and optionally its subtree) the colours of `parent`.
    fn inherit_colors(&mut self, parent: &NodeId, child: &NodeId) {
        let Some((color, text_color)) = self.store.node(parent).map(|p| (p.data.color.clone(), p.data.text_color.clone()))
        else {
            return;
        };
        let mut targets = vec![child.clone()];
        if self.cfg.interaction.recolor_subtree {
            targets.extend(descendants_of(child, self.store.edges()));
        }
        for t in &targets {
            if let Err(e) = self.store.recolor(t, &color, text_color.as_deref()) {
                log::debug!("recolor: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Connect
    // ------------------------------------------------------------------

    pub fn connect_start(&mut self, id: &NodeId, handle: HandleId) -> bool {
        if !self.store.contains(id) {
            log::debug!("connect start on unknown node {}", id);
            return false;
        }
        self.connect = Some(ConnectSession { source: id.clone(), handle });
        true
    }

    /// Finish a handle drag over `target`, or over empty canvas at `screen`.
    pub fn connect_end(&mut self, target: Option<&NodeId>, screen: Point, now_ms: f64) -> ConnectOutcome {
        let Some(session) = self.connect.take() else {
            return ConnectOutcome::Ignored;
        };
        self.last_connect_end_ms = Some(now_ms);

        let result = match target {
            Some(target) => self
                .store
                .connect(&session.source, target, self.cfg.interaction.policy, now_ms)
                .map(|edge| ConnectOutcome::Connected { edge }),
            None => self.spawn_child(&session, screen, now_ms).map(|(node, edge)| ConnectOutcome::Created { node, edge }),
        };

        match result {
            Ok(outcome) => {
                self.commit();
                outcome
            }
            Err(e) => {
                log::debug!("connect from {} refused: {}", session.source, e);
                match e.rejection() {
                    Some(reason) => ConnectOutcome::Rejected { reason },
                    None => ConnectOutcome::Failed { message: e.to_string() },
                }
            }
        }
    }

    /// New child of the session's source, placed off the handle's side.
    fn spawn_child(&mut self, session: &ConnectSession, screen: Point, now_ms: f64) -> Result<(NodeId, EdgeId)> {
        let layout = &self.cfg.layout;
        let source = self
            .store
            .node(&session.source)
            .cloned()
            .ok_or_else(|| Error::NodeNotFound(session.source.clone()))?;
        let side = session
            .handle
            .fixed_side()
            .or_else(|| side_of(&source.id, self.store.nodes(), self.store.edges(), layout))
            .unwrap_or(Side::Right);
        let drop = self.viewport.screen_to_canvas(screen);
        let position = child_position(&source, side, drop.y, self.store.nodes(), self.store.edges(), layout);

        let mut data = NodeData::new(self.cfg.interaction.default_text.clone(), source.data.color.clone());
        data.text_color = source.data.text_color.clone();
        let id = self.store.next_node_id(now_ms);
        let mut node = Node::new(id.0.clone(), position, data);
        node.graph_id = source.graph_id.clone();
        self.store.add_node(node);

        match self.store.connect(&source.id, &id, self.cfg.interaction.policy, now_ms) {
            Ok(edge) => {
                self.track_in_simulation(&id);
                Ok((id, edge))
            }
            Err(e) => {
                let _ = self.store.remove_node(&id);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Pane and node edits
    // ------------------------------------------------------------------

    /// Click on empty canvas at a screen point.
    pub fn pane_click(&mut self, screen: Point, button: i16, now_ms: f64) -> ClickOutcome {
        if button != PRIMARY_BUTTON {
            return ClickOutcome::Ignored;
        }
        if self.close_input_boxes() {
            return ClickOutcome::ClosedInputBox;
        }
        if let Some(ended) = self.last_connect_end_ms {
            if now_ms - ended < self.cfg.interaction.connect_suppress_ms {
                return ClickOutcome::Suppressed;
            }
        }

        let position = self.viewport.screen_to_canvas(screen);
        let data = NodeData::new(self.cfg.interaction.default_text.clone(), self.cfg.interaction.default_color.clone());
        let node = self.store.create_node(position, data, now_ms);
        self.track_in_simulation(&node);
        self.commit();
        ClickOutcome::Created { node }
    }

    /// Let a node created outside a drag take part in any settling in progress.
    fn track_in_simulation(&mut self, id: &NodeId) {
        if let Some(node) = self.store.node(id) {
            self.sim.insert(node, &self.cfg.layout);
        }
    }

    fn close_input_boxes(&mut self) -> bool {
        let open: Vec<NodeId> =
            self.store.nodes().iter().filter(|n| n.data.show_input_box).map(|n| n.id.clone()).collect();
        for id in &open {
            let _ = self.store.update_data(id, |d| d.show_input_box = false);
        }
        !open.is_empty()
    }

    /// Open or close the detail box of a node. Returns the new state.
    pub fn toggle_input_box(&mut self, id: &NodeId) -> Result<bool> {
        let mut open = false;
        self.store.update_data(id, |d| {
            d.show_input_box = !d.show_input_box;
            open = d.show_input_box;
        })?;
        Ok(open)
    }

    pub fn set_text(&mut self, id: &NodeId, text: &str) -> Result<()> {
        self.store.update_data(id, |d| d.text = text.to_string())?;
        self.commit();
        Ok(())
    }

    /// Set a node's colours. Without an explicit text colour, palette
    /// backgrounds get their matching one.
    pub fn set_color(&mut self, id: &NodeId, color: &str, text_color: Option<&str>) -> Result<()> {
        let text_color = text_color.or_else(|| text_for_background(color));
        self.store.recolor(id, color, text_color)?;
        self.commit();
        Ok(())
    }

    /// Apply renderer changes. Returns how many were applied. Each applied
    /// change is mirrored into the simulation so a settling layout never
    /// writes back a stale copy.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> usize {
        let mut applied = 0;
        let mut persist = false;
        for change in changes {
            let result = match change {
                NodeChange::Remove { id } => self.store.remove_node(id).map(|_| {
                    self.sim.remove(id);
                    true
                }),
                NodeChange::Position { id, position } => self.store.set_position(id, *position).map(|_| {
                    self.sim.place(id, *position);
                    true
                }),
                NodeChange::Dimensions { id, dimensions } => self.store.set_measured(id, *dimensions).map(|_| {
                    self.sim.resize(id, *dimensions);
                    false
                }),
            };
            match result {
                Ok(persists) => {
                    applied += 1;
                    persist |= persists;
                }
                Err(e) => log::debug!("node change skipped: {}", e),
            }
        }

        if self.drag.as_ref().is_some_and(|s| !self.store.contains(&s.id)) {
            self.drag = None;
            self.sim.stop();
        }
        if persist {
            self.commit();
        } else {
            self.store.refresh_presentation(&self.cfg.layout);
        }
        applied
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> usize {
        let mut applied = 0;
        for change in changes {
            match change {
                EdgeChange::Remove { id } => match self.store.remove_edge(id) {
                    Ok(_) => applied += 1,
                    Err(e) => log::debug!("edge change skipped: {}", e),
                },
            }
        }
        if applied > 0 {
            self.commit();
        }
        applied
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn node_views(&self) -> Vec<NodeView> {
        let hovered = self.hovered().map(|id| id.0.as_str());
        let (nodes, edges) = (self.store.nodes(), self.store.edges());
        nodes.iter().map(|n| NodeView::build(n, nodes, edges, hovered, &self.cfg.layout)).collect()
    }

    pub fn edge_views(&self) -> Vec<EdgeView> {
        let (nodes, edges) = (self.store.nodes(), self.store.edges());
        edges.iter().map(|e| EdgeView::build(e, nodes, edges, &self.cfg.layout)).collect()
    }

    pub fn output(&self) -> CanvasOutput {
        CanvasOutput {
            nodes: self.node_views(),
            edges: self.edge_views(),
            phase: self.phase().as_str().to_string(),
        }
    }
}
