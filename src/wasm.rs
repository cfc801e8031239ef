//! WASM bindings for the mindmap-core library.
//!
//! Everything crosses the boundary as JSON strings or plain numbers. Failures
//! are logged and answered with the unchanged state, never thrown into JS.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::dto::{seed_store, WhiteboardResponse};
use crate::interaction::{Canvas, EdgeChange, Modifiers, NodeChange};
use crate::model::{HandleId, NodeId, Point};
use crate::persist::{LogSink, SaveSink};

/// Initialize logging and panic hooks for the WASM target.
#[wasm_bindgen]
pub fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
    log::info!("mindmap-core logging initialized");
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Error serializing output: {}", e);
        "{\"error\": \"Serialization error\"}".to_string()
    })
}

/// Save sink that hands the document JSON to a JS callback.
struct JsSaveSink {
    callback: js_sys::Function,
}

impl SaveSink for JsSaveSink {
    fn save(&mut self, doc: &WhiteboardResponse) {
        let json = to_json(doc);
        if let Err(e) = self.callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log::error!("save callback failed: {:?}", e);
        }
    }
}

#[wasm_bindgen]
pub struct WhiteboardEngine {
    canvas: Canvas,
}

#[wasm_bindgen]
impl WhiteboardEngine {
    /// Start on the seed graph. `config_json` may be empty or a partial override.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> WhiteboardEngine {
        let cfg = EngineConfig::from_json(config_json).unwrap_or_else(|e| {
            log::error!("Error parsing config, using defaults: {}", e);
            EngineConfig::default()
        });
        let (store, info) = seed_store(&cfg.layout);
        WhiteboardEngine { canvas: Canvas::new(cfg, store, info, Box::new(LogSink)) }
    }

    /// Every committed mutation calls `callback(documentJson)`.
    pub fn set_save_callback(&mut self, callback: js_sys::Function) {
        self.canvas.set_sink(Box::new(JsSaveSink { callback }));
    }

    /// Load an API response or bare document. Returns the render output.
    pub fn load(&mut self, json: &str) -> String {
        self.canvas.load(json);
        self.output()
    }

    /// Current document in the API shape.
    pub fn export(&self) -> String {
        to_json(&self.canvas.export())
    }

    /// Node and edge views for rendering.
    pub fn output(&self) -> String {
        to_json(&self.canvas.output())
    }

    pub fn nodes(&self) -> String {
        to_json(&self.canvas.store().nodes())
    }

    pub fn edges(&self) -> String {
        to_json(&self.canvas.store().edges())
    }

    pub fn phase(&self) -> String {
        self.canvas.phase().as_str().to_string()
    }

    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.canvas.set_viewport(x, y, zoom);
    }

    pub fn drag_start(&mut self, node_id: &str, alt: bool, shift: bool) -> bool {
        self.canvas.drag_start(&NodeId::from(node_id), Modifiers { alt, shift })
    }

    pub fn drag_move(&mut self, node_id: &str, x: f64, y: f64, alt: bool, shift: bool) -> bool {
        self.canvas.drag_move(&NodeId::from(node_id), Point::new(x, y), Modifiers { alt, shift })
    }

    /// Returns the drop outcome as JSON.
    pub fn drag_stop(&mut self, node_id: &str, now_ms: f64) -> String {
        to_json(&self.canvas.drag_stop(&NodeId::from(node_id), now_ms))
    }

    /// One simulation step; call from requestAnimationFrame.
    pub fn tick(&mut self) -> bool {
        self.canvas.tick()
    }

    pub fn connect_start(&mut self, node_id: &str, handle: &str) -> bool {
        match HandleId::parse(handle) {
            Some(handle) => self.canvas.connect_start(&NodeId::from(node_id), handle),
            None => {
                log::error!("Unknown handle '{}'", handle);
                false
            }
        }
    }

    /// `target_id` is the node under the pointer, if any. Returns the outcome as JSON.
    pub fn connect_end(&mut self, target_id: Option<String>, screen_x: f64, screen_y: f64, now_ms: f64) -> String {
        let target = target_id.map(NodeId);
        to_json(&self.canvas.connect_end(target.as_ref(), Point::new(screen_x, screen_y), now_ms))
    }

    pub fn pane_click(&mut self, screen_x: f64, screen_y: f64, button: i16, now_ms: f64) -> String {
        to_json(&self.canvas.pane_click(Point::new(screen_x, screen_y), button, now_ms))
    }

    /// Returns whether the box is now open. Unknown nodes report false.
    pub fn toggle_input_box(&mut self, node_id: &str) -> bool {
        self.canvas.toggle_input_box(&NodeId::from(node_id)).unwrap_or_else(|e| {
            log::error!("toggle_input_box: {}", e);
            false
        })
    }

    pub fn set_text(&mut self, node_id: &str, text: &str) -> bool {
        match self.canvas.set_text(&NodeId::from(node_id), text) {
            Ok(()) => true,
            Err(e) => {
                log::error!("set_text: {}", e);
                false
            }
        }
    }

    pub fn set_color(&mut self, node_id: &str, color: &str, text_color: Option<String>) -> bool {
        match self.canvas.set_color(&NodeId::from(node_id), color, text_color.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("set_color: {}", e);
                false
            }
        }
    }

    /// `changes_json` is an array of `{type: "remove" | "position" | "dimensions", id, ...}`.
    pub fn apply_node_changes(&mut self, changes_json: &str) -> usize {
        match serde_json::from_str::<Vec<NodeChange>>(changes_json) {
            Ok(changes) => self.canvas.apply_node_changes(&changes),
            Err(e) => {
                log::error!("Error parsing node changes: {}", e);
                0
            }
        }
    }

    pub fn apply_edge_changes(&mut self, changes_json: &str) -> usize {
        match serde_json::from_str::<Vec<EdgeChange>>(changes_json) {
            Ok(changes) => self.canvas.apply_edge_changes(&changes),
            Err(e) => {
                log::error!("Error parsing edge changes: {}", e);
                0
            }
        }
    }

    /// Drop simulation state and any gesture in progress.
    pub fn dispose(&mut self) {
        self.canvas.dispose();
    }
}
