// Engine configuration.
//
// Every constant the engine uses lives in one of the three sections below.
// Each section implements `Default` and is `#[serde(default)]`, so the host
// can pass a partial JSON object and only override what it names.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::simulation::SimulationConfig;
use crate::layout::validate::ValidationPolicy;
use crate::layout::LayoutConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub simulation: SimulationConfig,
    pub interaction: InteractionConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON override. Empty input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Rules applied to drag-drop reparenting and handle connections.
    pub policy: ValidationPolicy,
    /// Max horizontal gap, in screen pixels, for a node to become a drop candidate.
    pub hover_threshold_px: f64,
    /// Pane clicks this soon after a connect gesture ends are swallowed.
    pub connect_suppress_ms: f64,
    /// On reparent, recolour the whole moved subtree and not only the dragged node.
    pub recolor_subtree: bool,
    pub default_text: String,
    pub default_color: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::Strict,
            hover_threshold_px: 40.0,
            connect_suppress_ms: 150.0,
            recolor_subtree: true,
            default_text: "New node".to_string(),
            default_color: "#EFEFEF".to_string(),
        }
    }
}
