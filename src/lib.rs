//! Layout and interaction engine for a mind-map whiteboard.
//!
//! The host renders; this crate owns the node/edge model, the single-parent
//! tree rules, drag/connect gestures and the collision simulation. `wasm`
//! exposes it to JS as `WhiteboardEngine`.

pub mod config;
pub mod dto;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod output;
pub mod palette;
pub mod persist;
pub mod seed;
pub mod wasm;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use interaction::Canvas;
pub use model::GraphStore;
pub use wasm::WhiteboardEngine;
