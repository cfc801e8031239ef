use crate::layout::validate::Rejection;
use crate::model::{EdgeId, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("invalid connection {source_id} -> {target_id}: {reason}")]
    InvalidConnection { source_id: NodeId, target_id: NodeId, reason: Rejection },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("api error {code}: {message}")]
    Api { code: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The connection rule that refused an edge, if that is what this error is.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Error::InvalidConnection { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
