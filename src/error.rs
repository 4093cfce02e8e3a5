use std::path::PathBuf;

use crate::graph_model::GraphLevel;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph level '{0}' is not implemented yet; only 'high' is supported")]
    UnsupportedLevel(GraphLevel),

    #[error("node in {scope} has no 'id'")]
    MissingNodeId { scope: String },

    #[error("edge has no '{endpoint}'")]
    MissingEdgeEndpoint { endpoint: &'static str },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
