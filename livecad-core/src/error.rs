//! Error types for livecad

use thiserror::Error;

/// Main error type for livecad operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot render an assembly with zero parts")]
    EmptyAssembly,

    #[error("Viewer is not initialized; call render before {0}")]
    NotReady(&'static str),

    #[error("Part '{id}' has no mesh vertices")]
    MissingMesh { id: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Tree view error: {0}")]
    TreeView(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error violates the viewer's state-machine precondition
    /// and therefore must be handled by the caller.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(self, Error::EmptyAssembly | Error::NotReady(_))
    }
}

/// Result type alias for livecad operations
pub type Result<T> = std::result::Result<T, Error>;
