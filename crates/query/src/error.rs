use thiserror::Error;

pub type Result<T> = std::result::Result<T, LineageError>;

#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid lineage graph: {0}")]
    InvalidGraph(String),

    #[error("Lineage store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LineageError {
    /// Stable code used on the JSON command surface
    pub const fn code(&self) -> &'static str {
        match self {
            LineageError::NodeNotFound(_) => "node_not_found",
            LineageError::InvalidParameter(_) | LineageError::InvalidGraph(_) => "invalid_parameter",
            LineageError::Store(_) => "store_error",
            LineageError::SerializationError(_) => "invalid_request",
        }
    }
}
