use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Access denied for user {user_id}: {reason}")]
    AccessDenied { user_id: String, reason: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_json::Error),
}

impl GraphError {
    /// Stable code used on the JSON command surface
    pub const fn code(&self) -> &'static str {
        match self {
            GraphError::EntityNotFound(_) => "entity_not_found",
            GraphError::InvalidParameter(_) => "invalid_parameter",
            GraphError::AccessDenied { .. } => "access_denied",
            GraphError::Repository(_) => "repository_error",
            GraphError::Fixture(_) => "invalid_request",
        }
    }
}
