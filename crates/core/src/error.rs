#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid form definition '{form_id}': {reason}")]
    InvalidSchema { form_id: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
