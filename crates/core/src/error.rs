#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A booking collides with an existing appointment.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation would break an aggregate rule (last service on an
    /// appointment, operator still referenced, photo cap reached).
    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a not-found error keyed by any displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
