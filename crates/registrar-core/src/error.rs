//! Error types shared across the registrar crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid {entity} id: {id}")]
    InvalidId { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistrarError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type RegistrarResult<T> = Result<T, RegistrarError>;
