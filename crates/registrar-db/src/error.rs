//! Database-specific error types and conversions.

use registrar_core::error::RegistrarError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify a failed statement, recognising unique-index violations.
    ///
    /// SurrealDB reports those as
    /// ``Database index `<index>` already contains <value>, with record `<id>` ``;
    /// the `"already contains"` fragment is what identifies them.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for RegistrarError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RegistrarError::NotFound { entity, id },
            DbError::Duplicate { entity } => RegistrarError::AlreadyExists { entity },
            // A stored row we cannot decode is a data fault, not an outage.
            DbError::Corrupt(message) => RegistrarError::Internal(message),
            other => RegistrarError::Database(other.to_string()),
        }
    }
}
