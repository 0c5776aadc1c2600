//! Shared application state.

use std::sync::Arc;

use registrar_auth::{AuthConfig, AuthError, AuthService};
use registrar_db::repository::{SurrealStudentRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Auth = AuthService<SurrealUserRepository<Any>>;
pub type Students = SurrealStudentRepository<Any>;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub students: Arc<Students>,
}

impl AppState {
    /// Build the services over an already-migrated database handle.
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig) -> Result<Self, AuthError> {
        let auth = AuthService::new(SurrealUserRepository::new(db.clone()), auth_config)?;
        Ok(Self {
            auth: Arc::new(auth),
            students: Arc::new(SurrealStudentRepository::new(db)),
        })
    }

    pub fn from_parts(auth: Auth, students: Students) -> Self {
        Self {
            auth: Arc::new(auth),
            students: Arc::new(students),
        }
    }
}
