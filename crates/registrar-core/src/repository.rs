//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `registrar-db`; the auth layer only depends on these traits.

use uuid::Uuid;

use crate::error::RegistrarResult;
use crate::models::{
    student::{Student, StudentInput},
    user::{NewUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `AlreadyExists` if the username
    /// is taken.
    fn create(&self, input: NewUser) -> impl Future<Output = RegistrarResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RegistrarResult<User>> + Send;
    /// Look up a user by exact (case-sensitive) username. Fails with
    /// `NotFound` if absent.
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = RegistrarResult<User>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = RegistrarResult<()>> + Send;
}

/// Student records. Identifiers arrive as raw strings from the request
/// path; a non-UUID identifier yields `InvalidId`, an absent record
/// yields `NotFound`.
pub trait StudentRepository: Send + Sync {
    fn create(
        &self,
        input: StudentInput,
        created_by: &str,
    ) -> impl Future<Output = RegistrarResult<Student>> + Send;
    fn list(&self) -> impl Future<Output = RegistrarResult<Vec<Student>>> + Send;
    fn get(&self, id: &str) -> impl Future<Output = RegistrarResult<Student>> + Send;
    fn update(
        &self,
        id: &str,
        input: StudentInput,
    ) -> impl Future<Output = RegistrarResult<Student>> + Send;
    fn delete(&self, id: &str) -> impl Future<Output = RegistrarResult<()>> + Send;
}

/// Parse a raw path identifier into a UUID, classifying failure as
/// `InvalidId` for the given entity.
pub fn parse_id(entity: &str, raw: &str) -> RegistrarResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| crate::error::RegistrarError::InvalidId {
        entity: entity.into(),
        id: raw.into(),
    })
}
