//! SurrealDB repository implementations.

mod student;
mod user;

pub use student::SurrealStudentRepository;
pub use user::SurrealUserRepository;
