//! Domain models for the registrar service.

pub mod student;
pub mod user;
