//! Registrar Auth: Argon2id password hashing, JWT issuance/validation
//! and the bearer-token request gate.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, Authenticated, LoginInput, LoginOutput, RegisterInput};
pub use token::{AccessTokenClaims, ExtensionClaims, TokenAuthority};
