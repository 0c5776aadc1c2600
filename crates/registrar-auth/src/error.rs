//! Authentication error types.

use registrar_core::error::RegistrarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization token missing")]
    MissingCredentials,

    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("invalid token signature")]
    TokenInvalidSignature,

    #[error("token has expired")]
    TokenExpired,

    /// A valid token whose subject no longer exists in the store.
    #[error("unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already registered")]
    UsernameTaken,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("claim name is reserved: {0}")]
    ReservedClaim(String),

    /// A stored password hash could not be parsed. This is a
    /// data-integrity fault, not a wrong password.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("credential store error: {0}")]
    Store(#[source] RegistrarError),
}

impl AuthError {
    /// Whether the caller should receive a 401 and re-authenticate.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials
                | AuthError::TokenMalformed(_)
                | AuthError::TokenInvalidSignature
                | AuthError::TokenExpired
                | AuthError::UnknownPrincipal(_)
                | AuthError::InvalidCredentials
        )
    }

    /// Reason string safe to show to clients.
    ///
    /// Unknown principals are reported exactly like a bad signature so a
    /// deleted account cannot be told apart from a forged token.
    pub fn client_reason(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Authorization token missing".into(),
            AuthError::TokenMalformed(_) => "Malformed token".into(),
            AuthError::TokenInvalidSignature | AuthError::UnknownPrincipal(_) => {
                "Invalid token".into()
            }
            AuthError::TokenExpired => "Token has expired".into(),
            AuthError::InvalidCredentials => "Incorrect username or password".into(),
            AuthError::UsernameTaken => "Username already registered".into(),
            AuthError::WeakPassword { .. } | AuthError::ReservedClaim(_) => self.to_string(),
            AuthError::MalformedHash(_) | AuthError::Crypto(_) => {
                "Internal server error".into()
            }
            AuthError::Store(_) => "Service temporarily unavailable".into(),
        }
    }
}
