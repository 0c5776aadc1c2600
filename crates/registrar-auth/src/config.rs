//! Authentication configuration.

use std::fmt;

use jsonwebtoken::Algorithm;

/// Configuration for the authentication service.
#[derive(Clone)]
pub struct AuthConfig {
    /// Symmetric secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// HMAC signing algorithm (HS256, HS384 or HS512).
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 3600 = 60 minutes).
    pub access_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length accepted at registration.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: Algorithm::HS256,
            access_token_lifetime_secs: 3600,
            pepper: None,
            min_password_length: 6,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("pepper", &self.pepper.as_ref().map(|_| "[redacted]"))
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}
