//! JWT access token issuance and verification.
//!
//! Tokens are HMAC-signed (HS256/HS384/HS512) compact JWTs carrying a
//! fixed `sub`/`iat`/`exp` claim set plus an optional extension map.
//! Expiry is checked against an injectable [`Clock`] rather than by
//! `jsonwebtoken` itself, so a token is accepted only while
//! `now < exp`, with no leeway.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Registered claim names (RFC 7519 §4.1) that may not appear in the
/// extension map.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "exp", "iat", "nbf", "iss", "aud", "jti"];

/// Source of the current time, in seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to. Useful for exercising expiry.
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(AtomicI64::new(now))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Additional claims copied verbatim into the token payload.
///
/// Insertion refuses registered claim names, so an extension can never
/// shadow the subject or expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionClaims(BTreeMap<String, serde_json::Value>);

impl ExtensionClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<(), AuthError> {
        let name = name.into();
        if RESERVED_CLAIMS.contains(&name.as_str()) {
            return Err(AuthError::ReservedClaim(name));
        }
        self.0.insert(name, value.into());
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, AuthError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }
}

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: the username.
    pub sub: String,
    /// Issued-at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    #[serde(flatten)]
    pub extensions: ExtensionClaims,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Crypto("signing key must not be empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }
}

/// Mints and validates access tokens with a process-wide symmetric key.
///
/// The key sits behind an `Arc` that [`rotate_key`](Self::rotate_key)
/// replaces as a whole; a verification in flight keeps using the key it
/// loaded.
pub struct TokenAuthority {
    keys: RwLock<Arc<SigningKeys>>,
    algorithm: Algorithm,
    default_lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &self.algorithm)
            .field("default_lifetime", &self.default_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Build an authority from config, using the system clock.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        match config.jwt_algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {}
            other => {
                return Err(AuthError::Crypto(format!(
                    "unsupported signing algorithm {other:?}: only HMAC algorithms are allowed"
                )));
            }
        }

        Ok(Self {
            keys: RwLock::new(Arc::new(SigningKeys::from_secret(
                config.jwt_secret.as_bytes(),
            )?)),
            algorithm: config.jwt_algorithm,
            default_lifetime: Duration::from_secs(config.access_token_lifetime_secs),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for `iat`/`exp` and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    fn current_keys(&self) -> Arc<SigningKeys> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new signing key. Every token signed with the previous
    /// key is rejected from this point on.
    pub fn rotate_key(&self, secret: &[u8]) -> Result<(), AuthError> {
        let fresh = Arc::new(SigningKeys::from_secret(secret)?);
        *self.keys.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        info!("JWT signing key rotated");
        Ok(())
    }

    /// Issue a signed access token for `subject`.
    ///
    /// `lifetime` overrides the configured default.
    pub fn issue(
        &self,
        subject: &str,
        extensions: ExtensionClaims,
        lifetime: Option<Duration>,
    ) -> Result<String, AuthError> {
        let now = self.clock.now();
        let lifetime = lifetime.unwrap_or(self.default_lifetime);
        let lifetime = i64::try_from(lifetime.as_secs())
            .map_err(|_| AuthError::Crypto("token lifetime out of range".into()))?;

        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
            extensions,
        };

        let keys = self.current_keys();
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &keys.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Verify a token's signature, then its expiry, and return its
    /// claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let keys = self.current_keys();
        let claims = jsonwebtoken::decode::<AccessTokenClaims>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::TokenInvalidSignature
                }
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenMalformed(e.to_string()),
            })?;

        let now = self.clock.now();
        if now >= claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, now, "rejecting expired token");
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
