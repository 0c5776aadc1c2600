//! Authentication service: registration, login and the per-request
//! bearer-token gate.

use std::sync::Arc;

use registrar_core::error::RegistrarError;
use registrar_core::models::user::{NewUser, Principal, Role, User};
use registrar_core::repository::UserRepository;
use tracing::{debug, error, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{AccessTokenClaims, Clock, ExtensionClaims, TokenAuthority};

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// The outcome of a successful [`AuthService::authenticate_request`]:
/// who the caller is and what their token said.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    pub claims: AccessTokenClaims,
}

/// Extract the token from an `Authorization` header value using the
/// bearer scheme. The scheme name is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    tokens: TokenAuthority,
    config: Arc<AuthConfig>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Result<Self, AuthError> {
        let tokens = TokenAuthority::new(&config)?;
        Ok(Self {
            user_repo,
            tokens,
            config: Arc::new(config),
        })
    }

    /// Replace the clock used by the token authority.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tokens = self.tokens.with_clock(clock);
        self
    }

    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    pub fn users(&self) -> &U {
        &self.user_repo
    }

    /// Create a new credential record. The password is hashed before it
    /// reaches the store.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        let min = self.config.min_password_length.max(1);
        if input.password.chars().count() < min {
            return Err(AuthError::WeakPassword { min });
        }

        let password_hash = self.hash(input.password).await?;

        let user = self
            .user_repo
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await
            .map_err(|e| match e {
                RegistrarError::AlreadyExists { .. } => AuthError::UsernameTaken,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check a username/password pair and issue an access token.
    ///
    /// An unknown username and a wrong password produce the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutput, AuthError> {
        let user = match self.user_repo.get_by_username(&input.username).await {
            Ok(u) => u,
            Err(RegistrarError::NotFound { .. }) => {
                debug!(username = %input.username, "login for unknown user");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Store(e)),
        };

        let valid = match self.verify(input.password, user.password_hash.clone()).await {
            Ok(valid) => valid,
            Err(e @ AuthError::MalformedHash(_)) => {
                error!(user_id = %user.id, error = %e, "stored password hash is corrupt");
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        if !valid {
            debug!(username = %user.username, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let extensions = ExtensionClaims::new()
            .with("email", user.email.as_str())?
            .with("role", user.role.as_str())?;
        let access_token = self.tokens.issue(&user.username, extensions, None)?;

        info!(user_id = %user.id, username = %user.username, "user logged in");
        Ok(LoginOutput {
            access_token,
            token_type: "bearer",
            expires_in: self.tokens.default_lifetime().as_secs(),
        })
    }

    /// Resolve the caller behind an `Authorization` header value.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        self.authenticate_request(header)
            .await
            .map(|auth| auth.principal)
    }

    /// Like [`authenticate`](Self::authenticate), also returning the
    /// verified claims.
    ///
    /// 1. no bearer credential → `MissingCredentials`
    /// 2. token rejected → `TokenMalformed` / `TokenInvalidSignature` /
    ///    `TokenExpired`
    /// 3. subject not in the store → `UnknownPrincipal`; store failure →
    ///    `Store`
    pub async fn authenticate_request(
        &self,
        header: Option<&str>,
    ) -> Result<Authenticated, AuthError> {
        let token = bearer_token(header).ok_or(AuthError::MissingCredentials)?;
        let claims = self.tokens.verify(token)?;

        let user = match self.user_repo.get_by_username(&claims.sub).await {
            Ok(u) => u,
            Err(RegistrarError::NotFound { .. }) => {
                debug!(sub = %claims.sub, "token subject no longer exists");
                return Err(AuthError::UnknownPrincipal(claims.sub));
            }
            Err(e) => {
                warn!(sub = %claims.sub, error = %e, "credential store lookup failed");
                return Err(AuthError::Store(e));
            }
        };

        Ok(Authenticated {
            principal: user.into(),
            claims,
        })
    }

    /// Argon2 is deliberately slow; keep it off the async workers.
    async fn hash(&self, plaintext: String) -> Result<String, AuthError> {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            password::hash_password(&plaintext, config.pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Crypto(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, plaintext: String, hash: String) -> Result<bool, AuthError> {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            password::verify_password(&plaintext, &hash, config.pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Crypto(format!("verification task failed: {e}")))?
    }
}
