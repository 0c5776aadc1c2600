//! Server settings, layered from `registrar.toml` and `REGISTRAR_*`
//! environment variables.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `REGISTRAR_JWT__SECRET` or `REGISTRAR_DATABASE__URL`.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use jsonwebtoken::Algorithm;
use registrar_auth::AuthConfig;
use registrar_db::DbConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "registrar.toml";
const ENV_PREFIX: &str = "REGISTRAR_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_url")]
    pub url: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_database")]
    pub database: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

fn default_db_url() -> String {
    DbConfig::default().url
}

fn default_namespace() -> String {
    DbConfig::default().namespace
}

fn default_database() -> String {
    DbConfig::default().database
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            namespace: default_namespace(),
            database: default_database(),
            username: None,
            password: None,
        }
    }
}

impl DatabaseSettings {
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            url: self.url.clone(),
            namespace: self.namespace.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: SecretString,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default = "default_expire_minutes")]
    pub access_token_expire_minutes: u64,
}

fn default_algorithm() -> Algorithm {
    Algorithm::HS256
}

fn default_expire_minutes() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordSettings {
    pub pepper: Option<SecretString>,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

fn default_min_length() -> usize {
    AuthConfig::default().min_password_length
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            pepper: None,
            min_length: default_min_length(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "registrar=info,tower_http=info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load from [`DEFAULT_CONFIG_FILE`] and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given TOML file (which may be absent) and the
    /// environment. Environment variables win.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("jwt.secret must not be empty".into()));
        }
        if !matches!(
            self.jwt.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::Invalid(format!(
                "jwt.algorithm {:?} is not supported; use HS256, HS384 or HS512",
                self.jwt.algorithm
            )));
        }
        if self.jwt.access_token_expire_minutes == 0 {
            return Err(ConfigError::Invalid(
                "jwt.access_token_expire_minutes must be positive".into(),
            ));
        }
        if self.password.min_length == 0 {
            return Err(ConfigError::Invalid(
                "password.min_length must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt.secret.expose_secret().to_string(),
            jwt_algorithm: self.jwt.algorithm,
            access_token_lifetime_secs: self.jwt.access_token_expire_minutes * 60,
            pepper: self
                .password
                .pepper
                .as_ref()
                .map(|p| p.expose_secret().to_string()),
            min_password_length: self.password.min_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_figment(Figment::new().merge(Toml::string(toml)))
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let settings = from_toml(
            r#"
            [jwt]
            secret = "a-long-enough-signing-secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.database.url, "ws://127.0.0.1:8000");
        assert_eq!(settings.logging.format, LogFormat::Json);

        let auth = settings.auth_config();
        assert_eq!(auth.jwt_algorithm, Algorithm::HS256);
        assert_eq!(auth.access_token_lifetime_secs, 3600);
        assert_eq!(auth.min_password_length, 6);
        assert!(auth.pepper.is_none());
    }

    #[test]
    fn nested_sections_are_read() {
        let settings = from_toml(
            r#"
            [server]
            port = 9090

            [database]
            url = "mem://"
            username = "root"
            password = "root"

            [jwt]
            secret = "s"
            algorithm = "HS512"
            access_token_expire_minutes = 30

            [password]
            pepper = "pepper"
            min_length = 10

            [logging]
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.logging.format, LogFormat::Pretty);

        let db = settings.database.to_db_config();
        assert_eq!(db.url, "mem://");
        assert_eq!(db.password.as_deref(), Some("root"));

        let auth = settings.auth_config();
        assert_eq!(auth.jwt_algorithm, Algorithm::HS512);
        assert_eq!(auth.access_token_lifetime_secs, 1800);
        assert_eq!(auth.pepper.as_deref(), Some("pepper"));
        assert_eq!(auth.min_password_length, 10);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        let err = from_toml("[server]\nport = 8000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn empty_secret_is_invalid() {
        let err = from_toml("[jwt]\nsecret = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn asymmetric_algorithm_is_invalid() {
        let err = from_toml("[jwt]\nsecret = \"s\"\nalgorithm = \"RS256\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("RS256")));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let settings = from_toml(
            "[jwt]\nsecret = \"super-secret-value\"\n[password]\npepper = \"pepper-value\"\n",
        )
        .unwrap();

        let debug = format!("{settings:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("pepper-value"));
    }
}
