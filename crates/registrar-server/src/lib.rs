//! Registrar Server: the HTTP API over the auth and store crates.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::Settings;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
