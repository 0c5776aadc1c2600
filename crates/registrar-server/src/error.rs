//! Mapping of domain errors onto HTTP responses.
//!
//! Every error body has the shape `{"detail": "<reason>"}`. Internal
//! faults are logged here and never leak detail to the client.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use registrar_auth::AuthError;
use registrar_core::RegistrarError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registrar(#[from] RegistrarError),

    #[error("not enough permissions")]
    Forbidden,

    /// The request body could not be extracted.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

fn capitalize(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            ApiError::Auth(
                AuthError::UsernameTaken | AuthError::WeakPassword { .. } | AuthError::ReservedClaim(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::Store(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Registrar(e) => match e {
                RegistrarError::NotFound { .. } => StatusCode::NOT_FOUND,
                RegistrarError::AlreadyExists { .. } => StatusCode::CONFLICT,
                RegistrarError::InvalidId { .. } | RegistrarError::Validation { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RegistrarError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
                RegistrarError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Rejected { status, .. } => *status,
        }
    }

    /// The client-facing reason.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Auth(e) => e.client_reason(),
            ApiError::Registrar(e) => match e {
                RegistrarError::NotFound { entity, .. } => {
                    format!("{} not found", capitalize(entity))
                }
                RegistrarError::AlreadyExists { entity } => {
                    format!("{} already exists", capitalize(entity))
                }
                RegistrarError::InvalidId { entity, .. } => format!("Invalid {entity} ID"),
                RegistrarError::Validation { message } => message.clone(),
                RegistrarError::Database(_) => "Service temporarily unavailable".into(),
                RegistrarError::Internal(_) => "Internal server error".into(),
            },
            ApiError::Forbidden => "Not enough permissions".into(),
            ApiError::Rejected { detail, .. } => detail.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(error = %self, "authentication rejected");
        }

        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
