//! Registration, login and identity endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use registrar_auth::{AccessTokenClaims, LoginInput, RegisterInput};
use registrar_core::RegistrarError;
use registrar_core::models::user::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody, LoginCredentials};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub email: String,
    pub role: Role,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    // Usernames are matched exactly at login.
    if req.username.trim().is_empty() {
        return Err(RegistrarError::Validation {
            message: "Username must not be empty".into(),
        }
        .into());
    }
    if req.username.trim() != req.username {
        return Err(RegistrarError::Validation {
            message: "Username must not start or end with whitespace".into(),
        }
        .into());
    }

    let user = state
        .auth
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": user.id,
            "username": user.username,
        })),
    ))
}

/// Served at both `/login` and `/token`.
pub async fn login(
    State(state): State<AppState>,
    LoginCredentials(form): LoginCredentials,
) -> ApiResult<Json<TokenResponse>> {
    let output = state
        .auth
        .login(LoginInput {
            username: form.username,
            password: form.password,
        })
        .await?;

    Ok(Json(TokenResponse {
        access_token: output.access_token,
        token_type: output.token_type,
        expires_in: output.expires_in,
    }))
}

pub async fn me(CurrentUser(auth): CurrentUser) -> Json<MeResponse> {
    let principal = auth.principal;
    Json(MeResponse {
        username: principal.username,
        email: principal.email,
        role: principal.role,
    })
}

/// Echo the verified claims of the presented token.
pub async fn decode_token(CurrentUser(auth): CurrentUser) -> Json<AccessTokenClaims> {
    Json(auth.claims)
}
