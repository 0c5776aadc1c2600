//! Request extractors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use registrar_auth::Authenticated;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller of a protected route.
///
/// Runs the bearer-token gate against the `Authorization` header. A
/// header that is not valid UTF-8 counts as absent.
pub struct CurrentUser(pub Authenticated);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let authenticated = state.auth.authenticate_request(header).await?;
        Ok(CurrentUser(authenticated))
    }
}

/// `Json<T>` whose rejections use the API's error body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(JsonBody(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Rejected {
        status: rejection.status(),
        detail: rejection.body_text(),
    }
}

/// Username and password for the login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Accepts login credentials as either a URL-encoded form (the OAuth2
/// password-grant shape) or a JSON object.
pub struct LoginCredentials(pub LoginForm);

impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(form) = Form::<LoginForm>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Rejected {
                    status: rejection.status(),
                    detail: rejection.body_text(),
                })?;
            Ok(LoginCredentials(form))
        } else {
            let JsonBody(form) = JsonBody::<LoginForm>::from_request(req, state).await?;
            Ok(LoginCredentials(form))
        }
    }
}
