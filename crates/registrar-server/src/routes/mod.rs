//! HTTP routes.

mod auth;
mod students;

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Student Management API" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token", post(auth::login))
        .route("/users/me", get(auth::me))
        .route("/decode-token", get(auth::decode_token))
        .route("/students", post(students::create).get(students::list))
        .route(
            "/students/{id}",
            get(students::get)
                .put(students::update)
                .delete(students::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
