//! Student record endpoints. All require a bearer token.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use registrar_core::RegistrarError;
use registrar_core::models::student::{Student, StudentInput};
use registrar_core::repository::StudentRepository;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

fn validate(input: &StudentInput) -> Result<(), RegistrarError> {
    if input.name.trim().is_empty() {
        return Err(RegistrarError::Validation {
            message: "Student name must not be empty".into(),
        });
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    JsonBody(input): JsonBody<StudentInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate(&input)?;
    let student = state
        .students
        .create(input, &auth.principal.username)
        .await?;

    info!(student_id = %student.id, created_by = %student.created_by, "student created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Student created successfully",
            "student_id": student.id,
            "name": student.name,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<Value>> {
    let students = state.students.list().await?;
    Ok(Json(json!({
        "count": students.len(),
        "students": students,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    Ok(Json(state.students.get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StudentInput>,
) -> ApiResult<Json<Value>> {
    validate(&input)?;
    let student = state.students.update(&id, input).await?;

    info!(student_id = %student.id, updated_by = %auth.principal.username, "student updated");
    Ok(Json(json!({ "message": "Student updated successfully" })))
}

/// Only teachers and admins may delete records.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !auth.principal.role.can_delete_students() {
        return Err(ApiError::Forbidden);
    }
    state.students.delete(&id).await?;

    info!(student_id = %id, deleted_by = %auth.principal.username, "student deleted");
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}
