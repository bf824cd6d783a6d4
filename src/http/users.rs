//! User handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::models::user::{NewUser, User};
use crate::persistence::user_repo::UserRepo;
use crate::{AppError, Result};

use super::error::JsonBody;
use super::AppState;

/// `GET /users` and `GET /api/users`
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    let users = UserRepo::new(Arc::clone(&state.db)).list().await?;
    Ok(Json(users))
}

/// `POST /users`
///
/// # Errors
///
/// Returns `AppError::Validation` if `name` or `role` is missing, or
/// `AppError::Conflict` if the name is taken.
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<User>)> {
    let field = |key: &str, message: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation(message.to_owned()))
    };
    let new_user = NewUser {
        name: field("name", "Name is required")?,
        role: field("role", "Role is required")?,
    };

    let user = UserRepo::new(Arc::clone(&state.db)).create(&new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `DELETE /users/{id}`
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user does not exist, or
/// `AppError::Conflict` if issues are still assigned to them.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    UserRepo::new(Arc::clone(&state.db)).delete(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
