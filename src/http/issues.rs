//! Issue CRUD handlers.
//!
//! Request bodies are read as loose JSON objects so that absent keys,
//! `null`, empty strings and numeric strings can be told apart the way
//! the web forms send them.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::models::issue::{parse_timestamp, Issue, IssuePatch, IssueStatus, NewIssue, Priority};
use crate::persistence::issue_repo::{IssueFilter, IssueRepo};
use crate::persistence::user_repo::UserRepo;
use crate::{AppError, Result};

use super::error::JsonBody;
use super::AppState;

/// Query string accepted by `GET /issues`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    title: Option<String>,
    status: Option<String>,
    assignee_id: Option<String>,
    assignee: Option<String>,
}

/// `GET /issues`
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Issue>>> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    let status = match non_empty(params.status) {
        Some(raw) => match raw.parse::<IssueStatus>() {
            Ok(status) => Some(status),
            // No stored issue can carry an unknown status.
            Err(_) => return Ok(Json(Vec::new())),
        },
        None => None,
    };

    let filter = IssueFilter {
        title: non_empty(params.title),
        status,
        assignee_id: non_empty(params.assignee_id).and_then(|s| s.trim().parse().ok()),
        assignee_name: non_empty(params.assignee),
    };

    let issues = IssueRepo::new(Arc::clone(&state.db)).list(&filter).await?;
    Ok(Json(issues))
}

/// `POST /issues`
///
/// # Errors
///
/// Returns `AppError::Validation` for missing or malformed fields.
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<(StatusCode, Json<Issue>)> {
    let new_issue = parse_new_issue(&body)?;
    if let Some(id) = new_issue.assignee_id {
        ensure_assignee_exists(&state, id).await?;
    }
    let issue = IssueRepo::new(Arc::clone(&state.db)).create(&new_issue).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// `GET /issues/{id}`
///
/// # Errors
///
/// Returns `AppError::NotFound` if the issue does not exist.
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Issue>> {
    let issue = IssueRepo::new(Arc::clone(&state.db)).get_by_id(id).await?;
    Ok(Json(issue))
}

/// `PUT /issues/{id}`
///
/// # Errors
///
/// Returns `AppError::NotFound` if the issue does not exist, or
/// `AppError::Validation` for malformed fields.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Issue>> {
    let patch = parse_patch(&body)?;
    if let Some(Some(assignee_id)) = patch.assignee_id {
        ensure_assignee_exists(&state, assignee_id).await?;
    }
    let issue = IssueRepo::new(Arc::clone(&state.db)).update(id, &patch).await?;
    Ok(Json(issue))
}

/// `DELETE /issues/{id}`
///
/// # Errors
///
/// Returns `AppError::NotFound` if the issue does not exist.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    IssueRepo::new(Arc::clone(&state.db)).delete(id).await?;
    Ok(Json(json!({ "message": "Issue deleted successfully" })))
}

/// `PATCH /issues/{id}/status`
///
/// # Errors
///
/// Returns `AppError::Validation` if `status` is missing or not one of
/// the allowed values, or `AppError::NotFound` if the issue does not exist.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Issue>> {
    let raw = body
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Status is required".into()))?;
    let status = raw.parse::<IssueStatus>()?;
    let issue = IssueRepo::new(Arc::clone(&state.db))
        .update_status(id, status)
        .await?;
    Ok(Json(issue))
}

async fn ensure_assignee_exists(state: &AppState, id: i64) -> Result<()> {
    match UserRepo::new(Arc::clone(&state.db)).get_by_id(id).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(AppError::Validation(format!("Assignee {id} not found"))),
        Err(err) => Err(err),
    }
}

/// Build a [`NewIssue`] from a create request body.
///
/// `title` and `description` are required. An empty, null or non-integer
/// `assignee_id` leaves the issue unassigned; an unparsable `due_date`
/// leaves it without a deadline.
///
/// # Errors
///
/// Returns `AppError::Validation` for missing text fields or unknown
/// status/priority labels.
pub fn parse_new_issue(body: &Map<String, Value>) -> Result<NewIssue> {
    let title = required_text(body, "title", "Title is required")?;
    let description = required_text(body, "description", "Description is required")?;

    let status = match optional_text(body, "status") {
        Some(raw) => raw.parse::<IssueStatus>()?,
        None => IssueStatus::default(),
    };
    let priority = match optional_text(body, "priority") {
        Some(raw) => raw.parse::<Priority>()?,
        None => Priority::default(),
    };

    Ok(NewIssue {
        title,
        description,
        status,
        priority,
        assignee_id: body.get("assignee_id").and_then(lenient_id),
        due_date: optional_text(body, "due_date").and_then(parse_timestamp),
    })
}

/// Build an [`IssuePatch`] from an update request body; only present keys
/// are changed.
///
/// # Errors
///
/// Returns `AppError::Validation` for empty text fields, unknown labels,
/// or an `assignee_id`/`due_date` that cannot be interpreted.
pub fn parse_patch(body: &Map<String, Value>) -> Result<IssuePatch> {
    let mut patch = IssuePatch::default();

    if body.contains_key("title") {
        patch.title = Some(required_text(body, "title", "Title is required")?);
    }
    if body.contains_key("description") {
        patch.description = Some(required_text(body, "description", "Description is required")?);
    }
    if body.contains_key("status") {
        let raw = optional_text(body, "status").unwrap_or_default();
        patch.status = Some(raw.parse::<IssueStatus>()?);
    }
    if body.contains_key("priority") {
        let raw = optional_text(body, "priority").unwrap_or_default();
        patch.priority = Some(raw.parse::<Priority>()?);
    }
    if let Some(value) = body.get("assignee_id") {
        patch.assignee_id = Some(if is_blank(value) {
            None
        } else {
            Some(
                lenient_id(value)
                    .ok_or_else(|| AppError::Validation("Invalid assignee_id".into()))?,
            )
        });
    }
    if let Some(value) = body.get("due_date") {
        patch.due_date = Some(if is_blank(value) {
            None
        } else {
            Some(
                value
                    .as_str()
                    .and_then(parse_timestamp)
                    .ok_or_else(|| AppError::Validation("Invalid due_date".into()))?,
            )
        });
    }

    Ok(patch)
}

fn required_text(body: &Map<String, Value>, key: &str, message: &str) -> Result<String> {
    optional_text(body, key)
        .map(str::to_owned)
        .ok_or_else(|| AppError::Validation(message.to_owned()))
}

fn optional_text<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Integer id from a JSON number or numeric string.
fn lenient_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
