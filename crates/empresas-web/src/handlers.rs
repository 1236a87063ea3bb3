use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use empresas_core::{EmpresasError, EmpresasResult, RecordService, ValidationError};
use empresas_store::JsonFileStore;

use crate::error::ApiError;
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;
type Body = Result<Json<Value>, JsonRejection>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a service call on the blocking pool; every call does file I/O.
async fn blocking<T, F>(state: &Arc<AppState>, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&RecordService<JsonFileStore>) -> EmpresasResult<T> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.service))
        .await
        .map_err(|e| ApiError(EmpresasError::Storage(format!("worker task failed: {e}"))))?
        .map_err(ApiError::from)
}

fn json_body(body: Body) -> ApiResult<Value> {
    body.map(|Json(v)| v)
        .map_err(|e| ValidationError::new("body", format!("is not valid JSON: {}", e.body_text())).into())
}

/// Every admin route gates on the `password` field of its own body. The
/// password is only checked once the body parses as JSON; an unparseable
/// body is a 400, not a 401.
fn admin_body(state: &AppState, body: Body) -> ApiResult<Value> {
    let body = json_body(body)?;
    let authorized = body
        .get("password")
        .and_then(Value::as_str)
        .is_some_and(|supplied| state.admin.matches(supplied));
    if !authorized {
        warn!("rejected admin request: incorrect password");
        return Err(ApiError(EmpresasError::Unauthorized));
    }
    Ok(body)
}

fn field(body: &Value, name: &str) -> Value {
    body.get(name).cloned().unwrap_or(Value::Null)
}

fn parse_index(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::new("index", "must be an integer").into())
}

// ---------------------------------------------------------------------------
// Public routes
// ---------------------------------------------------------------------------

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_records(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let records = blocking(&state, |s| s.list()).await?;
    Ok(Json(records))
}

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<impl IntoResponse> {
    let candidate = json_body(body)?;
    let record = blocking(&state, move |s| s.create(&candidate)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<Value>> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ValidationError::new("id", "must be an integer"))?;
    let id = u64::try_from(id)
        .map_err(|_| ApiError(EmpresasError::NotFound(format!("no record with id {id}"))))?;
    let concluido = field(&json_body(body)?, "concluido");
    let record = blocking(&state, move |s| s.update_completion(id, &concluido)).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// Admin routes
// ---------------------------------------------------------------------------

pub async fn admin_login(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<Value>> {
    admin_body(&state, body)?;
    Ok(Json(json!({ "message": "logged in" })))
}

pub async fn replace_all(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<Value>> {
    let data = field(&admin_body(&state, body)?, "data");
    let count = blocking(&state, move |s| s.replace_all(&data)).await?;
    Ok(Json(json!({ "message": "collection replaced", "count": count })))
}

pub async fn add_multiple(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<Value>> {
    let data = field(&admin_body(&state, body)?, "data");
    let added = blocking(&state, move |s| s.add_multiple(&data)).await?;
    Ok(Json(json!({ "message": "records added", "added": added })))
}

pub async fn clear_all(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<Value>> {
    admin_body(&state, body)?;
    blocking(&state, |s| s.clear_all()).await?;
    Ok(Json(json!({ "message": "all records removed" })))
}

pub async fn edit_record(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
    body: Body,
) -> ApiResult<impl IntoResponse> {
    let updated = field(&admin_body(&state, body)?, "updatedItem");
    let index = parse_index(&index)?;
    let record = blocking(&state, move |s| s.edit_at(index, &updated)).await?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
    body: Body,
) -> ApiResult<Json<Value>> {
    admin_body(&state, body)?;
    let index = parse_index(&index)?;
    let removed = blocking(&state, move |s| s.delete_at(index)).await?;
    Ok(Json(removed))
}

pub async fn upload_json(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<Value>> {
    let body = admin_body(&state, body)?;
    let Some(text) = body.get("jsonContent").and_then(Value::as_str).map(String::from) else {
        return Err(ValidationError::new("jsonContent", "must be a string").into());
    };
    let count = blocking(&state, move |s| s.import_raw_json(&text)).await?;
    Ok(Json(json!({ "message": "json uploaded", "count": count })))
}
