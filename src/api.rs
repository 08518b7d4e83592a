//! REST surface for the dashboard: submission listing and updates, backup
//! import and export, and per-table counts.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::archive::build_archive;
use crate::batch::import_batch;
use crate::error::{FormdeskError, Result};
use crate::store::{Filter, SubmissionStore};
use crate::tables::{Table, ALL_TABLES};

pub type SharedStore = Arc<dyn SubmissionStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub archive_prefix: Arc<str>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<FormdeskError> for ApiError {
    fn from(e: FormdeskError) -> Self {
        match e {
            FormdeskError::InvalidTable(_) => Self::BadRequest("Invalid table".to_string()),
            e if e.is_client_error() => Self::BadRequest(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run a storage call on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&dyn SubmissionStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn parse_table(key: Option<&str>) -> ApiResult<Table> {
    Table::from_key(key.unwrap_or_default()).map_err(ApiError::from)
}

/// Body variant: anything but a string names no table.
fn table_field(value: Option<&Value>) -> ApiResult<Table> {
    parse_table(value.and_then(Value::as_str))
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Ids arrive as strings, but accept bare numbers too.
fn id_param(value: Option<Value>) -> ApiResult<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ApiError::BadRequest("Missing id".to_string())),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListParams {
    table: Option<String>,
    resolved: Option<String>,
    search: Option<String>,
}

async fn list_submissions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let table = parse_table(params.table.as_deref())?;
    let filter = Filter {
        resolved: match params.resolved.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        },
        search: params.search,
    };
    let data = with_store(&state, move |store| store.select(table, &filter)).await?;
    Ok(Json(json!({ "data": data })))
}

#[derive(Deserialize)]
struct UpdateBody {
    table: Option<Value>,
    id: Option<Value>,
    resolved: Option<Value>,
}

async fn update_submission(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(payload)?;
    let table = table_field(body.table.as_ref())?;
    let id = id_param(body.id)?;
    let resolved = match body.resolved {
        Some(Value::Bool(b)) => b,
        None | Some(Value::Null) => {
            return Err(ApiError::BadRequest("Missing resolved".to_string()))
        }
        Some(_) => {
            return Err(ApiError::BadRequest("resolved must be true or false".to_string()))
        }
    };
    let changed =
        with_store(&state, move |store| store.set_resolved(table, &id, resolved)).await?;
    tracing::info!(table = %table, resolved, changed, "submission updated");
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
struct DeleteParams {
    table: Option<String>,
    id: Option<String>,
}

async fn delete_submission(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<Value>> {
    let table = parse_table(params.table.as_deref())?;
    let id = id_param(params.id.map(Value::String))?;
    let removed = with_store(&state, move |store| store.delete(table, &id)).await?;
    tracing::info!(table = %table, removed, "submission deleted");
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
struct ImportBody {
    table: Option<Value>,
    data: Option<Value>,
}

async fn import_backup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ImportBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_body(payload)?;
    let table = table_field(body.table.as_ref())?;
    let records = match body.data {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ApiError::BadRequest("No data provided".to_string())),
    };
    let result = with_store(&state, move |store| import_batch(store, table.key(), &records)).await?;
    Ok(Json(json!({
        "success": result.success,
        "failed": result.failed,
        "errors": result.errors,
    })))
}

#[derive(Deserialize)]
struct ExportParams {
    table: Option<String>,
}

async fn export_backup(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let selection = match params.table.as_deref() {
        None | Some("all") | Some("") => None,
        Some(key) => Some(Table::from_key(key)?),
    };
    let prefix = Arc::clone(&state.archive_prefix);
    let today = chrono::Local::now().date_naive();
    let archive =
        with_store(&state, move |store| build_archive(store, selection, &prefix, today)).await?;
    let disposition = format!("attachment; filename=\"{}\"", archive.name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}

async fn dashboard_counts(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let counts = with_store(&state, |store| {
        ALL_TABLES
            .iter()
            .map(|t| -> Result<Value> {
                Ok(json!({
                    "table": t.key(),
                    "label": t.name(),
                    "count": store.count(*t, None)?,
                    "pending": store.count(*t, Some(false))?,
                }))
            })
            .collect::<Result<Vec<Value>>>()
    })
    .await?;
    Ok(Json(json!({ "counts": counts })))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/submissions",
            get(list_submissions)
                .patch(update_submission)
                .delete(delete_submission),
        )
        .route("/backups/import", post(import_backup))
        .route("/backups/export", get(export_backup))
        .route("/dashboard/counts", get(dashboard_counts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "formdesk listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RawRecord, SqliteStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let state = AppState {
            store: store.clone(),
            archive_prefix: Arc::from("graycup-backup"),
        };
        (router(state), store)
    }

    fn seed(store: &SqliteStore) {
        for (name, resolved) in [("Ravi", false), ("Mei", true)] {
            let row: RawRecord = json!({"name": name, "phone": "555", "resolved": resolved})
                .as_object()
                .unwrap()
                .clone();
            store.insert(Table::CallRequests, &row).unwrap();
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_table() {
        let (app, _) = app();
        let (status, body) = send(app, get_request("/submissions?table=users")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid table"}));
    }

    #[tokio::test]
    async fn test_list_filters_by_resolved() {
        let (app, store) = app();
        seed(&store);
        let (status, body) =
            send(app.clone(), get_request("/submissions?table=call_requests")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (_, body) = send(app, get_request("/submissions?table=call_requests&resolved=true")).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Mei");
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let (app, store) = app();
        seed(&store);
        let rows = store
            .select(Table::CallRequests, &Filter { resolved: Some(false), search: None })
            .unwrap();
        let id = rows[0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            app.clone(),
            json_request(
                "PATCH",
                "/submissions",
                json!({"table": "call_requests", "id": id, "resolved": true}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
        assert_eq!(store.count(Table::CallRequests, Some(true)).unwrap(), 2);

        let uri = format!("/submissions?table=call_requests&id={id}");
        let req = Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.count(Table::CallRequests, None).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_patch_requires_id() {
        let (app, _) = app();
        let (status, body) = send(
            app,
            json_request("PATCH", "/submissions", json!({"table": "call_requests", "resolved": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing id");
    }

    #[tokio::test]
    async fn test_import_endpoint() {
        let (app, store) = app();
        let payload = json!({
            "table": "call_requests",
            "data": [
                {"id": "1", "name": "Ravi", "phone": "555", "Status": "Resolved"},
                {"name": "No Phone"},
            ],
        });
        let (status, body) = send(app, json_request("POST", "/backups/import", payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], 1);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(store.count(Table::CallRequests, Some(true)).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_validation() {
        let (app, store) = app();
        let (status, body) = send(
            app.clone(),
            json_request("POST", "/backups/import", json!({"table": "users", "data": [{"a": 1}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid table");

        let (status, body) = send(
            app,
            json_request("POST", "/backups/import", json!({"table": "call_requests", "data": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No data provided");
        assert_eq!(store.count(Table::CallRequests, None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_string_table_is_invalid() {
        let (app, store) = app();
        let (status, body) = send(
            app,
            json_request("POST", "/backups/import", json!({"table": 5, "data": [{"name": "x"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid table"}));
        assert_eq!(store.count(Table::CallRequests, None).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_patch_rejects_non_boolean_resolved() {
        let (app, store) = app();
        seed(&store);
        let (status, body) = send(
            app,
            json_request(
                "PATCH",
                "/submissions",
                json!({"table": "call_requests", "id": "abc", "resolved": "yes"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "resolved must be true or false");
        assert_eq!(store.count(Table::CallRequests, Some(true)).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let (app, _) = app();
        let req = Request::builder()
            .method("POST")
            .uri("/backups/import")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"table\": "))
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

        let req = Request::builder()
            .method("PATCH")
            .uri("/submissions")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_export_returns_zip() {
        let (app, store) = app();
        seed(&store);
        let resp = app
            .oneshot(get_request("/backups/export?table=call_requests"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("graycup-backup-"));
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let (app, store) = app();
        seed(&store);
        let (status, body) = send(app, get_request("/dashboard/counts")).await;
        assert_eq!(status, StatusCode::OK);
        let counts = body["counts"].as_array().unwrap();
        assert_eq!(counts.len(), ALL_TABLES.len());
        let calls = counts.iter().find(|c| c["table"] == "call_requests").unwrap();
        assert_eq!(calls["count"], 2);
        assert_eq!(calls["pending"], 1);
        assert_eq!(calls["label"], "Call Requests");
    }
}
