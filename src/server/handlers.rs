//! Row read and write endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::storage::{RowStore, StoreError};

/// State shared with the row handlers.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn RowStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RowsQuery {
    /// JSONP callback name.
    pub callback: Option<String>,
    /// Restrict to rows at this address (normalized match).
    pub address: Option<String>,
}

/// Errors returned to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("row store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Row store request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = json!({"status": "error", "message": self.to_string()});
        (status, Json(body)).into_response()
    }
}

/// Callback names are restricted so the response cannot inject script.
fn valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))
}

/// `GET /rows`: all rows newest first, or those matching `address`.
pub async fn list_rows(
    State(state): State<ServerState>,
    Query(query): Query<RowsQuery>,
) -> Result<Response, ApiError> {
    if let Some(cb) = query.callback.as_deref() {
        if !valid_callback(cb) {
            return Err(ApiError::BadRequest(format!("invalid callback: {}", cb)));
        }
    }

    let mut rows = match query.address.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(address) => state.store.rows_matching_address(address).await?,
        None => state.store.rows().await?,
    };
    rows.reverse();

    let payload = Value::Array(rows.into_iter().map(Value::Object).collect());

    Ok(match query.callback {
        Some(cb) => (
            [(header::CONTENT_TYPE, "application/javascript")],
            format!("{}({})", cb, payload),
        )
            .into_response(),
        None => Json(payload).into_response(),
    })
}

/// `POST /rows`: appends one JSON object.
pub async fn append_row(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {}", e)))?;
    let Value::Object(record) = value else {
        return Err(ApiError::BadRequest("expected a JSON object".to_string()));
    };

    state.store.append(&record).await?;
    tracing::info!(columns = record.len(), "Appended row via HTTP");

    Ok(Json(json!({"status": "ok"})))
}
