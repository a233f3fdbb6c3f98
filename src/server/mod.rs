//! HTTP adapter over the row store.
//!
//! - `GET /rows[?address=..][&callback=..]` lists rows newest first, wrapped
//!   as `callback(json)` when a callback is given
//! - `POST /rows` appends one JSON object

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

pub use handlers::{ApiError, RowsQuery, ServerState};

use crate::storage::RowStore;

/// Builds the router for the row endpoints.
pub fn router(store: Arc<dyn RowStore>) -> Router {
    Router::new()
        .route("/rows", get(handlers::list_rows).post(handlers::append_row))
        .with_state(ServerState { store })
}

/// Serves the router until the process is stopped.
pub async fn serve(bind: &str, store: Arc<dyn RowStore>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "Row store HTTP adapter listening");

    axum::serve(listener, router(store)).await
}
