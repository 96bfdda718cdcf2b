//! Miner HTTP gateway (axum): query routes for validators and document management.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    DocumentAck, delete_document_handler, query_documents_handler, query_handler,
    upsert_document_handler,
};
pub use state::MinerState;

use crate::constants::CERS_STATUS_HEADER;
use crate::vectordb::VectorIndex;

pub fn create_router_with_state<V>(state: MinerState<V>) -> Router
where
    V: VectorIndex + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/query", post(query_handler))
        .route("/query/documents", post(query_documents_handler))
        .route("/documents", post(upsert_document_handler))
        .route("/documents/{id}", delete(delete_document_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CERS_STATUS_HEADER, HeaderValue::from_static("ok"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
