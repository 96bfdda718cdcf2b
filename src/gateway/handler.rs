use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use crate::constants::{API_KEY_HEADER, CERS_STATUS_HEADER};
use crate::gateway::error::GatewayError;
use crate::gateway::state::MinerState;
use crate::hashing::api_key_matches;
use crate::miner::Document;
use crate::protocol::{DocumentReply, Query, QueryReply, QueryRequest};
use crate::vectordb::VectorIndex;

/// Body of document management replies.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentAck {
    pub status: String,
    pub id: String,
    pub message: String,
}

/// Ranked ids only; document text never leaves this route.
#[instrument(skip(state, request))]
pub async fn query_handler<V>(
    State(state): State<MinerState<V>>,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    V: VectorIndex + 'static,
{
    let query = parse_query(json_body(request)?)?;

    let hits = state.store.search(query.as_str(), state.search_k).await?;
    debug!(hits = hits.len(), "Answered query");

    let reply = QueryReply::new(hits.into_iter().map(|hit| hit.id).collect());
    Ok(ok_response(StatusCode::OK, Json(reply)))
}

/// Ranked ids with their text, for cross-encoder rounds.
#[instrument(skip(state, request))]
pub async fn query_documents_handler<V>(
    State(state): State<MinerState<V>>,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    V: VectorIndex + 'static,
{
    if !state.serve_documents {
        return Err(GatewayError::NotFound(
            "this miner does not serve documents".to_string(),
        ));
    }

    let query = parse_query(json_body(request)?)?;
    let hits = state.store.search(query.as_str(), state.search_k).await?;

    let (document_ids, documents): (Vec<String>, Vec<String>) = hits
        .into_iter()
        .filter_map(|hit| hit.text.map(|text| (hit.id, text)))
        .unzip();
    debug!(hits = document_ids.len(), "Answered document query");

    Ok(ok_response(
        StatusCode::OK,
        Json(DocumentReply::new(document_ids, documents)),
    ))
}

#[instrument(skip(state, headers, request))]
pub async fn upsert_document_handler<V>(
    State(state): State<MinerState<V>>,
    headers: HeaderMap,
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    V: VectorIndex + 'static,
{
    authorize(&state, &headers)?;

    let document: Document = serde_json::from_value(json_body(request)?)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid document: {e}")))?;
    let id = document.id.clone();

    state.store.upsert(document).await?;
    info!(doc_id = %id, "Document upserted");

    Ok(ok_response(
        StatusCode::CREATED,
        Json(DocumentAck {
            status: "success".to_string(),
            message: format!("Document {id} upserted"),
            id,
        }),
    ))
}

#[instrument(skip(state, headers))]
pub async fn delete_document_handler<V>(
    State(state): State<MinerState<V>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, GatewayError>
where
    V: VectorIndex + 'static,
{
    authorize(&state, &headers)?;

    state.store.delete(&id).await?;
    info!(doc_id = %id, "Document deleted");

    Ok(ok_response(
        StatusCode::OK,
        Json(DocumentAck {
            status: "success".to_string(),
            message: format!("Document {id} deleted"),
            id,
        }),
    ))
}

/// Unreadable bodies get the same error shape as any other bad request.
fn json_body(
    request: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<serde_json::Value, GatewayError> {
    request
        .map(|Json(value)| value)
        .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))
}

fn parse_query(request: serde_json::Value) -> Result<Query, GatewayError> {
    let request: QueryRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid query request: {e}")))?;
    Query::new(request.query).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

fn authorize<V>(state: &MinerState<V>, headers: &HeaderMap) -> Result<(), GatewayError>
where
    V: VectorIndex + 'static,
{
    let Some(expected) = state.api_key.as_ref() else {
        return Err(GatewayError::Unauthorized(
            "document management is disabled on this miner",
        ));
    };

    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(GatewayError::Unauthorized("missing API key"))?;

    if !api_key_matches(expected, presented) {
        return Err(GatewayError::Unauthorized("invalid API key"));
    }

    Ok(())
}

fn ok_response(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CERS_STATUS_HEADER, HeaderValue::from_static("ok"));
    (status, headers, body).into_response()
}
