//! HTTP API server for the routing node.
//!
//! Inbound delivery of neighbor updates, plus read-only inspection of the
//! routing table.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use dvr_routing::{Router as DvrRouter, RouterSnapshot, RoutingError, Transport, UpdateMessage};

// --- Response types ---

#[derive(Serialize)]
pub struct UpdateResponse {
    pub status: String,
    pub message: String,
    pub changed: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn routing_error(err: RoutingError) -> ApiError {
    let status = match err {
        RoutingError::UnknownNeighbor(_) => StatusCode::FORBIDDEN,
        RoutingError::MalformedMessage(_) | RoutingError::MalformedIdentifier { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err)
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_routes<T: Transport + 'static>(
    State(router): State<Arc<DvrRouter<T>>>,
) -> Json<RouterSnapshot> {
    Json(router.snapshot())
}

async fn handle_receive_update<T: Transport + 'static>(
    State(router): State<Arc<DvrRouter<T>>>,
    payload: Result<Json<UpdateMessage>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let Json(message) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected malformed update");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let changed = router.handle_update(&message).map_err(|e| {
        tracing::warn!(sender = %message.sender_address, error = %e, "rejected update");
        routing_error(e)
    })?;

    Ok(Json(UpdateResponse {
        status: "success".into(),
        message: "Update received".into(),
        changed,
    }))
}

// --- Server ---

pub fn build_router<T: Transport + 'static>(router: Arc<DvrRouter<T>>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/routes", get(handle_routes::<T>))
        .route("/receive_update", post(handle_receive_update::<T>))
        .with_state(router)
}

/// Serve the API on an already bound listener until the task is dropped.
pub async fn serve<T: Transport + 'static>(
    listener: tokio::net::TcpListener,
    router: Arc<DvrRouter<T>>,
) -> anyhow::Result<()> {
    let app = build_router(router);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn bind(listen_addr: SocketAddr) -> anyhow::Result<tokio::net::TcpListener> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    Ok(listener)
}
