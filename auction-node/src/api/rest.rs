use std::future::Future;
use std::sync::Arc;

use auction_common::{
    wire::{
        BidRequest, BidResponse, EndResponse, ErrorResponse, HealthResponse, ReplicateResponse,
        ResultResponse, BID_PATH, END_PATH, HEALTH_PATH, REPLICATE_PATH, RESULT_PATH,
    },
    AuctionError, Bid, Envelope,
};
use auction_core::{Applied, Node};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Node>,
}

pub struct ApiError(AuctionError);

impl From<AuctionError> for ApiError {
    fn from(err: AuctionError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.0.to_string() };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(BID_PATH, post(bid_api))
        .route(RESULT_PATH, get(result_api))
        .route(END_PATH, post(end_api))
        .route(REPLICATE_PATH, post(replicate_api))
        .route(HEALTH_PATH, get(health_api))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Serves the node on an already-bound listener until `shutdown` resolves.
pub async fn start_rest_api<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let node = state.node.id().clone();
    if let Ok(addr) = listener.local_addr() {
        info!(%node, %addr, "REST API listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn bid_api(
    State(state): State<AppState>,
    Json(req): Json<BidRequest>,
) -> Result<Json<BidResponse>, ApiError> {
    let bid = Bid::new(req.bidder, req.amount).map_err(|e| {
        warn!(error = %e, "rejected malformed bid request");
        e
    })?;
    let outcome = state.node.bid(bid).await;
    Ok(Json(outcome.into()))
}

async fn result_api(State(state): State<AppState>) -> Json<ResultResponse> {
    Json(state.node.result().into())
}

async fn end_api(State(state): State<AppState>) -> Json<EndResponse> {
    let status = state.node.end().await;
    Json(EndResponse { status })
}

async fn replicate_api(
    State(state): State<AppState>,
    Json(envelope): Json<Envelope>,
) -> Json<ReplicateResponse> {
    let applied = state.node.apply_replicated(&envelope);
    Json(ReplicateResponse {
        applied: applied != Applied::Duplicate,
    })
}

async fn health_api(State(state): State<AppState>) -> Json<HealthResponse> {
    let node = &state.node;
    let stats = node.stats();
    Json(HealthResponse {
        node: node.id().to_string(),
        ended: node.snapshot().ended,
        peers: node.peers().len(),
        deliveries_ok: stats.deliveries_ok,
        deliveries_failed: stats.deliveries_failed,
        duplicates_ignored: stats.duplicates_ignored,
    })
}
