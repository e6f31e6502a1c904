//! HTTP server for the compare endpoints

use crate::compare::Comparator;
use crate::delivery;
use crate::types::{CompareRequest, CompareResponse, HealthResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tokio::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tracing::{error, info, warn};

/// Shared state for the HTTP server
pub struct ServerState {
    pub comparator: Arc<Comparator>,
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(comparator: Comparator) -> Self {
        Self {
            comparator: Arc::new(comparator),
            started_at: Instant::now(),
        }
    }

    /// Seconds since startup on the monotonic clock
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<ServerState>;

/// `*` allows any origin, otherwise only the listed ones
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    }
}

/// Create the HTTP router
pub fn create_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/compare-users", post(compare_users))
        .route("/compare-users/stream", post(compare_users_stream))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16, cors: CorsLayer) -> std::io::Result<()> {
    let router = create_router(state, cors);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.comparator.lookups().cache().stats();

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
        cache: cache_stats,
    })
}

/// Compare two users and answer with one JSON document
async fn compare_users(
    State(state): State<SharedState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Json<CompareResponse> {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected compare request");
            return Json(CompareResponse::failure(rejection.body_text()));
        }
    };

    Json(state.comparator.compare(&request).await)
}

/// Compare two users and stream the roast as server-sent events
async fn compare_users_stream(
    State(state): State<SharedState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Response {
    let fragments = match payload {
        Ok(Json(request)) => state.comparator.clone().compare_stream(request),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected compare stream request");
            delivery::error_only(rejection.body_text())
        }
    };

    delivery::event_stream(fragments).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = delivery::panic_message(panic.as_ref());
    error!(error = %details, "Request handler panicked");

    Json(CompareResponse::failure(details)).into_response()
}
