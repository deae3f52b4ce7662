//! HTTP surface of the harvesting protocol.
//!
//! Exposes `GET /harvest` for the incremental synchronization endpoint
//! and `GET /health` as a liveness probe. The handler validates the query
//! parameters, delegates to the [`Harvester`] and serializes its result
//! as-is: ordering and watermark are the harvester's job, not the
//! transport's.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use gleaner_core::{CoreError, HarvestResult, Harvester};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Server state shared across handlers.
struct AppState {
    harvester: Harvester,
}

/// Build the application router.
#[must_use]
pub fn router(harvester: Harvester) -> Router {
    let state = Arc::new(AppState { harvester });

    Router::new()
        .route("/health", get(health))
        .route("/harvest", get(harvest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the harvest server.
///
/// # Errors
/// Returns error if binding fails or the server encounters an error.
pub async fn serve(harvester: Harvester, host: &str, port: u16) -> Result<()> {
    let app = router(harvester);

    let addr = format!("{host}:{port}");
    info!(address = %addr, "Starting harvest server");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request/Response types ---

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct HarvestParams {
    #[serde(rename = "preferredAmount")]
    preferred_amount: Option<i64>,
    since: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn harvest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HarvestParams>,
) -> Result<Json<HarvestResult>, ApiError> {
    let preferred_amount = match params.preferred_amount {
        None => {
            return Err(ApiError::bad_request(
                "missing query parameter 'preferredAmount'",
            ));
        }
        Some(amount) if amount <= 0 => {
            return Err(ApiError::bad_request(
                "'preferredAmount' must be a positive integer",
            ));
        }
        Some(amount) => usize::try_from(amount)
            .map_err(|_| ApiError::bad_request("'preferredAmount' is out of range"))?,
    };

    let since = match params.since {
        None => return Err(ApiError::bad_request("missing query parameter 'since'")),
        Some(ms) if ms < 0 => {
            return Err(ApiError::bad_request(
                "'since' must be a non-negative integer (milliseconds since epoch)",
            ));
        }
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| ApiError::bad_request("'since' is out of range"))?,
    };

    let result = state
        .harvester
        .harvest(since, preferred_amount)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(result))
}

// --- Error handling ---

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// A failure inside the harvester. The detail is logged, not echoed.
    fn internal(error: CoreError) -> Self {
        error!(error = ?error, "Harvest failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });

        (self.status, body).into_response()
    }
}
