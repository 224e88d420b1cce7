//! HTTP routes over a shared [`CoverageChecker`].
//!
//! The checker is synchronous, so every check runs on Tokio's blocking pool
//! and request handlers only await its completion.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use coverage_core::{CheckResult, CoverageChecker, CoverageSource, GeoLookup};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::task::{self, JoinError};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "UK Mobile Coverage API";

/// Largest batch accepted by the bulk endpoint.
pub const MAX_BULK_POSTCODES: usize = 50;

/// Shared handler state.
pub struct AppState<G, S> {
    checker: Arc<CoverageChecker<G, S>>,
}

impl<G, S> Clone for AppState<G, S> {
    fn clone(&self) -> Self {
        Self {
            checker: Arc::clone(&self.checker),
        }
    }
}

/// Build the router serving health, single and bulk checks.
pub fn build_app<G, S>(checker: Arc<CoverageChecker<G, S>>) -> Router
where
    G: GeoLookup + Send + Sync + 'static,
    S: CoverageSource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/mobile/", get(missing_postcode))
        .route("/api/mobile/bulk", post(check_bulk::<G, S>))
        .route("/api/mobile/{postcode}", get(check_one::<G, S>))
        .with_state(AppState { checker })
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ResultBody {
    status: &'static str,
    result: CheckResult,
}

#[derive(Debug, Serialize)]
struct ResultsBody {
    status: &'static str,
    results: Vec<CheckResult>,
}

#[derive(Debug, Deserialize)]
struct BulkRequest {
    #[serde(default)]
    postcodes: Vec<String>,
}

/// Error response carrying an HTTP status and a message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn from_join(error: &JoinError) -> Self {
        warn!("coverage check task failed: {error}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        service: SERVICE_NAME,
    })
}

async fn missing_postcode() -> ApiError {
    ApiError::bad_request("postcode required")
}

async fn check_one<G, S>(
    State(state): State<AppState<G, S>>,
    Path(postcode): Path<String>,
) -> Result<Json<ResultBody>, ApiError>
where
    G: GeoLookup + Send + Sync + 'static,
    S: CoverageSource + Send + Sync + 'static,
{
    let checker = Arc::clone(&state.checker);
    let result = task::spawn_blocking(move || checker.check(&postcode))
        .await
        .map_err(|error| ApiError::from_join(&error))?;
    if let Some(message) = &result.error {
        return Err(ApiError::new(StatusCode::NOT_FOUND, message.clone()));
    }
    Ok(Json(ResultBody {
        status: "ok",
        result,
    }))
}

async fn check_bulk<G, S>(
    State(state): State<AppState<G, S>>,
    body: Result<Json<BulkRequest>, JsonRejection>,
) -> Result<Json<ResultsBody>, ApiError>
where
    G: GeoLookup + Send + Sync + 'static,
    S: CoverageSource + Send + Sync + 'static,
{
    let Json(request) = body.map_err(|rejection| {
        debug!("rejected bulk request body: {rejection}");
        ApiError::bad_request("invalid JSON body")
    })?;
    if request.postcodes.is_empty() || request.postcodes.len() > MAX_BULK_POSTCODES {
        return Err(ApiError::bad_request(format!(
            "provide between 1 and {MAX_BULK_POSTCODES} postcodes"
        )));
    }

    let checker = Arc::clone(&state.checker);
    let results = task::spawn_blocking(move || checker.check_multiple(&request.postcodes))
        .await
        .map_err(|error| ApiError::from_join(&error))?;
    Ok(Json(ResultsBody {
        status: "ok",
        results,
    }))
}
