//! HTTP REST API.
//!
//! Two endpoints: `/health` for liveness and `/rent` which runs one
//! discovery request per call against the shared [`Discoverer`].

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rentscout::{DiscoveryError, DiscoveryReport, Discoverer, RentTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::output::origin_label;

pub struct AppState {
    pub discoverer: Arc<Discoverer>,
}

impl AppState {
    pub fn new(discoverer: Discoverer) -> Self {
        Self {
            discoverer: Arc::new(discoverer),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/rent", get(handle_rent))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RentParams {
    pub society: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingEntry {
    pub bhk: String,
    pub rent: u64,
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RentResponse {
    pub society: String,
    pub city: String,
    pub rents: RentTable,
    pub listings: Vec<ListingEntry>,
    pub origin: String,
}

impl From<DiscoveryReport> for RentResponse {
    fn from(report: DiscoveryReport) -> Self {
        let rents = report.rents();
        let origin = origin_label(&report.origin).to_string();
        let listings = report
            .best
            .into_iter()
            .map(|(bhk, best)| ListingEntry {
                bhk,
                rent: best.rent,
                link: best.source_url,
            })
            .collect();
        Self {
            society: report.query.society_name,
            city: report.query.city,
            rents,
            listings,
            origin,
        }
    }
}

/// Error body: `{"error": {"code", "message"}}`.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "E_INVALID_INPUT",
            message: message.into(),
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::InvalidInput { .. } => Self::invalid_input(e.to_string()),
            DiscoveryError::Config(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "E_INTERNAL",
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": { "code": self.code, "message": self.message }
        });
        (self.status, Json(body)).into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_rent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RentParams>,
) -> Result<Json<RentResponse>, ApiError> {
    let society = params
        .society
        .ok_or_else(|| ApiError::invalid_input("missing query parameter: society"))?;
    let city = params
        .city
        .ok_or_else(|| ApiError::invalid_input("missing query parameter: city"))?;

    tracing::info!("GET /rent society={society:?} city={city:?}");
    let report = state.discoverer.discover_report(&society, &city).await?;
    Ok(Json(RentResponse::from(report)))
}
