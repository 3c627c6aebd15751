//! HTTP API for the data source, health checks and Prometheus metrics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use oplang_lib::{
    health::components, AnnotationQuery, ComponentStatus, DataSource, DataSourceError,
    DataSourceHealth, Event, HealthRegistry, MetricFindValue, QueryRequest, QueryResponse,
    ScopedVars, Symbol, VariableQuery,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub datasource: Arc<DataSource>,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(datasource: Arc<DataSource>, health_registry: HealthRegistry) -> Self {
        Self {
            datasource,
            health_registry,
        }
    }
}

/// Data source failure as an HTTP response: 400 for bad input, 502 otherwise
pub struct ApiError(DataSourceError);

impl From<DataSourceError> for ApiError {
    fn from(err: DataSourceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub scoped_vars: Option<ScopedVars>,
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    Ok(Json(state.datasource.query(&request).await?))
}

async fn variables(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VariableRequest>,
) -> Result<Json<Vec<MetricFindValue>>, ApiError> {
    let values = state
        .datasource
        .metric_find_query(&VariableQuery::new(request.query), request.scoped_vars.as_ref())
        .await?;
    Ok(Json(values))
}

async fn annotations(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnnotationQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.datasource.annotation_query(&request).await?))
}

async fn symbols(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Symbol>>, ApiError> {
    Ok(Json(state.datasource.get_symbols(&kind).await?))
}

/// Run the connectivity check and record it against the backend component
///
/// Transport failures become an error status rather than a failed request.
pub async fn check_backend(state: &AppState) -> DataSourceHealth {
    let health = match state.datasource.test_datasource().await {
        Ok(health) => health,
        Err(err) => DataSourceHealth::error(err.to_string()),
    };
    state
        .health_registry
        .record_check(components::BACKEND, &health)
        .await;
    health
}

async fn datasource_health(State(state): State<Arc<AppState>>) -> Json<DataSourceHealth> {
    Json(check_backend(&state).await)
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %err, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/query", post(query))
        .route("/api/variables", post(variables))
        .route("/api/annotations", post(annotations))
        .route("/api/health", get(datasource_health))
        .route("/api/symbols/:kind", get(symbols))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
