use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use gourmet_ai::error::AppError;
use gourmet_ai::resolver::raw::RawExtraction;
use gourmet_ai::resolver::{merge, Diagnostic};
use gourmet_ai::search::{SearchParams, Shop};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRequest {
    pub(crate) query: String,
    /// Client geolocation; forwarded to the search as-is.
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    #[serde(default)]
    pub(crate) range: Option<u8>,
    #[serde(default)]
    pub(crate) count: Option<u32>,
    #[serde(default)]
    pub(crate) start: Option<u32>,
    #[serde(default)]
    pub(crate) summarize: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    pub(crate) query: String,
    pub(crate) params: SearchParams,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Whether the original utterance was substituted as the keyword because
    /// nothing else resolved.
    pub(crate) keyword_fallback: bool,
    pub(crate) shops: Vec<Shop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveResponse {
    pub(crate) params: SearchParams,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

pub(crate) fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/search", axum::routing::post(search_endpoint))
        .route("/api/v1/resolve", axum::routing::post(resolve_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Full pipeline: extract entities from the free-form query, resolve them
/// against the taxonomy, search, optionally summarize. Extraction and search
/// failures are hard errors; an unresolvable query falls back to a plain
/// keyword search over the original text.
pub(crate) async fn search_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let (extraction, issues) = state.extractor.extract(&payload.query).await?;
    let resolution = merge(&extraction, &state.taxonomy);
    let mut params = resolution.params;

    let mut diagnostics: Vec<Diagnostic> = issues
        .into_iter()
        .map(|issue| Diagnostic::MalformedField {
            field: issue.field.to_string(),
        })
        .collect();
    diagnostics.extend(resolution.diagnostics);

    // The engine only reports that nothing resolved; substituting the user's
    // own words as the keyword is this handler's call.
    let keyword_fallback = diagnostics.contains(&Diagnostic::NothingResolved);
    if keyword_fallback {
        info!(query = %payload.query, "falling back to keyword search");
        params.keyword = Some(payload.query.clone());
    }

    if payload.lat.is_some() {
        params.lat = payload.lat;
    }
    if payload.lng.is_some() {
        params.lng = payload.lng;
    }
    if payload.range.is_some() {
        params.range = payload.range;
    }
    if payload.count.is_some() {
        params.count = payload.count;
    }
    if payload.start.is_some() {
        params.start = payload.start;
    }

    let shops = state.search.search(&params).await?;

    let summary = if payload.summarize {
        match &state.summarizer {
            Some(summarizer) => {
                match summarizer.summarize(&payload.query, &params, &shops).await {
                    Ok(text) => Some(text),
                    Err(err) => {
                        // Summaries are best-effort; the search result ships
                        // without one.
                        warn!(error = %err, "summarization failed, skipping");
                        None
                    }
                }
            }
            None => {
                warn!("summarization requested but no summarizer is configured");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(SearchResponse {
        query: payload.query,
        params,
        diagnostics,
        keyword_fallback,
        shops,
        summary,
    }))
}

/// Resolution only: accepts a raw extraction payload and returns the record
/// plus diagnostics, without touching any external service.
pub(crate) async fn resolve_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<ResolveResponse> {
    let (extraction, issues) = RawExtraction::from_value(&payload);
    let resolution = merge(&extraction, &state.taxonomy);

    let mut diagnostics: Vec<Diagnostic> = issues
        .into_iter()
        .map(|issue| Diagnostic::MalformedField {
            field: issue.field.to_string(),
        })
        .collect();
    diagnostics.extend(resolution.diagnostics);

    Json(ResolveResponse {
        params: resolution.params,
        diagnostics,
    })
}
