use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use gourmet_ai::config::AppConfig;
use gourmet_ai::error::AppError;
use gourmet_ai::extractor::OpenAiExtractor;
use gourmet_ai::search::HotPepperClient;
use gourmet_ai::summary::{OpenAiSummarizer, ResultSummarizer};
use gourmet_ai::taxonomy::{self, Taxonomy};
use gourmet_ai::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let taxonomy = load_taxonomy(&config);

    let extractor = OpenAiExtractor::from_settings(&config.openai)?;
    let search = HotPepperClient::from_settings(&config.hotpepper)?;
    // The summarizer shares the extractor's credentials; without them the
    // service still runs, it just never produces summaries.
    let summarizer: Option<Arc<dyn ResultSummarizer>> =
        match OpenAiSummarizer::from_settings(&config.openai) {
            Ok(summarizer) => Some(Arc::new(summarizer)),
            Err(err) => {
                warn!(error = %err, "summarizer unavailable");
                None
            }
        };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        taxonomy: Arc::new(taxonomy),
        extractor: Arc::new(extractor),
        search: Arc::new(search),
        summarizer,
    };

    let app = router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "gourmet search orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Taxonomy load failure is reported once and degrades to an empty taxonomy
/// so every request still answers, just without code resolution.
fn load_taxonomy(config: &AppConfig) -> Taxonomy {
    let loaded = match &config.taxonomy_path {
        Some(path) => taxonomy::load_from_path(path),
        None => taxonomy::load_default(),
    };

    match loaded {
        Ok(taxonomy) => taxonomy,
        Err(err) => {
            warn!(error = %err, "taxonomy unavailable, resolution will degrade");
            Taxonomy::empty()
        }
    }
}
