use gourmet_ai::extractor::EntityExtractor;
use gourmet_ai::search::RestaurantSearch;
use gourmet_ai::summary::ResultSummarizer;
use gourmet_ai::taxonomy::Taxonomy;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Shared state behind every route. The taxonomy is loaded once at startup
/// and never mutated afterwards, so handlers scan it without locking.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) taxonomy: Arc<Taxonomy>,
    pub(crate) extractor: Arc<dyn EntityExtractor>,
    pub(crate) search: Arc<dyn RestaurantSearch>,
    pub(crate) summarizer: Option<Arc<dyn ResultSummarizer>>,
}
