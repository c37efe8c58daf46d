use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEvaluationStore, JsonFileEvaluationStore};
use crate::routes::with_evaluation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eco_eval::config::{AppConfig, StoreBackend};
use eco_eval::error::AppError;
use eco_eval::evaluation::{
    CriteriaCatalog, EvaluationService, EvaluationServiceError, EvaluationStore,
};
use eco_eval::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(store) = args.store.take() {
        config.storage.backend = StoreBackend::parse(&store)?;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(CriteriaCatalog::standard()?);
    info!(questions = catalog.len(), "criteria catalog loaded");

    match config.storage.backend {
        StoreBackend::Memory => {
            serve(config, catalog, InMemoryEvaluationStore::default()).await
        }
        StoreBackend::File => {
            let store = JsonFileEvaluationStore::open(&config.storage.data_dir)
                .map_err(EvaluationServiceError::from)?;
            info!(data_dir = %config.storage.data_dir.display(), "file store opened");
            serve(config, catalog, store).await
        }
    }
}

async fn serve<S>(config: AppConfig, catalog: Arc<CriteriaCatalog>, store: S) -> Result<(), AppError>
where
    S: EvaluationStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(EvaluationService::new(catalog, Arc::new(store)));

    let app = with_evaluation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "eco-evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
