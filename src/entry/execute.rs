use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::dataset::{CREDENTIAL_FIELDS, PRODUCT_FIELDS, load_dataset_file};
use crate::error::{AppError, AppResult};
use crate::http::ReqwestClient;
use crate::metrics::MetricsAggregator;
use crate::pipeline::{Endpoints, PipelineContext};
use crate::scheduler::{DEFAULT_TICK, run_plan};
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};
use crate::summary::{RunSummary, export_json, print_summary};
use crate::thresholds::spawn_breach_monitor;

pub(super) async fn run_load_test(config: &RunConfig) -> AppResult<()> {
    let users = load_dataset_file("users", &config.users_path, &CREDENTIAL_FIELDS)?;
    let products = load_dataset_file("products", &config.products_path, &PRODUCT_FIELDS)?;
    let endpoints = Endpoints::new(&config.base_url)?;
    let client = ReqwestClient::new(&config.http)?;
    let metrics = Arc::new(MetricsAggregator::new(config.trend_stats.clone()));

    info!(
        "Running mode '{}' against {} ({} users, {} products, up to {} workers, at most {:?})",
        config.mode.name,
        config.base_url,
        users.record_count(),
        products.record_count(),
        config.mode.plan.max_vus(),
        config.mode.plan.max_duration()
    );
    debug!("Plan: {:?}", config.mode.plan);

    let context = Arc::new(PipelineContext {
        client: Arc::new(client),
        endpoints,
        users,
        products,
        metrics: Arc::clone(&metrics),
        pacing: config.pacing,
    });

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let thresholds = Arc::new(config.mode.thresholds.clone());
    let monitor = spawn_breach_monitor(
        Arc::clone(&thresholds),
        Arc::clone(&metrics),
        config.abort_on_breach,
        config.evaluation_interval,
        &shutdown_tx,
    );

    let stats = run_plan(&config.mode.plan, context, shutdown_rx, DEFAULT_TICK).await;
    signal_handle.abort();
    if let Some(monitor) = monitor {
        monitor.abort();
    }
    if let Some(reason) = stats.aborted_by {
        warn!("Run stopped early: {}", reason);
    }

    let verdict = thresholds.evaluate(&metrics);
    let summary = RunSummary::collect(
        &config.mode,
        &config.base_url,
        &stats,
        &verdict,
        &metrics,
    );
    print_summary(&summary);
    if let Some(path) = config.summary_export.as_deref() {
        export_json(path, &summary).await?;
    }

    if verdict.passed {
        Ok(())
    } else {
        Err(AppError::ThresholdsBreached {
            failed: verdict.failed(),
            total: verdict.total(),
        })
    }
}
