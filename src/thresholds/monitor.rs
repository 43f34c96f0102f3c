use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::metrics::MetricsAggregator;
use crate::shutdown::{ShutdownSender, StopReason};

use super::ThresholdSet;

/// Re-evaluates `thresholds` every `every` and requests a graceful stop on
/// the first breach of an abortable threshold. With `abort_all` every
/// threshold is abortable.
///
/// Returns `None` when no threshold can abort the run.
pub fn spawn_breach_monitor(
    thresholds: Arc<ThresholdSet>,
    metrics: Arc<MetricsAggregator>,
    abort_all: bool,
    every: Duration,
    shutdown_tx: &ShutdownSender,
) -> Option<JoinHandle<()>> {
    if thresholds.is_empty() || !(abort_all || thresholds.any_abortable()) {
        return None;
    }
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    Some(tokio::spawn(async move {
        let mut ticker = interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first
        // evaluation sees a full interval of samples.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Threshold monitor stopping");
                    return;
                }
                _ = ticker.tick() => {}
            }
            let verdict = thresholds.evaluate(&metrics);
            if let Some(breach) = verdict.abortable_breach(abort_all) {
                warn!(
                    "Threshold {} {} breached; stopping the run",
                    breach.key, breach.expression
                );
                drop(shutdown_tx.send(StopReason::ThresholdBreached));
                return;
            }
        }
    }))
}
