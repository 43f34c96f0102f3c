use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use tokio::time::{Instant, interval, sleep_until};
use tracing::info;

use crate::pipeline::PipelineContext;
use crate::session::Worker;
use crate::shutdown::ShutdownReceiver;

use super::worker::{IterationCounters, IterationSource, WorkerHandle, drain};
use super::{Phase, PhaseTracker, PlanKind, RunStats, SharedIterationsPlan};

/// Runs a fixed iteration budget across `vus` workers that all start at
/// once. Workers pull the next iteration from the shared budget, so fast
/// workers take more of it.
pub(super) async fn run_shared(
    plan: &SharedIterationsPlan,
    context: Arc<PipelineContext>,
    mut shutdown_rx: ShutdownReceiver,
    tick: Duration,
) -> RunStats {
    let counters = Arc::new(IterationCounters::default());
    let budget = IterationSource::Shared(Arc::new(AtomicU64::new(plan.iterations)));
    let mut phases = PhaseTracker::new(PlanKind::SharedIterations);
    let mut stats = RunStats::default();

    info!(
        "Shared-iterations plan: {} iterations across {} workers, at most {:?}",
        plan.iterations, plan.vus, plan.max_duration
    );

    let start = Instant::now();
    let handles: Vec<WorkerHandle> = (1..=plan.vus)
        .map(|index| WorkerHandle::spawn(Worker::new(index), &context, budget.clone(), &counters))
        .collect();
    stats.workers_spawned = plan.vus;
    phases.advance(Phase::Running, start.elapsed());

    let max_deadline = start.checked_add(plan.max_duration).unwrap_or(start);
    let mut ticker = interval(tick.max(Duration::from_millis(1)));
    let mut shutdown_open = true;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if handles.iter().all(WorkerHandle::is_finished) {
                    break;
                }
            }
            () = sleep_until(max_deadline) => {
                info!("Maximum duration {:?} reached", plan.max_duration);
                stats.max_duration_reached = true;
                break;
            }
            received = shutdown_rx.recv(), if shutdown_open => {
                match received {
                    Ok(reason) => {
                        info!("Stopping early: {}", reason);
                        stats.aborted_by = Some(reason);
                        break;
                    }
                    Err(_) => shutdown_open = false,
                }
            }
        }
    }

    phases.advance(Phase::Draining, start.elapsed());
    let now = Instant::now();
    let (_, hard_stopped) = drain(handles, now.checked_add(plan.graceful_stop).unwrap_or(now)).await;
    phases.advance(Phase::Terminated, start.elapsed());

    stats.hard_stopped = hard_stopped;
    stats.finish(&counters, start.elapsed(), phases);
    stats
}
