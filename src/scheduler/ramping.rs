use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, interval};
use tracing::{debug, info};

use crate::pipeline::PipelineContext;
use crate::session::Worker;
use crate::shutdown::ShutdownReceiver;

use super::worker::{IterationCounters, IterationSource, WorkerHandle, drain};
use super::{Phase, PhaseTracker, PlanKind, RampController, RampingVusPlan, RunStats};

/// Worker pool of a ramping run.
///
/// Indices stay stable: a worker asked to leave keeps its index while it
/// finishes, and when the pool grows again the lowest free index is reused
/// together with the session it had.
struct Pool {
    context: Arc<PipelineContext>,
    counters: Arc<IterationCounters>,
    active: BTreeMap<u64, WorkerHandle>,
    stopping: Vec<(WorkerHandle, Instant)>,
    parked: BTreeMap<u64, Worker>,
    lost: BTreeSet<u64>,
    next_index: u64,
    spawned: u64,
    hard_stopped: u64,
}

impl Pool {
    fn new(context: Arc<PipelineContext>, counters: Arc<IterationCounters>) -> Self {
        Self {
            context,
            counters,
            active: BTreeMap::new(),
            stopping: Vec::new(),
            parked: BTreeMap::new(),
            lost: BTreeSet::new(),
            next_index: 1,
            spawned: 0,
            hard_stopped: 0,
        }
    }

    fn active_count(&self) -> u64 {
        u64::try_from(self.active.len()).unwrap_or(u64::MAX)
    }

    /// Lowest index not held by a running or stopping worker.
    fn next_worker(&mut self) -> Worker {
        let parked = self.parked.first_key_value().map(|(index, _)| *index);
        let lost = self.lost.first().copied();
        match (parked, lost) {
            (Some(parked_index), Some(lost_index)) if lost_index < parked_index => {
                self.lost.remove(&lost_index);
                Worker::new(lost_index)
            }
            (Some(_), _) => match self.parked.pop_first() {
                Some((_, worker)) => worker,
                None => self.fresh_worker(),
            },
            (None, Some(lost_index)) => {
                self.lost.remove(&lost_index);
                Worker::new(lost_index)
            }
            (None, None) => self.fresh_worker(),
        }
    }

    fn fresh_worker(&mut self) -> Worker {
        let worker = Worker::new(self.next_index);
        self.next_index = self.next_index.saturating_add(1);
        worker
    }

    /// Reaps stopping workers: finished ones are parked, overdue ones are
    /// aborted and their index is handed out fresh next time.
    async fn reap(&mut self, now: Instant) {
        let mut still_stopping = Vec::with_capacity(self.stopping.len());
        for (handle, deadline) in std::mem::take(&mut self.stopping) {
            if handle.is_finished() || deadline <= now {
                let index = handle.index();
                match handle.finish_by(deadline).await {
                    Some(worker) => {
                        self.parked.insert(index, worker);
                    }
                    None => {
                        self.hard_stopped = self.hard_stopped.saturating_add(1);
                        self.lost.insert(index);
                    }
                }
            } else {
                still_stopping.push((handle, deadline));
            }
        }
        self.stopping = still_stopping;
    }

    fn scale_to(&mut self, target: u64, graceful_ramp_down: Duration, now: Instant) {
        while self.active_count() < target {
            let worker = self.next_worker();
            let handle = WorkerHandle::spawn(
                worker,
                &self.context,
                IterationSource::Unbounded,
                &self.counters,
            );
            self.spawned = self.spawned.saturating_add(1);
            self.active.insert(handle.index(), handle);
        }
        let deadline = now.checked_add(graceful_ramp_down).unwrap_or(now);
        while self.active_count() > target {
            let Some((index, handle)) = self.active.pop_last() else {
                break;
            };
            debug!("Ramping down worker {}", index);
            handle.request_stop();
            self.stopping.push((handle, deadline));
        }
    }

    /// Stops everything. Workers already ramping down keep their earlier
    /// deadline when it comes first.
    async fn shut_down(self, graceful_stop: Duration) -> (u64, u64) {
        let now = Instant::now();
        let stop_deadline = now.checked_add(graceful_stop).unwrap_or(now);
        let mut hard_stopped = self.hard_stopped;

        let (_, active_hard) = drain(self.active.into_values().collect(), stop_deadline).await;
        hard_stopped = hard_stopped.saturating_add(active_hard);
        for (handle, deadline) in self.stopping {
            if handle.finish_by(deadline.min(stop_deadline)).await.is_none() {
                hard_stopped = hard_stopped.saturating_add(1);
            }
        }
        (self.spawned, hard_stopped)
    }
}

pub(super) async fn run_ramping(
    plan: &RampingVusPlan,
    context: Arc<PipelineContext>,
    mut shutdown_rx: ShutdownReceiver,
    tick: Duration,
) -> RunStats {
    let controller = RampController::new(plan.start_vus, plan.stages.clone());
    let total = controller.total_duration();
    let counters = Arc::new(IterationCounters::default());
    let mut pool = Pool::new(context, Arc::clone(&counters));
    let mut phases = PhaseTracker::new(PlanKind::RampingVus);
    let mut stats = RunStats::default();

    info!(
        "Ramping plan: {} stages over {:?}, up to {} workers",
        plan.stages.len(),
        total,
        plan.stages
            .iter()
            .map(|stage| stage.target)
            .fold(plan.start_vus, u64::max)
    );

    let start = Instant::now();
    let mut ticker = interval(tick.max(Duration::from_millis(1)));
    let mut shutdown_open = true;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            received = shutdown_rx.recv(), if shutdown_open => {
                match received {
                    Ok(reason) => {
                        info!("Stopping early: {}", reason);
                        stats.aborted_by = Some(reason);
                        break;
                    }
                    Err(_) => shutdown_open = false,
                }
                continue;
            }
        }

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= total {
            break;
        }
        phases.advance(controller.phase_at(elapsed), elapsed);
        pool.reap(now).await;
        pool.scale_to(
            controller.target_at(elapsed),
            plan.graceful_ramp_down,
            now,
        );
    }

    phases.advance(Phase::Draining, start.elapsed());
    let (spawned, hard_stopped) = pool.shut_down(plan.graceful_stop).await;
    phases.advance(Phase::Terminated, start.elapsed());

    stats.workers_spawned = spawned;
    stats.hard_stopped = hard_stopped;
    stats.finish(&counters, start.elapsed(), phases);
    stats
}
