use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::pipeline::{PipelineContext, run_iteration};
use crate::session::Worker;

/// Where a worker gets permission for its next iteration.
#[derive(Debug, Clone)]
pub(super) enum IterationSource {
    /// Iterate until told to stop.
    Unbounded,
    /// Pull from a shared budget until it is exhausted.
    Shared(Arc<AtomicU64>),
}

impl IterationSource {
    fn claim(&self) -> bool {
        match self {
            IterationSource::Unbounded => true,
            IterationSource::Shared(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                    left.checked_sub(1)
                })
                .is_ok(),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct IterationCounters {
    pub(super) started: AtomicU64,
    pub(super) completed: AtomicU64,
}

/// A spawned worker task. The task hands its [`Worker`] back when it ends
/// so the session can be reused.
pub(super) struct WorkerHandle {
    index: u64,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Worker>,
}

impl WorkerHandle {
    pub(super) fn spawn(
        worker: Worker,
        context: &Arc<PipelineContext>,
        source: IterationSource,
        counters: &Arc<IterationCounters>,
    ) -> Self {
        let index = worker.index();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(worker_loop(
            worker,
            Arc::clone(context),
            stop_rx,
            source,
            Arc::clone(counters),
        ));
        debug!("Spawned worker {}", index);
        Self {
            index,
            stop_tx,
            task,
        }
    }

    pub(super) const fn index(&self) -> u64 {
        self.index
    }

    /// Asks the worker to leave after its current iteration.
    pub(super) fn request_stop(&self) {
        drop(self.stop_tx.send(true));
    }

    pub(super) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the worker until `deadline`, aborting it past that point.
    /// Returns the worker when it left on its own.
    pub(super) async fn finish_by(self, deadline: Instant) -> Option<Worker> {
        let index = self.index;
        let mut task = self.task;
        match timeout_at(deadline, &mut task).await {
            Ok(Ok(worker)) => Some(worker),
            Ok(Err(err)) => {
                warn!("Worker {} ended abnormally: {}", index, err);
                None
            }
            Err(_) => {
                task.abort();
                warn!("Worker {} did not finish in time; stopped hard", index);
                None
            }
        }
    }
}

async fn worker_loop(
    mut worker: Worker,
    context: Arc<PipelineContext>,
    stop_rx: watch::Receiver<bool>,
    source: IterationSource,
    counters: Arc<IterationCounters>,
) -> Worker {
    while !*stop_rx.borrow() && source.claim() {
        counters.started.fetch_add(1, Ordering::Relaxed);
        run_iteration(&mut worker, &context).await;
        counters.completed.fetch_add(1, Ordering::Relaxed);
    }
    debug!(
        "Worker {} leaving after {} iterations",
        worker.index(),
        worker.iteration_count()
    );
    worker
}

/// Signals every handle, then waits for all of them until `deadline`.
/// Returns the workers that left on their own and the hard-stop count.
pub(super) async fn drain(handles: Vec<WorkerHandle>, deadline: Instant) -> (Vec<Worker>, u64) {
    for handle in &handles {
        handle.request_stop();
    }
    let outcomes = join_all(handles.into_iter().map(|handle| handle.finish_by(deadline))).await;
    let mut finished = Vec::with_capacity(outcomes.len());
    let mut hard_stopped: u64 = 0;
    for outcome in outcomes {
        match outcome {
            Some(worker) => finished.push(worker),
            None => hard_stopped = hard_stopped.saturating_add(1),
        }
    }
    (finished, hard_stopped)
}
