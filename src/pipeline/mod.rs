//! The fixed login → search → detail iteration.
mod endpoints;
mod search;


use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::dataset::Dataset;
use crate::http::{HttpClient, HttpRequest};
use crate::metrics::{Group, MetricsAggregator, StepOutcome};
use crate::session::{Token, Worker, acquire_token};

pub use endpoints::Endpoints;
pub use search::{PRODUCT_LIST_STRATEGIES, select_product_id};

/// Everything an iteration reads. Shared by all workers of a run.
#[derive(Clone)]
pub struct PipelineContext {
    pub client: Arc<dyn HttpClient>,
    pub endpoints: Endpoints,
    pub users: Dataset,
    pub products: Dataset,
    pub metrics: Arc<MetricsAggregator>,
    pub pacing: Duration,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("endpoints", &self.endpoints)
            .field("users", &self.users.record_count())
            .field("products", &self.products.record_count())
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

/// What one iteration did. `search` and `detail` are `None` when the step
/// never ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationResult {
    pub login: StepOutcome,
    pub search: Option<StepOutcome>,
    pub detail: Option<StepOutcome>,
    pub product_id: Option<String>,
}

impl IterationResult {
    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.outcomes().count()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &StepOutcome> {
        std::iter::once(&self.login)
            .chain(self.search.as_ref())
            .chain(self.detail.as_ref())
    }

    /// True when all three steps ran and passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.detail.is_some() && self.outcomes().all(|outcome| outcome.passed)
    }
}

/// Runs one iteration for `worker`, then applies the pacing pause.
///
/// Failures never escape: a failed login ends the iteration after the login
/// step, and a search without a usable product skips the detail step.
pub async fn run_iteration(worker: &mut Worker, context: &PipelineContext) -> IterationResult {
    let iteration_start = Instant::now();

    let step_start = Instant::now();
    let token = match acquire_token(worker, context).await {
        Ok(token) => Some(token),
        Err(err) => {
            debug!("{}", err);
            None
        }
    };
    let login = emit(
        context,
        StepOutcome {
            group: Group::Login,
            check: "token cached",
            passed: token.is_some(),
            elapsed: step_start.elapsed(),
        },
    );
    let mut result = IterationResult {
        login,
        search: None,
        detail: None,
        product_id: None,
    };

    if let Some(token) = token {
        let step_start = Instant::now();
        let product_id = search_step(worker, context, &token).await;
        result.search = Some(emit(
            context,
            StepOutcome {
                group: Group::Search,
                check: "have product id",
                passed: product_id.is_some(),
                elapsed: step_start.elapsed(),
            },
        ));

        if let Some(product_id) = product_id {
            let step_start = Instant::now();
            let passed = detail_step(context, &token, &product_id).await;
            result.detail = Some(emit(
                context,
                StepOutcome {
                    group: Group::Detail,
                    check: "detail 200",
                    passed,
                    elapsed: step_start.elapsed(),
                },
            ));
            result.product_id = Some(product_id);
        }
    }

    if !context.pacing.is_zero() {
        sleep(context.pacing).await;
    }
    worker.complete_iteration();
    context.metrics.record_iteration(iteration_start.elapsed());
    result
}

fn emit(context: &PipelineContext, outcome: StepOutcome) -> StepOutcome {
    context.metrics.record_step(&outcome);
    outcome
}

fn authorized(request: HttpRequest, token: &Token) -> HttpRequest {
    request
        .header("Authorization", token.bearer())
        .header("Accept", "application/json")
}

async fn search_step(worker: &Worker, context: &PipelineContext, token: &Token) -> Option<String> {
    let product = context
        .products
        .get(worker.product_index())
        .and_then(|record| record.value_at(0))?;

    let request = authorized(HttpRequest::get(context.endpoints.search(product)), token);
    let response = context.client.request(request).await;
    context
        .metrics
        .record_request(Group::Search, response.status, response.elapsed);
    context
        .metrics
        .record_check(Group::Search, "search 200", response.status == 200);

    let product_id = select_product_id(&response.body, product);
    if product_id.is_none() {
        debug!(
            "Worker {} found no product for '{}' (status {})",
            worker.index(),
            product,
            response.status
        );
    }
    product_id
}

async fn detail_step(context: &PipelineContext, token: &Token, product_id: &str) -> bool {
    let request = authorized(HttpRequest::get(context.endpoints.detail(product_id)), token);
    let response = context.client.request(request).await;
    context
        .metrics
        .record_request(Group::Detail, response.status, response.elapsed);
    response.status == 200
}
