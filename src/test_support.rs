//! Fixtures shared by the in-crate test modules.
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::dataset::{CREDENTIAL_FIELDS, PRODUCT_FIELDS, load_dataset};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::metrics::MetricsAggregator;
use crate::pipeline::{Endpoints, PipelineContext};

pub(crate) const BASE_URL: &str = "http://shop.test";

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Like [`run_async_test`], but on a runtime whose clock starts paused and
/// jumps straight to the next timer when every task is idle.
pub(crate) fn run_paused_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

pub(crate) fn reply(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_owned(),
        elapsed: Duration::from_millis(2),
    }
}

type Responder = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// In-memory [`HttpClient`] answering from a closure and keeping every
/// request it saw, including ones still waiting out the delay.
pub(crate) struct ScriptedClient {
    respond: Responder,
    delay: Duration,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(
        respond: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Happy-path shop: every login succeeds, every search lists two
    /// products, every detail call succeeds.
    pub(crate) fn shop() -> Self {
        Self::new(|request| {
            if request.url.contains("/users/login") {
                reply(200, r#"{"access_token":"tok-1"}"#)
            } else if request.url.contains("/products/search") {
                reply(
                    200,
                    r#"{"data":[{"id":7,"name":"Pliers"},{"id":"h-1","name":"Hammer"}]}"#,
                )
            } else {
                reply(200, r#"{"id":7}"#)
            }
        })
    }

    pub(crate) const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn count_matching(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn request(&self, request: HttpRequest) -> HttpResponse {
        let response = (self.respond)(&request);
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        response
    }
}

/// Pipeline context over in-memory datasets with no pacing pause.
pub(crate) fn context(
    client: Arc<ScriptedClient>,
    users_csv: &str,
    products_csv: &str,
) -> Result<PipelineContext, String> {
    let users = load_dataset("users", users_csv.as_bytes(), &CREDENTIAL_FIELDS)
        .map_err(|err| err.to_string())?;
    let products = load_dataset("products", products_csv.as_bytes(), &PRODUCT_FIELDS)
        .map_err(|err| err.to_string())?;
    Ok(PipelineContext {
        client,
        endpoints: Endpoints::new(BASE_URL).map_err(|err| err.to_string())?,
        users,
        products,
        metrics: Arc::new(MetricsAggregator::default()),
        pacing: Duration::ZERO,
    })
}

pub(crate) const TWO_USERS: &str = "email,password\na@x.io,pw-a\nb@x.io,pw-b\n";
pub(crate) const THREE_PRODUCTS: &str = "Name\nHammer\nPliers\nSaw\n";
