use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use tracing::debug;

use crate::error::HttpError;

use super::{HttpClient, HttpRequest, HttpResponse};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("vuload/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub no_ua: bool,
    pub insecure: bool,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            no_ua: false,
            insecure: false,
        }
    }
}

/// [`HttpClient`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Builds the shared client.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be constructed.
    pub fn new(settings: &HttpClientSettings) -> Result<Self, HttpError> {
        let mut builder = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout);
        if !settings.no_ua {
            builder = builder.user_agent(DEFAULT_USER_AGENT);
        }
        if settings.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(&self, request: HttpRequest) -> HttpResponse {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let start = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("{} {} failed: {}", method, url, err);
                return HttpResponse::transport_error(start.elapsed());
            }
        };
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!("{} {} body read failed: {}", method, url, err);
                String::new()
            }
        };
        HttpResponse {
            status,
            body,
            elapsed: start.elapsed(),
        }
    }
}
