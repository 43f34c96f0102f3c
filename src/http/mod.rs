//! HTTP client capability used by the session and pipeline layers.
mod client;
mod reqwest_client;


pub use client::{HttpClient, HttpRequest, HttpResponse, TRANSPORT_ERROR_STATUS};
pub use reqwest_client::{HttpClientSettings, ReqwestClient};
