//! Core library for the `vuload` CLI.
//!
//! Virtual users (workers) repeat a login, product search and product
//! detail flow against an HTTP API while a scheduler follows a staged
//! concurrency plan. Every request feeds a shared metrics aggregator whose
//! series are judged against pass/fail thresholds when the run ends. The
//! primary interface is the `vuload` binary; library APIs may evolve with
//! it.
pub mod args;
pub mod config;
pub mod dataset;
pub mod entry;
pub mod error;
pub mod extract;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod summary;
pub mod thresholds;

#[cfg(test)]
mod test_support;
