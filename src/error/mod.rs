mod app;
mod config;
mod dataset;
mod http;
mod metrics;
mod session;
mod threshold;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dataset::DatasetError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use session::SessionError;
pub use threshold::ThresholdError;
