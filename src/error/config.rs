use std::path::PathBuf;
use thiserror::Error;

use super::ThresholdError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Unknown mode '{mode}'. Available: {available}.")]
    UnknownMode { mode: String, available: String },
    #[error("Unknown executor '{value}' in plan '{plan}'. Use 'ramping-vus' or 'shared-iterations'.")]
    UnknownExecutor { plan: String, value: String },
    #[error("Plan '{plan}' is missing '{field}'.")]
    MissingField { plan: String, field: &'static str },
    #[error("Plan '{plan}' field '{field}' must be >= 1.")]
    FieldMustBePositive { plan: String, field: &'static str },
    #[error("Plan '{plan}' must define at least one stage.")]
    PlanMissingStages { plan: String },
    #[error("Plan '{plan}' stage {index}: {message}")]
    InvalidStage {
        plan: String,
        index: usize,
        message: String,
    },
    #[error("Invalid duration for '{field}': {message}")]
    InvalidDuration { field: String, message: String },
    #[error("Base URL '{url}' is invalid: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid summary trend stat '{value}'.")]
    InvalidTrendStat { value: String },
    #[error("Invalid threshold for '{metric}': {source}")]
    InvalidThreshold {
        metric: String,
        #[source]
        source: ThresholdError,
    },
}
