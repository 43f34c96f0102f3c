use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;
use url::Url;

use crate::args::VuloadArgs;
use crate::error::ConfigError;
use crate::http::HttpClientSettings;
use crate::metrics::{Stat, default_trend_stats};

use super::build::{ModePlan, build_mode_plan, parse_trend_stats};
use super::presets::{BUILTIN_MODES, builtin_plan};
use super::types::{ConfigFile, DurationValue};

/// Everything a run needs, validated before any worker starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: ModePlan,
    pub base_url: String,
    pub users_path: PathBuf,
    pub products_path: PathBuf,
    pub pacing: Duration,
    pub http: HttpClientSettings,
    pub abort_on_breach: bool,
    pub evaluation_interval: Duration,
    pub summary_export: Option<PathBuf>,
    pub trend_stats: Vec<Stat>,
    pub verbose: bool,
    pub no_color: bool,
}

/// Built-in modes plus plans defined in `config`, sorted and deduplicated.
#[must_use]
pub fn available_modes(config: Option<&ConfigFile>) -> Vec<String> {
    let mut modes: BTreeSet<String> = BUILTIN_MODES.iter().map(|mode| (*mode).to_owned()).collect();
    if let Some(plans) = config.and_then(|config| config.plans.as_ref()) {
        modes.extend(plans.keys().cloned());
    }
    modes.into_iter().collect()
}

/// Looks up `name` among the built-in modes and the config plans. A config
/// plan named like a built-in mode overrides it field by field.
///
/// # Errors
///
/// Returns an error when the mode is unknown or its definition is invalid.
pub fn resolve_mode(name: &str, config: Option<&ConfigFile>) -> Result<ModePlan, ConfigError> {
    let name = name.trim();
    let builtin = builtin_plan(name);
    let configured = config
        .and_then(|config| config.plans.as_ref())
        .and_then(|plans| plans.get(name))
        .cloned();
    let plan = match (configured, builtin) {
        (Some(configured), Some(builtin)) => configured.merged_over(builtin),
        (Some(plan), None) | (None, Some(plan)) => plan,
        (None, None) => {
            return Err(ConfigError::UnknownMode {
                mode: name.to_owned(),
                available: available_modes(config).join(", "),
            });
        }
    };
    build_mode_plan(name, plan)
}

/// CLI flags and environment variables beat the config file, which beats
/// the CLI defaults.
fn is_explicit(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn pick<T>(matches: &ArgMatches, id: &str, cli: T, file: Option<T>) -> T {
    if is_explicit(matches, id) {
        cli
    } else {
        file.unwrap_or(cli)
    }
}

fn pick_duration(
    matches: &ArgMatches,
    id: &str,
    cli: Duration,
    file: Option<&DurationValue>,
    allow_zero: bool,
) -> Result<Duration, ConfigError> {
    if is_explicit(matches, id) {
        return Ok(cli);
    }
    let Some(value) = file else {
        return Ok(cli);
    };
    let parsed = if allow_zero {
        value.to_pause()
    } else {
        value.to_duration()
    };
    parsed.map_err(|message| ConfigError::InvalidDuration {
        field: id.to_owned(),
        message,
    })
}

/// Merges parsed CLI arguments with an optional config file and validates
/// the result.
///
/// # Errors
///
/// Returns an error for an unknown mode, an invalid plan or threshold, an
/// unparseable base URL, duration, or trend statistic.
pub fn resolve_run_config(
    args: &VuloadArgs,
    matches: &ArgMatches,
    config: Option<&ConfigFile>,
) -> Result<RunConfig, ConfigError> {
    let file = config.cloned().unwrap_or_default();

    let mode_name = pick(matches, "mode", args.mode.clone(), file.mode.clone());
    let mode = resolve_mode(&mode_name, config)?;

    let base_url = pick(matches, "base_url", args.base_url.clone(), file.base_url.clone());
    let base_url = base_url.trim().to_owned();
    Url::parse(&base_url).map_err(|err| ConfigError::InvalidBaseUrl {
        url: base_url.clone(),
        source: err,
    })?;

    let trend_stats = if !args.summary_trend_stats.is_empty() {
        args.summary_trend_stats.clone()
    } else if let Some(values) = file.summary_trend_stats.as_deref() {
        parse_trend_stats(values)?
    } else {
        default_trend_stats()
    };

    let summary_export = if args.summary_export.is_some() {
        args.summary_export.clone()
    } else {
        file.summary_export.clone()
    };

    Ok(RunConfig {
        mode,
        base_url,
        users_path: PathBuf::from(pick(matches, "users", args.users.clone(), file.users.clone())),
        products_path: PathBuf::from(pick(
            matches,
            "products",
            args.products.clone(),
            file.products.clone(),
        )),
        pacing: pick_duration(matches, "pacing", args.pacing, file.pacing.as_ref(), true)?,
        http: HttpClientSettings {
            request_timeout: pick_duration(
                matches,
                "request_timeout",
                args.request_timeout,
                file.request_timeout.as_ref(),
                false,
            )?,
            connect_timeout: pick_duration(
                matches,
                "connect_timeout",
                args.connect_timeout,
                file.connect_timeout.as_ref(),
                false,
            )?,
            no_ua: args.no_ua || file.no_ua.unwrap_or(false),
            insecure: args.insecure || file.insecure.unwrap_or(false),
        },
        abort_on_breach: args.abort_on_breach || file.abort_on_breach.unwrap_or(false),
        evaluation_interval: pick_duration(
            matches,
            "evaluation_interval",
            args.evaluation_interval,
            file.evaluation_interval.as_ref(),
            false,
        )?,
        summary_export: summary_export.map(PathBuf::from),
        trend_stats,
        verbose: args.verbose,
        no_color: args.no_color || file.no_color.unwrap_or(false),
    })
}
