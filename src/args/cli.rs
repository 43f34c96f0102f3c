use clap::Parser;
use std::time::Duration;

use crate::config::DEFAULT_MODE;
use crate::metrics::Stat;

use super::defaults::{DEFAULT_BASE_URL, DEFAULT_PRODUCTS_PATH, DEFAULT_USERS_PATH};
use super::parsers::{parse_duration_arg, parse_pause_arg, parse_trend_stat};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Virtual-user load tester for a login -> search -> product detail API flow, with staged concurrency plans and pass/fail thresholds."
)]
pub struct VuloadArgs {
    /// Test mode: load, stress, spike, volume, or a plan defined in the config file
    #[arg(long, short = 'm', env = "MODE", default_value = DEFAULT_MODE)]
    pub mode: String,

    /// Base URL of the service under test
    #[arg(long = "base-url", short = 'u', env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path to config file (TOML or JSON); defaults to ./vuload.toml or ./vuload.json
    #[arg(long, short = 'c', env = "VULOAD_CONFIG")]
    pub config: Option<String>,

    /// Credentials CSV (header: email,password; ',' or ';' delimited)
    #[arg(long, default_value = DEFAULT_USERS_PATH)]
    pub users: String,

    /// Product names CSV (names read from the first column)
    #[arg(long, default_value = DEFAULT_PRODUCTS_PATH)]
    pub products: String,

    /// Pause after every iteration (supports ms/s/m/h; 0 disables)
    #[arg(long, default_value = "1s", value_parser = parse_pause_arg)]
    pub pacing: Duration,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "60s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Disable the default User-Agent header
    #[arg(long = "no-ua")]
    pub no_ua: bool,

    /// Accept invalid TLS certificates and hostnames
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// Stop the run early as soon as any threshold is breached
    #[arg(long = "abort-on-breach")]
    pub abort_on_breach: bool,

    /// How often thresholds are re-checked while the run is in progress
    #[arg(long = "evaluation-interval", default_value = "1s", value_parser = parse_duration_arg)]
    pub evaluation_interval: Duration,

    /// Write the end-of-run summary as JSON to this path
    #[arg(long = "summary-export")]
    pub summary_export: Option<String>,

    /// Trend columns in the summary, comma separated (e.g. avg,p(95),p(99.9))
    #[arg(long = "summary-trend-stats", value_delimiter = ',', value_parser = parse_trend_stat)]
    pub summary_trend_stats: Vec<Stat>,

    /// Print the available modes and exit
    #[arg(long = "list-modes")]
    pub list_modes: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by VULOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
