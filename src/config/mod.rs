//! Configuration loading, built-in modes, and run validation.
mod build;
mod loader;
mod parse;
mod presets;
mod run;
pub mod types;

#[cfg(test)]
mod tests;

pub use build::{ModePlan, build_mode_plan, parse_trend_stats};
pub use loader::{load_config, load_config_file};
pub use presets::{BUILTIN_MODES, DEFAULT_MODE, builtin_plan};
pub use run::{RunConfig, available_modes, resolve_mode, resolve_run_config};

pub(crate) use parse::{parse_duration_value, parse_pause_value};
