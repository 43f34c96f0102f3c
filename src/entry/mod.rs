mod execute;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::VuloadArgs;
use crate::config::{available_modes, load_config, resolve_run_config};
use crate::error::AppResult;

/// Parses the command line, validates the configuration, and runs the
/// selected mode on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when setup fails (arguments, config, datasets, HTTP
/// client) or when any threshold is breached.
pub fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;
    let config = load_config(args.config.as_deref())?;

    if args.list_modes {
        for mode in available_modes(config.as_ref()) {
            println!("{}", mode);
        }
        return Ok(());
    }

    let run_config = resolve_run_config(&args, &matches, config.as_ref())?;
    crate::logger::init_logging(run_config.verbose, run_config.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute::run_load_test(&run_config))
}

fn parse_args() -> AppResult<(VuloadArgs, ArgMatches)> {
    let matches = VuloadArgs::command().get_matches();
    let args = VuloadArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}
