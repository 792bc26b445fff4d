use clap::ArgMatches;
use clap::parser::ValueSource;
use std::time::Duration;

use crate::args::{
    Command, LoadTestArgs, PositiveU64, PositiveUsize, ServeArgs, parse_listen_addr,
};
use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::PercentileSet;

use super::types::{ConfigFile, DurationValue, ServeConfig};

/// Applies configuration values to CLI arguments. Values the user passed on
/// the command line are left untouched.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut LoadTestArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "host")
        && let Some(host) = config.host.clone()
    {
        args.host = Some(host);
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "threads")
        && let Some(threads) = config.threads
    {
        args.threads = ensure_positive_usize(threads, "threads")?;
    }

    if !is_cli(matches, "percentiles")
        && let Some(percentiles) = config.percentiles.as_ref()
    {
        args.percentiles = PercentileSet::new(percentiles.iter().copied())
            .map_err(|err| AppError::config(ConfigError::InvalidPercentiles { source: err }))?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(value) = config.request_timeout.as_ref()
    {
        args.request_timeout = to_duration(value, "request_timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(value, "connect_timeout")?;
    }

    if !is_cli(matches, "backoff_initial")
        && let Some(value) = config.backoff_initial.as_ref()
    {
        args.backoff_initial = to_duration(value, "backoff_initial")?;
    }

    if !is_cli(matches, "backoff_max")
        && let Some(value) = config.backoff_max.as_ref()
    {
        args.backoff_max = to_duration(value, "backoff_max")?;
    }

    if !is_cli(matches, "max_attempts")
        && let Some(value) = config.max_attempts
    {
        args.max_attempts = ensure_positive_u64(value, "max_attempts")?;
    }

    if !is_cli(matches, "deadline")
        && let Some(value) = config.deadline.as_ref()
    {
        args.deadline = Some(to_duration(value, "deadline")?);
    }

    if !is_cli(matches, "seed")
        && let Some(seed) = config.seed
    {
        args.seed = Some(seed);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if let Some(Command::Serve(serve_args)) = args.command.as_mut()
        && let Some(serve_config) = config.serve.as_ref()
        && let Some(serve_matches) = matches.subcommand_matches("serve")
    {
        apply_serve_config(serve_args, serve_matches, serve_config)?;
    }

    Ok(())
}

fn apply_serve_config(
    args: &mut ServeArgs,
    matches: &ArgMatches,
    config: &ServeConfig,
) -> AppResult<()> {
    if !is_cli(matches, "listen")
        && let Some(listen) = config.listen.as_deref()
    {
        args.listen = parse_listen_addr(listen)?;
    }

    if !is_cli(matches, "recent")
        && let Some(recent) = config.recent
    {
        args.recent = ensure_positive_usize(recent, "serve.recent")?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}
