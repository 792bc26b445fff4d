use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use crate::metrics::PercentileSet;

use super::defaults::DEFAULT_LISTEN_ADDR;
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_listen_addr, parse_percentiles, parse_positive_u64,
    parse_positive_usize,
};
use super::types::{OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the guestbook service the load test targets
    Serve(ServeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR, value_parser = parse_listen_addr)]
    pub listen: SocketAddr,

    /// Number of newest comments returned by GET /comments
    #[arg(long, default_value = "10", value_parser = parse_positive_usize)]
    pub recent: PositiveUsize,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Guestbook load generator: concurrent GET/POST traffic with exponential backoff and latency percentiles."
)]
pub struct LoadTestArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the guestbook service
    #[arg(long, short = 'u')]
    pub host: Option<String>,

    /// Total logical requests across all workers
    #[arg(long, short = 'n', default_value = "1000", value_parser = parse_positive_u64)]
    pub requests: PositiveU64,

    /// Number of concurrent workers
    #[arg(long, short = 'c', default_value = "10", value_parser = parse_positive_usize)]
    pub threads: PositiveUsize,

    /// Latency percentiles to report (comma separated, 0-100)
    #[arg(long, default_value = "50,90,95,99", value_parser = parse_percentiles)]
    pub percentiles: PercentileSet,

    /// Per-attempt request timeout (supports ms/s/m/h)
    #[arg(long = "request-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connection establishment timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Delay before the first retry (supports ms/s/m/h)
    #[arg(long = "backoff-initial", default_value = "20ms", value_parser = parse_duration_arg)]
    pub backoff_initial: Duration,

    /// Upper bound for a single retry delay (supports ms/s/m/h)
    #[arg(long = "backoff-max", default_value = "5s", value_parser = parse_duration_arg)]
    pub backoff_max: Duration,

    /// Attempts per logical request, the first one included
    #[arg(long = "max-attempts", default_value = "10", value_parser = parse_positive_u64)]
    pub max_attempts: PositiveU64,

    /// Stop the run after this long and report what completed (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub deadline: Option<Duration>,

    /// Seed for the per-worker random generators (worker i uses seed + i)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Summary format printed to stdout
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Also write the JSON summary to this path
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./gbload.toml or ./gbload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by GBLOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
