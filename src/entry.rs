use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{export_json, print_summary, run_load_test, summary_json};
use crate::args::{Command, LoadTestArgs, OutputFormat, ServeArgs};
use crate::config::{apply_config, load_config};
use crate::domain::RunConfig;
use crate::error::AppResult;
use crate::guestbook;
use crate::metrics::RunSummary;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

enum RunPlan {
    Serve(ServeArgs),
    LoadTest {
        config: RunConfig,
        output_format: OutputFormat,
        export_json: Option<String>,
    },
}

/// Parse arguments, merge the config file, and run the requested command on
/// a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, or when the
/// selected command fails.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args(std::env::args_os())?;
    // Config values only fill options the command line left unset.
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let plan = build_plan(args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args<I>(raw_args: I) -> AppResult<(LoadTestArgs, ArgMatches)>
where
    I: IntoIterator<Item = OsString>,
{
    let matches = LoadTestArgs::command().get_matches_from(raw_args);
    let args = LoadTestArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn build_plan(mut args: LoadTestArgs) -> AppResult<RunPlan> {
    if let Some(command) = args.command.take() {
        match command {
            Command::Serve(serve_args) => return Ok(RunPlan::Serve(serve_args)),
        }
    }

    let config = RunConfig::from_args(&args)?;
    Ok(RunPlan::LoadTest {
        config,
        output_format: args.output_format,
        export_json: args.export_json,
    })
}

async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::Serve(serve_args) => {
            let (shutdown_tx, shutdown_rx) = shutdown_channel();
            let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
            let result =
                guestbook::serve(serve_args.listen, serve_args.recent.get(), shutdown_rx).await;
            signal_handle.abort();
            result
        }
        RunPlan::LoadTest {
            config,
            output_format,
            export_json: export_path,
        } => {
            let summary = run_load_test(&config).await?;
            report(&summary, output_format)?;
            if let Some(path) = export_path.as_deref() {
                export_json(path, &summary).await?;
            }
            Ok(())
        }
    }
}

fn report(summary: &RunSummary, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => print_summary(summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary_json(summary))?),
    }
    Ok(())
}
