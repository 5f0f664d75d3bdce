#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line frontend of the replica synchronizer. It parses
//! and validates the startup arguments, opens the durable log sink, installs
//! the diagnostics subscriber, and then drives the engine from an infinite
//! interval loop: one full synchronization pass per tick, a blocking sleep
//! in between, forever, until a fatal error or external termination.
//!
//! # Design
//!
//! - Argument parsing uses the `clap` builder API with custom value parsers
//!   for validated values; the parsed surface is exactly two positionals
//!   plus the interval and log-path options.
//! - Startup validation failures never reach the loop: a missing source
//!   directory or an unopenable log file produce a single stderr diagnostic
//!   and a non-zero exit code before any pass starts.
//! - The loop owns timing only. The engine exposes one pass as a single
//!   operation, so a test harness can drive exactly one tick without this
//!   crate.
//! - [`run_with`] takes its argument iterator and output writers explicitly,
//!   which keeps the frontend testable without touching process globals.
//!
//! # Errors
//!
//! Pass failures are not caught: the first [`engine::SweepError`] terminates
//! the process with that error's exit code. Tolerated removal warnings are
//! the engine's concern and appear only in the action log.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::builder::OsStringValueParser;
use clap::{Arg, Command};
use logging::ActionLog;

/// Exit code for startup validation failures selecting the source tree or
/// the durable log sink, matching upstream rsync's RERR_FILESELECT.
const FILE_SELECT_EXIT_CODE: i32 = 3;

/// Default durable log sink path.
const DEFAULT_LOG_PATH: &str = "./log.txt";

/// Parsed command produced by [`parse_args`].
#[derive(Debug)]
struct ParsedArgs {
    source_path: PathBuf,
    replica_path: PathBuf,
    interval_seconds: f64,
    log_path: PathBuf,
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("replisync")
        .about("Periodically synchronizes a replica directory with a source directory.")
        .arg(
            Arg::new("source_path")
                .value_name("SOURCE")
                .required(true)
                .value_parser(OsStringValueParser::new())
                .help("Directory to mirror; must already exist."),
        )
        .arg(
            Arg::new("replica_path")
                .value_name("REPLICA")
                .required(true)
                .value_parser(OsStringValueParser::new())
                .help("Directory maintained as the mirror; created on the first pass."),
        )
        .arg(
            Arg::new("interval_seconds")
                .short('i')
                .long("interval_seconds")
                .value_name("SECONDS")
                .default_value("60")
                .allow_negative_numbers(true)
                .value_parser(parse_interval)
                .help("Seconds between synchronization pass starts; must be positive."),
        )
        .arg(
            Arg::new("log_path")
                .short('l')
                .long("log_path")
                .value_name("FILE")
                .default_value(DEFAULT_LOG_PATH)
                .value_parser(OsStringValueParser::new())
                .help("Durable log file receiving one record per action."),
        )
}

/// Validates the interval option: a positive, finite number of seconds.
fn parse_interval(raw: &str) -> Result<f64, String> {
    let interval: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    if !interval.is_finite() || interval <= 0.0 {
        return Err(format!(
            "interval must be a positive number of seconds, got '{raw}'"
        ));
    }
    Ok(interval)
}

fn parse_args<A, S>(arguments: A) -> Result<ParsedArgs, clap::Error>
where
    A: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = clap_command().try_get_matches_from(arguments)?;

    let source_path = matches
        .get_one::<OsString>("source_path")
        .cloned()
        .map(PathBuf::from)
        .unwrap_or_default();
    let replica_path = matches
        .get_one::<OsString>("replica_path")
        .cloned()
        .map(PathBuf::from)
        .unwrap_or_default();
    let interval_seconds = matches
        .get_one::<f64>("interval_seconds")
        .copied()
        .unwrap_or(60.0);
    let log_path = matches
        .get_one::<OsString>("log_path")
        .cloned()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

    Ok(ParsedArgs {
        source_path,
        replica_path,
        interval_seconds,
        log_path,
    })
}

/// Installs the developer-facing diagnostics subscriber.
///
/// Diagnostics go to stderr and are filtered through `RUST_LOG`; they are
/// separate from the operator-facing action log and never affect behavior.
fn init_diagnostics() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Runs the synchronizer until a fatal error terminates it.
///
/// Parses `arguments`, validates the startup contract, then enters the
/// interval loop: one full pass per tick with a blocking sleep in between.
/// Action records stream to the durable log file and to `stdout`; fatal
/// errors produce one line on `stderr`. Returns the process exit code; on
/// the happy path this function never returns.
pub fn run_with<A, S, Out, Err>(arguments: A, stdout: &mut Out, stderr: &mut Err) -> i32
where
    A: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    init_diagnostics();

    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_clap_error(&error, stdout, stderr),
    };

    if !parsed.source_path.is_dir() {
        let _ = writeln!(
            stderr,
            "replisync: source '{}' is not an accessible directory",
            parsed.source_path.display()
        );
        return FILE_SELECT_EXIT_CODE;
    }

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&parsed.log_path)
    {
        Ok(file) => file,
        Err(error) => {
            let _ = writeln!(
                stderr,
                "replisync: unable to open log file '{}': {}",
                parsed.log_path.display(),
                error
            );
            return FILE_SELECT_EXIT_CODE;
        }
    };

    let interval = Duration::from_secs_f64(parsed.interval_seconds);
    let mut log = ActionLog::new(log_file, stdout);

    loop {
        match engine::run_pass(&parsed.source_path, &parsed.replica_path, &mut log) {
            Ok(summary) => {
                tracing::debug!(
                    created = summary.created(),
                    overwritten = summary.overwritten(),
                    removed = summary.removed(),
                    unchanged = summary.unchanged(),
                    retained = summary.retained(),
                    "synchronization pass finished"
                );
            }
            Err(error) => {
                let _ = writeln!(stderr, "replisync: {error}");
                return error.exit_code();
            }
        }
        thread::sleep(interval);
    }
}

/// Reports a parse failure through the injected writers.
///
/// Help output goes to `stdout`; everything else goes to `stderr`, matching
/// clap's own stream selection.
fn report_clap_error<Out, Err>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let rendered = error.render();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
    } else {
        let _ = write!(stdout, "{rendered}");
    }
    error.exit_code()
}
