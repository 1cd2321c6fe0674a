//! Command line linter for intermediate schema records.
//!
//! Usage:
//!   islint [OPTIONS] [FILE]
//!
//! Reads newline-delimited JSON from FILE or stdin and writes a JSON summary
//! of quality statistics. With `--details`, every issue is written as a TSV
//! line to stdout and the summary goes to stderr instead.
//!
//! The first interrupt (Ctrl-C) writes a snapshot of the statistics so far and
//! keeps going; a second one exits with status 130.

use anyhow::{Context, Result};
use clap::Parser;
use islint::pipeline::default_workers;
use islint::{
    load_string_set, Kind, LintConfig, Pipeline, PipelineConfig, RecoveryMode, RuleSet, Sinks,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{self, ExitCode};
use tracing::{error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(
    name = "islint",
    about = "Check intermediate schema records for plausibility",
    disable_version_flag = true
)]
struct Cli {
    /// Show version and exit
    #[arg(short = 'v', long = "version")]
    show_version: bool,

    /// List issue kinds and exit
    #[arg(long = "ls")]
    list_kinds: bool,

    /// Show progress
    #[arg(long)]
    verbose: bool,

    /// Show error details for every record as TSV
    #[arg(long)]
    details: bool,

    /// Ratio of records to test
    #[arg(long, default_value_t = 1.0)]
    sample: f64,

    /// Seed for sampling, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads [default: number of CPUs]
    #[arg(long)]
    workers: Option<usize>,

    /// Records per batch
    #[arg(long, default_value_t = 40_000)]
    batch_size: usize,

    /// Records between progress snapshots
    #[arg(long, default_value_t = 1_000_000)]
    checkpoint_every: u64,

    /// Allowed collection names, one per line; may be repeated
    #[arg(long = "collections", value_name = "FILE")]
    collections: Vec<PathBuf>,

    /// Only run these rules (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    rules: Vec<String>,

    /// Skip lines that are not valid records instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Input file [default: stdin]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::INFO } else { Level::WARN })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.show_version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if cli.list_kinds {
        let mut out = io::stdout().lock();
        for name in Kind::sorted_names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let allowed = if cli.collections.is_empty() {
        warn!("no collection lists given, collection names are not checked");
        None
    } else {
        let set = load_string_set(cli.collections.as_slice()).context("loading collection lists")?;
        info!(collections = set.len(), "loaded collection allow-list");
        Some(set)
    };
    let lint_config = LintConfig::new(allowed);
    let rules = if cli.rules.is_empty() {
        RuleSet::new(lint_config)
    } else {
        RuleSet::select(lint_config, cli.rules.as_slice())?
    };

    let config = PipelineConfig {
        batch_size: cli.batch_size,
        workers: cli.workers.unwrap_or_else(default_workers),
        checkpoint_interval: cli.checkpoint_every,
        sample_ratio: cli.sample,
        seed: cli.seed,
        recovery: if cli.skip_invalid {
            RecoveryMode::Lenient
        } else {
            RecoveryMode::Strict
        },
        ..PipelineConfig::default()
    };
    let mut pipeline = Pipeline::new(rules, config)?;
    let checkpoints = pipeline.checkpoint_handle();
    let mut interrupted = false;
    ctrlc::set_handler(move || {
        if interrupted || !checkpoints.request() {
            process::exit(130);
        }
        interrupted = true;
        warn!("interrupted, writing snapshot; interrupt again to quit");
    })
    .context("installing interrupt handler")?;

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut details_out = BufWriter::new(io::stdout());
    let mut summary_out = BufWriter::new(io::stdout());
    let mut progress_err = io::stderr();
    let mut summary_err = io::stderr();
    let summary: &mut (dyn Write + Send) = if cli.details {
        &mut summary_err
    } else {
        &mut summary_out
    };
    let sinks = Sinks {
        details: if cli.details {
            Some(&mut details_out)
        } else {
            None
        },
        progress: if cli.verbose {
            Some(&mut progress_err)
        } else {
            None
        },
        summary,
    };

    pipeline.run(input, sinks)?;
    Ok(())
}
