//! via-causal - Causal structure discovery over motif occurrences
//!
//! Usage:
//!   via-causal discover --input motifs.json                 # writes mnnet.dot
//!   via-causal discover --input motifs.json --format json --out graph.json
//!   via-causal events --input motifs.json
//!   via-causal params

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use via_causal::{CausalEngine, DiscoveryInput, EngineConfig, Result, dot};

#[derive(Parser)]
#[command(name = "via-causal")]
#[command(about = "Granger-causality graph discovery over detected anomaly motifs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build events, test every pair and write the causal graph
    Discover {
        /// Motif occurrences per series (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "mnnet.dot")]
        out: PathBuf,

        /// Engine configuration (JSON); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads, overrides the configuration (0 = all cores)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "dot")]
        format: OutputFormat,
    },

    /// Print the reduced events, one JSON object per line
    Events {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration
    Params,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Dot,
    Json,
}

#[derive(Serialize)]
struct EventSummary<'a> {
    series: &'a str,
    begin: usize,
    active: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Discover {
            input,
            out,
            config,
            workers,
            format,
        } => run_discover(input, out, config, workers, format),
        Commands::Events { input, config } => run_events(input, config),
        Commands::Params => run_params(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "causal discovery failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn run_discover(
    input: PathBuf,
    out: PathBuf,
    config: Option<PathBuf>,
    workers: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(workers) = workers {
        config.workers = workers;
    }
    let engine = CausalEngine::new(config)?;

    let batch = DiscoveryInput::load(&input)?;
    let graph = engine.discover(&batch)?;

    let mut writer = BufWriter::new(File::create(&out)?);
    match format {
        OutputFormat::Dot => dot::write_dot(&mut writer, &graph)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &graph)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    info!(
        out = %out.display(),
        nodes = graph.len(),
        edges = graph.edge_count(),
        "graph written"
    );
    Ok(())
}

fn run_events(input: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let batch = DiscoveryInput::load(&input)?;
    let events = batch.to_events(&config.params)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &events {
        let summary = EventSummary {
            series: event.series(),
            begin: event.first_active(),
            active: event.active_samples(),
        };
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
    }
    Ok(())
}

fn run_params() -> Result<()> {
    let json = serde_json::to_string_pretty(&EngineConfig::default())?;
    println!("{}", json);
    Ok(())
}
