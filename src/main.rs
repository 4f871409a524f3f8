//! sysprobe: samples CPU and memory once per interval and writes one JSON
//! line per sample to stdout.
//!
//! Run with:  `RUST_LOG=info sysprobe`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use probe_config::ProbeConfig;
use probe_report::JsonLinesReporter;
use probe_system::{ProcSource, SampleLoop};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sysprobe", version, about = "Minimal host CPU and memory telemetry probe")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample until interrupted (the default).
    Run(RunArgs),
    /// Summarize a captured JSON Lines trace.
    Summary {
        /// Trace file written by `sysprobe run`.
        input: PathBuf,
        /// Also write `summary.json` into this directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Config file (default: $XDG_CONFIG_HOME/sysprobe/sysprobe.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sampling interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Append records to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Omit the meta and end lifecycle records.
    #[arg(long)]
    no_meta: bool,
}

impl RunArgs {
    fn resolve(self) -> Result<ProbeConfig> {
        let path = self.config.unwrap_or_else(probe_config::default_path);
        let mut config = probe_config::load(&path)
            .with_context(|| format!("loading config from '{}'", path.display()))?;

        if let Some(ms) = self.interval_ms {
            config.sampling.interval_ms = ms;
        }
        if self.output.is_some() {
            config.output.path = self.output;
        }
        if self.no_meta {
            config.output.meta = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Structured logging on stderr; stdout is reserved for records.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Some(Command::Summary { input, out }) => summary(input, out),
        Some(Command::Run(args)) => run(args).await,
        None => run(RunArgs::default()).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = args.resolve()?;
    info!("sysprobe v{} starting", env!("CARGO_PKG_VERSION"));

    let out: Box<dyn Write> = match &config.output.path {
        Some(path) => Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening output '{}'", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let source = ProcSource::new(&config.sources.proc_root, &config.sources.sys_root);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(shutdown_tx));

    let end = SampleLoop::new(source, JsonLinesReporter::new(out), config.sampling.interval())
        .with_lifecycle_records(config.output.meta)
        .run(shutdown_rx)
        .await
        .context("sampling loop failed")?;

    info!(
        "Stopped after {} samples ({} skipped) in {:.1}s",
        end.samples, end.skipped, end.runtime_s
    );
    Ok(())
}

fn summary(input: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let summary = probe_report::summarize_file(&input)
        .with_context(|| format!("summarizing '{}'", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(dir) = out {
        probe_report::write_summary(&dir, &summary)
            .with_context(|| format!("writing summary into '{}'", dir.display()))?;
    }
    Ok(())
}

/// Raise the shutdown flag on Ctrl-C (or SIGTERM on unix).
async fn forward_shutdown(tx: watch::Sender<bool>) {
    wait_for_signal().await;
    info!("Shutdown requested; finishing current tick");
    let _ = tx.send(true);
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {e}");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
