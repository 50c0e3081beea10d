mod output;

use clap::Parser;
use color_eyre::Result;
use output::Printer;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tw_core::config::loader::{load_config, validate_config, DEFAULT_CONFIG_FILE};
use tw_core::{Subscription, Synchronizer};
use tw_protocol::config_models::SyncConfig;
use tw_protocol::task_models::Viewer;

/// Follow the tasks a viewer holds in one workflow process instance.
#[derive(Parser, Debug)]
#[command(name = "taskwatch", version, about, long_about = None)]
struct Cli {
    /// Process instance to watch
    process_instance_id: String,

    /// Identity whose tasks are shown
    #[arg(long)]
    viewer: String,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Snapshot endpoint, overriding the configuration file
    #[arg(long)]
    snapshot_url: Option<String>,

    /// Push channel base URL, overriding the configuration file
    #[arg(long)]
    push_url: Option<String>,

    /// Include completed tasks in snapshots
    #[arg(long)]
    include_history: bool,

    /// Print change notifications as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Keep watching after the process instance has ended
    #[arg(long)]
    keep_running: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = resolve_config(&cli)?;
    run(cli, config).await
}

/// Logs go to stderr; stdout carries the task list or JSON lines.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the configuration file and apply command line overrides.
fn resolve_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = load_config(&cli.config)?;

    if let Some(url) = &cli.snapshot_url {
        config.snapshot_url = Some(url.clone());
    }
    if let Some(url) = &cli.push_url {
        config.push_url = Some(url.clone());
    }
    config.include_history |= cli.include_history;

    validate_config(&config, &cli.config)?;
    Ok(config)
}

async fn run(cli: Cli, config: SyncConfig) -> Result<()> {
    let synchronizer = Synchronizer::from_config(&config)?;
    let viewer = Viewer::new(cli.viewer);
    let printer = Printer::new(cli.json, viewer.clone());

    let (done_tx, mut done_rx) = oneshot::channel();
    let mut subscription = synchronizer.subscribe(&cli.process_instance_id, viewer, move |end| {
        let _ = done_tx.send(end.clone());
    });
    let mut completed = false;

    loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            event = subscription.next_event() => match event {
                Some(event) => printer.event(&event)?,
                None => break,
            },
            end = &mut done_rx, if !completed => {
                completed = true;
                flush_queued(&printer, &mut subscription)?;
                if let Ok(end) = end {
                    printer.completed(&end);
                }
                if !cli.keep_running {
                    break;
                }
            }
        }
    }

    subscription.unsubscribe();
    Ok(())
}

/// Print every notification already queued, without waiting for more.
fn flush_queued(printer: &Printer, subscription: &mut Subscription) -> Result<()> {
    while let Some(event) = subscription.try_next_event() {
        printer.event(&event)?;
    }
    Ok(())
}
