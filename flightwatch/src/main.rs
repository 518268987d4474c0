//! flightwatch: polls a live flight feed and posts webhook alerts when
//! tracked callsigns enter or leave the region or change squawk.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flightwatch_core::config::{self, Config};
use flightwatch_core::{Result, Store, WatchError};

mod notification;
mod poller;
mod provider;

use notification::{ConsoleNotifier, Notifier, WebhookDispatcher};
use poller::Watcher;
use provider::{FlightProvider, FlightRadarProvider};

#[derive(Parser)]
#[command(
    name = "flightwatch",
    version,
    about = "Watch a region for tracked flights and post webhook alerts"
)]
struct Cli {
    /// Config file path [default: ~/.flightwatch/config.yaml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    watch: WatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for the poll loop (the default command).
#[derive(Args)]
struct WatchArgs {
    /// Webhook URL to post alerts to (repeatable, replaces configured list)
    #[arg(long = "webhook", env = "FLIGHTWATCH_WEBHOOKS", value_delimiter = ',')]
    webhooks: Vec<String>,

    /// Callsign to track (repeatable, replaces configured list)
    #[arg(long = "track")]
    tracked: Vec<String>,

    /// Seconds between polls
    #[arg(long)]
    interval: Option<u64>,

    /// Print alerts to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Query the feed once and print flights in the region as JSON
    Snapshot,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.config.clone().unwrap_or_else(config::config_file);

    let result = match cli.command {
        Some(Commands::Init { force }) => cmd_init(&path, force),
        Some(Commands::Snapshot) => cmd_snapshot(&path).await,
        None => cmd_watch(&path, cli.watch).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "flightwatch=debug"
    } else {
        "flightwatch=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(WatchError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config::save_config(&Config::default(), path)?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}

async fn cmd_snapshot(path: &Path) -> Result<()> {
    let config = config::load_config(path)?;
    config.validate(false)?;

    let flights = FlightRadarProvider::new()?
        .query_flights(&config.region)
        .await?;

    let out = serde_json::json!({
        "region": config.region,
        "bounds": config.region.bounds().to_query(),
        "count": flights.len(),
        "flights": flights,
    });
    let text = serde_json::to_string_pretty(&out)
        .map_err(|e| WatchError::Provider(format!("could not render snapshot: {e}")))?;
    println!("{text}");
    Ok(())
}

async fn cmd_watch(path: &Path, args: WatchArgs) -> Result<()> {
    let mut config = config::load_config(path)?;
    if !args.webhooks.is_empty() {
        config.webhooks = args.webhooks;
    }
    if !args.tracked.is_empty() {
        config.tracked = args.tracked;
    }
    if let Some(secs) = args.interval {
        config.poll_interval_secs = secs;
    }
    config.validate(!args.dry_run)?;

    info!(
        lat = config.region.lat,
        lon = config.region.lon,
        radius_m = config.region.radius_m,
        tracked = ?config.tracked,
        "flightwatch initialized"
    );

    if args.dry_run {
        watch(config, ConsoleNotifier, args.once).await
    } else {
        watch(config, WebhookDispatcher::new()?, args.once).await
    }
}

async fn watch<N: Notifier>(config: Config, notifier: N, once: bool) -> Result<()> {
    let mut watcher = Watcher::new(
        Store::new(&config.tracked),
        config.region,
        config.webhooks,
        FlightRadarProvider::new()?,
        notifier,
    );

    if once {
        let report = watcher.run_cycle().await?;
        info!(
            flights = report.flights_observed,
            alerts = report.alerts,
            failed_deliveries = report.deliveries_failed,
            "cycle complete"
        );
        return Ok(());
    }

    watcher
        .run(Duration::from_secs(config.poll_interval_secs))
        .await;
    Ok(())
}
