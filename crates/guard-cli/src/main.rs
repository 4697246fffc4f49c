mod notifier;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use guard_engine::doctor as engine_doctor;
use guard_engine::{
    Monitor, MonitorConfig, Notifier, PositionConfig, PositionFeed, PositionFilter, PositionSource,
};
use guard_proto::{AlertNotice, AlertPriority, RiskLevel, Vibration};
use guard_zones::doctor as zones_doctor;
use guard_zones::{DirectoryConfig, HttpZoneDirectory, ZoneCache, ZoneDirectory};

use notifier::LogNotifier;

#[derive(Debug, Parser)]
#[command(name = "floodguard", version, about = "FloodGuard - flood-zone proximity alerting")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the configuration without starting the monitor.
    Doctor,
    /// Run the proximity monitor until ctrl-c.
    Run,
    /// Fetch the zone directory once and list it.
    Zones,
    /// Emit a test notification through the configured notifier.
    AlertTest,
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    monitor: MonitorConfig,
    position: PositionConfig,
    directory: DirectoryConfig,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    Ok(toml::from_str(&s).context("parse config toml")?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Run => run(cfg).await?,
        Command::Zones => zones(&cfg).await?,
        Command::AlertTest => alert_test()?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");
    engine_doctor::check_monitor(&cfg.monitor)?;
    engine_doctor::check_position(&cfg.position)?;
    zones_doctor::check_directory(&cfg.directory)?;
    info!("doctor: OK");
    Ok(())
}

fn open_position_feed(cfg: &PositionConfig) -> Result<PositionFeed> {
    let source = match cfg.source.as_str() {
        "nmea-serial" => PositionSource::serial(
            cfg.nmea_device.as_ref().context("position.nmea_device missing")?,
            cfg.baud.unwrap_or(115_200),
        )?,
        "nmea-file" => {
            PositionSource::file(cfg.nmea_file.as_ref().context("position.nmea_file missing")?)?
        }
        other => anyhow::bail!("unknown position.source: {}", other),
    };
    let filter = PositionFilter::new(cfg.min_interval(), cfg.distance_filter_m);
    Ok(PositionFeed::new(source, filter))
}

async fn run(cfg: Config) -> Result<()> {
    info!("run: starting");

    let directory = HttpZoneDirectory::new(&cfg.directory).context("init zone directory client")?;
    let cache = ZoneCache::new(directory);
    let feed = open_position_feed(&cfg.position)?;
    let notifier = LogNotifier::default();

    let (stop_tx, stop_rx) = watch::channel(false);
    let monitor = Monitor::new(cfg.monitor, cache, feed, notifier);
    let mut task = tokio::spawn(monitor.run(stop_rx));

    tokio::select! {
        joined = &mut task => {
            joined.context("join monitor")??;
            return Ok(());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("run: shutting down");
            let _ = stop_tx.send(true);
        }
    }
    task.await.context("join monitor")??;
    Ok(())
}

async fn zones(cfg: &Config) -> Result<()> {
    let directory = HttpZoneDirectory::new(&cfg.directory)?;
    let zones = directory.fetch_zones().await?;
    println!("{} zones", zones.len());
    for z in &zones {
        println!(
            "{} [{}] {} ({:.5}, {:.5}) resolved={}",
            z.id,
            z.risk_level.as_str(),
            z.name,
            z.coordinate.lat,
            z.coordinate.lon,
            z.resolved
        );
    }
    Ok(())
}

fn alert_test() -> Result<()> {
    let mut notifier = LogNotifier::default();
    let notice = AlertNotice {
        zone_id: "test".to_string(),
        zone_name: "Test zone".to_string(),
        risk: RiskLevel::Low,
        distance_m: 0.0,
        title: "Test notification".to_string(),
        body: "FloodGuard alert delivery is working.".to_string(),
        priority: AlertPriority::Default,
        vibration: Vibration::Burst,
    };
    notifier.emit(&notice)?;
    info!("alert-test: sent");
    Ok(())
}
