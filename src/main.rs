use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rigwatch::{
    DataSource, EquipmentFeed, LiveSource, RigwatchConfig, SampleGenerator, SimulatedSource,
    SourceMode, StreamIngest,
};
use rigwatch_types::Parameter;

#[derive(Parser, Debug)]
#[command(name = "rigwatch")]
#[command(about = "Monitor equipment sensor readings and threshold alerts")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Equipment identifier to monitor
    #[arg(short, long)]
    equipment: Option<String>,

    /// Use generated demo readings
    #[arg(short, long, conflicts_with = "connect")]
    simulate: bool,

    /// Connect to a TCP ingest stream for live records (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// Milliseconds between simulated readings
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Seed for reproducible simulated readings
    #[arg(long)]
    seed: Option<u64>,

    /// Voltage alert threshold (V)
    #[arg(long)]
    voltage: Option<f64>,

    /// RPM alert threshold
    #[arg(long)]
    rpm: Option<f64>,

    /// Temperature alert threshold (°C)
    #[arg(long)]
    temperature: Option<f64>,

    /// Humidity alert threshold (%)
    #[arg(long)]
    humidity: Option<f64>,

    /// Vibration alert threshold (g)
    #[arg(long)]
    vibration: Option<f64>,

    /// Exit after the first snapshot that is no longer loading
    #[arg(long)]
    once: bool,
}

impl Args {
    /// Override configuration values with the flags that were given.
    fn apply(&self, config: &mut RigwatchConfig) {
        if let Some(ref equipment) = self.equipment {
            config.equipment_id = equipment.clone();
        }
        if self.simulate {
            config.source = SourceMode::Simulated;
        }
        if let Some(ref addr) = self.connect {
            config.source = SourceMode::Live;
            config.connect = Some(addr.clone());
        }
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        let limits = [
            (Parameter::Voltage, self.voltage),
            (Parameter::Rpm, self.rpm),
            (Parameter::Temperature, self.temperature),
            (Parameter::Humidity, self.humidity),
            (Parameter::Vibration, self.vibration),
        ];
        for (parameter, limit) in limits {
            if let Some(limit) = limit {
                config.thresholds = config.thresholds.with(parameter, limit);
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only snapshots
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rigwatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = RigwatchConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(config, args.once))
}

/// Build the configured data source
async fn create_source(config: &RigwatchConfig) -> Result<Arc<dyn DataSource>> {
    match config.source {
        SourceMode::Simulated => {
            let source = match config.seed {
                Some(seed) => SimulatedSource::new(SampleGenerator::seeded(seed)),
                None => SimulatedSource::random(),
            };
            Ok(Arc::new(
                source
                    .with_interval(config.interval())
                    .with_prefill(config.capacity),
            ))
        }
        SourceMode::Live => {
            let addr = config
                .connect
                .as_deref()
                .context("live source requires a connect address")?;

            info!("Connecting to {}...", addr);
            let stream = TcpStream::connect(addr)
                .await
                .with_context(|| format!("Failed to connect to {}", addr))?;
            info!("Connected");

            let live = LiveSource::new(addr);
            StreamIngest::spawn(stream, live.clone());
            Ok(Arc::new(live))
        }
    }
}

/// Run one session, printing each published snapshot as a JSON line
async fn run(config: RigwatchConfig, once: bool) -> Result<()> {
    let source = create_source(&config).await?;
    let mut feed = EquipmentFeed::with_capacity(source, config.capacity);
    if !config.thresholds.is_empty() {
        feed.update_thresholds(&config.thresholds);
    }
    feed.start(&config.equipment_id);
    println!("{}", serde_json::to_string(&feed.snapshot())?);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            snapshot = feed.next_update() => {
                println!("{}", serde_json::to_string(&snapshot)?);
                if once && !snapshot.loading {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    feed.stop();
    Ok(())
}
