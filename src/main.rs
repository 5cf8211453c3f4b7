use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use dramatis::app::DramatisApp;
use dramatis::config::DramatisConfig;
use dramatis::ingest::EventSource;

const DEFAULT_LOG_FILTER: &str = "dramatis=info";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON-lines file of analysis update events, or `-` for stdin.
    #[arg(default_value = "-")]
    events: String,

    /// TOML file overriding simulation, camera, replay and palette settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay before each graph-bearing event during replay.
    #[arg(long)]
    batch_interval_ms: Option<u64>,

    /// Tracing filter directive; `RUST_LOG` wins when set.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt().with_env_filter(filter).with_target(true).compact().init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_filter);

    let mut config = DramatisConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(interval) = args.batch_interval_ms {
        config.replay.batch_interval_ms = interval;
    }

    let source = EventSource::from_arg(&args.events);
    info!(
        source = %source.label(),
        batch_interval_ms = config.replay.batch_interval_ms,
        sticky_colors = config.palette.sticky_colors,
        "starting viewer"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "dramatis",
        options,
        Box::new(move |cc| Ok(Box::new(DramatisApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow::anyhow!("viewer exited with an error: {error}"))
}
