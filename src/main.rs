//! Vital Signs server - cached earth and space data for dashboard widgets
//!
//! Serves earthquakes, geomagnetic activity, lightning and a seismic summary
//! as JSON, each read through its own fallback-on-stale cache.

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use vitalsigns::cli::Cli;
use vitalsigns::http::{self, AppState};

/// Installs the global tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.resolve_config()?;
    let addr = config.bind_addr()?;
    tracing::info!(
        earthquakes_ttl = config.routes.earthquakes.ttl_secs,
        geomagnetic_ttl = config.routes.geomagnetic.ttl_secs,
        lightning_ttl = config.routes.lightning.ttl_secs,
        seismic_ttl = config.routes.seismic.ttl_secs,
        "starting vitalsigns"
    );

    let state = AppState::from_config(&config)?;
    http::serve(addr, state).await?;

    Ok(())
}
