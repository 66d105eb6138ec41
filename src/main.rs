use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_guide::{
    catalog::Catalog,
    config::Config,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "channel-guide")]
#[command(version)]
#[command(about = "Regional IPTV playlists, XMLTV guides and stream redirects")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Channel catalog file (overrides config file)
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("channel_guide={},tower_http=trace", cli.log_level)
    } else {
        format!("channel_guide={}", cli.log_level)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting channel guide v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog.path = Some(catalog);
    }

    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let state = AppState::new(config.clone(), catalog)?;
    let server = WebServer::new(&config, state);

    info!(
        "Serving {} (default region: {})",
        server.addr(),
        config.catalog.default_region
    );
    server.serve().await
}
