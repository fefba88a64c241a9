use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use docshim::config::{Config, LogFormat};
use docshim::redirect::routes::create_shim_router;
use docshim::tee::{HttpCollector, Tee};
use docshim::upstream::LegacyUpstream;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    init_tracing(config.log_format);
    if let Some(unknown) = &config.unrecognized_log_format {
        warn!("Unknown LOG_FORMAT '{unknown}', falling back to 'pretty'. Supported values: pretty, json");
    }
    info!("Loaded configuration");

    // Initialize analytics tee
    let tee = if config.tee.enabled {
        let collector = HttpCollector::from_config(&config.tee)?;
        info!("📡 Mirroring requests to {}", config.tee.collector_url);
        Some(Arc::new(Tee::new(Arc::new(collector))))
    } else {
        info!("📡 Request mirroring is disabled");
        None
    };

    // Initialize legacy upstream
    let upstream = Arc::new(LegacyUpstream::from_config(&config.upstream)?);
    info!("Serving legacy pages from {}", upstream.base_url());

    let router = create_shim_router(upstream, tee);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Shim listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("docshim=info,tower_http=info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
