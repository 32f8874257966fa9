use tracing_subscriber::EnvFilter;

use couchparty_display::config::DisplayConfig;
use couchparty_display::render::LogSink;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DisplayConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    tokio::select! {
        result = couchparty_display::run(config, LogSink) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Display stopped");
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        },
    }
}
