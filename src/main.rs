//! Lumina binary entry point.
//!
//! Runs the line-oriented journal front end over stdin/stdout. All logs go
//! to stderr so command output stays clean.

use lumina::app::App;
use lumina::config::Config;

#[tokio::main]
async fn main() {
    // Initialize logging to stderr only (stdout is for command output)
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("lumina starting...");

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Configuration loaded: journal={}, timeout={}ms",
        config.journal_path,
        config.request_timeout_ms
    );

    // Build and run the interactive app
    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup error: {e}");
            std::process::exit(1);
        }
    };

    app.run_stdio().await;

    tracing::info!("lumina shutdown complete");
}
