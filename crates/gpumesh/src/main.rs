use anyhow::Result;
use gpumesh::tool::app_config::AppConfig;
use gpumesh::tool::run_app;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;

    // Set up tracing
    let fmt_layer = fmt::layer().with_target(false);
    let default_filter = config
        .log_filter
        .as_deref()
        .unwrap_or(if cfg!(debug_assertions) { "trace" } else { "info" });
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    info!("Starting gpumesh");

    run_app(&config)
}
