//! Waste Carbon service entry point

use anyhow::Result;
use tracing::info;

use waste_carbon::{run_server, utils, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    utils::init_logging(&config.log_filter)?;

    info!("🌍 Waste Carbon v{}", env!("CARGO_PKG_VERSION"));
    info!("   model:   {}", config.model_path.display());
    match &config.factors_path {
        Some(path) => info!("   factors: {}", path.display()),
        None => info!("   factors: built-in placeholders"),
    }

    run_server(config).await
}
