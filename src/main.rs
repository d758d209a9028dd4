use anyhow::Result;
use tracing_subscriber::EnvFilter;

use reuse_ideas::catalog::ModelCatalog;
use reuse_ideas::generator::IdeaGenerator;
use reuse_ideas::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();
    if config.upstream.api_key.is_empty() {
        tracing::warn!("OPENROUTER_API_KEY is not set; upstream will reject requests");
    }

    let generator = IdeaGenerator::new(&config, ModelCatalog::builtin())?;

    run_server(config, generator).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
