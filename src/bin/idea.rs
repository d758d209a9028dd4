use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reuse_ideas::catalog::ModelCatalog;
use reuse_ideas::config::AppConfig;
use reuse_ideas::generator::IdeaGenerator;
use reuse_ideas::models::{GenerateRequest, GenerateResponse, MAX_MATERIALS_CHARS};

#[derive(Parser, Debug)]
#[command(name = "idea")]
#[command(about = "Generate one reuse idea for a list of materials")]
struct Cli {
    /// Comma separated materials, at most 200 characters.
    #[arg(required_unless_present = "list_models")]
    materials: Option<String>,
    /// Model alias; unknown aliases fall back to the default.
    #[arg(long)]
    model: Option<String>,
    /// List the available model aliases and exit.
    #[arg(long, default_value_t = false)]
    list_models: bool,
}

/// Carries the failure envelope so it can still be printed before exiting.
#[derive(Debug, thiserror::Error)]
#[error("generation failed: {}", .0.error.as_deref().unwrap_or("unknown error"))]
struct GenerationFailed(GenerateResponse);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let generator = IdeaGenerator::new(&config, ModelCatalog::builtin())?;

    if cli.list_models {
        println!(
            "{}",
            serde_json::to_string_pretty(&generator.catalog().describe())?
        );
        return Ok(());
    }

    match generate_once(&generator, cli.materials.unwrap_or_default(), cli.model).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            if let Some(GenerationFailed(response)) = err.downcast_ref::<GenerationFailed>() {
                println!("{}", serde_json::to_string_pretty(response)?);
            }
            Err(err)
        }
    }
}

/// Validates the materials like the HTTP endpoint does and runs one
/// generation. Invalid input and upstream failures are both errors.
async fn generate_once(
    generator: &IdeaGenerator,
    materials: String,
    model: Option<String>,
) -> Result<GenerateResponse> {
    let request = GenerateRequest::new(materials, model);
    let Some(materials) = request.valid_materials() else {
        anyhow::bail!("materials must be between 1 and {MAX_MATERIALS_CHARS} characters");
    };

    match generator.generate(materials, request.model_alias()).await {
        Ok(idea) => Ok(GenerateResponse::success(idea)),
        Err(err) => {
            let response = GenerateResponse::failure(err.message, err.details);
            Err(GenerationFailed(response).into())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use reuse_ideas::config::{Environment, UpstreamConfig};

    use super::*;

    fn generator(base_url: &str) -> IdeaGenerator {
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            static_dir: PathBuf::from("public"),
            environment: Environment::Production,
            upstream: UpstreamConfig {
                base_url: base_url.to_string(),
                api_key: "test-key".to_string(),
                referrer_url: "http://localhost:3000".to_string(),
                app_title: "RecycleAI".to_string(),
                timeout: Duration::from_secs(2),
            },
        };
        IdeaGenerator::new(&config, ModelCatalog::builtin()).expect("client")
    }

    #[test]
    fn materials_are_required_unless_listing_models() {
        assert!(Cli::try_parse_from(["idea"]).is_err());
        let cli = Cli::try_parse_from(["idea", "--list-models"]).expect("list models");
        assert!(cli.list_models);
        let cli = Cli::try_parse_from(["idea", "--model", "gpt-4", "tin cans"]).expect("args");
        assert_eq!(cli.materials.as_deref(), Some("tin cans"));
        assert_eq!(cli.model.as_deref(), Some("gpt-4"));
    }

    #[tokio::test]
    async fn invalid_materials_fail_before_any_request() {
        // Nothing listens here, so reaching the network would report a
        // generation failure instead of a validation error.
        let generator = generator("http://127.0.0.1:9");

        for materials in [String::new(), "x".repeat(MAX_MATERIALS_CHARS + 1)] {
            let err = generate_once(&generator, materials, None)
                .await
                .expect_err("should reject");
            assert!(err.downcast_ref::<GenerationFailed>().is_none());
            assert!(err.to_string().contains("materials must be between"));
        }
    }

    #[tokio::test]
    async fn failed_generation_is_an_error_with_envelope() {
        let generator = generator("http://127.0.0.1:9");

        let err = generate_once(&generator, "glass jars".to_string(), Some("gpt-4".to_string()))
            .await
            .expect_err("upstream is unreachable");
        let GenerationFailed(response) = err
            .downcast_ref::<GenerationFailed>()
            .expect("failure envelope");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("Generation failed"));
        assert_eq!(response.details, None);
    }
}
