use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Settings for the outbound chat-completion call.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    /// Sent as `HTTP-Referer`.
    pub referrer_url: String,
    /// Sent as `X-Title`.
    pub app_title: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub environment: Environment,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(3000);
        let host = env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Production);

        Self {
            bind_addr: format!("{host}:{port}"),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
            environment,
            upstream: UpstreamConfig {
                base_url: env::var("OPENROUTER_BASE_URL")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
                api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
                referrer_url: env::var("REFERRER_URL")
                    .unwrap_or_else(|_| format!("http://localhost:{port}")),
                app_title: env::var("APP_NAME").unwrap_or_else(|_| "RecycleAI".to_string()),
                timeout: Duration::from_secs(
                    env::var("UPSTREAM_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(20),
                ),
            },
        }
    }
}
