use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use ollama_mock::{router, AppState, MockConfig, MockError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scripted stand-in for a local Ollama server.
#[derive(Debug, Parser)]
#[command(name = "server", version)]
struct Args {
    /// YAML file with base settings; flags below override it.
    #[arg(long, env = "OLLAMA_MOCK_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "OLLAMA_MOCK_BIND")]
    bind: Option<String>,

    #[arg(long, env = "OLLAMA_MOCK_SCENARIOS_DIR")]
    scenarios_dir: Option<PathBuf>,

    #[arg(long, env = "OLLAMA_MOCK_DEFAULT_MODEL")]
    default_model: Option<String>,

    /// Delay per streamed token in milliseconds; zero disables pacing.
    #[arg(long, env = "OLLAMA_MOCK_TOKEN_DELAY_MS", allow_hyphen_values = true)]
    token_delay_ms: Option<i64>,

    #[arg(long, env = "OLLAMA_MOCK_TOOL_CALL_DELAY_MS", allow_hyphen_values = true)]
    tool_call_delay_ms: Option<i64>,
}

impl Args {
    fn into_config(self) -> Result<MockConfig, MockError> {
        let mut config = match &self.config {
            Some(path) => MockConfig::from_yaml_file(path)?,
            None => MockConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(dir) = self.scenarios_dir {
            config.scenarios_dir = dir;
        }
        if let Some(model) = self.default_model {
            config.default_model = model;
        }
        if let Some(delay) = self.token_delay_ms {
            config.token_delay_ms = delay;
        }
        if let Some(delay) = self.tool_call_delay_ms {
            config.tool_call_delay_ms = delay;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), MockError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ollama_mock=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse().into_config()?;
    let bind = config.bind.clone();
    tracing::info!(
        scenarios_dir = %config.scenarios_dir.display(),
        default_model = %config.default_model,
        token_delay_ms = config.token_delay_ms,
        tool_call_delay_ms = config.tool_call_delay_ms,
        "starting ollama mock"
    );

    let state = Arc::new(AppState::load(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|source| MockError::Bind {
            addr: bind.clone(),
            source,
        })?;
    tracing::info!("listening on {}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}
