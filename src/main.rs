mod cli;
mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use parley_core::bootstrap::create_provider;
use parley_core::config::{Config, ProviderKind};
use parley_core::vault::EnvVaultProvider;
use parley_core::{ChatMode, Session};
use parley_llm::LlmProvider;

use crate::cli::CliChannel;

/// Terminal chat over local or hosted LLMs with document, website, web search and SQL modes.
#[derive(Debug, Parser)]
#[command(name = "parley", version, about)]
struct Args {
    /// Config file (default: $PARLEY_CONFIG or config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in this chat mode
    #[arg(long)]
    mode: Option<ChatMode>,

    /// LLM provider: ollama or openai
    #[arg(long)]
    provider: Option<ProviderKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let args = Args::parse();

    let config_path = Config::resolve_path(args.config.as_deref());
    let mut config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(mode) = args.mode {
        config.chat.mode = mode;
    }
    if let Some(provider) = args.provider {
        config.llm.provider = provider;
    }
    config.validate()?;
    config.resolve_secrets(&EnvVaultProvider).await?;

    let kind = config.llm.provider;
    let provider = create_provider(&config, kind)?;
    tracing::info!(
        provider = %kind,
        model = provider.model(),
        mode = %config.chat.mode,
        config = %config_path.display(),
        "starting"
    );

    if let Err(e) = provider.health_check().await {
        tracing::warn!(error = %e, "provider not reachable, questions will fail until it is");
    }

    let mut session = Session::new(config, provider, kind)?;
    let mut channel = CliChannel::stdio();
    commands::repl(&mut session, &mut channel).await
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
