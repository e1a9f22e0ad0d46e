mod args;
mod commands;
mod prompt;
mod settings_store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use morphix_core::{
    validate_config, AutoAccept, Config, ConsentPrompt, ConversionContext, SettingsProvider,
};

use args::{CliArgs, CliCommand};
use prompt::TermPrompt;
use settings_store::FileSettings;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,morphix_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = CliArgs::parse();
    let term = Term::stdout();

    // Determine config path: flag, then env, then a config.toml next to
    // the invocation if present.
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("MORPHIX_CONFIG").map(PathBuf::from).ok())
        .or_else(|| {
            let default = PathBuf::from("config.toml");
            default.exists().then_some(default)
        });

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Config::load(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => Config::from_env().context("Failed to read configuration overrides")?,
    };

    if let CliCommand::Convert {
        output_dir: Some(ref output_dir),
        ..
    } = cli.command
    {
        config.orchestrator.output_dir = output_dir.clone();
    }

    validate_config(&config).context("Configuration validation failed")?;

    let settings: Arc<dyn SettingsProvider> = Arc::new(FileSettings::load(config.settings.clone()));
    let prompt: Arc<dyn ConsentPrompt> = if cli.assume_yes {
        Arc::new(AutoAccept)
    } else {
        Arc::new(TermPrompt::new(term.clone()))
    };

    let context = ConversionContext::new(&config, settings, prompt);
    context.init().await;

    let outcome = match cli.command {
        CliCommand::Convert { inputs, to, .. } => {
            commands::command_convert(&term, &context, inputs, to).await
        }
        CliCommand::Formats => commands::command_formats(&term, &context),
    };

    context.teardown().await;
    outcome
}
