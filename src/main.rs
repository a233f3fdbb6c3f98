//! contract-intake - Entry point for the contract intake pipeline

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use contract_intake::cli::{Cli, Commands};
use contract_intake::config::Settings;
use contract_intake::providers::ai::AnthropicExtractor;
use contract_intake::providers::email::{GmailCredentials, GmailProvider};
use contract_intake::server;
use contract_intake::services::{IntakeService, IntakeSettings};
use contract_intake::storage::{KeychainAccess, SqliteRowStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Commands::Run => run(&settings).await,
        Commands::Serve { bind } => serve(&settings, bind).await,
        Commands::Setup {
            api_key,
            gmail_credentials,
        } => setup(&settings, api_key, gmail_credentials).await,
    }
}

async fn open_store(settings: &Settings) -> Result<SqliteRowStore> {
    let path = settings.database_path()?;
    tracing::info!(path = %path.display(), "Opening row store");
    SqliteRowStore::open(&path)
        .await
        .with_context(|| format!("failed to open row store at {}", path.display()))
}

async fn run(settings: &Settings) -> Result<()> {
    let keychain = KeychainAccess::new();

    let api_key = match &settings.anthropic.api_key {
        Some(key) => key.clone(),
        None => keychain
            .require(api_key_entry(settings))
            .await
            .context("no ANTHROPIC_API_KEY set and no API key in the keychain; run `setup --api-key`")?,
    };

    let mut extractor = AnthropicExtractor::new(api_key, &settings.anthropic.model)
        .with_max_tokens(settings.anthropic.max_tokens);
    if let Some(base_url) = &settings.anthropic.base_url {
        extractor = extractor.with_base_url(base_url);
    }

    let credentials: GmailCredentials = keychain
        .require_json(KeychainAccess::GMAIL_CREDENTIALS)
        .await
        .context("no Gmail credentials in the keychain; run `setup --gmail-credentials`")?;
    let mut gmail = GmailProvider::with_credentials(credentials);
    gmail.authenticate().await.context("Gmail authentication failed")?;

    let store = open_store(settings).await?;

    tracing::info!(
        model = %extractor.model(),
        label = %settings.inbox.label,
        "Starting contract-intake run"
    );

    let service = IntakeService::new(
        Arc::new(gmail),
        Arc::new(extractor),
        Arc::new(store),
        IntakeSettings::from(settings),
    );
    let summary = service.run().await?;

    tracing::info!(
        committed = summary.committed(),
        skipped = summary.skipped(),
        failed = summary.failures.len(),
        "Run finished"
    );
    Ok(())
}

async fn serve(settings: &Settings, bind: Option<String>) -> Result<()> {
    let store = open_store(settings).await?;
    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());

    server::serve(&bind, Arc::new(store))
        .await
        .with_context(|| format!("HTTP adapter on {} failed", bind))
}

/// Keychain entry holding the API key; `run` reads it and `setup` writes it.
fn api_key_entry(settings: &Settings) -> &str {
    &settings.anthropic.api_key_keychain_id
}

async fn setup(
    settings: &Settings,
    api_key: Option<String>,
    gmail_credentials: Option<std::path::PathBuf>,
) -> Result<()> {
    if api_key.is_none() && gmail_credentials.is_none() {
        bail!("nothing to store; pass --api-key and/or --gmail-credentials");
    }

    let keychain = KeychainAccess::new();

    if let Some(key) = api_key {
        let entry = api_key_entry(settings);
        keychain.store(entry, key.trim()).await?;
        tracing::info!(entry = %entry, "Stored Anthropic API key");
    }

    if let Some(path) = gmail_credentials {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let credentials: GmailCredentials = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid credentials file", path.display()))?;
        keychain
            .store_json(KeychainAccess::GMAIL_CREDENTIALS, &credentials)
            .await?;
        tracing::info!("Stored Gmail OAuth credentials");
    }

    Ok(())
}
