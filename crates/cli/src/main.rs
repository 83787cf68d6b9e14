mod args;
mod presenter;
mod view;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nyaq_core::{validate_config, ConfigSource, Configuration, SearchSession, SqliteCatalog};

use args::Args;
use presenter::Presenter;

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let source = ConfigSource::standard().with_extra(args.config.iter().cloned());
    debug!("Configuration layers: {:?}", source.paths());
    let mut config = source.load().context("Failed to load configuration")?;
    for (name, value) in &args.set {
        config.set(name.as_str(), value.as_str());
    }
    for diagnostic in validate_config(&config) {
        warn!("{}", diagnostic);
    }
    info!(fingerprint = %config.fingerprint(), "Configuration loaded");

    let session = open_session(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.keywords() {
        Some(keywords) => presenter::print_search(&session, &keywords, args.page, args.json, &mut out),
        None => {
            let mut presenter = Presenter::new(session, source).with_overrides(args.set);
            presenter
                .run(io::stdin().lock(), &mut out)
                .context("Interactive session failed")
        }
    }
}

/// Logs go to stderr so result output stays clean.
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Open the configured catalog and start a session over it.
pub fn open_session(config: Configuration) -> Result<SearchSession> {
    let path = config.database_path();
    info!("Opening catalog {:?}", path);
    let catalog = SqliteCatalog::open(&path)
        .with_context(|| format!("Failed to open catalog at {:?}", path))?;
    SearchSession::new(config, Arc::new(catalog)).context("Failed to read catalog categories")
}
