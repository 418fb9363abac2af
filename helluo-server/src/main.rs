use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helluo_core::{
    CollectionStore, ImageStore,
    infra::{InMemoryCollectionStore, InMemoryImageStore},
};
use helluo_server::{
    AppState, create_app,
    infra::config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions},
    storage::{CloudinaryImageStore, RedisCollectionStore},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "helluo-server")]
#[command(about = "Portfolio API: carnet ingestion, gallery admin and image uploads")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "HELLUO_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ConfigLoad {
        mut config,
        warnings,
    } = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: cli.config.clone(),
        env_file: cli.env_file.clone(),
    })
    .load()
    .context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let config = Arc::new(config);
    let (store, images) = connect_services(&config).await?;
    let state = AppState::new(Arc::clone(&config), store, images);
    let app = create_app(state);

    info!(
        "Starting Helluo server on {}:{}{}",
        config.server.host,
        config.server.port,
        if config.dev_mode { " (dev mode)" } else { "" }
    );

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .with_context(|| {
                format!(
                    "failed to bind {}:{}",
                    config.server.host, config.server.port
                )
            })?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Hosted clients when configured; in-memory stand-ins otherwise. The config
/// loader only lets a service be absent in dev mode.
async fn connect_services(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CollectionStore>, Arc<dyn ImageStore>)> {
    let store: Arc<dyn CollectionStore> = match &config.redis {
        Some(redis) => Arc::new(
            RedisCollectionStore::connect(&redis.url)
                .await
                .context("failed to connect to Redis")?,
        ),
        None => {
            warn!("using in-memory collection store; data is lost on restart");
            Arc::new(InMemoryCollectionStore::new())
        }
    };

    let images: Arc<dyn ImageStore> = match &config.cloudinary {
        Some(cloudinary) => Arc::new(
            CloudinaryImageStore::new(cloudinary)
                .context("failed to build Cloudinary client")?,
        ),
        None => {
            warn!("using in-memory image store; uploaded urls do not resolve");
            Arc::new(InMemoryImageStore::new())
        }
    };

    Ok((store, images))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
