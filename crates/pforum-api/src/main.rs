//! pforum server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! project store and the permission database, grants any configured
//! bootstrap superadmins, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use pforum_api::{AppState, ServerConfig};
use pforum_core::{identity::IdentityRecord, lifecycle::Lifecycle};
use pforum_store_sqlite::{SqlitePermissions, SqliteStore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Project forum server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PFORUM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let permissions_path = expand_tilde(&server_cfg.permissions_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let permissions = SqlitePermissions::open(&permissions_path)
    .await
    .with_context(|| format!("failed to open permissions at {permissions_path:?}"))?;

  let lifecycle = Lifecycle::new(Arc::new(store), Arc::new(permissions));

  for user in &server_cfg.bootstrap_superadmins {
    let grantee = IdentityRecord::new(user.user_id, user.user_name.clone())
      .with_context(|| format!("invalid bootstrap superadmin {}", user.user_id))?;
    lifecycle
      .bootstrap_superadmin(grantee)
      .await
      .with_context(|| format!("failed to bootstrap superadmin {}", user.user_id))?;
  }

  let state = AppState { lifecycle };

  let app = pforum_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
