//! themis-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `THEMIS_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Bootstrapping
//!
//! The first administrator is created from the command line, with the
//! password read from stdin:
//!
//! ```
//! cargo run -p themis-server -- --create-admin admin
//! ```

mod settings;

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use settings::ServerConfig;
use themis_api::{AppState, TokenIssuer};
use themis_core::{
  access::Role,
  audit::{AuditContext, AuditEvent, record_best_effort},
  credentials::hash_password,
  store::FacilityStore,
  user::{MIN_PASSWORD_LEN, NewUser},
};
use themis_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Themis visit-request server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create an admin account with a password entered on stdin, then exit.
  #[arg(long, value_name = "USERNAME")]
  create_admin: Option<String>,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)?;
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(username) = cli.create_admin {
    return create_admin(&store, username).await;
  }

  let tokens = TokenIssuer::new(server_cfg.jwt_secret.as_bytes(), server_cfg.token_ttl_secs)
    .context("invalid jwt_secret")?;
  let state = AppState {
    store:  Arc::new(store),
    tokens: Arc::new(tokens),
  };

  let app = themis_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

async fn create_admin(store: &SqliteStore, username: String) -> anyhow::Result<()> {
  let password = read_password()?;
  if password.chars().count() < MIN_PASSWORD_LEN {
    anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
  }

  let user = store
    .insert_user(NewUser {
      username:      username.trim().to_owned(),
      password_hash: hash_password(&password)?,
      role:          Role::Admin,
      email:         None,
      full_name:     None,
    })
    .await
    .with_context(|| format!("failed to create admin {username:?}"))?;

  record_best_effort(
    store,
    &AuditContext::default().as_user(user.user_id),
    AuditEvent::UserCreated,
    format!("bootstrap admin {} created from the command line", user.username),
  )
  .await;

  tracing::info!(user_id = %user.user_id, "created admin {}", user.username);
  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
