//! TodoDB server
//!
//! Serves the todo HTTP API over an on-disk database.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tododb_core::KvTodoRepository;
use tododb_kv::Database;
use tododb_server::{
    build_router, shutdown_signal, AppState, ServerConfig, DEFAULT_CORS_ORIGIN, DEFAULT_DATA_DIR,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Todo HTTP API backed by an embedded database.
#[derive(Parser)]
#[command(name = "tododb-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Database directory
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin", default_value = DEFAULT_CORS_ORIGIN)]
    cors_origins: Vec<String>,

    /// Acknowledge commits without syncing them to disk
    #[arg(long)]
    no_sync: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig::new(self.bind)
            .with_data_dir(self.data_dir)
            .with_cors_origins(self.cors_origins)
            .with_sync_on_commit(!self.no_sync)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.into_config();

    let db = Arc::new(Database::open_with_config(
        &config.data_dir,
        config.engine_config(),
    )?);
    let repo = Arc::new(KvTodoRepository::new(Arc::clone(&db)));
    let app = build_router(AppState::new(repo), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        address = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        "todo server started"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close()?;
    info!("todo server stopped");
    served?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
