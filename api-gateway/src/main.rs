//! Ledger API server

use std::path::PathBuf;
use std::sync::Arc;

use account_service::{AccountService, AccountServiceConfig, StorageBackend};
use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

/// Account ledger API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, overrides HOST and PORT
    #[clap(short, long)]
    addr: Option<String>,

    /// Storage backend: memory or file
    #[clap(short, long)]
    storage: Option<StorageBackend>,

    /// Journal file used by the file backend
    #[clap(short, long)]
    journal_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    // Resolve configuration, command line taking precedence over the environment
    let app_config = AppConfig::new();
    let mut service_config = AccountServiceConfig::from_env()?;
    if let Some(storage) = args.storage {
        service_config.storage = storage;
    }
    if let Some(path) = args.journal_path {
        service_config.journal_path = path;
    }

    let addr: std::net::SocketAddr = match args.addr {
        Some(addr) => addr.parse()?,
        None => app_config.addr()?,
    };

    // Initialize services
    let account_service = Arc::new(AccountService::with_config(&service_config).await?);
    match service_config.storage {
        StorageBackend::Memory => info!("Using in-memory account storage"),
        StorageBackend::File => info!("Using journal {}", service_config.journal_path.display()),
    }

    let state = Arc::new(AppState::new(account_service));
    let app = router(state, log_level);

    // Start the server
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
