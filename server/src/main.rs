use std::sync::Arc;

use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::{Config, Database, MemoryStore, MongoStore, StoreKind, TodoHandler, TodoStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };
    tracing::info!(store = ?config.store, address = %config.address, "Configuration loaded");

    let database = match config.store {
        StoreKind::Memory => None,
        StoreKind::Mongo => match Database::connect(&config.mongodb_uri, &config.mongodb_db).await {
            Ok(database) => Some(database),
            Err(error) => {
                tracing::error!(%error, uri = %config.mongodb_uri, "Failed to connect to MongoDB");
                std::process::exit(1);
            }
        },
    };
    let store: Arc<dyn TodoStore> = match &database {
        Some(database) => Arc::new(MongoStore::new(database)),
        None => Arc::new(MemoryStore::new()),
    };

    let listener = match TcpListener::bind(config.address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", config.address);
            std::process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let served = todo_server::run(listener, TodoHandler::new(store), shutdown_signal()).await;

    if let Some(database) = database {
        database.close().await;
    }
    if let Err(error) = served {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }
    tracing::info!("Server shutdown complete");
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
