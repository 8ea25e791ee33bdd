use std::sync::Arc;

use todo_core::{MemoryStore, SystemClock, TodoRepository, TodoStore};
use todo_server::config::{AppConfig, StoreKind};
use todo_server::mongo::{self, MongoStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let (store, client) = match config.store {
        StoreKind::Mongo => {
            let client = mongo::connect(&config.mongodb_uri, &config.mongodb_database).await?;
            tracing::info!(database = %config.mongodb_database, "connected to MongoDB");
            let store: Arc<dyn TodoStore> = Arc::new(MongoStore::new(&client.database(&config.mongodb_database)));
            (store, Some(client))
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; todos are lost on shutdown");
            let store: Arc<dyn TodoStore> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };
    let repository = TodoRepository::new(store, Arc::new(SystemClock::default()));

    let listener = TcpListener::bind(config.server_address()).await?;
    tracing::info!("Todo API server listening on http://{}", listener.local_addr()?);

    todo_server::run(listener, repository, shutdown_signal()).await?;

    if let Some(client) = client {
        client.shutdown().await;
        tracing::info!("database connection closed");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
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
    tracing::info!("shutting down gracefully");
}
