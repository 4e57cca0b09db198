use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cardbus_core::gateway::CardGateway;
use cardbus_core::schema::SchemaAdapter;
use cardbus_db::{MemoryCardGateway, PgCardGateway};
use cardbus_events::{CardLifecycleManager, EventBus};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardbus_api::config::ServerConfig;
use cardbus_api::router::build_app_router;
use cardbus_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cardbus_api=debug,cardbus_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Card storage ---
    let (pool, gateway) = match &config.database_url {
        Some(database_url) => {
            let pool = cardbus_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            cardbus_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            cardbus_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            let gateway: Arc<dyn CardGateway> = Arc::new(PgCardGateway::new(pool.clone()));
            (Some(pool), gateway)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, cards are kept in memory");
            let gateway: Arc<dyn CardGateway> = Arc::new(MemoryCardGateway::new());
            (None, gateway)
        }
    };

    // --- Event bus and card lifecycle ---
    let event_bus = Arc::new(EventBus::default());
    let shutdown = CancellationToken::new();

    let manager = CardLifecycleManager::new(
        event_bus.clone(),
        gateway,
        config.lifecycle.clone(),
    );
    let consumer = manager
        .start(&shutdown)
        .await
        .context("Failed to start card lifecycle consumer")?;

    // --- App state ---
    let state = AppState {
        manager,
        event_bus: Arc::clone(&event_bus),
        adapter: SchemaAdapter::default(),
        pool,
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain, consumer.shutdown()).await {
        Ok(exit) => tracing::info!(?exit, "Card lifecycle consumer stopped"),
        Err(_) => tracing::warn!("Card lifecycle consumer did not stop in time"),
    }

    shutdown.cancel();
    event_bus.close();
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
