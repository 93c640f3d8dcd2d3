use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrkey_api::config::ServerConfig;
use hrkey_api::gate::ConsentGate;
use hrkey_api::router::build_app_router;
use hrkey_api::services::{
    Ed25519Verifier, PgReferenceStore, PgSignerDirectory, SmtpNotifier,
};
use hrkey_api::state::AppState;
use hrkey_api::{background, services};
use hrkey_db::pricing::PricingCatalog;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hrkey_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = hrkey_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    hrkey_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    hrkey_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let directory: Arc<dyn services::SignerDirectory> =
        Arc::new(PgSignerDirectory::new(pool.clone()));
    let references: Arc<dyn services::ReferenceStore> =
        Arc::new(PgReferenceStore::new(pool.clone()));
    let verifier: Arc<dyn services::SignatureVerifier> = Arc::new(Ed25519Verifier);
    let notifier: Arc<dyn services::Notifier> = Arc::new(SmtpNotifier::from_env());

    let gate = Arc::new(ConsentGate::new(Arc::clone(&directory), verifier));
    let pricing = Arc::new(PricingCatalog::new(Duration::from_secs(
        config.pricing_cache_ttl_secs,
    )));

    // Warm the pricing cache; an empty pricing table is not fatal at boot.
    if let Err(e) = pricing.reload(&pool).await {
        tracing::warn!(error = %e, "Pricing cache warm-up failed");
    }

    // --- Revenue reconciler ---
    let reconciler_cancel = CancellationToken::new();
    let reconciler_handle = tokio::spawn(background::revenue_reconciler::run(
        pool.clone(),
        reconciler_cancel.clone(),
    ));
    tracing::info!("Revenue reconciler spawned");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pricing,
        gate,
        directory,
        references,
        notifier,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reconciler_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reconciler_handle).await;
    tracing::info!("Revenue reconciler stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
