use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commerce_services::config::Settings;
use commerce_services::notifier::{MailgunSender, MessageProcessor, NotificationConsumer};
use commerce_services::payments::PayPalClient;
use commerce_services::server::{create_app, AppState};
use commerce_services::users::PostgresUserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!("Configuration loaded");

    // Database pool; connections open lazily on first use
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .idle_timeout(Duration::from_secs(settings.database.idle_timeout))
        .connect_lazy(&settings.database.url)?;

    // Application state
    let users = Arc::new(PostgresUserStore::new(pool));
    let payments = Arc::new(PayPalClient::new(settings.paypal.clone()));
    let state = AppState::new(settings.clone(), users, payments);
    tracing::info!("Application state initialized");

    // Notification pipeline
    let sender = Arc::new(MailgunSender::new(settings.mailgun.clone())?);
    let processor = Arc::new(MessageProcessor::new(sender));
    let consumer = Arc::new(NotificationConsumer::new(
        settings.broker.clone(),
        processor,
    ));
    let shutdown_signal = consumer.shutdown_signal();

    // Start consumer in background. Reconnect exhaustion is fatal: it
    // stops the HTTP server too, so process supervision sees it.
    let consumer_clone = consumer.clone();
    let shutdown_tx = shutdown_signal.clone();
    let consumer_handle = tokio::spawn(async move {
        let result = consumer_clone.run().await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "Notification consumer failed");
            let _ = shutdown_tx.send(());
        }
        result
    });

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_signal))
        .await?;

    // Wait for the consumer to finish; propagate a fatal consumer
    // error as the process exit status.
    tracing::info!("Waiting for background tasks to finish...");
    consumer_handle.await??;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal_handler(shutdown_tx: tokio::sync::broadcast::Sender<()>) {
    let mut shutdown_rx = shutdown_tx.subscribe();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
        _ = shutdown_rx.recv() => {
            tracing::info!("Shutdown requested by background task");
        }
    }

    // Send shutdown signal to the notification consumer
    let _ = shutdown_tx.send(());
}
