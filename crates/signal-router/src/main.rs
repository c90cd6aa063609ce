//! Signal Router
//!
//! WebSocket signaling server for peer-to-peer call setup.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize Prometheus metrics recorder
//! 3. Spawn the router actor
//! 4. Compose the app router (`/ws`, health endpoints, `/metrics`)
//! 5. Bind the listener and mark ready
//! 6. Wait for shutdown signal, then drain gracefully

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use signal_router::actors::{RouterActor, RouterMetrics};
use signal_router::config::Config;
use signal_router::observability::{health_router, HealthState};
use signal_router::ws::{ws_router, WsState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_router=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Signal Router");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        instance_id = %config.instance_id,
        bind_address = %config.bind_address,
        router_mailbox = config.router_mailbox,
        connection_buffer = config.connection_buffer,
        "Configuration loaded successfully"
    );

    // Initialize Prometheus metrics recorder before any metrics are recorded
    let prometheus_handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        error!(error = %e, "Failed to install Prometheus metrics recorder");
        format!("Failed to install Prometheus metrics recorder: {e}")
    })?;

    // Initialize health state
    let health_state = Arc::new(HealthState::new());

    // Spawn the router actor
    let router_metrics = RouterMetrics::new();
    let root_token = CancellationToken::new();
    let (router_handle, router_task) = RouterActor::spawn(
        config.router_mailbox,
        root_token.clone(),
        Arc::clone(&router_metrics),
    );
    info!("Router actor started");

    // Compose the app: signaling, health probes, Prometheus metrics
    let ws_state = WsState {
        router: router_handle.clone(),
        metrics: Arc::clone(&router_metrics),
        connection_buffer: config.connection_buffer,
    };

    let metrics_router = Router::new().route(
        "/metrics",
        axum::routing::get(move || {
            let handle = prometheus_handle.clone();
            async move { handle.render() }
        }),
    );

    let app = ws_router(ws_state)
        .merge(health_router(Arc::clone(&health_state)))
        .merge(metrics_router)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Bind BEFORE marking ready to fail fast on bind errors
    let bind_addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!(error = %e, addr = %config.bind_address, "Invalid bind address");
        format!("Invalid bind address: {e}")
    })?;

    let listener = tokio::net::TcpListener::bind(bind_addr).await.map_err(|e| {
        error!(error = %e, addr = %bind_addr, "Failed to bind listener");
        format!("Failed to bind listener to {bind_addr}: {e}")
    })?;
    info!(addr = %bind_addr, "Listener bound successfully");
    health_state.set_ready();

    // Serve with graceful shutdown driven by the cancellation token
    let serve_token = root_token.child_token();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        serve_token.cancelled().await;
        info!("HTTP server shutting down");
    });

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.await {
            error!(error = %e, "HTTP server failed");
        }
    });

    info!("Signal Router running - press Ctrl+C to shutdown");
    shutdown_signal().await;

    info!("Shutdown signal received, initiating graceful shutdown...");

    // Stop accepting new connections immediately
    health_state.set_not_ready();
    root_token.cancel();

    // Give in-flight connections a moment to drain
    tokio::time::sleep(Duration::from_secs(2)).await;

    let _ = server_task.await;
    let _ = router_task.await;

    info!("Signal Router shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. This is acceptable because
/// without signal handlers, we cannot gracefully shut down the service.
async fn shutdown_signal() {
    let ctrl_c = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
