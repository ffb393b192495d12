mod api;
mod middleware;
mod scheduler;
mod session;

use std::sync::Arc;

use storemap_client::{DataClient, RefreshGate};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storemap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let style = storemap_core::load_map_style_or_default(&config.map_style_path)?;
    let client = DataClient::from_config(&config)?;
    let state = AppState::new(client, style);

    let initial = state.clone();
    tokio::spawn(async move {
        if let Err(e) = initial.refresh().await {
            tracing::error!(error = %e, "initial dashboard refresh failed");
        }
    });

    let mut scheduler = scheduler::build_scheduler(state.clone(), &config.refresh_cron).await?;

    let gate = Arc::clone(&state.gate);
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "storemap server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(gate))
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal(gate: Arc<RefreshGate>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install signal handler");
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

    // In-flight refreshes must not commit into a dashboard that is going away.
    gate.teardown();
    tracing::info!("received shutdown signal, starting graceful shutdown");
}
