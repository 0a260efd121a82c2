//! udp-to-metrics
//!
//! - UDP receiver: one JSON metric update per datagram
//! - HTTP `/metrics`: Prometheus text exposition of everything received
//! - Ctrl-C / SIGTERM stops both

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use udpmetrics_core::error::{BridgeError, Result};
use udpmetrics_gateway::{app_state::AppState, cli::Args, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "udp-to-metrics failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = args.into_config()?;
    let definitions = config::load_definitions_from_file(&cfg.metrics_file)?;
    let http_addr = cfg.exposition_addr()?;
    let udp_addr = cfg.receiver_addr()?;

    tracing::info!(
        namespace = %cfg.defaults.namespace,
        subsystem = %cfg.defaults.subsystem,
        definitions = definitions.len(),
        "initializing receiver"
    );
    let state = AppState::new(cfg, definitions)?;
    let receiver = state.receiver()?;

    let (cancel_tx, cancel_rx) = watch::channel(false);

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(%http_addr, "exposition endpoint starting");
    let app = router::build_router(state);
    let mut http_cancel = cancel_rx.clone();
    let mut http = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = http_cancel.wait_for(|c| *c).await;
            })
            .await
    });

    let mut udp = tokio::spawn(receiver.serve(udp_addr, cancel_rx));

    // Either task ending before a signal is a failure.
    let early = tokio::select! {
        _ = shutdown_signal() => None,
        res = &mut udp => Some(join_err("receiver", res)),
        res = &mut http => Some(join_err("exposition endpoint", res.map(|r| r.map_err(BridgeError::from)))),
    };

    let _ = cancel_tx.send(true);
    if let Some(e) = early {
        return Err(e);
    }

    join_result("receiver", udp.await)?;
    join_result("exposition endpoint", http.await.map(|r| r.map_err(BridgeError::from)))?;
    tracing::info!("shutdown complete");
    Ok(())
}

fn join_result(task: &str, res: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match res {
        Ok(inner) => inner,
        Err(e) => Err(BridgeError::Io(format!("{task} task failed: {e}"))),
    }
}

fn join_err(task: &str, res: std::result::Result<Result<()>, tokio::task::JoinError>) -> BridgeError {
    match join_result(task, res) {
        Ok(()) => BridgeError::Io(format!("{task} stopped unexpectedly")),
        Err(e) => e,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
