//! Listener, background job and graceful shutdown
use crate::config::AdvisoryConfig;
use crate::create_app;
use crate::state::AppState;
use crate::synergy::spawn_synergy_job;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Serve until SIGINT or SIGTERM, then drain in-flight requests for at most
/// `shutdown_timeout_secs`.
pub async fn run(config: AdvisoryConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;

    let synergy_job = config
        .synergy_interval()
        .map(|period| spawn_synergy_job(state.observations.clone(), period));

    let app = create_app(state, &config);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!(
        addr = %config.listen_addr,
        metrics = config.enable_metrics,
        max_concurrent_requests = config.max_concurrent_requests,
        "OSE advisory gateway listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signalled_tx.send(());
            })
            .await
    });

    tokio::select! {
        finished = &mut server => {
            finished.context("server task panicked")?.context("server error")?;
        }
        _ = signalled_rx => {
            match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
                Ok(finished) => {
                    finished.context("server task panicked")?.context("server error")?;
                }
                Err(_) => {
                    warn!(
                        timeout_secs = config.shutdown_timeout_secs,
                        "drain timed out, dropping in-flight requests"
                    );
                    server.abort();
                }
            }
        }
    }

    if let Some(job) = synergy_job {
        job.abort();
        let report = job.latest();
        info!(
            passes = report.passes,
            pairs = report.pairs.len(),
            "synergy job stopped"
        );
    }

    info!("OSE advisory gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
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
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}
