//! Periodic synergy analysis over recorded observations
use ose_confidence::{detect_synergies, ObservationLog, SynergyPair};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of the latest completed pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyReport {
    pub passes: u64,
    pub observations: usize,
    pub pairs: Vec<SynergyPair>,
}

/// Handle to the running background job
pub struct SynergyJob {
    handle: JoinHandle<()>,
    reports: watch::Receiver<SynergyReport>,
}

impl SynergyJob {
    /// Receiver that sees every completed pass
    pub fn reports(&self) -> watch::Receiver<SynergyReport> {
        self.reports.clone()
    }

    pub fn latest(&self) -> SynergyReport {
        self.reports.borrow().clone()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// One pass over a snapshot of the log. Updates are never blocked past the copy.
pub fn run_synergy_pass(observations: &ObservationLog) -> Vec<SynergyPair> {
    let snapshot = observations.snapshot();
    let pairs = detect_synergies(&snapshot);

    for pair in &pairs {
        info!(
            first = %pair.first,
            second = %pair.second,
            together_mean = pair.together_mean,
            first_solo_mean = pair.first_solo_mean,
            second_solo_mean = pair.second_solo_mean,
            together_count = pair.together_count,
            lift = pair.lift(),
            "synergistic pattern pair"
        );
    }

    debug!(
        observations = snapshot.len(),
        pairs = pairs.len(),
        "synergy pass finished"
    );
    pairs
}

/// Spawn the background job. The first pass runs one `period` after start,
/// each on the blocking pool.
pub fn spawn_synergy_job(observations: Arc<ObservationLog>, period: Duration) -> SynergyJob {
    let (tx, reports) = watch::channel(SynergyReport::default());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut passes = 0u64;

        loop {
            ticker.tick().await;

            let log = Arc::clone(&observations);
            let pass = tokio::task::spawn_blocking(move || {
                let observed = log.len();
                (observed, run_synergy_pass(&log))
            })
            .await;

            match pass {
                Ok((observed, pairs)) => {
                    passes += 1;
                    tx.send_replace(SynergyReport {
                        passes,
                        observations: observed,
                        pairs,
                    });
                }
                Err(err) => warn!(error = %err, "synergy pass failed"),
            }
        }
    });

    SynergyJob { handle, reports }
}
