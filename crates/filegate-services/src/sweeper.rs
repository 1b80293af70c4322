//! Background sweep of abandoned confirmation tokens.

use filegate_core::constants::CONFIRMATION_SWEEP_INTERVAL;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::confirmation::ConfirmationTokenStore;

/// Periodically purges expired entries from a [`ConfirmationTokenStore`].
///
/// Only bounds memory: consuming a token already rejects expired entries.
pub struct ConfirmationSweeper {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ConfirmationSweeper {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// A zero `period` falls back to the default sweep interval.
    pub fn start(store: Arc<ConfirmationTokenStore>, period: Duration) -> Self {
        let period = if period.is_zero() {
            tracing::warn!(
                default_seconds = CONFIRMATION_SWEEP_INTERVAL.as_secs(),
                "Zero sweep interval, using the default"
            );
            CONFIRMATION_SWEEP_INTERVAL
        } else {
            period
        };
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            Self::worker_loop(store, period, shutdown_rx).await;
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    async fn worker_loop(
        store: Arc<ConfirmationTokenStore>,
        period: Duration,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut sweep_interval = interval(period);

        tracing::info!(
            interval_seconds = period.as_secs(),
            "Confirmation token sweeper started"
        );

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    store.purge_expired().await;
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Confirmation token sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// Stop the sweep loop and wait for it to exit.
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(
                error = %e,
                "Failed to send shutdown signal to confirmation token sweeper"
            );
        }

        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Confirmation token sweeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
