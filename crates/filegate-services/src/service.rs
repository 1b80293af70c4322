//! The gate together with its background sweep, built from configuration.

use filegate_core::GateConfig;

use crate::gate::AccessGate;
use crate::sweeper::ConfirmationSweeper;

/// An [`AccessGate`] whose confirmation store is swept on the configured
/// interval. Construct at service start, `shutdown` at exit.
pub struct GateService {
    gate: AccessGate,
    sweeper: ConfirmationSweeper,
}

impl GateService {
    /// Build the gate from `config` and start its sweeper on the current
    /// tokio runtime.
    pub fn start(config: &GateConfig) -> Self {
        let gate = AccessGate::from_config(config);
        let sweeper = gate.start_sweeper(config.confirm_sweep_interval);

        tracing::info!(
            ttl_seconds = config.confirm_token_ttl.as_secs(),
            sweep_interval_seconds = config.confirm_sweep_interval.as_secs(),
            enforce_upload_deadline = config.enforce_upload_deadline,
            "Access gate started"
        );

        Self { gate, sweeper }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Stop the sweeper. Clones of the gate keep working without it.
    pub async fn shutdown(self) {
        self.sweeper.shutdown().await;
        tracing::info!("Access gate stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn config_built_service_sweeps_expired_tokens() {
        let config = GateConfig {
            confirm_token_ttl: Duration::from_millis(1),
            confirm_sweep_interval: Duration::from_millis(10),
            ..GateConfig::default()
        };
        let service = GateService::start(&config);
        let store = service.gate().store().clone();

        let abandoned = store.issue("x").await.token;

        let mut swept = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if !store.contains(&abandoned).await {
                swept = true;
                break;
            }
        }
        assert!(swept, "expired token was never swept");

        service.shutdown().await;
    }
}
