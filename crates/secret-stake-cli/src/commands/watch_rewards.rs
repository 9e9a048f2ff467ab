// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{future::Future, io, time::Duration};

use clap::Args;
use secret_stake::{
    now_timestamp, AccrualModel, Deployment, EstimatorSession, EstimatorState, PlatformReader,
    RelayerConfig, RewardEstimator, SessionConfig,
};

use crate::config::{resolve_deployment, GlobalConfig};

/// Command to continuously display the estimated pending reward until interrupted.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct WatchRewards {
    /// Reward accrual model used for the estimate.
    #[clap(long, value_enum, default_value_t = AccrualModel::Continuous)]
    pub accrual_model: AccrualModel,
    /// Seconds between re-reads of the stake record.
    #[clap(long, default_value_t = 30)]
    pub refresh_interval: u64,
    /// Do not decrypt the staked amount; the estimate stays masked.
    #[clap(long)]
    pub no_decrypt: bool,
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl WatchRewards {
    /// Run the [WatchRewards] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.require_private_key()?.address();
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let estimator = RewardEstimator::new(account, deployment.platform_address)
            .with_model(self.accrual_model);
        let config = SessionConfig {
            refresh_interval: Duration::from_secs(self.refresh_interval.max(1)),
            auto_decrypt: !self.no_decrypt,
            ..Default::default()
        };

        tracing::info!(%account, "Watching pending rewards; press Ctrl-C to stop");
        let mut last_error = None;
        EstimatorSession::new(estimator, &reader, &decryptor, config)
            .run(
                now_timestamp,
                |est| {
                    if est.last_error() != last_error.as_deref() {
                        if let Some(err) = est.last_error() {
                            tracing::warn!("{err}");
                        }
                        last_error = est.last_error().map(str::to_string);
                    }
                    let status = match est.state() {
                        EstimatorState::Decrypting => " (decrypting)",
                        _ => "",
                    };
                    tracing::info!(
                        "Staked: {} cUSDT | Pending: ~{} cSSC{status}",
                        est.staked_display(),
                        est.estimate_display()
                    );
                },
                shutdown_signal(tokio::signal::ctrl_c()),
            )
            .await;

        Ok(())
    }
}

/// Resolves when `signal` fires. If listening fails the watch keeps running until killed.
async fn shutdown_signal(signal: impl Future<Output = io::Result<()>>) {
    if let Err(err) = signal.await {
        tracing::error!("Failed to listen for Ctrl-C, stop the process to exit: {err}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        tokio::time::timeout(Duration::from_secs(1), shutdown_signal(async { Ok(()) }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_signal_listener_does_not_shut_down() {
        let shutdown = shutdown_signal(async { Err(io::Error::other("no signal handler")) });
        assert!(tokio::time::timeout(Duration::from_millis(50), shutdown).await.is_err());
    }
}
