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

use anyhow::{bail, Context};
use clap::Args;
use secret_stake::{
    now_timestamp, AccrualModel, DecryptOutcome, Deployment, PlatformReader, RelayerConfig,
    RewardEstimator,
};

use crate::{
    commands::get_stake_info::format_timestamp,
    config::{resolve_deployment, GlobalConfig},
};

/// Command to decrypt the staked amount once and estimate the pending reward locally.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct EstimateRewards {
    /// Reward accrual model used for the estimate.
    #[clap(long, value_enum, default_value_t = AccrualModel::Continuous)]
    pub accrual_model: AccrualModel,
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl EstimateRewards {
    /// Run the [EstimateRewards] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.require_private_key()?.address();
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;

        let mut estimator = RewardEstimator::new(account, deployment.platform_address)
            .with_model(self.accrual_model);
        estimator.refresh(&reader, now_timestamp()).await?;
        if let Some(DecryptOutcome::Failed) = estimator.decrypt(&decryptor, now_timestamp).await {
            bail!("{}", estimator.last_error().unwrap_or("decryption failed"));
        }

        let record = estimator.record().context("stake record was not loaded")?;
        tracing::info!("Staked amount    : {} cUSDT", estimator.staked_display());
        tracing::info!("Last claim time  : {}", format_timestamp(record.last_claim_time)?);
        tracing::info!(
            "Pending rewards  : ~{} cSSC (estimate, {:?} accrual)",
            estimator.estimate_display(),
            self.accrual_model
        );
        Ok(())
    }
}
