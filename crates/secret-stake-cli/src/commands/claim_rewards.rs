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

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use anyhow::{ensure, Context};
use clap::Args;
use secret_stake::{
    contracts::{extract_tx_log, ISecretStakePlatform},
    Deployment,
};

use crate::config::{resolve_deployment, GlobalConfig};

/// Command to claim accrued rewards from the platform.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct ClaimRewards {
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl ClaimRewards {
    /// Run the [ClaimRewards] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect_with_signer().await?;
        let (deployment, _) = resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let (user, block_number) =
            claim_rewards(provider, deployment.platform_address, global_config).await?;
        tracing::info!("Claimed rewards for {user} at block {block_number}");
        tracing::info!("Rewards are paid in encrypted cSSC; use `balance-of` to decrypt them");

        Ok(())
    }
}

/// Send `claimRewards()` and wait for it to be included.
pub async fn claim_rewards(
    provider: impl Provider,
    platform_address: Address,
    global_config: &GlobalConfig,
) -> anyhow::Result<(Address, U256)> {
    let platform = ISecretStakePlatform::new(platform_address, provider);
    let tx_result = platform
        .claimRewards()
        .send()
        .await
        .context("Failed to send claimRewards transaction")?;

    let tx_hash = tx_result.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for claimRewards");

    let timeout = global_config.tx_timeout.or(tx_result.timeout());
    tracing::debug!(?timeout, %tx_hash, "Waiting for transaction receipt");
    let tx_receipt = tx_result
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt claimRewards transaction")?;

    ensure!(
        tx_receipt.status(),
        "claimRewards transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let log = extract_tx_log::<ISecretStakePlatform::RewardClaimed>(&tx_receipt)?;
    Ok((log.data().user, log.data().blockNumber))
}
