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

use clap::Args;
use secret_stake::{
    contracts::ISecretStakePlatform, format::format_token_amount, Deployment, RATE, UNIT,
};

use crate::config::{resolve_deployment, GlobalConfig};

/// Command to print the platform's contracts and reward parameters.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct PlatformInfo {
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl PlatformInfo {
    /// Run the [PlatformInfo] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let platform = ISecretStakePlatform::new(deployment.platform_address, provider);
        let staking_token = platform.stakingToken().call().await?;
        let reward_token = platform.rewardToken().call().await?;
        if staking_token != deployment.staking_token_address {
            tracing::warn!(
                "Platform staking token {staking_token} differs from configured {}",
                deployment.staking_token_address
            );
        }

        tracing::info!("Chain ID            : {chain_id}");
        tracing::info!("SecretStakePlatform : {}", deployment.platform_address);
        tracing::info!("Staking token (cUSDT): {staking_token}");
        tracing::info!("Reward token (cSSC) : {reward_token}");
        tracing::info!(
            "Reward rate         : {} cSSC per {} cUSDT per day",
            format_token_amount(RATE),
            format_token_amount(UNIT)
        );
        Ok(())
    }
}
