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

use anyhow::Context;
use clap::Args;
use secret_stake::{format::format_token_amount, Deployment, PlatformReader, RelayerConfig};

use crate::{
    commands::get_pending_rewards::decrypt_or_zero,
    config::{resolve_deployment, GlobalConfig},
};

/// Command to decrypt the total amount staked on the platform.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct GetTotalStaked {
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl GetTotalStaked {
    /// Run the [GetTotalStaked] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let handle = reader.total_staked().await.context("unable to load total staked")?;

        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let total = decrypt_or_zero(&decryptor, handle, deployment.platform_address).await?;

        tracing::info!("SecretStakePlatform   : {}", deployment.platform_address);
        tracing::info!("Encrypted total staked: {handle}");
        tracing::info!("Total staked          : {} cUSDT", format_token_amount(total));
        Ok(())
    }
}
