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

use alloy::primitives::Address;
use anyhow::Context;
use clap::Args;
use secret_stake::{
    format::format_token_amount, Deployment, PlatformReader, RelayerConfig, StakeReader,
};

use crate::{
    commands::{
        get_last_error::decrypt_error_code, get_pending_rewards::decrypt_or_zero,
        get_stake_info::format_timestamp,
    },
    config::{resolve_deployment, GlobalConfig},
};

/// Command to decrypt everything the platform stores about an account.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct GetUserInfo {
    /// Address to read. Defaults to the configured wallet.
    pub account: Option<Address>,
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl GetUserInfo {
    /// Run the [GetUserInfo] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.account_or_signer(self.account)?;
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;
        let platform = deployment.platform_address;

        let reader = PlatformReader::new(platform, provider);
        let record = reader
            .stake_record(account)
            .await
            .with_context(|| format!("unable to load stake info for {account}"))?;
        let pending = reader.pending_rewards(account).await?;
        let last_error = reader.last_error(account).await?;

        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let staked = decrypt_or_zero(&decryptor, record.staked_amount, platform).await?;
        let reward_debt = decrypt_or_zero(&decryptor, record.reward_debt, platform).await?;
        let pending = decrypt_or_zero(&decryptor, pending, platform).await?;
        let code = decrypt_error_code(&decryptor, last_error, platform).await?;

        tracing::info!("Account         : {account}");
        tracing::info!("Staked amount   : {} cUSDT", format_token_amount(staked));
        tracing::info!("Reward debt     : {} cSSC", format_token_amount(reward_debt));
        tracing::info!("Pending rewards : {} cSSC", format_token_amount(pending));
        tracing::info!("Last claim time : {}", format_timestamp(record.last_claim_time)?);
        tracing::info!(
            "Last error      : {code} at {}",
            format_timestamp(last_error.timestamp)?
        );
        Ok(())
    }
}
