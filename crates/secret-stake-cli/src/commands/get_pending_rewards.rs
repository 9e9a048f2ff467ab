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
    format::format_token_amount, CiphertextHandle, Decryptor, Deployment, PlatformReader,
    RelayerConfig,
};

use crate::config::{resolve_deployment, GlobalConfig};

/// Command to decrypt the pending rewards computed by the platform contract.
///
/// Unlike `estimate-rewards`, this reads the authoritative value from the contract.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct GetPendingRewards {
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl GetPendingRewards {
    /// Run the [GetPendingRewards] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.require_private_key()?.address();
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let handle = reader
            .pending_rewards(account)
            .await
            .with_context(|| format!("unable to load pending rewards for {account}"))?;

        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let pending =
            decrypt_or_zero(&decryptor, handle, deployment.platform_address).await?;

        tracing::info!("Encrypted pending rewards: {handle}");
        tracing::info!("Pending rewards          : {} cSSC", format_token_amount(pending));
        Ok(())
    }
}

/// Decrypt `handle`, short-circuiting the zero handle to zero without contacting the relayer.
pub(crate) async fn decrypt_or_zero(
    decryptor: &impl Decryptor,
    handle: CiphertextHandle,
    contract_address: Address,
) -> anyhow::Result<u64> {
    if handle.is_zero() {
        return Ok(0);
    }
    decryptor
        .user_decrypt(handle, contract_address)
        .await
        .with_context(|| format!("failed to decrypt handle {handle}"))
}
