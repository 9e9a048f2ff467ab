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
    Decryptor, Deployment, LastErrorRecord, PlatformErrorCode, PlatformReader, RelayerConfig,
};

use crate::{
    commands::{get_pending_rewards::decrypt_or_zero, get_stake_info::format_timestamp},
    config::{resolve_deployment, GlobalConfig},
};

/// Command to decrypt the error code of the last operation an account performed.
///
/// Confidential transfers cannot revert on an encrypted condition, so the platform records a
/// per-account error code instead.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct GetLastError {
    /// Address to read the last error for. Defaults to the configured wallet.
    pub account: Option<Address>,
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl GetLastError {
    /// Run the [GetLastError] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.account_or_signer(self.account)?;
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let last_error = reader
            .last_error(account)
            .await
            .with_context(|| format!("unable to load last error for {account}"))?;

        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let code = decrypt_error_code(&decryptor, last_error, deployment.platform_address).await?;

        tracing::info!("Encrypted error: {}", last_error.error);
        tracing::info!("Last error     : {code}");
        tracing::info!("Recorded at    : {}", format_timestamp(last_error.timestamp)?);
        Ok(())
    }
}

/// Decrypt and decode the error code of `last_error`. A zero handle means no error.
pub(crate) async fn decrypt_error_code(
    decryptor: &impl Decryptor,
    last_error: LastErrorRecord,
    platform_address: Address,
) -> anyhow::Result<PlatformErrorCode> {
    let code = decrypt_or_zero(decryptor, last_error.error, platform_address).await?;
    Ok(PlatformErrorCode::from(code))
}
