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

//! Common configuration options for commands in the Secret Stake CLI.

use std::{num::ParseIntError, time::Duration};

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use clap::Args;
use secret_stake::{Deployment, RelayerConfig, RelayerDecryptor};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// URL of the Ethereum RPC endpoint
    #[clap(short, long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<Url>,

    /// Private key of the wallet (without 0x prefix)
    #[clap(long, env = "PRIVATE_KEY", global = true, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Ethereum transaction timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = |arg: &str| -> Result<Duration, ParseIntError> {Ok(Duration::from_secs(arg.parse()?))})]
    pub tx_timeout: Option<Duration>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "info")]
    pub log_level: LevelFilter,
}

impl GlobalConfig {
    /// Access [Self::rpc_url] or return an error that can be shown to the user.
    pub fn require_rpc_url(&self) -> Result<Url> {
        self.rpc_url
            .clone()
            .context("Blockchain RPC URL not provided; please set --rpc-url or the RPC_URL env var")
    }

    /// Access [Self::private_key] or return an error that can be shown to the user.
    pub fn require_private_key(&self) -> Result<PrivateKeySigner> {
        self.private_key.clone().context(
            "Private key not provided; please set --private-key or the PRIVATE_KEY env var",
        )
    }

    /// The account a command acts on: `account` if given, otherwise the configured wallet.
    pub fn account_or_signer(&self, account: Option<Address>) -> Result<Address> {
        match account {
            Some(account) => Ok(account),
            None => Ok(self.require_private_key()?.address()),
        }
    }

    /// Connect a read-only provider to [Self::rpc_url].
    pub async fn connect(&self) -> Result<DynProvider> {
        let rpc_url = self.require_rpc_url()?;
        let provider = ProviderBuilder::new()
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))?;
        Ok(provider.erased())
    }

    /// Connect a provider to [Self::rpc_url] that signs transactions with [Self::private_key].
    pub async fn connect_with_signer(&self) -> Result<DynProvider> {
        let tx_signer = self.require_private_key()?;
        let rpc_url = self.require_rpc_url()?;
        let provider = ProviderBuilder::new()
            .wallet(tx_signer)
            .connect(rpc_url.as_str())
            .await
            .with_context(|| format!("failed to connect provider to {rpc_url}"))?;
        Ok(provider.erased())
    }

    /// Build a [RelayerDecryptor] that authorizes requests with [Self::private_key].
    pub fn decryptor(
        &self,
        relayer: &RelayerConfig,
        chain_id: u64,
    ) -> Result<RelayerDecryptor<PrivateKeySigner>> {
        Ok(RelayerDecryptor::new(relayer.clone(), self.require_private_key()?, chain_id))
    }
}

/// Use the explicitly configured deployment, or fall back to the built-in one for the chain.
pub async fn resolve_deployment(
    provider: &impl Provider,
    deployment: Option<&Deployment>,
) -> Result<(Deployment, u64)> {
    let chain_id = provider.get_chain_id().await.context("failed to query chain ID")?;
    let deployment = deployment.cloned().or_else(|| Deployment::from_chain_id(chain_id))
        .context("could not determine Secret Stake deployment from chain ID; please specify deployment explicitly")?;
    Ok((deployment, chain_id))
}
