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

use alloy::primitives::{address, Address};
use clap::Args;
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

/// Configuration for a deployment of the Secret Stake platform.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, Builder, Args)]
#[group(
    requires = "platform_address",
    requires = "staking_token_address",
    requires = "reward_token_address"
)]
pub struct Deployment {
    /// EIP-155 chain ID of the network.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    pub chain_id: Option<u64>,

    /// Address of the [ISecretStakePlatform] contract.
    ///
    /// [ISecretStakePlatform]: crate::contracts::ISecretStakePlatform
    #[clap(long, env, required = false, long_help = "Address of the SecretStakePlatform contract")]
    #[builder(setter(into))]
    pub platform_address: Address,

    /// Address of the confidential staking token (cUSDT).
    #[clap(long, env, required = false, long_help = "Address of the cUSDT contract")]
    #[builder(setter(into))]
    pub staking_token_address: Address,

    /// Address of the confidential reward token (cSSC).
    #[clap(long, env, required = false, long_help = "Address of the cSSC contract")]
    #[builder(setter(into))]
    pub reward_token_address: Address,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the [Deployment] for a named chain.
    pub const fn from_chain(chain: NamedChain) -> Option<Deployment> {
        match chain {
            NamedChain::Sepolia => Some(SEPOLIA),
            _ => None,
        }
    }

    /// Lookup the [Deployment] by chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        let chain = NamedChain::try_from(chain_id.into()).ok()?;
        Self::from_chain(chain)
    }
}

/// [Deployment] for the Sepolia testnet, the only network with an FHE coprocessor.
pub const SEPOLIA: Deployment = Deployment {
    chain_id: Some(NamedChain::Sepolia as u64),
    platform_address: address!("0xdb03bedd3ef00cd5a50daf4be90593fe85093e11"),
    staking_token_address: address!("0x5a4181ed6afd6e77154ab8b18eb8ff70438456ee"),
    reward_token_address: address!("0x6f8f8915053378764cecfe58bbcbaf1edc626c38"),
};
