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
use clap::{Args, ValueEnum};
use secret_stake::{
    format::format_token_amount, reader::confidential_balance_of, Deployment, RelayerConfig,
};

use crate::{
    commands::get_pending_rewards::decrypt_or_zero,
    config::{resolve_deployment, GlobalConfig},
};

/// Confidential token of the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Token {
    /// Confidential USDT, the staking token.
    Cusdt,
    /// Confidential Secret Stake Coin, the reward token.
    Cssc,
}

impl Token {
    fn symbol(&self) -> &'static str {
        match self {
            Token::Cusdt => "cUSDT",
            Token::Cssc => "cSSC",
        }
    }
}

/// Command to decrypt the confidential token balance of the configured wallet.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct BalanceOf {
    /// Token to read the balance of.
    #[clap(long, value_enum, default_value_t = Token::Cusdt)]
    pub token: Token,
    /// Configuration for the FHE relayer.
    #[clap(flatten, next_help_heading = "Relayer")]
    pub relayer: RelayerConfig,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl BalanceOf {
    /// Run the [BalanceOf] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.require_private_key()?.address();
        let (deployment, chain_id) =
            resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let token_address = match self.token {
            Token::Cusdt => deployment.staking_token_address,
            Token::Cssc => deployment.reward_token_address,
        };
        let handle = confidential_balance_of(provider, token_address, account)
            .await
            .with_context(|| format!("unable to load {} balance", self.token.symbol()))?;

        let decryptor = global_config.decryptor(&self.relayer, chain_id)?;
        let balance = decrypt_or_zero(&decryptor, handle, token_address).await?;

        tracing::info!("Encrypted balance: {handle}");
        tracing::info!("Balance: {} {}", format_token_amount(balance), self.token.symbol());
        Ok(())
    }
}
