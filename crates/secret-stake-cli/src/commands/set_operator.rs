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
    primitives::{aliases::U48, Address},
    providers::Provider,
};
use anyhow::{ensure, Context};
use clap::Args;
use secret_stake::{contracts::IConfidentialToken, now_timestamp, Deployment, SECONDS_PER_DAY};

use crate::{
    commands::get_stake_info::format_timestamp,
    config::{resolve_deployment, GlobalConfig},
};

/// Command to approve the platform as a time-boxed operator of the wallet's cUSDT.
///
/// The platform can only move staked cUSDT while this approval is active.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct SetOperator {
    /// Number of days the approval remains valid.
    #[clap(long, default_value_t = 30)]
    pub days: u64,
    /// Operator to approve. Defaults to the platform contract.
    #[clap(long)]
    pub operator: Option<Address>,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl SetOperator {
    /// Run the [SetOperator] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        ensure!(self.days > 0, "Approval must last at least one day");
        let provider = global_config.connect_with_signer().await?;
        let holder = global_config.require_private_key()?.address();
        let (deployment, _) = resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let operator = self.operator.unwrap_or(deployment.platform_address);
        let until = approval_expiry(now_timestamp(), self.days)?;
        set_operator(
            provider,
            deployment.staking_token_address,
            holder,
            operator,
            until,
            global_config,
        )
        .await?;
        tracing::info!("Approved {operator} as cUSDT operator until {}", format_timestamp(until)?);
        Ok(())
    }
}

/// UNIX time `days` whole days after `now`.
fn approval_expiry(now: u64, days: u64) -> anyhow::Result<u64> {
    days.checked_mul(SECONDS_PER_DAY)
        .and_then(|duration| now.checked_add(duration))
        .context("approval duration is too long")
}

/// Grant `operator` approval over `holder`'s tokens until `until`, then confirm it on-chain.
pub async fn set_operator(
    provider: impl Provider,
    token_address: Address,
    holder: Address,
    operator: Address,
    until: u64,
    global_config: &GlobalConfig,
) -> anyhow::Result<()> {
    let token = IConfidentialToken::new(token_address, provider);
    let until = U48::try_from(until).ok().context("approval expiry does not fit in 48 bits")?;
    let tx_result = token
        .setOperator(operator, until)
        .send()
        .await
        .context("Failed to send setOperator transaction")?;

    let tx_hash = tx_result.tx_hash();
    tracing::info!(%tx_hash, "Sent transaction for setOperator");

    let timeout = global_config.tx_timeout.or(tx_result.timeout());
    let tx_receipt = tx_result
        .with_timeout(timeout)
        .get_receipt()
        .await
        .context("Failed to receive receipt setOperator transaction")?;
    ensure!(
        tx_receipt.status(),
        "setOperator transaction failed: tx_hash = {}",
        tx_receipt.transaction_hash
    );

    let approved = token.isOperator(holder, operator).call().await?;
    ensure!(approved, "{operator} is not an operator of {holder} after setOperator");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_expiry() {
        assert_eq!(approval_expiry(1_000, 30).unwrap(), 1_000 + 30 * SECONDS_PER_DAY);
        assert!(approval_expiry(1_000, u64::MAX).is_err());
        assert!(approval_expiry(u64::MAX - 10, 1).is_err());
    }
}
