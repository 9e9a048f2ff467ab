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
use chrono::DateTime;
use clap::Args;
use secret_stake::{Deployment, PlatformReader, StakeReader, StakeRecord};

use crate::config::{resolve_deployment, GlobalConfig};

/// Command to read the encrypted stake record of an account.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct GetStakeInfo {
    /// Address to read the stake record for. Defaults to the configured wallet.
    pub account: Option<Address>,
    /// Configuration for the Secret Stake deployment to use.
    #[clap(flatten, next_help_heading = "Secret Stake Deployment")]
    pub deployment: Option<Deployment>,
}

impl GetStakeInfo {
    /// Run the [GetStakeInfo] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.connect().await?;
        let account = global_config.account_or_signer(self.account)?;
        let (deployment, _) = resolve_deployment(&provider, self.deployment.as_ref()).await?;

        let reader = PlatformReader::new(deployment.platform_address, provider);
        let record = reader
            .stake_record(account)
            .await
            .with_context(|| format!("unable to load stake info for {account}"))?;

        tracing::info!("SecretStakePlatform: {}", deployment.platform_address);
        for line in describe_record(&record)? {
            tracing::info!("{line}");
        }
        Ok(())
    }
}

/// Human-readable lines describing a stake record.
pub(crate) fn describe_record(record: &StakeRecord) -> anyhow::Result<Vec<String>> {
    let mut lines = vec![
        format!("Encrypted staked amount: {}", record.staked_amount),
        format!("Encrypted reward debt  : {}", record.reward_debt),
    ];
    if record.is_empty() {
        lines.push("Clear staked amount    : 0".to_string());
    }
    lines.push(format!("Last claim time        : {}", format_timestamp(record.last_claim_time)?));
    Ok(lines)
}

pub(crate) fn format_timestamp(timestamp: u64) -> anyhow::Result<String> {
    if timestamp == 0 {
        return Ok("never".to_string());
    }
    let seconds = i64::try_from(timestamp).context("timestamp out of range")?;
    let datetime = DateTime::from_timestamp(seconds, 0).context("failed to create DateTime")?;
    Ok(format!("{} UTC", datetime.format("%Y-%m-%d %H:%M:%S")))
}
