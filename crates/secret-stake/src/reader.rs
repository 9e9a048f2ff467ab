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

//! Read access to stake records on the platform contract.

use alloy::{
    primitives::Address,
    providers::Provider,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::{
    contracts::{IConfidentialToken, ISecretStakePlatform},
    record::{CiphertextHandle, LastErrorRecord, StakeRecord},
};

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("read failed: {0}")]
    Other(String),
}

/// Source of [StakeRecord]s, keyed by account.
#[async_trait]
pub trait StakeReader: Send + Sync {
    async fn stake_record(&self, account: Address) -> Result<StakeRecord, ReadError>;
}

/// [StakeReader] backed by the `ISecretStakePlatform` contract.
#[derive(Clone, Debug)]
pub struct PlatformReader<P> {
    platform: ISecretStakePlatform::ISecretStakePlatformInstance<P>,
}

impl<P: Provider> PlatformReader<P> {
    pub fn new(platform_address: Address, provider: P) -> Self {
        Self { platform: ISecretStakePlatform::new(platform_address, provider) }
    }

    pub fn address(&self) -> Address {
        *self.platform.address()
    }

    /// Encrypted total amount staked across all accounts.
    pub async fn total_staked(&self) -> Result<CiphertextHandle, ReadError> {
        let handle = self.platform.getTotalStaked().call().await?;
        Ok(handle.into())
    }

    /// Encrypted error code of the last operation `account` performed.
    pub async fn last_error(&self, account: Address) -> Result<LastErrorRecord, ReadError> {
        let result = self.platform.getLastError(account).call().await?;
        Ok(LastErrorRecord {
            error: result.error.into(),
            timestamp: u64::try_from(result.timestamp).unwrap_or(u64::MAX),
        })
    }

    /// Encrypted pending reward as computed by the contract itself.
    pub async fn pending_rewards(&self, account: Address) -> Result<CiphertextHandle, ReadError> {
        let handle = self.platform.pendingRewards(account).call().await?;
        Ok(handle.into())
    }
}

#[async_trait]
impl<P: Provider> StakeReader for PlatformReader<P> {
    async fn stake_record(&self, account: Address) -> Result<StakeRecord, ReadError> {
        let result = self.platform.getStakeRecord(account).call().await?;
        tracing::trace!(%account, ?result, "Read stake record");
        Ok(StakeRecord {
            staked_amount: result.stakedAmount.into(),
            reward_debt: result.rewardDebt.into(),
            last_claim_time: result.lastClaimTime,
        })
    }
}

/// Encrypted balance of `account` on a confidential token.
pub async fn confidential_balance_of(
    provider: impl Provider,
    token_address: Address,
    account: Address,
) -> Result<CiphertextHandle, ReadError> {
    let token = IConfidentialToken::new(token_address, provider);
    let handle = token.confidentialBalanceOf(account).call().await?;
    Ok(handle.into())
}
