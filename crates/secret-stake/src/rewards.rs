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

//! Pending reward formulas mirroring the staking contract.

use alloy::primitives::U256;
use clap::ValueEnum;

/// Decimals of both the staking token (cUSDT) and the reward token (cSSC).
pub const TOKEN_DECIMALS: u8 = 6;
/// Staked amount, in base units, that earns [RATE] per day (10,000 cUSDT).
pub const UNIT: u64 = 10_000 * 10u64.pow(TOKEN_DECIMALS as u32);
/// Reward, in base units, earned per [UNIT] per day (1 cSSC).
pub const RATE: u64 = 10u64.pow(TOKEN_DECIMALS as u32);
pub const SECONDS_PER_DAY: u64 = 86_400;

/// How elapsed time and fractional units accrue rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AccrualModel {
    /// Proportional accrual: fractional units and partial days both earn.
    #[default]
    Continuous,
    /// Matches the contract's claim logic: only whole units staked for whole days earn.
    OnChain,
}

/// Estimate the pending reward using the [AccrualModel::Continuous] model.
///
/// `last_claim_time` of zero means the account never staked or claimed, and yields zero.
pub fn compute_pending_reward(staked_amount: u64, last_claim_time: u64, now: u64) -> u64 {
    compute_pending_reward_with(AccrualModel::Continuous, staked_amount, last_claim_time, now)
}

/// Estimate the pending reward, in reward token base units, under the given model.
pub fn compute_pending_reward_with(
    model: AccrualModel,
    staked_amount: u64,
    last_claim_time: u64,
    now: u64,
) -> u64 {
    if staked_amount == 0 || last_claim_time == 0 || now <= last_claim_time {
        return 0;
    }
    let elapsed = now - last_claim_time;

    let pending = match model {
        // staked * elapsed * RATE fits comfortably in 256 bits, so a single floor division at
        // the end keeps the result exact.
        AccrualModel::Continuous => {
            (U256::from(staked_amount) * U256::from(elapsed) * U256::from(RATE))
                / (U256::from(UNIT) * U256::from(SECONDS_PER_DAY))
        }
        AccrualModel::OnChain => {
            let units = staked_amount / UNIT;
            let days = elapsed / SECONDS_PER_DAY;
            U256::from(units) * U256::from(days) * U256::from(RATE)
        }
    };

    u64::try_from(pending).unwrap_or(u64::MAX)
}
