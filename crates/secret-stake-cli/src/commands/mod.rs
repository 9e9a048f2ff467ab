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

//! Commands of the Secret Stake CLI.

mod balance_of;
mod claim_rewards;
mod estimate_rewards;
mod get_last_error;
mod get_pending_rewards;
mod get_stake_info;
mod get_total_staked;
mod get_user_info;
mod platform_info;
mod set_operator;
mod watch_rewards;

pub use balance_of::{BalanceOf, Token};
pub use claim_rewards::{claim_rewards, ClaimRewards};
pub use estimate_rewards::EstimateRewards;
pub use get_last_error::GetLastError;
pub use get_pending_rewards::GetPendingRewards;
pub use get_stake_info::GetStakeInfo;
pub use get_total_staked::GetTotalStaked;
pub use get_user_info::GetUserInfo;
pub use platform_info::PlatformInfo;
pub use set_operator::{set_operator, SetOperator};
pub use watch_rewards::WatchRewards;

use clap::Subcommand;

use crate::config::GlobalConfig;

/// Commands for interacting with the Secret Stake platform.
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Get the encrypted stake record and last claim time of an account.
    GetStakeInfo(GetStakeInfo),
    /// Decrypt the staked amount, reward debt, pending rewards and last error of an account.
    GetUserInfo(GetUserInfo),
    /// Decrypt the pending rewards computed by the platform contract.
    GetPendingRewards(GetPendingRewards),
    /// Decrypt the total amount staked on the platform.
    GetTotalStaked(GetTotalStaked),
    /// Decrypt the error code of the last operation an account performed.
    GetLastError(GetLastError),
    /// Decrypt the staked amount and estimate pending rewards locally.
    EstimateRewards(EstimateRewards),
    /// Continuously display the estimated pending rewards.
    WatchRewards(WatchRewards),
    /// Claim accrued rewards.
    ClaimRewards(ClaimRewards),
    /// Decrypt the confidential token balance of the wallet.
    BalanceOf(BalanceOf),
    /// Approve the platform as a time-boxed operator of the wallet's cUSDT.
    SetOperator(SetOperator),
    /// Print the platform's contracts and reward parameters.
    PlatformInfo(PlatformInfo),
}

impl Command {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::GetStakeInfo(cmd) => cmd.run(global_config).await,
            Self::GetUserInfo(cmd) => cmd.run(global_config).await,
            Self::GetPendingRewards(cmd) => cmd.run(global_config).await,
            Self::GetTotalStaked(cmd) => cmd.run(global_config).await,
            Self::GetLastError(cmd) => cmd.run(global_config).await,
            Self::EstimateRewards(cmd) => cmd.run(global_config).await,
            Self::WatchRewards(cmd) => cmd.run(global_config).await,
            Self::ClaimRewards(cmd) => cmd.run(global_config).await,
            Self::BalanceOf(cmd) => cmd.run(global_config).await,
            Self::SetOperator(cmd) => cmd.run(global_config).await,
            Self::PlatformInfo(cmd) => cmd.run(global_config).await,
        }
    }
}
