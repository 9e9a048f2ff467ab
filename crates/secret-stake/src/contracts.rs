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

//! Smart contract interfaces for the Secret Stake platform and its confidential tokens.

use std::fmt::Debug;

use alloy::{
    rpc::types::{Log, TransactionReceipt},
    sol_types::SolEvent,
};
use anyhow::{anyhow, bail, Context, Result};

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface ISecretStakePlatform {
        event RewardClaimed(address indexed user, uint256 blockNumber);

        function getStakeRecord(address user)
            external
            view
            returns (bytes32 stakedAmount, bytes32 rewardDebt, uint64 lastClaimTime);
        function getUserStakedAmount(address user) external view returns (bytes32);
        function getUserRewardDebt(address user) external view returns (bytes32);
        function getTotalStaked() external view returns (bytes32);
        function getLastError(address user) external view returns (bytes32 error, uint256 timestamp);
        function pendingRewards(address user) external view returns (bytes32);
        function stakingToken() external view returns (address);
        function rewardToken() external view returns (address);
        function claimRewards() external;
    }
}

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface IConfidentialToken {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function confidentialBalanceOf(address account) external view returns (bytes32);
        function setOperator(address operator, uint48 until) external;
        function isOperator(address holder, address spender) external view returns (bool);
    }
}

/// Decode the one `E` event in `receipt`, failing if it is missing or emitted more than once.
pub fn extract_tx_log<E: SolEvent + Debug + Clone>(receipt: &TransactionReceipt) -> Result<Log<E>> {
    let mut matching = receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.topic0() == Some(&E::SIGNATURE_HASH));

    let log = matching.next().ok_or_else(|| {
        anyhow!("transaction {} did not emit {}", receipt.transaction_hash, E::SIGNATURE)
    })?;
    if matching.next().is_some() {
        bail!("transaction {} emitted {} more than once", receipt.transaction_hash, E::SIGNATURE);
    }
    log.log_decode::<E>().with_context(|| format!("failed to decode event {}", E::SIGNATURE))
}
