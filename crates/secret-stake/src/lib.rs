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

//! Client-side reward estimation and decryption orchestration for the Secret Stake platform.
//!
//! Staked balances and rewards live on-chain as FHE ciphertext handles. This crate reads those
//! handles, asks a relayer to decrypt them on the user's behalf, and estimates pending rewards
//! locally so they can be displayed between on-chain reads.

pub mod contracts;
pub mod decrypt;
pub mod deployments;
pub mod estimator;
pub mod format;
pub mod reader;
pub mod record;
pub mod rewards;
pub mod session;

pub use decrypt::{DecryptAuthorization, DecryptError, Decryptor, RelayerConfig, RelayerDecryptor};
pub use deployments::Deployment;
pub use estimator::{
    DecryptOutcome, DecryptTicket, EstimatorError, EstimatorState, RewardEstimator,
};
pub use reader::{PlatformReader, ReadError, StakeReader};
pub use record::{
    CiphertextHandle, DecryptedStake, LastErrorRecord, PlatformErrorCode, StakeRecord,
};
pub use rewards::{
    compute_pending_reward, compute_pending_reward_with, AccrualModel, RATE, SECONDS_PER_DAY,
    TOKEN_DECIMALS, UNIT,
};
pub use session::{EstimatorSession, SessionConfig};

/// Current UNIX time in seconds.
pub fn now_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
