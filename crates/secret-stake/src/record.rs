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

//! Stake records as read from the platform, and their decrypted counterparts.

use std::fmt;

use alloy::primitives::B256;

/// Opaque on-chain reference to an FHE ciphertext.
///
/// The all-zero handle is what the contracts return for an uninitialized encrypted value, and
/// always stands for a cleartext of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(pub B256);

impl CiphertextHandle {
    pub const ZERO: Self = Self(B256::ZERO);

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<B256> for CiphertextHandle {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staking position of a single account, owned by the platform contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StakeRecord {
    pub staked_amount: CiphertextHandle,
    pub reward_debt: CiphertextHandle,
    /// UNIX timestamp of the last claim, or zero if the account never staked.
    pub last_claim_time: u64,
}

impl StakeRecord {
    /// True when the account has no stake, without needing a decryption.
    pub fn is_empty(&self) -> bool {
        self.staked_amount.is_zero()
    }
}

/// Cleartext staked amount, tied to the handle it was decrypted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptedStake {
    pub handle: CiphertextHandle,
    pub value: u64,
}

/// Error code the platform stores for an account's most recent failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorCode {
    NoError,
    InsufficientBalance,
    InvalidAmount,
    Unknown(u64),
}

impl From<u64> for PlatformErrorCode {
    fn from(code: u64) -> Self {
        match code {
            0 => Self::NoError,
            1 => Self::InsufficientBalance,
            2 => Self::InvalidAmount,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => write!(f, "NO_ERROR"),
            Self::InsufficientBalance => write!(f, "INSUFFICIENT_BALANCE"),
            Self::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            Self::Unknown(code) => write!(f, "UNKNOWN_ERROR ({code})"),
        }
    }
}

/// Encrypted error code of an account's last operation and when it was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastErrorRecord {
    pub error: CiphertextHandle,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PlatformErrorCode::from(0), PlatformErrorCode::NoError);
        assert_eq!(PlatformErrorCode::from(1).to_string(), "INSUFFICIENT_BALANCE");
        assert_eq!(PlatformErrorCode::from(2).to_string(), "INVALID_AMOUNT");
        assert_eq!(PlatformErrorCode::from(7), PlatformErrorCode::Unknown(7));
        assert_eq!(PlatformErrorCode::from(7).to_string(), "UNKNOWN_ERROR (7)");
    }

    #[test]
    fn test_zero_handle_is_empty_stake() {
        let record = StakeRecord::default();
        assert!(record.is_empty());
        assert!(!StakeRecord {
            staked_amount: CiphertextHandle(B256::repeat_byte(1)),
            ..Default::default()
        }
        .is_empty());
    }
}
