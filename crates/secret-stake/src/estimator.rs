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

//! Per-widget reward estimator.
//!
//! A [RewardEstimator] caches the latest [StakeRecord] of one account and, once the user asks
//! for it, the decrypted staked amount. From those it derives a live estimate of the pending
//! reward. The cleartext is tied to the handle it came from: whenever a refresh yields a
//! different handle the cleartext is dropped and the estimator goes back to [Masked].
//!
//! Decryption is split into [RewardEstimator::begin_decrypt] and
//! [RewardEstimator::complete_decrypt] so that a caller can keep refreshing while a decryption
//! is outstanding. Results are only committed if they still match the current handle.
//!
//! [Masked]: EstimatorState::Masked

use alloy::primitives::Address;
use thiserror::Error;

use crate::{
    decrypt::{DecryptError, Decryptor},
    format::{format_token_amount, MASKED},
    reader::{ReadError, StakeReader},
    record::{CiphertextHandle, DecryptedStake, StakeRecord},
    rewards::{compute_pending_reward_with, AccrualModel},
};

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("unable to load stake info: {0}")]
    Read(#[from] ReadError),

    #[error("decryption failed: {0}")]
    Decrypt(#[from] DecryptError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    /// No cleartext is available.
    Masked,
    /// A decryption request is outstanding.
    Decrypting,
    /// The staked amount is known and the estimate is live.
    Revealed,
}

/// Identifies one issued decryption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptTicket {
    id: u64,
    handle: CiphertextHandle,
}

impl DecryptTicket {
    pub fn handle(&self) -> CiphertextHandle {
        self.handle
    }
}

/// What happened to a decryption result handed to [RewardEstimator::complete_decrypt].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The cleartext was cached and the estimate recomputed.
    Applied,
    /// The handle changed while the request was outstanding; the result was dropped.
    Stale,
    /// The request failed and the estimator is masked again.
    Failed,
}

#[derive(Debug)]
pub struct RewardEstimator {
    account: Address,
    platform_address: Address,
    model: AccrualModel,
    record: Option<StakeRecord>,
    decrypted: Option<DecryptedStake>,
    in_flight: Option<DecryptTicket>,
    next_ticket: u64,
    estimate: Option<u64>,
    last_error: Option<String>,
}

impl RewardEstimator {
    pub fn new(account: Address, platform_address: Address) -> Self {
        Self {
            account,
            platform_address,
            model: AccrualModel::default(),
            record: None,
            decrypted: None,
            in_flight: None,
            next_ticket: 0,
            estimate: None,
            last_error: None,
        }
    }

    pub fn with_model(self, model: AccrualModel) -> Self {
        Self { model, ..self }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn platform_address(&self) -> Address {
        self.platform_address
    }

    pub fn model(&self) -> AccrualModel {
        self.model
    }

    pub fn state(&self) -> EstimatorState {
        if self.in_flight.is_some() {
            EstimatorState::Decrypting
        } else if self.decrypted.is_some() {
            EstimatorState::Revealed
        } else {
            EstimatorState::Masked
        }
    }

    pub fn record(&self) -> Option<&StakeRecord> {
        self.record.as_ref()
    }

    /// Cleartext staked amount, if revealed.
    pub fn staked_amount(&self) -> Option<u64> {
        self.decrypted.map(|d| d.value)
    }

    /// Latest pending reward estimate, only present while revealed.
    pub fn estimate(&self) -> Option<u64> {
        self.estimate
    }

    /// Message of the most recent failure, cleared by the next successful operation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Re-read the stake record and apply it.
    ///
    /// On failure the cached record and any revealed estimate are kept as they are.
    pub async fn refresh(
        &mut self,
        reader: &(impl StakeReader + ?Sized),
        now: u64,
    ) -> Result<(), EstimatorError> {
        match reader.stake_record(self.account).await {
            Ok(record) => {
                self.apply_record(record, now);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(account = %self.account, "Failed to refresh stake record: {err}");
                let err = EstimatorError::from(err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Cache a freshly read record, dropping cleartext that no longer matches its handle.
    pub fn apply_record(&mut self, record: StakeRecord, now: u64) {
        let handle = record.staked_amount;
        self.record = Some(record);

        if self.in_flight.is_some_and(|ticket| ticket.handle != handle) {
            tracing::debug!(%handle, "Stake handle changed while decrypting; result will be ignored");
            self.in_flight = None;
        }
        if self.decrypted.is_some_and(|d| d.handle != handle) {
            tracing::debug!(%handle, "Stake handle changed; masking cached cleartext");
            self.decrypted = None;
        }
        if handle.is_zero() {
            // A zero handle is a known zero balance, no decryption needed.
            self.in_flight = None;
            self.decrypted = Some(DecryptedStake { handle, value: 0 });
        }

        self.tick(now);
    }

    /// Start a decryption of the current staked handle.
    ///
    /// Returns `None` when there is nothing to request: no record loaded yet, a request is
    /// already outstanding, or the value is already revealed.
    pub fn begin_decrypt(&mut self) -> Option<DecryptTicket> {
        let record = self.record?;
        if self.in_flight.is_some() {
            tracing::debug!(account = %self.account, "Decryption already in flight");
            return None;
        }
        if self.decrypted.is_some() {
            return None;
        }

        let ticket = DecryptTicket { id: self.next_ticket, handle: record.staked_amount };
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.last_error = None;
        tracing::debug!(handle = %ticket.handle, "Issuing decryption request");
        Some(ticket)
    }

    /// Commit the result of the request identified by `ticket`.
    pub fn complete_decrypt(
        &mut self,
        ticket: DecryptTicket,
        result: Result<u64, DecryptError>,
        now: u64,
    ) -> DecryptOutcome {
        if self.in_flight != Some(ticket) {
            tracing::debug!(handle = %ticket.handle, "Discarding stale decryption result");
            return DecryptOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(value) => {
                self.decrypted = Some(DecryptedStake { handle: ticket.handle, value });
                self.tick(now);
                DecryptOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(handle = %ticket.handle, "Decryption failed: {err}");
                self.last_error = Some(EstimatorError::from(err).to_string());
                DecryptOutcome::Failed
            }
        }
    }

    /// Decrypt the current staked handle and wait for the result.
    ///
    /// Returns `None` when no request was issued (see [Self::begin_decrypt]).
    pub async fn decrypt(
        &mut self,
        decryptor: &(impl Decryptor + ?Sized),
        now: impl FnOnce() -> u64,
    ) -> Option<DecryptOutcome> {
        let ticket = self.begin_decrypt()?;
        let result = decryptor.user_decrypt(ticket.handle, self.platform_address).await;
        Some(self.complete_decrypt(ticket, result, now()))
    }

    /// Recompute the estimate from cached values. Performs no I/O.
    pub fn tick(&mut self, now: u64) -> Option<u64> {
        self.estimate = match (self.decrypted, self.record) {
            (Some(stake), Some(record)) => Some(compute_pending_reward_with(
                self.model,
                stake.value,
                record.last_claim_time,
                now,
            )),
            _ => None,
        };
        self.estimate
    }

    /// Forget the cleartext, e.g. when the user hides their balance.
    ///
    /// A zero handle stays revealed since its value is public.
    pub fn hide(&mut self) {
        if self.decrypted.is_some_and(|d| !d.handle.is_zero()) {
            self.decrypted = None;
            self.estimate = None;
        }
    }

    /// Staked amount as shown to the user.
    pub fn staked_display(&self) -> String {
        match self.decrypted {
            Some(stake) if stake.handle.is_zero() => "0".to_string(),
            Some(stake) => format_token_amount(stake.value),
            None => MASKED.to_string(),
        }
    }

    /// Pending reward estimate as shown to the user.
    pub fn estimate_display(&self) -> String {
        match (self.decrypted, self.estimate) {
            (Some(stake), _) if stake.handle.is_zero() => "0".to_string(),
            (Some(_), Some(estimate)) => format_token_amount(estimate),
            _ => MASKED.to_string(),
        }
    }
}
