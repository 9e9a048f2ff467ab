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

//! Event loop driving a [RewardEstimator] for as long as it is displayed.

use std::{future::Future, time::Duration};

use futures_util::future::BoxFuture;
use tokio::time::MissedTickBehavior;

use crate::{
    decrypt::{DecryptError, Decryptor},
    estimator::{DecryptOutcome, DecryptTicket, EstimatorState, RewardEstimator},
    reader::StakeReader,
    record::CiphertextHandle,
};

type PendingDecrypt<'a> = BoxFuture<'a, (DecryptTicket, Result<u64, DecryptError>)>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval at which the estimate is recomputed from cached values.
    pub tick_interval: Duration,
    /// Interval at which the stake record is re-read from the contract.
    pub refresh_interval: Duration,
    /// Re-issue a decryption whenever the estimator is masked with a loaded record.
    pub auto_decrypt: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            refresh_interval: Duration::from_secs(30),
            auto_decrypt: true,
        }
    }
}

/// Owns a [RewardEstimator] and multiplexes its timers and outstanding decryption.
///
/// Ticks never perform I/O. Refreshes and decryptions are the only suspension points, and at
/// most one decryption is outstanding at a time.
pub struct EstimatorSession<'a, R: ?Sized, D: ?Sized> {
    estimator: RewardEstimator,
    reader: &'a R,
    decryptor: &'a D,
    config: SessionConfig,
    /// Handle whose decryption last failed. Auto-decrypt stays off until the handle changes.
    failed_handle: Option<CiphertextHandle>,
}

impl<'a, R, D> EstimatorSession<'a, R, D>
where
    R: StakeReader + ?Sized,
    D: Decryptor + ?Sized,
{
    pub fn new(
        estimator: RewardEstimator,
        reader: &'a R,
        decryptor: &'a D,
        config: SessionConfig,
    ) -> Self {
        Self { estimator, reader, decryptor, config, failed_handle: None }
    }

    /// Run until `shutdown` resolves, calling `on_update` after every state change or tick.
    ///
    /// `clock` returns the current UNIX time in seconds. The estimator is handed back on exit.
    pub async fn run(
        mut self,
        clock: impl Fn() -> u64,
        mut on_update: impl FnMut(&RewardEstimator),
        shutdown: impl Future<Output = ()>,
    ) -> RewardEstimator {
        let mut tick = tokio::time::interval(self.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut refresh = tokio::time::interval(self.config.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut pending: Option<PendingDecrypt<'a>> = None;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::debug!("Estimator session shutting down");
                    break;
                }
                (ticket, result) = next_result(&mut pending), if pending.is_some() => {
                    pending = None;
                    let outcome = self.estimator.complete_decrypt(ticket, result, clock());
                    tracing::debug!(?outcome, "Decryption resolved");
                    match outcome {
                        DecryptOutcome::Stale => pending = self.start_decrypt(),
                        DecryptOutcome::Failed => self.failed_handle = Some(ticket.handle()),
                        DecryptOutcome::Applied => {}
                    }
                    on_update(&self.estimator);
                }
                _ = refresh.tick() => {
                    // Errors are recorded on the estimator and retried on the next refresh.
                    let _ = self.estimator.refresh(self.reader, clock()).await;
                    if pending.is_none() {
                        pending = self.start_decrypt();
                    }
                    on_update(&self.estimator);
                }
                _ = tick.tick() => {
                    self.estimator.tick(clock());
                    on_update(&self.estimator);
                }
            }
        }

        self.estimator
    }

    fn start_decrypt(&mut self) -> Option<PendingDecrypt<'a>> {
        if !self.config.auto_decrypt || self.estimator.state() != EstimatorState::Masked {
            return None;
        }
        let handle = self.estimator.record()?.staked_amount;
        if self.failed_handle == Some(handle) {
            tracing::debug!(%handle, "Not retrying failed decryption until the handle changes");
            return None;
        }
        self.failed_handle = None;
        let ticket = self.estimator.begin_decrypt()?;
        let decryptor = self.decryptor;
        let platform_address = self.estimator.platform_address();
        Some(Box::pin(async move {
            let result = decryptor.user_decrypt(ticket.handle(), platform_address).await;
            (ticket, result)
        }))
    }
}

async fn next_result<F: Future + Unpin>(pending: &mut Option<F>) -> F::Output {
    match pending {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use alloy::primitives::{Address, B256};
    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::{
        reader::ReadError,
        record::StakeRecord,
        rewards::UNIT,
    };

    const T: u64 = 1_750_000_000;
    const PLATFORM: Address = Address::repeat_byte(0xaa);

    fn record(byte: u8) -> StakeRecord {
        StakeRecord {
            staked_amount: CiphertextHandle(B256::repeat_byte(byte)),
            reward_debt: CiphertextHandle::ZERO,
            last_claim_time: T,
        }
    }

    /// Returns the queued records in order, then repeats the last one.
    struct SequenceReader {
        records: Mutex<Vec<StakeRecord>>,
    }

    #[async_trait]
    impl StakeReader for SequenceReader {
        async fn stake_record(&self, _account: Address) -> Result<StakeRecord, ReadError> {
            let mut records = self.records.lock().unwrap();
            if records.len() > 1 {
                Ok(records.remove(0))
            } else {
                Ok(records[0])
            }
        }
    }

    /// Resolves after `delay`, mapping handle byte 1 to 111 and anything else to one unit.
    struct SlowDecryptor {
        delay: Duration,
        calls: Mutex<Vec<CiphertextHandle>>,
    }

    #[async_trait]
    impl Decryptor for SlowDecryptor {
        async fn user_decrypt(
            &self,
            handle: CiphertextHandle,
            _contract_address: Address,
        ) -> Result<u64, DecryptError> {
            self.calls.lock().unwrap().push(handle);
            tokio::time::sleep(self.delay).await;
            if handle == record(1).staked_amount {
                Ok(111)
            } else {
                Ok(UNIT)
            }
        }
    }

    fn clock() -> impl Fn() -> u64 {
        let start = Instant::now();
        move || T + start.elapsed().as_secs()
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_reveals_and_ticks() {
        let reader = SequenceReader { records: Mutex::new(vec![record(2)]) };
        let decryptor = SlowDecryptor { delay: Duration::ZERO, calls: Mutex::new(vec![]) };
        let session = EstimatorSession::new(
            RewardEstimator::new(Address::repeat_byte(1), PLATFORM),
            &reader,
            &decryptor,
            SessionConfig::default(),
        );

        let mut displays = Vec::new();
        let estimator = session
            .run(
                clock(),
                |est| displays.push(est.estimate_display()),
                tokio::time::sleep(Duration::from_secs(10)),
            )
            .await;

        assert_eq!(displays.first().map(String::as_str), Some("***"));
        assert_eq!(estimator.state(), EstimatorState::Revealed);
        assert_eq!(estimator.staked_amount(), Some(UNIT));
        // Roughly ten seconds of accrual on one unit.
        let estimate = estimator.estimate().unwrap();
        assert!((100..=130).contains(&estimate), "estimate {estimate}");
        assert_eq!(decryptor.calls.lock().unwrap().len(), 1);
        // One update per tick at least.
        assert!(displays.len() >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_drops_stale_decryption() {
        // The handle changes on the second refresh, while the first decryption is outstanding.
        let reader = SequenceReader { records: Mutex::new(vec![record(1), record(2)]) };
        let decryptor = SlowDecryptor { delay: Duration::from_secs(3), calls: Mutex::new(vec![]) };
        let config = SessionConfig { refresh_interval: Duration::from_secs(1), ..Default::default() };
        let session = EstimatorSession::new(
            RewardEstimator::new(Address::repeat_byte(1), PLATFORM),
            &reader,
            &decryptor,
            config,
        );

        let mut seen = Vec::new();
        let estimator = session
            .run(
                clock(),
                |est| seen.push(est.staked_amount()),
                tokio::time::sleep(Duration::from_secs(20)),
            )
            .await;

        assert!(!seen.contains(&Some(111)), "stale cleartext was applied");
        assert_eq!(estimator.staked_amount(), Some(UNIT));
        let calls = decryptor.calls.lock().unwrap();
        assert_eq!(*calls, vec![record(1).staked_amount, record(2).staked_amount]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_without_auto_decrypt_stays_masked() {
        let reader = SequenceReader { records: Mutex::new(vec![record(2)]) };
        let decryptor = SlowDecryptor { delay: Duration::ZERO, calls: Mutex::new(vec![]) };
        let config = SessionConfig { auto_decrypt: false, ..Default::default() };
        let session = EstimatorSession::new(
            RewardEstimator::new(Address::repeat_byte(1), PLATFORM),
            &reader,
            &decryptor,
            config,
        );

        let estimator =
            session.run(clock(), |_| {}, tokio::time::sleep(Duration::from_secs(5))).await;
        assert_eq!(estimator.state(), EstimatorState::Masked);
        assert_eq!(estimator.estimate_display(), "***");
        assert!(decryptor.calls.lock().unwrap().is_empty());
    }

    /// Always fails, counting the handles it was asked for.
    struct FailingDecryptor {
        calls: Mutex<Vec<CiphertextHandle>>,
    }

    #[async_trait]
    impl Decryptor for FailingDecryptor {
        async fn user_decrypt(
            &self,
            handle: CiphertextHandle,
            _contract_address: Address,
        ) -> Result<u64, DecryptError> {
            self.calls.lock().unwrap().push(handle);
            Err(DecryptError::Relayer("user rejected signature".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_does_not_retry_failed_decryption() {
        let reader = SequenceReader { records: Mutex::new(vec![record(3)]) };
        let decryptor = FailingDecryptor { calls: Mutex::new(vec![]) };
        let config = SessionConfig { refresh_interval: Duration::from_secs(1), ..Default::default() };
        let session = EstimatorSession::new(
            RewardEstimator::new(Address::repeat_byte(1), PLATFORM),
            &reader,
            &decryptor,
            config,
        );

        let estimator = session
            .run(clock(), |_| {}, tokio::time::sleep(Duration::from_millis(5_500)))
            .await;

        assert_eq!(estimator.state(), EstimatorState::Masked);
        assert_eq!(estimator.estimate_display(), "***");
        assert_eq!(*decryptor.calls.lock().unwrap(), vec![record(3).staked_amount]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_decrypts_again_after_handle_change() {
        // Refreshes at 0s, 1s and 2s see handle 3, the one at 3s sees handle 4.
        let reader = SequenceReader {
            records: Mutex::new(vec![record(3), record(3), record(3), record(4)]),
        };
        let decryptor = FailingDecryptor { calls: Mutex::new(vec![]) };
        let config = SessionConfig { refresh_interval: Duration::from_secs(1), ..Default::default() };
        let session = EstimatorSession::new(
            RewardEstimator::new(Address::repeat_byte(1), PLATFORM),
            &reader,
            &decryptor,
            config,
        );

        session.run(clock(), |_| {}, tokio::time::sleep(Duration::from_millis(5_500))).await;

        assert_eq!(
            *decryptor.calls.lock().unwrap(),
            vec![record(3).staked_amount, record(4).staked_amount]
        );
    }
}
