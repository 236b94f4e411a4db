//! Multisig engine: submit, confirm, execute
//!
//! Owns the proposal store and the confirmation tracker, and is the only
//! component that talks to the ledger. Execution holds the record's execution
//! gate across the ledger call, so the executed flag behaves as a
//! compare-and-swap: of any number of concurrent executes for one id, exactly
//! one can succeed. Reads and confirmations only take the record's data lock
//! and never wait on the ledger.

use crate::ledger::{Address, Ledger, LedgerError, Receipt, TokenInfo};
use crate::multisig::error::MultisigError;
use crate::multisig::events::{EngineEvent, EventBus, Subscription};
use crate::multisig::record::{ProposalStatus, TransactionRecord, TxType};
use crate::multisig::store::ProposalStore;
use crate::multisig::tracker::{ConfirmationTracker, OwnerSet};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single ledger call unless configured otherwise
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a confirmation
#[derive(Clone, Debug, Serialize)]
pub struct ConfirmOutcome {
    /// Record after the confirmation
    pub record: TransactionRecord,
    /// False when the owner had already confirmed
    pub newly_confirmed: bool,
    pub quorum_reached: bool,
}

/// Result of a successful execution
#[derive(Clone, Debug, Serialize)]
pub struct Execution {
    /// Record after being marked executed
    pub record: TransactionRecord,
    pub receipt: Receipt,
}

/// Coordinates the proposal lifecycle against a ledger
pub struct MultisigEngine {
    tracker: ConfirmationTracker,
    store: ProposalStore,
    ledger: Arc<dyn Ledger>,
    ledger_timeout: Duration,
    events: EventBus,
}

impl MultisigEngine {
    /// Create an engine with an empty store
    pub fn new(owners: OwnerSet, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            tracker: ConfirmationTracker::new(owners),
            store: ProposalStore::new(),
            ledger,
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
            events: EventBus::new(),
        }
    }

    /// Use a previously populated store
    pub fn with_store(mut self, store: ProposalStore) -> Self {
        self.store = store;
        self
    }

    /// Bound every ledger call by `timeout`
    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = timeout;
        self
    }

    pub fn owners(&self) -> &OwnerSet {
        self.tracker.owners()
    }

    pub fn quorum(&self) -> usize {
        self.tracker.owners().quorum()
    }

    pub fn ledger_timeout(&self) -> Duration {
        self.ledger_timeout
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Propose minting `amount` to `account`
    pub async fn submit_mint(&self, account: &str, amount: u128) -> Result<u64, MultisigError> {
        let account = Address::parse(account)?;
        let id = self
            .store
            .submit(TxType::Mint, Some(account.clone()), amount)
            .await?;

        log::info!("Submitted mint #{}: {} to {}", id, amount, account);
        self.events.publish(EngineEvent::Submitted {
            id,
            tx_type: TxType::Mint,
        });

        Ok(id)
    }

    /// Propose burning `amount` from the ledger treasury
    pub async fn submit_burn(&self, amount: u128) -> Result<u64, MultisigError> {
        let id = self.store.submit(TxType::Burn, None, amount).await?;

        log::info!("Submitted burn #{}: {}", id, amount);
        self.events.publish(EngineEvent::Submitted {
            id,
            tx_type: TxType::Burn,
        });

        Ok(id)
    }

    // =========================================================================
    // Confirmation
    // =========================================================================

    /// Record `owner`'s confirmation of transaction `id`
    pub async fn confirm_transaction(
        &self,
        id: u64,
        owner: &str,
    ) -> Result<ConfirmOutcome, MultisigError> {
        let handle = self.store.entry(id).await?;
        let mut record = handle.data.lock().await;

        let newly_confirmed = self.tracker.confirm(&mut record, owner)?;
        let quorum_reached = self.tracker.has_quorum(&record);

        if newly_confirmed {
            log::info!(
                "Transaction #{} confirmed by {} ({}/{})",
                id,
                owner,
                record.confirmation_count(),
                self.quorum()
            );
            self.events.publish(EngineEvent::Confirmed {
                id,
                owner: owner.to_string(),
                confirmations: record.confirmation_count(),
                quorum_reached,
            });
        } else {
            log::debug!("Transaction #{} already confirmed by {}", id, owner);
        }

        Ok(ConfirmOutcome {
            record: record.clone(),
            newly_confirmed,
            quorum_reached,
        })
    }

    /// Check whether transaction `id` has reached quorum
    pub async fn has_quorum(&self, id: u64) -> Result<bool, MultisigError> {
        let record = self.store.get(id).await?;
        Ok(self.tracker.has_quorum(&record))
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Apply transaction `id` to the ledger and mark it executed.
    ///
    /// On any ledger failure the record is left unexecuted and can be
    /// executed again later without new confirmations.
    pub async fn execute_transaction(&self, id: u64) -> Result<Execution, MultisigError> {
        let handle = self.store.entry(id).await?;
        let _gate = handle.gate.lock().await;

        let (tx_type, account, amount) = {
            let record = handle.data.lock().await;

            if record.executed {
                return Err(MultisigError::AlreadyExecuted(id));
            }

            if !self.tracker.has_quorum(&record) {
                return Err(MultisigError::QuorumNotMet {
                    id,
                    have: record.confirmation_count(),
                    need: self.quorum(),
                });
            }

            (record.tx_type, record.account.clone(), record.amount)
        };

        let result = match tx_type {
            TxType::Mint => match account {
                Some(account) => {
                    self.call_ledger(async move {
                        self.ledger.apply_mint(id, &account, amount).await
                    })
                    .await
                }
                None => Err(MultisigError::InvalidArgument(format!(
                    "mint #{} has no target account",
                    id
                ))),
            },
            TxType::Burn => self.call_ledger(self.ledger.apply_burn(id, amount)).await,
        };

        match result {
            Ok(receipt) => {
                let mut record = handle.data.lock().await;
                record.mark_executed(receipt.clone());
                log::info!(
                    "Executed {} #{}: {} (receipt {})",
                    record.tx_type,
                    id,
                    record.amount,
                    receipt.hash.get(..16).unwrap_or(&receipt.hash)
                );
                self.events.publish(EngineEvent::Executed {
                    id,
                    receipt: receipt.clone(),
                });

                Ok(Execution {
                    record: record.clone(),
                    receipt,
                })
            }
            Err(err) => {
                log::warn!("Execution of #{} failed: {}", id, err);
                self.events.publish(EngineEvent::ExecutionFailed {
                    id,
                    error: err.to_string(),
                    retryable: err.is_retryable(),
                });
                Err(err)
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a transaction by id
    pub async fn get_transaction(&self, id: u64) -> Result<TransactionRecord, MultisigError> {
        self.store.get(id).await
    }

    /// All transactions in submission order
    pub async fn list_transactions(&self) -> Vec<TransactionRecord> {
        self.store.list().await
    }

    /// Unexecuted transactions in submission order
    pub async fn get_pending(&self) -> Vec<TransactionRecord> {
        self.store
            .list()
            .await
            .into_iter()
            .filter(|record| !record.executed)
            .collect()
    }

    /// Lifecycle state of transaction `id`
    pub async fn status(&self, id: u64) -> Result<ProposalStatus, MultisigError> {
        let record = self.store.get(id).await?;
        Ok(record.status(self.quorum()))
    }

    /// Ledger balance of `address`
    pub async fn query_balance(&self, address: &str) -> Result<u128, MultisigError> {
        let address = Address::parse(address)?;
        self.call_ledger(async move { self.ledger.query_balance(&address).await })
            .await
    }

    /// Token details from the ledger
    pub async fn token_info(&self) -> Result<TokenInfo, MultisigError> {
        self.call_ledger(self.ledger.token_info()).await
    }

    /// Records for persistence
    pub async fn snapshot(&self) -> Vec<TransactionRecord> {
        self.store.list().await
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Run a ledger call under the configured timeout
    async fn call_ledger<T, F>(&self, call: F) -> Result<T, MultisigError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        match tokio::time::timeout(self.ledger_timeout, call).await {
            Ok(result) => result.map_err(MultisigError::from),
            Err(_) => Err(MultisigError::LedgerUnavailable(format!(
                "ledger did not answer within {}ms",
                self.ledger_timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, SupplyAction, TokenMetadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TREASURY: &str = "0x00000000000000000000000000000000000000aa";
    const HOLDER: &str = "0x1111111111111111111111111111111111111111";

    fn owners() -> OwnerSet {
        OwnerSet::new(vec!["O1".to_string(), "O2".to_string(), "O3".to_string()], 2).unwrap()
    }

    fn create_test_ledger() -> Arc<InMemoryLedger> {
        let metadata = TokenMetadata::new("Carbon Token".to_string(), "CO2".to_string(), 18).unwrap();
        Arc::new(InMemoryLedger::new(
            metadata,
            Address::parse(TREASURY).unwrap(),
            1_000,
        ))
    }

    fn create_test_engine() -> (MultisigEngine, Arc<InMemoryLedger>) {
        let ledger = create_test_ledger();
        let engine = MultisigEngine::new(owners(), ledger.clone());
        (engine, ledger)
    }

    /// Ledger that counts apply calls and always succeeds
    #[derive(Default)]
    struct CountingLedger {
        applies: AtomicUsize,
    }

    #[async_trait]
    impl Ledger for CountingLedger {
        async fn apply_mint(
            &self,
            tx_id: u64,
            account: &Address,
            amount: u128,
        ) -> Result<Receipt, LedgerError> {
            self.applies.fetch_add(1, Ordering::SeqCst);
            Ok(Receipt {
                tx_id,
                action: SupplyAction::Mint,
                account: account.clone(),
                amount,
                hash: "ab".repeat(32),
                applied_at: chrono::Utc::now(),
            })
        }

        async fn apply_burn(&self, tx_id: u64, amount: u128) -> Result<Receipt, LedgerError> {
            self.applies.fetch_add(1, Ordering::SeqCst);
            Ok(Receipt {
                tx_id,
                action: SupplyAction::Burn,
                account: Address::parse(TREASURY).unwrap(),
                amount,
                hash: "cd".repeat(32),
                applied_at: chrono::Utc::now(),
            })
        }

        async fn query_balance(&self, _address: &Address) -> Result<u128, LedgerError> {
            Ok(0)
        }

        async fn token_info(&self) -> Result<TokenInfo, LedgerError> {
            Err(LedgerError::Unavailable("not implemented".to_string()))
        }
    }

    #[tokio::test]
    async fn test_burn_scenario() {
        let (engine, ledger) = create_test_engine();

        let id = engine.submit_burn(50).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(engine.status(id).await.unwrap(), ProposalStatus::Pending);

        let outcome = engine.confirm_transaction(id, "O1").await.unwrap();
        assert!(outcome.newly_confirmed);
        assert!(!outcome.quorum_reached);

        let outcome = engine.confirm_transaction(id, "O2").await.unwrap();
        assert!(outcome.quorum_reached);
        assert_eq!(engine.status(id).await.unwrap(), ProposalStatus::Confirmed);

        let execution = engine.execute_transaction(id).await.unwrap();
        assert!(execution.record.executed);
        assert_eq!(execution.receipt.action, SupplyAction::Burn);
        assert_eq!(execution.receipt.amount, 50);
        assert_eq!(ledger.total_supply().await, 950);
        assert_eq!(engine.status(id).await.unwrap(), ProposalStatus::Executed);

        // Executed is terminal
        assert_eq!(
            engine.confirm_transaction(id, "O3").await.unwrap_err(),
            MultisigError::AlreadyExecuted(1)
        );
        assert_eq!(
            engine.execute_transaction(id).await.unwrap_err(),
            MultisigError::AlreadyExecuted(1)
        );
        assert_eq!(ledger.total_supply().await, 950);
    }

    #[tokio::test]
    async fn test_mint_round_trip_increases_balance() {
        let (engine, _ledger) = create_test_engine();
        let before = engine.query_balance(HOLDER).await.unwrap();

        let id = engine.submit_mint(HOLDER, 100).await.unwrap();
        engine.confirm_transaction(id, "O3").await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        let execution = engine.execute_transaction(id).await.unwrap();

        let after = engine.query_balance(HOLDER).await.unwrap();
        assert_eq!(after - before, 100);
        assert_eq!(execution.receipt.account.as_str(), HOLDER);
        assert_eq!(execution.record.receipt, Some(execution.receipt.clone()));
    }

    #[tokio::test]
    async fn test_submit_mint_rejects_malformed_account() {
        let (engine, _) = create_test_engine();

        let result = engine.submit_mint("not-an-address", 100).await;
        assert!(matches!(result, Err(MultisigError::InvalidArgument(_))));
        assert!(engine.list_transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_execute_before_quorum_never_calls_ledger() {
        let ledger = Arc::new(CountingLedger::default());
        let engine = MultisigEngine::new(owners(), ledger.clone());

        let id = engine.submit_mint(HOLDER, 10).await.unwrap();
        assert_eq!(
            engine.execute_transaction(id).await.unwrap_err(),
            MultisigError::QuorumNotMet {
                id,
                have: 0,
                need: 2
            }
        );

        engine.confirm_transaction(id, "O1").await.unwrap();
        assert!(matches!(
            engine.execute_transaction(id).await,
            Err(MultisigError::QuorumNotMet { have: 1, .. })
        ));
        assert_eq!(ledger.applies.load(Ordering::SeqCst), 0);

        engine.confirm_transaction(id, "O2").await.unwrap();
        engine.execute_transaction(id).await.unwrap();
        assert_eq!(ledger.applies.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconfirm_does_not_count_twice() {
        let (engine, _) = create_test_engine();
        let id = engine.submit_burn(5).await.unwrap();

        engine.confirm_transaction(id, "O1").await.unwrap();
        let outcome = engine.confirm_transaction(id, "O1").await.unwrap();

        assert!(!outcome.newly_confirmed);
        assert_eq!(outcome.record.confirmation_count(), 1);
        assert!(!engine.has_quorum(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_id_and_owner() {
        let (engine, _) = create_test_engine();
        engine.submit_burn(5).await.unwrap();

        assert_eq!(
            engine.confirm_transaction(999, "O1").await.unwrap_err(),
            MultisigError::NotFound(999)
        );
        assert_eq!(
            engine.execute_transaction(999).await.unwrap_err(),
            MultisigError::NotFound(999)
        );
        assert_eq!(
            engine.confirm_transaction(1, "Ox").await.unwrap_err(),
            MultisigError::UnknownOwner("Ox".to_string())
        );
    }

    #[tokio::test]
    async fn test_ledger_failure_leaves_record_retryable() {
        let (engine, ledger) = create_test_engine();
        let id = engine.submit_mint(HOLDER, 40).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();

        ledger.inject_fault(LedgerError::Unavailable("connection reset".to_string()));
        let err = engine.execute_transaction(id).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(engine.status(id).await.unwrap(), ProposalStatus::Confirmed);
        assert_eq!(ledger.balance_of(&Address::parse(HOLDER).unwrap()).await, 0);

        // Retry without new confirmations
        engine.execute_transaction(id).await.unwrap();
        assert_eq!(ledger.balance_of(&Address::parse(HOLDER).unwrap()).await, 40);
    }

    #[tokio::test]
    async fn test_ledger_rejection_is_not_retryable() {
        let (engine, _) = create_test_engine();
        let id = engine.submit_burn(5_000).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();

        let err = engine.execute_transaction(id).await.unwrap_err();
        assert!(matches!(err, MultisigError::LedgerRejected(_)));
        assert!(!err.is_retryable());
        assert_eq!(engine.get_pending().await.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_ledger_times_out() {
        let metadata = TokenMetadata::new("Carbon Token".to_string(), "CO2".to_string(), 18).unwrap();
        let ledger = Arc::new(
            InMemoryLedger::new(metadata, Address::parse(TREASURY).unwrap(), 1_000)
                .with_latency(Duration::from_millis(500)),
        );
        let engine = MultisigEngine::new(owners(), ledger.clone())
            .with_ledger_timeout(Duration::from_millis(20));

        let id = engine.submit_burn(10).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();

        let err = engine.execute_transaction(id).await.unwrap_err();
        assert!(matches!(err, MultisigError::LedgerUnavailable(_)));
        assert!(!engine.get_transaction(id).await.unwrap().executed);
        assert_eq!(ledger.total_supply().await, 1_000);
    }

    #[tokio::test]
    async fn test_retry_after_lost_flag_update_does_not_double_apply() {
        let (engine, ledger) = create_test_engine();
        let holder = Address::parse(HOLDER).unwrap();
        let id = engine.submit_mint(HOLDER, 100).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();

        // The ledger applied this id already, but the engine never saw it
        let original = ledger.apply_mint(id, &holder, 100).await.unwrap();

        let execution = engine.execute_transaction(id).await.unwrap();
        assert_eq!(execution.receipt, original);
        assert_eq!(ledger.balance_of(&holder).await, 100);
    }

    #[tokio::test]
    async fn test_pending_excludes_executed() {
        let (engine, _) = create_test_engine();
        let first = engine.submit_burn(1).await.unwrap();
        let second = engine.submit_mint(HOLDER, 2).await.unwrap();
        let third = engine.submit_burn(3).await.unwrap();

        engine.confirm_transaction(second, "O1").await.unwrap();
        engine.confirm_transaction(second, "O2").await.unwrap();
        engine.execute_transaction(second).await.unwrap();

        let pending: Vec<u64> = engine.get_pending().await.iter().map(|r| r.id).collect();
        assert_eq!(pending, vec![first, third]);
        assert_eq!(engine.list_transactions().await.len(), 3);
    }

    #[tokio::test]
    async fn test_events_follow_lifecycle() {
        let (engine, _) = create_test_engine();
        let mut sub = engine.subscribe();

        let id = engine.submit_burn(20).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();
        engine.execute_transaction(id).await.unwrap();

        assert_eq!(
            sub.next().await,
            Some(EngineEvent::Submitted {
                id,
                tx_type: TxType::Burn
            })
        );
        assert!(matches!(
            sub.next().await,
            Some(EngineEvent::Confirmed { confirmations: 1, quorum_reached: false, .. })
        ));
        // The repeated O1 confirmation publishes nothing
        assert!(matches!(
            sub.next().await,
            Some(EngineEvent::Confirmed { confirmations: 2, quorum_reached: true, .. })
        ));
        assert!(matches!(sub.next().await, Some(EngineEvent::Executed { .. })));

        sub.cancel();
        assert_eq!(engine.subscriber_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_confirmations_all_land() {
        let ledger = create_test_ledger();
        let engine = Arc::new(MultisigEngine::new(owners(), ledger));
        let id = engine.submit_burn(1).await.unwrap();

        let mut handles = Vec::new();
        for owner in ["O1", "O2", "O3"] {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.confirm_transaction(id, owner).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = engine.get_transaction(id).await.unwrap();
        let mut confirmed = record.confirmed_by();
        confirmed.sort_unstable();
        assert_eq!(confirmed, vec!["O1", "O2", "O3"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_executes_succeed_once() {
        let metadata = TokenMetadata::new("Carbon Token".to_string(), "CO2".to_string(), 18).unwrap();
        let ledger = Arc::new(
            InMemoryLedger::new(metadata, Address::parse(TREASURY).unwrap(), 1_000)
                .with_latency(Duration::from_millis(10)),
        );
        let engine = Arc::new(MultisigEngine::new(owners(), ledger.clone()));

        let id = engine.submit_burn(100).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();
        engine.confirm_transaction(id, "O2").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move { engine.execute_transaction(id).await }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert_eq!(err, MultisigError::AlreadyExecuted(id)),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(ledger.total_supply().await, 900);
        assert_eq!(ledger.history().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_proceed_during_slow_execute() {
        let metadata = TokenMetadata::new("Carbon Token".to_string(), "CO2".to_string(), 18).unwrap();
        let ledger = Arc::new(
            InMemoryLedger::new(metadata, Address::parse(TREASURY).unwrap(), 1_000)
                .with_latency(Duration::from_millis(800)),
        );
        let engine = Arc::new(MultisigEngine::new(owners(), ledger));

        let slow = engine.submit_burn(10).await.unwrap();
        let other = engine.submit_burn(20).await.unwrap();
        engine.confirm_transaction(slow, "O1").await.unwrap();
        engine.confirm_transaction(slow, "O2").await.unwrap();

        let executing = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.execute_transaction(slow).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let quick = Duration::from_millis(200);
        let pending = tokio::time::timeout(quick, engine.get_pending())
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        tokio::time::timeout(quick, engine.get_transaction(slow))
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(quick, engine.confirm_transaction(other, "O3"))
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(quick, engine.snapshot()).await.unwrap();

        executing.await.unwrap().unwrap();
        assert_eq!(engine.get_pending().await.len(), 1);
    }

    #[tokio::test]
    async fn test_restored_store_keeps_state() {
        let (engine, ledger) = create_test_engine();
        let id = engine.submit_burn(10).await.unwrap();
        engine.confirm_transaction(id, "O1").await.unwrap();

        let store = ProposalStore::from_records(engine.snapshot().await).unwrap();
        let restored = MultisigEngine::new(owners(), ledger).with_store(store);

        let outcome = restored.confirm_transaction(id, "O2").await.unwrap();
        assert!(outcome.quorum_reached);
        assert_eq!(restored.submit_burn(1).await.unwrap(), 2);
    }
}
