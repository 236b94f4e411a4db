//! Append-only registry of transaction records
//!
//! Each record has two locks. The data lock guards the record itself and is
//! only held for short reads and updates. The execution gate is held across a
//! ledger call, so executes of one record serialise while reads and
//! confirmations do not wait on the ledger. The registry lock is only taken
//! for writing when a record is appended.

use crate::ledger::Address;
use crate::multisig::error::MultisigError;
use crate::multisig::record::{TransactionRecord, TxType};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A record slot shared between the registry and in-flight operations
#[derive(Debug)]
pub(crate) struct RecordSlot {
    /// Record contents; never held across a ledger call
    pub(crate) data: Mutex<TransactionRecord>,
    /// Held by an execute for its whole duration
    pub(crate) gate: Mutex<()>,
}

impl RecordSlot {
    fn new(record: TransactionRecord) -> Self {
        Self {
            data: Mutex::new(record),
            gate: Mutex::new(()),
        }
    }
}

pub(crate) type RecordHandle = Arc<RecordSlot>;

/// Registry of every record ever submitted, in submission order
#[derive(Debug, Default)]
pub struct ProposalStore {
    /// Record with id `n` lives at index `n - 1`
    records: RwLock<Vec<RecordHandle>>,
}

impl ProposalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Restore a store from persisted records.
    ///
    /// Ids must run `1..=n` in order; anything else means the data was edited
    /// or truncated.
    pub fn from_records(records: Vec<TransactionRecord>) -> Result<Self, MultisigError> {
        for (index, record) in records.iter().enumerate() {
            let expected = index as u64 + 1;
            if record.id != expected {
                return Err(MultisigError::InvalidArgument(format!(
                    "record at position {} has id {}, expected {}",
                    index, record.id, expected
                )));
            }
        }

        let handles = records
            .into_iter()
            .map(|record| Arc::new(RecordSlot::new(record)))
            .collect();

        Ok(Self {
            records: RwLock::new(handles),
        })
    }

    /// Create a record with the next sequential id and return that id
    pub async fn submit(
        &self,
        tx_type: TxType,
        account: Option<Address>,
        amount: u128,
    ) -> Result<u64, MultisigError> {
        if tx_type == TxType::Mint && account.is_none() {
            return Err(MultisigError::InvalidArgument(
                "mint requires a target account".to_string(),
            ));
        }

        let mut records = self.records.write().await;
        let id = records.len() as u64 + 1;
        records.push(Arc::new(RecordSlot::new(TransactionRecord::new(
            id, tx_type, account, amount,
        ))));

        Ok(id)
    }

    /// Get a copy of a record by id
    pub async fn get(&self, id: u64) -> Result<TransactionRecord, MultisigError> {
        let handle = self.entry(id).await?;
        let record = handle.data.lock().await;
        Ok(record.clone())
    }

    /// Copies of all records in submission order
    pub async fn list(&self) -> Vec<TransactionRecord> {
        let handles: Vec<RecordHandle> = self.records.read().await.clone();

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            records.push(handle.data.lock().await.clone());
        }
        records
    }

    /// Get record count
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Shared slot for a record, for callers that mutate it under its lock
    pub(crate) async fn entry(&self, id: u64) -> Result<RecordHandle, MultisigError> {
        let index = id
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(MultisigError::NotFound(id))?;

        self.records
            .read()
            .await
            .get(index)
            .cloned()
            .ok_or(MultisigError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Address {
        Address::parse("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = ProposalStore::new();
        assert!(store.is_empty().await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let store = ProposalStore::new();

        let first = store.submit(TxType::Burn, None, 50).await.unwrap();
        let second = store
            .submit(TxType::Mint, Some(account()), 100)
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.len().await, 2);

        let record = store.get(2).await.unwrap();
        assert_eq!(record.tx_type, TxType::Mint);
        assert_eq!(record.account, Some(account()));
        assert_eq!(record.amount, 100);
        assert!(!record.executed);
        assert!(record.confirmations.is_empty());
    }

    #[tokio::test]
    async fn test_mint_without_account_rejected() {
        let store = ProposalStore::new();

        let result = store.submit(TxType::Mint, None, 100).await;
        assert!(matches!(result, Err(MultisigError::InvalidArgument(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let store = ProposalStore::new();
        store.submit(TxType::Burn, None, 1).await.unwrap();

        assert_eq!(store.get(0).await, Err(MultisigError::NotFound(0)));
        assert_eq!(store.get(999).await, Err(MultisigError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_list_preserves_submission_order() {
        let store = ProposalStore::new();
        for amount in [30, 10, 20] {
            store.submit(TxType::Burn, None, amount).await.unwrap();
        }

        let records = store.list().await;
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        let amounts: Vec<u128> = records.iter().map(|r| r.amount).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(amounts, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_from_records_continues_numbering() {
        let records = vec![
            TransactionRecord::new(1, TxType::Burn, None, 5),
            TransactionRecord::new(2, TxType::Mint, Some(account()), 6),
        ];
        let store = ProposalStore::from_records(records).unwrap();

        let id = store.submit(TxType::Burn, None, 7).await.unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_execution_gate() {
        let store = ProposalStore::new();
        store.submit(TxType::Burn, None, 5).await.unwrap();

        let slot = store.entry(1).await.unwrap();
        let _gate = slot.gate.lock().await;

        let records = tokio::time::timeout(std::time::Duration::from_millis(100), store.list())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(store.get(1).await.is_ok());
    }

    #[test]
    fn test_from_records_rejects_gaps() {
        let records = vec![
            TransactionRecord::new(1, TxType::Burn, None, 5),
            TransactionRecord::new(3, TxType::Burn, None, 6),
        ];
        assert!(matches!(
            ProposalStore::from_records(records),
            Err(MultisigError::InvalidArgument(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_get_unique_ids() {
        let store = Arc::new(ProposalStore::new());

        let mut handles = Vec::new();
        for i in 0..32u128 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.submit(TxType::Burn, None, i).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }
}
