use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::sample::SampleInstance;

/// Persistent storage the resolver may read samples from
pub trait DataStore: Send + Sync {
    /// Open a transaction private to the caller
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, StoreError>;

    /// The first committed instance of a model, if any
    fn fetch_first(&self, type_id: &str) -> Result<Option<SampleInstance>, StoreError>;
}

/// Writes that stay invisible to other readers until committed.
///
/// Samples are never committed; every transaction ends in a rollback.
pub trait Transaction {
    fn insert(&mut self, instance: &SampleInstance) -> Result<(), StoreError>;

    /// The first instance of a model as seen from inside this transaction
    fn fetch_first(&self, type_id: &str) -> Result<Option<SampleInstance>, StoreError>;

    /// Discard everything written since `begin`
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// An open transaction that is always rolled back.
///
/// [`rollback`](Self::rollback) returns rollback failures to the caller;
/// dropping the scope without calling it rolls back and logs any failure.
pub struct TransactionScope<'a> {
    transaction: Box<dyn Transaction + 'a>,
    open: bool,
}

impl<'a> TransactionScope<'a> {
    pub fn begin(store: &'a dyn DataStore) -> Result<Self, StoreError> {
        Ok(Self {
            transaction: store.begin()?,
            open: true,
        })
    }

    pub fn transaction(&mut self) -> &mut (dyn Transaction + 'a) {
        &mut *self.transaction
    }

    pub fn rollback(mut self) -> Result<(), StoreError> {
        self.open = false;
        self.transaction.rollback()
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self.transaction.rollback() {
                tracing::warn!(target: "specimen", "rolling back sample transaction failed: {err}");
            }
        }
    }
}

/// In-memory [`DataStore`].
///
/// Each transaction buffers its inserts privately, so concurrent
/// transactions and plain readers never see each other's uncommitted rows.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, Vec<SampleInstance>>>,
    open_transactions: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a row directly, outside any transaction
    pub fn seed(&self, instance: SampleInstance) {
        self.tables
            .lock()
            .entry(instance.type_id().to_string())
            .or_default()
            .push(instance);
    }

    /// Committed rows of a model
    pub fn count(&self, type_id: &str) -> usize {
        self.tables.lock().get(type_id).map_or(0, Vec::len)
    }

    pub fn open_transactions(&self) -> usize {
        self.open_transactions.load(Ordering::SeqCst)
    }

    pub fn in_transaction(&self) -> bool {
        self.open_transactions() > 0
    }
}

impl DataStore for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, StoreError> {
        self.open_transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryTransaction {
            store: self,
            pending: Vec::new(),
            open: true,
        }))
    }

    fn fetch_first(&self, type_id: &str) -> Result<Option<SampleInstance>, StoreError> {
        Ok(self
            .tables
            .lock()
            .get(type_id)
            .and_then(|rows| rows.first())
            .cloned())
    }
}

struct InMemoryTransaction<'a> {
    store: &'a InMemoryStore,
    pending: Vec<SampleInstance>,
    open: bool,
}

impl InMemoryTransaction<'_> {
    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.pending.clear();
            self.store.open_transactions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Transaction for InMemoryTransaction<'_> {
    fn insert(&mut self, instance: &SampleInstance) -> Result<(), StoreError> {
        if !self.open {
            return Err(StoreError::TransactionClosed);
        }
        self.pending.push(instance.clone());
        Ok(())
    }

    fn fetch_first(&self, type_id: &str) -> Result<Option<SampleInstance>, StoreError> {
        if let Some(committed) = self.store.fetch_first(type_id)? {
            return Ok(Some(committed));
        }
        Ok(self
            .pending
            .iter()
            .find(|row| row.type_id() == type_id)
            .cloned())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.open {
            return Err(StoreError::TransactionClosed);
        }
        self.close();
        Ok(())
    }
}

impl Drop for InMemoryTransaction<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
