use crate::rpc::types::RawTransaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Thread-safe transaction cache for avoiding duplicate RPC calls.
///
/// Shuffle inputs often spend several outputs of the same previous transaction,
/// so previous transactions are cached. The cache is bounded: once it holds
/// `capacity` entries it is emptied before the next insert.
#[derive(Clone)]
pub struct TransactionCache {
    cache: Arc<Mutex<HashMap<String, RawTransaction>>>,
    capacity: usize,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl TransactionCache {
    /// Create a new empty transaction cache
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            capacity,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RawTransaction>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a transaction from cache if it exists
    pub fn get(&self, txid: &str) -> Option<RawTransaction> {
        match self.entries().get(txid) {
            Some(transaction) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for transaction: {}", txid);
                Some(transaction.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a transaction in the cache
    pub fn put(&self, txid: String, transaction: RawTransaction) {
        if self.capacity == 0 {
            return;
        }
        let mut cache = self.entries();
        if cache.len() >= self.capacity && !cache.contains_key(&txid) {
            debug!("Transaction cache full ({} entries), clearing", cache.len());
            cache.clear();
        }
        cache.insert(txid, transaction);
    }

    /// Get the current cache size
    pub fn size(&self) -> usize {
        self.entries().len()
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache performance statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    /// Get total cache requests
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
