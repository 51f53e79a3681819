// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Last-observed balance cache.
//!
//! A small in-process LRU in front of the account registry. Values are
//! display state: possibly stale, refreshed only by an explicit
//! [`BalanceCache::refresh`], and never consulted for authorization or
//! transfer validation. Reads go LRU first, then the registry; reads never
//! touch the ledger.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::ledger::{format_amount, LedgerError, LedgerGateway};
use crate::storage::{AccountStore, StoreError};

/// Hot entries kept in memory.
const CACHE_CAPACITY: usize = 1024;

/// A cached balance observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBalance {
    /// Decimal token units.
    pub balance: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// LRU-fronted balance cache over the account registry.
pub struct BalanceCache {
    store: Arc<AccountStore>,
    hot: Mutex<LruCache<String, CachedBalance>>,
}

impl BalanceCache {
    pub fn new(store: Arc<AccountStore>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("nonzero capacity");
        Self {
            store,
            hot: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Authoritative refresh: read the ledger, persist the observation,
    /// update the hot cache, return the fresh balance.
    ///
    /// A ledger failure propagates and leaves the previous observation in
    /// place; callers must never treat the stale value as fresh.
    pub async fn refresh<L: LedgerGateway>(
        &self,
        ledger: &L,
        address: &str,
    ) -> Result<String, CacheError> {
        let (raw, decimals) = ledger.balance_of(address).await?;
        let balance = format_amount(raw, decimals);
        let record = self.store.update_balance(address, &balance)?;

        let entry = CachedBalance {
            balance: record.balance.clone(),
            last_updated: record.last_updated,
        };
        self.hot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(address.to_lowercase(), entry);
        Ok(record.balance)
    }

    /// Cached read: hot LRU, then the registry. `None` for addresses with
    /// no observation yet. Never touches the ledger.
    pub fn get(&self, address: &str) -> Result<Option<CachedBalance>, CacheError> {
        let key = address.to_lowercase();

        if let Some(hit) = self
            .hot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Some(hit.clone()));
        }

        let Some(record) = self.store.get(&key)? else {
            return Ok(None);
        };
        let entry = CachedBalance {
            balance: record.balance,
            last_updated: record.last_updated,
        };
        self.hot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, entry.clone());
        Ok(Some(entry))
    }
}
