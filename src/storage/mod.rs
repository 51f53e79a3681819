// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-address account registry backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: lowercase address → serialized [`AccountRecord`] (JSON bytes)
//!
//! The registry holds everything the relay persists per device: the pinned
//! public key from first use, the last balance it observed, and when. It is
//! the authority for key pinning but NEVER for balances; the ledger is.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

/// Primary table: lowercase address → serialized AccountRecord (JSON bytes).
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("account not registered: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the relay persists for one address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    /// Base64 SubjectPublicKeyInfo DER, pinned at first use.
    pub public_key: String,
    /// Last observed balance, decimal token units. Display state only.
    pub balance: String,
    /// When the balance was last refreshed from the ledger.
    pub last_updated: DateTime<Utc>,
}

/// The outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The address was unregistered; the supplied key is now pinned.
    Created(AccountRecord),
    /// The address was already registered; the STORED record is returned
    /// and the supplied key was ignored.
    Existing(AccountRecord),
}

impl Registration {
    pub fn record(&self) -> &AccountRecord {
        match self {
            Registration::Created(record) | Registration::Existing(record) => record,
        }
    }
}

/// Embedded ACID account registry.
pub struct AccountStore {
    db: Database,
}

impl AccountStore {
    /// Open (or create) the registry at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Look up the record for an address (any casing).
    pub fn get(&self, address: &str) -> StoreResult<Option<AccountRecord>> {
        let key = address.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(key.as_str())? {
            Some(value) => {
                let record: AccountRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Atomically register `public_key` for `address` if unregistered, or
    /// return the existing record untouched.
    ///
    /// The check and the insert happen inside one write transaction, so two
    /// concurrent first-use requests for the same address serialize and
    /// exactly one key wins. Key comparison is the caller's job: this method
    /// never overwrites an existing key.
    pub fn register_or_get_key(
        &self,
        address: &str,
        public_key: &str,
    ) -> StoreResult<Registration> {
        let key = address.to_lowercase();
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(ACCOUNTS)?;

            let existing = match table.get(key.as_str())? {
                Some(value) => Some(serde_json::from_slice::<AccountRecord>(value.value())?),
                None => None,
            };

            match existing {
                Some(record) => Registration::Existing(record),
                None => {
                    let record = AccountRecord {
                        public_key: public_key.to_string(),
                        balance: "0".to_string(),
                        last_updated: Utc::now(),
                    };
                    let json = serde_json::to_vec(&record)?;
                    table.insert(key.as_str(), json.as_slice())?;
                    Registration::Created(record)
                }
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Persist a freshly observed balance for a registered address.
    ///
    /// Returns the updated record; fails with [`StoreError::NotFound`] for
    /// unregistered addresses, which never get balance rows of their own.
    pub fn update_balance(&self, address: &str, balance: &str) -> StoreResult<AccountRecord> {
        let key = address.to_lowercase();
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(ACCOUNTS)?;

            let mut record = match table.get(key.as_str())? {
                Some(value) => serde_json::from_slice::<AccountRecord>(value.value())?,
                None => return Err(StoreError::NotFound(key)),
            };
            record.balance = balance.to_string();
            record.last_updated = Utc::now();

            let json = serde_json::to_vec(&record)?;
            table.insert(key.as_str(), json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }
}
