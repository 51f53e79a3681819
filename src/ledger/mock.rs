// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger for tests: instant confirmations, scriptable failures,
//! and a write log so tests can assert the ledger was never touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::U256;

use super::{ConfirmedTx, LedgerError, LedgerGateway, PendingTx};

pub struct MockLedger {
    decimals: u8,
    balances: Mutex<HashMap<String, U256>>,
    writes: Mutex<Vec<String>>,
    next_hash: AtomicU64,
    unavailable: AtomicBool,
    revert_next: AtomicBool,
    timeout_next: AtomicBool,
}

impl MockLedger {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            balances: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            next_hash: AtomicU64::new(1),
            unavailable: AtomicBool::new(false),
            revert_next: AtomicBool::new(false),
            timeout_next: AtomicBool::new(false),
        }
    }

    pub fn with_balance(self, address: &str, amount: U256) -> Self {
        self.balances
            .lock()
            .unwrap()
            .insert(Self::key(address), amount);
        self
    }

    /// Make every subsequent call fail with `Unavailable`.
    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Make the next confirmation report a reverted transaction.
    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    /// Make the next confirmation wait time out (unknown outcome).
    pub fn timeout_next(&self) {
        self.timeout_next.store(true, Ordering::SeqCst);
    }

    /// Every write submitted so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn balance(&self, address: &str) -> U256 {
        self.balances
            .lock()
            .unwrap()
            .get(&Self::key(address))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn key(address: &str) -> String {
        address.to_lowercase()
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("mock ledger offline".to_string()));
        }
        Ok(())
    }

    fn next_tx(&self) -> PendingTx {
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);
        PendingTx {
            tx_hash: format!("0x{n:064x}"),
        }
    }
}

impl LedgerGateway for MockLedger {
    async fn mint_to(&self, to: &str, amount: U256) -> Result<PendingTx, LedgerError> {
        self.check_available()?;
        self.writes
            .lock()
            .unwrap()
            .push(format!("mintTo:{}:{amount}", Self::key(to)));
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(Self::key(to)).or_insert(U256::ZERO);
        *entry += amount;
        Ok(self.next_tx())
    }

    async fn transfer_from(
        &self,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<PendingTx, LedgerError> {
        self.check_available()?;
        self.writes.lock().unwrap().push(format!(
            "transferFrom:{}:{}:{amount}",
            Self::key(from),
            Self::key(to)
        ));
        let mut balances = self.balances.lock().unwrap();
        let available = balances.get(&Self::key(from)).copied().unwrap_or(U256::ZERO);
        if available < amount {
            return Err(LedgerError::TransactionFailed(
                "insufficient balance".to_string(),
            ));
        }
        balances.insert(Self::key(from), available - amount);
        let entry = balances.entry(Self::key(to)).or_insert(U256::ZERO);
        *entry += amount;
        Ok(self.next_tx())
    }

    async fn balance_of(&self, address: &str) -> Result<(U256, u8), LedgerError> {
        self.check_available()?;
        Ok((self.balance(address), self.decimals))
    }

    async fn decimals(&self) -> Result<u8, LedgerError> {
        self.check_available()?;
        Ok(self.decimals)
    }

    async fn await_confirmation(&self, pending: &PendingTx) -> Result<ConfirmedTx, LedgerError> {
        self.check_available()?;
        if self.timeout_next.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::ConfirmationTimeout(Duration::from_secs(45)));
        }
        let success = !self.revert_next.swap(false, Ordering::SeqCst);
        Ok(ConfirmedTx {
            tx_hash: pending.tx_hash.clone(),
            block_number: 1,
            success,
        })
    }
}
