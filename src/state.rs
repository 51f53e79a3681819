// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::cache::BalanceCache;
use crate::ledger::LedgerGateway;
use crate::storage::AccountStore;

/// Relay-side policy knobs the handlers need.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Decimal token amount minted per airdrop request.
    pub airdrop_amount: String,
}

/// Shared handler state, generic over the ledger backend so tests can swap
/// in a mock.
pub struct AppState<L> {
    pub ledger: Arc<L>,
    pub accounts: Arc<AccountStore>,
    pub balances: Arc<BalanceCache>,
    pub settings: Arc<RelaySettings>,
}

// Manual impl: derive(Clone) would demand L: Clone, but only the Arcs clone.
impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            accounts: self.accounts.clone(),
            balances: self.balances.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<L: LedgerGateway> AppState<L> {
    pub fn new(ledger: L, accounts: Arc<AccountStore>, settings: RelaySettings) -> Self {
        let balances = Arc::new(BalanceCache::new(accounts.clone()));
        Self {
            ledger: Arc::new(ledger),
            accounts,
            balances,
            settings: Arc::new(settings),
        }
    }
}
