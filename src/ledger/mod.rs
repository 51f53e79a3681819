// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External ledger gateway.
//!
//! The relay treats the token ledger as an external system behind the
//! [`LedgerGateway`] trait: submit a write, wait (bounded) for confirmation,
//! read balances. Writes are single-shot; there is no idempotency key in the
//! protocol, so a retry after [`LedgerError::ConfirmationTimeout`] can double
//! apply. Callers must surface the unknown outcome rather than silently
//! retry.

pub mod evm;
#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::time::Duration;

use alloy::primitives::U256;

/// A submitted but not yet confirmed ledger write.
#[derive(Debug, Clone)]
pub struct PendingTx {
    pub tx_hash: String,
}

/// A confirmed ledger write. `success` is the receipt status; a reverted
/// transaction confirms with `success == false`.
#[derive(Debug, Clone)]
pub struct ConfirmedTx {
    pub tx_hash: String,
    pub block_number: u64,
    pub success: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid relay signing key: {0}")]
    InvalidRelayKey(String),

    /// The ledger could not be reached or answered with an RPC error.
    /// Retryable; no write was necessarily applied.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The write confirmed but reverted.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// No receipt within the bound. The outcome is UNKNOWN: the write may
    /// still land later.
    #[error("transaction unconfirmed after {0:?}, outcome unknown")]
    ConfirmationTimeout(Duration),
}

/// Token-ledger operations the relay performs on behalf of devices.
pub trait LedgerGateway: Send + Sync {
    /// Mint `amount` raw units to `to` (relay admin operation).
    fn mint_to(
        &self,
        to: &str,
        amount: U256,
    ) -> impl Future<Output = Result<PendingTx, LedgerError>> + Send;

    /// Move `amount` raw units from `from` to `to` via the relay's
    /// operator allowance.
    fn transfer_from(
        &self,
        from: &str,
        to: &str,
        amount: U256,
    ) -> impl Future<Output = Result<PendingTx, LedgerError>> + Send;

    /// Read the raw-unit balance of `address` together with the token's
    /// decimals, so callers can scale without a second round trip.
    fn balance_of(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<(U256, u8), LedgerError>> + Send;

    /// Token decimals.
    fn decimals(&self) -> impl Future<Output = Result<u8, LedgerError>> + Send;

    /// Wait for a receipt, bounded by the gateway's confirmation timeout.
    fn await_confirmation(
        &self,
        pending: &PendingTx,
    ) -> impl Future<Output = Result<ConfirmedTx, LedgerError>> + Send;
}

/// Scale a decimal token amount (e.g. `"1.5"`) to raw units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, LedgerError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(LedgerError::InvalidAmount(format!(
            "not a decimal number: {amount}"
        )));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| LedgerError::InvalidAmount(format!("bad whole part: {amount}")))?;

    let fraction = if parts.len() == 2 {
        let digits = parts[1];
        if digits.is_empty() || digits.len() > decimals as usize {
            return Err(LedgerError::InvalidAmount(format!(
                "at most {decimals} decimal places supported"
            )));
        }
        let padded = format!("{digits:0<width$}", width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| LedgerError::InvalidAmount(format!("bad fractional part: {amount}")))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("amount overflow: {amount}")))?;

    Ok(U256::from(total))
}

/// Render raw units as a decimal token amount with trailing zeros trimmed.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{remainder:0>width$}", width = decimals as usize);
    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}
