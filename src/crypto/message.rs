// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical request messages.
//!
//! The device signs these exact byte strings and the relay reconstructs them
//! from the request fields, so both sides must build them identically. Any
//! change here is a protocol change.

/// Message for an airdrop request: the claimed address, lowercased, with a
/// `0x` prefix.
pub fn airdrop_message(address: &str) -> String {
    let lower = address.to_lowercase();
    if lower.starts_with("0x") {
        lower
    } else {
        format!("0x{lower}")
    }
}

/// Message for a transfer request: `transfer:<to>:<amount>` where `to` is
/// lowercased with the `0x` prefix stripped and the amount has a single
/// trailing `.0` removed.
pub fn transfer_message(to: &str, amount: &str) -> String {
    let to = to.to_lowercase();
    let to = to.strip_prefix("0x").unwrap_or(&to);
    format!("transfer:{to}:{}", normalize_amount(amount))
}

/// Strip one trailing `.0` from a decimal amount.
///
/// Whole-number amounts may be rendered as `10` or `10.0` depending on the
/// caller's formatter; both must sign to the same bytes. Fractional amounts
/// pass through unchanged.
pub fn normalize_amount(amount: &str) -> &str {
    amount.strip_suffix(".0").unwrap_or(amount)
}
