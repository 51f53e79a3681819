// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background task that periodically reads the device's cached balance from
//! the relay and reports increases (incoming transfers land on-chain without
//! any push channel to the device).
//!
//! Polls are strictly sequential: the next request is not issued until the
//! previous one completes, so a slow relay cannot pile up requests.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ledger::parse_amount;

use super::client::RelayClient;

/// Default interval between polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Called with `(previous, current)` balances when the balance grows.
pub type IncreaseCallback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Background poller for one device address.
pub struct BalancePoller {
    client: Arc<RelayClient>,
    address: String,
    poll_interval: Duration,
    on_increase: IncreaseCallback,
}

impl BalancePoller {
    pub fn new(client: Arc<RelayClient>, address: String, on_increase: IncreaseCallback) -> Self {
        Self {
            client,
            address,
            poll_interval: DEFAULT_POLL_INTERVAL,
            on_increase,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            address = %self.address,
            interval_secs = self.poll_interval.as_secs(),
            "Balance poller starting"
        );

        let mut last: Option<String> = None;
        loop {
            if shutdown.is_cancelled() {
                info!("Balance poller shutting down");
                return;
            }

            self.poll_step(&mut last).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Balance poller shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one poll: read the cached balance and compare.
    async fn poll_step(&self, last: &mut Option<String>) {
        let current = match self.client.cached_balance(&self.address).await {
            Ok(response) => response.balance,
            Err(e) => {
                warn!(address = %self.address, error = %e, "Balance poll failed");
                return;
            }
        };

        let Some(current) = current else {
            debug!(address = %self.address, "No cached balance yet");
            return;
        };

        if let Some(previous) = last.as_deref() {
            if increased(previous, &current) {
                info!(
                    address = %self.address,
                    previous = %previous,
                    current = %current,
                    "Balance increased"
                );
                (self.on_increase)(previous, &current);
            }
        }
        *last = Some(current);
    }
}

/// Fixed scale used to compare balance strings. Matches the widest token
/// precision the relay formats, so comparisons stay exact instead of losing
/// bits to floating point.
const COMPARE_DECIMALS: u8 = 18;

/// Exact comparison of decimal balance strings. Unparseable values never
/// count as an increase.
fn increased(previous: &str, current: &str) -> bool {
    match (
        parse_amount(previous, COMPARE_DECIMALS),
        parse_amount(current, COMPARE_DECIMALS),
    ) {
        (Ok(p), Ok(c)) => c > p,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::increased;

    #[test]
    fn increase_detection() {
        assert!(increased("100", "110.5"));
        assert!(!increased("100", "100"));
        assert!(!increased("100", "90"));
        assert!(!increased("garbage", "100"));
    }

    #[test]
    fn increase_detection_is_exact_past_float_precision() {
        // Adjacent integers above 2^53 collapse to the same f64; the
        // fixed-scale comparison must still order them.
        assert!(increased("9007199254740992", "9007199254740993"));
        assert!(!increased("9007199254740993", "9007199254740992"));
        assert!(increased(
            "9007199254740992.000000000000000001",
            "9007199254740992.000000000000000002"
        ));
    }
}
