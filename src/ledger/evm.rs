// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM implementation of the ledger gateway.
//!
//! Talks JSON-RPC to the configured chain through an alloy HTTP provider.
//! Token writes are signed with the relay's admin key, which must hold the
//! minter role and operator allowances on the token contract (that policy
//! lives in the contract, not here).

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    signers::local::PrivateKeySigner,
    sol,
};
use tracing::{debug, warn};

use super::{ConfirmedTx, LedgerError, LedgerGateway, PendingTx};

sol! {
    #[sol(rpc)]
    interface IDeviceToken {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function mintTo(address to, uint256 amount) external;
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// HTTP provider with all fillers plus the relay wallet.
type RelayProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// How often to poll for a receipt while waiting for confirmation.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Ledger gateway backed by an EVM JSON-RPC endpoint.
pub struct EvmLedger {
    provider: RelayProvider,
    token: Address,
    confirmation_timeout: Duration,
}

impl EvmLedger {
    /// Connect to `rpc_url` with the relay admin key (hex, with or without
    /// `0x`) and target the token contract at `token_address`.
    pub fn new(
        rpc_url: &str,
        token_address: &str,
        relay_key_hex: &str,
        confirmation_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let signer: PrivateKeySigner = relay_key_hex
            .parse()
            .map_err(|_| LedgerError::InvalidRelayKey("not a valid private key".to_string()))?;
        let wallet = EthereumWallet::from(signer);

        let token = Address::from_str(token_address)
            .map_err(|e| LedgerError::InvalidAddress(format!("token contract: {e}")))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
        Ok(Self {
            provider,
            token,
            confirmation_timeout,
        })
    }

    fn contract(&self) -> IDeviceToken::IDeviceTokenInstance<RelayProvider> {
        IDeviceToken::new(self.token, self.provider.clone())
    }

    fn parse_address(address: &str) -> Result<Address, LedgerError> {
        Address::from_str(address).map_err(|e| LedgerError::InvalidAddress(e.to_string()))
    }
}

impl LedgerGateway for EvmLedger {
    async fn mint_to(&self, to: &str, amount: U256) -> Result<PendingTx, LedgerError> {
        let to = Self::parse_address(to)?;
        let pending = self
            .contract()
            .mintTo(to, amount)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("mintTo submit failed: {e}")))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        debug!(%to, %amount, tx_hash, "submitted mint");
        Ok(PendingTx { tx_hash })
    }

    async fn transfer_from(
        &self,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<PendingTx, LedgerError> {
        let from = Self::parse_address(from)?;
        let to = Self::parse_address(to)?;
        let pending = self
            .contract()
            .transferFrom(from, to, amount)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("transferFrom submit failed: {e}")))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        debug!(%from, %to, %amount, tx_hash, "submitted transfer");
        Ok(PendingTx { tx_hash })
    }

    async fn balance_of(&self, address: &str) -> Result<(U256, u8), LedgerError> {
        let account = Self::parse_address(address)?;
        let contract = self.contract();

        let balance = contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("balanceOf failed: {e}")))?;
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("decimals failed: {e}")))?;

        Ok((balance, decimals))
    }

    async fn decimals(&self) -> Result<u8, LedgerError> {
        self.contract()
            .decimals()
            .call()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("decimals failed: {e}")))
    }

    async fn await_confirmation(&self, pending: &PendingTx) -> Result<ConfirmedTx, LedgerError> {
        let hash: TxHash = pending
            .tx_hash
            .parse()
            .map_err(|e| LedgerError::TransactionFailed(format!("bad tx hash: {e}")))?;

        let deadline = tokio::time::Instant::now() + self.confirmation_timeout;
        loop {
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    return Ok(ConfirmedTx {
                        tx_hash: pending.tx_hash.clone(),
                        block_number: receipt.block_number.unwrap_or(0),
                        success: receipt.status(),
                    });
                }
                Ok(None) => {}
                // Transient RPC errors do not abort the wait; the deadline
                // bounds the whole loop.
                Err(e) => warn!(tx_hash = %pending.tx_hash, error = %e, "receipt poll failed"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(LedgerError::ConfirmationTimeout(self.confirmation_timeout));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
