// src/signing/mod.rs
use crate::error::StakingError;
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod rpc_provider;

pub use rpc_provider::RpcWalletProvider;

/// Transaction fields handed to the wallet for `eth_call` / `eth_sendTransaction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

/// The receipt fields the client cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    /// Receipts without a status field predate EIP-658 and are treated as successful.
    pub fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }
}

/// External wallet provider (browser wallet, node-managed accounts, ...)
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Display name of the provider
    fn get_name(&self) -> String;

    /// Check if the provider can be reached at all
    async fn is_available(&self) -> bool;

    /// Ask the wallet for account access; the first account is the active one
    async fn request_accounts(&self) -> Result<Vec<Address>, StakingError>;

    /// Balance in wei
    async fn get_balance(&self, address: Address) -> Result<U256, StakingError>;

    /// Read-only contract call against the latest block
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, StakingError>;

    /// Have the wallet sign and broadcast a transaction; returns its hash
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, StakingError>;

    /// Receipt for a mined transaction, `None` while pending
    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, StakingError>;
}

/// Capability bound to a connected account: balance queries and transaction submission.
#[derive(Clone)]
pub struct Signer {
    address: Address,
    provider: Arc<dyn WalletProvider>,
}

impl Signer {
    pub fn new(address: Address, provider: Arc<dyn WalletProvider>) -> Self {
        Self { address, provider }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn balance(&self) -> Result<U256, StakingError> {
        self.provider.get_balance(self.address).await
    }

    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, StakingError> {
        let tx = TransactionRequest {
            from: Some(self.address),
            to,
            value: None,
            data,
        };
        self.provider.call(&tx).await
    }

    pub async fn send(&self, to: Address, value: Option<U256>, data: Bytes) -> Result<B256, StakingError> {
        let tx = TransactionRequest {
            from: Some(self.address),
            to,
            value,
            data,
        };
        self.provider.send_transaction(&tx).await
    }

    pub async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, StakingError> {
        self.provider.get_transaction_receipt(hash).await
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("provider", &self.provider.get_name())
            .finish()
    }
}
