// src/signing/rpc_provider.rs
use crate::error::StakingError;
use crate::rpc::{RpcClient, RpcError, METHOD_NOT_FOUND_CODE, USER_REJECTED_CODE};
use crate::signing::{TransactionReceipt, TransactionRequest, WalletProvider};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde_json::json;

/// Wallet provider backed by a JSON-RPC endpoint whose node manages the
/// accounts and signs `eth_sendTransaction` itself.
pub struct RpcWalletProvider {
    rpc: RpcClient,
}

impl RpcWalletProvider {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc: RpcClient::new(rpc_url),
        }
    }
}

fn chain_error(e: RpcError) -> StakingError {
    StakingError::ChainCall(e.to_string())
}

/// Map a failed account request. `None` means the method is unknown and
/// `eth_accounts` should be tried instead.
fn accounts_error(e: RpcError) -> Option<StakingError> {
    match e {
        RpcError::Rpc { code, .. } if code == METHOD_NOT_FOUND_CODE => None,
        RpcError::Rpc { code, message } if code == USER_REJECTED_CODE => {
            Some(StakingError::ConnectionRejected(message))
        }
        RpcError::Transport(reason) => Some(StakingError::ProviderUnavailable(reason)),
        e => Some(StakingError::ConnectionRejected(e.to_string())),
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    fn get_name(&self) -> String {
        format!("RPC Wallet: {}", self.rpc.url())
    }

    async fn is_available(&self) -> bool {
        match self.rpc.request::<U64>("eth_chainId", json!([])).await {
            Ok(chain_id) => {
                log::info!("Wallet provider reachable, chain id {}", chain_id);
                true
            }
            Err(e) => {
                log::warn!("Wallet provider unavailable at {}: {}", self.rpc.url(), e);
                false
            }
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, StakingError> {
        let requested = self
            .rpc
            .request::<Vec<Address>>("eth_requestAccounts", json!([]))
            .await;

        let accounts = match requested.map_err(accounts_error) {
            Ok(accounts) => accounts,
            // plain nodes only know eth_accounts
            Err(None) => self
                .rpc
                .request::<Vec<Address>>("eth_accounts", json!([]))
                .await
                .map_err(|e| {
                    accounts_error(e).unwrap_or_else(|| {
                        StakingError::ConnectionRejected("wallet exposes no accounts".to_string())
                    })
                })?,
            Err(Some(e)) => return Err(e),
        };

        log::info!("Wallet exposed {} account(s)", accounts.len());
        Ok(accounts)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, StakingError> {
        self.rpc
            .request("eth_getBalance", json!([address, "latest"]))
            .await
            .map_err(chain_error)
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, StakingError> {
        self.rpc
            .request("eth_call", json!([tx, "latest"]))
            .await
            .map_err(chain_error)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, StakingError> {
        let hash: B256 = self
            .rpc
            .request("eth_sendTransaction", json!([tx]))
            .await
            .map_err(chain_error)?;
        log::info!("Submitted transaction {}", hash);
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, StakingError> {
        self.rpc
            .request("eth_getTransactionReceipt", json!([hash]))
            .await
            .map_err(chain_error)
    }
}
