// src/contract/mod.rs
//! Staking contract integration

mod gateway;
mod types;

pub use gateway::ContractGateway;
#[cfg(test)]
pub use gateway::IHackerStaking;
pub use types::*;

use crate::error::Result;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

/// The four contract operations plus confirmation of submitted transactions.
///
/// Every call needs a connected session and fails with `ChainCall` on any
/// RPC or contract failure. Nothing is retried.
#[async_trait]
pub trait StakingContract: Send + Sync {
    async fn list_position_ids(&self, owner: Address) -> Result<Vec<u64>>;

    async fn get_position(&self, position_id: u64) -> Result<RawPosition>;

    /// Payable `stakeEther`; the lock tier is not validated here
    async fn stake(&self, lock_days: u64, amount: U256) -> Result<PendingTransaction>;

    async fn withdraw(&self, position_id: u64) -> Result<PendingTransaction>;

    /// Wait until the transaction is mined; a reverted receipt is an error
    async fn confirm(&self, pending: &PendingTransaction) -> Result<Confirmation>;
}
