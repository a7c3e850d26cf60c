// src/contract/types.rs
//! Staking contract types

use alloy_primitives::{Address, B256, U256};

/// Position fields exactly as the contract returns them
#[derive(Debug, Clone, PartialEq)]
pub struct RawPosition {
    pub position_id: u64,
    pub wallet_address: Address,
    pub created_date: u64,
    pub unlock_date: u64,
    /// Interest rate in basis points (700 = 7%)
    pub percent_interest_bps: u64,
    pub wei_staked: U256,
    pub wei_interest: U256,
    pub open: bool,
}

/// What a submitted transaction does
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionKind {
    Stake { lock_days: u64, amount: U256 },
    Withdraw { position_id: u64 },
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Stake { lock_days, .. } => write!(f, "Stake ({} days)", lock_days),
            TransactionKind::Withdraw { position_id } => write!(f, "Withdraw position #{}", position_id),
        }
    }
}

/// Handle to a broadcast transaction that has not been confirmed yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    pub hash: B256,
    pub kind: TransactionKind,
}

/// A mined transaction with a successful receipt
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub tx_hash: B256,
    pub block_number: u64,
    pub kind: TransactionKind,
}
