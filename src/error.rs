// src/error.rs
use thiserror::Error;

/// Errors surfaced by the staking core.
///
/// Session and gateway failures reach `PositionSync` and the orchestrator
/// unmodified and are wrapped there into `Sync` / `TransactionFailed`.
/// Validation errors are raised before any chain interaction and never wrapped.
#[derive(Debug, Error)]
pub enum StakingError {
    #[error("No wallet provider available: {0}")]
    ProviderUnavailable(String),

    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wallet session is not connected")]
    SessionNotReady,

    #[error("Chain call failed: {0}")]
    ChainCall(String),

    #[error("Position sync failed: {0}")]
    Sync(#[source] Box<StakingError>),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid lock tier: {0} days")]
    InvalidLockTier(u64),

    #[error("Position {0} is not withdrawable")]
    PositionNotWithdrawable(u64),

    #[error("Transaction failed: {0}")]
    TransactionFailed(#[source] Box<StakingError>),

    #[error("Another transaction is still pending")]
    TransactionPending,
}

impl StakingError {
    pub fn sync(cause: StakingError) -> Self {
        StakingError::Sync(Box::new(cause))
    }

    pub fn transaction_failed(cause: StakingError) -> Self {
        StakingError::TransactionFailed(Box::new(cause))
    }

    /// True for errors raised by local validation, before the chain is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StakingError::InvalidAmount(_)
                | StakingError::InvalidLockTier(_)
                | StakingError::PositionNotWithdrawable(_)
        )
    }

    /// Message shown to the user. Each variant renders distinguishably.
    pub fn user_message(&self) -> String {
        match self {
            StakingError::ProviderUnavailable(_) => {
                "No wallet found. Start your wallet provider and try again.".to_string()
            }
            StakingError::ConnectionRejected(_) => {
                "The wallet declined the connection request.".to_string()
            }
            StakingError::SessionNotReady => "Connect a wallet first.".to_string(),
            StakingError::ChainCall(reason) => format!("Network error: {}", reason),
            StakingError::Sync(cause) => {
                format!("Could not load your positions ({}). Try refreshing.", cause)
            }
            StakingError::InvalidAmount(reason) => {
                format!("Enter a positive amount ({}).", reason)
            }
            StakingError::InvalidLockTier(days) => {
                format!("{} days is not an available lock period.", days)
            }
            StakingError::PositionNotWithdrawable(id) => {
                format!("Position #{} is closed or unknown and cannot be withdrawn.", id)
            }
            StakingError::TransactionFailed(cause) => {
                format!("Transaction failed: {}. Nothing was retried.", cause)
            }
            StakingError::TransactionPending => {
                "Wait for the pending transaction to confirm.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StakingError>;
