// src/orchestrator.rs
//! Validated stake / withdraw submission with wait-for-confirmation.

use crate::config::tiers::LockTier;
use crate::contract::{Confirmation, StakingContract};
use crate::error::{Result, StakingError};
use crate::positions::Position;
use crate::units::to_base_unit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeRequest {
    pub amount_display_unit: String,
    pub lock_days: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub position_id: u64,
}

/// Releases the single-flight flag when the submission finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct TransactionOrchestrator {
    contract: Arc<dyn StakingContract>,
    in_flight: AtomicBool,
}

impl TransactionOrchestrator {
    pub fn new(contract: Arc<dyn StakingContract>) -> Self {
        Self {
            contract,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a submission is waiting for the chain
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| StakingError::TransactionPending)
    }

    pub async fn submit_stake(&self, request: &StakeRequest) -> Result<Confirmation> {
        let amount = to_base_unit(&request.amount_display_unit)?;
        if amount.is_zero() {
            return Err(StakingError::InvalidAmount("amount must be greater than zero".to_string()));
        }
        let tier = LockTier::from_days(request.lock_days)
            .ok_or(StakingError::InvalidLockTier(request.lock_days))?;
        let _guard = self.begin()?;

        log::info!(
            "Staking {} ETH for {} days ({}% APY tier)",
            request.amount_display_unit.trim(),
            tier.days,
            tier.apy_percent
        );
        let pending = self
            .contract
            .stake(tier.days, amount)
            .await
            .map_err(StakingError::transaction_failed)?;
        self.contract
            .confirm(&pending)
            .await
            .map_err(StakingError::transaction_failed)
    }

    /// `published` is the position list currently shown to the user.
    pub async fn submit_withdraw(&self, request: WithdrawRequest, published: &[Position]) -> Result<Confirmation> {
        let withdrawable = published
            .iter()
            .any(|p| p.position_id == request.position_id && p.open);
        if !withdrawable {
            return Err(StakingError::PositionNotWithdrawable(request.position_id));
        }
        let _guard = self.begin()?;

        log::info!("Withdrawing position #{}", request.position_id);
        let pending = self
            .contract
            .withdraw(request.position_id)
            .await
            .map_err(StakingError::transaction_failed)?;
        self.contract
            .confirm(&pending)
            .await
            .map_err(StakingError::transaction_failed)
    }
}
