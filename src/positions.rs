// src/positions.rs
//! Synchronized view of the connected wallet's staking positions.

use crate::contract::{RawPosition, StakingContract};
use crate::error::{Result, StakingError};
use crate::session::SessionState;
use crate::unlock::{days_remaining, Clock};
use crate::units::to_display_unit;
use alloy_primitives::{Address, U256};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tokio::sync::watch;

/// A staking position normalized for display
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub position_id: u64,
    pub percent_interest_bps: u64,
    /// Percentage, 700 bps -> 7.0
    pub percent_interest: f64,
    pub created_date: u64,
    pub unlock_date: u64,
    pub wei_staked: U256,
    pub wei_interest: U256,
    pub open: bool,
    pub days_remaining: u64,
    pub ether_staked: String,
    pub ether_interest: String,
}

impl Position {
    pub fn from_raw(raw: RawPosition, now: u64) -> Self {
        Position {
            position_id: raw.position_id,
            percent_interest_bps: raw.percent_interest_bps,
            percent_interest: raw.percent_interest_bps as f64 / 100.0,
            created_date: raw.created_date,
            unlock_date: raw.unlock_date,
            days_remaining: days_remaining(raw.unlock_date, now),
            ether_staked: to_display_unit(raw.wei_staked),
            ether_interest: to_display_unit(raw.wei_interest),
            wei_staked: raw.wei_staked,
            wei_interest: raw.wei_interest,
            open: raw.open,
        }
    }
}

/// The published list and the address it was synced for
#[derive(Debug, Clone, Default)]
pub struct PublishedPositions {
    pub owner: Option<Address>,
    pub positions: Arc<Vec<Position>>,
}

#[derive(Debug, Clone)]
pub enum SyncOutcome {
    Published,
    /// The session moved to another address while fetching; nothing changed
    Discarded,
}

pub struct PositionSync {
    contract: Arc<dyn StakingContract>,
    session: watch::Receiver<SessionState>,
    clock: Arc<dyn Clock>,
    published: watch::Sender<PublishedPositions>,
}

impl PositionSync {
    pub fn new(
        contract: Arc<dyn StakingContract>,
        session: watch::Receiver<SessionState>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (published, _) = watch::channel(PublishedPositions::default());
        Self {
            contract,
            session,
            clock,
            published,
        }
    }

    /// Published positions, empty unless they belong to the connected address.
    pub fn positions(&self) -> Arc<Vec<Position>> {
        let published = self.published.borrow();
        let current = self.session.borrow().address();
        if current.is_some() && published.owner == current {
            published.positions.clone()
        } else {
            Arc::new(Vec::new())
        }
    }

    /// Drop the published list, e.g. after a disconnect.
    pub fn invalidate(&self) {
        self.published.send_replace(PublishedPositions::default());
    }

    /// Fetch every position of `address` and publish them in contract order.
    ///
    /// All detail fetches run concurrently; if any fails nothing is published.
    pub async fn refresh(&self, address: Address) -> Result<SyncOutcome> {
        let ids = self
            .contract
            .list_position_ids(address)
            .await
            .map_err(StakingError::sync)?;
        log::info!("Fetching {} position(s) for {}", ids.len(), address);

        let raw = try_join_all(ids.iter().map(|id| self.contract.get_position(*id)))
            .await
            .map_err(|e| {
                log::warn!("Position sync for {} failed: {}", address, e);
                StakingError::sync(e)
            })?;

        let now = self.clock.now();
        let positions: Arc<Vec<Position>> =
            Arc::new(raw.into_iter().map(|p| Position::from_raw(p, now)).collect());

        // the session may have changed while we were suspended
        if self.session.borrow().address() != Some(address) {
            log::info!("Discarding stale positions for {}", address);
            return Ok(SyncOutcome::Discarded);
        }

        self.published.send_replace(PublishedPositions {
            owner: Some(address),
            positions,
        });
        Ok(SyncOutcome::Published)
    }
}
