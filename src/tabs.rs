// src/tabs.rs
//! Stake / Unstake panel switching.

use crate::error::Result;
use crate::positions::{PositionSync, SyncOutcome};
use crate::session::SessionState;
use alloy_primitives::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Stake,
    Unstake,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::Stake => write!(f, "Stake"),
            Tab::Unstake => write!(f, "Unstake"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabCommand {
    SwitchToStake,
    SwitchToUnstake,
}

/// Work a transition asks the caller to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEffect {
    RefreshPositions(Address),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabTransition {
    pub next: Tab,
    pub effect: Option<TabEffect>,
}

/// Pure transition function. Entering Unstake with a connected session asks
/// for a position refresh; everything else is a plain state change or a no-op.
pub fn transition(current: Tab, command: TabCommand, session: &SessionState) -> TabTransition {
    match (current, command) {
        (Tab::Stake, TabCommand::SwitchToUnstake) => TabTransition {
            next: Tab::Unstake,
            effect: session.address().map(TabEffect::RefreshPositions),
        },
        (Tab::Unstake, TabCommand::SwitchToStake) => TabTransition {
            next: Tab::Stake,
            effect: None,
        },
        (tab, _) => TabTransition {
            next: tab,
            effect: None,
        },
    }
}

/// Holds the active tab for the lifetime of the session
#[derive(Debug, Default)]
pub struct TabStateMachine {
    tab: Tab,
}

impl TabStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Tab {
        self.tab
    }

    /// Apply `command`, running its refresh effect through `sync`.
    ///
    /// The tab changes even if the refresh fails; the failure is returned.
    pub async fn dispatch(
        &mut self,
        command: TabCommand,
        session: &SessionState,
        sync: &PositionSync,
    ) -> Result<Option<SyncOutcome>> {
        let step = transition(self.tab, command, session);
        if step.next != self.tab {
            log::debug!("Tab {} -> {}", self.tab, step.next);
        }
        self.tab = step.next;

        match step.effect {
            Some(TabEffect::RefreshPositions(address)) => sync.refresh(address).await.map(Some),
            None => Ok(None),
        }
    }
}
