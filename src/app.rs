// src/app.rs
//! Event controller tying the wallet session, position sync, tabs and
//! transaction orchestration together. The presentation layer only sends
//! [`UiEvent`]s and renders [`AppState`].

use crate::config::AppConfig;
use crate::contract::{Confirmation, ContractGateway, StakingContract};
use crate::error::{Result, StakingError};
use crate::orchestrator::{StakeRequest, TransactionOrchestrator, WithdrawRequest};
use crate::positions::{Position, PositionSync};
use crate::session::WalletSession;
use crate::signing::WalletProvider;
use crate::tabs::{Tab, TabCommand, TabStateMachine};
use crate::unlock::{Clock, SystemClock};
use alloy_primitives::{Address, U256};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Connect,
    Disconnect,
    AccountChanged(Address),
    SwitchToStake,
    SwitchToUnstake,
    Refresh,
    RefreshBalance,
    SubmitStake(StakeRequest),
    SubmitWithdraw(WithdrawRequest),
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub tab: Tab,
    pub address: Option<Address>,
    pub balance: Option<U256>,
    pub positions: Arc<Vec<Position>>,
    pub pending: bool,
    pub last_error: Option<String>,
    pub last_confirmation: Option<Confirmation>,
}

impl AppState {
    /// Why a submission cannot be sent right now, if anything blocks it.
    pub fn submit_blocker(&self) -> Option<StakingError> {
        if self.address.is_none() {
            Some(StakingError::SessionNotReady)
        } else if self.pending {
            Some(StakingError::TransactionPending)
        } else {
            None
        }
    }
}

pub struct StakingApp {
    session: WalletSession,
    sync: PositionSync,
    tabs: TabStateMachine,
    orchestrator: TransactionOrchestrator,
    state: AppState,
}

impl StakingApp {
    pub fn new(session: WalletSession, contract: Arc<dyn StakingContract>, clock: Arc<dyn Clock>) -> Self {
        let sync = PositionSync::new(contract.clone(), session.subscribe(), clock);
        Self {
            session,
            sync,
            tabs: TabStateMachine::new(),
            orchestrator: TransactionOrchestrator::new(contract),
            state: AppState::default(),
        }
    }

    /// Wire the real contract gateway for `config`.
    pub fn from_config(config: &AppConfig, provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let session = WalletSession::new(provider);
        let gateway = ContractGateway::new(
            config.contract_address,
            session.subscribe(),
            config.poll_interval,
            config.confirmation_timeout,
        );
        Self::new(session, Arc::new(gateway), Arc::new(SystemClock))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle one user or provider event. Failures are also recorded as
    /// `last_error` in their user-facing form.
    pub async fn handle(&mut self, event: UiEvent) -> Result<()> {
        let result = self.apply(event).await;
        match &result {
            Ok(()) => self.state.last_error = None,
            Err(e) => {
                if e.is_validation() {
                    log::info!("Rejected input: {}", e);
                } else {
                    log::warn!("{}", e);
                }
                self.state.last_error = Some(e.user_message());
            }
        }
        self.sync_view();
        result
    }

    async fn apply(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::Connect => {
                let previous = self.session.current().address();
                let connected = self.session.connect().await?;
                if connected.address() != previous {
                    self.sync.invalidate();
                }
                self.after_session_change().await
            }
            UiEvent::Disconnect => {
                self.session.disconnect();
                self.sync.invalidate();
                self.state.balance = None;
                Ok(())
            }
            UiEvent::AccountChanged(address) => {
                self.session.account_changed(address);
                self.sync.invalidate();
                self.state.balance = None;
                self.after_session_change().await
            }
            UiEvent::SwitchToStake => self.switch(TabCommand::SwitchToStake).await,
            UiEvent::SwitchToUnstake => self.switch(TabCommand::SwitchToUnstake).await,
            UiEvent::Refresh => {
                let address = self.connected_address()?;
                self.sync.refresh(address).await.map(|_| ())
            }
            UiEvent::RefreshBalance => {
                self.state.balance = Some(self.session.balance().await?);
                Ok(())
            }
            UiEvent::SubmitStake(request) => {
                let address = self.connected_address()?;
                self.state.pending = true;
                let result = self.orchestrator.submit_stake(&request).await;
                self.state.pending = false;
                self.after_confirmation(address, result?).await
            }
            UiEvent::SubmitWithdraw(request) => {
                let address = self.connected_address()?;
                let positions = self.sync.positions();
                self.state.pending = true;
                let result = self.orchestrator.submit_withdraw(request, &positions).await;
                self.state.pending = false;
                self.after_confirmation(address, result?).await
            }
        }
    }

    fn connected_address(&self) -> Result<Address> {
        self.session.current().address().ok_or(StakingError::SessionNotReady)
    }

    async fn switch(&mut self, command: TabCommand) -> Result<()> {
        let session = self.session.current();
        self.tabs.dispatch(command, &session, &self.sync).await.map(|_| ())
    }

    async fn after_session_change(&mut self) -> Result<()> {
        let Some(address) = self.session.current().address() else {
            return Ok(());
        };
        match self.session.balance().await {
            Ok(balance) => self.state.balance = Some(balance),
            Err(e) => log::warn!("Could not load balance for {}: {}", address, e),
        }
        if self.tabs.current() == Tab::Unstake {
            self.sync.refresh(address).await?;
        }
        Ok(())
    }

    /// The chain state changed; reload what depends on it.
    async fn after_confirmation(&mut self, address: Address, confirmation: Confirmation) -> Result<()> {
        log::info!("{} confirmed ({})", confirmation.kind, confirmation.tx_hash);
        self.state.last_confirmation = Some(confirmation);
        match self.session.balance().await {
            Ok(balance) => self.state.balance = Some(balance),
            Err(e) => log::warn!("Could not reload balance for {}: {}", address, e),
        }
        self.sync.refresh(address).await.map(|_| ())
    }

    fn sync_view(&mut self) {
        self.state.tab = self.tabs.current();
        self.state.address = self.session.current().address();
        self.state.positions = self.sync.positions();
        self.state.pending = self.orchestrator.is_pending();
    }
}
