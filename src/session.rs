// src/session.rs
//! Wallet connection tracking.
//!
//! The session state is a value changed only through [`SessionState::apply`],
//! and the current value is broadcast on a `watch` channel so the gateway and
//! position sync always read the live signer instead of a captured one.

use crate::error::{Result, StakingError};
use crate::signing::{Signer, WalletProvider};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected { address: Address, signer: Signer },
}

/// Provider events that move the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected(Signer),
    AccountChanged(Signer),
    Disconnected,
}

impl SessionState {
    pub fn address(&self) -> Option<Address> {
        match self {
            SessionState::Connected { address, .. } => Some(*address),
            SessionState::Disconnected => None,
        }
    }

    pub fn signer(&self) -> Option<&Signer> {
        match self {
            SessionState::Connected { signer, .. } => Some(signer),
            SessionState::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }

    /// Pure transition function for the session
    pub fn apply(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (_, SessionEvent::Connected(signer)) => SessionState::Connected {
                address: signer.address(),
                signer,
            },
            (SessionState::Connected { .. }, SessionEvent::AccountChanged(signer)) => {
                SessionState::Connected {
                    address: signer.address(),
                    signer,
                }
            }
            // an account switch reported while disconnected does not connect us
            (SessionState::Disconnected, SessionEvent::AccountChanged(_)) => SessionState::Disconnected,
            (_, SessionEvent::Disconnected) => SessionState::Disconnected,
        }
    }
}

pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    state: watch::Sender<SessionState>,
}

impl WalletSession {
    /// `provider` is `None` when the environment has no wallet at all.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self { provider, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn dispatch(&self, event: SessionEvent) -> SessionState {
        self.state.send_modify(|state| {
            let previous = std::mem::take(state);
            *state = previous.apply(event);
        });
        self.current()
    }

    /// Request account access from the wallet provider.
    pub async fn connect(&self) -> Result<SessionState> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| StakingError::ProviderUnavailable("no wallet provider configured".to_string()))?;

        if !provider.is_available().await {
            return Err(StakingError::ProviderUnavailable(provider.get_name()));
        }

        let accounts = provider.request_accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| StakingError::ConnectionRejected("wallet returned no accounts".to_string()))?;

        log::info!("Connected {} via {}", address, provider.get_name());
        Ok(self.dispatch(SessionEvent::Connected(Signer::new(address, provider))))
    }

    /// The wallet switched to another account.
    pub fn account_changed(&self, address: Address) -> SessionState {
        match &self.provider {
            Some(provider) => {
                log::info!("Active account changed to {}", address);
                self.dispatch(SessionEvent::AccountChanged(Signer::new(address, provider.clone())))
            }
            None => self.current(),
        }
    }

    pub fn disconnect(&self) -> SessionState {
        if self.current().is_connected() {
            log::info!("Wallet disconnected");
        }
        self.dispatch(SessionEvent::Disconnected)
    }

    /// Wallet balance in wei
    pub async fn balance(&self) -> Result<U256> {
        let signer = self.current().signer().cloned().ok_or(StakingError::SessionNotReady)?;
        signer.balance().await
    }
}
