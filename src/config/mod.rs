pub mod tiers;

use crate::storage::Settings;
use alloy_primitives::Address;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Local dev node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// First deployment address on a fresh Hardhat node
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid contract address '{0}'")]
    InvalidContractAddress(String),
    #[error("Invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
}

/// Runtime configuration for the staking client
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON-RPC endpoint of the wallet provider
    pub rpc_url: String,
    /// Deployed staking contract
    pub contract_address: Address,
    /// Delay between receipt polls while awaiting confirmation
    pub poll_interval: Duration,
    /// Give up waiting for a receipt after this long
    pub confirmation_timeout: Duration,
}

impl AppConfig {
    /// Layer defaults, the settings file, the environment and CLI overrides, in that order.
    pub fn resolve<F>(
        settings: &Settings,
        env: F,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = overrides
            .rpc_url
            .clone()
            .or_else(|| env("STAKING_RPC_URL"))
            .or_else(|| settings.rpc_url.clone())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let contract = overrides
            .contract_address
            .clone()
            .or_else(|| env("STAKING_CONTRACT_ADDRESS"))
            .or_else(|| settings.contract_address.clone())
            .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract_address = Address::from_str(contract.trim())
            .map_err(|_| ConfigError::InvalidContractAddress(contract.clone()))?;

        let poll_ms = read_number(&env, "STAKING_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let timeout_secs = read_number(
            &env,
            "STAKING_CONFIRMATION_TIMEOUT_SECS",
            DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        )?;

        Ok(Self {
            rpc_url,
            contract_address,
            poll_interval: Duration::from_millis(poll_ms),
            confirmation_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Load configuration from the process environment
    pub fn from_env(settings: &Settings, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(settings, |key| std::env::var(key).ok(), overrides)
    }

    /// Settings worth persisting for the next run
    pub fn to_settings(&self) -> Settings {
        Settings {
            rpc_url: Some(self.rpc_url.clone()),
            contract_address: Some(self.contract_address.to_string()),
        }
    }
}

fn read_number<F>(env: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}
