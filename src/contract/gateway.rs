// src/contract/gateway.rs
//! Typed binding of the deployed HackerStakingContract

use crate::contract::{Confirmation, PendingTransaction, RawPosition, StakingContract, TransactionKind};
use crate::error::{Result, StakingError};
use crate::session::SessionState;
use crate::signing::{Signer, TransactionReceipt};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;

sol! {
    /// HackerStakingContract interface as deployed
    interface IHackerStaking {
        struct Position {
            uint256 positionId;
            address walletAddress;
            uint256 createdDate;
            uint256 unlockDate;
            uint256 percentInterest;
            uint256 weiStaked;
            uint256 weiInterest;
            bool open;
        }

        function getPositionIdsForAddress(address walletAddress) external view returns (uint256[] memory positionIds);
        function getPositionById(uint256 positionId) external view returns (Position memory position);
        function stakeEther(uint256 numDays) external payable;
        function closePosition(uint256 positionId) external;
    }
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| StakingError::ChainCall(format!("{} out of range: {}", field, value)))
}

impl TryFrom<IHackerStaking::Position> for RawPosition {
    type Error = StakingError;

    fn try_from(p: IHackerStaking::Position) -> Result<Self> {
        Ok(RawPosition {
            position_id: to_u64(p.positionId, "positionId")?,
            wallet_address: p.walletAddress,
            created_date: to_u64(p.createdDate, "createdDate")?,
            unlock_date: to_u64(p.unlockDate, "unlockDate")?,
            percent_interest_bps: to_u64(p.percentInterest, "percentInterest")?,
            wei_staked: p.weiStaked,
            wei_interest: p.weiInterest,
            open: p.open,
        })
    }
}

/// Contract client bound to whatever signer the wallet session currently holds
pub struct ContractGateway {
    address: Address,
    session: watch::Receiver<SessionState>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl ContractGateway {
    pub fn new(
        address: Address,
        session: watch::Receiver<SessionState>,
        poll_interval: Duration,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            address,
            session,
            poll_interval,
            confirmation_timeout,
        }
    }

    fn signer(&self) -> Result<Signer> {
        self.session
            .borrow()
            .signer()
            .cloned()
            .ok_or(StakingError::SessionNotReady)
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let signer = self.signer()?;
        let output = signer.call(self.address, call.abi_encode().into()).await?;
        C::abi_decode_returns(&output, true)
            .map_err(|e| StakingError::ChainCall(format!("Failed to decode {}: {}", C::SIGNATURE, e)))
    }

    async fn submit<C: SolCall>(&self, call: C, value: Option<U256>, kind: TransactionKind) -> Result<PendingTransaction> {
        let signer = self.signer()?;
        log::info!("Sending {} to {} from {}", C::SIGNATURE, self.address, signer.address());
        let hash = signer.send(self.address, value, call.abi_encode().into()).await?;
        Ok(PendingTransaction { hash, kind })
    }
}

async fn poll_receipt(signer: &Signer, hash: B256, poll_interval: Duration) -> Result<TransactionReceipt> {
    loop {
        match signer.receipt(hash).await? {
            Some(receipt) if receipt.block_number.is_some() => return Ok(receipt),
            _ => {
                log::debug!("Transaction {} not mined yet", hash);
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

#[async_trait]
impl StakingContract for ContractGateway {
    async fn list_position_ids(&self, owner: Address) -> Result<Vec<u64>> {
        let ids = self
            .read(IHackerStaking::getPositionIdsForAddressCall { walletAddress: owner })
            .await?
            .positionIds;
        ids.into_iter().map(|id| to_u64(id, "positionId")).collect()
    }

    async fn get_position(&self, position_id: u64) -> Result<RawPosition> {
        let position = self
            .read(IHackerStaking::getPositionByIdCall {
                positionId: U256::from(position_id),
            })
            .await?
            .position;
        RawPosition::try_from(position)
    }

    async fn stake(&self, lock_days: u64, amount: U256) -> Result<PendingTransaction> {
        self.submit(
            IHackerStaking::stakeEtherCall {
                numDays: U256::from(lock_days),
            },
            Some(amount),
            TransactionKind::Stake { lock_days, amount },
        )
        .await
    }

    async fn withdraw(&self, position_id: u64) -> Result<PendingTransaction> {
        self.submit(
            IHackerStaking::closePositionCall {
                positionId: U256::from(position_id),
            },
            None,
            TransactionKind::Withdraw { position_id },
        )
        .await
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<Confirmation> {
        let signer = self.signer()?;
        let receipt = tokio::time::timeout(
            self.confirmation_timeout,
            poll_receipt(&signer, pending.hash, self.poll_interval),
        )
        .await
        .map_err(|_| {
            StakingError::ChainCall(format!(
                "No receipt for {} after {:?}",
                pending.hash, self.confirmation_timeout
            ))
        })??;

        if !receipt.succeeded() {
            return Err(StakingError::ChainCall(format!("Transaction {} reverted", pending.hash)));
        }

        let block_number = receipt.block_number.map(|b| b.to::<u64>()).unwrap_or_default();
        log::info!("{} confirmed in block {}", pending.kind, block_number);
        Ok(Confirmation {
            tx_hash: pending.hash,
            block_number,
            kind: pending.kind.clone(),
        })
    }
}
