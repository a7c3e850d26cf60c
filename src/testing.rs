// src/testing.rs
//! In-memory wallet and contract doubles shared by the unit tests.

use crate::contract::{
    Confirmation, IHackerStaking, PendingTransaction, RawPosition, StakingContract, TransactionKind,
};
use crate::error::{Result, StakingError};
use crate::signing::{TransactionReceipt, TransactionRequest, WalletProvider};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

/// Open-or-closed position with a 7% rate and `id` ether staked
pub fn raw_position(id: u64, unlock_date: u64, open: bool) -> RawPosition {
    RawPosition {
        position_id: id,
        wallet_address: Address::ZERO,
        created_date: 1_700_000_000,
        unlock_date,
        percent_interest_bps: 700,
        wei_staked: U256::from(id) * U256::from(ONE_ETHER),
        wei_interest: U256::from(ONE_ETHER / 10),
        open,
    }
}

fn to_contract_position(raw: &RawPosition) -> IHackerStaking::Position {
    IHackerStaking::Position {
        positionId: U256::from(raw.position_id),
        walletAddress: raw.wallet_address,
        createdDate: U256::from(raw.created_date),
        unlockDate: U256::from(raw.unlock_date),
        percentInterest: U256::from(raw.percent_interest_bps),
        weiStaked: raw.wei_staked,
        weiInterest: raw.wei_interest,
        open: raw.open,
    }
}

/// Wallet provider that also plays the staking contract behind `eth_call`
/// and `eth_sendTransaction`.
pub struct MockWallet {
    accounts: Vec<Address>,
    available: AtomicBool,
    reject: AtomicBool,
    revert: AtomicBool,
    mining: AtomicBool,
    balance: Mutex<U256>,
    positions: Mutex<Vec<(Address, RawPosition)>>,
    sent: Mutex<Vec<TransactionRequest>>,
    receipts: Mutex<HashMap<B256, TransactionReceipt>>,
    block: AtomicU64,
}

impl MockWallet {
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            available: AtomicBool::new(true),
            reject: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            mining: AtomicBool::new(true),
            balance: Mutex::new(U256::ZERO),
            positions: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            block: AtomicU64::new(100),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn reject_connection(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn set_revert(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    pub fn set_mining(&self, mining: bool) {
        self.mining.store(mining, Ordering::SeqCst);
    }

    pub fn set_balance(&self, balance: U256) {
        *self.balance.lock().unwrap() = balance;
    }

    pub fn add_position(&self, owner: Address, position: RawPosition) {
        self.positions.lock().unwrap().push((owner, position));
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn execute(&self, tx: &TransactionRequest) {
        let data = tx.data.as_ref();
        if let Ok(call) = IHackerStaking::closePositionCall::abi_decode(data, true) {
            let id = call.positionId.to::<u64>();
            for (_, position) in self.positions.lock().unwrap().iter_mut() {
                if position.position_id == id {
                    position.open = false;
                }
            }
        } else if let Ok(call) = IHackerStaking::stakeEtherCall::abi_decode(data, true) {
            let mut positions = self.positions.lock().unwrap();
            let id = positions.len() as u64 + 1;
            let days = call.numDays.to::<u64>();
            let mut position = raw_position(id, 1_700_000_000 + days * 86_400, true);
            position.wei_staked = tx.value.unwrap_or_default();
            positions.push((tx.from.unwrap_or_default(), position));
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn get_name(&self) -> String {
        "Mock Wallet".to_string()
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(StakingError::ConnectionRejected("User rejected the request.".to_string()));
        }
        Ok(self.accounts.clone())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        let data = tx.data.as_ref();
        let positions = self.positions.lock().unwrap();

        if let Ok(call) = IHackerStaking::getPositionIdsForAddressCall::abi_decode(data, true) {
            let ids: Vec<U256> = positions
                .iter()
                .filter(|(owner, _)| *owner == call.walletAddress)
                .map(|(_, p)| U256::from(p.position_id))
                .collect();
            return Ok(IHackerStaking::getPositionIdsForAddressCall::abi_encode_returns(&(ids,)).into());
        }

        if let Ok(call) = IHackerStaking::getPositionByIdCall::abi_decode(data, true) {
            let id = call.positionId.to::<u64>();
            return match positions.iter().find(|(_, p)| p.position_id == id) {
                Some((_, p)) => {
                    Ok(IHackerStaking::getPositionByIdCall::abi_encode_returns(&(to_contract_position(p),)).into())
                }
                None => Err(StakingError::ChainCall("execution reverted".to_string())),
            };
        }

        Err(StakingError::ChainCall("unknown selector".to_string()))
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256> {
        let nonce = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(tx.clone());
            sent.len() as u64
        };
        let hash = B256::from(U256::from(nonce));

        if self.mining.load(Ordering::SeqCst) {
            let reverted = self.revert.load(Ordering::SeqCst);
            if !reverted {
                self.execute(tx);
            }
            let block = self.block.fetch_add(1, Ordering::SeqCst);
            self.receipts.lock().unwrap().insert(
                hash,
                TransactionReceipt {
                    transaction_hash: hash,
                    block_number: Some(U64::from(block)),
                    status: Some(if reverted { U64::ZERO } else { U64::from(1u64) }),
                },
            );
        }
        Ok(hash)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }
}

/// Contract double with call counters, per-id latency and failure injection.
#[derive(Default)]
pub struct MockContract {
    ids: Mutex<HashMap<Address, Vec<u64>>>,
    positions: Mutex<HashMap<u64, RawPosition>>,
    delays: Mutex<HashMap<u64, Duration>>,
    failing: Mutex<HashSet<u64>>,
    fetch_gate: Mutex<Option<Arc<Semaphore>>>,
    confirm_gate: Mutex<Option<Arc<Semaphore>>>,
    fail_submit: AtomicBool,
    fail_confirm: AtomicBool,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub stake_calls: AtomicUsize,
    pub withdraw_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
}

impl MockContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_positions(&self, owner: Address, positions: Vec<RawPosition>) {
        let ids = positions.iter().map(|p| p.position_id).collect();
        self.ids.lock().unwrap().insert(owner, ids);
        let mut all = self.positions.lock().unwrap();
        for position in positions {
            all.insert(position.position_id, position);
        }
    }

    pub fn set_delay(&self, id: u64, delay: Duration) {
        self.delays.lock().unwrap().insert(id, delay);
    }

    pub fn fail_position(&self, id: u64) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Block every `get_position` until the returned semaphore gets permits
    pub fn hold_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.fetch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Block every `confirm` until the returned semaphore gets permits
    pub fn hold_confirmations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.confirm_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_confirm(&self, fail: bool) {
        self.fail_confirm.store(fail, Ordering::SeqCst);
    }

    pub fn chain_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.get_calls.load(Ordering::SeqCst)
            + self.stake_calls.load(Ordering::SeqCst)
            + self.withdraw_calls.load(Ordering::SeqCst)
    }

    fn pending(&self, kind: TransactionKind) -> Result<PendingTransaction> {
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(StakingError::ChainCall("insufficient funds for gas".to_string()));
        }
        let n = (self.stake_calls.load(Ordering::SeqCst) + self.withdraw_calls.load(Ordering::SeqCst)) as u64;
        Ok(PendingTransaction {
            hash: B256::from(U256::from(n)),
            kind,
        })
    }
}

#[async_trait]
impl StakingContract for MockContract {
    async fn list_position_ids(&self, owner: Address) -> Result<Vec<u64>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.lock().unwrap().get(&owner).cloned().unwrap_or_default())
    }

    async fn get_position(&self, position_id: u64) -> Result<RawPosition> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        let delay = self.delays.lock().unwrap().get(&position_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&position_id) {
            return Err(StakingError::ChainCall(format!("position {} unavailable", position_id)));
        }
        self.positions
            .lock()
            .unwrap()
            .get(&position_id)
            .cloned()
            .ok_or_else(|| StakingError::ChainCall("execution reverted".to_string()))
    }

    async fn stake(&self, lock_days: u64, amount: U256) -> Result<PendingTransaction> {
        self.stake_calls.fetch_add(1, Ordering::SeqCst);
        self.pending(TransactionKind::Stake { lock_days, amount })
    }

    async fn withdraw(&self, position_id: u64) -> Result<PendingTransaction> {
        self.withdraw_calls.fetch_add(1, Ordering::SeqCst);
        self.pending(TransactionKind::Withdraw { position_id })
    }

    async fn confirm(&self, pending: &PendingTransaction) -> Result<Confirmation> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.confirm_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(StakingError::ChainCall(format!("Transaction {} reverted", pending.hash)));
        }
        if let TransactionKind::Withdraw { position_id } = pending.kind {
            if let Some(position) = self.positions.lock().unwrap().get_mut(&position_id) {
                position.open = false;
            }
        }
        Ok(Confirmation {
            tx_hash: pending.hash,
            block_number: 1,
            kind: pending.kind.clone(),
        })
    }
}
