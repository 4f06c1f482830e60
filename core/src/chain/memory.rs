//! In-memory chain used by the CLI and the test-suite.
//!
//! Contracts are backed by [`ContractLogic`] implementations registered by
//! artifact name. State changes of a reverted transaction are discarded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hashbrown::HashMap;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tokio::sync::Mutex;

use super::{Chain, ChainError, ContractHandle, LogEntry, TxOptions, TxOutcome, TxReceipt};
use crate::values::{Address, Wire};

const ACCOUNT_PREFIX: u8 = 0xac;
const CONTRACT_PREFIX: u8 = 0xc0;
const DEFAULT_ACCOUNTS: u64 = 10;
const GAS_TRANSFER: u64 = 21_000;
const GAS_CALL: u64 = 50_000;
const GAS_DEPLOY: u64 = 500_000;

/// Key-value storage of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractState {
    slots: HashMap<String, Wire>,
}

impl ContractState {
    pub fn get(&self, key: &str) -> Option<&Wire> {
        self.slots.get(key)
    }

    /// Integer slot, zero when unset.
    pub fn get_int(&self, key: &str) -> BigInt {
        self.slots
            .get(key)
            .and_then(Wire::as_int)
            .cloned()
            .unwrap_or_else(BigInt::zero)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Wire) {
        self.slots.insert(key.into(), value);
    }
}

/// Caller context handed to contract logic.
#[derive(Debug, Clone)]
pub struct CallEnv {
    pub sender: Address,
    pub this: Address,
    pub value: BigInt,
    pub block: u64,
    pub timestamp: u64,
}

/// Result of executing a state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Logs(Vec<LogEntry>),
    Revert(String),
    Failure {
        error: String,
        info: String,
        detail: String,
    },
}

/// Behaviour of a contract artifact.
pub trait ContractLogic: Send + Sync {
    fn construct(
        &self,
        _state: &mut ContractState,
        _env: &CallEnv,
        _args: &[Wire],
    ) -> Result<Effect, ChainError> {
        Ok(Effect::Logs(Vec::new()))
    }

    fn read(&self, state: &ContractState, method: &str, args: &[Wire]) -> Result<Wire, ChainError>;

    fn write(
        &self,
        state: &mut ContractState,
        env: &CallEnv,
        method: &str,
        args: &[Wire],
    ) -> Result<Effect, ChainError>;
}

/// Text form of a wire value used as a storage key.
pub fn wire_key(wire: &Wire) -> String {
    match wire {
        Wire::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Generic key-value contract, artifact name `Storage`.
///
/// * `get key` reads a slot (null when unset)
/// * `set key value` writes a slot and emits `Set`
/// * `fail reason` reverts
/// * `error code info detail` reports a failure without reverting
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageContract;

impl StorageContract {
    pub const ARTIFACT: &'static str = "Storage";
}

fn expect_args(method: &str, args: &[Wire], count: usize) -> Result<(), ChainError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ChainError::BadArguments {
            method: method.to_string(),
            reason: format!("expected {} arguments, got {}", count, args.len()),
        })
    }
}

impl ContractLogic for StorageContract {
    fn read(&self, state: &ContractState, method: &str, args: &[Wire]) -> Result<Wire, ChainError> {
        match method {
            "get" => {
                expect_args(method, args, 1)?;
                Ok(state.get(&wire_key(&args[0])).cloned().unwrap_or(Wire::Null))
            }
            _ => Err(ChainError::UnknownMethod {
                artifact: Self::ARTIFACT.to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn write(
        &self,
        state: &mut ContractState,
        _env: &CallEnv,
        method: &str,
        args: &[Wire],
    ) -> Result<Effect, ChainError> {
        match method {
            "set" => {
                expect_args(method, args, 2)?;
                let key = wire_key(&args[0]);
                state.set(key.clone(), args[1].clone());
                Ok(Effect::Logs(vec![
                    LogEntry::new("Set")
                        .field("key", Wire::Str(key))
                        .field("value", args[1].clone()),
                ]))
            }
            "fail" => {
                expect_args(method, args, 1)?;
                Ok(Effect::Revert(wire_key(&args[0])))
            }
            "error" => {
                expect_args(method, args, 3)?;
                Ok(Effect::Failure {
                    error: wire_key(&args[0]),
                    info: wire_key(&args[1]),
                    detail: wire_key(&args[2]),
                })
            }
            _ => Err(ChainError::UnknownMethod {
                artifact: Self::ARTIFACT.to_string(),
                method: method.to_string(),
            }),
        }
    }
}

struct Deployed {
    artifact: String,
    state: ContractState,
}

struct ChainState {
    block: u64,
    timestamp: u64,
    nonce: u64,
    accounts: Vec<Address>,
    balances: HashMap<Address, BigInt>,
    contracts: HashMap<Address, Deployed>,
}

/// A deterministic single-process chain.
pub struct MemoryChain {
    state: Mutex<ChainState>,
    logic: HashMap<String, Arc<dyn ContractLogic>>,
}

impl MemoryChain {
    /// Chain with the default funded accounts and the `Storage` artifact.
    pub fn new() -> Self {
        let accounts: Vec<Address> = (0..DEFAULT_ACCOUNTS)
            .map(|i| Address::from_index(ACCOUNT_PREFIX, i))
            .collect();
        let funding = BigInt::from(10u32).pow(24);
        let balances = accounts
            .iter()
            .map(|account| (account.clone(), funding.clone()))
            .collect();

        let mut chain = Self {
            state: Mutex::new(ChainState {
                block: 1,
                timestamp: 1_600_000_000,
                nonce: 0,
                accounts,
                balances,
                contracts: HashMap::new(),
            }),
            logic: HashMap::new(),
        };
        chain
            .logic
            .insert(StorageContract::ARTIFACT.to_string(), Arc::new(StorageContract));
        chain
    }

    /// Register the logic backing an artifact name.
    pub fn with_logic(mut self, artifact: impl Into<String>, logic: impl ContractLogic + 'static) -> Self {
        self.logic.insert(artifact.into(), Arc::new(logic));
        self
    }

    fn logic_for(&self, artifact: &str) -> Result<&Arc<dyn ContractLogic>, ChainError> {
        self.logic
            .get(artifact)
            .ok_or_else(|| ChainError::UnknownArtifact(artifact.to_string()))
    }
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    fn env(&self, sender: &Address, this: &Address, value: BigInt) -> CallEnv {
        CallEnv {
            sender: sender.clone(),
            this: this.clone(),
            value,
            block: self.block,
            timestamp: self.timestamp,
        }
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: &BigInt) -> bool {
        if amount.is_negative() {
            return false;
        }
        let available = self.balances.get(from).cloned().unwrap_or_else(BigInt::zero);
        if &available < amount {
            return false;
        }
        self.balances.insert(from.clone(), available - amount);
        *self.balances.entry(to.clone()).or_insert_with(BigInt::zero) += amount;
        true
    }
}

fn receipt(effect: Effect, gas_used: u64) -> TxReceipt {
    match effect {
        Effect::Logs(logs) => TxReceipt::success(logs, gas_used),
        Effect::Revert(reason) => TxReceipt::revert(reason, gas_used),
        Effect::Failure {
            error,
            info,
            detail,
        } => TxReceipt {
            outcome: TxOutcome::Failure {
                error,
                info,
                detail,
            },
            logs: Vec::new(),
            gas_used,
            created: None,
        },
    }
}

#[async_trait]
impl Chain for MemoryChain {
    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.state.lock().await.accounts.clone())
    }

    async fn deploy(
        &self,
        artifact: &str,
        args: Vec<Wire>,
        from: &Address,
        options: &TxOptions,
    ) -> Result<TxReceipt, ChainError> {
        let logic = self.logic_for(artifact)?;
        let mut chain = self.state.lock().await;
        let address = Address::from_index(CONTRACT_PREFIX, chain.nonce);
        let value = options.value.clone().unwrap_or_else(BigInt::zero);
        let env = chain.env(from, &address, value.clone());

        let mut state = ContractState::default();
        let effect = logic.construct(&mut state, &env, &args)?;
        if !matches!(effect, Effect::Logs(_)) {
            tracing::debug!(artifact, "deployment reverted");
            return Ok(receipt(effect, GAS_DEPLOY));
        }
        if !chain.transfer(from, &address, &value) {
            return Ok(TxReceipt::revert("insufficient balance", GAS_DEPLOY));
        }

        chain.nonce += 1;
        chain.block += 1;
        chain.contracts.insert(
            address.clone(),
            Deployed {
                artifact: artifact.to_string(),
                state,
            },
        );
        tracing::debug!(artifact, %address, "deployed contract");

        let mut receipt = receipt(effect, GAS_DEPLOY);
        receipt.created = Some(address);
        Ok(receipt)
    }

    async fn call_read(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Wire>,
    ) -> Result<Wire, ChainError> {
        let chain = self.state.lock().await;
        let deployed = chain
            .contracts
            .get(&contract.address)
            .ok_or_else(|| ChainError::UnknownContract(contract.address.clone()))?;
        let logic = self.logic_for(&deployed.artifact)?;
        logic.read(&deployed.state, method, &args)
    }

    async fn send_tx(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Wire>,
        from: &Address,
        options: &TxOptions,
    ) -> Result<TxReceipt, ChainError> {
        let mut chain = self.state.lock().await;
        let value = options.value.clone().unwrap_or_else(BigInt::zero);
        let env = chain.env(from, &contract.address, value.clone());

        let deployed = chain
            .contracts
            .get(&contract.address)
            .ok_or_else(|| ChainError::UnknownContract(contract.address.clone()))?;
        let logic = self.logic_for(&deployed.artifact)?;

        let mut state = deployed.state.clone();
        let effect = logic.write(&mut state, &env, method, &args)?;
        if !matches!(effect, Effect::Logs(_)) {
            tracing::debug!(method, "transaction did not succeed");
            return Ok(receipt(effect, GAS_CALL));
        }
        if !chain.transfer(from, &contract.address, &value) {
            return Ok(TxReceipt::revert("insufficient balance", GAS_CALL));
        }

        if let Some(deployed) = chain.contracts.get_mut(&contract.address) {
            deployed.state = state;
        }
        chain.block += 1;
        Ok(receipt(effect, GAS_CALL))
    }

    async fn send_value(
        &self,
        from: &Address,
        to: &Address,
        amount: BigInt,
    ) -> Result<TxReceipt, ChainError> {
        let mut chain = self.state.lock().await;
        if !chain.transfer(from, to, &amount) {
            return Ok(TxReceipt::revert("insufficient balance", GAS_TRANSFER));
        }
        chain.block += 1;
        Ok(TxReceipt::success(Vec::new(), GAS_TRANSFER))
    }

    async fn balance(&self, account: &Address) -> Result<BigInt, ChainError> {
        let chain = self.state.lock().await;
        Ok(chain.balances.get(account).cloned().unwrap_or_else(BigInt::zero))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().await.block)
    }

    async fn timestamp(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().await.timestamp)
    }

    /// Advances the clock by `duration` and produces one block.
    async fn sleep(&self, duration: Duration) -> Result<(), ChainError> {
        let mut chain = self.state.lock().await;
        chain.timestamp += duration.as_secs().max(1);
        chain.block += 1;
        Ok(())
    }

    async fn mine(&self, blocks: u64) -> Result<(), ChainError> {
        self.state.lock().await.block += blocks;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_storage_round_trip() {
        let chain = MemoryChain::new();
        let from = chain.accounts().await.unwrap()[0].clone();
        let deployed = chain
            .deploy("Storage", vec![], &from, &TxOptions::default())
            .await
            .unwrap();
        let handle = ContractHandle {
            address: deployed.created.unwrap(),
            artifact: "Storage".to_string(),
        };

        let args = vec![Wire::Str("k".into()), Wire::Int(BigInt::from(5))];
        let receipt = chain
            .send_tx(&handle, "set", args, &from, &TxOptions::default())
            .await
            .unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.logs[0].name, "Set");

        let read = chain
            .call_read(&handle, "get", vec![Wire::Str("k".into())])
            .await
            .unwrap();
        assert_eq!(read, Wire::Int(BigInt::from(5)));
    }

    #[tokio::test]
    async fn test_revert_reports_reason_without_mining() {
        let chain = MemoryChain::new();
        let from = chain.accounts().await.unwrap()[0].clone();
        let address = chain
            .deploy("Storage", vec![], &from, &TxOptions::default())
            .await
            .unwrap()
            .created
            .unwrap();
        let handle = ContractHandle {
            address,
            artifact: "Storage".to_string(),
        };
        let block = chain.block_number().await.unwrap();

        let receipt = chain
            .send_tx(&handle, "fail", vec![Wire::Str("nope".into())], &from, &TxOptions::default())
            .await
            .unwrap();
        assert_eq!(
            receipt.outcome,
            TxOutcome::Revert {
                reason: "nope".to_string()
            }
        );
        assert_eq!(chain.block_number().await.unwrap(), block);
    }

    #[tokio::test]
    async fn test_unknown_artifact() {
        let chain = MemoryChain::new();
        let from = Address::from_index(ACCOUNT_PREFIX, 0);
        let err = chain
            .deploy("Missing", vec![], &from, &TxOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ChainError::UnknownArtifact("Missing".to_string()));
    }

    #[tokio::test]
    async fn test_send_value_moves_balance() {
        let chain = MemoryChain::new();
        let accounts = chain.accounts().await.unwrap();
        let before = chain.balance(&accounts[1]).await.unwrap();
        let receipt = chain
            .send_value(&accounts[0], &accounts[1], BigInt::from(7))
            .await
            .unwrap();
        assert!(receipt.is_success());
        assert_eq!(chain.balance(&accounts[1]).await.unwrap(), before + 7);
    }

    #[tokio::test]
    async fn test_sleep_and_mine_advance_chain() {
        let chain = MemoryChain::new();
        let (block, time) = (
            chain.block_number().await.unwrap(),
            chain.timestamp().await.unwrap(),
        );
        chain.sleep(Duration::from_secs(30)).await.unwrap();
        chain.mine(4).await.unwrap();
        assert_eq!(chain.timestamp().await.unwrap(), time + 30);
        assert_eq!(chain.block_number().await.unwrap(), block + 5);
    }
}
