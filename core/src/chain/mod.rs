//! The chain capability consumed by the interpreter.
//!
//! The interpreter never looks behind this trait: contract reads, state
//! changing transactions, the block/clock queries and the sleep primitives
//! are the only suspension points of a batch.

use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigInt;

use crate::values::{Address, Wire};

pub mod memory;

pub use memory::{CallEnv, ContractLogic, ContractState, Effect, MemoryChain, StorageContract, wire_key};

/// A deployed contract as seen by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub address: Address,
    pub artifact: String,
}

/// Per-transaction options set by `Trx` and cleared after every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub value: Option<BigInt>,
    pub gas_price: Option<BigInt>,
}

impl TxOptions {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.gas_price.is_none()
    }
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub name: String,
    pub fields: Vec<(String, Wire)>,
}

impl LogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: Wire) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Wire> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// How a transaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Success,
    /// The contract reverted with a reason string.
    Revert { reason: String },
    /// The contract returned an error code instead of reverting.
    Failure {
        error: String,
        info: String,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub outcome: TxOutcome,
    pub logs: Vec<LogEntry>,
    pub gas_used: u64,
    /// Address of the contract created by a deployment.
    pub created: Option<Address>,
}

impl TxReceipt {
    pub fn success(logs: Vec<LogEntry>, gas_used: u64) -> Self {
        Self {
            outcome: TxOutcome::Success,
            logs,
            gas_used,
            created: None,
        }
    }

    pub fn revert(reason: impl Into<String>, gas_used: u64) -> Self {
        Self {
            outcome: TxOutcome::Revert {
                reason: reason.into(),
            },
            logs: Vec::new(),
            gas_used,
            created: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TxOutcome::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),

    #[error("unknown contract artifact `{0}`")]
    UnknownArtifact(String),

    #[error("`{artifact}` has no method `{method}`")]
    UnknownMethod { artifact: String, method: String },

    #[error("bad arguments for `{method}`: {reason}")]
    BadArguments { method: String, reason: String },

    #[error("gave up waiting for {waiting_for} after {iterations} polls")]
    PollLimit { waiting_for: String, iterations: usize },

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Abstract RPC capability. Fetchers may only use [`Chain::call_read`] and
/// the block/clock queries.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Unlocked accounts, in a stable order.
    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    async fn deploy(
        &self,
        artifact: &str,
        args: Vec<Wire>,
        from: &Address,
        options: &TxOptions,
    ) -> Result<TxReceipt, ChainError>;

    async fn call_read(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Wire>,
    ) -> Result<Wire, ChainError>;

    async fn send_tx(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Wire>,
        from: &Address,
        options: &TxOptions,
    ) -> Result<TxReceipt, ChainError>;

    /// Plain value transfer between accounts.
    async fn send_value(
        &self,
        from: &Address,
        to: &Address,
        amount: BigInt,
    ) -> Result<TxReceipt, ChainError>;

    async fn balance(&self, account: &Address) -> Result<BigInt, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Chain clock in seconds.
    async fn timestamp(&self) -> Result<u64, ChainError>;

    async fn sleep(&self, duration: Duration) -> Result<(), ChainError>;

    async fn mine(&self, blocks: u64) -> Result<(), ChainError>;
}
