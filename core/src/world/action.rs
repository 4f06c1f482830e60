//! The append-only action log and recorded invocations.

use std::sync::Arc;

use crate::chain::{TxOutcome, TxReceipt};
use crate::errors::{Result, ScenarioError};
use crate::values::Address;

use super::World;

/// A state-changing call made by a command, with its on-chain outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub description: String,
    pub from: Address,
    pub receipt: TxReceipt,
}

impl Invocation {
    pub fn new(description: impl Into<String>, from: Address, receipt: TxReceipt) -> Self {
        Self {
            description: description.into(),
            from,
            receipt,
        }
    }

    pub fn outcome(&self) -> &TxOutcome {
        &self.receipt.outcome
    }

    pub fn is_success(&self) -> bool {
        self.receipt.is_success()
    }

    /// Log the invocation and make it the last one, whatever its outcome.
    pub fn record(self, world: World) -> World {
        match self.outcome() {
            TxOutcome::Success => tracing::info!(invocation = %self.description, "recorded"),
            TxOutcome::Revert { reason } => {
                tracing::warn!(invocation = %self.description, reason = %reason, "reverted")
            }
            TxOutcome::Failure { error, .. } => {
                tracing::warn!(invocation = %self.description, error = %error, "failed")
            }
        }
        let description = match self.outcome() {
            TxOutcome::Success => self.description.clone(),
            TxOutcome::Revert { reason } => format!("{} (reverted: {})", self.description, reason),
            TxOutcome::Failure { error, info, .. } => {
                format!("{} (failed: {} {})", self.description, error, info)
            }
        };
        world.add_action(description, Some(self))
    }

    /// Treat anything but success as an error.
    pub fn into_result(self) -> Result<Invocation> {
        let reason = match self.outcome() {
            TxOutcome::Success => return Ok(self),
            TxOutcome::Revert { reason } => reason.clone(),
            TxOutcome::Failure {
                error,
                info,
                detail,
            } => format!("{} {} {}", error, info, detail),
        };
        Err(ScenarioError::UnexpectedRevert {
            invocation: self.description,
            reason,
        })
    }
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub description: String,
    pub invocation: Option<Invocation>,
}

#[derive(Debug)]
struct Link {
    action: Action,
    prev: Option<Arc<Link>>,
}

/// Persistent list of actions, newest first. Appending shares the tail
/// with every earlier snapshot.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    head: Option<Arc<Link>>,
    len: usize,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, action: Action) -> ActionLog {
        ActionLog {
            head: Some(Arc::new(Link {
                action,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        let mut cursor = self.head.as_deref();
        core::iter::from_fn(move || {
            let link = cursor?;
            cursor = link.prev.as_deref();
            Some(&link.action)
        })
    }

    /// The `n` newest actions, newest first.
    pub fn recent(&self, n: usize) -> Vec<&Action> {
        self.iter().take(n).collect()
    }

    pub fn last(&self) -> Option<&Action> {
        self.head.as_deref().map(|link| &link.action)
    }
}

impl PartialEq for ActionLog {
    fn eq(&self, other: &Self) -> bool {
        let same_head = match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_head || (self.len == other.len && self.iter().eq(other.iter()))
    }
}

impl Eq for ActionLog {}

// Drop iteratively so long logs do not overflow the stack.
impl Drop for Link {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Arc::try_unwrap(link) {
                Ok(mut link) => prev = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}
