use std::sync::Arc;

use num_bigint::BigInt;

use super::{Action, ActionLog, ContractRecord, Invocation, Registry, RegistryError, Settings};
use crate::chain::TxOptions;
use crate::invariant::{Expectation, Hold, Invariant};
use crate::parser::Node;
use crate::values::Address;

/// A per-transaction option set by `Trx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOption {
    Value(BigInt),
    GasPrice(BigInt),
}

/// Immutable interpreter state.
///
/// Every operation consumes a `World` and returns its successor. Shared
/// parts are copied on write, so snapshots kept elsewhere (history, error
/// reports) never observe later changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    settings: Arc<Settings>,
    registry: Arc<Registry>,
    invariants: Arc<Vec<Invariant>>,
    expectations: Arc<Vec<Expectation>>,
    pending_expectations: Arc<Vec<Expectation>>,
    held: Arc<Vec<Hold>>,
    pending_holds: Arc<Vec<Hold>>,
    actions: ActionLog,
    event: Option<Arc<Node>>,
    last_invocation: Option<Arc<Invocation>>,
    last_contract: Option<Address>,
    tx_options: Arc<TxOptions>,
}

impl World {
    pub fn new(settings: Settings, registry: Registry) -> Self {
        Self {
            settings: Arc::new(settings),
            registry: Arc::new(registry),
            ..Self::default()
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn invariants(&self) -> &[Invariant] {
        &self.invariants
    }

    /// Expectations checked after the current event.
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Expectations registered during the current event.
    pub fn pending_expectations(&self) -> &[Expectation] {
        &self.pending_expectations
    }

    /// Invariant classes suspended for the current event.
    pub fn held(&self) -> &[Hold] {
        &self.held
    }

    pub fn actions(&self) -> &ActionLog {
        &self.actions
    }

    pub fn event(&self) -> Option<&Node> {
        self.event.as_deref()
    }

    pub fn last_invocation(&self) -> Option<&Invocation> {
        self.last_invocation.as_deref()
    }

    pub fn last_contract(&self) -> Option<&Address> {
        self.last_contract.as_ref()
    }

    pub fn tx_options(&self) -> &TxOptions {
        &self.tx_options
    }

    pub fn contract(&self, kind: &str, name: &str) -> Option<&ContractRecord> {
        self.registry.get(kind, name)
    }

    // ========================================================================
    // Successors
    // ========================================================================

    pub fn with_settings(mut self, settings: Settings) -> World {
        self.settings = Arc::new(settings);
        self
    }

    pub fn set_setting(mut self, key: &str, value: &str) -> Result<World, RegistryError> {
        Arc::make_mut(&mut self.settings).set(key, value)?;
        Ok(self)
    }

    pub fn add_alias(mut self, name: impl Into<String>, address: Address) -> World {
        Arc::make_mut(&mut self.settings)
            .aliases
            .insert(name.into(), address);
        self
    }

    /// Register (or overwrite) a contract and make it the last contract.
    pub fn register_contract(mut self, kind: &str, name: &str, record: ContractRecord) -> World {
        self.last_contract = Some(record.address.clone());
        Arc::make_mut(&mut self.registry).insert(kind, name, record);
        self
    }

    pub fn add_action(mut self, description: impl Into<String>, invocation: Option<Invocation>) -> World {
        if let Some(invocation) = &invocation {
            self.last_invocation = Some(Arc::new(invocation.clone()));
        }
        self.actions = self.actions.push(Action {
            description: description.into(),
            invocation,
        });
        self
    }

    pub fn add_invariant(mut self, invariant: Invariant) -> World {
        Arc::make_mut(&mut self.invariants).push(invariant);
        self
    }

    /// Remove every invariant, or only those of `class`.
    pub fn clear_invariants(mut self, class: Option<&str>) -> World {
        match class {
            None => self.invariants = Arc::default(),
            Some(class) => {
                Arc::make_mut(&mut self.invariants)
                    .retain(|invariant| !invariant.class().eq_ignore_ascii_case(class));
            }
        }
        self
    }

    /// Suspend checking for the next event only.
    pub fn hold_invariants(mut self, hold: Hold) -> World {
        Arc::make_mut(&mut self.pending_holds).push(hold);
        self
    }

    /// Arm an expectation for the next event.
    pub fn add_expectation(mut self, expectation: Expectation) -> World {
        Arc::make_mut(&mut self.pending_expectations).push(expectation);
        self
    }

    pub fn set_tx_option(mut self, option: TxOption) -> World {
        let options = Arc::make_mut(&mut self.tx_options);
        match option {
            TxOption::Value(value) => options.value = Some(value),
            TxOption::GasPrice(price) => options.gas_price = Some(price),
        }
        self
    }

    pub fn clear_tx_options(mut self) -> World {
        if !self.tx_options.is_empty() {
            self.tx_options = Arc::default();
        }
        self
    }

    pub fn with_event(mut self, event: Node) -> World {
        self.event = Some(Arc::new(event));
        self
    }

    /// Close the current event: pending holds and expectations become
    /// active for the next one and transaction options are dropped.
    pub(crate) fn end_event(mut self) -> World {
        self.held = core::mem::take(&mut self.pending_holds);
        self.expectations = core::mem::take(&mut self.pending_expectations);
        self.clear_tx_options()
    }
}
