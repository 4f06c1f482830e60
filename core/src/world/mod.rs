//! World state threaded through every event.

mod action;
mod registry;
mod settings;
#[allow(clippy::module_inception)]
mod world;

pub use action::{Action, ActionLog, Invocation};
pub use registry::{ContractRecord, Registry, RegistryError};
pub use settings::Settings;
pub use world::{TxOption, World};

#[cfg(test)]
mod world_test;
