//! Built-in commands and the per-kind contract commands.

mod assert;
mod contract;
mod core_events;

pub use assert::assert_commands;
pub use contract::{ContractKind, contract_method};
pub use core_events::core_commands;
