//! Public configuration and diagnostic types for the scenario interpreter.
//!
//! # Example
//!
//! ```ignore
//! use scenario_core::api::InterpreterOptions;
//! use scenario_core::interpreter::Interpreter;
//! use std::sync::Arc;
//! use scenario_core::chain::MemoryChain;
//! use scenario_core::events::ContractKind;
//!
//! let interpreter = Interpreter::builder(Arc::new(MemoryChain::new()))
//!     .options(InterpreterOptions::default())
//!     .contract_kind(ContractKind::new("Box", "Storage"))
//!     .build();
//! let world = interpreter.initial_world().await?;
//! let world = interpreter.run(world, "Box Deploy Shelf").await?;
//! ```

pub mod error;
pub mod options;

pub use error::{Diagnostic, RelatedInfo};
pub use options::InterpreterOptions;
