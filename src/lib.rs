//! Scenario - a small Lisp-like language for contract integration tests
//!
//! # Overview
//!
//! A scenario is a sequence of events, one per line or parenthesized list.
//! Each event is matched against a table of commands and folded over an
//! immutable [`World`]: deploying contracts, sending transactions, asserting
//! on outcomes and registering invariants that are checked after every
//! event.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use scenario::{Interpreter, render_error};
//! use scenario::chain::MemoryChain;
//! use scenario::events::ContractKind;
//!
//! let interpreter = Interpreter::builder(Arc::new(MemoryChain::new()))
//!     .contract_kind(ContractKind::new("Box", "Storage"))
//!     .build();
//!
//! let source = r#"
//!     Box Deploy Shelf
//!     Box Shelf Set "size" 5
//!     Assert Equal (Box Shelf Get "size") 5
//! "#;
//! let world = interpreter.initial_world().await?;
//! match interpreter.run(world, source).await {
//!     Ok(world) => println!("{} actions", world.actions().len()),
//!     Err(e) => render_error(&e, source),
//! }
//! ```
//!
//! # Extending
//!
//! Hosts add their own commands and fetchers through the
//! [`InterpreterBuilder`]; they are tried before the built-in ones.
//! Contract kinds become command prefixes (`Box Deploy ...`) and value
//! fetchers (`Box Shelf Get ...`).

pub use scenario_core::api::{Diagnostic, InterpreterOptions, RelatedInfo};
pub use scenario_core::{Interpreter, InterpreterBuilder, Result, ScenarioError};

pub use scenario_core::interpreter::{BufferPrinter, Printer, StdoutPrinter};
pub use scenario_core::parser::{Event, Node, parse};
pub use scenario_core::values::{Address, Number, Value};
pub use scenario_core::world::World;
pub use scenario_core::{chain, command, events, parser, resolver, values, world};

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
