//! Interpreter for a small Lisp-like scenario language used to drive
//! contract integration tests.
//!
//! Text is parsed into events ([`parser`]), each event is matched against a
//! table of commands ([`command`]) whose arguments are bound from tokens by
//! resolving values through fetchers ([`resolver`]). Handlers take a
//! [`World`](world::World) and return its successor, talking to the chain
//! only through the [`Chain`](chain::Chain) capability.

use core::future::Future;
use core::pin::Pin;

pub mod api;
pub mod chain;
pub mod command;
pub mod errors;
pub mod events;
pub mod interpreter;
pub mod invariant;
pub mod parser;
pub mod resolver;
pub mod values;
pub mod world;

pub use errors::{Result, ScenarioError};
pub use interpreter::{Ctx, Interpreter, InterpreterBuilder};

/// Boxed future returned by handlers, getters and the recursive parts of
/// dispatch.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[tokio::test]
    /// async fn test_gate() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Interpreter over a fresh in-memory chain with a `Box` contract kind
    /// backed by the storage artifact. Output goes to the returned buffer.
    pub fn interpreter() -> (crate::Interpreter, std::sync::Arc<crate::interpreter::BufferPrinter>) {
        use std::sync::Arc;

        use crate::chain::{MemoryChain, StorageContract};
        use crate::events::ContractKind;
        use crate::interpreter::BufferPrinter;

        let printer = Arc::new(BufferPrinter::new());
        let interpreter = crate::Interpreter::builder(Arc::new(MemoryChain::new()))
            .printer(printer.clone())
            .contract_kind(ContractKind::new("Box", StorageContract::ARTIFACT))
            .build();
        (interpreter, printer)
    }
}
