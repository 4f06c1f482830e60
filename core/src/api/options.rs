//! Configuration options for the interpreter.

use std::path::PathBuf;

/// Configuration options for an [`Interpreter`](crate::interpreter::Interpreter).
///
/// # Example
///
/// ```
/// use scenario_core::api::InterpreterOptions;
///
/// let options = InterpreterOptions {
///     max_poll_iterations: 50,
///     ..InterpreterOptions::default()
/// };
/// assert_eq!(options.history_default, 5);
/// ```
#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    /// Maximum list nesting accepted by the parser.
    ///
    /// Default: 64
    pub max_depth: usize,

    /// Upper bound on polls performed by the `SleepUntil*` commands.
    ///
    /// Default: 1000
    pub max_poll_iterations: usize,

    /// Milliseconds handed to the chain's `sleep` between polls.
    ///
    /// Default: 1000
    pub poll_interval_ms: u64,

    /// Number of entries `History` prints when no count is given.
    ///
    /// Default: 5
    pub history_default: usize,

    /// Network file holding the contract registry, loaded at start and
    /// written by `SaveNetwork`.
    ///
    /// Default: None
    pub network_file: Option<PathBuf>,

    /// Print every recorded action as it happens.
    ///
    /// Default: false
    pub verbose: bool,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_depth: crate::parser::DEFAULT_MAX_DEPTH,
            max_poll_iterations: 1000,
            poll_interval_ms: 1000,
            history_default: 5,
            network_file: None,
            verbose: false,
        }
    }
}
