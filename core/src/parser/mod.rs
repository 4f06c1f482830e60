//! Tokenizer and parser for scenario scripts.
//!
//! Turns text such as `Gate (Erc20 ZRX Address) (Erc20 Deploy BAT)` into a
//! tree of [`Node`]s. The tree is untyped; meaning is assigned later by the
//! resolver and the argument binder.

pub mod error;
mod node;
#[allow(clippy::module_inception)]
pub mod parser;
mod syntax;

pub use error::{ParseError, ParseErrorKind};
pub use node::{Event, Node, format_event};
pub use parser::{DEFAULT_MAX_DEPTH, Rule, ScenarioParser, parse, parse_node, parse_with_max_depth};
pub use syntax::Span;

#[cfg(test)]
mod parse_test;
