//! Interpreter error taxonomy.
//!
//! Every failure that aborts a batch is a [`ScenarioError`]. On-chain
//! reverts are not errors: they are recorded as an
//! [`Invocation`](crate::world::Invocation) in the action log, and only
//! become [`ScenarioError::UnexpectedRevert`] when a handler asks for it via
//! [`Invocation::into_result`](crate::world::Invocation::into_result).

use crate::api::Diagnostic;
use crate::chain::ChainError;
use crate::parser::{ParseError, Span};
use crate::values::ValueError;
use crate::world::{RegistryError, World};

pub type Result<T, E = ScenarioError> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot resolve `{token}`: {reason}")]
    ValueResolution { token: String, reason: String },

    #[error("missing argument `{param}` for `{command}`")]
    MissingArgument { command: String, param: String },

    #[error("too many arguments for `{command}`: unexpected `{extra}`")]
    TooManyArguments { command: String, extra: String },

    #[error("parameter `{param}` of `{command}` follows a variadic parameter")]
    InvalidSignature { command: String, param: String },

    #[error("no command matches `{attempted}`")]
    NoMatchingCommand {
        attempted: String,
        candidates: Vec<String>,
    },

    #[error("invariant `{invariant}` violated after `{event}`")]
    InvariantViolation {
        invariant: String,
        event: String,
        world: Box<World>,
    },

    #[error("expectation `{expectation}` failed after `{event}`: {reason}")]
    ExpectationFailed {
        expectation: String,
        event: String,
        reason: String,
    },

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("unexpected revert in `{invocation}`: {reason}")]
    UnexpectedRevert { invocation: String, reason: String },

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("{source}")]
    InEvent {
        event: String,
        span: Span,
        #[source]
        source: Box<ScenarioError>,
    },
}

impl ScenarioError {
    pub fn resolution(token: impl ToString, reason: impl Into<String>) -> Self {
        ScenarioError::ValueResolution {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the failing event. Errors already tied to an event are kept
    /// as they are, so the innermost top-level event wins.
    pub fn in_event(self, event: impl ToString, span: Span) -> Self {
        match self {
            err @ ScenarioError::InEvent { .. } => err,
            err => ScenarioError::InEvent {
                event: event.to_string(),
                span,
                source: Box::new(err),
            },
        }
    }

    /// The error without any event wrapper.
    pub fn root(&self) -> &ScenarioError {
        match self {
            ScenarioError::InEvent { source, .. } => source.root(),
            err => err,
        }
    }

    /// Text and span of the event that failed, if known.
    pub fn event(&self) -> Option<(&str, &Span)> {
        match self {
            ScenarioError::InEvent { event, span, .. } => Some((event, span)),
            _ => None,
        }
    }

    /// Short code identifying the kind of failure, e.g. `S004`.
    pub fn code(&self) -> &'static str {
        match self.root() {
            ScenarioError::Parse(_) => "P000",
            ScenarioError::ValueResolution { .. } => "S001",
            ScenarioError::MissingArgument { .. } => "S002",
            ScenarioError::TooManyArguments { .. } => "S003",
            ScenarioError::NoMatchingCommand { .. } => "S004",
            ScenarioError::InvariantViolation { .. } => "S005",
            ScenarioError::ExpectationFailed { .. } => "S006",
            ScenarioError::AssertionFailed(_) => "S007",
            ScenarioError::UnexpectedRevert { .. } => "S008",
            ScenarioError::Chain(_) => "S009",
            ScenarioError::Registry(_) => "S010",
            ScenarioError::Value(_) => "S011",
            ScenarioError::InvalidSignature { .. } => "S012",
            ScenarioError::InEvent { .. } => "S000",
        }
    }

    /// Diagnostic pointing at the failing event, or at the parse error.
    /// `None` when the error carries no location.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            ScenarioError::Parse(err) => Some(err.to_diagnostic()),
            ScenarioError::InEvent { span, source, .. } => {
                let mut help = Vec::new();
                match source.root() {
                    ScenarioError::NoMatchingCommand { candidates, .. } if !candidates.is_empty() => {
                        help.push(format!("expected one of: {}", candidates.join(", ")));
                    }
                    ScenarioError::InvariantViolation { world, .. } => {
                        help.push(format!("{} invariant(s) registered", world.invariants().len()));
                    }
                    _ => {}
                }
                Some(Diagnostic {
                    message: source.to_string(),
                    span: span.clone(),
                    related: Vec::new(),
                    help,
                    code: Some(self.code().to_string()),
                })
            }
            _ => None,
        }
    }

    /// True for the errors produced while binding arguments to an entry.
    pub(crate) fn is_bind_error(&self) -> bool {
        matches!(
            self,
            ScenarioError::ValueResolution { .. }
                | ScenarioError::MissingArgument { .. }
                | ScenarioError::TooManyArguments { .. }
                | ScenarioError::NoMatchingCommand { .. }
                | ScenarioError::Value(_)
        )
    }
}
