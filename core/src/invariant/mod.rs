//! Invariants and expectations, checked after every event.
//!
//! Invariants stay registered until cleared and are re-evaluated after
//! each event unless their class is held. Expectations are armed by one
//! event and checked once after the next.

use core::fmt;

use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::{Node, format_event};
use crate::resolver::{Operator, arithmetic, resolve};
use crate::values::{Number, Value};
use crate::world::World;

#[derive(Debug, Clone, PartialEq)]
pub enum Invariant {
    /// The condition keeps the value it had at registration.
    Static { condition: Node, value: Value },
    /// The condition keeps the given value.
    Remains { condition: Node, value: Value },
    /// Every invocation succeeds.
    Success,
}

impl Invariant {
    pub fn class(&self) -> &'static str {
        match self {
            Invariant::Static { .. } => "static",
            Invariant::Remains { .. } => "remains",
            Invariant::Success => "success",
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::Static { condition, value } => {
                write!(f, "Static {} = {}", condition, value.show())
            }
            Invariant::Remains { condition, value } => {
                write!(f, "Remains {} = {}", condition, value.show())
            }
            Invariant::Success => write!(f, "Success"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// The condition moves from `original` by `delta`, within `tolerance`.
    Changes {
        condition: Node,
        original: Number,
        delta: Number,
        tolerance: Option<Number>,
    },
    /// The condition equals `value`.
    Remains { condition: Node, value: Value },
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Changes {
                condition,
                delta,
                tolerance,
                ..
            } => {
                write!(f, "Changes {} {}", condition, delta.show())?;
                if let Some(tolerance) = tolerance {
                    write!(f, " ±{}", tolerance.show())?;
                }
                Ok(())
            }
            Expectation::Remains { condition, value } => {
                write!(f, "Remains {} {}", condition, value.show())
            }
        }
    }
}

/// Invariants suspended by `HoldInvariants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hold {
    All,
    Class(String),
}

impl Hold {
    pub fn covers(&self, class: &str) -> bool {
        match self {
            Hold::All => true,
            Hold::Class(held) => held.eq_ignore_ascii_case(class),
        }
    }
}

/// Check the world produced by `event`: every invariant not held, then
/// every armed expectation.
pub async fn check(ctx: Ctx<'_>, world: &World, event: &Node) -> Result<()> {
    for invariant in world.invariants() {
        if world.held().iter().any(|hold| hold.covers(invariant.class())) {
            tracing::debug!(%invariant, "held");
            continue;
        }
        if let Some(found) = violation(ctx, world, invariant).await? {
            return Err(ScenarioError::InvariantViolation {
                invariant: format!("{} (found {})", invariant, found),
                event: format_event(event),
                world: Box::new(world.clone()),
            });
        }
    }

    for expectation in world.expectations() {
        if let Some(reason) = unmet(ctx, world, expectation).await? {
            return Err(ScenarioError::ExpectationFailed {
                expectation: expectation.to_string(),
                event: format_event(event),
                reason,
            });
        }
    }
    Ok(())
}

/// What was found instead, if the invariant no longer holds.
async fn violation(ctx: Ctx<'_>, world: &World, invariant: &Invariant) -> Result<Option<String>> {
    match invariant {
        Invariant::Static { condition, value } | Invariant::Remains { condition, value } => {
            let current = resolve(ctx, world, condition).await?;
            Ok((!current.matches(value)?).then(|| current.show()))
        }
        Invariant::Success => Ok(world
            .last_invocation()
            .filter(|invocation| !invocation.is_success())
            .map(|invocation| format!("`{}` did not succeed", invocation.description))),
    }
}

async fn unmet(ctx: Ctx<'_>, world: &World, expectation: &Expectation) -> Result<Option<String>> {
    match expectation {
        Expectation::Changes {
            condition,
            original,
            delta,
            tolerance,
        } => {
            let current = resolve(ctx, world, condition).await?;
            let current = current.as_number()?;
            let expected = arithmetic(Operator::Add, original, delta)?;
            let diff = arithmetic(Operator::Sub, current, &expected)?;
            let allowed = tolerance
                .as_ref()
                .map(|t| t.magnitude().clone())
                .unwrap_or_else(crate::values::Decimal::zero);
            let off_by = if diff.magnitude().is_negative() {
                diff.magnitude().neg()
            } else {
                diff.magnitude().clone()
            };
            Ok((off_by > allowed).then(|| {
                format!(
                    "expected {} to change from {} to {}, found {}",
                    condition,
                    original.show(),
                    expected.show(),
                    current.show()
                )
            }))
        }
        Expectation::Remains { condition, value } => {
            let current = resolve(ctx, world, condition).await?;
            Ok((!current.matches(value)?).then(|| {
                format!("expected {} to remain {}, found {}", condition, value.show(), current.show())
            }))
        }
    }
}
