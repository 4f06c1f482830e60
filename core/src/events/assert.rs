//! `Assert ...` commands. Assertions never change the world.

use crate::BoxFuture;
use crate::chain::TxOutcome;
use crate::command::{Arg, Args, Command, CommandTable};
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::resolver::getters::{get_pairs, get_string, get_value, pairs_to_map};
use crate::resolver::{Operator, compare};
use crate::values::Value;
use crate::world::{Invocation, World};

pub fn assert_commands() -> CommandTable {
    CommandTable::new()
        .with(Command::new("True", "Fail unless the value is truthy", truthy).arg(Arg::new("value", get_value)))
        .with(Command::new("False", "Fail if the value is truthy", falsy).arg(Arg::new("value", get_value)))
        .with(
            Command::new("Equal", "Fail unless both values are equal", equal)
                .arg(Arg::new("left", get_value))
                .arg(Arg::new("right", get_value)),
        )
        .with(
            Command::new("NotEqual", "Fail if both values are equal", not_equal)
                .arg(Arg::new("left", get_value))
                .arg(Arg::new("right", get_value)),
        )
        .with(
            Command::new("LessThan", "Fail unless left < right", less_than)
                .arg(Arg::new("left", get_value))
                .arg(Arg::new("right", get_value)),
        )
        .with(
            Command::new("GreaterThan", "Fail unless left > right", greater_than)
                .arg(Arg::new("left", get_value))
                .arg(Arg::new("right", get_value)),
        )
        .with(Command::new("Success", "Fail unless the last invocation succeeded", success))
        .with(
            Command::new("Revert", "Fail unless the last invocation reverted", revert)
                .arg(Arg::new("reason", get_string).nullable()),
        )
        .with(
            Command::new("Failure", "Fail unless the last invocation returned an error code", failure)
                .arg(Arg::new("error", get_string))
                .arg(Arg::new("info", get_string).nullable())
                .arg(Arg::new("detail", get_string).nullable()),
        )
        .with(
            Command::new("Log", "Fail unless the last invocation emitted a matching log", log)
                .arg(Arg::new("name", get_string))
                .arg(Arg::new("fields", get_pairs).variadic()),
        )
}

fn fail(message: String) -> ScenarioError {
    ScenarioError::AssertionFailed(message)
}

fn truthy<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let value = args.get("value")?;
        if !value.truthy() {
            return Err(fail(format!("expected {} to be true", value.show())));
        }
        Ok(world)
    })
}

fn falsy<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let value = args.get("value")?;
        if value.truthy() {
            return Err(fail(format!("expected {} to be false", value.show())));
        }
        Ok(world)
    })
}

fn equal<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let (left, right) = (args.get("left")?, args.get("right")?);
        if !left.matches(right)? {
            return Err(fail(format!("expected {} to equal {}", left.show(), right.show())));
        }
        Ok(world)
    })
}

fn not_equal<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let (left, right) = (args.get("left")?, args.get("right")?);
        if left.matches(right)? {
            return Err(fail(format!("expected {} to differ from {}", left.show(), right.show())));
        }
        Ok(world)
    })
}

fn less_than<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move { ordered(world, &args, Operator::Lt, "less than") })
}

fn greater_than<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move { ordered(world, &args, Operator::Gt, "greater than") })
}

fn ordered(world: World, args: &Args, op: Operator, relation: &str) -> Result<World> {
    let (left, right) = (args.get("left")?, args.get("right")?);
    if !compare(op, left, right)? {
        return Err(fail(format!(
            "expected {} to be {} {}",
            left.show(),
            relation,
            right.show()
        )));
    }
    Ok(world)
}

fn last_invocation(world: &World) -> Result<&Invocation> {
    world
        .last_invocation()
        .ok_or_else(|| fail("no invocation has been made".to_string()))
}

fn success<'a>(_ctx: Ctx<'a>, world: World, _args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let invocation = last_invocation(&world)?;
        if !invocation.is_success() {
            return Err(fail(format!(
                "expected `{}` to succeed, got {:?}",
                invocation.description,
                invocation.outcome()
            )));
        }
        Ok(world)
    })
}

fn revert<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let invocation = last_invocation(&world)?;
        let expected = args.optional("reason")?.map(Value::show);
        match invocation.outcome() {
            TxOutcome::Revert { reason } => match expected {
                Some(expected) if expected != *reason => Err(fail(format!(
                    "expected revert `{}`, got `{}`",
                    expected, reason
                ))),
                _ => Ok(()),
            },
            other => Err(fail(format!(
                "expected `{}` to revert, got {:?}",
                invocation.description, other
            ))),
        }?;
        Ok(world)
    })
}

fn failure<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let invocation = last_invocation(&world)?;
        let TxOutcome::Failure { error, info, detail } = invocation.outcome() else {
            return Err(fail(format!(
                "expected `{}` to fail, got {:?}",
                invocation.description,
                invocation.outcome()
            )));
        };
        let found = [("error", error), ("info", info), ("detail", detail)];
        for (param, actual) in found {
            if let Some(expected) = args.optional(param)? {
                let expected = expected.as_str()?;
                if expected != actual.as_str() {
                    return Err(fail(format!("expected failure {} `{}`, got `{}`", param, expected, actual)));
                }
            }
        }
        Ok(world)
    })
}

fn log<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let invocation = last_invocation(&world)?.clone();
        let name = args.string("name")?;
        let fields = pairs_to_map(args.list("fields")?)?;

        for entry in invocation.receipt.logs.iter().filter(|l| l.name.eq_ignore_ascii_case(name)) {
            let mut matched = true;
            for (field, expected) in &fields {
                let actual = entry.get(field).cloned().map_or(Value::Nothing, Value::from_wire);
                if !expected.matches(&actual).unwrap_or(false) {
                    matched = false;
                    break;
                }
            }
            if matched {
                return Ok(world);
            }
        }
        Err(fail(format!(
            "`{}` emitted no `{}` log matching {}",
            invocation.description,
            name,
            Value::Map(fields).show()
        )))
    })
}
