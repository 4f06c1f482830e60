//! Built-in fetchers.

use crate::BoxFuture;
use crate::command::{Arg, Args, Fetcher, FetcherTable};
use crate::errors::{Result, ScenarioError};
use crate::values::{Number, Value};
use crate::world::World;

use super::getters::{
    get_address, get_number, get_pairs, get_string, get_value, get_values, pairs_to_map,
};
use super::operators::{Operator, arithmetic, compare};

/// Decimals used by `Exp`.
const EXP_DECIMALS: u32 = 18;

fn ready<'a>(value: Result<Value>) -> BoxFuture<'a, Result<Value>> {
    Box::pin(core::future::ready(value))
}

fn binary(op: Operator, args: &Args) -> Result<Value> {
    arithmetic(op, args.number("a")?, args.number("b")?).map(Value::Number)
}

fn pick(args: &Args, want_max: bool) -> Result<Value> {
    let (a, b) = (args.number("a")?, args.number("b")?);
    let a_first = if want_max {
        a.magnitude() >= b.magnitude()
    } else {
        a.magnitude() <= b.magnitude()
    };
    Ok(Value::Number(if a_first { a.clone() } else { b.clone() }))
}

fn two_numbers(fetcher: Fetcher) -> Fetcher {
    fetcher
        .arg(Arg::new("a", get_number))
        .arg(Arg::new("b", get_number))
}

/// The fetchers available in every session.
pub fn core_fetchers() -> FetcherTable {
    FetcherTable::new()
        .with(Fetcher::new(
            "LastContract",
            "Address of the most recently deployed contract",
            |_, world, _| {
                ready(Ok(world
                    .last_contract()
                    .cloned()
                    .map_or(Value::Nothing, Value::Address)))
            },
        ))
        .with(Fetcher::new(
            "LastBlock",
            "Current block number",
            |ctx, _, _| {
                Box::pin(async move { Ok(Value::number(ctx.chain().block_number().await?)) })
            },
        ))
        .with(Fetcher::new(
            "Timestamp",
            "Current chain time in seconds",
            |ctx, _, _| Box::pin(async move { Ok(Value::number(ctx.chain().timestamp().await?)) }),
        ))
        .with(
            Fetcher::new("Balance", "Native balance of an account", |ctx, _, args| {
                Box::pin(async move {
                    let balance = ctx.chain().balance(args.address("account")?).await?;
                    Ok(Value::Number(Number::from_int(balance)))
                })
            })
            .arg(Arg::new("account", get_address)),
        )
        .with(
            Fetcher::new("Exactly", "A number, unscaled", |_, _, args| {
                ready(args.number("amount").map(|n| Value::Number(Number::new(n.magnitude().clone()))))
            })
            .arg(Arg::new("amount", get_number)),
        )
        .with(
            Fetcher::new("Exp", "A number scaled by 10^decimals (default 18)", |_, _, args| {
                ready(exp(&args))
            })
            .arg(Arg::new("amount", get_number))
            .arg(Arg::new("decimals", get_number).default(Value::number(EXP_DECIMALS as i64))),
        )
        .with(
            Fetcher::new(
                "Precisely",
                "A number compared at a number of significant digits",
                |_, _, args| ready(precisely(&args)),
            )
            .arg(Arg::new("amount", get_number))
            .arg(Arg::new("digits", get_number)),
        )
        .with(Fetcher::new("Anything", "Matches any value", |_, _, _| {
            ready(Ok(Value::Anything))
        }))
        .with(Fetcher::new("Nothing", "No value", |_, _, _| ready(Ok(Value::Nothing))))
        .with(
            Fetcher::new("Sum", "Sum of the given numbers", |_, _, args| ready(sum(&args)))
                .arg(Arg::new("numbers", get_values).variadic()),
        )
        .with(two_numbers(Fetcher::new("Sub", "a - b", |_, _, args| {
            ready(binary(Operator::Sub, &args))
        })))
        .with(two_numbers(Fetcher::new("Multiply", "a * b", |_, _, args| {
            ready(binary(Operator::Mul, &args))
        })))
        .with(two_numbers(Fetcher::new("Divide", "a / b", |_, _, args| {
            ready(binary(Operator::Div, &args))
        })))
        .with(two_numbers(Fetcher::new("Min", "Smaller of two numbers", |_, _, args| {
            ready(pick(&args, false))
        })))
        .with(two_numbers(Fetcher::new("Max", "Larger of two numbers", |_, _, args| {
            ready(pick(&args, true))
        })))
        .with(
            Fetcher::new("Equal", "Whether two values are equal", |_, _, args| {
                ready(equal(&args))
            })
            .arg(Arg::new("a", get_value))
            .arg(Arg::new("b", get_value)),
        )
        .with(
            Fetcher::new("Address", "Address of an alias, contract or literal", |_, _, args| {
                ready(args.get("target").cloned())
            })
            .arg(Arg::new("target", get_address)),
        )
        .with(
            Fetcher::new("User", "Address of a user alias", |_, world, args| {
                ready(user(world, &args))
            })
            .arg(Arg::new("name", get_string)),
        )
        .with(
            Fetcher::new("List", "A list of values", |_, _, args| {
                ready(args.get("values").cloned())
            })
            .arg(Arg::new("values", get_values).variadic()),
        )
        .with(
            Fetcher::new("Map", "A map from `(key value)` pairs", |_, _, args| {
                ready(args.list("pairs").and_then(pairs_to_map).map(Value::Map))
            })
            .arg(Arg::new("pairs", get_pairs).variadic()),
        )
}

fn exp(args: &Args) -> Result<Value> {
    let decimals = to_u32(args.number("decimals")?, "decimals")?;
    let amount = args.number("amount")?;
    Ok(Value::Number(Number::scaled(
        amount.magnitude().shift_left(decimals),
        decimals,
    )))
}

fn sum(args: &Args) -> Result<Value> {
    let mut total = Number::from_int(0);
    for value in args.list("numbers")? {
        let number = value.as_number()?;
        total = arithmetic(Operator::Add, &total, number)?;
    }
    Ok(Value::Number(total))
}

fn precisely(args: &Args) -> Result<Value> {
    Ok(Value::Precise {
        value: args.number("amount")?.clone(),
        digits: to_u32(args.number("digits")?, "digits")?,
    })
}

fn equal(args: &Args) -> Result<Value> {
    Ok(Value::Bool(compare(Operator::Eq, args.get("a")?, args.get("b")?)?))
}

fn user(world: &World, args: &Args) -> Result<Value> {
    let name = args.string("name")?;
    world
        .settings()
        .lookup_alias(name)
        .cloned()
        .map(Value::Address)
        .ok_or_else(|| ScenarioError::resolution(name, "unknown user"))
}

fn to_u32(number: &Number, what: &str) -> Result<u32> {
    number
        .to_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ScenarioError::resolution(number, format!("{} must be a small non-negative integer", what)))
}
