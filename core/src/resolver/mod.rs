//! Turns token-tree nodes into values.
//!
//! Atoms are literals, aliases, contract names or zero-argument fetchers.
//! Lists are operator expressions or fetcher invocations. Resolution never
//! changes the world and only reads from the chain.

mod core_fetchers;
pub mod getters;
mod literals;
mod operators;

pub use core_fetchers::core_fetchers;
pub use literals::parse_literal;
pub use operators::{Operator, arithmetic, compare};

use crate::BoxFuture;
use crate::command::dispatch_fetcher;
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::Value;
use crate::world::World;

/// Resolve `node` against the session's fetcher table.
pub fn resolve<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match node {
            Node::Quoted(text) => Ok(Value::String(text.clone())),
            Node::Atom(text) => resolve_atom(ctx, world, node, text).await,
            Node::List(items) => {
                let Some(head) = items.first() else {
                    return Err(ScenarioError::resolution(node, "empty expression"));
                };
                if let Some(op) = operator(head) {
                    return operators::apply(ctx, world, op, &items[1..]).await;
                }
                dispatch_fetcher(ctx, world, ctx.session.fetchers(), node).await
            }
        }
    })
}

fn operator(node: &Node) -> Option<Operator> {
    match node {
        Node::Atom(text) => Operator::parse(text),
        _ => None,
    }
}

async fn resolve_atom(ctx: Ctx<'_>, world: &World, node: &Node, text: &str) -> Result<Value> {
    if let Some(value) = parse_literal(text) {
        return Ok(value);
    }
    if let Some(address) = world.settings().lookup_alias(text) {
        return Ok(Value::Address(address.clone()));
    }
    if let Some((_, record)) = world.registry().find(text) {
        return Ok(Value::Address(record.address.clone()));
    }
    if ctx.session.fetchers().has_nullary(text) {
        return dispatch_fetcher(ctx, world, ctx.session.fetchers(), node).await;
    }
    Err(ScenarioError::resolution(
        text,
        "not a literal, alias, contract or fetcher",
    ))
}

#[cfg(test)]
mod resolve_test;
