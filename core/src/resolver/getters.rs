//! Getters: the fetch functions used by [`Arg`](crate::command::Arg)
//! descriptors.

use std::collections::BTreeMap;

use crate::BoxFuture;
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::{Address, Value};
use crate::world::World;

use super::resolve;

/// Any value.
pub fn get_value<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    resolve(ctx, world, node)
}

pub fn get_number<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match resolve(ctx, world, node).await? {
            value @ Value::Number(_) => Ok(value),
            other => Err(mismatch(node, "a number", &other)),
        }
    })
}

pub fn get_bool<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match resolve(ctx, world, node).await? {
            value @ Value::Bool(_) => Ok(value),
            other => Err(mismatch(node, "a boolean", &other)),
        }
    })
}

/// Bare words and quoted text are taken literally; lists must resolve to
/// a string.
pub fn get_string<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        if let Some(text) = node.as_text() {
            return Ok(Value::String(text.to_string()));
        }
        match resolve(ctx, world, node).await? {
            value @ Value::String(_) => Ok(value),
            other => Err(mismatch(node, "a string", &other)),
        }
    })
}

/// A single word, never resolved: contract and method names.
pub fn get_word<'a>(_ctx: Ctx<'a>, _world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match node.as_text() {
            Some(text) => Ok(Value::String(text.to_string())),
            None => Err(ScenarioError::resolution(node, "expected a single word")),
        }
    })
}

pub fn get_address<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match resolve(ctx, world, node).await? {
            value @ Value::Address(_) => Ok(value),
            Value::String(text) => Address::parse(&text)
                .map(Value::Address)
                .ok_or_else(|| ScenarioError::resolution(node, "not an address")),
            other => Err(mismatch(node, "an address", &other)),
        }
    })
}

/// The sender. An empty node means "the default sender".
pub fn get_from<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        if node.as_list().is_some_and(|items| items.is_empty()) {
            return match &world.settings().default_from {
                Some(address) => Ok(Value::Address(address.clone())),
                None => Err(ScenarioError::resolution(
                    "from",
                    "no sender; use `From <user> <event>` or set a default sender",
                )),
            };
        }
        get_address(ctx, world, node).await
    })
}

/// The node itself, unevaluated.
pub fn get_event<'a>(_ctx: Ctx<'a>, _world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move { Ok(Value::Event(node.clone())) })
}

/// Every item of a list node, each resolved.
pub fn get_values<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        let mut values = Vec::new();
        for item in node.tokens() {
            values.push(resolve(ctx, world, item).await?);
        }
        Ok(Value::List(values))
    })
}

/// One `(key value)` pair, as a two-element list.
pub fn get_pair<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        match node.as_list() {
            Some([key, value]) => {
                let key = key
                    .as_text()
                    .ok_or_else(|| ScenarioError::resolution(key, "expected a key"))?;
                let value = resolve(ctx, world, value).await?;
                Ok(Value::List(vec![Value::String(key.to_string()), value]))
            }
            _ => Err(ScenarioError::resolution(node, "expected a `(key value)` pair")),
        }
    })
}

/// Pairs from a variadic list: `(a 1) (b 2)`, `((a 1) (b 2))` and a lone
/// `(a 1)` all work, as does an empty list.
pub fn get_pairs<'a>(ctx: Ctx<'a>, world: &'a World, node: &'a Node) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        let items = match node.tokens() {
            [Node::List(inner)] if inner.iter().all(|item| matches!(item, Node::List(_))) => {
                inner.as_slice()
            }
            items => items,
        };
        let mut pairs = Vec::with_capacity(items.len());
        for item in items {
            pairs.push(get_pair(ctx, world, item).await?);
        }
        Ok(Value::List(pairs))
    })
}

/// Build a map out of the pairs produced by [`get_pair`].
pub fn pairs_to_map(pairs: &[Value]) -> Result<BTreeMap<String, Value>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        match pair.as_list()? {
            [Value::String(key), value] => {
                map.insert(key.clone(), value.clone());
            }
            _ => return Err(ScenarioError::resolution(pair.show(), "expected a pair")),
        }
    }
    Ok(map)
}

fn mismatch(node: &Node, expected: &str, found: &Value) -> ScenarioError {
    ScenarioError::resolution(
        node,
        format!("expected {}, found {} `{}`", expected, found.type_name(), found.show()),
    )
}
