//! Binds token-tree nodes to an entry's parameter descriptors.

use crate::BoxFuture;
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::Value;
use crate::world::World;

use super::{Arg, Args};

/// Bind `nodes` to `params`.
///
/// Implicit parameters come from the context (or their getter applied to
/// an empty list). Positional parameters consume nodes left to right; a
/// variadic parameter takes everything that is left and must be the last
/// positional one. A mapped parameter applies its getter element-wise.
/// Leftover nodes without a variadic are an error.
pub fn bind<'a>(
    ctx: Ctx<'a>,
    world: &'a World,
    command: &'a str,
    params: &'a [Arg],
    nodes: &'a [Node],
) -> BoxFuture<'a, Result<Args>> {
    Box::pin(async move {
        if let Some(param) = after_variadic(params) {
            return Err(ScenarioError::InvalidSignature {
                command: command.to_string(),
                param: param.name.clone(),
            });
        }

        let mut args = Args::new(command);
        let mut remaining = nodes;
        let empty = Node::empty();

        for param in params {
            if param.implicit {
                let value = match ctx.implicit(&param.name) {
                    Some(value) => value.clone(),
                    None => fetch(ctx, world, param, &empty).await?,
                };
                tracing::trace!(command, param = %param.name, value = %value.show(), "implicit");
                args.insert(&param.name, value);
                continue;
            }

            if param.variadic {
                let rest = core::mem::take(&mut remaining);
                let value = if param.mapped {
                    let items = match rest {
                        [Node::List(items)] => items.as_slice(),
                        _ => rest,
                    };
                    fetch_each(ctx, world, param, items).await?
                } else {
                    let list = Node::List(rest.to_vec());
                    fetch(ctx, world, param, &list).await?
                };
                tracing::trace!(command, param = %param.name, count = rest.len(), "variadic");
                args.insert(&param.name, value);
                continue;
            }

            let value = match remaining.split_first() {
                Some((node, rest)) => {
                    remaining = rest;
                    if param.mapped {
                        fetch_each(ctx, world, param, node.tokens()).await?
                    } else {
                        fetch(ctx, world, param, node).await?
                    }
                }
                None => match (&param.default, param.nullable) {
                    (Some(default), _) => default.clone(),
                    (None, true) => Value::Nothing,
                    (None, false) => {
                        return Err(ScenarioError::MissingArgument {
                            command: command.to_string(),
                            param: param.name.clone(),
                        });
                    }
                },
            };
            tracing::trace!(command, param = %param.name, value = %value.show(), "bound");
            args.insert(&param.name, value);
        }

        if let Some(extra) = remaining.first() {
            return Err(ScenarioError::TooManyArguments {
                command: command.to_string(),
                extra: extra.to_string(),
            });
        }
        Ok(args)
    })
}

/// First positional parameter declared after a variadic one.
fn after_variadic(params: &[Arg]) -> Option<&Arg> {
    params
        .iter()
        .filter(|param| param.is_positional())
        .skip_while(|param| !param.variadic)
        .nth(1)
}

async fn fetch_each(ctx: Ctx<'_>, world: &World, param: &Arg, items: &[Node]) -> Result<Value> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(fetch(ctx, world, param, item).await?);
    }
    Ok(Value::List(values))
}

async fn fetch(ctx: Ctx<'_>, world: &World, param: &Arg, node: &Node) -> Result<Value> {
    match (param.getter)(ctx, world, node).await {
        Ok(value) => Ok(value),
        Err(err) => match &param.rescue {
            Some(rescue) => {
                tracing::trace!(param = %param.name, error = %err, "rescued");
                Ok(rescue.clone())
            }
            None => Err(err),
        },
    }
}
