//! First-match-wins dispatch over command and fetcher tables.

use std::borrow::Cow;

use crate::BoxFuture;
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::{Node, format_event};
use crate::values::Value;
use crate::world::World;

use super::{Action, Args, CommandTable, Entry, FetcherTable, Table, bind};

/// Run `event` against a command table and return the successor world.
pub fn dispatch_command<'a>(
    ctx: Ctx<'a>,
    world: World,
    table: &'a CommandTable,
    event: &'a Node,
) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let (handler, args) = select(ctx, &world, table, event.tokens()).await?;
        handler(ctx, world, args).await
    })
}

/// Resolve `event` against a fetcher table.
pub fn dispatch_fetcher<'a>(
    ctx: Ctx<'a>,
    world: &'a World,
    table: &'a FetcherTable,
    event: &'a Node,
) -> BoxFuture<'a, Result<Value>> {
    Box::pin(async move {
        let (handler, args) = select(ctx, world, table, event.tokens()).await?;
        handler(ctx, world, args).await
    })
}

/// Find the entry for `tokens` and bind its arguments.
///
/// Non-catchall entries are tried in table order before any catchall. An
/// entry matches when its name is at its name position and the remaining
/// token count fits its arity. A binding failure moves on to the next
/// entry; when every matching entry fails the first failure is returned.
pub fn select<'t, 'w, H>(
    ctx: Ctx<'w>,
    world: &'w World,
    table: &'t Table<H>,
    tokens: &'w [Node],
) -> BoxFuture<'w, Result<(&'t H, Args)>>
where
    't: 'w,
    H: Send + Sync + 'static,
{
    Box::pin(async move {
        let mut first_error: Option<ScenarioError> = None;
        let mut named: Vec<&Entry<H>> = Vec::new();

        for catchall in [false, true] {
            for entry in table.entries().iter().filter(|e| e.catchall == catchall) {
                let Some(rest) = positional_tokens(entry, tokens) else {
                    continue;
                };
                named.push(entry);

                let selected = match &entry.action {
                    Action::Handler(handler) => {
                        let (min, max) = entry.arity();
                        if rest.len() < min || max.is_some_and(|max| rest.len() > max) {
                            tracing::trace!(entry = %entry.name, count = rest.len(), "arity mismatch");
                            continue;
                        }
                        bind(ctx, world, &entry.name, &entry.params, &rest)
                            .await
                            .map(|args| (handler, args))
                    }
                    Action::Sub(sub) => select(ctx, world, sub, &rest).await,
                };

                match selected {
                    Ok(selected) => {
                        tracing::debug!(entry = %entry.name, catchall, "selected");
                        return Ok(selected);
                    }
                    Err(err) if err.is_bind_error() => {
                        tracing::debug!(entry = %entry.name, error = %err, "binding failed");
                        first_error.get_or_insert(err);
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let attempted = format_event(&Node::List(tokens.to_vec()));
        let candidates = if named.is_empty() {
            table.names()
        } else {
            named.iter().map(|entry| entry.usage()).collect()
        };
        Err(ScenarioError::NoMatchingCommand {
            attempted,
            candidates,
        })
    })
}

/// Tokens left for the parameters once the name token is removed, or
/// `None` if the name does not match.
fn positional_tokens<'n, H>(entry: &Entry<H>, tokens: &'n [Node]) -> Option<Cow<'n, [Node]>> {
    if entry.catchall {
        return Some(Cow::Borrowed(tokens));
    }
    if !tokens.get(entry.name_pos)?.is_word(&entry.name) {
        return None;
    }
    if entry.name_pos == 0 {
        Some(Cow::Borrowed(&tokens[1..]))
    } else {
        let mut rest = tokens.to_vec();
        rest.remove(entry.name_pos);
        Some(Cow::Owned(rest))
    }
}
