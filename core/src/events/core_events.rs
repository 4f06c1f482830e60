//! The commands every interpreter starts with.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::BoxFuture;
use crate::chain::ChainError;
use crate::command::{Arg, Args, Command, CommandTable, Table, dispatch_command};
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::invariant::{Expectation, Hold, Invariant};
use crate::resolver::getters::{get_address, get_event, get_from, get_number, get_string, get_value, get_word};
use crate::resolver::resolve;
use crate::values::{Number, Value};
use crate::world::{Invocation, RegistryError, TxOption, World};

use super::assert::assert_commands;

pub fn core_commands() -> CommandTable {
    CommandTable::new()
        .with(Command::new("Print", "Print a message", print).arg(Arg::new("message", get_string)))
        .with(Command::new("Read", "Resolve a value and print it", read).arg(Arg::new("value", get_value)))
        .with(
            Command::new("History", "Print the most recent actions", history)
                .arg(Arg::new("count", get_number).nullable()),
        )
        .with(Command::new("Help", "Describe the available commands", help).arg(Arg::new("command", get_word).nullable()))
        .with(
            Command::new("Gate", "Run the event unless the condition holds", gate)
                .arg(Arg::new("condition", get_value).rescue(Value::Nothing))
                .arg(Arg::new("event", get_event)),
        )
        .with(
            Command::new("Given", "Run the event only if the condition holds", given)
                .arg(Arg::new("condition", get_value).rescue(Value::Nothing))
                .arg(Arg::new("event", get_event)),
        )
        .with(Command::sub("Invariant", "Register an invariant", invariant_commands()))
        .with(Command::sub("Expect", "Arm an expectation for the next event", expect_commands()))
        .with(
            Command::new("HoldInvariants", "Skip invariant checks after the next event", hold_invariants)
                .arg(Arg::new("class", get_word).nullable()),
        )
        .with(
            Command::new("ClearInvariants", "Remove registered invariants", clear_invariants)
                .arg(Arg::new("class", get_word).nullable()),
        )
        .with(Command::sub("Assert", "Check a condition", assert_commands()))
        .with(
            Command::new("From", "Run the event with another sender", from)
                .arg(Arg::new("user", get_address))
                .arg(Arg::new("event", get_event)),
        )
        .with(Command::sub("Trx", "Run the event with transaction options", trx_commands()))
        .with(
            Command::new("Send", "Transfer value to an account", send)
                .arg(Arg::new("to", get_address))
                .arg(Arg::new("amount", get_number))
                .arg(Arg::new("from", get_from).implicit()),
        )
        .with(
            Command::new("Alias", "Name an address", alias)
                .arg(Arg::new("name", get_word))
                .arg(Arg::new("address", get_address)),
        )
        .with(Command::new("Aliases", "Print every alias", aliases))
        .with(Command::new("Inspect", "Print a summary of the world", inspect))
        .with(
            Command::new("Set", "Change a setting", set)
                .arg(Arg::new("key", get_word))
                .arg(Arg::new("value", get_string)),
        )
        .with(
            Command::new("SleepSeconds", "Advance the chain clock", sleep_seconds)
                .arg(Arg::new("seconds", get_number)),
        )
        .with(
            Command::new("SleepUntilTimestamp", "Wait for the chain clock", sleep_until_timestamp)
                .arg(Arg::new("timestamp", get_number)),
        )
        .with(
            Command::new("SleepUntilBlock", "Wait for a block", sleep_until_block)
                .arg(Arg::new("block", get_number)),
        )
        .with(Command::new("AdvanceBlocks", "Mine blocks", advance_blocks).arg(Arg::new("blocks", get_number)))
        .with(
            Command::new("SaveNetwork", "Write the contract registry", save_network)
                .arg(Arg::new("path", get_string).nullable()),
        )
}

fn invariant_commands() -> CommandTable {
    CommandTable::new()
        .with(
            Command::new("Static", "The condition keeps its current value", invariant_static)
                .arg(Arg::new("condition", get_event)),
        )
        .with(
            Command::new("Remains", "The condition keeps the given value", invariant_remains)
                .arg(Arg::new("condition", get_event))
                .arg(Arg::new("value", get_value)),
        )
        .with(Command::new("Success", "Every invocation succeeds", invariant_success))
}

fn expect_commands() -> CommandTable {
    CommandTable::new()
        .with(
            Command::new("Changes", "The condition moves by delta", expect_changes)
                .arg(Arg::new("condition", get_event))
                .arg(Arg::new("delta", get_number))
                .arg(Arg::new("tolerance", get_number).nullable()),
        )
        .with(
            Command::new("Remains", "The condition equals the value", expect_remains)
                .arg(Arg::new("condition", get_event))
                .arg(Arg::new("value", get_value)),
        )
}

fn trx_commands() -> CommandTable {
    CommandTable::new()
        .with(
            Command::new("Value", "Attach value to the transactions of the event", trx_value)
                .arg(Arg::new("amount", get_number))
                .arg(Arg::new("event", get_event)),
        )
        .with(
            Command::new("GasPrice", "Set the gas price for the event", trx_gas_price)
                .arg(Arg::new("price", get_number))
                .arg(Arg::new("event", get_event)),
        )
}

// ============================================================================
// Output
// ============================================================================

fn print<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        ctx.print(args.string("message")?);
        Ok(world)
    })
}

fn read<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        ctx.print(&args.get("value")?.show());
        Ok(world)
    })
}

fn history<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let count = match args.optional("count")? {
            Some(count) => to_u64(count.as_number()?)? as usize,
            None => ctx.options().history_default,
        };
        for action in world.actions().recent(count) {
            ctx.print(&action.description);
        }
        Ok(world)
    })
}

fn help<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let commands = ctx.session.commands();
        match args.optional("command")? {
            None => {
                for entry in commands.entries() {
                    ctx.print(&format!("{} - {}", entry.name(), entry.description()));
                }
            }
            Some(name) => {
                let name = name.as_str()?;
                let mut lines = Vec::new();
                for entry in commands.find(name) {
                    describe(entry.name(), entry.usage(), entry.description(), entry.sub_table(), &mut lines);
                }
                if lines.is_empty() {
                    return Err(ScenarioError::NoMatchingCommand {
                        attempted: name.to_string(),
                        candidates: commands.names(),
                    });
                }
                for line in lines {
                    ctx.print(&line);
                }
            }
        }
        Ok(world)
    })
}

fn describe<H>(prefix: &str, usage: String, description: &str, sub: Option<&Table<H>>, out: &mut Vec<String>) {
    match sub {
        None => out.push(format!("{} - {}", usage, description)),
        Some(table) => {
            for entry in table.entries() {
                let usage = format!("{} {}", prefix, entry.usage());
                let prefix = format!("{} {}", prefix, entry.name());
                describe(&prefix, usage, entry.description(), entry.sub_table(), out);
            }
        }
    }
}

fn aliases<'a>(ctx: Ctx<'a>, world: World, _args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        for (name, address) in &world.settings().aliases {
            ctx.print(&format!("{}: {}", name, address));
        }
        Ok(world)
    })
}

fn inspect<'a>(ctx: Ctx<'a>, world: World, _args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let settings = world.settings();
        if let Some(from) = &settings.default_from {
            let name = settings.alias_of(from).unwrap_or("-");
            ctx.print(&format!("Default sender: {} ({})", from, name));
        }
        ctx.print(&format!("Aliases: {}", settings.aliases.len()));
        for (kind, name, record) in world.registry().iter() {
            ctx.print(&format!("{} {}: {} ({})", kind, name, record.address, record.contract));
        }
        for invariant in world.invariants() {
            ctx.print(&format!("Invariant {}", invariant));
        }
        for expectation in world.pending_expectations() {
            ctx.print(&format!("Expect {}", expectation));
        }
        ctx.print(&format!("Actions: {}", world.actions().len()));
        Ok(world)
    })
}

// ============================================================================
// Control flow
// ============================================================================

fn gate<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        if args.get("condition")?.truthy() {
            tracing::debug!("gate closed");
            return Ok(world);
        }
        dispatch_command(ctx, world, ctx.session.commands(), args.event("event")?).await
    })
}

fn given<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        if !args.get("condition")?.truthy() {
            tracing::debug!("given condition not met");
            return Ok(world);
        }
        dispatch_command(ctx, world, ctx.session.commands(), args.event("event")?).await
    })
}

fn from<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let mut implicit: BTreeMap<String, Value> = ctx.implicit_context().clone();
        implicit.insert("from".to_string(), args.get("user")?.clone());
        let inner = ctx.with_implicit(&implicit);
        dispatch_command(inner, world, ctx.session.commands(), args.event("event")?).await
    })
}

fn trx_value<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let world = world.set_tx_option(TxOption::Value(args.number("amount")?.encode()));
        dispatch_command(ctx, world, ctx.session.commands(), args.event("event")?).await
    })
}

fn trx_gas_price<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let world = world.set_tx_option(TxOption::GasPrice(args.number("price")?.encode()));
        dispatch_command(ctx, world, ctx.session.commands(), args.event("event")?).await
    })
}

// ============================================================================
// Invariants and expectations
// ============================================================================

fn invariant_static<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let condition = args.event("condition")?.clone();
        let value = resolve(ctx, &world, &condition).await?;
        Ok(world.add_invariant(Invariant::Static { condition, value }))
    })
}

fn invariant_remains<'a>(_ctx: Ctx<'a>, world: World, mut args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let condition = args.event("condition")?.clone();
        let value = args.take("value")?;
        Ok(world.add_invariant(Invariant::Remains { condition, value }))
    })
}

fn invariant_success<'a>(_ctx: Ctx<'a>, world: World, _args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move { Ok(world.add_invariant(Invariant::Success)) })
}

fn expect_changes<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let condition = args.event("condition")?.clone();
        let original = match resolve(ctx, &world, &condition).await? {
            Value::Number(n) => n,
            other => {
                return Err(ScenarioError::resolution(
                    &condition,
                    format!("expected a number, found {}", other.type_name()),
                ));
            }
        };
        let delta = args.number("delta")?.clone();
        let tolerance = args.optional("tolerance")?.map(Value::as_number).transpose()?.cloned();
        Ok(world.add_expectation(Expectation::Changes {
            condition,
            original,
            delta,
            tolerance,
        }))
    })
}

fn expect_remains<'a>(_ctx: Ctx<'a>, world: World, mut args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let condition = args.event("condition")?.clone();
        let value = args.take("value")?;
        Ok(world.add_expectation(Expectation::Remains { condition, value }))
    })
}

fn hold_invariants<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let hold = match args.optional("class")? {
            Some(class) => Hold::Class(class.as_str()?.to_string()),
            None => Hold::All,
        };
        Ok(world.hold_invariants(hold))
    })
}

fn clear_invariants<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let class = args.optional("class")?.map(Value::as_str).transpose()?;
        Ok(world.clear_invariants(class))
    })
}

// ============================================================================
// Accounts and settings
// ============================================================================

fn send<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let to = args.address("to")?;
        let amount = args.number("amount")?;
        let from = args.address("from")?;
        let receipt = ctx.chain().send_value(from, to, amount.encode()).await?;
        let to_name = world.settings().alias_of(to).map_or_else(|| to.to_string(), str::to_string);
        let description = format!("Send {} to {}", amount.show(), to_name);
        Ok(Invocation::new(description, from.clone(), receipt).record(world))
    })
}

fn alias<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let name = args.string("name")?;
        let address = args.address("address")?;
        Ok(world
            .add_alias(name, address.clone())
            .add_action(format!("Alias {} = {}", name, address), None))
    })
}

fn set<'a>(_ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let key = args.string("key")?;
        let value = args.string("value")?;
        Ok(world
            .set_setting(key, value)?
            .add_action(format!("Set {} = {}", key, value), None))
    })
}

fn save_network<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let path = match args.optional("path")? {
            Some(path) => PathBuf::from(path.as_str()?),
            None => ctx
                .options()
                .network_file
                .clone()
                .ok_or(RegistryError::NoNetworkFile)?,
        };
        world.registry().save(&path)?;
        let description = format!("Saved {} contracts to {}", world.registry().len(), path.display());
        Ok(world.add_action(description, None))
    })
}

// ============================================================================
// Time
// ============================================================================

fn sleep_seconds<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let seconds = to_u64(args.number("seconds")?)?;
        ctx.chain().sleep(Duration::from_secs(seconds)).await?;
        Ok(world.add_action(format!("Slept {} seconds", seconds), None))
    })
}

fn sleep_until_timestamp<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let target = to_u64(args.number("timestamp")?)?;
        let chain = ctx.chain();
        let mut polls = 0;
        loop {
            let now = chain.timestamp().await?;
            if now >= target {
                break;
            }
            if polls == ctx.options().max_poll_iterations {
                return Err(poll_limit(format!("timestamp {}", target), polls));
            }
            polls += 1;
            chain.sleep(Duration::from_secs(target - now)).await?;
        }
        Ok(world.add_action(format!("Slept until timestamp {}", target), None))
    })
}

fn sleep_until_block<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let target = to_u64(args.number("block")?)?;
        let chain = ctx.chain();
        let interval = Duration::from_millis(ctx.options().poll_interval_ms);
        let mut polls = 0;
        while chain.block_number().await? < target {
            if polls == ctx.options().max_poll_iterations {
                return Err(poll_limit(format!("block {}", target), polls));
            }
            polls += 1;
            chain.sleep(interval).await?;
        }
        Ok(world.add_action(format!("Slept until block {}", target), None))
    })
}

fn advance_blocks<'a>(ctx: Ctx<'a>, world: World, args: Args) -> BoxFuture<'a, Result<World>> {
    Box::pin(async move {
        let blocks = to_u64(args.number("blocks")?)?;
        ctx.chain().mine(blocks).await?;
        Ok(world.add_action(format!("Advanced {} blocks", blocks), None))
    })
}

fn poll_limit(waiting_for: String, iterations: usize) -> ScenarioError {
    ChainError::PollLimit {
        waiting_for,
        iterations,
    }
    .into()
}

fn to_u64(number: &Number) -> Result<u64> {
    number
        .to_u64()
        .ok_or_else(|| ScenarioError::resolution(number.show(), "expected a non-negative integer"))
}
