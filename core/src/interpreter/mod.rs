//! The interpreter: a strict left fold of events over a [`World`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scenario_core::chain::MemoryChain;
//! use scenario_core::events::ContractKind;
//! use scenario_core::interpreter::Interpreter;
//!
//! let interpreter = Interpreter::builder(Arc::new(MemoryChain::new()))
//!     .contract_kind(ContractKind::new("Storage", "Storage"))
//!     .build();
//! let world = interpreter.initial_world().await?;
//! let world = interpreter.run(world, "Storage Deploy Box").await?;
//! ```

mod printer;
mod session;

pub use printer::{BufferPrinter, Printer, StdoutPrinter};
pub use session::{Ctx, Session};

use std::sync::Arc;

use crate::api::InterpreterOptions;
use crate::chain::Chain;
use crate::command::{Command, CommandTable, Fetcher, FetcherTable, dispatch_command};
use crate::errors::Result;
use crate::events::{ContractKind, core_commands};
use crate::invariant;
use crate::parser::{Event, Node, format_event, parse_node, parse_with_max_depth};
use crate::resolver::{core_fetchers, resolve};
use crate::values::Value;
use crate::world::{Registry, Settings, World};

/// Names given to the first unlocked accounts.
pub const DEFAULT_USERS: [&str; 6] = ["Root", "Geoff", "Torrey", "Coburn", "Jared", "Robert"];

pub struct Interpreter {
    session: Session,
}

/// Builder for [`Interpreter`].
///
/// Commands and fetchers added here are tried before the built-in ones,
/// which are tried before the contract kinds.
pub struct InterpreterBuilder {
    chain: Arc<dyn Chain>,
    printer: Arc<dyn Printer>,
    options: InterpreterOptions,
    commands: CommandTable,
    fetchers: FetcherTable,
    kinds: Vec<ContractKind>,
}

impl InterpreterBuilder {
    pub fn options(mut self, options: InterpreterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn printer(mut self, printer: Arc<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    pub fn contract_kind(mut self, kind: ContractKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn build(self) -> Interpreter {
        let mut commands = self.commands;
        commands.extend(core_commands());
        let mut fetchers = self.fetchers;
        fetchers.extend(core_fetchers());
        for kind in &self.kinds {
            commands.push(kind.command());
            fetchers.push(kind.fetcher());
        }

        Interpreter {
            session: Session {
                chain: self.chain,
                printer: self.printer,
                commands,
                fetchers,
                options: self.options,
            },
        }
    }
}

impl Interpreter {
    pub fn builder(chain: Arc<dyn Chain>) -> InterpreterBuilder {
        InterpreterBuilder {
            chain,
            printer: Arc::new(StdoutPrinter),
            options: InterpreterOptions::default(),
            commands: CommandTable::new(),
            fetchers: FetcherTable::new(),
            kinds: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The world a batch starts from: the first accounts aliased to the
    /// default users, the first account as default sender and the registry
    /// loaded from the network file, if any.
    pub async fn initial_world(&self) -> Result<World> {
        let accounts = self.session.chain().accounts().await?;
        let options = self.session.options();

        let mut settings = Settings {
            default_from: accounts.first().cloned(),
            verbose: options.verbose,
            ..Settings::default()
        };
        for (name, address) in DEFAULT_USERS.iter().zip(accounts) {
            settings.aliases.insert(name.to_string(), address);
        }

        let registry = match &options.network_file {
            Some(path) => Registry::load(path)?,
            None => Registry::default(),
        };
        tracing::debug!(
            aliases = settings.aliases.len(),
            contracts = registry.len(),
            "initial world"
        );
        Ok(World::new(settings, registry))
    }

    /// Parse `source` and process its events in order.
    pub async fn run(&self, world: World, source: &str) -> Result<World> {
        let events = parse_with_max_depth(source, self.session.options().max_depth)?;
        self.process_events(world, &events).await
    }

    /// Fold `events` over `world`. The first error aborts the batch and
    /// names the event that raised it.
    pub async fn process_events(&self, world: World, events: &[Event]) -> Result<World> {
        let mut world = world;
        for event in events {
            world = self
                .process_event(world, &event.node)
                .await
                .map_err(|err| err.in_event(event, event.span.clone()))?;
        }
        Ok(world)
    }

    /// Dispatch one event, then check invariants and expectations against
    /// the resulting world.
    pub async fn process_event(&self, world: World, event: &Node) -> Result<World> {
        let ctx = Ctx::new(&self.session);
        tracing::debug!(event = %format_event(event), "processing");

        let before = world.actions().len();
        let world = world.with_event(event.clone());
        let world = dispatch_command(ctx, world, self.session.commands(), event).await?;

        if world.settings().verbose {
            let added = world.actions().len().saturating_sub(before);
            let mut recent = world.actions().recent(added);
            recent.reverse();
            for action in recent {
                ctx.print(&action.description);
            }
        }

        invariant::check(ctx, &world, event).await?;
        Ok(world.end_event())
    }

    /// Resolve a single expression without changing the world.
    pub async fn resolve(&self, world: &World, source: &str) -> Result<Value> {
        let node = parse_node(source)?;
        resolve(Ctx::new(&self.session), world, &node).await
    }
}
