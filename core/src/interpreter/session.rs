use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::InterpreterOptions;
use crate::chain::Chain;
use crate::command::{CommandTable, FetcherTable};
use crate::values::Value;

use super::Printer;

static NO_IMPLICIT: BTreeMap<String, Value> = BTreeMap::new();

/// Everything a running batch shares: the chain, the output sink and the
/// command and fetcher tables.
pub struct Session {
    pub(crate) chain: Arc<dyn Chain>,
    pub(crate) printer: Arc<dyn Printer>,
    pub(crate) commands: CommandTable,
    pub(crate) fetchers: FetcherTable,
    pub(crate) options: InterpreterOptions,
}

impl Session {
    pub fn chain(&self) -> &dyn Chain {
        self.chain.as_ref()
    }

    pub fn printer(&self) -> &dyn Printer {
        self.printer.as_ref()
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn fetchers(&self) -> &FetcherTable {
        &self.fetchers
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }
}

/// Handle passed to handlers, getters and fetchers.
///
/// Carries the session and the implicit argument context (e.g. the sender
/// set by `From`).
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    pub session: &'a Session,
    implicit: &'a BTreeMap<String, Value>,
}

impl<'a> Ctx<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            implicit: &NO_IMPLICIT,
        }
    }

    pub fn chain(&self) -> &'a dyn Chain {
        self.session.chain.as_ref()
    }

    pub fn print(&self, line: &str) {
        self.session.printer.print(line);
    }

    pub fn options(&self) -> &'a InterpreterOptions {
        &self.session.options
    }

    pub fn implicit(&self, name: &str) -> Option<&'a Value> {
        self.implicit.get(name)
    }

    pub fn implicit_context(&self) -> &'a BTreeMap<String, Value> {
        self.implicit
    }

    /// Same session with another implicit context.
    pub fn with_implicit<'b>(&self, implicit: &'b BTreeMap<String, Value>) -> Ctx<'b>
    where
        'a: 'b,
    {
        Ctx {
            session: self.session,
            implicit,
        }
    }
}
