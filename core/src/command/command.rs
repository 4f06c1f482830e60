use std::collections::BTreeMap;
use std::sync::Arc;

use super::Arg;
use crate::BoxFuture;
use crate::errors::{Result, ScenarioError};
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::{Address, Number, Value};
use crate::world::World;

pub type CommandHandler =
    Arc<dyn for<'a> Fn(Ctx<'a>, World, Args) -> BoxFuture<'a, Result<World>> + Send + Sync>;

pub type FetcherHandler =
    Arc<dyn for<'a> Fn(Ctx<'a>, &'a World, Args) -> BoxFuture<'a, Result<Value>> + Send + Sync>;

/// What a matched entry does with its tokens.
#[derive(Clone)]
pub enum Action<H> {
    Handler(H),
    /// Dispatch the remaining tokens against a nested table.
    Sub(Table<H>),
}

/// A named command or fetcher.
#[derive(Clone)]
pub struct Entry<H> {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) params: Vec<Arg>,
    pub(crate) action: Action<H>,
    pub(crate) name_pos: usize,
    pub(crate) catchall: bool,
}

pub type Command = Entry<CommandHandler>;
pub type Fetcher = Entry<FetcherHandler>;

impl Entry<CommandHandler> {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(Ctx<'a>, World, Args) -> BoxFuture<'a, Result<World>> + Send + Sync + 'static,
    {
        Self::with_action(name, description, Action::Handler(Arc::new(handler)))
    }
}

impl Entry<FetcherHandler> {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(Ctx<'a>, &'a World, Args) -> BoxFuture<'a, Result<Value>>
            + Send
            + Sync
            + 'static,
    {
        Self::with_action(name, description, Action::Handler(Arc::new(handler)))
    }
}

impl<H> Entry<H> {
    fn with_action(name: impl Into<String>, description: impl Into<String>, action: Action<H>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            action,
            name_pos: 0,
            catchall: false,
        }
    }

    /// An entry whose remaining tokens are dispatched against `table`.
    pub fn sub(name: impl Into<String>, description: impl Into<String>, table: Table<H>) -> Self {
        Self::with_action(name, description, Action::Sub(table))
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.params.push(arg);
        self
    }

    /// Position of the name token, for `<Noun> <Verb>` forms.
    pub fn name_pos(mut self, pos: usize) -> Self {
        self.name_pos = pos;
        self
    }

    /// Tried only after every other entry, without a name check. All
    /// tokens, including the first, are bound to the parameters.
    pub fn catchall(mut self) -> Self {
        self.catchall = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[Arg] {
        &self.params
    }

    pub fn is_catchall(&self) -> bool {
        self.catchall
    }

    pub fn sub_table(&self) -> Option<&Table<H>> {
        match &self.action {
            Action::Sub(table) => Some(table),
            Action::Handler(_) => None,
        }
    }

    /// Inclusive bounds on the positional token count. `None` is unbounded.
    pub fn arity(&self) -> (usize, Option<usize>) {
        let min = self.params.iter().filter(|p| p.is_required()).count();
        let positional = self.params.iter().filter(|p| p.is_positional());
        if self.params.iter().any(|p| p.is_positional() && p.variadic) {
            (min, None)
        } else {
            (min, Some(positional.count()))
        }
    }

    /// Usage line, e.g. `Assert Equal <left> <right>`.
    pub fn usage(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.is_positional())
            .map(|p| p.to_string())
            .collect();
        if !self.catchall {
            parts.insert(self.name_pos.min(parts.len()), self.name.clone());
        }
        parts.join(" ")
    }
}

/// Ordered entries; the first match wins.
#[derive(Clone)]
pub struct Table<H> {
    entries: Vec<Entry<H>>,
}

pub type CommandTable = Table<CommandHandler>;
pub type FetcherTable = Table<FetcherHandler>;

impl<H> Default for Table<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> Table<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entry: Entry<H>) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: Entry<H>) {
        self.entries.push(entry);
    }

    /// Append `other` after the existing entries.
    pub fn extend(&mut self, other: Table<H>) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Entry<H>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct names of the non-catchall entries, in table order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in self.entries.iter().filter(|e| !e.catchall) {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&entry.name)) {
                names.push(entry.name.clone());
            }
        }
        names
    }

    /// Entries called `name`, ignoring case.
    pub fn find<'t>(&'t self, name: &'t str) -> impl Iterator<Item = &'t Entry<H>> + 't {
        self.entries
            .iter()
            .filter(move |e| !e.catchall && e.name.eq_ignore_ascii_case(name))
    }

    /// True when some entry called `name` takes no positional tokens.
    pub fn has_nullary(&self, name: &str) -> bool {
        self.find(name).any(|e| match e.action {
            Action::Handler(_) => e.arity().0 == 0,
            Action::Sub(_) => false,
        })
    }
}

/// Bound arguments, by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    command: String,
    values: BTreeMap<String, Value>,
}

impl Args {
    pub(crate) fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| ScenarioError::MissingArgument {
                command: self.command.clone(),
                param: name.to_string(),
            })
    }

    pub fn take(&mut self, name: &str) -> Result<Value> {
        self.values
            .remove(name)
            .ok_or_else(|| ScenarioError::MissingArgument {
                command: self.command.clone(),
                param: name.to_string(),
            })
    }

    /// `None` when the argument was bound to `Nothing`.
    pub fn optional(&self, name: &str) -> Result<Option<&Value>> {
        let value = self.get(name)?;
        Ok((!value.is_nothing()).then_some(value))
    }

    pub fn number(&self, name: &str) -> Result<&Number> {
        Ok(self.get(name)?.as_number()?)
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        Ok(self.get(name)?.as_str()?)
    }

    pub fn address(&self, name: &str) -> Result<&Address> {
        Ok(self.get(name)?.as_address()?)
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.as_bool()?)
    }

    pub fn event(&self, name: &str) -> Result<&Node> {
        Ok(self.get(name)?.as_event()?)
    }

    pub fn list(&self, name: &str) -> Result<&[Value]> {
        Ok(self.get(name)?.as_list()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
