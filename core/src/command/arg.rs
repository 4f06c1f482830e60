use std::fmt;
use std::sync::Arc;

use crate::BoxFuture;
use crate::errors::Result;
use crate::interpreter::Ctx;
use crate::parser::Node;
use crate::values::Value;
use crate::world::World;

/// Turns one token-tree node into a value.
pub type Getter =
    Arc<dyn for<'a> Fn(Ctx<'a>, &'a World, &'a Node) -> BoxFuture<'a, Result<Value>> + Send + Sync>;

/// Declarative parameter descriptor.
///
/// ```ignore
/// Arg::new("amount", get_number).nullable()
/// Arg::new("from", get_address).implicit()
/// Arg::new("args", get_values).variadic()
/// ```
#[derive(Clone)]
pub struct Arg {
    pub(crate) name: String,
    pub(crate) getter: Getter,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
    pub(crate) variadic: bool,
    pub(crate) mapped: bool,
    pub(crate) implicit: bool,
    pub(crate) rescue: Option<Value>,
}

impl Arg {
    pub fn new<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: for<'a> Fn(Ctx<'a>, &'a World, &'a Node) -> BoxFuture<'a, Result<Value>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            getter: Arc::new(getter),
            default: None,
            nullable: false,
            variadic: false,
            mapped: false,
            implicit: false,
            rescue: None,
        }
    }

    /// Value used when no token is left.
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Bind `Nothing` when no token is left.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Consume every remaining token. Must be the last positional argument.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Apply the getter to each element of a list node and bind the
    /// results as a list. With [`Arg::variadic`] the getter runs on each
    /// remaining node instead, or on each item when a single list is left.
    pub fn mapped(mut self) -> Self {
        self.mapped = true;
        self
    }

    /// Taken from the implicit context instead of the token stream.
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Value used when the getter fails.
    pub fn rescue(mut self, value: Value) -> Self {
        self.rescue = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_positional(&self) -> bool {
        !self.implicit
    }

    /// A positional argument that must be supplied.
    pub fn is_required(&self) -> bool {
        !self.implicit && !self.variadic && !self.nullable && self.default.is_none()
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("nullable", &self.nullable)
            .field("variadic", &self.variadic)
            .field("mapped", &self.mapped)
            .field("implicit", &self.implicit)
            .field("rescue", &self.rescue)
            .finish_non_exhaustive()
    }
}

/// Usage text such as `<name> [amount] <args...>`.
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            write!(f, "<{}...>", self.name)
        } else if self.is_required() {
            write!(f, "<{}>", self.name)
        } else {
            write!(f, "[{}]", self.name)
        }
    }
}
