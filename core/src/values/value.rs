use std::collections::BTreeMap;

use crate::parser::{Node, format_event};
use crate::values::{Address, Number, Wire};

/// A resolved scenario value.
///
/// Consumers match on the variant. In particular `Nothing` must be told
/// apart from `Number(0)` by variant, not by truthiness.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    String(String),
    Bool(bool),
    Address(Address),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// An unevaluated token tree, e.g. the body of `Gate` or `From`.
    Event(Node),
    /// Explicitly no value.
    Nothing,
    /// A failure captured as data, e.g. a revert reason.
    Error(String),
    /// Equal to every value.
    Anything,
    /// A number compared at a fixed count of significant digits.
    Precise { value: Number, digits: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("cannot encode {variant} value for a contract call")]
    CannotEncode { variant: &'static str },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("cannot compare {left} with {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },
}

impl Value {
    pub fn number(n: impl Into<Number>) -> Self {
        Value::Number(n.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Address(_) => "Address",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Event(_) => "Event",
            Value::Nothing => "Nothing",
            Value::Error(_) => "Error",
            Value::Anything => "Anything",
            Value::Precise { .. } => "Precise",
        }
    }

    /// Human-readable rendering used by `Print`, `Read` and error messages.
    pub fn show(&self) -> String {
        match self {
            Value::Number(n) => n.show(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Address(a) => a.to_string(),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::show).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.show()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Event(node) => format_event(node),
            Value::Nothing => "Nothing".to_string(),
            Value::Error(msg) => format!("Error({})", msg),
            Value::Anything => "Anything".to_string(),
            Value::Precise { value, digits } => format!("Precise({}, {})", value.show(), digits),
        }
    }

    /// Wire form for a contract call argument.
    pub fn encode(&self) -> Result<Wire, ValueError> {
        match self {
            Value::Number(n) => Ok(Wire::Int(n.encode())),
            Value::String(s) => Ok(Wire::Str(s.clone())),
            Value::Bool(b) => Ok(Wire::Bool(*b)),
            Value::Address(a) => Ok(Wire::Address(a.clone())),
            Value::List(items) => items.iter().map(Value::encode).collect::<Result<_, _>>().map(Wire::List),
            Value::Event(node) => Ok(Wire::Str(format_event(node))),
            Value::Nothing => Ok(Wire::Null),
            Value::Map(_) | Value::Error(_) | Value::Anything | Value::Precise { .. } => {
                Err(ValueError::CannotEncode {
                    variant: self.type_name(),
                })
            }
        }
    }

    /// Lift a chain result into a value.
    pub fn from_wire(wire: Wire) -> Self {
        match wire {
            Wire::Int(i) => Value::Number(Number::from_int(i)),
            Wire::Address(a) => Value::Address(a),
            Wire::Bool(b) => Value::Bool(b),
            Wire::Str(s) => Value::String(s),
            Wire::Bytes(_) => Value::String(wire.to_string()),
            Wire::List(items) => Value::List(items.into_iter().map(Value::from_wire).collect()),
            Wire::Null => Value::Nothing,
        }
    }

    /// Nothing, false and zero are falsy; everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nothing => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            _ => true,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Equality as used by assertions, invariants and `=`.
    ///
    /// `Anything` equals everything; `Nothing` is unequal to every other
    /// variant. Any other cross-variant comparison is an error.
    pub fn matches(&self, other: &Value) -> Result<bool, ValueError> {
        match (self, other) {
            (Value::Anything, _) | (_, Value::Anything) => Ok(true),
            (Value::Nothing, Value::Nothing) => Ok(true),
            (Value::Nothing, _) | (_, Value::Nothing) => Ok(false),
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Precise { value, digits }, Value::Number(n))
            | (Value::Number(n), Value::Precise { value, digits }) => Ok(value
                .magnitude()
                .to_significant(*digits)
                == n.magnitude().to_significant(*digits)),
            (
                Value::Precise { value: a, digits: da },
                Value::Precise { value: b, digits: db },
            ) => {
                let digits = (*da).min(*db);
                Ok(a.magnitude().to_significant(digits) == b.magnitude().to_significant(digits))
            }
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Address(a), Value::Address(b)) => Ok(a == b),
            (Value::Event(a), Value::Event(b)) => Ok(a == b),
            (Value::Error(a), Value::Error(b)) => Ok(a == b),
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.matches(y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Map(a), Value::Map(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, x) in a {
                    match b.get(key) {
                        Some(y) if x.matches(y)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (left, right) => Err(ValueError::Incomparable {
                left: left.type_name(),
                right: right.type_name(),
            }),
        }
    }

    pub fn as_number(&self) -> Result<&Number, ValueError> {
        match self {
            Value::Number(n) => Ok(n),
            other => Err(mismatch("Number", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(mismatch("String", other)),
        }
    }

    pub fn as_address(&self) -> Result<&Address, ValueError> {
        match self {
            Value::Address(a) => Ok(a),
            other => Err(mismatch("Address", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("Bool", other)),
        }
    }

    pub fn as_event(&self) -> Result<&Node, ValueError> {
        match self {
            Value::Event(node) => Ok(node),
            other => Err(mismatch("Event", other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(mismatch("List", other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        found: found.type_name().to_string(),
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Value::Address(a)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
