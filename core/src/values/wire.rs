//! Wire-ready primitives exchanged with the chain capability.

use core::fmt;

use num_bigint::BigInt;

use super::Address;

/// A contract call argument or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Int(BigInt),
    Address(Address),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Wire>),
    Null,
}

impl Wire {
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Wire::Int(i) => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wire::Int(i) => write!(f, "{}", i),
            Wire::Address(a) => write!(f, "{}", a),
            Wire::Bool(b) => write!(f, "{}", b),
            Wire::Str(s) => write!(f, "{:?}", s),
            Wire::Bytes(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Wire::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Wire::Null => write!(f, "null"),
        }
    }
}
