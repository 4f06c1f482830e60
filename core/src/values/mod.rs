//! The closed set of scenario values.
//!
//! [`Value`] is a pure data carrier. Arithmetic and ordering operators live
//! in the resolver; values only know how to render ([`Value::show`]), encode
//! for contract calls ([`Value::encode`]), test truthiness and compare for
//! equality.

mod address;
mod number;
mod value;
mod wire;

pub use address::Address;
pub use number::{DIVISION_PRECISION, Decimal, MAX_LITERAL_SHIFT, Number};
pub use value::{Value, ValueError};
pub use wire::Wire;
