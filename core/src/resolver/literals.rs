//! Literal atom forms.

use crate::values::{Address, Number, Value};

/// Parse an unquoted atom as a literal: address, number, boolean or
/// `nothing`/`null`, tried in that order.
pub fn parse_literal(text: &str) -> Option<Value> {
    if let Some(address) = Address::parse(text) {
        return Some(Value::Address(address));
    }
    if let Some(number) = Number::parse(text) {
        return Some(Value::Number(number));
    }
    if text.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }
    if text.eq_ignore_ascii_case("nothing") || text.eq_ignore_ascii_case("null") {
        return Some(Value::Nothing);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_order() {
        let hex = "0x00000000000000000000000000000000000000ff";
        assert!(matches!(parse_literal(hex), Some(Value::Address(_))));
        assert_eq!(parse_literal("0xff"), Some(Value::number(255)));
        assert_eq!(parse_literal("TRUE"), Some(Value::Bool(true)));
        assert_eq!(parse_literal("Null"), Some(Value::Nothing));
        assert_eq!(parse_literal("Geoff"), None);
    }
}
