//! Arbitrary-precision decimal numbers.
//!
//! A [`Decimal`] is `mantissa * 10^-scale` and is always kept normalised
//! (no trailing zeros in the mantissa while `scale > 0`), so structural
//! equality is numeric equality.
//!
//! A [`Number`] pairs a decimal magnitude with an optional display scale.
//! The display scale only affects [`Number::show`]; arithmetic, comparison
//! and wire encoding use the magnitude.

use core::cmp::Ordering;
use core::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

/// Fractional digits kept by [`Decimal::checked_div`].
pub const DIVISION_PRECISION: u32 = 36;

/// Largest decimal shift a literal may ask for, in either direction.
pub const MAX_LITERAL_SHIFT: u32 = 4096;

fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        let mut d = Self { mantissa, scale };
        d.normalize();
        d
    }

    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    pub fn from_int(value: impl Into<BigInt>) -> Self {
        Self::new(value.into(), 0)
    }

    fn normalize(&mut self) {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return;
        }
        let ten = BigInt::from(10u32);
        while self.scale > 0 && (&self.mantissa % &ten).is_zero() {
            self.mantissa /= &ten;
            self.scale -= 1;
        }
    }

    /// Parse `123`, `-1.5`, `+2`, `1e18`, `2.5e-3` or `0x1f`.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let value = BigInt::parse_bytes(hex.as_bytes(), 16)?;
            return Some(Self::from_int(if negative { -value } else { value }));
        }

        let (number, exponent) = match body.find(['e', 'E']) {
            Some(idx) => (&body[..idx], body[idx + 1..].parse::<i64>().ok()?),
            None => (body, 0),
        };
        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{}{}", int_part, frac_part);
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        if negative {
            mantissa = -mantissa;
        }

        let scale = i64::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;
        let shift = u32::try_from(scale.checked_abs()?).ok()?;
        if shift > MAX_LITERAL_SHIFT {
            return None;
        }
        if scale >= 0 {
            Some(Self::new(mantissa, shift))
        } else {
            Some(Self::new(mantissa * pow10(shift), 0))
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    fn aligned(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        let a = &self.mantissa * pow10(scale - self.scale);
        let b = &other.mantissa * pow10(scale - other.scale);
        (a, b, scale)
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a + b, scale)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b, scale) = self.aligned(other);
        Self::new(a - b, scale)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::new(&self.mantissa * &other.mantissa, self.scale + other.scale)
    }

    /// Division truncated to [`DIVISION_PRECISION`] fractional digits.
    /// Returns `None` when dividing by zero.
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let numerator = &self.mantissa * pow10(other.scale + DIVISION_PRECISION);
        let denominator = &other.mantissa * pow10(self.scale);
        Some(Self::new(numerator / denominator, DIVISION_PRECISION))
    }

    pub fn neg(&self) -> Self {
        Self::new(-&self.mantissa, self.scale)
    }

    /// Multiply by `10^exp`.
    pub fn shift_left(&self, exp: u32) -> Self {
        Self::new(&self.mantissa * pow10(exp), self.scale)
    }

    /// Divide by `10^exp` exactly.
    pub fn shift_right(&self, exp: u32) -> Self {
        Self::new(self.mantissa.clone(), self.scale + exp)
    }

    /// Integer part, truncated toward zero.
    pub fn trunc(&self) -> BigInt {
        &self.mantissa / pow10(self.scale)
    }

    /// Round half away from zero to `digits` significant digits.
    pub fn to_significant(&self, digits: u32) -> Self {
        let len = self.mantissa.magnitude().to_string().len() as u32;
        if digits == 0 || len <= digits {
            return self.clone();
        }
        let drop = len - digits;
        let divisor = pow10(drop);
        let (mut q, r) = (&self.mantissa / &divisor, &self.mantissa % &divisor);
        if r.abs() * 2 >= divisor {
            q += if self.is_negative() { -1 } else { 1 };
        }
        let value = Self::new(q * divisor, 0);
        value.shift_right(self.scale)
    }

    pub fn to_f64(&self) -> Option<f64> {
        Some(self.mantissa.to_f64()? / 10f64.powi(i32::try_from(self.scale).ok()?))
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_string();
        if self.mantissa.sign() == Sign::Minus {
            write!(f, "-")?;
        }
        let scale = self.scale as usize;
        if scale == 0 {
            write!(f, "{}", digits)
        } else if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", int, frac)
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

/// A numeric scenario value.
#[derive(Debug, Clone)]
pub struct Number {
    magnitude: Decimal,
    display_scale: Option<u32>,
}

impl Number {
    pub fn new(magnitude: Decimal) -> Self {
        Self {
            magnitude,
            display_scale: None,
        }
    }

    /// A number shown divided by `10^display_scale`, e.g. mantissas of
    /// 18-decimal tokens.
    pub fn scaled(magnitude: Decimal, display_scale: u32) -> Self {
        Self {
            magnitude,
            display_scale: Some(display_scale),
        }
    }

    pub fn from_int(value: impl Into<BigInt>) -> Self {
        Self::new(Decimal::from_int(value))
    }

    pub fn parse(text: &str) -> Option<Self> {
        Decimal::parse(text).map(Self::new)
    }

    pub fn magnitude(&self) -> &Decimal {
        &self.magnitude
    }

    pub fn display_scale(&self) -> Option<u32> {
        self.display_scale
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn show(&self) -> String {
        match self.display_scale {
            Some(scale) => self.magnitude.shift_right(scale).to_string(),
            None => self.magnitude.to_string(),
        }
    }

    /// Integer wire value, truncated toward zero.
    pub fn encode(&self) -> BigInt {
        self.magnitude.trunc()
    }

    pub fn to_u64(&self) -> Option<u64> {
        if !self.magnitude.is_integer() {
            return None;
        }
        self.magnitude.trunc().to_u64()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude == other.magnitude
    }
}

impl From<Decimal> for Number {
    fn from(magnitude: Decimal) -> Self {
        Self::new(magnitude)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.show())
    }
}
