//! Resource quantity canonicalization.
//!
//! Kubernetes reports CPU and memory as quantity strings such as `500m`,
//! `2`, `4Gi` or `1e3`. The dashboard wants a single unit per resource:
//! milli-units for CPU and raw bytes for memory. Fractional results are
//! rounded away from zero, the same way the API server reports
//! `MilliValue()` and `Value()`.

use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

/// Errors produced while parsing a quantity string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid quantity number: {0}")]
    InvalidNumber(String),

    #[error("unknown quantity suffix in {0}")]
    UnknownSuffix(String),

    #[error("quantity out of range: {0}")]
    Overflow(String),
}

/// A parsed quantity: `sign * mantissa * 2^exp2 * 10^exp10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuantity {
    negative: bool,
    mantissa: u128,
    exp2: u32,
    exp10: i32,
}

// u128 holds up to 38 full decimal digits.
const MAX_DIGITS: usize = 38;

impl FromStr for ParsedQuantity {
    type Err = QuantityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, unsigned) = match raw.as_bytes()[0] {
            b'-' => (true, &raw[1..]),
            b'+' => (false, &raw[1..]),
            _ => (false, raw),
        };

        let number_len = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (number, ""),
        };
        if frac_part.contains('.') || (int_part.is_empty() && frac_part.is_empty()) {
            return Err(QuantityError::InvalidNumber(raw.to_string()));
        }

        let digits = format!("{int_part}{frac_part}");
        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_DIGITS {
            return Err(QuantityError::Overflow(raw.to_string()));
        }
        let mantissa = if significant.is_empty() {
            0
        } else {
            significant
                .parse::<u128>()
                .map_err(|_| QuantityError::InvalidNumber(raw.to_string()))?
        };

        let frac_digits = i32::try_from(frac_part.len())
            .map_err(|_| QuantityError::Overflow(raw.to_string()))?;
        let (exp2, suffix_exp10) = parse_suffix(suffix, raw)?;
        let exp10 = suffix_exp10
            .checked_sub(frac_digits)
            .ok_or_else(|| QuantityError::Overflow(raw.to_string()))?;

        Ok(Self {
            negative: negative && mantissa != 0,
            mantissa,
            exp2,
            exp10,
        })
    }
}

/// Map a suffix to its binary and decimal exponents.
fn parse_suffix(suffix: &str, raw: &str) -> Result<(u32, i32), QuantityError> {
    let exponents = match suffix {
        "" => (0, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        s if s.starts_with(['e', 'E']) => {
            let exponent = s[1..]
                .parse::<i32>()
                .map_err(|_| QuantityError::UnknownSuffix(raw.to_string()))?;
            (0, exponent)
        }
        _ => return Err(QuantityError::UnknownSuffix(raw.to_string())),
    };
    Ok(exponents)
}

impl ParsedQuantity {
    /// Value expressed in units of `10^-scale`, rounded away from zero.
    fn scaled(&self, scale: i32) -> Option<i64> {
        let value = self.mantissa.checked_mul(1u128.checked_shl(self.exp2)?)?;
        let exponent = self.exp10.checked_add(scale)?;

        let magnitude = if exponent >= 0 {
            value.checked_mul(10u128.checked_pow(exponent.unsigned_abs())?)?
        } else {
            match 10u128.checked_pow(exponent.unsigned_abs()) {
                Some(divisor) => value.div_ceil(divisor),
                // The divisor exceeds any u128, so only a zero stays zero.
                None => u128::from(value != 0),
            }
        };

        let magnitude = i128::try_from(magnitude).ok()?;
        let signed = if self.negative { -magnitude } else { magnitude };
        i64::try_from(signed).ok()
    }

    /// Value in milli-units (1 CPU = 1000).
    pub fn milli_value(&self) -> Option<i64> {
        self.scaled(3)
    }

    /// Value in base units (bytes for memory).
    pub fn value(&self) -> Option<i64> {
        self.scaled(0)
    }
}

fn canonicalize(
    quantity: Option<&Quantity>,
    pick: fn(&ParsedQuantity) -> Option<i64>,
) -> Result<String, QuantityError> {
    let Some(Quantity(raw)) = quantity else {
        return Ok(String::new());
    };
    let parsed: ParsedQuantity = raw.parse()?;
    pick(&parsed)
        .map(|v| v.to_string())
        .ok_or_else(|| QuantityError::Overflow(raw.clone()))
}

/// Canonical CPU string in milli-units. An absent quantity yields `""`.
///
/// The output is a bare milli count (`"500m"` becomes `"500"`), so it is only
/// stable when read back as a milli quantity, i.e. with an `m` suffix.
/// Feeding `"500"` back in as-is means 500 cores.
pub fn cpu_millis(quantity: Option<&Quantity>) -> Result<String, QuantityError> {
    canonicalize(quantity, ParsedQuantity::milli_value)
}

/// Canonical memory string in bytes. An absent quantity yields `""`.
///
/// The output is itself a valid quantity and canonicalizes to itself.
pub fn memory_bytes(quantity: Option<&Quantity>) -> Result<String, QuantityError> {
    canonicalize(quantity, ParsedQuantity::value)
}
