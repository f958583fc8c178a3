//! Tolerant numeric input.
//!
//! Catalog documents are filled in by hand, so prices, quantities and
//! amounts arrive as JSON numbers, as text, or as garbage. Everything here
//! degrades instead of failing: amounts fall back to zero, optional values
//! (margin, volume) fall back to `None` so their defaults apply.

use std::iter::Peekable;
use std::str::{Chars, FromStr};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a decimal out of an arbitrary JSON value.
///
/// Numbers pass through, text is read from its leading numeric prefix
/// (`"12.5 pares"` reads as `12.5`), everything else is `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Some(Decimal::from(int));
            }
            if let Some(uint) = number.as_u64() {
                return Some(Decimal::from(uint));
            }
            number
                .as_f64()
                .and_then(|float| Decimal::from_str(&format!("{float}")).ok())
        }
        Value::String(text) => parse_decimal_prefix(text),
        _ => None,
    }
}

/// Integer view of [`decimal_from_value`], truncating toward zero.
pub fn integer_from_value(value: &Value) -> Option<i64> {
    decimal_from_value(value).and_then(|decimal| decimal.trunc().to_i64())
}

/// Parses the leading numeric prefix of `text`, exponent included
/// (`"2.5e2"` reads as `250`). An exponent without digits is ignored.
pub fn parse_decimal_prefix(text: &str) -> Option<Decimal> {
    let trimmed = text.trim_start();
    let mut chars = trimmed.chars().peekable();
    let mut literal = String::with_capacity(trimmed.len() + 1);

    if let Some(sign @ ('-' | '+')) = chars.peek().copied() {
        if sign == '-' {
            literal.push('-');
        }
        chars.next();
    }

    let mut digits = 0usize;
    let mut seen_point = false;
    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' => {
                if digits == 0 && seen_point {
                    // ".5" has no integer part
                    let point = literal.pop();
                    literal.push('0');
                    literal.extend(point);
                }
                literal.push(ch);
                digits += 1;
            }
            '.' if !seen_point => {
                seen_point = true;
                literal.push('.');
            }
            _ => break,
        }
        chars.next();
    }

    if digits == 0 {
        return None;
    }
    if literal.ends_with('.') {
        literal.pop();
    }

    let mantissa = Decimal::from_str(&literal).ok()?;
    match parse_exponent(&mut chars) {
        Some(exponent) => scale_by_power_of_ten(mantissa, exponent),
        None => Some(mantissa),
    }
}

fn parse_exponent(chars: &mut Peekable<Chars<'_>>) -> Option<i64> {
    if !matches!(chars.next(), Some('e' | 'E')) {
        return None;
    }
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut exponent: Option<i64> = None;
    while let Some(digit) = chars.peek().and_then(|ch| ch.to_digit(10)) {
        let value = exponent.unwrap_or(0);
        exponent = Some(value.saturating_mul(10).saturating_add(i64::from(digit)));
        chars.next();
    }
    exponent.map(|value| if negative { -value } else { value })
}

/// Overflow is `None`; underflow rounds to zero.
fn scale_by_power_of_ten(value: Decimal, exponent: i64) -> Option<Decimal> {
    if value.is_zero() {
        return Some(value);
    }
    let ten = Decimal::from(10);
    // past 64 steps any non-zero value has overflowed or reached zero
    let steps = exponent.unsigned_abs().min(64);
    if exponent >= 0 {
        (0..steps).try_fold(value, |acc, _| acc.checked_mul(ten))
    } else {
        (0..steps).try_fold(value, |acc, _| acc.checked_div(ten))
    }
}

/// Serde adapter: unparseable or missing amounts become zero.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value).unwrap_or(Decimal::ZERO))
}

/// Serde adapter: unparseable values become `None`.
pub fn lenient_optional<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_from_value(&value))
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_integer(deserializer).map(|count| count.unwrap_or(0))
}
