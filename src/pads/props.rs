//! Loose property-bag reading for the validated setters.
//!
//! Updates arrive as JSON objects produced by form-style front ends, so a
//! numeric field may be a JSON number or a numeric string such as `"0.3"` or
//! `"0.3mm"`. Anything that does not yield a finite number is ignored and the
//! previous value is kept. Fields that are absent are never reset.

use serde_json::{Map, Value};

/// Read-only view over a JSON object holding property updates.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBag<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> PropertyBag<'a> {
    /// Wraps a JSON value. Non-object values behave as an empty bag.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    /// Returns `true` if the field is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.is_some_and(|f| f.contains_key(key))
    }

    /// Reads a finite number from a JSON number or a numeric string prefix.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = self.fields?.get(key)?;
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_leading_float(s),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    /// Reads a flag. Present but unrecognised values read as `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        let value = self.fields?.get(key)?;
        Some(match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| (v - 1.0).abs() < f64::EPSILON),
            Value::String(s) => {
                let s = s.trim();
                s == "1" || s.eq_ignore_ascii_case("true")
            }
            _ => false,
        })
    }

    /// Reads a string field.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.fields?.get(key)?.as_str()
    }

    /// Validated numeric field: the new value if present and numeric,
    /// otherwise `current`, clamped to `[min, max]` and rounded to `grid`.
    #[must_use]
    pub fn bounded(&self, key: &str, current: f64, min: f64, max: f64, grid: f64) -> f64 {
        let raw = self.number(key).unwrap_or(current);
        round_to(clamp(raw, min, max), grid)
    }
}

/// Clamps without panicking on inverted bounds (the lower bound wins).
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Rounds a value to the nearest multiple of `step`.
#[must_use]
pub fn round_to(value: f64, step: f64) -> f64 {
    let scale = (1.0 / step).round();
    (value * scale).round() / scale
}

/// Rounds a value up to the next multiple of `step`.
#[must_use]
pub fn round_up_to(value: f64, step: f64) -> f64 {
    let scale = (1.0 / step).round();
    (value * scale).ceil() / scale
}

/// Rounds a value down to the previous multiple of `step`.
#[must_use]
pub fn round_down_to(value: f64, step: f64) -> f64 {
    let scale = (1.0 / step).round();
    // 1e-9 keeps exact multiples such as 1.5 from dropping a step
    (value * scale + 1e-9).floor() / scale
}

/// Parses the longest numeric prefix of `s` (after leading whitespace).
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !s[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    // Optional exponent, only taken if it is complete.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
