//! Untyped key-value payloads
//!
//! Shared workflow state, agent inputs and outputs, event payloads and policy
//! parameters are all maps of JSON values. The helpers here give those values
//! a well-defined truthiness, a string form for policy comparisons and typed
//! accessors with defaults.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Key-value payload carried between steps
pub type StateMap = HashMap<String, Value>;

/// Truthiness of a present value
///
/// `false`, `null` and the empty string are falsy; every other value is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// String form of a value as seen by policy comparisons
///
/// Strings are returned verbatim (unquoted), `null` becomes the empty string,
/// everything else is compact JSON.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a value as a finite number
///
/// Numbers are taken directly and strings are parsed after trimming.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse a value as an exact decimal
///
/// Numbers are read from their JSON text, so `0.1` stays `0.1`. Strings are
/// parsed after trimming and must be plain decimal notation.
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Typed accessors over a [`StateMap`]
pub trait StateMapExt {
    /// Truthiness of `key`; a missing key is false
    fn is_truthy(&self, key: &str) -> bool;

    /// Integer value of `key`, or `default` when missing or not numeric
    fn get_i64(&self, key: &str, default: i64) -> i64;

    /// Floating value of `key`, or `default` when missing or not numeric
    fn get_f64(&self, key: &str, default: f64) -> f64;

    /// String value of `key`, or `default` when missing or not a string
    fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str;

    /// Insert every entry of `other`, overwriting existing keys
    fn merge_from(&mut self, other: &StateMap);
}

impl StateMapExt for StateMap {
    fn is_truthy(&self, key: &str) -> bool {
        self.get(key).map(is_truthy).unwrap_or(false)
    }

    fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(as_number).unwrap_or(default)
    }

    fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(Value::String(s)) => s.as_str(),
            _ => default,
        }
    }

    fn merge_from(&mut self, other: &StateMap) {
        for (key, value) in other {
            self.insert(key.clone(), value.clone());
        }
    }
}
