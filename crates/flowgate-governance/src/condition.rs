//! Policy rule conditions

use std::str::FromStr;

use flowgate_core::value::string_form;
use flowgate_core::PolicyEvaluationContext;
use regex::RegexBuilder;
use rust_decimal::Decimal;

/// Parsed form of a rule's condition expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<'a> {
    /// `action:<pattern>`
    Action(&'a str),

    /// `agent:<id>`
    Agent(&'a str),

    /// `param:<key>:<op>:<value>`
    Param {
        key: &'a str,
        op: &'a str,
        value: &'a str,
    },

    /// `always`
    Always,

    /// Anything unrecognized, including a `param:` with too few parts
    Never,
}

fn strip_prefix_ignore_case<'a>(expr: &'a str, prefix: &str) -> Option<&'a str> {
    let head = expr.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &expr[prefix.len()..])
}

/// Plain decimal notation only; exponent forms do not parse
fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

impl<'a> Condition<'a> {
    /// Parse a condition expression
    pub fn parse(expr: &'a str) -> Self {
        if let Some(pattern) = strip_prefix_ignore_case(expr, "action:") {
            return Self::Action(pattern);
        }
        if let Some(agent_id) = strip_prefix_ignore_case(expr, "agent:") {
            return Self::Agent(agent_id);
        }
        if strip_prefix_ignore_case(expr, "param:").is_some() {
            let mut parts = expr.splitn(4, ':').skip(1);
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(op), Some(value)) => Self::Param { key, op, value },
                _ => Self::Never,
            };
        }
        if expr.eq_ignore_ascii_case("always") {
            return Self::Always;
        }
        Self::Never
    }

    /// Evaluate against a context
    ///
    /// Fails only when an `action:` pattern is not a valid regular expression.
    pub fn matches(&self, context: &PolicyEvaluationContext) -> Result<bool, regex::Error> {
        match self {
            Self::Action(pattern) => {
                let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                Ok(re.is_match(&context.action))
            }
            Self::Agent(agent_id) => Ok(context.agent_id.to_lowercase() == agent_id.to_lowercase()),
            Self::Param { key, op, value } => Ok(context
                .parameters
                .get(*key)
                .is_some_and(|actual| compare(&string_form(actual), op, value))),
            Self::Always => Ok(true),
            Self::Never => Ok(false),
        }
    }
}

fn compare(actual: &str, op: &str, expected: &str) -> bool {
    match op.to_lowercase().as_str() {
        "eq" => actual.to_lowercase() == expected.to_lowercase(),
        "neq" => actual.to_lowercase() != expected.to_lowercase(),
        "contains" => actual.to_lowercase().contains(&expected.to_lowercase()),
        "gt" => match (parse_decimal(actual), parse_decimal(expected)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        "lt" => match (parse_decimal(actual), parse_decimal(expected)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        _ => false,
    }
}
