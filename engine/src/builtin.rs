//! Reference argument types.
//!
//! These cover plain values only (strings, numbers, switches, durations and
//! the rest of the input). Domain types that resolve entities live with the
//! application and are registered next to these in a
//! [`TypeCatalog`](crate::TypeCatalog).

use std::sync::LazyLock;

use async_trait::async_trait;
use command_args_core::{ArgumentRules, ErrorKind};
use regex::Regex;
use serde_json::Value;

use crate::context::slice_from_token;
use crate::kind::{ArgumentType, CastError, CastResult, Casted, StructuredInput, TokenInput};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:\d+(?:ms|s|m|h|d|w)?)+$").expect("static regex must compile")
});
static DURATION_PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(ms|s|m|h|d|w)?").expect("static regex must compile")
});

fn range_message(name: &str, rules: &ArgumentRules, unit: &str) -> String {
    match (rules.min, rules.max) {
        (Some(min), Some(max)) => format!("`{name}` must be between {min} and {max}{unit}"),
        (Some(min), None) => format!("`{name}` must be at least {min}{unit}"),
        (None, Some(max)) => format!("`{name}` must be at most {max}{unit}"),
        (None, None) => format!("`{name}` is out of range"),
    }
}

fn check_choices(raw: &str, position: usize, rules: Option<&ArgumentRules>) -> Result<(), CastError> {
    match rules {
        Some(rules) if !rules.allows(raw) => Err(CastError::new(
            ErrorKind::InvalidType,
            format!("Invalid choice received at position #{position}"),
        )),
        _ => Ok(()),
    }
}

fn check_range(name: &str, value: f64, rules: Option<&ArgumentRules>, unit: &str) -> Result<(), CastError> {
    match rules {
        Some(rules) if !rules.in_range(value) => Err(CastError::new(
            ErrorKind::InvalidRange,
            range_message(name, rules, unit),
        )),
        _ => Ok(()),
    }
}

fn check_length(name: &str, text: &str, rules: Option<&ArgumentRules>) -> Result<(), CastError> {
    check_range(name, text.chars().count() as f64, rules, " characters long")
}

/// Reads the input field, honouring the `required` flag.
///
/// `Ok(None)` means the field is absent but optional.
fn structured_field<'a>(input: &'a StructuredInput<'_>) -> Result<Option<&'a Value>, CastError> {
    match input.field() {
        Some(value) => Ok(Some(value)),
        None if input.required => Err(CastError::new(
            ErrorKind::Required,
            format!("`{}` is required", input.name),
        )),
        None => Ok(None),
    }
}

fn invalid_type(name: &str, expected: &str) -> CastError {
    CastError::new(ErrorKind::InvalidType, format!("`{name}` must be {expected}"))
}

/// A single token, as typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

#[async_trait]
impl ArgumentType for StringType {
    fn id(&self) -> &str {
        "string"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        check_choices(input.token, input.position, input.rules)?;
        check_length(input.name, input.token, input.rules)?;
        Ok(Casted::value(input.token))
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(value) = structured_field(&input)? else {
            return Ok(Casted::value(Value::Null));
        };
        let text = value
            .as_str()
            .ok_or_else(|| invalid_type(input.name, "text"))?;
        check_choices(text, 0, input.rules)?;
        check_length(input.name, text, input.rules)?;
        Ok(Casted::value(text))
    }
}

/// A signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl IntegerType {
    fn check(name: &str, value: i64, rules: Option<&ArgumentRules>) -> CastResult {
        check_range(name, value as f64, rules, "")?;
        Ok(Casted::value(value))
    }
}

#[async_trait]
impl ArgumentType for IntegerType {
    fn id(&self) -> &str {
        "integer"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        let value = input
            .token
            .parse::<i64>()
            .map_err(|_| invalid_type(input.name, "an integer"))?;
        Self::check(input.name, value, input.rules)
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(field) = structured_field(&input)? else {
            return Ok(Casted::value(Value::Null));
        };
        let value = match field {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| invalid_type(input.name, "an integer"))?;
        Self::check(input.name, value, input.rules)
    }
}

/// A finite floating-point number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberType;

impl NumberType {
    fn check(name: &str, value: f64, rules: Option<&ArgumentRules>) -> CastResult {
        if !value.is_finite() {
            return Err(invalid_type(name, "a number"));
        }
        check_range(name, value, rules, "")?;
        Ok(Casted::value(value))
    }
}

#[async_trait]
impl ArgumentType for NumberType {
    fn id(&self) -> &str {
        "number"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        let value = input
            .token
            .parse::<f64>()
            .map_err(|_| invalid_type(input.name, "a number"))?;
        Self::check(input.name, value, input.rules)
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(field) = structured_field(&input)? else {
            return Ok(Casted::value(Value::Null));
        };
        let value = match field {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| invalid_type(input.name, "a number"))?;
        Self::check(input.name, value, input.rules)
    }
}

/// `true`/`false`, also spelled `yes`/`no`, `on`/`off` or `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

#[async_trait]
impl ArgumentType for BooleanType {
    fn id(&self) -> &str {
        "boolean"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        match input.token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Casted::value(true)),
            "false" | "no" | "off" | "0" => Ok(Casted::value(false)),
            _ => Err(invalid_type(input.name, "true or false")),
        }
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(field) = structured_field(&input)? else {
            return Ok(Casted::value(Value::Null));
        };
        field
            .as_bool()
            .map(Casted::value)
            .ok_or_else(|| invalid_type(input.name, "true or false"))
    }
}

/// A duration such as `90`, `30m` or `1d12h`, cast to milliseconds.
///
/// A bare number is read as seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationType;

impl DurationType {
    /// Parses a duration expression into milliseconds.
    ///
    /// Returns `None` for malformed input or on overflow.
    pub fn parse_millis(text: &str) -> Option<u64> {
        if !DURATION_RE.is_match(text) {
            return None;
        }

        DURATION_PART_RE
            .captures_iter(text)
            .try_fold(0u64, |total, caps| {
                let amount: u64 = caps[1].parse().ok()?;
                let unit = caps
                    .get(2)
                    .map(|m| m.as_str().to_ascii_lowercase())
                    .unwrap_or_default();
                let factor = match unit.as_str() {
                    "ms" => 1,
                    "" | "s" => 1_000,
                    "m" => 60_000,
                    "h" => 3_600_000,
                    "d" => 86_400_000,
                    "w" => 604_800_000,
                    _ => return None,
                };
                total.checked_add(amount.checked_mul(factor)?)
            })
    }

    fn cast(name: &str, text: &str, rules: Option<&ArgumentRules>) -> CastResult {
        let millis = Self::parse_millis(text).ok_or_else(|| invalid_type(name, "a duration"))?;
        check_range(name, millis as f64, rules, "ms")?;
        Ok(Casted::value(millis))
    }
}

#[async_trait]
impl ArgumentType for DurationType {
    fn id(&self) -> &str {
        "duration"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        Self::cast(input.name, input.token, input.rules)
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(field) = structured_field(&input)? else {
            return Ok(Casted::value(Value::Null));
        };
        match field {
            Value::String(text) => Self::cast(input.name, text, input.rules),
            Value::Number(n) => {
                let seconds = n
                    .as_u64()
                    .ok_or_else(|| invalid_type(input.name, "a duration"))?;
                Self::cast(input.name, &seconds.to_string(), input.rules)
            }
            _ => Err(invalid_type(input.name, "a duration")),
        }
    }
}

/// Everything from the cursor to the end of the input.
///
/// Asks the resolver to stop evaluating further definitions, since nothing
/// is left for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestType;

#[async_trait]
impl ArgumentType for RestType {
    fn id(&self) -> &str {
        "rest"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        let text = slice_from_token(input.content, input.position).unwrap_or(input.token);
        check_length(input.name, text, input.rules)?;
        Ok(Casted::consuming_rest(text))
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        let Some(field) = structured_field(&input)? else {
            return Ok(Casted::consuming_rest(Value::Null));
        };
        let text = field
            .as_str()
            .ok_or_else(|| invalid_type(input.name, "text"))?;
        check_length(input.name, text, input.rules)?;
        Ok(Casted::consuming_rest(text))
    }
}
