//! Option parsing for text invocations.
//!
//! Handles `--name`, `--name=value`, `--name value` and fused short
//! clusters such as `-dr value`. Each call consumes the option token under
//! the cursor (plus its value token, if any).

use command_args_core::{ArgumentSchema, ErrorKind, OptionSpec};
use serde_json::Value;
use tracing::trace;

use crate::context::{ParseContext, TokenStream};
use crate::outcome::StepError;
use crate::state::ParserState;

/// Parses the option token under the cursor.
///
/// Duplicates are reported as silent errors; callers swallow them and keep
/// going. Any other error is fatal for the current attempt.
pub(crate) fn parse_option(
    context: &ParseContext,
    schema: &ArgumentSchema,
    state: &mut ParserState,
) -> Result<(), StepError> {
    let stream = match context {
        ParseContext::TokenStream(stream) if schema.has_options() => stream,
        _ => {
            return Err(StepError::new(
                ErrorKind::OptionsNotAllowed,
                "Options are not allowed",
            ));
        }
    };

    let Some(token) = stream.token(state.arg_index) else {
        return Ok(());
    };

    if let Some(long) = token.strip_prefix("--") {
        parse_long(stream, schema, state, long)
    } else if let Some(cluster) = token.strip_prefix('-') {
        parse_short(stream, schema, state, cluster)
    } else {
        Ok(())
    }
}

/// Consumes every option token at the cursor.
///
/// Stops at the first token that does not look like a flag. Schemas without
/// options leave dash-prefixed tokens for positional definitions.
pub(crate) fn consume_options(
    context: &ParseContext,
    schema: &ArgumentSchema,
    state: &mut ParserState,
) -> Result<(), StepError> {
    let Some(stream) = context.tokens() else {
        return Ok(());
    };

    while schema.has_options() && stream.looks_like_flag(state.arg_index) {
        match parse_option(context, schema, state) {
            Err(err) if err.silent => trace!(message = %err.message, "ignoring duplicate option"),
            other => other?,
        }
    }

    Ok(())
}

fn parse_long(
    stream: &TokenStream,
    schema: &ArgumentSchema,
    state: &mut ParserState,
    body: &str,
) -> Result<(), StepError> {
    let (name, inline) = match body.split_once('=') {
        Some((name, value)) if !value.is_empty() => (name, Some(value)),
        _ => (body, None),
    };

    let Some(spec) = schema.find_long_option(name) else {
        return Err(StepError::new(
            ErrorKind::UnknownOption,
            format!("Unknown option `--{name}`"),
        ));
    };

    if state.has_option(&spec.id) {
        state.arg_index += 1;
        // The value slot is skipped even when the value was inline.
        if spec.requires_value {
            state.arg_index += 1;
        }
        return Err(StepError::silent(format!(
            "Option `--{name}` was already provided"
        )));
    }

    if !spec.requires_value {
        state.set_option(&spec.id, Value::Bool(true));
        state.arg_index += 1;
        return Ok(());
    }

    let value = match inline {
        Some(value) => value.to_string(),
        None => {
            let next = state.arg_index + 1;
            match stream.token(next) {
                Some(value) if !stream.looks_like_flag(next) => {
                    state.arg_index += 1;
                    value.to_string()
                }
                _ => return Err(requires_value(spec, &format!("--{name}"))),
            }
        }
    };

    trace!(option = %spec.id, %value, "parsed long option");
    state.set_option(&spec.id, Value::String(value));
    state.arg_index += 1;
    Ok(())
}

fn parse_short(
    stream: &TokenStream,
    schema: &ArgumentSchema,
    state: &mut ParserState,
    cluster: &str,
) -> Result<(), StepError> {
    let chars: Vec<char> = cluster.chars().collect();
    let mut increment = 1;

    for (i, &c) in chars.iter().enumerate() {
        let Some(spec) = schema.find_short_option(c) else {
            return Err(StepError::new(
                ErrorKind::UnknownOption,
                format!("Unknown option `-{c}`"),
            ));
        };

        if state.has_option(&spec.id) {
            increment += 1;
            if spec.requires_value {
                increment += 1;
            }
            continue;
        }

        if !spec.requires_value {
            state.set_option(&spec.id, Value::Bool(true));
            continue;
        }

        let next = state.arg_index + 1;
        let value = match stream.token(next) {
            Some(value) if i + 1 == chars.len() && !stream.looks_like_flag(next) => value,
            _ => return Err(requires_value(spec, &format!("-{c}"))),
        };

        trace!(option = %spec.id, %value, "parsed short option");
        state.set_option(&spec.id, Value::String(value.to_string()));
        increment += 1;
    }

    state.arg_index += increment;
    Ok(())
}

fn requires_value(spec: &OptionSpec, typed: &str) -> StepError {
    let message = spec
        .error_message(ErrorKind::OptionRequiresValue)
        .map(String::from)
        .unwrap_or_else(|| format!("Option `{typed}` requires a value"));
    StepError::new(ErrorKind::OptionRequiresValue, message)
}
