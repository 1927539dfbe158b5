//! Overload and definition resolution.
//!
//! Overloads are tried in declaration order and the first full success
//! wins. Inside an overload, each definition tries its candidate types in
//! order and the first successful cast wins. Options interleave with
//! positionals in text mode and stay parsed across overload attempts.

use std::collections::BTreeMap;

use command_args_core::{ArgumentDefinition, ArgumentSchema, ErrorKind, Overload};
use serde_json::Value;
use tracing::{debug, trace};

use crate::catalog::TypeCatalog;
use crate::context::{ParseContext, StructuredOptions, TokenStream};
use crate::kind::{CastError, StructuredInput, TokenInput};
use crate::options::consume_options;
use crate::outcome::{OverloadFailure, ParseFailure, StepError};
use crate::state::ParserState;

const NO_OVERLOAD_MATCHED: &str = "The arguments did not satisfy any of the available overloads";
const NO_TYPE_MATCHED: &str = "The arguments did not satisfy any of the available types";

/// Resolves `schema` against `context`, starting from `seed`.
///
/// On success the returned state holds the winning overload's positional
/// values and every parsed option. Required options are checked once,
/// after an overload has been selected.
pub(crate) async fn resolve(
    context: &ParseContext,
    schema: &ArgumentSchema,
    catalog: &TypeCatalog,
    seed: &ParserState,
) -> Result<ParserState, ParseFailure> {
    let mut options = seed.parsed_options.clone();
    let mut failures = BTreeMap::new();
    let mut last_error = None;
    let mut unnamed = 0usize;

    for overload in &schema.overloads {
        let key = match &overload.name {
            Some(name) => name.clone(),
            None => {
                let key = unnamed.to_string();
                unnamed += 1;
                key
            }
        };

        let mut state = ParserState::attempt(seed, std::mem::take(&mut options));
        trace!(overload = %key, cursor = state.arg_index, "trying overload");

        match parse_overload(context, schema, overload, catalog, &mut state).await {
            Ok(()) => {
                debug!(overload = %key, "overload matched");
                check_required_options(schema, &state)?;
                return Ok(state);
            }
            Err(err) => {
                debug!(overload = %key, error = %err.message, "overload rejected");
                options = std::mem::take(&mut state.parsed_options);
                failures.insert(
                    key,
                    OverloadFailure {
                        kind: err.kind,
                        message: err.message.clone(),
                    },
                );
                last_error = Some(err);
            }
        }
    }

    let mut failure = match last_error {
        Some(err) if schema.overloads.len() == 1 => ParseFailure::from(err),
        _ => ParseFailure::new(Some(ErrorKind::NoOverloadMatched), NO_OVERLOAD_MATCHED),
    };
    failure.overloads = failures;
    Err(failure)
}

async fn parse_overload(
    context: &ParseContext,
    schema: &ArgumentSchema,
    overload: &Overload,
    catalog: &TypeCatalog,
    state: &mut ParserState,
) -> Result<(), StepError> {
    for definition in &overload.definitions {
        consume_options(context, schema, state)?;

        let abort = match context {
            ParseContext::TokenStream(stream) => {
                parse_from_tokens(context, stream, definition, catalog, state).await?
            }
            ParseContext::Structured(options) => {
                parse_from_structured(context, options, definition, catalog, state).await?
            }
        };

        if abort {
            trace!(definition = definition.canonical_name(), "definition consumed the rest of the input");
            return Ok(());
        }
        state.advance();
    }

    consume_options(context, schema, state)
}

async fn parse_from_tokens(
    context: &ParseContext,
    stream: &TokenStream,
    definition: &ArgumentDefinition,
    catalog: &TypeCatalog,
    state: &mut ParserState,
) -> Result<bool, StepError> {
    let position = state.arg_index;
    let Some(token) = stream.token(position) else {
        if definition.optional {
            state.insert_arg(definition.canonical_name(), Value::Null);
            return Ok(false);
        }
        let message = definition
            .error_message(0, ErrorKind::Required)
            .map(String::from)
            .unwrap_or_else(|| {
                format!(
                    "Argument at index #{position} ({}) is required but was not provided",
                    definition.display_names()
                )
            });
        return Err(StepError::new(ErrorKind::Required, message));
    };

    let mut last = None;
    for (index, type_id) in definition.types.iter().enumerate() {
        let Some(kind) = catalog.get(type_id) else {
            last = Some((index, unknown_type(type_id)));
            continue;
        };

        let name = definition.name_for(index);
        let input = TokenInput {
            context,
            content: stream.command_content(),
            tokens: stream.args(),
            token,
            position,
            name,
            rules: definition.rules_at(index),
            required: !definition.optional,
        };

        match kind.cast_from_tokens(input).await {
            Ok(casted) => {
                trace!(%name, %type_id, "cast succeeded");
                state.insert_arg(name, casted.value);
                return Ok(casted.abort);
            }
            Err(err) => {
                trace!(%name, %type_id, error = %err.message, "cast failed");
                last = Some((index, err));
            }
        }
    }

    Err(candidates_failed(definition, last))
}

async fn parse_from_structured(
    context: &ParseContext,
    options: &StructuredOptions,
    definition: &ArgumentDefinition,
    catalog: &TypeCatalog,
    state: &mut ParserState,
) -> Result<bool, StepError> {
    let field = definition
        .interaction_name
        .as_deref()
        .unwrap_or_else(|| definition.canonical_name());
    let skip_presence_check = definition
        .rules_at(definition.interaction_rule_index.unwrap_or(0))
        .is_some_and(|rules| rules.no_required_check);

    if !skip_presence_check && !options.has_field(field) {
        if definition.optional {
            state.insert_arg(definition.canonical_name(), Value::Null);
            return Ok(false);
        }
        let message = definition
            .error_message(definition.interaction_rule_index.unwrap_or(0), ErrorKind::Required)
            .map(String::from)
            .unwrap_or_else(|| {
                format!(
                    "Argument at index #{} ({field}) is required but was not provided (via interaction)",
                    state.arg_index
                )
            });
        return Err(StepError::new(ErrorKind::Required, message));
    }

    let candidates: Vec<(usize, &str)> = match &definition.interaction_type {
        Some(type_id) => {
            let index = definition
                .types
                .iter()
                .position(|t| t == type_id)
                // Only reachable when `types` is empty; validation rejects unlisted types.
                .unwrap_or(0);
            vec![(index, type_id.as_str())]
        }
        None => definition
            .types
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.as_str()))
            .collect(),
    };

    let mut last = None;
    for (index, type_id) in candidates {
        let table = definition.interaction_rule_index.unwrap_or(index);
        let Some(kind) = catalog.get(type_id) else {
            last = Some((table, unknown_type(type_id)));
            continue;
        };

        let input = StructuredInput {
            context,
            options,
            name: field,
            rules: definition.rules_at(table),
            required: !definition.optional,
        };

        match kind.cast_from_structured(input).await {
            Ok(casted) => {
                let name = definition.name_for(index);
                trace!(%name, %type_id, "structured cast succeeded");
                state.insert_arg(name, casted.value);
                return Ok(casted.abort);
            }
            Err(err) => {
                trace!(%field, %type_id, error = %err.message, "structured cast failed");
                last = Some((table, err));
            }
        }
    }

    Err(candidates_failed(definition, last))
}

fn unknown_type(type_id: &str) -> CastError {
    CastError::new(
        ErrorKind::InvalidType,
        format!("Unknown argument type `{type_id}`"),
    )
}

/// Builds the error for a definition none of whose candidates succeeded.
///
/// The last candidate's error is surfaced, through the override table at
/// that candidate's position.
fn candidates_failed(definition: &ArgumentDefinition, last: Option<(usize, CastError)>) -> StepError {
    match last {
        Some((table, err)) => {
            let message = definition
                .error_message(table, err.kind)
                .map(String::from)
                .unwrap_or(err.message);
            StepError::new(err.kind, message)
        }
        None => StepError::untyped(NO_TYPE_MATCHED),
    }
}

fn check_required_options(schema: &ArgumentSchema, state: &ParserState) -> Result<(), ParseFailure> {
    for option in schema.options.iter().filter(|o| o.required) {
        if state.has_option(&option.id) {
            continue;
        }
        let message = option
            .error_message(ErrorKind::Required)
            .map(String::from)
            .unwrap_or_else(|| {
                format!(
                    "Option `{}{}` is required",
                    option.name_style().prefix(),
                    option.display_name()
                )
            });
        debug!(option = %option.id, "required option missing");
        return Err(ParseFailure::new(Some(ErrorKind::Required), message));
    }
    Ok(())
}
