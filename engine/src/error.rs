//! Error types for registry construction and strict parsing.

use std::collections::BTreeMap;

use command_args_core::{ErrorKind, ValidationError};
use thiserror::Error;

use crate::outcome::{OverloadFailure, ParseFailure};

/// Errors raised while registering commands or building a parser.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A command name was registered twice.
    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    /// A lookup or registration referenced an unregistered command.
    #[error("command not registered: {0}")]
    UnknownCommand(String),

    /// A subcommand handler was registered for an undeclared subcommand.
    #[error("`{command}` does not declare subcommand `{subcommand}`")]
    UnknownSubcommand { command: String, subcommand: String },

    /// A schema refers to an argument type missing from the catalog.
    #[error("`{handler}` references unknown argument type `{type_id}`")]
    UnknownType { handler: String, type_id: String },

    /// A schema failed structural validation.
    #[error("invalid schema for `{handler}`: {}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidSchema {
        handler: String,
        errors: Vec<ValidationError>,
    },
}

/// Convenience alias for results with [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// A parse failure raised by [`ArgumentParser::parse_strict`](crate::ArgumentParser::parse_strict).
///
/// Carries the forwarded [`ErrorKind`] so callers can pick a response
/// without matching on the message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ArgumentError {
    /// Human-readable message.
    pub message: String,
    /// Failure classification, when known.
    pub kind: Option<ErrorKind>,
    /// Per-overload diagnostics.
    pub overloads: BTreeMap<String, OverloadFailure>,
}

impl From<ParseFailure> for ArgumentError {
    fn from(failure: ParseFailure) -> Self {
        Self {
            message: failure.message,
            kind: failure.kind,
            overloads: failure.overloads,
        }
    }
}
