//! Results produced by a parse, and the step errors that build them.

use std::collections::BTreeMap;

use command_args_core::ErrorKind;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ArgumentError;
use crate::state::ParserState;

/// Values extracted from a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArguments {
    /// Positional values by definition name.
    pub args: Map<String, Value>,
    /// Option values by option id.
    pub options: Map<String, Value>,
    /// The subcommand the invocation was routed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<String>,
}

impl ParsedArguments {
    pub(crate) fn from_state(state: ParserState, subcommand: Option<String>) -> Self {
        Self {
            args: state.parsed_args,
            options: state.parsed_options,
            subcommand,
        }
    }

    /// Returns the positional value stored under `name`.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Returns the value of option `id`.
    pub fn option(&self, id: &str) -> Option<&Value> {
        self.options.get(id)
    }
}

/// Why one overload was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
}

/// A failed parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseFailure {
    /// Message suitable for showing to the invoker.
    pub message: String,
    /// Failure classification, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Per-overload diagnostics, keyed by overload name or unnamed index.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overloads: BTreeMap<String, OverloadFailure>,
}

impl ParseFailure {
    pub(crate) fn new(kind: Option<ErrorKind>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            overloads: BTreeMap::new(),
        }
    }
}

impl From<StepError> for ParseFailure {
    fn from(error: StepError) -> Self {
        Self::new(error.kind, error.message)
    }
}

/// Terminal state of a parse.
///
/// # Examples
///
/// ```
/// use command_args_engine::{ParseOutcome, ParsedArguments};
///
/// let outcome = ParseOutcome::Parsed(ParsedArguments::default());
/// assert!(outcome.is_parsed());
/// assert_eq!(outcome.into_result().unwrap(), Some(ParsedArguments::default()));
///
/// assert_eq!(ParseOutcome::Aborted.into_result().unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// Input matched an overload.
    Parsed(ParsedArguments),
    /// Input was rejected.
    Failed(ParseFailure),
    /// A collaborator already answered the invoker; nothing more to do.
    Aborted,
}

impl ParseOutcome {
    /// Returns `true` on success.
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Returns `true` if the parse was aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns the parsed values on success.
    pub fn parsed(&self) -> Option<&ParsedArguments> {
        match self {
            Self::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Converts a failure into an [`ArgumentError`]; `Ok(None)` means aborted.
    pub fn into_result(self) -> Result<Option<ParsedArguments>, ArgumentError> {
        match self {
            Self::Parsed(parsed) => Ok(Some(parsed)),
            Self::Failed(failure) => Err(failure.into()),
            Self::Aborted => Ok(None),
        }
    }
}

/// Failure of a single parsing step.
///
/// `silent` errors (duplicate options) are swallowed by the caller and
/// parsing continues.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StepError {
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub silent: bool,
}

impl StepError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(kind),
            silent: false,
        }
    }

    pub fn untyped(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            silent: false,
        }
    }

    pub fn silent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            silent: true,
        }
    }
}

/// Why a parse stopped before producing values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Interrupt {
    Failed(ParseFailure),
    Abort,
}

impl From<ParseFailure> for Interrupt {
    fn from(failure: ParseFailure) -> Self {
        Self::Failed(failure)
    }
}

impl From<StepError> for Interrupt {
    fn from(error: StepError) -> Self {
        Self::Failed(error.into())
    }
}
