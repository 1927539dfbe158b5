//! The casting capability implemented by every argument type.
//!
//! The engine never inspects concrete argument types; it only decides which
//! types get a chance to run and in what order, then calls through
//! [`ArgumentType`].

use async_trait::async_trait;
use command_args_core::{ArgumentRules, ErrorKind};
use serde_json::Value;
use thiserror::Error;

use crate::context::{ParseContext, StructuredOptions};

/// Input for casting a token from a text invocation.
#[derive(Debug, Clone, Copy)]
pub struct TokenInput<'a> {
    pub context: &'a ParseContext,
    /// Text after the command name, spacing intact.
    pub content: &'a str,
    /// Argument tokens (after the command name).
    pub tokens: &'a [String],
    /// Token under the cursor.
    pub token: &'a str,
    /// Cursor position of `token` within `tokens`.
    pub position: usize,
    /// Name the value will be stored under.
    pub name: &'a str,
    pub rules: Option<&'a ArgumentRules>,
    pub required: bool,
}

/// Input for casting a field from a structured invocation.
#[derive(Debug, Clone, Copy)]
pub struct StructuredInput<'a> {
    pub context: &'a ParseContext,
    pub options: &'a StructuredOptions,
    /// Field to read.
    pub name: &'a str,
    pub rules: Option<&'a ArgumentRules>,
    pub required: bool,
}

impl StructuredInput<'_> {
    /// Returns the field this input points at, if present.
    pub fn field(&self) -> Option<&Value> {
        self.options.field(self.name)
    }
}

/// A successfully cast value.
#[derive(Debug, Clone, PartialEq)]
pub struct Casted {
    pub value: Value,
    /// Stop evaluating further definitions of the current overload.
    pub abort: bool,
}

impl Casted {
    /// Wraps a value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            abort: false,
        }
    }

    /// Wraps a value that consumed the rest of the input.
    pub fn consuming_rest(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            abort: true,
        }
    }
}

/// A rejected cast.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CastError {
    pub message: String,
    pub kind: ErrorKind,
}

impl CastError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

/// Result of one cast attempt.
pub type CastResult = Result<Casted, CastError>;

/// A pluggable argument type.
///
/// Implementations convert raw input into a domain value. They may resolve
/// external state (this is the only suspension point of a parse); each
/// attempt is awaited to completion before the next candidate runs.
#[async_trait]
pub trait ArgumentType: Send + Sync {
    /// Identifier referenced from schemas (`"integer"`, `"user"`, ...).
    fn id(&self) -> &str;

    /// Casts the token under the cursor of a text invocation.
    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult;

    /// Casts a field of a structured invocation.
    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult;
}
