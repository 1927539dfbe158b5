//! Overload-resolving argument parser for command invocations.
//!
//! Takes an invocation, either free-form text (`ban @user -d 1d spamming`)
//! or a bag of already-typed fields, and resolves it against the
//! [`ArgumentSchema`](command_args_core::ArgumentSchema) registered for the
//! command:
//!
//! 1. commands with subcommands are routed first, possibly to the schema of
//!    an isolated subcommand;
//! 2. overloads are tried in declaration order, the first full match wins;
//! 3. each definition tries its candidate [`ArgumentType`]s in order, the
//!    first successful cast wins;
//! 4. options may appear anywhere between positionals in text mode, and
//!    required options are checked once an overload has matched.
//!
//! Argument types are pluggable through [`TypeCatalog`]; a reference set
//! lives in [`builtin`].

pub mod builtin;
mod catalog;
mod context;
mod error;
mod kind;
mod options;
mod outcome;
mod parser;
mod registry;
mod resolver;
mod router;
mod state;

pub use catalog::TypeCatalog;
pub use context::{ParseContext, StructuredOptions, TokenStream, is_flag, slice_from_token};
pub use error::{ArgumentError, EngineError, Result};
pub use kind::{ArgumentType, CastError, CastResult, Casted, StructuredInput, TokenInput};
pub use outcome::{OverloadFailure, ParseFailure, ParseOutcome, ParsedArguments};
pub use parser::ArgumentParser;
pub use registry::{
    CommandDescriptor, CommandHandler, CommandRegistry, NotFoundReason, SubcommandNotFoundHook,
    handler_key,
};
pub use state::ParserState;
