//! Parser entry point.

use tracing::{debug, warn};

use crate::catalog::TypeCatalog;
use crate::context::ParseContext;
use crate::error::{ArgumentError, EngineError, Result};
use crate::outcome::{Interrupt, ParseFailure, ParseOutcome, ParsedArguments};
use crate::registry::CommandRegistry;
use crate::resolver::resolve;
use crate::router::route;
use crate::state::ParserState;

/// Resolves invocations against registered command schemas.
///
/// Holds no per-parse state; one parser may serve any number of concurrent
/// parses.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentDefinition, ArgumentSchema, Overload};
/// use command_args_engine::{
///     ArgumentParser, CommandDescriptor, CommandRegistry, ParseContext, TypeCatalog,
/// };
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut registry = CommandRegistry::new();
/// registry
///     .register_command(
///         CommandDescriptor::new("purge"),
///         ArgumentSchema::new().with_overload(Overload::new(vec![
///             ArgumentDefinition::required("count", "integer"),
///         ])),
///     )
///     .unwrap();
///
/// let parser = ArgumentParser::new(registry, TypeCatalog::with_builtins()).unwrap();
/// let parsed = parser
///     .parse_strict(&ParseContext::text("purge 50"), "purge")
///     .await
///     .unwrap()
///     .unwrap();
/// assert_eq!(parsed.arg("count"), Some(&json!(50)));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    registry: CommandRegistry,
    catalog: TypeCatalog,
}

impl ArgumentParser {
    /// Creates a parser, checking that every schema only references known types.
    pub fn new(registry: CommandRegistry, catalog: TypeCatalog) -> Result<Self> {
        let mut handlers: Vec<_> = registry.handlers().collect();
        handlers.sort_by(|a, b| a.key.cmp(&b.key));

        for handler in handlers {
            if let Some(missing) = handler
                .schema
                .type_ids()
                .into_iter()
                .find(|id| !catalog.contains(id))
            {
                return Err(EngineError::UnknownType {
                    handler: handler.key.clone(),
                    type_id: missing.to_string(),
                });
            }
        }

        Ok(Self { registry, catalog })
    }

    /// The registry this parser resolves commands against.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The types available to schemas.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Parses `context` as an invocation of `command`.
    pub async fn parse(&self, context: &ParseContext, command: &str) -> ParseOutcome {
        match self.parse_internal(context, command).await {
            Ok(parsed) => ParseOutcome::Parsed(parsed),
            Err(Interrupt::Failed(failure)) => {
                debug!(%command, error = %failure.message, "parse failed");
                ParseOutcome::Failed(failure)
            }
            Err(Interrupt::Abort) => ParseOutcome::Aborted,
        }
    }

    /// Like [`parse`](Self::parse), but returns failures as an [`ArgumentError`].
    ///
    /// `Ok(None)` means a collaborator aborted the parse after answering the
    /// invoker itself.
    pub async fn parse_strict(
        &self,
        context: &ParseContext,
        command: &str,
    ) -> std::result::Result<Option<ParsedArguments>, ArgumentError> {
        self.parse(context, command).await.into_result()
    }

    async fn parse_internal(
        &self,
        context: &ParseContext,
        command: &str,
    ) -> std::result::Result<ParsedArguments, Interrupt> {
        let (Some(descriptor), Some(handler)) =
            (self.registry.command(command), self.registry.handler(command))
        else {
            warn!(%command, "parse requested for unregistered command");
            return Err(ParseFailure::new(None, format!("Command `{command}` is not registered")).into());
        };

        let (schema, seed, subcommand) = if descriptor.has_subcommands() {
            let route = route(context, &self.registry, descriptor, &handler.schema).await?;
            (route.schema, route.state, Some(route.subcommand))
        } else {
            (&handler.schema, ParserState::new(), None)
        };

        if schema.overloads.is_empty() {
            debug!(%command, "schema takes no arguments");
            let empty = ParserState::attempt(&seed, seed.parsed_options.clone());
            return Ok(ParsedArguments::from_state(empty, subcommand));
        }

        let state = resolve(context, schema, &self.catalog, &seed).await?;
        Ok(ParsedArguments::from_state(state, subcommand))
    }
}
