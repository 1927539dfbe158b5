//! Subcommand routing.
//!
//! Picks the schema a command with subcommands is parsed against, and seeds
//! the parser state with whatever routing already consumed.

use command_args_core::{ArgumentSchema, ErrorKind};
use tracing::debug;

use crate::context::ParseContext;
use crate::options::parse_option;
use crate::outcome::{Interrupt, ParseFailure, StepError};
use crate::registry::{CommandDescriptor, CommandRegistry, NotFoundReason, handler_key};
use crate::state::ParserState;

/// Where routing sent a parse.
#[derive(Debug)]
pub(crate) struct Route<'r> {
    pub schema: &'r ArgumentSchema,
    pub state: ParserState,
    pub subcommand: String,
}

pub(crate) async fn route<'r>(
    context: &ParseContext,
    registry: &'r CommandRegistry,
    descriptor: &CommandDescriptor,
    parent: &'r ArgumentSchema,
) -> Result<Route<'r>, Interrupt> {
    let mut state = ParserState::new();

    let name = match context {
        ParseContext::TokenStream(stream) => {
            while stream.looks_like_flag(state.arg_index) {
                match parse_option(context, parent, &mut state) {
                    Ok(()) => {}
                    Err(err) if err.silent => {}
                    Err(err) => {
                        debug!(command = %descriptor.name, error = %err.message, "option before subcommand rejected");
                        return Err(StepError::new(
                            ErrorKind::OptionsNotAllowed,
                            "Options are not allowed before the subcommand name",
                        )
                        .into());
                    }
                }
            }

            let name = stream.token(state.arg_index).map(String::from);
            if name.is_some() {
                state.consume_current();
            }
            name
        }
        ParseContext::Structured(options) => options.subcommand().map(String::from),
    };

    let Some(name) = name else {
        return Err(not_found(context, registry, descriptor, None, NotFoundReason::NotSpecified).await);
    };

    if !descriptor.has_subcommand(&name) {
        return Err(not_found(context, registry, descriptor, Some(&name), NotFoundReason::NotFound).await);
    }

    let schema = if descriptor.isolated_subcommands {
        let key = handler_key(&descriptor.name, &name);
        match registry.handler(&key) {
            Some(handler) => &handler.schema,
            None => {
                debug!(%key, "isolated subcommand has no handler");
                return Err(
                    not_found(context, registry, descriptor, Some(&name), NotFoundReason::NotFound).await,
                );
            }
        }
    } else {
        parent
    };

    debug!(command = %descriptor.name, subcommand = %name, cursor = state.arg_index, "routed");
    Ok(Route {
        schema,
        state,
        subcommand: name,
    })
}

async fn not_found(
    context: &ParseContext,
    registry: &CommandRegistry,
    descriptor: &CommandDescriptor,
    name: Option<&str>,
    reason: NotFoundReason,
) -> Interrupt {
    if let Some(hook) = registry.not_found_hook(&descriptor.name) {
        debug!(command = %descriptor.name, %reason, "delegating to not-found hook");
        hook.on_not_found(context, name, reason).await;
        return Interrupt::Abort;
    }

    let mut names: Vec<&str> = descriptor.subcommands.iter().map(String::as_str).collect();
    names.sort_unstable();
    let valid = names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ");

    let failure = match name {
        None => ParseFailure::new(
            Some(ErrorKind::Required),
            format!("A subcommand is required. Valid subcommands are: {valid}."),
        ),
        Some(name) => ParseFailure::new(
            Some(ErrorKind::UnknownSubcommand),
            format!("`{name}` is not a valid subcommand. Valid subcommands are: {valid}."),
        ),
    };
    failure.into()
}

#[cfg(test)]
mod tests {
    use command_args_core::OptionSpec;

    use super::*;
    use crate::context::StructuredOptions;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register_command(
                CommandDescriptor::new("tag").with_subcommands(["list", "add"], false),
                ArgumentSchema::new().with_option(OptionSpec::new("global").short('g')),
            )
            .unwrap();
        registry
            .register_command(
                CommandDescriptor::new("role").with_subcommands(["add", "remove"], true),
                ArgumentSchema::new(),
            )
            .unwrap();
        registry
            .register_subcommand("role", "add", ArgumentSchema::new())
            .unwrap();
        registry
    }

    async fn run(registry: &CommandRegistry, context: &ParseContext) -> Result<(usize, String), Interrupt> {
        let name = context.command_name().unwrap_or_default();
        let descriptor = registry.command(name).unwrap();
        let parent = &registry.handler(name).unwrap().schema;
        route(context, registry, descriptor, parent)
            .await
            .map(|r| (r.state.arg_index, r.subcommand))
    }

    fn failure(interrupt: Interrupt) -> ParseFailure {
        match interrupt {
            Interrupt::Failed(failure) => failure,
            Interrupt::Abort => panic!("expected a failure"),
        }
    }

    #[tokio::test]
    async fn test_options_before_name() {
        let registry = registry();
        let (cursor, name) = run(&registry, &ParseContext::text("tag -g list")).await.unwrap();
        assert_eq!((cursor, name.as_str()), (2, "list"));

        let err = failure(run(&registry, &ParseContext::text("tag -x list")).await.unwrap_err());
        assert_eq!(err.kind, Some(ErrorKind::OptionsNotAllowed));
    }

    #[tokio::test]
    async fn test_missing_name_lists_sorted() {
        let registry = registry();
        let err = failure(run(&registry, &ParseContext::text("tag")).await.unwrap_err());
        assert_eq!(err.kind, Some(ErrorKind::Required));
        assert_eq!(
            err.message,
            "A subcommand is required. Valid subcommands are: `add`, `list`."
        );
    }

    #[tokio::test]
    async fn test_isolated_without_handler_is_not_found() {
        let registry = registry();
        let err = failure(run(&registry, &ParseContext::text("role remove x")).await.unwrap_err());
        assert_eq!(err.kind, Some(ErrorKind::UnknownSubcommand));
        assert_eq!(
            err.message,
            "`remove` is not a valid subcommand. Valid subcommands are: `add`, `remove`."
        );
    }

    #[tokio::test]
    async fn test_structured_reads_subcommand_slot() {
        let registry = registry();
        let context = ParseContext::Structured(StructuredOptions::new("role").with_subcommand("add"));
        let (cursor, name) = run(&registry, &context).await.unwrap();
        assert_eq!((cursor, name.as_str()), (0, "add"));
    }
}
