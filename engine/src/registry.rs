//! Command registry: descriptors, handler schemas and not-found hooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use command_args_core::{ArgumentSchema, CommandManifest, validate_schema};
use serde::Serialize;
use tracing::debug;

use crate::context::ParseContext;
use crate::error::{EngineError, Result};

/// Why a subcommand could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The invocation named no subcommand.
    NotSpecified,
    /// The named subcommand does not exist.
    NotFound,
}

impl NotFoundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSpecified => "not_specified",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reacts to an unresolvable subcommand.
///
/// A registered hook owns all user feedback for the failure; the parse then
/// ends as [`ParseOutcome::Aborted`](crate::ParseOutcome::Aborted) instead of
/// producing a generic error.
#[async_trait]
pub trait SubcommandNotFoundHook: Send + Sync {
    async fn on_not_found(
        &self,
        context: &ParseContext,
        subcommand: Option<&str>,
        reason: NotFoundReason,
    );
}

/// What the router needs to know about a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub name: String,
    /// Subcommand names, in declaration order.
    pub subcommands: Vec<String>,
    /// Whether each subcommand has its own handler and schema.
    pub isolated_subcommands: bool,
}

impl CommandDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_subcommands<I, S>(mut self, names: I, isolated: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcommands = names.into_iter().map(Into::into).collect();
        self.isolated_subcommands = isolated;
        self
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub fn has_subcommand(&self, name: &str) -> bool {
        self.subcommands.iter().any(|s| s == name)
    }
}

/// A schema owner, keyed `"parent"` or `"parent::sub"`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandHandler {
    pub key: String,
    pub schema: ArgumentSchema,
}

/// Builds the handler key of an isolated subcommand.
pub fn handler_key(command: &str, subcommand: &str) -> String {
    format!("{command}::{subcommand}")
}

/// Registered commands and their schemas.
///
/// # Examples
///
/// ```
/// use command_args_core::ArgumentSchema;
/// use command_args_engine::{CommandDescriptor, CommandRegistry};
///
/// let mut registry = CommandRegistry::new();
/// registry
///     .register_command(
///         CommandDescriptor::new("role").with_subcommands(["add", "remove"], true),
///         ArgumentSchema::new(),
///     )
///     .unwrap();
/// registry.register_subcommand("role", "add", ArgumentSchema::new()).unwrap();
///
/// assert!(registry.handler("role::add").is_some());
/// assert!(registry.handler("role::remove").is_none());
/// assert!(registry.register_subcommand("role", "list", ArgumentSchema::new()).is_err());
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
    handlers: HashMap<String, CommandHandler>,
    hooks: HashMap<String, Arc<dyn SubcommandNotFoundHook>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every command of a manifest.
    pub fn from_manifest(manifest: &CommandManifest) -> Result<Self> {
        let mut registry = Self::new();
        for entry in &manifest.commands {
            let descriptor = CommandDescriptor::new(&entry.name)
                .with_subcommands(entry.subcommands.iter().cloned(), entry.isolated_subcommands);
            registry.register_command(descriptor, entry.schema.clone())?;

            for (name, schema) in &entry.subcommand_schemas {
                registry.register_subcommand(&entry.name, name, schema.clone())?;
            }
        }
        debug!(commands = registry.commands.len(), handlers = registry.handlers.len(), "registry built from manifest");
        Ok(registry)
    }

    /// Registers a command and the schema of its own handler.
    pub fn register_command(
        &mut self,
        descriptor: CommandDescriptor,
        schema: ArgumentSchema,
    ) -> Result<&mut Self> {
        if self.commands.contains_key(&descriptor.name) {
            return Err(EngineError::DuplicateCommand(descriptor.name));
        }

        let key = descriptor.name.clone();
        self.insert_handler(key.clone(), schema)?;
        self.commands.insert(key, descriptor);
        Ok(self)
    }

    /// Registers the handler of an isolated subcommand.
    pub fn register_subcommand(
        &mut self,
        command: &str,
        subcommand: &str,
        schema: ArgumentSchema,
    ) -> Result<&mut Self> {
        let descriptor = self
            .commands
            .get(command)
            .ok_or_else(|| EngineError::UnknownCommand(command.to_string()))?;

        if !descriptor.has_subcommand(subcommand) {
            return Err(EngineError::UnknownSubcommand {
                command: command.to_string(),
                subcommand: subcommand.to_string(),
            });
        }

        self.insert_handler(handler_key(command, subcommand), schema)?;
        Ok(self)
    }

    /// Installs the not-found hook of `command`.
    pub fn set_not_found_hook(
        &mut self,
        command: &str,
        hook: impl SubcommandNotFoundHook + 'static,
    ) -> Result<&mut Self> {
        if !self.commands.contains_key(command) {
            return Err(EngineError::UnknownCommand(command.to_string()));
        }
        self.hooks.insert(command.to_string(), Arc::new(hook));
        Ok(self)
    }

    fn insert_handler(&mut self, key: String, schema: ArgumentSchema) -> Result<()> {
        let errors = validate_schema(&schema);
        if !errors.is_empty() {
            return Err(EngineError::InvalidSchema {
                handler: key,
                errors,
            });
        }
        self.handlers.insert(key.clone(), CommandHandler { key, schema });
        Ok(())
    }

    pub fn command(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    pub fn handler(&self, key: &str) -> Option<&CommandHandler> {
        self.handlers.get(key)
    }

    pub fn not_found_hook(&self, command: &str) -> Option<&Arc<dyn SubcommandNotFoundHook>> {
        self.hooks.get(command)
    }

    /// Iterates over every registered handler.
    pub fn handlers(&self) -> impl Iterator<Item = &CommandHandler> {
        self.handlers.values()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&String> = self.hooks.keys().collect();
        hooks.sort();
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands)
            .field("handlers", &self.handlers)
            .field("hooks", &hooks)
            .finish()
    }
}
