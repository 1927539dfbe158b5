//! Schema and manifest validation.
//!
//! Validates structural invariants of argument schemas and command
//! manifests, catching errors such as nameless definitions, duplicate option
//! names, and dangling isolated subcommands before a parser is built.
//!
//! # Examples
//!
//! ```
//! use command_args_core::*;
//!
//! let schema = ArgumentSchema::new()
//!     .with_overload(Overload::new(vec![ArgumentDefinition::required("user", "string")]))
//!     .with_option(OptionSpec::new("force").long("force").short('f'));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: long name carries its own dashes
//! let bad = ArgumentSchema::new().with_option(OptionSpec::new("force").long("--force"));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ArgumentDefinition, ArgumentSchema, CommandManifest, OptionSpec};

/// Schema/manifest validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Manifest version string is empty.
    #[error("manifest version cannot be empty")]
    EmptyManifestVersion,
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Two commands in the same manifest share a name.
    #[error("duplicate command in manifest: {0}")]
    DuplicateCommand(String),
    /// A command lists the same subcommand twice.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// An isolated subcommand has no schema of its own.
    #[error("isolated subcommand has no schema: {0}")]
    MissingSubcommandSchema(String),
    /// A definition has no value name.
    #[error("definition in overload {0} has no names")]
    MissingDefinitionName(String),
    /// A definition has no candidate type.
    #[error("definition `{0}` has no types")]
    MissingDefinitionType(String),
    /// `interaction_rule_index` points past the rule table.
    #[error("definition `{0}` has an interaction rule index past its rules")]
    InvalidInteractionRuleIndex(String),
    /// `interaction_type` is not one of the definition's listed types.
    #[error("definition `{0}` has an interaction type `{1}` outside its types")]
    UnlistedInteractionType(String, String),
    /// Option id is empty.
    #[error("option id cannot be empty")]
    EmptyOptionId,
    /// Two options share an id.
    #[error("duplicate option id: {0}")]
    DuplicateOptionId(String),
    /// Option has neither long nor short names.
    #[error("option `{0}` must define a long or short name")]
    MissingOptionName(String),
    /// Long name is empty or carries a leading dash.
    #[error("invalid long option name: {0:?}")]
    InvalidLongName(String),
    /// Short name is a dash or whitespace.
    #[error("invalid short option name: {0:?}")]
    InvalidShortName(char),
    /// Two options share a long or short name.
    #[error("duplicate option name: {0}")]
    DuplicateOptionName(String),
}

/// Validates a full command manifest.
///
/// Checks for an empty version string, duplicate or empty command names,
/// duplicate subcommands, isolated subcommands lacking a schema, and
/// validates each schema individually.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let mut manifest = CommandManifest::new("1.0");
/// manifest.commands.push(CommandEntry::new("ping"));
/// assert!(validate_manifest(&manifest).is_empty());
///
/// // Duplicate command → error
/// manifest.commands.push(CommandEntry::new("ping"));
/// let errors = validate_manifest(&manifest);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateCommand(_))));
/// ```
pub fn validate_manifest(manifest: &CommandManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.version.trim().is_empty() {
        errors.push(ValidationError::EmptyManifestVersion);
        return errors;
    }

    let mut seen_commands: HashSet<&str> = HashSet::new();
    for entry in &manifest.commands {
        let name = entry.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            return errors;
        }
        if !seen_commands.insert(name) {
            errors.push(ValidationError::DuplicateCommand(name.to_string()));
            return errors;
        }

        let mut seen_subcommands: HashSet<&str> = HashSet::new();
        for sub in &entry.subcommands {
            if !seen_subcommands.insert(sub.as_str()) {
                errors.push(ValidationError::DuplicateSubcommand(format!("{name}::{sub}")));
                return errors;
            }
            if entry.isolated_subcommands && !entry.subcommand_schemas.contains_key(sub) {
                errors.push(ValidationError::MissingSubcommandSchema(format!("{name}::{sub}")));
                return errors;
            }
        }

        errors.extend(validate_schema(&entry.schema));
        if !errors.is_empty() {
            return errors;
        }
        for schema in entry.subcommand_schemas.values() {
            errors.extend(validate_schema(schema));
            if !errors.is_empty() {
                return errors;
            }
        }
    }

    errors
}

/// Validates an argument schema.
///
/// Checks definitions for names, types and a sane structured rule index,
/// and options for ids, name formats and collisions.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let schema = ArgumentSchema::new()
///     .with_option(OptionSpec::new("a").short('x'))
///     .with_option(OptionSpec::new("b").short('x'));
/// let errors = validate_schema(&schema);
/// assert_eq!(errors, vec![ValidationError::DuplicateOptionName("-x".into())]);
/// ```
pub fn validate_schema(schema: &ArgumentSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut unnamed = 0usize;
    for overload in &schema.overloads {
        let label = overload.name.clone().unwrap_or_else(|| {
            let label = format!("#{unnamed}");
            unnamed += 1;
            label
        });
        for definition in &overload.definitions {
            errors.extend(validate_definition(definition, &label));
            if !errors.is_empty() {
                return errors;
            }
        }
    }

    errors.extend(validate_options(&schema.options));
    errors
}

fn validate_definition(definition: &ArgumentDefinition, overload: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if definition.names.iter().all(|n| n.trim().is_empty()) {
        errors.push(ValidationError::MissingDefinitionName(overload.to_string()));
        return errors;
    }

    let name = definition.canonical_name().to_string();
    if definition.types.is_empty() && definition.interaction_type.is_none() {
        errors.push(ValidationError::MissingDefinitionType(name));
        return errors;
    }

    if let Some(type_id) = &definition.interaction_type {
        if !definition.types.is_empty() && !definition.types.contains(type_id) {
            errors.push(ValidationError::UnlistedInteractionType(name, type_id.clone()));
            return errors;
        }
    }

    if let Some(index) = definition.interaction_rule_index {
        if !definition.rules.is_empty() && index >= definition.rules.len() {
            errors.push(ValidationError::InvalidInteractionRuleIndex(name));
        }
    }

    errors
}

fn validate_options(options: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();

    for option in options {
        if option.id.trim().is_empty() {
            errors.push(ValidationError::EmptyOptionId);
            return errors;
        }
        if !seen_ids.insert(option.id.as_str()) {
            errors.push(ValidationError::DuplicateOptionId(option.id.clone()));
            return errors;
        }
        if option.long_names.is_empty() && option.short_names.is_empty() {
            errors.push(ValidationError::MissingOptionName(option.id.clone()));
            return errors;
        }

        for long in &option.long_names {
            if long.is_empty() || long.starts_with('-') || long.contains(char::is_whitespace) {
                errors.push(ValidationError::InvalidLongName(long.clone()));
                return errors;
            }
            if !seen_names.insert(format!("--{long}")) {
                errors.push(ValidationError::DuplicateOptionName(format!("--{long}")));
                return errors;
            }
        }

        for &short in &option.short_names {
            if short == '-' || short.is_whitespace() {
                errors.push(ValidationError::InvalidShortName(short));
                return errors;
            }
            if !seen_names.insert(format!("-{short}")) {
                errors.push(ValidationError::DuplicateOptionName(format!("-{short}")));
                return errors;
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::{CommandEntry, Overload};

    use super::*;

    #[test]
    fn test_validate_manifest_rejects_duplicate_commands() {
        let mut manifest = CommandManifest::new("1.0");
        manifest.commands.push(CommandEntry::new("ban"));
        manifest.commands.push(CommandEntry::new("ban"));

        let errors = validate_manifest(&manifest);
        assert_eq!(errors, vec![ValidationError::DuplicateCommand("ban".to_string())]);
    }

    #[test]
    fn test_validate_manifest_rejects_isolated_subcommand_without_schema() {
        let mut manifest = CommandManifest::new("1.0");
        let mut entry = CommandEntry::new("config");
        entry.subcommands = vec!["get".into()];
        entry.isolated_subcommands = true;
        manifest.commands.push(entry);

        let errors = validate_manifest(&manifest);
        assert_eq!(
            errors,
            vec![ValidationError::MissingSubcommandSchema("config::get".to_string())]
        );
    }

    #[test]
    fn test_validate_schema_rejects_definition_without_types() {
        let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
            ArgumentDefinition {
                names: vec!["user".into()],
                ..Default::default()
            },
        ]));

        let errors = validate_schema(&schema);
        assert_eq!(errors, vec![ValidationError::MissingDefinitionType("user".into())]);
    }

    #[test]
    fn test_validate_schema_rejects_nameless_definition_with_overload_label() {
        let schema = ArgumentSchema::new()
            .with_overload(Overload::named("first", vec![]))
            .with_overload(Overload::new(vec![ArgumentDefinition {
                types: vec!["string".into()],
                ..Default::default()
            }]));

        let errors = validate_schema(&schema);
        assert_eq!(errors, vec![ValidationError::MissingDefinitionName("#0".into())]);
    }

    #[test]
    fn test_validate_schema_rejects_duplicate_long_names() {
        let schema = ArgumentSchema::new()
            .with_option(OptionSpec::new("reason").long("reason"))
            .with_option(OptionSpec::new("why").long("reason"));

        let errors = validate_schema(&schema);
        assert_eq!(errors, vec![ValidationError::DuplicateOptionName("--reason".into())]);
    }

    #[test]
    fn test_validate_schema_rejects_bad_rule_index() {
        let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
            ArgumentDefinition::optional("reason", "rest")
                .with_rules(Default::default())
                .with_interaction_type("rest", 3),
        ]));

        let errors = validate_schema(&schema);
        assert_eq!(
            errors,
            vec![ValidationError::InvalidInteractionRuleIndex("reason".into())]
        );
    }

    #[test]
    fn test_validate_schema_rejects_unlisted_interaction_type() {
        let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
            ArgumentDefinition::optional("length", "integer").with_interaction_type("duration", 0),
        ]));

        let errors = validate_schema(&schema);
        assert_eq!(
            errors,
            vec![ValidationError::UnlistedInteractionType("length".into(), "duration".into())]
        );

        let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
            ArgumentDefinition::optional("length", "integer")
                .with_type("duration")
                .with_interaction_type("duration", 0),
        ]));
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_validate_schema_accepts_empty_overload() {
        let schema = ArgumentSchema::new()
            .with_overload(Overload::new(vec![]))
            .with_option(OptionSpec::new("key").long("key").takes_value().required());

        assert!(validate_schema(&schema).is_empty());
    }
}
