//! Argument schema type definitions.
//!
//! This module defines the declarative data model describing which call
//! shapes a command accepts. The types are designed for serialization with
//! [`serde`] so schemas can live in YAML/JSON manifests as well as in code.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the manifest contract (semver).
///
/// Embedded in every [`CommandManifest`](crate::CommandManifest) to track
/// compatibility across manifest versions.
pub const MANIFEST_CONTRACT_VERSION: &str = "1.0.0";

/// Classification of a parse failure.
///
/// The engine produces the structural kinds (`Required`, option and
/// subcommand kinds, `NoOverloadMatched`); argument types produce the
/// value-level kinds (`InvalidType`, `InvalidRange`, `EntityNotFound`).
///
/// # Examples
///
/// ```
/// use command_args_core::ErrorKind;
///
/// assert_eq!(ErrorKind::OptionRequiresValue.as_str(), "option_requires_value");
/// assert_eq!(ErrorKind::Required.to_string(), "required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A mandatory positional argument or option is missing.
    Required,
    /// An option that needs a value was given without one.
    OptionRequiresValue,
    /// An option name is not declared by the schema.
    UnknownOption,
    /// A subcommand name is not declared by the command.
    UnknownSubcommand,
    /// Options were found where none are accepted.
    OptionsNotAllowed,
    /// The raw input could not be converted to the expected type.
    InvalidType,
    /// The converted value falls outside the permitted range.
    InvalidRange,
    /// The input refers to an entity that does not exist.
    EntityNotFound,
    /// None of the declared overloads accepted the input.
    NoOverloadMatched,
}

impl ErrorKind {
    /// Returns the stable `snake_case` identifier of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::OptionRequiresValue => "option_requires_value",
            Self::UnknownOption => "unknown_option",
            Self::UnknownSubcommand => "unknown_subcommand",
            Self::OptionsNotAllowed => "options_not_allowed",
            Self::InvalidType => "invalid_type",
            Self::InvalidRange => "invalid_range",
            Self::EntityNotFound => "entity_not_found",
            Self::NoOverloadMatched => "no_overload_matched",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind error message overrides.
pub type ErrorMessages = BTreeMap<ErrorKind, String>;

/// Validation rule bundle handed to an argument type.
///
/// Every field is optional; argument types ignore the rules that do not
/// apply to them.
///
/// # Examples
///
/// ```
/// use command_args_core::ArgumentRules;
///
/// let rules = ArgumentRules::range(1.0, 100.0);
/// assert_eq!(rules.min, Some(1.0));
/// assert!(rules.choices.is_empty());
///
/// let colors = ArgumentRules::choices(["red", "green"]);
/// assert!(colors.allows("red"));
/// assert!(!colors.allows("blue"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentRules {
    /// Lower bound (numeric value, or length for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound (numeric value, or length for strings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Exhaustive list of accepted raw values. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Skip the presence check for structured invocations.
    #[serde(default)]
    pub no_required_check: bool,
}

impl ArgumentRules {
    /// Creates a bundle bounded by `min` and `max`.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    /// Creates a bundle restricting input to the given choices.
    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Marks the bundle as skipping the structured presence check.
    pub fn without_required_check(mut self) -> Self {
        self.no_required_check = true;
        self
    }

    /// Returns `true` if `raw` satisfies the `choices` restriction.
    pub fn allows(&self, raw: &str) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c == raw)
    }

    /// Returns `true` if `value` lies within `min..=max`.
    pub fn in_range(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// One positional argument slot inside an [`Overload`].
///
/// A definition produces exactly one named value. It lists one or more
/// candidate argument types (by identifier) that are tried in order; the
/// first type that accepts the input wins.
///
/// The per-position tables ([`error_messages`](Self::error_messages) and
/// [`rules`](Self::rules)) are indexed by the position of the candidate type
/// in text mode, and by [`interaction_rule_index`](Self::interaction_rule_index)
/// in structured mode.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentDefinition, ErrorKind};
///
/// let target = ArgumentDefinition::required("member", "member")
///     .with_alias("user")
///     .with_type("user")
///     .with_error(0, ErrorKind::EntityNotFound, "No such member.");
///
/// assert_eq!(target.canonical_name(), "member");
/// assert_eq!(target.name_for(1), "user");
/// assert_eq!(target.error_message(0, ErrorKind::EntityNotFound), Some("No such member."));
/// assert!(!target.optional);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    /// Value names; position 0 is canonical.
    pub names: Vec<String>,
    /// Candidate argument type identifiers, tried in order.
    pub types: Vec<String>,
    /// Whether the slot may be left empty.
    #[serde(default)]
    pub optional: bool,
    /// Per-position error message overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_messages: Vec<ErrorMessages>,
    /// Per-position rule bundles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ArgumentRules>,
    /// Always store the value under the canonical name.
    #[serde(default)]
    pub use_canonical: bool,
    /// Field name to read in structured mode (defaults to the value name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_name: Option<String>,
    /// Sole type attempted in structured mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<String>,
    /// Rule/message table position used in structured mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_rule_index: Option<usize>,
}

impl ArgumentDefinition {
    /// Creates a mandatory definition with a single name and type.
    pub fn required(name: &str, type_id: &str) -> Self {
        Self {
            names: vec![name.to_string()],
            types: vec![type_id.to_string()],
            ..Default::default()
        }
    }

    /// Creates an optional definition with a single name and type.
    pub fn optional(name: &str, type_id: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, type_id)
        }
    }

    /// Adds a value name.
    pub fn with_alias(mut self, name: &str) -> Self {
        self.names.push(name.to_string());
        self
    }

    /// Adds a candidate type.
    pub fn with_type(mut self, type_id: &str) -> Self {
        self.types.push(type_id.to_string());
        self
    }

    /// Appends the rule bundle for the next position.
    pub fn with_rules(mut self, rules: ArgumentRules) -> Self {
        self.rules.push(rules);
        self
    }

    /// Sets an error message override for `kind` at `position`.
    pub fn with_error(mut self, position: usize, kind: ErrorKind, message: &str) -> Self {
        if self.error_messages.len() <= position {
            self.error_messages.resize_with(position + 1, ErrorMessages::new);
        }
        self.error_messages[position].insert(kind, message.to_string());
        self
    }

    /// Stores the value under the canonical name whichever type matched.
    pub fn canonical(mut self) -> Self {
        self.use_canonical = true;
        self
    }

    /// Sets the structured-mode field name.
    pub fn with_interaction_name(mut self, name: &str) -> Self {
        self.interaction_name = Some(name.to_string());
        self
    }

    /// Restricts structured mode to a single type and rule position.
    pub fn with_interaction_type(mut self, type_id: &str, rule_index: usize) -> Self {
        self.interaction_type = Some(type_id.to_string());
        self.interaction_rule_index = Some(rule_index);
        self
    }

    /// Returns the canonical (first) name, or `""` for a nameless definition.
    pub fn canonical_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    /// Returns the name a value produced by the type at `position` is stored under.
    ///
    /// Definitions with a single name, or marked canonical, always use the
    /// canonical name. Otherwise names pair up with types by position.
    pub fn name_for(&self, position: usize) -> &str {
        if self.use_canonical || self.names.len() == 1 {
            return self.canonical_name();
        }
        self.names
            .get(position)
            .map(String::as_str)
            .unwrap_or_else(|| self.canonical_name())
    }

    /// Returns the rule bundle at `position`, if any.
    pub fn rules_at(&self, position: usize) -> Option<&ArgumentRules> {
        self.rules.get(position)
    }

    /// Returns the override message for `kind` at `position`, if any.
    pub fn error_message(&self, position: usize, kind: ErrorKind) -> Option<&str> {
        self.error_messages
            .get(position)
            .and_then(|m| m.get(&kind))
            .map(String::as_str)
    }

    /// Returns all names joined for display (`member | user`).
    pub fn display_names(&self) -> String {
        self.names.join(" | ")
    }
}

/// One complete call shape of a command.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentDefinition, Overload};
///
/// let overload = Overload::named("by-id", vec![ArgumentDefinition::required("id", "integer")]);
/// assert_eq!(overload.name.as_deref(), Some("by-id"));
/// assert_eq!(overload.definitions.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overload {
    /// Optional label used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Positional definitions, evaluated in order.
    #[serde(default)]
    pub definitions: Vec<ArgumentDefinition>,
}

impl Overload {
    /// Creates an unnamed overload.
    pub fn new(definitions: Vec<ArgumentDefinition>) -> Self {
        Self {
            name: None,
            definitions,
        }
    }

    /// Creates a labelled overload.
    pub fn named(name: &str, definitions: Vec<ArgumentDefinition>) -> Self {
        Self {
            name: Some(name.to_string()),
            definitions,
        }
    }

    /// Appends a definition.
    pub fn with_definition(mut self, definition: ArgumentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }
}

/// Whether an option is displayed in long (`--name`) or short (`-n`) style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionNameStyle {
    Long,
    Short,
}

impl OptionNameStyle {
    /// Returns the dash prefix for this style.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Long => "--",
            Self::Short => "-",
        }
    }
}

/// Schema for a named option (`--reason text`, `-f`).
///
/// Options are orthogonal to positional definitions and may be interleaved
/// with them in text invocations.
///
/// # Examples
///
/// ```
/// use command_args_core::{OptionNameStyle, OptionSpec};
///
/// let reason = OptionSpec::new("reason").long("reason").short('r').takes_value();
/// assert!(reason.matches_long("reason"));
/// assert!(reason.matches_short('r'));
/// assert_eq!(reason.display_name(), "reason");
/// assert_eq!(reason.name_style(), OptionNameStyle::Long);
///
/// let force = OptionSpec::new("force").short('f');
/// assert_eq!(force.display_name(), "f");
/// assert_eq!(force.name_style(), OptionNameStyle::Short);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Key under which the parsed value is stored.
    pub id: String,
    /// Long names, without the `--` prefix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub long_names: Vec<String>,
    /// Short names, without the `-` prefix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<char>,
    /// Whether a parse fails when the option is absent.
    #[serde(default)]
    pub required: bool,
    /// Whether the option takes a value (otherwise it is a boolean switch).
    #[serde(default)]
    pub requires_value: bool,
    /// Name shown in messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    /// Style of [`canonical_name`](Self::canonical_name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name_type: Option<OptionNameStyle>,
    /// Message overrides (`required`, `option_requires_value`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ErrorMessages,
}

impl OptionSpec {
    /// Creates a value-less, optional option with no names.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Adds a long name.
    pub fn long(mut self, name: &str) -> Self {
        self.long_names.push(name.to_string());
        self
    }

    /// Adds a short name.
    pub fn short(mut self, name: char) -> Self {
        self.short_names.push(name);
        self
    }

    /// Marks the option as taking a value.
    pub fn takes_value(mut self) -> Self {
        self.requires_value = true;
        self
    }

    /// Marks the option as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the name and style used in messages.
    pub fn with_canonical(mut self, name: &str, style: OptionNameStyle) -> Self {
        self.canonical_name = Some(name.to_string());
        self.canonical_name_type = Some(style);
        self
    }

    /// Sets a message override.
    pub fn with_error(mut self, kind: ErrorKind, message: &str) -> Self {
        self.errors.insert(kind, message.to_string());
        self
    }

    /// Checks if this option answers to the long name `name`.
    pub fn matches_long(&self, name: &str) -> bool {
        self.long_names.iter().any(|n| n == name)
    }

    /// Checks if this option answers to the short name `name`.
    pub fn matches_short(&self, name: char) -> bool {
        self.short_names.contains(&name)
    }

    /// Returns the name shown in messages.
    ///
    /// Falls back from the canonical name to the first long name, the first
    /// short name, and finally the id.
    pub fn display_name(&self) -> String {
        self.canonical_name
            .clone()
            .or_else(|| self.long_names.first().cloned())
            .or_else(|| self.short_names.first().map(char::to_string))
            .unwrap_or_else(|| self.id.clone())
    }

    /// Returns the style used for [`display_name`](Self::display_name).
    ///
    /// This chain is independent of the display-name chain: without an
    /// explicit style, long is chosen whenever a long name exists or no short
    /// name does. A canonical name paired with a short-only option therefore
    /// renders as `-<canonical>`.
    pub fn name_style(&self) -> OptionNameStyle {
        self.canonical_name_type.unwrap_or(
            if !self.long_names.is_empty() || self.short_names.is_empty() {
                OptionNameStyle::Long
            } else {
                OptionNameStyle::Short
            },
        )
    }

    /// Returns the message override for `kind`, if any.
    pub fn error_message(&self, kind: ErrorKind) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }
}

/// Complete argument schema of a command (or of an isolated subcommand).
///
/// Overloads are attempted in declaration order and the first one that
/// fully succeeds wins. Options are shared by every overload.
///
/// # Examples
///
/// ```
/// use command_args_core::*;
///
/// let schema = ArgumentSchema::new()
///     .with_overload(Overload::new(vec![
///         ArgumentDefinition::required("user", "string"),
///         ArgumentDefinition::optional("reason", "rest"),
///     ]))
///     .with_option(OptionSpec::new("silent").long("silent").short('s'));
///
/// assert!(schema.has_options());
/// assert!(schema.find_long_option("silent").is_some());
/// assert!(schema.find_short_option('x').is_none());
/// assert_eq!(schema.type_ids(), vec!["rest", "string"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Accepted call shapes, in priority order.
    #[serde(default)]
    pub overloads: Vec<Overload>,
    /// Options accepted by every overload.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl ArgumentSchema {
    /// Creates an empty schema (a command taking no arguments).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an overload.
    pub fn with_overload(mut self, overload: Overload) -> Self {
        self.overloads.push(overload);
        self
    }

    /// Appends an option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Returns `true` if the schema declares any option.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Finds an option by long name.
    pub fn find_long_option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.matches_long(name))
    }

    /// Finds an option by short name.
    pub fn find_short_option(&self, name: char) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.matches_short(name))
    }

    /// Returns every distinct type identifier referenced by the schema, sorted.
    pub fn type_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .overloads
            .iter()
            .flat_map(|o| o.definitions.iter())
            .flat_map(|d| d.types.iter().chain(d.interaction_type.iter()))
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
