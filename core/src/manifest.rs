//! Declarative command manifests.
//!
//! A manifest lists commands, their subcommands and their argument schemas.
//! It is the registration surface used instead of attaching schemas to
//! command implementations at runtime.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! commands:
//!   - name: ban
//!     schema:
//!       overloads:
//!         - definitions:
//!             - names: [user]
//!               types: [string]
//!             - names: [reason]
//!               types: [rest]
//!               optional: true
//!       options:
//!         - id: silent
//!           long_names: [silent]
//!           short_names: [s]
//!   - name: config
//!     subcommands: [get, set]
//!     isolated_subcommands: false
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};
use crate::{ArgumentSchema, validate_manifest};

/// One command registered in a [`CommandManifest`].
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgumentSchema, CommandEntry};
///
/// let entry = CommandEntry::new("config")
///     .with_subcommands(["get", "set"], true)
///     .with_subcommand_schema("get", ArgumentSchema::new())
///     .with_subcommand_schema("set", ArgumentSchema::new());
///
/// assert!(entry.has_subcommands());
/// assert!(entry.isolated_subcommands);
/// assert_eq!(entry.subcommand_schemas.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Command name (without prefix).
    pub name: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Subcommand names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<String>,
    /// Whether each subcommand has its own schema.
    #[serde(default)]
    pub isolated_subcommands: bool,
    /// Schema of the command itself.
    #[serde(default)]
    pub schema: ArgumentSchema,
    /// Schemas of isolated subcommands, keyed by subcommand name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommand_schemas: BTreeMap<String, ArgumentSchema>,
}

impl CommandEntry {
    /// Creates an entry with an empty schema and no subcommands.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the command schema.
    pub fn with_schema(mut self, schema: ArgumentSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Declares subcommands.
    pub fn with_subcommands<I, S>(mut self, names: I, isolated: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcommands = names.into_iter().map(Into::into).collect();
        self.isolated_subcommands = isolated;
        self
    }

    /// Attaches the schema of an isolated subcommand.
    pub fn with_subcommand_schema(mut self, name: &str, schema: ArgumentSchema) -> Self {
        self.subcommand_schemas.insert(name.to_string(), schema);
        self
    }

    /// Returns `true` if the command declares subcommands.
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }
}

/// Versioned collection of command registrations.
///
/// # Examples
///
/// ```
/// use command_args_core::{CommandEntry, CommandManifest};
///
/// let mut manifest = CommandManifest::new("1.0");
/// manifest.commands.push(CommandEntry::new("ping"));
///
/// assert_eq!(manifest.command_count(), 1);
/// assert!(manifest.find("ping").is_some());
/// assert!(manifest.find("pong").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandManifest {
    /// Manifest contract version (populated from
    /// [`MANIFEST_CONTRACT_VERSION`](crate::MANIFEST_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Manifest format version.
    pub version: String,
    /// Registered commands.
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

impl CommandManifest {
    /// Creates an empty manifest.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::MANIFEST_CONTRACT_VERSION.to_string()),
            version: version.into(),
            commands: Vec::new(),
        }
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Finds a command entry by name.
    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Parses and validates a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Yaml`](ManifestError::Yaml) if parsing fails, or
    /// [`Invalid`](ManifestError::Invalid) if validation finds problems.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(text)?;
        manifest.validated()
    }

    /// Loads and validates a manifest file.
    ///
    /// Files with a `.json` extension are read as JSON, everything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ManifestError::Io) if the file cannot be read, a
    /// [`Json`](ManifestError::Json)/[`Yaml`](ManifestError::Yaml) error if
    /// parsing fails, or [`Invalid`](ManifestError::Invalid) if validation
    /// finds problems.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let manifest: Self = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        manifest.validated()
    }

    /// Saves the manifest, as JSON for `.json` paths and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ManifestError::Io) if the file cannot be written, or
    /// a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    fn validated(self) -> Result<Self> {
        let errors = validate_manifest(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ManifestError::Invalid(errors))
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
