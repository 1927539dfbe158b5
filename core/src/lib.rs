//! Core argument schema types and manifest primitives.
//!
//! This crate defines the declarative model describing how a command's
//! arguments may be supplied:
//!
//! - [`ArgumentSchema`]: the accepted call shapes of a command, i.e. ordered
//!   overloads plus options shared by all of them.
//! - [`Overload`]: one complete sequence of positional definitions.
//! - [`ArgumentDefinition`]: one positional slot with candidate types,
//!   per-position rules and error overrides.
//! - [`OptionSpec`]: a `--long`/`-s` option, with or without a value.
//! - [`CommandManifest`]: a versioned list of commands, their subcommands
//!   and schemas, loadable from YAML or JSON.
//!
//! Validation ([`validate_schema`], [`validate_manifest`]) catches structural
//! errors such as nameless definitions and colliding option names.
//!
//! # Example
//!
//! ```
//! use command_args_core::*;
//!
//! let schema = ArgumentSchema::new()
//!     .with_overload(Overload::new(vec![
//!         ArgumentDefinition::required("user", "string"),
//!         ArgumentDefinition::optional("reason", "rest"),
//!     ]))
//!     .with_option(OptionSpec::new("duration").long("duration").short('d').takes_value());
//!
//! assert_eq!(schema.overloads[0].definitions[0].canonical_name(), "user");
//! assert!(schema.find_short_option('d').is_some());
//! assert!(validate_schema(&schema).is_empty());
//! ```

mod error;
mod manifest;
mod types;
mod validate;

pub use error::{ManifestError, Result};
pub use manifest::{CommandEntry, CommandManifest};
pub use types::*;
pub use validate::{ValidationError, validate_manifest, validate_schema};
