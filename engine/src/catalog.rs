//! Lookup table from type identifiers to argument types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builtin::{BooleanType, DurationType, IntegerType, NumberType, RestType, StringType};
use crate::kind::ArgumentType;

/// Argument types available to schemas, keyed by [`ArgumentType::id`].
///
/// # Examples
///
/// ```
/// use command_args_engine::TypeCatalog;
///
/// let catalog = TypeCatalog::with_builtins();
/// assert!(catalog.contains("duration"));
/// assert!(!catalog.contains("user"));
/// ```
#[derive(Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<dyn ArgumentType>>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the reference types.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register(StringType);
        catalog.register(IntegerType);
        catalog.register(NumberType);
        catalog.register(BooleanType);
        catalog.register(DurationType);
        catalog.register(RestType);
        catalog
    }

    /// Adds a type, replacing any type registered under the same id.
    pub fn register(&mut self, kind: impl ArgumentType + 'static) -> &mut Self {
        self.types.insert(kind.id().to_string(), Arc::new(kind));
        self
    }

    /// Looks up a type by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn ArgumentType>> {
        self.types.get(id)
    }

    /// Whether a type is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Returns the registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog").field("types", &self.ids()).finish()
    }
}
