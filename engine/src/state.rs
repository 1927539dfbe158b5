//! Mutable cursor state of a single parse.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// The only mutable object of a parse.
///
/// Owned by exactly one in-flight parse and threaded through every step by
/// `&mut`, so later steps observe the cursor movement of earlier ones. The
/// cursor never moves backward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    /// Cursor into the argument tokens.
    pub arg_index: usize,
    /// Positional values by name; the first write wins.
    pub parsed_args: Map<String, Value>,
    /// Option values by option id.
    pub parsed_options: Map<String, Value>,
    /// Token positions already consumed by routing.
    pub skip_indexes: BTreeSet<usize>,
}

impl ParserState {
    /// Creates a state with the cursor at the first argument token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the state for one overload attempt from a seed.
    ///
    /// The cursor and skip positions come from the seed, positional values
    /// start empty, and `options` (shared by all attempts) is moved in.
    pub(crate) fn attempt(seed: &ParserState, options: Map<String, Value>) -> Self {
        Self {
            arg_index: seed.arg_index,
            parsed_args: Map::new(),
            parsed_options: options,
            skip_indexes: seed.skip_indexes.clone(),
        }
    }

    /// Moves the cursor to the next token not consumed by routing.
    pub fn advance(&mut self) {
        self.arg_index += 1;
        while self.skip_indexes.contains(&self.arg_index) {
            self.arg_index += 1;
        }
    }

    /// Marks the token under the cursor as consumed and steps past it.
    pub(crate) fn consume_current(&mut self) {
        self.skip_indexes.insert(self.arg_index);
        self.advance();
    }

    /// Stores a positional value unless one already exists under `name`.
    ///
    /// Returns `true` if the value was stored.
    pub fn insert_arg(&mut self, name: &str, value: Value) -> bool {
        if self.parsed_args.contains_key(name) {
            return false;
        }
        self.parsed_args.insert(name.to_string(), value);
        true
    }

    /// Returns `true` if the option `id` was already parsed.
    pub fn has_option(&self, id: &str) -> bool {
        self.parsed_options.contains_key(id)
    }

    /// Stores an option value.
    pub fn set_option(&mut self, id: &str, value: Value) {
        self.parsed_options.insert(id.to_string(), value);
    }
}
