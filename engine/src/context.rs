//! Parse contexts: the two shapes an invocation can arrive in.
//!
//! A [`ParseContext`] is either a free-form [`TokenStream`] (a text message
//! such as `ban @user 1d spamming`) or a [`StructuredOptions`] bag whose
//! fields were already typed by the platform delivering the invocation.

use serde_json::{Map, Value};

/// A text invocation split into whitespace-separated tokens.
///
/// `argv` holds every token including the command name; `args` holds the
/// tokens after it and is what the parser's cursor indexes. The raw
/// text after the command name is kept so argument types can slice the
/// remainder of the input with its spacing intact.
///
/// # Examples
///
/// ```
/// use command_args_engine::TokenStream;
///
/// let stream = TokenStream::parse("ban  @user   being  rude");
/// assert_eq!(stream.command_name(), Some("ban"));
/// assert_eq!(stream.args(), ["@user", "being", "rude"]);
/// assert_eq!(stream.rest_from(1), Some("being  rude"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    content: String,
    command_content: String,
    argv: Vec<String>,
    args: Vec<String>,
}

impl TokenStream {
    /// Tokenizes an invocation whose prefix has already been stripped.
    pub fn parse(content: &str) -> Self {
        let content = content.trim();
        let argv: Vec<String> = content.split_whitespace().map(String::from).collect();
        let args = argv.iter().skip(1).cloned().collect();
        let command_content = content
            .find(char::is_whitespace)
            .map(|i| content[i..].trim_start().to_string())
            .unwrap_or_default();

        Self {
            content: content.to_string(),
            command_content,
            argv,
            args,
        }
    }

    /// Returns the first token, the command name.
    pub fn command_name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Returns the full, trimmed invocation text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the text after the command name.
    pub fn command_content(&self) -> &str {
        &self.command_content
    }

    /// Returns every token including the command name.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Returns the tokens after the command name.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument token at `index`.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Returns `true` if the token at `index` exists and starts with `-`.
    pub fn looks_like_flag(&self, index: usize) -> bool {
        self.token(index).is_some_and(is_flag)
    }

    /// Returns the command content starting at argument token `index`.
    pub fn rest_from(&self, index: usize) -> Option<&str> {
        slice_from_token(&self.command_content, index)
    }
}

/// Returns `true` if `token` is shaped like an option (`-x`, `--name`).
pub fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

/// Slices `content` from the start of its `index`-th whitespace token.
///
/// Trailing whitespace is trimmed; interior spacing is kept as typed.
pub fn slice_from_token(content: &str, index: usize) -> Option<&str> {
    let mut offset = 0;
    let mut rest = content;

    for current in 0..=index {
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            return None;
        }
        if current == index {
            return Some(content[offset..].trim_end());
        }
        let token_len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        offset += token_len;
        rest = &trimmed[token_len..];
    }

    None
}

/// A structured invocation: named, already-typed fields.
///
/// A field counts as present when its key exists and its value is not
/// `null`. The subcommand, if any, travels in its own dedicated slot.
///
/// # Examples
///
/// ```
/// use command_args_engine::StructuredOptions;
/// use serde_json::json;
///
/// let options = StructuredOptions::new("config")
///     .with_subcommand("set")
///     .with_field("key", json!("prefix"))
///     .with_field("value", json!(null));
///
/// assert!(options.has_field("key"));
/// assert!(!options.has_field("value"));
/// assert_eq!(options.subcommand(), Some("set"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOptions {
    command: String,
    fields: Map<String, Value>,
    subcommand: Option<String>,
}

impl StructuredOptions {
    /// Creates an empty option bag for `command`.
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            fields: Map::new(),
            subcommand: None,
        }
    }

    /// Creates an option bag from an existing field map.
    pub fn from_fields(command: &str, fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::new(command)
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Sets the subcommand slot.
    pub fn with_subcommand(mut self, name: &str) -> Self {
        self.subcommand = Some(name.to_string());
        self
    }

    /// Returns the command name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the subcommand slot.
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommand.as_deref()
    }

    /// Returns a present (non-null) field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Returns `true` if the field is present and non-null.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns every field, including null ones.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// The invocation being parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseContext {
    /// Free-form text ("legacy" invocation).
    TokenStream(TokenStream),
    /// Platform-typed options ("interactive" invocation).
    Structured(StructuredOptions),
}

impl ParseContext {
    /// Tokenizes `content` into a text context.
    pub fn text(content: &str) -> Self {
        Self::TokenStream(TokenStream::parse(content))
    }

    /// Returns `true` for text invocations.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::TokenStream(_))
    }

    /// Returns the invoked command name, if known.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Self::TokenStream(stream) => stream.command_name(),
            Self::Structured(options) => Some(options.command()),
        }
    }

    /// Returns the token stream of a text invocation.
    pub fn tokens(&self) -> Option<&TokenStream> {
        match self {
            Self::TokenStream(stream) => Some(stream),
            Self::Structured(_) => None,
        }
    }

    /// Returns the option bag of a structured invocation.
    pub fn structured(&self) -> Option<&StructuredOptions> {
        match self {
            Self::TokenStream(_) => None,
            Self::Structured(options) => Some(options),
        }
    }

    /// Returns the raw text of a text invocation.
    pub fn raw_content(&self) -> Option<&str> {
        self.tokens().map(TokenStream::content)
    }
}

impl From<TokenStream> for ParseContext {
    fn from(stream: TokenStream) -> Self {
        Self::TokenStream(stream)
    }
}

impl From<StructuredOptions> for ParseContext {
    fn from(options: StructuredOptions) -> Self {
        Self::Structured(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_content() {
        let stream = TokenStream::parse("   ");
        assert_eq!(stream.command_name(), None);
        assert!(stream.args().is_empty());
        assert_eq!(stream.command_content(), "");
        assert_eq!(stream.rest_from(0), None);
    }

    #[test]
    fn test_command_without_args() {
        let stream = TokenStream::parse("ping");
        assert_eq!(stream.command_name(), Some("ping"));
        assert!(stream.args().is_empty());
        assert_eq!(stream.command_content(), "");
    }

    #[test]
    fn test_slice_from_token_keeps_inner_spacing() {
        let content = "a  b\tc   d  ";
        assert_eq!(slice_from_token(content, 0), Some("a  b\tc   d"));
        assert_eq!(slice_from_token(content, 2), Some("c   d"));
        assert_eq!(slice_from_token(content, 3), Some("d"));
        assert_eq!(slice_from_token(content, 4), None);
    }

    #[test]
    fn test_looks_like_flag() {
        let stream = TokenStream::parse("warn -s @user --reason=spam");
        assert!(stream.looks_like_flag(0));
        assert!(!stream.looks_like_flag(1));
        assert!(stream.looks_like_flag(2));
        assert!(!stream.looks_like_flag(3));
    }

    #[test]
    fn test_context_surface() {
        let text = ParseContext::text("ban @user");
        assert!(text.is_legacy());
        assert_eq!(text.command_name(), Some("ban"));
        assert_eq!(text.raw_content(), Some("ban @user"));
        assert!(text.structured().is_none());

        let structured: ParseContext = StructuredOptions::new("ban").into();
        assert!(!structured.is_legacy());
        assert_eq!(structured.command_name(), Some("ban"));
        assert_eq!(structured.raw_content(), None);
    }
}
