use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use command_args_core::{
    ArgumentDefinition, ArgumentSchema, ErrorKind, OptionSpec, Overload,
};
use command_args_engine::{
    ArgumentParser, ArgumentType, CastError, CastResult, Casted, CommandDescriptor,
    CommandRegistry, EngineError, NotFoundReason, ParseContext, ParseOutcome, StructuredInput,
    StructuredOptions, SubcommandNotFoundHook, TokenInput, TypeCatalog,
};
use serde_json::json;

fn parser(registry: CommandRegistry) -> ArgumentParser {
    ArgumentParser::new(registry, TypeCatalog::with_builtins()).expect("valid registry")
}

fn single(name: &str, schema: ArgumentSchema) -> ArgumentParser {
    let mut registry = CommandRegistry::new();
    registry
        .register_command(CommandDescriptor::new(name), schema)
        .expect("register");
    parser(registry)
}

async fn parse_text(parser: &ArgumentParser, line: &str) -> ParseOutcome {
    let context = ParseContext::text(line);
    let command = context.command_name().unwrap_or_default().to_string();
    parser.parse(&context, &command).await
}

fn failure(outcome: &ParseOutcome) -> (Option<ErrorKind>, &str) {
    let failure = outcome.failure().expect("expected a failure");
    (failure.kind, failure.message.as_str())
}

// ---------------------------------------------------------------------------
// Overload and type ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_declared_overload_wins() {
    let a = Overload::named("a", vec![ArgumentDefinition::required("first", "string")]);
    let b = Overload::named("b", vec![ArgumentDefinition::required("second", "string")]);

    let outcome = parse_text(
        &single("echo", ArgumentSchema::new().with_overload(a.clone()).with_overload(b.clone())),
        "echo hello",
    )
    .await;
    assert_eq!(outcome.parsed().unwrap().arg("first"), Some(&json!("hello")));

    let outcome = parse_text(
        &single("echo", ArgumentSchema::new().with_overload(b).with_overload(a)),
        "echo hello",
    )
    .await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.arg("second"), Some(&json!("hello")));
    assert_eq!(parsed.arg("first"), None);
}

#[tokio::test]
async fn test_first_candidate_type_wins() {
    let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
        ArgumentDefinition::required("value", "integer").with_type("string"),
    ]));
    let outcome = parse_text(&single("set", schema), "set 42").await;
    assert_eq!(outcome.parsed().unwrap().arg("value"), Some(&json!(42)));
}

#[tokio::test]
async fn test_all_overloads_failing_reports_each() {
    let schema = ArgumentSchema::new()
        .with_overload(Overload::named("count", vec![ArgumentDefinition::required("n", "integer")]))
        .with_overload(Overload::named("switch", vec![ArgumentDefinition::required("on", "boolean")]));
    let outcome = parse_text(&single("toggle", schema), "toggle maybe").await;

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, Some(ErrorKind::NoOverloadMatched));
    assert_eq!(
        failure.message,
        "The arguments did not satisfy any of the available overloads"
    );
    assert_eq!(failure.overloads.len(), 2);
    assert_eq!(failure.overloads["count"].kind, Some(ErrorKind::InvalidType));
    assert_eq!(failure.overloads["switch"].message, "`on` must be true or false");
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

fn moderation_schema() -> ArgumentSchema {
    ArgumentSchema::new()
        .with_overload(Overload::new(vec![ArgumentDefinition::optional("target", "string")]))
        .with_option(OptionSpec::new("reason").long("reason").short('r').takes_value())
        .with_option(OptionSpec::new("delete").long("delete").short('d'))
}

#[tokio::test]
async fn test_duplicate_long_option_is_silent() {
    let outcome = parse_text(
        &single("ban", moderation_schema()),
        "ban --reason=foo --reason=bar extra",
    )
    .await;
    let parsed = outcome.parsed().expect("duplicate must not fail");
    assert_eq!(parsed.option("reason"), Some(&json!("foo")));
    assert_eq!(parsed.arg("target"), Some(&serde_json::Value::Null));
}

#[tokio::test]
async fn test_fused_short_flags_value_last() {
    let parser = single("ban", moderation_schema());

    let outcome = parse_text(&parser, "ban -rd text").await;
    assert_eq!(
        failure(&outcome),
        (Some(ErrorKind::OptionRequiresValue), "Option `-r` requires a value")
    );

    let outcome = parse_text(&parser, "ban -dr value").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.option("reason"), Some(&json!("value")));
    assert_eq!(parsed.option("delete"), Some(&json!(true)));
    assert_eq!(parsed.arg("target"), Some(&serde_json::Value::Null));
}

#[tokio::test]
async fn test_required_option_checked_after_overload() {
    let schema = ArgumentSchema::new()
        .with_overload(Overload::new(vec![]))
        .with_option(OptionSpec::new("key").long("key").takes_value().required());
    let parser = single("config", schema);

    let outcome = parse_text(&parser, "config").await;
    assert_eq!(failure(&outcome), (Some(ErrorKind::Required), "Option `--key` is required"));

    let outcome = parse_text(&parser, "config --key prefix").await;
    assert_eq!(outcome.parsed().unwrap().option("key"), Some(&json!("prefix")));
}

#[tokio::test]
async fn test_required_option_message_uses_both_name_chains() {
    let schema = ArgumentSchema::new()
        .with_overload(Overload::new(vec![]))
        .with_option(OptionSpec {
            canonical_name: Some("force".to_string()),
            ..OptionSpec::new("force").short('f').required()
        });
    let outcome = parse_text(&single("wipe", schema), "wipe").await;
    assert_eq!(failure(&outcome).1, "Option `-force` is required");
}

#[tokio::test]
async fn test_unknown_option_fails() {
    let outcome = parse_text(&single("ban", moderation_schema()), "ban --nope bob").await;
    assert_eq!(
        failure(&outcome),
        (Some(ErrorKind::UnknownOption), "Unknown option `--nope`")
    );
}

// ---------------------------------------------------------------------------
// Positionals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_required_positional() {
    let schema = ArgumentSchema::new()
        .with_overload(Overload::new(vec![ArgumentDefinition::required("user", "string")]));
    let outcome = parse_text(&single("warn", schema), "warn").await;
    assert_eq!(
        failure(&outcome),
        (
            Some(ErrorKind::Required),
            "Argument at index #0 (user) is required but was not provided"
        )
    );
}

#[tokio::test]
async fn test_required_message_override() {
    let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
        ArgumentDefinition::required("user", "string")
            .with_error(0, ErrorKind::Required, "Who should be warned?"),
    ]));
    let outcome = parse_text(&single("warn", schema), "warn").await;
    assert_eq!(failure(&outcome).1, "Who should be warned?");
}

#[tokio::test]
async fn test_ban_style_schema() {
    let schema = ArgumentSchema::new()
        .with_overload(Overload::new(vec![
            ArgumentDefinition::required("user", "string"),
            ArgumentDefinition::optional("duration", "duration")
                .with_alias("reason")
                .with_type("rest"),
            ArgumentDefinition::optional("reason", "rest"),
        ]))
        .with_option(OptionSpec::new("delete").long("delete").short('d'));
    let parser = single("ban", schema);

    let outcome = parse_text(&parser, "ban bob -d 2d spamming  links").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.arg("user"), Some(&json!("bob")));
    assert_eq!(parsed.arg("duration"), Some(&json!(172_800_000)));
    assert_eq!(parsed.arg("reason"), Some(&json!("spamming  links")));
    assert_eq!(parsed.option("delete"), Some(&json!(true)));

    let outcome = parse_text(&parser, "ban bob being rude").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.arg("duration"), None);
    assert_eq!(parsed.arg("reason"), Some(&json!("being rude")));
}

#[tokio::test]
async fn test_command_without_overloads() {
    let outcome = parse_text(&single("ping", ArgumentSchema::new()), "ping whatever").await;
    let parsed = outcome.parsed().unwrap();
    assert!(parsed.args.is_empty());
    assert!(parsed.options.is_empty());
}

#[tokio::test]
async fn test_unregistered_command() {
    let outcome = parse_text(&single("ping", ArgumentSchema::new()), "pong").await;
    assert_eq!(failure(&outcome), (None, "Command `pong` is not registered"));
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn config_registry(isolated: bool) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register_command(
            CommandDescriptor::new("config")
                .with_subcommands(["get", "set", "unset", "save", "restore"], isolated),
            ArgumentSchema::new()
                .with_overload(Overload::new(vec![ArgumentDefinition::optional("key", "string")]))
                .with_option(OptionSpec::new("global").long("global").short('g')),
        )
        .expect("register config");
    registry
}

#[tokio::test]
async fn test_unknown_subcommand_lists_valid_names() {
    let parser = parser(config_registry(false));
    let outcome = parse_text(&parser, "config frobnicate").await;
    let (kind, message) = failure(&outcome);
    assert_eq!(kind, Some(ErrorKind::UnknownSubcommand));
    assert_eq!(
        message,
        "`frobnicate` is not a valid subcommand. Valid subcommands are: `get`, `restore`, `save`, `set`, `unset`."
    );
    for name in ["get", "set", "unset", "save", "restore"] {
        assert!(message.contains(&format!("`{name}`")));
    }
}

#[tokio::test]
async fn test_non_isolated_subcommand_uses_parent_schema() {
    let parser = parser(config_registry(false));
    let outcome = parse_text(&parser, "config -g get prefix").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.subcommand.as_deref(), Some("get"));
    assert_eq!(parsed.arg("key"), Some(&json!("prefix")));
    assert_eq!(parsed.option("global"), Some(&json!(true)));
}

#[tokio::test]
async fn test_isolated_subcommand_uses_own_schema() {
    let mut registry = config_registry(true);
    registry
        .register_subcommand(
            "config",
            "set",
            ArgumentSchema::new().with_overload(Overload::new(vec![
                ArgumentDefinition::required("key", "string"),
                ArgumentDefinition::required("value", "rest"),
            ])),
        )
        .unwrap();
    let parser = parser(registry);

    let outcome = parse_text(&parser, "config set prefix  !! ").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.arg("key"), Some(&json!("prefix")));
    assert_eq!(parsed.arg("value"), Some(&json!("!!")));

    let outcome = parse_text(&parser, "config get prefix").await;
    assert_eq!(failure(&outcome).0, Some(ErrorKind::UnknownSubcommand));
}

#[tokio::test]
async fn test_option_error_before_subcommand() {
    let parser = parser(config_registry(false));
    let outcome = parse_text(&parser, "config --bogus get").await;
    assert_eq!(
        failure(&outcome),
        (
            Some(ErrorKind::OptionsNotAllowed),
            "Options are not allowed before the subcommand name"
        )
    );
}

#[derive(Clone, Default)]
struct RecordingHook {
    calls: Arc<Mutex<Vec<(Option<String>, NotFoundReason)>>>,
}

#[async_trait]
impl SubcommandNotFoundHook for RecordingHook {
    async fn on_not_found(
        &self,
        _context: &ParseContext,
        subcommand: Option<&str>,
        reason: NotFoundReason,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push((subcommand.map(String::from), reason));
    }
}

#[tokio::test]
async fn test_not_found_hook_aborts() {
    let hook = RecordingHook::default();
    let mut registry = config_registry(false);
    registry.set_not_found_hook("config", hook.clone()).unwrap();
    let parser = parser(registry);

    assert!(parse_text(&parser, "config").await.is_aborted());
    assert!(parse_text(&parser, "config nope").await.is_aborted());

    let calls = hook.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (None, NotFoundReason::NotSpecified),
            (Some("nope".to_string()), NotFoundReason::NotFound),
        ]
    );

    let strict = parser
        .parse_strict(&ParseContext::text("config"), "config")
        .await
        .unwrap();
    assert!(strict.is_none());
}

// ---------------------------------------------------------------------------
// Structured invocations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_structured_invocation() {
    let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
        ArgumentDefinition::required("user", "string"),
        ArgumentDefinition::optional("duration", "duration").with_interaction_name("length"),
    ]));
    let parser = single("mute", schema);

    let context = ParseContext::Structured(
        StructuredOptions::new("mute")
            .with_field("user", "bob")
            .with_field("length", "15m"),
    );
    let outcome = parser.parse(&context, "mute").await;
    let parsed = outcome.parsed().unwrap();
    assert_eq!(parsed.arg("user"), Some(&json!("bob")));
    assert_eq!(parsed.arg("duration"), Some(&json!(900_000)));

    let context = ParseContext::Structured(StructuredOptions::new("mute").with_field("length", "15m"));
    let err = parser.parse_strict(&context, "mute").await.unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::Required));
    assert!(err.message.ends_with("(via interaction)"));
}

#[tokio::test]
async fn test_structured_subcommand_slot() {
    let parser = parser(config_registry(false));
    let context = ParseContext::Structured(
        StructuredOptions::new("config")
            .with_subcommand("unset")
            .with_field("key", "prefix"),
    );
    let parsed = parser.parse_strict(&context, "config").await.unwrap().unwrap();
    assert_eq!(parsed.subcommand.as_deref(), Some("unset"));
    assert_eq!(parsed.arg("key"), Some(&json!("prefix")));
}

// ---------------------------------------------------------------------------
// Custom argument types
// ---------------------------------------------------------------------------

/// Resolves `@name` mentions against a fixed member list.
struct MemberType {
    members: Vec<&'static str>,
}

impl MemberType {
    fn lookup(&self, raw: &str) -> CastResult {
        let name = raw.trim_start_matches('@');
        if self.members.contains(&name) {
            Ok(Casted::value(json!({ "member": name })))
        } else {
            Err(CastError::new(
                ErrorKind::EntityNotFound,
                format!("No member named `{name}`"),
            ))
        }
    }
}

#[async_trait]
impl ArgumentType for MemberType {
    fn id(&self) -> &str {
        "member"
    }

    async fn cast_from_tokens(&self, input: TokenInput<'_>) -> CastResult {
        self.lookup(input.token)
    }

    async fn cast_from_structured(&self, input: StructuredInput<'_>) -> CastResult {
        match input.field().and_then(|v| v.as_str()) {
            Some(raw) => self.lookup(raw),
            None => Err(CastError::new(ErrorKind::Required, "member missing")),
        }
    }
}

#[tokio::test]
async fn test_custom_type_and_error_override() {
    let schema = ArgumentSchema::new().with_overload(Overload::new(vec![
        ArgumentDefinition::required("member", "member").with_error(
            0,
            ErrorKind::EntityNotFound,
            "That member is not in this server.",
        ),
    ]));
    let mut registry = CommandRegistry::new();
    registry
        .register_command(CommandDescriptor::new("kick"), schema)
        .unwrap();

    let err = ArgumentParser::new(registry.clone(), TypeCatalog::with_builtins()).unwrap_err();
    assert!(matches!(err, EngineError::UnknownType { ref type_id, .. } if type_id == "member"));

    let mut catalog = TypeCatalog::with_builtins();
    catalog.register(MemberType {
        members: vec!["alice", "bob"],
    });
    let parser = ArgumentParser::new(registry, catalog).unwrap();

    let outcome = parse_text(&parser, "kick @bob").await;
    assert_eq!(
        outcome.parsed().unwrap().arg("member"),
        Some(&json!({ "member": "bob" }))
    );

    let err = parser
        .parse_strict(&ParseContext::text("kick @carol"), "kick")
        .await
        .unwrap_err();
    assert_eq!(err.kind, Some(ErrorKind::EntityNotFound));
    assert_eq!(err.message, "That member is not in this server.");
}
