use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_args_core::{CommandManifest, ManifestError};
use command_args_engine::{
    ArgumentParser, CommandRegistry, ParseContext, ParseOutcome, StructuredOptions, TypeCatalog,
};
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "command-args")]
#[command(about = "Validate command manifests and resolve invocations against them")]
struct Cli {
    /// Log engine decisions to stderr (same as RUST_LOG=debug).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a command manifest.
    Validate(ValidateArgs),
    /// Parse an invocation against a manifest and print the outcome as JSON.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Manifest file (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Manifest file (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
    /// Command to parse against (defaults to the first word of the line).
    #[arg(long)]
    command: Option<String>,
    /// JSON object of structured fields; parses a structured invocation.
    #[arg(long, requires = "command", conflicts_with = "line")]
    fields: Option<String>,
    /// Subcommand slot of a structured invocation.
    #[arg(long, requires = "fields")]
    subcommand: Option<String>,
    /// Text invocation, prefix already stripped.
    #[arg(last = true)]
    line: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Parse(args) => run_parse(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_manifest(path: &Path) -> Result<CommandManifest, String> {
    CommandManifest::load(path).map_err(|err| match err {
        ManifestError::Invalid(errors) => {
            let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
            format!(
                "Manifest '{}' is invalid:\n{}",
                path.display(),
                lines.join("\n")
            )
        }
        other => format!("Failed to load '{}': {other}", path.display()),
    })
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let manifest = load_manifest(&args.manifest)?;
    let subcommands: usize = manifest.commands.iter().map(|c| c.subcommands.len()).sum();
    println!(
        "Validated '{}': {} command(s), {} subcommand(s).",
        args.manifest.display(),
        manifest.command_count(),
        subcommands
    );
    Ok(())
}

async fn run_parse(args: ParseArgs) -> Result<(), String> {
    let manifest = load_manifest(&args.manifest)?;
    let registry = CommandRegistry::from_manifest(&manifest).map_err(|e| e.to_string())?;
    let parser =
        ArgumentParser::new(registry, TypeCatalog::with_builtins()).map_err(|e| e.to_string())?;

    let context = match &args.fields {
        Some(raw) => structured_context(&args, raw)?,
        None => {
            if args.line.is_empty() {
                return Err("Nothing to parse: pass an invocation after `--` or use --fields".into());
            }
            ParseContext::text(&args.line.join(" "))
        }
    };

    let command = args
        .command
        .clone()
        .or_else(|| context.command_name().map(String::from))
        .ok_or("Could not determine the command name")?;
    debug!(%command, "parsing invocation");

    let outcome = parser.parse(&context, &command).await;
    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|err| format!("Failed to serialize outcome: {err}"))?;
    println!("{json}");

    match outcome {
        ParseOutcome::Failed(failure) => Err(failure.message),
        ParseOutcome::Parsed(_) | ParseOutcome::Aborted => Ok(()),
    }
}

fn structured_context(args: &ParseArgs, raw: &str) -> Result<ParseContext, String> {
    let fields: Map<String, Value> =
        serde_json::from_str(raw).map_err(|err| format!("--fields must be a JSON object: {err}"))?;
    let command = args.command.as_deref().unwrap_or_default();

    let mut options = StructuredOptions::from_fields(command, fields);
    if let Some(subcommand) = &args.subcommand {
        options = options.with_subcommand(subcommand);
    }
    Ok(options.into())
}
