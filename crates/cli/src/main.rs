use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use command::{
    AssetContextPayload, CommandAction, CommandHandler, CommandRequest, CommandResponse,
    ExportFormatName, ExportPayload, LineagePayload,
};
use lineage_protocol::{
    serialize_json, serialize_json_pretty, AssetContextRequest, LineageRequest, Scope, View,
    DEFAULT_USER_ID,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Read, Write};
use std::path::PathBuf;

mod command;
mod config;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Asset context graphs and scoped lineage queries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file (overrides LINEAGE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Build the asset context graph around one or more seed entities
    Context(ContextArgs),

    /// Run a scoped lineage query
    Query(QueryArgs),

    /// Export the whole lineage store
    Export(ExportArgs),
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON payload (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing JSON payload
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ContextArgs {
    /// Repository fixture (JSON: entities, relationships, type_definitions)
    #[arg(long)]
    repository: PathBuf,

    /// Seed as GUID:TYPE_NAME; repeat for several independent graphs
    #[arg(long = "seed", required = true, value_parser = parse_seed)]
    seeds: Vec<(String, String)>,

    /// User the repository is queried as
    #[arg(long, default_value = DEFAULT_USER_ID)]
    user: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Lineage store (JSON: vertices, edges)
    #[arg(long)]
    store: PathBuf,

    /// source_and_destination | end_to_end | ultimate_source | ultimate_destination | glossary
    #[arg(long, value_parser = parse_scope)]
    scope: Scope,

    /// table_level | column_level
    #[arg(long, value_parser = parse_view, default_value = "table_level")]
    view: View,

    /// Node id to start from
    #[arg(long)]
    guid: String,

    /// Keep only vertices whose display name contains this text
    #[arg(long, default_value = "")]
    contains: String,

    /// Drop process vertices and their edges
    #[arg(long)]
    exclude_processes: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormatArg {
    Json,
    Graphml,
}

impl From<ExportFormatArg> for ExportFormatName {
    fn from(value: ExportFormatArg) -> Self {
        match value {
            ExportFormatArg::Json => ExportFormatName::Json,
            ExportFormatArg::Graphml => ExportFormatName::Graphml,
        }
    }
}

#[derive(Args)]
struct ExportArgs {
    /// Lineage store (JSON: vertices, edges)
    #[arg(long)]
    store: PathBuf,

    #[arg(long, value_enum, default_value = "json")]
    format: ExportFormatArg,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn parse_seed(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once(':') {
        Some((guid, type_name)) if !guid.is_empty() && !type_name.is_empty() => {
            Ok((guid.to_string(), type_name.to_string()))
        }
        _ => Err(format!("expected GUID:TYPE_NAME, got {raw:?}")),
    }
}

fn parse_scope(raw: &str) -> std::result::Result<Scope, String> {
    Scope::from_name(raw).ok_or_else(|| {
        let known: Vec<&str> = Scope::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown scope {raw:?} (expected one of {})", known.join(", "))
    })
}

fn parse_view(raw: &str) -> std::result::Result<View, String> {
    View::from_name(raw).ok_or_else(|| {
        let known: Vec<&str> = View::ALL.iter().map(|v| v.as_str()).collect();
        format!("unknown view {raw:?} (expected one of {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let loaded = config::load_config(cli.config.as_deref()).await?;
    let handler = CommandHandler::new(loaded);

    match cli.command {
        Commands::Command(args) => run_command(&handler, args).await?,
        Commands::Context(args) => run_context(&handler, args).await?,
        Commands::Query(args) => run_query(&handler, args).await?,
        Commands::Export(args) => run_export(&handler, args).await?,
    }

    Ok(())
}

async fn run_command(handler: &CommandHandler, args: CommandArgs) -> Result<()> {
    let raw = read_payload(&args).await?;
    let response = handler.execute_raw(&raw).await;

    print_json(&response, args.pretty)?;
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_context(handler: &CommandHandler, args: ContextArgs) -> Result<()> {
    let seeds = args
        .seeds
        .into_iter()
        .map(|(guid, type_name)| AssetContextRequest {
            user_id: args.user.clone(),
            guid,
            type_name,
        })
        .collect();
    let payload = AssetContextPayload {
        repository: args.repository,
        seeds,
    };
    let data = dispatch(handler, CommandAction::AssetContext, payload).await?;
    print_json(&data["contexts"], args.pretty)
}

async fn run_query(handler: &CommandHandler, args: QueryArgs) -> Result<()> {
    let payload = LineagePayload {
        store: args.store,
        request: LineageRequest {
            scope: args.scope,
            view: args.view,
            guid: args.guid,
            display_name_must_contain: args.contains,
            include_processes: !args.exclude_processes,
        },
    };
    let data = dispatch(handler, CommandAction::Lineage, payload).await?;
    print_json(&data, args.pretty)
}

async fn run_export(handler: &CommandHandler, args: ExportArgs) -> Result<()> {
    let payload = ExportPayload {
        store: args.store,
        format: args.format.into(),
    };
    let data = dispatch(handler, CommandAction::Export, payload).await?;
    let content = data["content"]
        .as_str()
        .context("Export produced no content")?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Exported lineage store to {}", path.display());
            Ok(())
        }
        None => print_stdout(content),
    }
}

/// Run `action` through the command handler and unwrap its data
async fn dispatch<P: Serialize>(
    handler: &CommandHandler,
    action: CommandAction,
    payload: P,
) -> Result<Value> {
    let request = CommandRequest {
        action,
        payload: serde_json::to_value(payload)?,
    };
    let response: CommandResponse = handler.execute(request).await;
    if response.is_error() {
        let message = response
            .message
            .unwrap_or_else(|| format!("{} failed", action.as_str()));
        match response.error.and_then(|e| e.hint) {
            Some(hint) => anyhow::bail!("{message}\nhint: {hint}"),
            None => anyhow::bail!("{message}"),
        }
    }
    Ok(response.data)
}

async fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serialize_json_pretty(value)?
    } else {
        serialize_json(value)?
    };
    print_stdout(&output)
}

fn print_stdout(text: &str) -> Result<()> {
    match write_stdout(text) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context("Failed to write to stdout"),
    }
}

fn write_stdout(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}
