use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};
use idpsync::config::Config;
use idpsync::mgmt::{Deadline, ManagementClient};
use idpsync::resource::{get_kind, plan, Lifecycle, ResourceKind, KIND_NAMES};
use idpsync::state::{tree_from_json, Tree};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Declarative sync for identity-platform management API resources
#[derive(Parser, Debug)]
#[command(name = "idpsync", version = idpsync::VERSION, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Tenant domain (overrides config file and IDPSYNC_DOMAIN)
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Whole-operation timeout, including rate-limit backoff
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Resource kind
    #[arg(long, value_parser = PossibleValuesParser::new(KIND_NAMES.iter().copied()))]
    kind: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a resource from a declared file
    Create {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        desired: PathBuf,
    },
    /// Read a resource back into its declared shape
    Read {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        id: String,
        /// Declared file supplying write-only values
        #[arg(long)]
        desired: Option<PathBuf>,
    },
    /// Send the changes between two declared files
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        id: String,
        #[arg(long)]
        previous: PathBuf,
        #[arg(long)]
        desired: PathBuf,
    },
    /// Delete a resource
    Delete {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        id: String,
    },
    /// Show the calls an update (or create) would make, offline
    Plan {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        previous: Option<PathBuf>,
        #[arg(long)]
        desired: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // IDPSYNC_LOG narrows per module, e.g. "idpsync::mgmt=trace"
    let filter = EnvFilter::try_from_env("IDPSYNC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("idpsync started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("idpsync").join("idpsync.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".idpsync").join("idpsync.log");
    }
    PathBuf::from("idpsync.log")
}

/// Read a declared tree, JSON or YAML by extension
fn read_tree(path: &Path) -> Result<Tree> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    tree_from_json(value).with_context(|| format!("{} must contain a mapping", path.display()))
}

fn resolve_kind(target: &Target) -> Result<&'static dyn ResourceKind> {
    get_kind(&target.kind).with_context(|| format!("unknown resource kind {:?}", target.kind))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn connect(config: &Config) -> Result<ManagementClient> {
    let settings = config.client_settings()?;
    let credentials = config.credentials(&settings)?;
    ManagementClient::new(settings, credentials).context("failed to create management client")
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(domain) = args.domain {
        config.domain = Some(domain);
    }
    if let Some(secs) = args.timeout_secs {
        config.operation_timeout_secs = secs;
    }
    tracing::debug!("Effective config: {:?}", config);
    let deadline = || Deadline::after(config.operation_timeout());

    match args.command {
        Command::Plan {
            target,
            previous,
            desired,
        } => {
            let kind = resolve_kind(&target)?;
            let previous = previous.as_deref().map(read_tree).transpose()?;
            let desired = read_tree(&desired)?;
            print_json(&plan(kind, previous.as_ref(), &desired)?)
        }
        Command::Create { target, desired } => {
            let kind = resolve_kind(&target)?;
            let desired = read_tree(&desired)?;
            let client = connect(&config)?;
            let outcome = Lifecycle::new(&client, kind).create(&desired, deadline()).await;
            print_json(&outcome.to_json())?;
            match outcome.error {
                Some(err) => Err(err).context(format!("create {} failed", kind.name())),
                None => Ok(()),
            }
        }
        Command::Read {
            target,
            id,
            desired,
        } => {
            let kind = resolve_kind(&target)?;
            let local = desired.as_deref().map(read_tree).transpose()?.unwrap_or_default();
            let client = connect(&config)?;
            let outcome = Lifecycle::new(&client, kind)
                .read(&id, &local, deadline())
                .await?;
            print_json(&outcome.to_json())
        }
        Command::Update {
            target,
            id,
            previous,
            desired,
        } => {
            let kind = resolve_kind(&target)?;
            let previous = read_tree(&previous)?;
            let desired = read_tree(&desired)?;
            let client = connect(&config)?;
            let outcome = Lifecycle::new(&client, kind)
                .update(&id, &previous, &desired, deadline())
                .await;
            print_json(&outcome.to_json())?;
            match outcome.error {
                Some(err) => Err(err).context(format!("update {} {} failed", kind.name(), id)),
                None => Ok(()),
            }
        }
        Command::Delete { target, id } => {
            let kind = resolve_kind(&target)?;
            let client = connect(&config)?;
            Lifecycle::new(&client, kind).delete(&id, deadline()).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
