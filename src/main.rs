use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use invite_schema::cli_style;
use invite_schema::config::{
    AppConfig, Backend, CliConfig, FileConfig, StoreSettings, DEFAULT_SCHEMA, DEFAULT_TIMEOUT_SEC,
};
use invite_schema::{DataStore, PostgrestStore, SchemaVerifier, SqliteStore, PUBLIC_SCHEMA};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(
    name = "verify-db",
    version = env!("VERIFY_DB_VERSION"),
    about = "Checks that every table of the invitation schema is reachable",
    styles = cli_style::get_styles()
)]
struct CliArgs {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the theme catalog, then probe every table once.
    Verify(VerifyArgs),

    /// Print the declared tables, enum domains and relationships.
    Describe,

    /// Create a local SQLite mirror of the declared schema.
    InitSqlite {
        /// Path of the SQLite file to create or extend.
        #[clap(value_parser = parse_path)]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    config: Option<PathBuf>,

    /// Which store to verify.
    #[clap(long, value_enum, default_value = "postgrest")]
    backend: Backend,

    /// Project URL of the PostgREST endpoint.
    #[clap(long, env = "NEXT_PUBLIC_SUPABASE_URL")]
    url: Option<String>,

    /// Service role key sent as `apikey` and bearer token.
    #[clap(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// SQLite database to verify when `--backend sqlite` is used.
    #[clap(long, value_parser = parse_path)]
    sqlite_path: Option<PathBuf>,

    /// Schema namespace every read is issued against.
    #[clap(long, default_value = DEFAULT_SCHEMA)]
    schema: String,

    /// Request timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SEC)]
    timeout_sec: u64,

    /// Exit with status 2 when any table is unreachable.
    #[clap(long)]
    strict: bool,

    /// Only probe these tables, in this order. Repeatable.
    #[clap(long = "table")]
    tables: Vec<String>,
}

impl From<&VerifyArgs> for CliConfig {
    fn from(args: &VerifyArgs) -> Self {
        CliConfig {
            backend: args.backend,
            url: args.url.clone(),
            key: args.key.clone(),
            sqlite_path: args.sqlite_path.clone(),
            schema: Some(args.schema.clone()),
            timeout_sec: Some(args.timeout_sec),
            strict: args.strict,
            tables: args.tables.clone(),
        }
    }
}

fn open_store(settings: &StoreSettings) -> Result<Box<dyn DataStore>> {
    match settings {
        StoreSettings::Postgrest { url, key, timeout } => {
            info!("Using PostgREST store at {}", url);
            let store = PostgrestStore::new(url, key, *timeout)
                .context("Failed to create PostgREST client")?;
            Ok(Box::new(store))
        }
        StoreSettings::Sqlite { path } => {
            info!("Opening SQLite store at {:?}...", path);
            let store = SqliteStore::open(path)
                .with_context(|| format!("Failed to open SQLite database: {:?}", path))?;
            store.register_schema(&PUBLIC_SCHEMA)?;
            Ok(Box::new(store))
        }
    }
}

async fn run_verify(args: &VerifyArgs) -> Result<ExitCode> {
    let file_config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(args), file_config)?;
    let store = open_store(&config.store)?;

    let mut verifier =
        SchemaVerifier::new(store.as_ref(), &PUBLIC_SCHEMA).with_namespace(config.schema.clone());
    if let Some(tables) = &config.tables {
        verifier = verifier.with_roster(tables)?;
    }

    match verifier.run().await {
        Ok(report) => {
            cli_style::print_report(&report);
            Ok(ExitCode::from(report.exit_code(config.strict) as u8))
        }
        Err(e) => {
            error!("Verification aborted: {}", e);
            cli_style::print_error(&e.to_string());
            Err(e).context("Verification aborted")
        }
    }
}

fn run_init_sqlite(path: &Path) -> Result<ExitCode> {
    let store = SqliteStore::open(path)
        .with_context(|| format!("Failed to open SQLite database: {:?}", path))?;
    store
        .create_schema(&PUBLIC_SCHEMA)
        .with_context(|| format!("Failed to create schema in {:?}", path))?;
    let tables = store.existing_tables()?;
    cli_style::print_success(&format!(
        "{} tables present in {}",
        tables.len(),
        path.display()
    ));
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    match &cli_args.command {
        Command::Verify(args) => run_verify(args).await,
        Command::Describe => {
            cli_style::print_schema_description(&PUBLIC_SCHEMA);
            Ok(ExitCode::SUCCESS)
        }
        Command::InitSqlite { path } => run_init_sqlite(path),
    }
}
