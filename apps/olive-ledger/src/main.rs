//! olive-ledger: command-line host for the olive-oil traceability ledger.
//!
//! Every subcommand maps to one ledger transaction or one read-only view.

use clap::{Parser, Subcommand};
use olive_ledger::cli::{self, CliError, StoreOptions};
use olive_ledger_core::LedgerConfig;
use olive_ledger_core::primitives::{DEFAULT_BOTTLER, DEFAULT_NAMESPACE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "olive-ledger")]
#[command(version, about = "Olive-oil traceability ledger")]
struct Cli {
    /// Ledger location (snapshot file or redb database)
    #[arg(long, global = true, env = "OLIVE_LEDGER_DB", default_value = "olive-ledger.db")]
    db: PathBuf,

    /// Storage backend: file or redb
    #[arg(long, global = true, env = "OLIVE_LEDGER_BACKEND", default_value = "file")]
    backend: String,

    /// Namespace qualifying collection names
    #[arg(long, global = true, env = "OLIVE_LEDGER_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Bottler recorded on new grades
    #[arg(long, global = true, env = "OLIVE_LEDGER_BOTTLER", default_value = DEFAULT_BOTTLER)]
    bottler: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "OLIVE_LEDGER_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty ledger
    Init {
        /// Overwrite an existing ledger
        #[arg(long)]
        force: bool,
    },
    /// Seed the demo grower, producer, bottler and batches
    SetupDemo {
        /// Seconds since the Unix epoch (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Add a pesticide reading to a cultivation
    Pesticide { cultivation: String, pesticide: String },
    /// Add a soil contaminant reading to a cultivation
    Soil { cultivation: String, contaminant: String },
    /// Add an acidity reading (percent) to a production batch
    Acidity { production: String, acidity: String },
    /// Grade a production batch
    Grade {
        cultivation: String,
        production: String,
        /// Bottling time in seconds since the Unix epoch (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Run a JSON array of transactions
    Submit { file: PathBuf },
    /// Show one entity, or a whole collection
    Show { collection: String, id: Option<String> },
    /// Show entity counts
    Status,
    /// Export the ledger
    Export {
        output: PathBuf,
        /// json or canonical
        #[arg(long, default_value = "canonical")]
        format: String,
    },
    /// Import a canonical snapshot
    Import { input: PathBuf },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = LedgerConfig::new()
        .with_namespace(cli.namespace)
        .with_bottler(cli.bottler);
    let options = StoreOptions::new(cli.db, cli.backend)
        .with_config(config)
        .with_json(cli.json);

    match cli.command {
        Command::Init { force } => cli::cmd_init(&options, force),
        Command::SetupDemo { timestamp } => cli::cmd_setup_demo(&options, timestamp).map(drop),
        Command::Pesticide {
            cultivation,
            pesticide,
        } => cli::cmd_pesticide(&options, &cultivation, &pesticide).map(drop),
        Command::Soil {
            cultivation,
            contaminant,
        } => cli::cmd_soil(&options, &cultivation, &contaminant).map(drop),
        Command::Acidity {
            production,
            acidity,
        } => cli::cmd_acidity(&options, &production, &acidity).map(drop),
        Command::Grade {
            cultivation,
            production,
            timestamp,
        } => cli::cmd_grade(&options, &cultivation, &production, timestamp).map(drop),
        Command::Submit { file } => cli::cmd_submit(&options, &file).map(drop),
        Command::Show { collection, id } => {
            cli::cmd_show(&options, &collection, id.as_deref()).map(drop)
        }
        Command::Status => cli::cmd_status(&options).map(drop),
        Command::Export { output, format } => cli::cmd_export(&options, &output, &format),
        Command::Import { input } => cli::cmd_import(&options, &input).map(drop),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
