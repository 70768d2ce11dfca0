//! mg2sh command-line tool.
//!
//! Reads the identities stored by a Metrics Grimoire tool (CVSAnalY,
//! MailingListStats, Bicho, IRCAnalysis) and writes them as a JSON
//! identities document to standard output or a file.

mod signals;
mod sink;
mod style;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use mg2sh_core::config::{Driver, ExportConfig};
use mg2sh_core::export::run_export;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Export identities from a Metrics Grimoire database.
#[derive(Parser, Debug)]
#[command(
    name = "mg2sh",
    version,
    about = "Export identities from a Metrics Grimoire database to a JSON identities file"
)]
struct Cli {
    /// Database user name [default: root].
    #[arg(short, long)]
    user: Option<String>,

    /// Database user password.
    #[arg(short, long)]
    password: Option<String>,

    /// Name of the database where identities are stored (file path for sqlite).
    #[arg(short, long, required_unless_present = "config")]
    database: Option<String>,

    /// Name of the host where the database server is running [default: localhost].
    #[arg(long)]
    host: Option<String>,

    /// Port of the host where the database server is running.
    #[arg(long)]
    port: Option<u16>,

    /// Database backend: mysql, postgres or sqlite [default: mysql].
    #[arg(long)]
    driver: Option<Driver>,

    /// Output file; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with connection settings; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run_until_interrupted(run(cli), signals::wait_for_interrupt()).await
}

/// Drive the export to completion unless `interrupt` resolves first.
///
/// An interrupt drops the export and exits successfully; nothing has been
/// written by then.
async fn run_until_interrupted<R, I>(run: R, interrupt: I) -> ExitCode
where
    R: Future<Output = Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = run => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", style::error(&format!("{:#}", e)));
                ExitCode::FAILURE
            }
        },
        () = interrupt => {
            eprintln!("{}", style::notice("Export interrupted, nothing written."));
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // Logs go to stderr; stdout may be carrying the JSON document.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;

    let export = run_export(&config)
        .await
        .context("failed to export identities")?;

    sink::write_export(&export, cli.output.as_deref()).context("failed to write output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            ExportConfig::load_from_file(path).context("failed to load configuration file")?
        }
        None => ExportConfig::default(),
    };

    if let Some(driver) = cli.driver {
        config.driver = driver;
    }
    if let Some(ref user) = cli.user {
        config.user = user.clone();
    }
    if let Some(ref password) = cli.password {
        config.password = Some(password.clone());
    }
    if let Some(ref database) = cli.database {
        config.database = database.clone();
    }
    if let Some(ref host) = cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = Some(port);
    }

    config.resolve_env_vars();
    config.validate().context("invalid configuration")?;
    Ok(config)
}
