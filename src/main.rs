//! cowtrie CLI - Command line interface for cow_trie
//!
//! Runs shell scripts against an in-memory store and exercises the store
//! under concurrent load.

use clap::{Parser, Subcommand};
use cow_trie::{Record, Shell, StressConfig, TrieStore};
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "cowtrie")]
#[command(about = "A concurrent key-value store on a persistent copy-on-write trie")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Run shell commands against a fresh in-memory store
    Run {
        /// Script file to execute (reads stdin when omitted)
        script: Option<PathBuf>,
    },

    /// Run concurrent readers against a single writer and check consistency
    Stress {
        /// Number of reader threads
        #[arg(short, long, default_value = "4")]
        readers: usize,
        /// Number of writer operations
        #[arg(short, long, default_value = "1000")]
        writes: u64,
        /// Number of distinct keys
        #[arg(short, long, default_value = "16")]
        keys: u64,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { script } => {
            let reader: Box<dyn BufRead> = match &script {
                Some(path) => Box::new(BufReader::new(File::open(path)?)),
                None => Box::new(io::stdin().lock()),
            };

            let store = TrieStore::new();
            let result = Shell::new(&store).run_script(reader, |record| {
                output(&cli.format, &Record::ok(record)).map_err(io::Error::other)?;
                Ok(())
            });

            match result {
                Ok(executed) => {
                    info!(
                        executed,
                        version = store.version(),
                        len = store.len(),
                        "script finished"
                    );
                }
                Err(err) => {
                    match cli.format {
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::json!({
                                "status": "error",
                                "message": err.to_string(),
                                "line": err.line(),
                            })
                        ),
                        OutputFormat::Text => eprintln!("Error: {}", err),
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Stress {
            readers,
            writes,
            keys,
        } => {
            let report = cow_trie::stress::run(StressConfig {
                readers,
                writes,
                keys,
            })?;
            output(&cli.format, &Record::ok(&report))?;
            if !report.is_consistent() {
                anyhow::bail!("stress run observed inconsistent reads");
            }
        }
    }

    Ok(())
}

fn output<T: Serialize + Display>(format: &OutputFormat, record: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(record)?),
        OutputFormat::Text => println!("{}", record),
    }
    Ok(())
}
