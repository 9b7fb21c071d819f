use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use tally_core::EnrichedTransaction;
use tally_enrich::Enricher;
use tally_ingest::source_for_path;

mod auth;
mod classifier;
mod commands;
mod config;
mod state;

use classifier::LlmClassifier;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Transaction enrichment and categorization routing")]
struct Cli {
    /// Log verbosity (overridden by RUST_LOG): off, error, warn, info, debug, trace
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich every transaction in a CSV/JSON file and print JSON
    Enrich {
        #[arg(long)]
        input: PathBuf,

        /// One pretty JSON array instead of JSON lines
        #[arg(long)]
        pretty: bool,
    },

    /// Print the routing decision per transaction (rule category or escalate)
    Route {
        #[arg(long)]
        input: PathBuf,
    },

    /// Categorize: rules locally, escalated transactions via the external classifier
    Classify {
        #[arg(long)]
        input: PathBuf,

        /// Print the classifier context instead of calling the classifier
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store classifier API keys in ~/.tally/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config and enrichment tables
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    PasteOpenaiApiKey,
    PasteAnthropicToken,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Enrich { input, pretty } => {
            let (_, records) = load_and_enrich(&config::load_config()?, &input)?;
            commands::write_enriched(&mut out, &records, pretty)?;
        }

        Command::Route { input } => {
            let (enricher, records) = load_and_enrich(&config::load_config()?, &input)?;
            commands::write_routes(&mut out, &enricher, &records)?;
        }

        Command::Classify { input, dry_run } => {
            let cfg = config::load_config()?;
            let (enricher, records) = load_and_enrich(&cfg, &input)?;
            let outcomes = if dry_run {
                commands::classify_batch::<LlmClassifier>(&enricher, records, None).await
            } else {
                let auth = auth::load_auth()?;
                let classifier = LlmClassifier::from_config(&cfg.classifier, &auth)?;
                commands::classify_batch(&enricher, records, Some(&classifier)).await
            };
            commands::write_outcomes(&mut out, &outcomes)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                writeln!(out, "# {}", config::config_path()?.display())?;
                writeln!(out, "{}", toml::to_string_pretty(&cfg).context("serialize config")?)?;
                writeln!(out, "# enrichment tables")?;
                writeln!(out, "{}", cfg.enrichment_tables()?.to_toml_string()?)?;
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
            AuthCommand::PasteAnthropicToken => auth::anthropic_paste_token()?,
        },
    }

    out.flush()?;
    Ok(())
}

fn load_and_enrich(
    cfg: &config::Config,
    input: &Path,
) -> Result<(Enricher, Vec<EnrichedTransaction>)> {
    if !input.exists() {
        bail!("input not found: {}", input.display());
    }

    let enricher = Enricher::new(&cfg.enrichment_tables()?)?;

    let source = source_for_path(input)?;
    debug!(source = %source.describe(), "fetching transactions");
    let txns = source
        .fetch()
        .with_context(|| format!("loading {}", input.display()))?;
    info!(count = txns.len(), "loaded transactions");

    let records = enricher.enrich_all(&txns);
    Ok((enricher, records))
}

/// Initializes the tracing subscriber. Logs go to stderr so stdout stays parseable.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // default level for the tally crates only
        None => EnvFilter::new(format!(
            "tally={level},tally_core={level},tally_ingest={level},tally_enrich={level}"
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
