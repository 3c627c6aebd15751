//! OpLang CLI
//!
//! Runs OpLang queries, variable lookups, annotation queries and health
//! checks against a backend from the terminal, using the same adapter the
//! gateway serves.

mod commands;
mod config;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{events, health, query, symbols, vars, TimeArgs};
use oplang_lib::DataSource;

/// OpLang CLI
#[derive(Parser)]
#[command(name = "oplang")]
#[command(author, version, about = "CLI for querying OpLang backends", long_about = None)]
pub struct Cli {
    /// Backend base URL (can also be set via OPLANG_URL env var)
    #[arg(long, env = "OPLANG_URL")]
    pub url: Option<String>,

    /// API key for the execute endpoint
    #[arg(long, env = "OPLANG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a time-series query
    Query {
        /// Resource expression (e.g., host)
        #[arg(long, short)]
        resource: Option<String>,

        /// Metric expression (e.g., cpu_usage)
        #[arg(long, short)]
        metric: Option<String>,

        /// Raw OpLang statement instead of --resource/--metric
        #[arg(long, short, conflicts_with_all = ["resource", "metric"])]
        custom: Option<String>,

        #[command(flatten)]
        time: TimeArgs,

        /// Template variable as name=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// List the values a variable statement produces
    Vars {
        /// Resource statement or `list <kind>`
        statement: String,

        /// Template variable as name=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// Show annotation events
    Events {
        /// Event expression (e.g., events)
        expr: String,

        #[command(flatten)]
        time: TimeArgs,
    },

    /// List symbols of a kind (e.g., metrics, resources)
    Symbols {
        kind: String,
    },

    /// Check backend connectivity
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let settings = config::Config::load()?.settings(
        cli.url,
        cli.api_key,
        Duration::from_secs(cli.timeout),
    )?;
    let datasource = DataSource::connect(&settings)?;

    match cli.command {
        Commands::Query {
            resource,
            metric,
            custom,
            time,
            vars,
        } => {
            let target = query::target(resource, metric, custom)?;
            let scope = commands::parse_vars(&vars)?;
            query::run_query(&datasource, target, time.range()?, scope, cli.format).await?;
        }
        Commands::Vars {
            statement,
            vars: var_flags,
        } => {
            let scope = commands::parse_vars(&var_flags)?;
            vars::find_values(&datasource, &statement, scope, cli.format).await?;
        }
        Commands::Events { expr, time } => {
            events::show_events(&datasource, &expr, time.range()?, cli.format).await?;
        }
        Commands::Symbols { kind } => {
            symbols::list_symbols(&datasource, &kind, cli.format).await?;
        }
        Commands::Health => {
            health::check(&datasource, cli.format).await?;
        }
    }

    Ok(())
}
