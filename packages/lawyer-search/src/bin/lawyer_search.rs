//! Lawyer search CLI
//!
//! `ingest` scrapes a URL list into a JSON profile store. `query` filters the
//! store against search terms read from the terminal until `exit`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lawyer_search::session::{EXIT_WORD, PROMPT};
use lawyer_search::{
    ingest, read_url_list, run_session, write_report, Config, Evaluator, Judge, LineInput,
    LlmChatModel, ParseMode, ProfileStore, QueryInput, QueryRunner,
};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,lawyer_search=debug,reqwest=warn";

#[derive(Parser)]
#[command(name = "lawyer-search")]
#[command(about = "Scrape lawyer profiles and search them by free-text criteria")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every URL and write the profile store
    Ingest {
        /// URL list (one per line or first CSV column)
        #[arg(long, env = "LAWYER_URLS", default_value = "lawyers.csv")]
        urls: PathBuf,

        /// Where to write the profile store
        #[arg(long, env = "LAWYER_PROFILES", default_value = "lawyer_profiles.json")]
        out: PathBuf,
    },

    /// Search profiles interactively
    Query(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Profile store written by `ingest`
    #[arg(long, env = "LAWYER_PROFILES", default_value = "lawyer_profiles.json")]
    profiles: PathBuf,

    /// Fetch profiles from this URL list instead of reading the store
    #[arg(long, conflicts_with = "profiles")]
    urls: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = StrategyArg::Substring)]
    strategy: StrategyArg,

    /// How to read the judge's answer tags
    #[arg(long, value_enum, default_value_t = ParseArg::First)]
    parse: ParseArg,

    /// Scan at most this many profiles per query
    #[arg(long)]
    limit: Option<usize>,

    /// Profiles evaluated at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Run a single query and exit
    #[arg(long)]
    once: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Substring,
    Judge,
}

#[derive(Clone, Copy, ValueEnum)]
enum ParseArg {
    First,
    Last,
}

impl From<ParseArg> for ParseMode {
    fn from(arg: ParseArg) -> Self {
        match arg {
            ParseArg::First => ParseMode::FirstOccurrence,
            ParseArg::Last => ParseMode::LastBlock,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Ingest { urls, out } => run_ingest(&config, urls, out).await,
        Commands::Query(args) => run_query(&config, args).await,
    }
}

async fn run_ingest(config: &Config, urls: PathBuf, out: PathBuf) -> Result<()> {
    let store = fetch_store(config, &urls).await?;
    store
        .save(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "Processed {} profiles and stored them in {}",
        store.len(),
        out.display()
    );
    Ok(())
}

async fn fetch_store(config: &Config, urls: &Path) -> Result<ProfileStore> {
    let urls = read_url_list(urls)
        .with_context(|| format!("Failed to read URL list {}", urls.display()))?;
    let fetcher = config.http_fetcher()?;
    let report = ingest(&fetcher, &urls).await;

    if !report.blocked.is_empty() || !report.failed.is_empty() {
        eprintln!(
            "{}",
            format!(
                "Skipped {} blocked and {} failed URLs",
                report.blocked.len(),
                report.failed.len()
            )
            .yellow()
        );
    }
    Ok(report.store)
}

async fn run_query(config: &Config, args: QueryArgs) -> Result<()> {
    let evaluator = match args.strategy {
        StrategyArg::Substring => Evaluator::substring(),
        StrategyArg::Judge => {
            let model = LlmChatModel::new(config.llm_client()?).with_model(&config.llm_model);
            Evaluator::judge(Judge::new(Arc::new(model)).with_parse_mode(args.parse.into()))
        }
    };

    let store = match &args.urls {
        Some(urls) => fetch_store(config, urls).await?,
        None => ProfileStore::load(&args.profiles)
            .with_context(|| format!("Failed to load profiles from {}", args.profiles.display()))?,
    };

    let runner = QueryRunner::new(store, evaluator)
        .with_scan_limit(args.limit)
        .with_concurrency(args.concurrency);

    let mut out = io::stdout();
    let mut status = io::stderr();

    if let Some(query) = args.once {
        write_report(&runner.run(&query).await, &mut out, &mut status)?;
        return Ok(());
    }

    let mut input: Box<dyn QueryInput> = if io::stdin().is_terminal() {
        Box::new(TerminalInput)
    } else {
        Box::new(LineInput::new(io::stdin().lock()))
    };
    run_session(&runner, input.as_mut(), &mut out, &mut status).await?;

    Ok(())
}

/// Prompts with dialoguer when stdin is a terminal.
struct TerminalInput;

impl QueryInput for TerminalInput {
    fn next_query(&mut self) -> io::Result<Option<String>> {
        let query: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} ('{}' to quit)", PROMPT, EXIT_WORD))
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;
        Ok(Some(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_default_log_filter_traces_own_crate() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert!(DEFAULT_LOG_FILTER
            .split(',')
            .any(|directive| directive == "lawyer_search=debug"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_profiles_and_urls_conflict() {
        let parsed = Cli::try_parse_from([
            "lawyer-search",
            "query",
            "--profiles",
            "p.json",
            "--urls",
            "u.csv",
        ]);
        assert!(parsed.is_err());
    }
}
