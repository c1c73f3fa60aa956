//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use blogdraft_core::{PipelineOptions, ProgressReporter, RunReport, run_pipeline};
use blogdraft_llm::{OpenAiClient, OpenAiClientConfig};
use blogdraft_notion::{NotionClient, NotionClientConfig};
use blogdraft_search::SearchClient;
use blogdraft_shared::{
    AppConfig, init_config, init_config_at, load_config, load_config_from,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// blogdraft: write blog drafts for unwritten Notion rows.
#[derive(Parser)]
#[command(
    name = "blogdraft",
    version,
    about = "Generate Naver blog drafts for unwritten rows of a Notion database.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.blogdraft/blogdraft.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Draft and write back every unwritten row, then exit.
    Run,

    /// Print the top blog search summaries for a query.
    Search {
        /// Search terms.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "blogdraft=info",
        1 => "blogdraft=debug",
        _ => "blogdraft=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run(config_path).await,
        Command::Search { query } => cmd_search(config_path, &query.join(" ")).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config_path: Option<&Path>) -> Result<()> {
    let config = &resolve_config(config_path)?;

    // Both clients are built up front so a missing secret fails before any request.
    let store = NotionClient::new(NotionClientConfig::from_env(&config.notion)?)?;
    let llm = OpenAiClient::new(OpenAiClientConfig::from_env(&config.openai)?)?;
    let options = PipelineOptions::from(config);

    info!(
        model = %options.model,
        delay_ms = options.delay.as_millis(),
        chunk_size = options.chunk_size,
        "starting pipeline"
    );

    let reporter = CliProgress::new();
    let report = run_pipeline(&store, &llm, &options, &reporter).await?;

    println!();
    println!("  Fetched: {}", report.fetched);
    println!("  Written: {}", report.written);
    println!("  Skipped: {}", report.skipped);
    println!("  Failed:  {}", report.failures.len());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if !report.is_clean() {
        return Err(eyre!(
            "{} row(s) failed; they stay unwritten and will be retried on the next run",
            report.failures.len()
        ));
    }

    Ok(())
}

async fn cmd_search(config_path: Option<&Path>, query: &str) -> Result<()> {
    let config = resolve_config(config_path)?;
    let client = SearchClient::new(&config.search)?;
    let summaries = client.search_summaries(query).await?;

    if summaries.is_empty() {
        println!("No blog results for '{query}'.");
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", summary.display());
        println!();
    }

    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => {
            init_config_at(p)?;
            p.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn row_started(&self, label: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Drafting [{current}/{total}] {label}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
