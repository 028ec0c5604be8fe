//! CLI command definitions, routing, and tracing setup.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use contentgate_extractor::{BatchProgress, Extractor};
use contentgate_quality::QualityValidator;
use contentgate_shared::{AppConfig, ExtractorConfig, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// contentgate: extract readable text from URLs and grade its quality.
#[derive(Parser)]
#[command(
    name = "contentgate",
    version,
    about = "Extract readable text from web pages and score its quality.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.contentgate/contentgate.toml.
    #[arg(long, env = "CONTENTGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// URLs from positional args and/or a file.
#[derive(clap::Args)]
pub(crate) struct UrlArgs {
    /// URLs to fetch.
    urls: Vec<String>,

    /// File with one URL per line (blank lines and `#` comments ignored).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum URLs in flight (defaults to the configured concurrency).
    #[arg(short, long)]
    concurrency: Option<usize>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract text from URLs and print `{url: content|null}` as JSON.
    Extract(UrlArgs),

    /// Score text read from a file (or stdin) as if fetched from URL.
    Validate {
        /// Source URL used for domain trust scoring.
        #[arg(long)]
        url: String,

        /// Text file to validate; reads stdin when omitted.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Extract, validate, and summarize in one pass.
    Run(UrlArgs),

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

/// Initialize tracing based on CLI flags. Logs always go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentgate=info",
        1 => "contentgate=debug",
        _ => "contentgate=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Extract(args) => cmd_extract(config_path, &args).await,
        Command::Validate { url, file } => cmd_validate(config_path, &url, file.as_deref()),
        Command::Run(args) => cmd_run(config_path, &args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

fn build_extractor(config: &AppConfig) -> Result<Extractor> {
    let extractor_config = ExtractorConfig::from(config);
    if !extractor_config.remote_render_enabled() {
        info!(
            env = %config.extractor.render_api_key_env,
            "render key not set, remote-render tier disabled"
        );
    }
    Ok(Extractor::new(&extractor_config)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_extract(config_path: Option<&Path>, args: &UrlArgs) -> Result<()> {
    let config = resolve_config(config_path)?;
    let urls = collect_urls(args)?;
    let extractor = build_extractor(&config)?;
    let concurrency = args.concurrency.unwrap_or(extractor.concurrency());

    info!(urls = urls.len(), concurrency, "extracting");

    let results = extractor.extract_batch(&urls, concurrency).await;
    let stats = extractor.stats();
    info!(
        total = stats.total_attempts,
        succeeded = stats.succeeded,
        failed = stats.failed,
        success_rate = stats.success_rate,
        "extraction stats"
    );

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn cmd_validate(config_path: Option<&Path>, url: &str, file: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;

    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            buf
        }
    };

    let validator = QualityValidator::new(config.quality);
    let report = validator.validate(&content, url);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn cmd_run(config_path: Option<&Path>, args: &UrlArgs) -> Result<()> {
    let config = resolve_config(config_path)?;
    let urls = collect_urls(args)?;
    let extractor = build_extractor(&config)?;
    let validator = QualityValidator::new(config.quality.clone());
    let concurrency = args.concurrency.unwrap_or(extractor.concurrency());

    info!(urls = urls.len(), concurrency, "running extraction and validation");

    let progress = CliProgress::new();
    let outcomes = extractor
        .extract_batch_outcomes(&urls, concurrency, &progress)
        .await;
    progress.finish();

    let extracted: HashMap<String, Option<String>> = outcomes
        .into_iter()
        .map(|(url, outcome)| (url, outcome.content))
        .collect();
    let reports = validator.validate_extracted(&extracted);
    let summary = validator.summarize(&reports);

    info!(
        validated = summary.total_validated,
        valid = summary.valid_count,
        average_score = summary.average_score,
        "run complete"
    );

    let output = serde_json::json!({
        "reports": reports,
        "summary": summary,
        "stats": extractor.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
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
// Input helpers
// ---------------------------------------------------------------------------

/// Positional URLs followed by those from `--input`, in order.
fn collect_urls(args: &UrlArgs) -> Result<Vec<String>> {
    let mut urls = args.urls.clone();
    if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read URL list '{}'", path.display()))?;
        urls.extend(parse_url_list(&text));
    }
    if urls.is_empty() {
        return Err(eyre!("no URLs given: pass them as arguments or with --input"));
    }
    Ok(urls)
}

fn parse_url_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Batch progress bar on stderr.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchProgress for CliProgress {
    fn url_finished(&self, url: &str, success: bool, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        let mark = if success { "ok" } else { "failed" };
        self.bar.set_message(format!("{mark} {url}"));
    }
}
