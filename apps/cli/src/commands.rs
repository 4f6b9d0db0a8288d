//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use pinedocs_core::{CrawlProgress, DocProcessor, ProgressReporter};
use pinedocs_markdown::SkipReason;
use pinedocs_shared::{AppConfig, CrawlConfig, ProcessedFile, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pinedocs: trim downloaded Pine Script documentation into compact Markdown.
#[derive(Parser)]
#[command(
    name = "pinedocs",
    version,
    about = "Clean downloaded Pine Script documentation pages into compact Markdown.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand; `process` when omitted.
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
    /// Clean every page in the input directory and write the combined file.
    Process {
        /// Input directory (defaults to `paths.input_dir` from the config).
        #[arg(short, long, env = "PINEDOCS_INPUT")]
        input: Option<String>,
    },

    /// Download the documentation site into the input directory.
    Crawl {
        /// Output directory (defaults to `paths.input_dir` from the config).
        #[arg(short, long)]
        out: Option<String>,

        /// Documentation root URL (defaults to `crawl.base_url`).
        #[arg(long)]
        base_url: Option<String>,
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
///
/// Logs go to stderr so they never mix with the progress lines on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pinedocs=warn",
        1 => "pinedocs=info",
        2 => "pinedocs=debug",
        _ => "pinedocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
    match cli.command.unwrap_or(Command::Process { input: None }) {
        Command::Process { input } => cmd_process(input.as_deref()),
        Command::Crawl { out, base_url } => cmd_crawl(out.as_deref(), base_url.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// process
// ---------------------------------------------------------------------------

fn cmd_process(input: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let input_dir = PathBuf::from(input.unwrap_or(&config.paths.input_dir));

    info!(input = %input_dir.display(), "processing documentation pages");

    let processor = DocProcessor::new(&input_dir, &config.paths.output_subdir)?;
    info!(output = %processor.output_dir().display(), "writing processed pages");
    let summary = processor.process_all(&ConsoleProgress)?;

    info!(
        processed = summary.processed.len(),
        skipped = summary.skipped.len(),
        combined = %summary.combined_path.display(),
        "processing finished"
    );

    Ok(())
}

/// Prints one console line per processing step.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn listing(&self, input_dir: &Path, entries: &[String]) {
        println!("Looking for files in: {}", input_dir.display());
        println!("Found files: {entries:?}");
    }

    fn processing(&self, filename: &str) {
        println!("Processing file: {filename}");
    }

    fn processed(&self, file: &ProcessedFile) {
        println!("Successfully processed: {}", file.output_name);
    }

    fn skipped(&self, filename: &str, _reason: SkipReason) {
        println!("Skipped file: {filename} (no valid content found)");
    }
}

// ---------------------------------------------------------------------------
// crawl
// ---------------------------------------------------------------------------

async fn cmd_crawl(out: Option<&str>, base_url: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let mut crawl_config = CrawlConfig::from(&config);
    if let Some(url) = base_url {
        crawl_config.base_url = url.trim_end_matches('/').to_string();
    }
    crawl_config.validate()?;

    let output_dir = PathBuf::from(out.unwrap_or(&config.paths.input_dir));

    info!(
        base_url = %crawl_config.base_url,
        out = %output_dir.display(),
        "crawling documentation"
    );

    let reporter = CliProgress::new();
    let summary = pinedocs_core::crawl_docs(&crawl_config, &output_dir, &reporter).await?;
    reporter.finish();

    if summary.pages_found == 0 {
        return Err(eyre!(
            "no documentation pages found at {}",
            crawl_config.start_url()
        ));
    }

    println!();
    println!("  Crawling completed!");
    println!("  Found:     {}", summary.pages_found);
    println!("  Saved:     {}", summary.succeeded);
    println!("  Failed:    {}", summary.failed);
    if let Some(path) = &summary.combined_path {
        println!("  Combined:  {}", path.display());
    }
    if let Some(path) = &summary.failed_path {
        println!("  Failures:  {}", path.display());
    }
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// CLI crawl reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl CrawlProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_saved(&self, page: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Crawling [{current}/{total}] {page}"));
    }

    fn page_failed(&self, url: &str, error: &str) {
        self.spinner.println(format!("Failed to crawl {url}: {error}"));
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
