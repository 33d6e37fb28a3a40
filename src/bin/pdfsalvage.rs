//! CLI binary for pdfsalvage.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints the JSON result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsalvage::{
    parse_strategy_list, write_json_atomic, AttemptOutcome, ExtractionConfig, ExtractionObserver,
    ExtractionResult, PageError, Pipeline,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner naming the strategy being tried, with one
/// log line per fallback and skipped page.
struct CliObserver {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl ExtractionObserver for CliObserver {
    fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
        self.bar
            .set_message(format!("trying {} ({index}/{total})", bold(strategy)));
    }

    fn on_strategy_failed(&self, strategy: &str, outcome: AttemptOutcome, detail: &str) {
        let label = match outcome {
            AttemptOutcome::Unavailable => "unavailable",
            AttemptOutcome::Empty => "no text",
            _ => "failed",
        };
        let msg = if detail.chars().count() > 80 {
            format!("{}\u{2026}", detail.chars().take(79).collect::<String>())
        } else {
            detail.to_string()
        };
        self.bar.println(format!(
            "  {} {:<12} {}  {}",
            red("✗"),
            strategy,
            red(label),
            dim(&msg)
        ));
    }

    fn on_page_skipped(&self, _strategy: &str, error: &PageError) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!("  {} {}", dim("·"), dim(&error.to_string())));
    }

    fn on_selected(&self, strategy: &str, pages_processed: usize, page_count: usize) {
        self.bar.println(format!(
            "  {} {:<12} {}/{} pages",
            green("✓"),
            strategy,
            pages_processed,
            page_count
        ));
    }

    fn on_complete(&self, result: &ExtractionResult) {
        self.bar.finish_and_clear();
        if result.success {
            let skipped = self.skipped.load(Ordering::SeqCst);
            eprintln!(
                "{} {} chars from {}/{} pages via {}{}",
                green("✔"),
                bold(&result.text.chars().count().to_string()),
                result.pages_processed,
                result.page_count,
                bold(&result.method),
                if skipped > 0 {
                    format!("  ({skipped} pages skipped)")
                } else {
                    String::new()
                }
            );
        } else {
            eprintln!(
                "{} {}",
                red("✘"),
                red(result.error.as_deref().unwrap_or("extraction failed"))
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a local file (JSON on stdout)
  pdfsalvage document.pdf

  # Only the first 20 pages, result also written to a file
  pdfsalvage --max-pages 20 document.pdf -o result.json

  # Skip pdfium, try pdf-extract then lopdf
  pdfsalvage --strategies pdf-extract,lopdf document.pdf

  # Extract from a URL
  pdfsalvage https://example.org/report.pdf

  # Raw backend text, no repair
  pdfsalvage --no-repair document.pdf

  # Page count and document info only
  pdfsalvage --inspect document.pdf

STRATEGIES:
  pdfium        richest layout; needs libpdfium at runtime
  pdf-extract   pure Rust, font-aware
  lopdf         pure Rust, always available

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH          Path to an existing libpdfium
  PDFSALVAGE_STRATEGIES    Default strategy order
  PDFSALVAGE_LOCALE        Despacing dictionary locale (default pt-BR)
  RUST_LOG                 Overrides the log filter
"#;

/// Extract readable text from PDF files and URLs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsalvage",
    version,
    about = "Extract readable text from PDF files and URLs",
    long_about = "Extract text from PDF documents (local files or URLs) by trying several \
extraction backends in order, keeping the first that yields text, and repairing common \
text-layer damage: mojibake, ligatures, broken spacing and letter-by-letter words.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Also write the JSON result to this file.
    #[arg(short, long, env = "PDFSALVAGE_OUTPUT")]
    output: Option<PathBuf>,

    /// Read at most this many pages (default: all).
    #[arg(long, env = "PDFSALVAGE_MAX_PAGES",
          value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Comma-separated strategy order, e.g. pdfium,pdf-extract,lopdf.
    #[arg(long, env = "PDFSALVAGE_STRATEGIES")]
    strategies: Option<String>,

    /// Locale of the embedded despacing dictionary.
    #[arg(long, env = "PDFSALVAGE_LOCALE", conflicts_with = "dictionary")]
    locale: Option<String>,

    /// Custom dictionary JSON file (replaces the embedded one).
    #[arg(long, env = "PDFSALVAGE_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Return the backend text without repair.
    #[arg(long, env = "PDFSALVAGE_NO_REPAIR")]
    no_repair: bool,

    /// Single-line JSON instead of pretty-printed.
    #[arg(long, env = "PDFSALVAGE_COMPACT")]
    compact: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSALVAGE_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFSALVAGE_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Print page count and document info only, no extraction.
    #[arg(long)]
    inspect: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSALVAGE_VERBOSE")]
    verbose: bool,

    /// Suppress everything on stderr except errors.
    #[arg(short, long, env = "PDFSALVAGE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say; keep them out of its way.
    let show_progress = !cli.quiet && !cli.verbose && !cli.inspect;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli, show_progress)?;
    let pipeline = Pipeline::new(&config).context("Invalid configuration")?;

    // ── Inspect mode ─────────────────────────────────────────────────────
    if cli.inspect {
        let inspection = pipeline
            .inspect(&cli.input)
            .await
            .context("Failed to inspect PDF")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&inspection).context("Failed to serialise inspection")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    // ── Run extraction ───────────────────────────────────────────────────
    let result = ExtractionResult::from_outcome(pipeline.extract(&cli.input).await);

    let json = if cli.compact {
        serde_json::to_string(&result)
    } else {
        serde_json::to_string_pretty(&result)
    }
    .context("Failed to serialise result")?;
    println!("{json}");

    if let Some(ref output_path) = cli.output {
        write_json_atomic(output_path, &result, !cli.compact)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!("   {} {}", dim("→"), bold(&output_path.display().to_string()));
        }
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .repair(!cli.no_repair)
        .download_timeout_secs(cli.download_timeout);

    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(usize::try_from(n).context("--max-pages is too large")?);
    }
    if let Some(ref list) = cli.strategies {
        builder = builder.strategies(parse_strategy_list(list).context("Invalid --strategies")?);
    }
    if let Some(ref locale) = cli.locale {
        builder = builder.locale(locale.clone());
    }
    if let Some(ref path) = cli.dictionary {
        builder = builder.dictionary_path(path.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if show_progress {
        builder = builder.observer(CliObserver::new());
    }

    builder.build().context("Invalid configuration")
}
