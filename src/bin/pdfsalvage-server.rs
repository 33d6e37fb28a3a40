//! HTTP service binary for pdfsalvage.
//!
//! Builds one shared `Pipeline` at startup and serves `POST /extract` and
//! `GET /health` until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use pdfsalvage::server::{router, DEFAULT_BODY_LIMIT_BYTES};
use pdfsalvage::{parse_strategy_list, ExtractionConfig, Pipeline, DEFAULT_SERVICE_MAX_PAGES};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve PDF text extraction over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsalvage-server",
    version,
    about = "Serve PDF text extraction over HTTP",
    color = clap::ColorChoice::Auto
)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PDFSALVAGE_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Read at most this many pages per document.
    #[arg(long, env = "PDFSALVAGE_MAX_PAGES", default_value_t = DEFAULT_SERVICE_MAX_PAGES)]
    max_pages: usize,

    /// Maximum request body size in bytes.
    #[arg(long, env = "PDFSALVAGE_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT_BYTES)]
    body_limit: usize,

    /// Download timeout for URL inputs, in seconds.
    #[arg(long, env = "PDFSALVAGE_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Comma-separated strategy order, e.g. pdfium,pdf-extract,lopdf.
    #[arg(long, env = "PDFSALVAGE_STRATEGIES")]
    strategies: Option<String>,

    /// Locale of the embedded despacing dictionary.
    #[arg(long, env = "PDFSALVAGE_LOCALE", conflicts_with = "dictionary")]
    locale: Option<String>,

    /// Custom dictionary JSON file (replaces the embedded one).
    #[arg(long, env = "PDFSALVAGE_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&args)?;
    let pipeline = Pipeline::new(&config).context("Failed to build extraction pipeline")?;
    info!(
        "Strategies [{}], max {} pages, body limit {} bytes",
        pipeline.strategy_names().join(", "),
        args.max_pages,
        args.body_limit
    );

    let app = router(pipeline, args.body_limit);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!("Listening on http://{}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Shut down");
    Ok(())
}

fn build_config(args: &Args) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .max_pages(args.max_pages)
        .download_timeout_secs(args.download_timeout);

    if let Some(ref list) = args.strategies {
        builder = builder.strategies(parse_strategy_list(list).context("Invalid --strategies")?);
    }
    if let Some(ref locale) = args.locale {
        builder = builder.locale(locale.clone());
    }
    if let Some(ref path) = args.dictionary {
        builder = builder.dictionary_path(path.clone());
    }
    if let Some(ref lib) = args.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }

    builder.build().context("Invalid configuration")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
