//! # pdfsalvage
//!
//! Extract readable text from PDFs of unknown internal quality.
//!
//! ## Why this crate?
//!
//! No single PDF text extractor handles every file: one chokes on a broken
//! xref table, another returns nothing for a font it cannot map, a third
//! panics. And when extraction does succeed, the text layer itself is often
//! damaged (mojibake, ligature code points, words printed letter by letter).
//! This crate tries several extraction backends in a fixed preference order,
//! keeps the first one that produces real text, and runs a deterministic
//! repair pass over the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file, in-memory buffer, or download from URL
//!  ├─ 2. Select   pdfium → pdf-extract → lopdf, first non-empty text wins
//!  ├─ 3. Repair   encoding, ligatures, whitespace, punctuation, bullets,
//!  │              dictionary-driven letter despacing
//!  └─ 4. Output   text + page counts + winning method + document info
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsalvage::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let result = extract("document.pdf", &config).await?;
//!     println!("{}", result.text);
//!     eprintln!("{} of {} pages via {}",
//!         result.pages_processed,
//!         result.page_count,
//!         result.method);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature       | Default | Description |
//! |---------------|---------|-------------|
//! | `pdfium`      | on      | pdfium strategy (needs `libpdfium` at runtime) |
//! | `pdf-extract` | on      | pdf-extract strategy |
//! | `cli`         | on      | `pdfsalvage` binary (clap + anyhow + indicatif) |
//! | `server`      | on      | `pdfsalvage-server` binary (axum + tower-http) |
//!
//! The `lopdf` strategy is always compiled. Library-only users can drop the
//! binaries and native backends:
//! ```toml
//! pdfsalvage = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod observer;
pub mod output;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod strategy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    parse_strategy_list, ExtractionConfig, ExtractionConfigBuilder, DEFAULT_DOWNLOAD_TIMEOUT_SECS,
    DEFAULT_SERVICE_MAX_PAGES,
};
pub use error::{AttemptFailure, ExtractionError, PageError, RepairError, SalvageError};
pub use extract::{
    extract, extract_from_bytes, extract_sync, extract_to_file, inspect, write_json_atomic,
    Pipeline, PipelineBuilder,
};
pub use observer::{ExtractionObserver, NoopObserver, Observer};
pub use output::{
    AttemptOutcome, AttemptRecord, DocumentInfo, ExtractionResult, Inspection, ResultMetadata,
};
pub use pipeline::input::PdfSource;
pub use pipeline::repair::{LocaleDictionary, RepairPass, RepairRule, TextRepairer};
pub use strategy::{ExtractionStrategy, RawExtraction, StrategyKind, StrategyOptions};
