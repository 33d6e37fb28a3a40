//! Extraction strategies: one backend each, tried in order by the selector.
//!
//! ## Why a synchronous trait?
//!
//! Every backend here is CPU-bound and at least one (pdfium) wraps a C library
//! with thread-local state. Strategies are therefore plain blocking code; the
//! async facade moves the whole selection onto `spawn_blocking` once instead
//! of once per backend.
//!
//! ## Capabilities
//!
//! Which backends exist is decided twice:
//!
//! * at compile time by cargo features (`pdfium`, `pdf-extract`); `lopdf` is
//!   always built in, and
//! * at run time by the strategy itself: pdfium reports
//!   [`ExtractionError::CapabilityUnavailable`] when the native library cannot
//!   be bound, and the selector moves on.

use crate::error::{ExtractionError, PageError};
use crate::output::DocumentInfo;
use crate::pipeline::input::PdfSource;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
pub(crate) mod fixture;
mod lopdf_text;
#[cfg(feature = "pdf-extract")]
mod pdf_extract_text;
#[cfg(feature = "pdfium")]
mod pdfium_text;

pub use lopdf_text::LopdfStrategy;
#[cfg(feature = "pdf-extract")]
pub use pdf_extract_text::PdfExtractStrategy;
#[cfg(feature = "pdfium")]
pub use pdfium_text::PdfiumStrategy;

/// Per-invocation knobs passed to every strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyOptions {
    /// Read at most this many pages, starting from the first.
    pub max_pages: Option<usize>,
    /// User password for encrypted PDFs (pdfium and lopdf; pdf-extract ignores it).
    pub password: Option<String>,
}

impl StrategyOptions {
    /// Number of pages to read from a document with `total` pages.
    pub fn page_limit(&self, total: usize) -> usize {
        self.max_pages.map_or(total, |cap| cap.min(total))
    }
}

/// What a strategy hands back: text plus the counts the result reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    /// Page texts joined by `\n`; may be empty or whitespace-only.
    pub text: String,
    /// True page count of the document, regardless of the cap.
    pub page_count: usize,
    /// Pages successfully decoded (≤ min(cap, page_count)).
    pub pages_processed: usize,
    /// Pages that failed to decode and were left out of `text`.
    pub skipped_pages: Vec<PageError>,
    pub info: DocumentInfo,
}

impl RawExtraction {
    /// Whether the text has anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// One text-extraction backend.
///
/// Implementations must be stateless between calls: the same strategy object
/// is shared by every invocation of a pipeline, possibly concurrently.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable identifier reported as `method` in results.
    fn name(&self) -> &str;

    /// Read up to `options.max_pages` pages of `source`.
    ///
    /// A page that fails to decode is recorded in
    /// [`RawExtraction::skipped_pages`], not returned as an error.
    fn extract(
        &self,
        source: &PdfSource,
        options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError>;
}

/// Built-in strategies, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Layout-aware extraction via the pdfium C library.
    Pdfium,
    /// Content-stream interpretation via `pdf-extract`.
    PdfExtract,
    /// Per-page text operators via `lopdf`; pure Rust.
    Lopdf,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Pdfium,
        StrategyKind::PdfExtract,
        StrategyKind::Lopdf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Pdfium => "pdfium",
            StrategyKind::PdfExtract => "pdf-extract",
            StrategyKind::Lopdf => "lopdf",
        }
    }

    /// Whether this backend was compiled into the binary.
    pub fn is_compiled(self) -> bool {
        match self {
            StrategyKind::Pdfium => cfg!(feature = "pdfium"),
            StrategyKind::PdfExtract => cfg!(feature = "pdf-extract"),
            StrategyKind::Lopdf => true,
        }
    }

    /// Compiled-in strategies, richest first.
    pub fn default_order() -> Vec<StrategyKind> {
        Self::ALL.into_iter().filter(|k| k.is_compiled()).collect()
    }

    /// Instantiate the backend. `None` when it was compiled out.
    pub fn build(
        self,
        #[allow(unused_variables)] pdfium_library: Option<&std::path::Path>,
    ) -> Option<Box<dyn ExtractionStrategy>> {
        match self {
            #[cfg(feature = "pdfium")]
            StrategyKind::Pdfium => Some(Box::new(PdfiumStrategy::new(
                pdfium_library.map(|p| p.to_path_buf()),
            ))),
            #[cfg(feature = "pdf-extract")]
            StrategyKind::PdfExtract => Some(Box::new(PdfExtractStrategy)),
            StrategyKind::Lopdf => Some(Box::new(LopdfStrategy)),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdfium" => Ok(StrategyKind::Pdfium),
            "pdf-extract" | "pdf_extract" | "pdfextract" => Ok(StrategyKind::PdfExtract),
            "lopdf" => Ok(StrategyKind::Lopdf),
            other => Err(format!(
                "unknown strategy '{}' (expected one of: pdfium, pdf-extract, lopdf)",
                other
            )),
        }
    }
}

/// Join page texts the way every backend reports them.
pub(crate) fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_caps_at_total() {
        let opts = StrategyOptions {
            max_pages: Some(20),
            ..Default::default()
        };
        assert_eq!(opts.page_limit(50), 20);
        assert_eq!(opts.page_limit(3), 3);
        assert_eq!(StrategyOptions::default().page_limit(7), 7);
    }

    #[test]
    fn kind_round_trips_through_name() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!(
            "PDF_EXTRACT".parse::<StrategyKind>().unwrap(),
            StrategyKind::PdfExtract
        );
        assert!("pypdf2".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn default_order_ends_with_lopdf() {
        let order = StrategyKind::default_order();
        assert_eq!(order.last(), Some(&StrategyKind::Lopdf));
        assert!(order.iter().all(|k| k.is_compiled()));
        if cfg!(feature = "pdfium") {
            assert_eq!(order.first(), Some(&StrategyKind::Pdfium));
        }
    }

    #[test]
    fn build_matches_compiled_set() {
        for kind in StrategyKind::ALL {
            let built = kind.build(None);
            assert_eq!(built.is_some(), kind.is_compiled());
            if let Some(s) = built {
                assert_eq!(s.name(), kind.name());
            }
        }
    }

    #[test]
    fn join_pages_terminates_each_page() {
        assert_eq!(join_pages(&["a".into(), "".into(), "c".into()]), "a\n\nc\n");
        assert_eq!(join_pages(&[]), "");
    }
}
