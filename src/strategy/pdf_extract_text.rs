//! Content-stream interpretation via `pdf-extract`.
//!
//! `pdf-extract` decodes the whole document in one call and panics on some
//! malformed inputs, so the call is wrapped in `catch_unwind` and a panic is
//! reported as an open failure. It exposes no per-page error isolation and
//! no document info.

use super::{join_pages, ExtractionStrategy, RawExtraction, StrategyOptions};
use crate::error::ExtractionError;
use crate::output::DocumentInfo;
use crate::pipeline::input::{PdfSource, SourceView};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

const NAME: &str = "pdf-extract";

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractStrategy;

impl ExtractionStrategy for PdfExtractStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(
        &self,
        source: &PdfSource,
        options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        let view = source.view();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match view {
            SourceView::Bytes(bytes) => pdf_extract::extract_text_from_mem_by_pages(bytes),
            SourceView::File(path) => pdf_extract::extract_text_by_pages(path),
        }));

        let mut pages = match outcome {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(ExtractionError::OpenError {
                    strategy: NAME.to_string(),
                    detail: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ExtractionError::OpenError {
                    strategy: NAME.to_string(),
                    detail: "backend panicked while parsing the document".into(),
                })
            }
        };

        let page_count = pages.len();
        pages.truncate(options.page_limit(page_count));
        debug!("pdf-extract: {} pages, keeping {}", page_count, pages.len());

        Ok(RawExtraction {
            text: join_pages(&pages),
            page_count,
            pages_processed: pages.len(),
            skipped_pages: Vec::new(),
            info: DocumentInfo::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_document_is_open_error_not_panic() {
        let src = PdfSource::from_bytes(b"%PDF-1.7\n1 0 obj\n<<".to_vec(), "broken.pdf").unwrap();
        let err = PdfExtractStrategy
            .extract(&src, &StrategyOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::OpenError { .. }), "{err:?}");
        assert_eq!(PdfExtractStrategy.name(), "pdf-extract");
    }
}
