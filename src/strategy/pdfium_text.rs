//! Layout-aware extraction via the pdfium C library.
//!
//! ## Binding the library
//!
//! `pdfium-render` loads `libpdfium` dynamically. The strategy binds once per
//! call, in this order:
//!
//! 1. the configured library path, else `PDFIUM_LIB_PATH`,
//! 2. a platform library next to the working directory (`./libpdfium.so` etc.),
//! 3. the system library search path.
//!
//! If none binds, the strategy reports itself unavailable and the selector
//! moves on; a missing native library is never fatal.

use super::{join_pages, ExtractionStrategy, RawExtraction, StrategyOptions};
use crate::error::{ExtractionError, PageError};
use crate::output::DocumentInfo;
use crate::pipeline::input::{PdfSource, SourceView};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

const NAME: &str = "pdfium";

/// Environment variable naming the pdfium shared library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

#[derive(Debug, Clone, Default)]
pub struct PdfiumStrategy {
    library_path: Option<PathBuf>,
}

impl PdfiumStrategy {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, ExtractionError> {
        let explicit = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => Pdfium::bind_to_library(&path).map_err(|e| {
                unavailable(format!("cannot load '{}': {:?}", path.display(), e))
            })?,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| unavailable(format!("libpdfium not found: {:?}", e)))?,
        };
        Ok(Pdfium::new(bindings))
    }
}

impl ExtractionStrategy for PdfiumStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(
        &self,
        source: &PdfSource,
        options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        let pdfium = self.bind()?;
        let password = options.password.as_deref();

        let loaded = match source.view() {
            SourceView::Bytes(bytes) => pdfium.load_pdf_from_byte_slice(bytes, password),
            SourceView::File(path) => pdfium.load_pdf_from_file(path, password),
        };
        let document = loaded.map_err(|e| {
            let err_str = format!("{:?}", e);
            let detail = if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    "wrong password".to_string()
                } else {
                    "password required".to_string()
                }
            } else {
                err_str
            };
            ExtractionError::OpenError {
                strategy: NAME.to_string(),
                detail,
            }
        })?;

        let pages = document.pages();
        let page_count = pages.len() as usize;
        let limit = options.page_limit(page_count);
        debug!("pdfium: {} pages, reading {}", page_count, limit);

        let mut texts = Vec::with_capacity(limit);
        let mut skipped_pages = Vec::new();
        for (idx, page) in pages.iter().take(limit).enumerate() {
            match page.text() {
                Ok(text) => texts.push(text.all()),
                Err(e) => {
                    warn!("pdfium: skipping page {}: {:?}", idx + 1, e);
                    skipped_pages.push(PageError::DecodeFailed {
                        page: idx + 1,
                        detail: format!("{:?}", e),
                    });
                }
            }
        }

        let metadata = document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> String {
            metadata
                .get(tag)
                .map(|t| t.value().to_string())
                .unwrap_or_default()
        };

        let info = DocumentInfo {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        };

        Ok(RawExtraction {
            text: join_pages(&texts),
            page_count,
            pages_processed: texts.len(),
            skipped_pages,
            info,
        })
    }
}

fn unavailable(reason: String) -> ExtractionError {
    ExtractionError::CapabilityUnavailable {
        strategy: NAME.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_unavailable_not_fatal() {
        let strategy = PdfiumStrategy::new(Some(PathBuf::from(
            "/nonexistent/dir/libpdfium-missing.so",
        )));
        let src = PdfSource::from_bytes(b"%PDF-1.4\n".to_vec(), "x.pdf").unwrap();
        let err = strategy
            .extract(&src, &StrategyOptions::default())
            .unwrap_err();
        assert!(err.is_unavailable(), "{err:?}");
        assert_eq!(strategy.name(), "pdfium");
    }
}
