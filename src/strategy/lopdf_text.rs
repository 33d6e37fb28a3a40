//! Pure-Rust fallback: per-page text operators via `lopdf`.
//!
//! Each page is decoded on its own, so one broken content stream costs one
//! page, not the document.

use super::{join_pages, ExtractionStrategy, RawExtraction, StrategyOptions};
use crate::error::{ExtractionError, PageError};
use crate::output::DocumentInfo;
use crate::pipeline::input::{PdfSource, SourceView};
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

const NAME: &str = "lopdf";

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfStrategy;

impl ExtractionStrategy for LopdfStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(
        &self,
        source: &PdfSource,
        options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        let loaded = match source.view() {
            SourceView::Bytes(bytes) => Document::load_mem(bytes),
            SourceView::File(path) => Document::load(path),
        };
        let mut doc = loaded.map_err(|e| open_error(e.to_string()))?;

        if doc.is_encrypted() {
            match options.password.as_deref() {
                Some(pwd) => doc
                    .decrypt(pwd)
                    .map_err(|e| open_error(format!("decryption failed: {}", e)))?,
                None => return Err(open_error("document is encrypted".into())),
            }
        }

        let pages = doc.get_pages();
        let page_count = pages.len();
        let limit = options.page_limit(page_count);
        debug!("lopdf: {} pages, reading {}", page_count, limit);

        let mut texts = Vec::with_capacity(limit);
        let mut skipped_pages = Vec::new();
        for (&page_num, _) in pages.iter().take(limit) {
            match doc.extract_text(&[page_num]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("lopdf: skipping page {}: {}", page_num, e);
                    skipped_pages.push(PageError::DecodeFailed {
                        page: page_num as usize,
                        detail: e.to_string(),
                    });
                }
            }
        }

        Ok(RawExtraction {
            text: join_pages(&texts),
            page_count,
            pages_processed: texts.len(),
            skipped_pages,
            info: document_info(&doc),
        })
    }
}

fn open_error(detail: String) -> ExtractionError {
    ExtractionError::OpenError {
        strategy: NAME.to_string(),
        detail,
    }
}

fn document_info(doc: &Document) -> DocumentInfo {
    let Some(dict) = info_dictionary(doc) else {
        return DocumentInfo::default();
    };
    DocumentInfo {
        title: info_string(dict, b"Title"),
        author: info_string(dict, b"Author"),
        subject: info_string(dict, b"Subject"),
        creator: info_string(dict, b"Creator"),
        producer: info_string(dict, b"Producer"),
        creation_date: info_string(dict, b"CreationDate"),
        modification_date: info_string(dict, b"ModDate"),
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(dict: &Dictionary, key: &[u8]) -> String {
    dict.get(key)
        .ok()
        .and_then(|obj| obj.as_str().ok())
        .map(decode_text_string)
        .unwrap_or_default()
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8 (with or without
/// BOM), otherwise PDFDocEncoding approximated as Latin-1.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixture::pdf_with_pages;

    fn source(bytes: Vec<u8>) -> PdfSource {
        PdfSource::from_bytes(bytes, "fixture.pdf").unwrap()
    }

    #[test]
    fn extracts_every_page_and_info() {
        let pdf = pdf_with_pages(&["Hello World", "Second page"], Some("Quarterly"));
        let raw = LopdfStrategy
            .extract(&source(pdf), &StrategyOptions::default())
            .unwrap();

        assert_eq!(raw.page_count, 2);
        assert_eq!(raw.pages_processed, 2);
        assert!(raw.skipped_pages.is_empty());
        assert!(raw.text.contains("Hello"), "got: {:?}", raw.text);
        assert!(raw.text.contains("Second"), "got: {:?}", raw.text);
        assert_eq!(raw.info.title, "Quarterly");
        assert_eq!(raw.info.producer, "pdfsalvage tests");
        assert_eq!(raw.info.author, "");
    }

    #[test]
    fn honours_page_cap() {
        let pages: Vec<String> = (1..=5).map(|i| format!("Page {i}")).collect();
        let refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        let pdf = pdf_with_pages(&refs, None);
        let opts = StrategyOptions {
            max_pages: Some(2),
            ..Default::default()
        };
        let raw = LopdfStrategy.extract(&source(pdf), &opts).unwrap();
        assert_eq!(raw.page_count, 5);
        assert_eq!(raw.pages_processed, 2);
        assert!(!raw.text.contains("Page 3"));
        assert_eq!(raw.info, DocumentInfo::default());
    }

    #[test]
    fn garbage_after_magic_is_open_error() {
        let src = source(b"%PDF-1.4\nthis is not really a pdf".to_vec());
        let err = LopdfStrategy
            .extract(&src, &StrategyOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::OpenError { .. }), "{err:?}");
    }

    #[test]
    fn decodes_utf16_and_latin1_strings() {
        let utf16 = [0xFE, 0xFF, 0x00, 0x52, 0x00, 0xE9, 0x00, 0x75];
        assert_eq!(decode_text_string(&utf16), "Réu");
        assert_eq!(decode_text_string(b"Caf\xe9"), "Café");
        assert_eq!(decode_text_string("Relatório".as_bytes()), "Relatório");
        assert_eq!(decode_text_string(b"\xEF\xBB\xBFplain"), "plain");
    }
}
