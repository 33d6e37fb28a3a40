//! Shared helpers for integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfsalvage::{
    AttemptOutcome, ExtractionError, ExtractionObserver, ExtractionResult, ExtractionStrategy,
    PageError, PdfSource, RawExtraction, StrategyOptions,
};
use std::io;
use std::sync::{Arc, Mutex};

// ── Generated PDFs ───────────────────────────────────────────────────────────

/// A real PDF with one Courier text line per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A source whose bytes only need to pass the magic check; stub strategies
/// never parse it.
pub fn stub_source() -> PdfSource {
    PdfSource::from_bytes(b"%PDF-1.4\n%stub\n".to_vec(), "stub.pdf").unwrap()
}

// ── Stub strategies ──────────────────────────────────────────────────────────

/// A strategy serving a fixed page list. `None` marks a page that fails to decode.
pub struct StubPages {
    pub name: &'static str,
    pub pages: Vec<Option<String>>,
}

impl StubPages {
    pub fn new(name: &'static str, pages: Vec<Option<String>>) -> Arc<dyn ExtractionStrategy> {
        Arc::new(Self { name, pages })
    }

    pub fn numbered(name: &'static str, count: usize) -> Arc<dyn ExtractionStrategy> {
        Self::new(name, (1..=count).map(|n| Some(format!("page {n}"))).collect())
    }
}

impl ExtractionStrategy for StubPages {
    fn name(&self) -> &str {
        self.name
    }

    fn extract(
        &self,
        _source: &PdfSource,
        options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        let limit = options.page_limit(self.pages.len());
        let mut raw = RawExtraction {
            page_count: self.pages.len(),
            ..Default::default()
        };
        for (i, page) in self.pages.iter().take(limit).enumerate() {
            match page {
                Some(text) => {
                    raw.text.push_str(text);
                    raw.text.push('\n');
                    raw.pages_processed += 1;
                }
                None => raw.skipped_pages.push(PageError::DecodeFailed {
                    page: i + 1,
                    detail: "unknown font encoding".into(),
                }),
            }
        }
        Ok(raw)
    }
}

/// A strategy that cannot open anything.
pub struct Broken(pub &'static str);

impl ExtractionStrategy for Broken {
    fn name(&self) -> &str {
        self.0
    }

    fn extract(
        &self,
        _source: &PdfSource,
        _options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        Err(ExtractionError::OpenError {
            strategy: self.0.into(),
            detail: "invalid cross-reference table".into(),
        })
    }
}

/// A strategy whose backend is missing on this host.
pub struct Unavailable(pub &'static str);

impl ExtractionStrategy for Unavailable {
    fn name(&self) -> &str {
        self.0
    }

    fn extract(
        &self,
        _source: &PdfSource,
        _options: &StrategyOptions,
    ) -> Result<RawExtraction, ExtractionError> {
        Err(ExtractionError::CapabilityUnavailable {
            strategy: self.0.into(),
            reason: "native library not found".into(),
        })
    }
}

// ── Observation ──────────────────────────────────────────────────────────────

/// Records every observer event as a short string.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ExtractionObserver for Recorder {
    fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
        self.push(format!("start {strategy} {index}/{total}"));
    }

    fn on_strategy_failed(&self, strategy: &str, outcome: AttemptOutcome, _detail: &str) {
        self.push(format!("failed {strategy} {outcome:?}"));
    }

    fn on_page_skipped(&self, strategy: &str, error: &PageError) {
        let PageError::DecodeFailed { page, .. } = error;
        self.push(format!("skipped {strategy} page {page}"));
    }

    fn on_selected(&self, strategy: &str, pages_processed: usize, page_count: usize) {
        self.push(format!("selected {strategy} {pages_processed}/{page_count}"));
    }

    fn on_complete(&self, result: &ExtractionResult) {
        self.push(format!("complete success={}", result.success));
    }
}

/// `io::Write` into a shared buffer, for capturing log output.
#[derive(Clone, Default)]
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
