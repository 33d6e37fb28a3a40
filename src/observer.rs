//! Observer trait for per-strategy and per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionObserver>`] via
//! [`crate::extract::PipelineBuilder::observer`] to watch an invocation as the
//! selector walks the strategy list.
//!
//! # Example
//!
//! ```rust
//! use pdfsalvage::{AttemptOutcome, ExtractionObserver, Pipeline};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingObserver {
//!     failed: AtomicUsize,
//! }
//!
//! impl ExtractionObserver for CountingObserver {
//!     fn on_strategy_failed(&self, strategy: &str, outcome: AttemptOutcome, detail: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{strategy} {outcome:?}: {detail}");
//!     }
//! }
//!
//! let pipeline = Pipeline::builder()
//!     .observer(Arc::new(CountingObserver { failed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::PageError;
use crate::output::{AttemptOutcome, ExtractionResult};
use std::sync::Arc;

/// Called by the pipeline as it runs.
///
/// Invocations are sequential within one run, but a shared pipeline may run
/// many invocations at once; protect shared mutable state accordingly. Every
/// method has a no-op default.
pub trait ExtractionObserver: Send + Sync {
    /// Called before a strategy is invoked.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the strategy order
    /// * `total`: number of configured strategies
    fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
        let _ = (strategy, index, total);
    }

    /// Called when a strategy did not win: unavailable, failed, or empty.
    fn on_strategy_failed(&self, strategy: &str, outcome: AttemptOutcome, detail: &str) {
        let _ = (strategy, outcome, detail);
    }

    /// Called for each page a strategy had to skip.
    fn on_page_skipped(&self, strategy: &str, error: &PageError) {
        let _ = (strategy, error);
    }

    /// Called once when a strategy produced usable text.
    fn on_selected(&self, strategy: &str, pages_processed: usize, page_count: usize) {
        let _ = (strategy, pages_processed, page_count);
    }

    /// Called once with the final result, success or failure.
    fn on_complete(&self, result: &ExtractionResult) {
        let _ = result;
    }
}

/// Default observer; ignores every event.
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Shared observer handle stored by the pipeline.
pub type Observer = Arc<dyn ExtractionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl ExtractionObserver for Recording {
        fn on_strategy_start(&self, strategy: &str, index: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {strategy} {index}/{total}"));
        }

        fn on_selected(&self, strategy: &str, pages_processed: usize, page_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("selected {strategy} {pages_processed}/{page_count}"));
        }
    }

    #[test]
    fn noop_observer_accepts_every_event() {
        let o = NoopObserver;
        o.on_strategy_start("lopdf", 1, 1);
        o.on_strategy_failed("pdfium", AttemptOutcome::Unavailable, "no lib");
        o.on_page_skipped(
            "lopdf",
            &PageError::DecodeFailed {
                page: 2,
                detail: "x".into(),
            },
        );
        o.on_selected("lopdf", 1, 1);
        o.on_complete(&ExtractionResult::failure(&crate::SalvageError::Internal(
            "x".into(),
        )));
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Arc::new(Recording::default());
        let o: Observer = rec.clone();
        o.on_strategy_start("pdfium", 1, 3);
        o.on_strategy_failed("pdfium", AttemptOutcome::Failed, "ignored");
        o.on_selected("lopdf", 2, 3);

        assert_eq!(
            *rec.events.lock().unwrap(),
            vec!["start pdfium 1/3", "selected lopdf 2/3"]
        );
    }
}
