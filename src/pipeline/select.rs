//! Strategy selection: first strategy with non-empty text wins.
//!
//! Each configured strategy is invoked exactly once, in order. Outcomes:
//!
//! | strategy returned            | selector does                         |
//! |------------------------------|---------------------------------------|
//! | `CapabilityUnavailable`      | log, record `unavailable`, continue   |
//! | `OpenError` / `Failed`/panic | log, record `failed`, continue        |
//! | text, whitespace only        | log "empty result", continue          |
//! | text, non-empty after trim   | stop; this attempt wins               |
//!
//! Exhausting the list is [`SalvageError::AllStrategiesFailed`], never a
//! partial result.

use crate::error::{AttemptFailure, ExtractionError, PageError, SalvageError};
use crate::observer::ExtractionObserver;
use crate::output::{AttemptOutcome, AttemptRecord, DocumentInfo};
use crate::pipeline::input::PdfSource;
use crate::strategy::{ExtractionStrategy, RawExtraction, StrategyOptions};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{info, warn};

/// The record of one strategy invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionAttempt {
    pub strategy: String,
    pub outcome: AttemptOutcome,
    pub text: String,
    pub page_count: usize,
    pub pages_processed: usize,
    pub skipped_pages: Vec<PageError>,
    pub info: DocumentInfo,
    pub error: Option<String>,
}

impl ExtractionAttempt {
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Succeeded
    }

    fn from_raw(strategy: &str, raw: RawExtraction, outcome: AttemptOutcome) -> Self {
        Self {
            strategy: strategy.to_string(),
            outcome,
            error: (outcome == AttemptOutcome::Empty).then(|| "empty result".to_string()),
            text: raw.text,
            page_count: raw.page_count,
            pages_processed: raw.pages_processed,
            skipped_pages: raw.skipped_pages,
            info: raw.info,
        }
    }

    fn from_error(strategy: &str, outcome: AttemptOutcome, error: String) -> Self {
        Self {
            strategy: strategy.to_string(),
            outcome,
            text: String::new(),
            page_count: 0,
            pages_processed: 0,
            skipped_pages: Vec::new(),
            info: DocumentInfo::default(),
            error: Some(error),
        }
    }

    fn record(&self) -> AttemptRecord {
        AttemptRecord {
            strategy: self.strategy.clone(),
            outcome: self.outcome,
            detail: self.error.clone(),
        }
    }
}

/// The winning attempt plus every attempt made, in order.
#[derive(Debug, Clone)]
pub struct Selection {
    pub winner: ExtractionAttempt,
    pub attempts: Vec<AttemptRecord>,
}

/// Try `strategies` in order against `source`.
pub fn select(
    source: &PdfSource,
    strategies: &[Arc<dyn ExtractionStrategy>],
    options: &StrategyOptions,
    observer: &dyn ExtractionObserver,
) -> Result<Selection, SalvageError> {
    let total = strategies.len();
    let mut attempts = Vec::with_capacity(total);

    for (i, strategy) in strategies.iter().enumerate() {
        let name = strategy.name();
        observer.on_strategy_start(name, i + 1, total);

        let attempt = run_one(strategy.as_ref(), source, options);
        for page_err in &attempt.skipped_pages {
            observer.on_page_skipped(name, page_err);
        }
        attempts.push(attempt.record());

        if attempt.succeeded() {
            info!(
                "Strategy '{}' succeeded: {}/{} pages, {} chars",
                name,
                attempt.pages_processed,
                attempt.page_count,
                attempt.text.chars().count()
            );
            observer.on_selected(name, attempt.pages_processed, attempt.page_count);
            return Ok(Selection {
                winner: attempt,
                attempts,
            });
        }

        let detail = attempt.error.as_deref().unwrap_or("unknown error");
        observer.on_strategy_failed(name, attempt.outcome, detail);
    }

    Err(SalvageError::AllStrategiesFailed {
        attempts: attempts
            .into_iter()
            .map(|a| AttemptFailure {
                reason: a.detail.unwrap_or_else(|| "unknown error".into()),
                strategy: a.strategy,
            })
            .collect(),
    })
}

fn run_one(
    strategy: &dyn ExtractionStrategy,
    source: &PdfSource,
    options: &StrategyOptions,
) -> ExtractionAttempt {
    let name = strategy.name();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(source, options)));

    match outcome {
        Ok(Ok(raw)) if raw.has_text() => {
            ExtractionAttempt::from_raw(name, raw, AttemptOutcome::Succeeded)
        }
        Ok(Ok(raw)) => {
            info!("Strategy '{}' returned empty result", name);
            ExtractionAttempt::from_raw(name, raw, AttemptOutcome::Empty)
        }
        Ok(Err(e @ ExtractionError::CapabilityUnavailable { .. })) => {
            info!("Strategy '{}' unavailable: {}", name, e);
            ExtractionAttempt::from_error(name, AttemptOutcome::Unavailable, e.to_string())
        }
        Ok(Err(e)) => {
            warn!("Strategy '{}' failed: {}", name, e);
            ExtractionAttempt::from_error(name, AttemptOutcome::Failed, e.to_string())
        }
        Err(_) => {
            warn!("Strategy '{}' panicked", name);
            ExtractionAttempt::from_error(
                name,
                AttemptOutcome::Failed,
                format!("{}: strategy panicked", name),
            )
        }
    }
}
