//! Result assembly: winning attempt + repaired text → [`ExtractionResult`].

use crate::output::{ExtractionResult, ResultMetadata};
use crate::pipeline::repair::TextRepairer;
use crate::pipeline::select::Selection;
use tracing::{debug, warn};

/// Provenance of the source, copied into result metadata.
#[derive(Debug, Clone, Default)]
pub struct SourceFacts {
    pub filename: String,
    pub file_size_bytes: u64,
}

/// Repair the winner's text (when a repairer is given) and package the result.
/// Without a repairer the text is passed through verbatim.
///
/// If repair leaves nothing but whitespace, the trimmed unrepaired text is
/// used instead so a successful result always carries text.
pub fn assemble(
    selection: Selection,
    repairer: Option<&TextRepairer>,
    facts: SourceFacts,
) -> ExtractionResult {
    let Selection { winner, attempts } = selection;

    let original_length = winner.text.chars().count();
    let text = match repairer {
        Some(repairer) => {
            let repaired = repairer.repair(&winner.text);
            if repaired.trim().is_empty() {
                warn!("Repair removed all text; keeping unrepaired text");
                winner.text.trim().to_string()
            } else {
                repaired
            }
        }
        None => winner.text.clone(),
    };
    let cleaned_length = text.chars().count();
    debug!(
        "Assembled result: {} → {} chars via '{}'",
        original_length, cleaned_length, winner.strategy
    );

    ExtractionResult {
        success: true,
        text,
        page_count: winner.page_count,
        pages_processed: winner.pages_processed,
        method: winner.strategy.clone(),
        info: winner.info,
        metadata: ResultMetadata {
            method: winner.strategy,
            filename: facts.filename,
            file_size_bytes: facts.file_size_bytes,
            original_length,
            cleaned_length,
            attempts,
        },
        error: None,
        details: None,
    }
}
