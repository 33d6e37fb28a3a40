//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets strategies or repair passes change
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ select ──────────────▶ repair ──▶ assemble
//! (path/URL/  (strategy 1, 2, … N;   (passes    (ExtractionResult)
//!  bytes)      first non-empty wins)  to fixed
//!                                     point)
//! ```
//!
//! 1. [`input`]: resolve a path, URL or buffer to a `PdfSource`; URLs are
//!    downloaded into a `TempDir` that lives as long as the source
//! 2. [`select`]: try each strategy once, in order, until one yields text
//! 3. [`repair`]: deterministic cleanup of encoding, spacing and garbling
//! 4. [`assemble`]: package the winner into the final result

pub mod assemble;
pub mod input;
pub mod repair;
pub mod select;
