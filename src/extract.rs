//! Extraction entry points.
//!
//! [`Pipeline`] holds everything that is fixed for the life of a process: the
//! strategy list, the repair engine, the page cap, the observer and the log
//! sink. It is cheap to clone and safe to share; each call to
//! [`Pipeline::run`] is an independent invocation owning its own
//! [`PdfSource`].
//!
//! The free functions ([`extract`], [`extract_sync`], [`extract_from_bytes`],
//! [`extract_to_file`], [`inspect`]) build a pipeline from an
//! [`ExtractionConfig`] per call, for one-shot use.
//!
//! ## Why spawn_blocking?
//!
//! Every strategy is CPU-bound and pdfium keeps thread-local state, so the
//! whole selection runs on Tokio's blocking pool. Async callers (the HTTP
//! service) never stall a worker thread on a large document.

use crate::config::ExtractionConfig;
use crate::error::SalvageError;
use crate::observer::{NoopObserver, Observer};
use crate::output::{ExtractionResult, Inspection};
use crate::pipeline::assemble::{self, SourceFacts};
use crate::pipeline::input::{self, PdfSource};
use crate::pipeline::repair::{LocaleDictionary, TextRepairer};
use crate::pipeline::select;
use crate::strategy::{ExtractionStrategy, StrategyOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn};

/// A configured extraction pipeline.
///
/// # Example
/// ```rust,no_run
/// use pdfsalvage::{ExtractionConfig, Pipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = Pipeline::new(&ExtractionConfig::builder().max_pages(20).build()?)?;
/// let result = pipeline.extract("https://example.org/report.pdf").await?;
/// println!("{} via {}", result.text, result.method);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    repairer: Option<TextRepairer>,
    options: StrategyOptions,
    download_timeout_secs: u64,
    observer: Observer,
    log_sink: Option<tracing::Dispatch>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("strategies", &self.strategy_names())
            .field("repairer", &self.inner.repairer)
            .field("max_pages", &self.inner.options.max_pages)
            .finish()
    }
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: &ExtractionConfig) -> Result<Self, SalvageError> {
        Self::builder().config(config.clone()).build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Strategy names in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.inner.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.inner.options.max_pages
    }

    /// Run one invocation on the current thread. Blocks.
    ///
    /// Events go to the configured log sink when there is one.
    pub fn run(&self, source: &PdfSource) -> Result<ExtractionResult, SalvageError> {
        match &self.inner.log_sink {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || self.run_inner(source))
            }
            None => self.run_inner(source),
        }
    }

    fn run_inner(&self, source: &PdfSource) -> Result<ExtractionResult, SalvageError> {
        let start = Instant::now();
        let facts = SourceFacts {
            filename: source.filename(),
            file_size_bytes: source.size_bytes(),
        };
        info!(
            "Extracting '{}' ({} bytes) with strategies [{}]",
            facts.filename,
            facts.file_size_bytes,
            self.strategy_names().join(", ")
        );

        let inner = &self.inner;
        let outcome = select::select(
            source,
            &inner.strategies,
            &inner.options,
            inner.observer.as_ref(),
        )
        .map(|selection| assemble::assemble(selection, inner.repairer.as_ref(), facts));

        match &outcome {
            Ok(result) => {
                info!(
                    "Extracted {} chars from {}/{} pages via '{}' in {} ms",
                    result.text.chars().count(),
                    result.pages_processed,
                    result.page_count,
                    result.method,
                    start.elapsed().as_millis()
                );
                inner.observer.on_complete(result);
            }
            Err(e) => {
                warn!("Extraction failed: {}", e);
                inner.observer.on_complete(&ExtractionResult::failure(e));
            }
        }
        outcome
    }

    /// Run one invocation on Tokio's blocking pool. The source (and any temp
    /// storage it owns) is released when the invocation ends.
    pub async fn run_source(&self, source: PdfSource) -> Result<ExtractionResult, SalvageError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.run(&source))
            .await
            .map_err(|e| SalvageError::Internal(format!("Extraction task panicked: {}", e)))?
    }

    /// Resolve a local path or URL and extract it.
    pub async fn extract(&self, input: &str) -> Result<ExtractionResult, SalvageError> {
        let source = self.resolve(input).await?;
        self.run_source(source).await
    }

    /// Extract from an in-memory buffer.
    pub async fn extract_bytes(
        &self,
        bytes: Vec<u8>,
        filename: impl Into<String>,
    ) -> Result<ExtractionResult, SalvageError> {
        let source = PdfSource::from_bytes(bytes, filename)?;
        self.run_source(source).await
    }

    /// Report page count and document info without extracting the whole text.
    ///
    /// The first strategy that can open the document answers, whether or not
    /// its first page has text.
    pub async fn inspect(&self, input: &str) -> Result<Inspection, SalvageError> {
        let source = self.resolve(input).await?;
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || match &pipeline.inner.log_sink {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || pipeline.inspect_blocking(&source))
            }
            None => pipeline.inspect_blocking(&source),
        })
        .await
        .map_err(|e| SalvageError::Internal(format!("Inspect task panicked: {}", e)))?
    }

    fn inspect_blocking(&self, source: &PdfSource) -> Result<Inspection, SalvageError> {
        let options = StrategyOptions {
            max_pages: Some(1),
            password: self.inner.options.password.clone(),
        };
        let mut failures = Vec::new();
        for strategy in &self.inner.strategies {
            match strategy.extract(source, &options) {
                Ok(raw) => {
                    debug!("Inspected with '{}'", strategy.name());
                    return Ok(Inspection {
                        filename: source.filename(),
                        file_size_bytes: source.size_bytes(),
                        num_pages: raw.page_count,
                        method: strategy.name().to_string(),
                        info: raw.info,
                    });
                }
                Err(e) => failures.push(crate::error::AttemptFailure {
                    strategy: strategy.name().to_string(),
                    reason: e.to_string(),
                }),
            }
        }
        Err(SalvageError::AllStrategiesFailed { attempts: failures })
    }

    async fn resolve(&self, input: &str) -> Result<PdfSource, SalvageError> {
        let resolving = input::resolve_input(input, self.inner.download_timeout_secs);
        match &self.inner.log_sink {
            Some(dispatch) => resolving.with_subscriber(dispatch.clone()).await,
            None => resolving.await,
        }
    }
}

/// Builder for [`Pipeline`].
///
/// Everything not overridden here comes from the [`ExtractionConfig`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: ExtractionConfig,
    strategies: Option<Vec<Arc<dyn ExtractionStrategy>>>,
    repairer: Option<TextRepairer>,
}

impl PipelineBuilder {
    pub fn config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this strategy list instead of the configured built-ins.
    /// Call repeatedly to append.
    pub fn strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.strategies.get_or_insert_with(Vec::new).push(strategy);
        self
    }

    /// Use this repair engine instead of building one from the config.
    pub fn repairer(mut self, repairer: TextRepairer) -> Self {
        self.repairer = Some(repairer);
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn repair(mut self, v: bool) -> Self {
        self.config.repair = v;
        self
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.config.observer = Some(observer);
        self
    }

    pub fn log_sink(mut self, dispatch: tracing::Dispatch) -> Self {
        self.config.log_sink = Some(dispatch);
        self
    }

    pub fn build(self) -> Result<Pipeline, SalvageError> {
        let config = self.config;
        if config.max_pages == Some(0) {
            return Err(SalvageError::InvalidConfig("max_pages must be ≥ 1".into()));
        }

        let strategies = match self.strategies {
            Some(custom) => custom,
            None => {
                if config.strategies.is_empty() {
                    return Err(SalvageError::InvalidConfig(
                        "at least one extraction strategy is required".into(),
                    ));
                }
                config
                    .strategies
                    .iter()
                    .map(|kind| {
                        kind.build(config.pdfium_library_path.as_deref())
                            .map(Arc::<dyn ExtractionStrategy>::from)
                            .ok_or_else(|| {
                                SalvageError::InvalidConfig(format!(
                                    "strategy '{}' is not compiled into this build",
                                    kind
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let repairer = if !config.repair {
            None
        } else if let Some(repairer) = self.repairer {
            Some(repairer)
        } else {
            Some(build_repairer(&config)?)
        };

        Ok(Pipeline {
            inner: Arc::new(PipelineInner {
                strategies,
                repairer,
                options: StrategyOptions {
                    max_pages: config.max_pages,
                    password: config.password.clone(),
                },
                download_timeout_secs: config.download_timeout_secs,
                observer: config
                    .observer
                    .clone()
                    .unwrap_or_else(|| Arc::new(NoopObserver)),
                log_sink: config.log_sink.clone(),
            }),
        })
    }
}

fn build_repairer(config: &ExtractionConfig) -> Result<TextRepairer, SalvageError> {
    let mut builder = TextRepairer::builder().max_rounds(config.max_repair_rounds);
    if let Some(path) = &config.dictionary_path {
        builder = builder.dictionary(LocaleDictionary::from_file(path)?);
    } else if let Some(locale) = &config.locale {
        builder = builder.locale(locale.clone());
    }
    for rule in &config.repair_rules {
        builder = builder.rule(rule.clone());
    }
    builder.build()
}

// ── One-shot entry points ────────────────────────────────────────────────────

/// Extract text from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`: Local file path or HTTP/HTTPS URL to a PDF
/// * `config`: Extraction configuration
///
/// # Errors
/// Returns `Err(SalvageError)` only for fatal errors:
/// - File not found / permission denied / download failed
/// - Not a PDF
/// - No strategy produced text
pub async fn extract(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, SalvageError> {
    Pipeline::new(config)?.extract(input.as_ref()).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, SalvageError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SalvageError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Extract text from PDF bytes in memory.
///
/// This is the recommended API when PDF data comes from a database, network
/// stream, or upload body rather than a file on disk. `filename` is reported
/// in the result metadata; pass `""` for `document.pdf`.
pub async fn extract_from_bytes(
    bytes: Vec<u8>,
    filename: impl Into<String>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, SalvageError> {
    Pipeline::new(config)?.extract_bytes(bytes, filename).await
}

/// Extract a PDF and write the JSON result directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, SalvageError> {
    let result = extract(input, config).await?;
    write_json_atomic(output_path.as_ref(), &result, true).await?;
    Ok(result)
}

/// Report page count and document info for a PDF file or URL.
pub async fn inspect(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<Inspection, SalvageError> {
    Pipeline::new(config)?.inspect(input.as_ref()).await
}

/// Serialise `result` as JSON to `path`, via a sibling temp file and rename.
pub async fn write_json_atomic(
    path: &Path,
    result: &ExtractionResult,
    pretty: bool,
) -> Result<(), SalvageError> {
    let write_err = |e: std::io::Error| SalvageError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let json = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
    .map_err(|e| SalvageError::Internal(format!("serialise result: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
