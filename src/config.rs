//! Configuration types for PDF text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. One struct holds every knob so a config
//! can be built once at startup and shared by every invocation.

use crate::error::SalvageError;
use crate::observer::Observer;
use crate::pipeline::repair::{RepairRule, DEFAULT_LOCALE, DEFAULT_MAX_ROUNDS};
use crate::strategy::StrategyKind;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Page cap applied by the HTTP service unless overridden.
pub const DEFAULT_SERVICE_MAX_PAGES: usize = 20;

/// Download timeout for URL inputs.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Configuration for an extraction pipeline.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfsalvage::{ExtractionConfig, StrategyKind};
///
/// let config = ExtractionConfig::builder()
///     .max_pages(20)
///     .strategies(vec![StrategyKind::Lopdf])
///     .locale("pt-BR")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Read at most this many pages. Default: unlimited.
    ///
    /// Library callers usually want the whole document; the HTTP service
    /// defaults to [`DEFAULT_SERVICE_MAX_PAGES`].
    pub max_pages: Option<usize>,

    /// Strategies to try, in order. Default: every compiled-in strategy,
    /// richest first (`pdfium`, `pdf-extract`, `lopdf`).
    pub strategies: Vec<StrategyKind>,

    /// Apply the text repair engine. Default: true.
    pub repair: bool,

    /// Locale of the embedded despacing dictionary. Default: `pt-BR`.
    /// `None` disables despacing and literal fix-ups.
    pub locale: Option<String>,

    /// Custom dictionary JSON file; replaces the embedded one.
    pub dictionary_path: Option<PathBuf>,

    /// Extra regex rules, merged into the built-in passes by `order`.
    pub repair_rules: Vec<RepairRule>,

    /// Upper bound on repair rounds. Default: 4.
    pub max_repair_rounds: usize,

    /// User password for encrypted PDFs.
    pub password: Option<String>,

    /// Path to the pdfium shared library. Falls back to `PDFIUM_LIB_PATH`,
    /// then the working directory, then the system search path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Timeout for URL downloads, in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Receives per-strategy and per-page events.
    pub observer: Option<Observer>,

    /// Log sink for library events. When set, each invocation runs under
    /// this dispatcher instead of the global one.
    pub log_sink: Option<tracing::Dispatch>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            strategies: StrategyKind::default_order(),
            repair: true,
            locale: Some(DEFAULT_LOCALE.to_string()),
            dictionary_path: None,
            repair_rules: Vec::new(),
            max_repair_rounds: DEFAULT_MAX_ROUNDS,
            password: None,
            pdfium_library_path: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            observer: None,
            log_sink: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_pages", &self.max_pages)
            .field("strategies", &self.strategies)
            .field("repair", &self.repair)
            .field("locale", &self.locale)
            .field("dictionary_path", &self.dictionary_path)
            .field("repair_rules", &self.repair_rules.len())
            .field("max_repair_rounds", &self.max_repair_rounds)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn ExtractionObserver>"))
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn unlimited_pages(mut self) -> Self {
        self.config.max_pages = None;
        self
    }

    pub fn strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.config.strategies = strategies;
        self
    }

    pub fn repair(mut self, v: bool) -> Self {
        self.config.repair = v;
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = Some(locale.into());
        self
    }

    pub fn no_locale(mut self) -> Self {
        self.config.locale = None;
        self
    }

    pub fn dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dictionary_path = Some(path.into());
        self
    }

    pub fn repair_rule(mut self, rule: RepairRule) -> Self {
        self.config.repair_rules.push(rule);
        self
    }

    pub fn max_repair_rounds(mut self, n: usize) -> Self {
        self.config.max_repair_rounds = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
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

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, SalvageError> {
        let c = &self.config;
        if c.strategies.is_empty() {
            return Err(SalvageError::InvalidConfig(
                "at least one extraction strategy is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for kind in &c.strategies {
            if !kind.is_compiled() {
                return Err(SalvageError::InvalidConfig(format!(
                    "strategy '{}' is not compiled into this build (enable the '{}' feature)",
                    kind, kind
                )));
            }
            if !seen.insert(*kind) {
                return Err(SalvageError::InvalidConfig(format!(
                    "strategy '{}' listed more than once",
                    kind
                )));
            }
        }
        if c.max_pages == Some(0) {
            return Err(SalvageError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if c.max_repair_rounds == 0 {
            return Err(SalvageError::InvalidConfig(
                "max_repair_rounds must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(SalvageError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Parse a comma-separated strategy list such as `pdfium,lopdf`.
pub fn parse_strategy_list(list: &str) -> Result<Vec<StrategyKind>, SalvageError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<StrategyKind>().map_err(SalvageError::InvalidConfig))
        .collect()
}
