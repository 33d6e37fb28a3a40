//! Text repair: deterministic cleanup of extractor output.
//!
//! ## Why repair at all?
//!
//! Text layers of real-world PDFs are frequently damaged in ways no extractor
//! can undo: UTF-8 that was re-decoded as Latin-1 (`Ã§` for `ç`), typographic
//! ligatures left as single code points, words printed letter by letter
//! (`v e n d a s`), bullet glyphs emitted as text. This module applies cheap,
//! deterministic passes that fix those without touching content.
//!
//! ## Pass order
//!
//! | order | pass          | kind                        |
//! |-------|---------------|-----------------------------|
//! | 10    | encoding      | literal table (24 entries)  |
//! | 20    | ligatures     | literal table               |
//! | 25    | invisible     | literal table               |
//! | 30–33 | whitespace    | regex rules                 |
//! | 40–41 | punctuation   | regex rules                 |
//! | 50    | bullets       | regex rule                  |
//! | 60    | despacing     | locale dictionary           |
//! | 61    | literals      | locale dictionary           |
//!
//! User rules and passes slot in by their `order`. Equal orders keep
//! insertion order, built-ins first.
//!
//! ## Fixed point
//!
//! Later passes can leave work for earlier ones (removing a bullet leaves two
//! adjacent spaces). The whole pass list is therefore applied in rounds until
//! the text stops changing, up to `max_rounds`, which makes repair idempotent
//! for the built-in passes.
//!
//! ## Failure
//!
//! A pass that returns [`RepairError`] aborts the repair and the caller gets
//! its input back unmodified.

mod dictionary;
mod rules;

pub use dictionary::{LiteralReplacement, LocaleDictionary, DEFAULT_LOCALE};

use crate::error::{RepairError, SalvageError};
use dictionary::{DespacePass, LiteralPass};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default bound on repair rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 4;

/// One transformation applied by the [`TextRepairer`].
pub trait RepairPass: Send + Sync {
    fn name(&self) -> &str;

    /// Position in the pass list; lower runs first.
    fn order(&self) -> u32;

    fn apply(&self, text: &str) -> Result<String, RepairError>;
}

/// A regex substitution, as configuration data.
///
/// `replacement` uses `regex` expansion syntax (`${1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRule {
    pub pattern: String,
    pub replacement: String,
    pub order: u32,
}

/// A compiled [`RepairRule`].
#[derive(Debug)]
struct RegexPass {
    name: String,
    regex: Regex,
    replacement: String,
    order: u32,
}

impl RegexPass {
    fn compile(rule: &RepairRule) -> Result<Self, SalvageError> {
        let regex = Regex::new(&rule.pattern).map_err(|e| {
            SalvageError::InvalidConfig(format!(
                "invalid repair pattern '{}': {}",
                rule.pattern, e
            ))
        })?;
        Ok(Self {
            name: format!("rule {} /{}/", rule.order, rule.pattern),
            regex,
            replacement: rule.replacement.clone(),
            order: rule.order,
        })
    }
}

impl RepairPass for RegexPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn apply(&self, text: &str) -> Result<String, RepairError> {
        Ok(self
            .regex
            .replace_all(text, self.replacement.as_str())
            .into_owned())
    }
}

/// The repair engine. Built once, shared read-only by every invocation.
#[derive(Clone)]
pub struct TextRepairer {
    passes: Arc<[Arc<dyn RepairPass>]>,
    max_rounds: usize,
    locale: Option<String>,
}

impl std::fmt::Debug for TextRepairer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRepairer")
            .field("passes", &self.pass_names())
            .field("max_rounds", &self.max_rounds)
            .field("locale", &self.locale)
            .finish()
    }
}

impl TextRepairer {
    pub fn builder() -> TextRepairerBuilder {
        TextRepairerBuilder::default()
    }

    /// Built-in passes plus the embedded dictionary for `locale`.
    pub fn for_locale(locale: &str) -> Result<Self, SalvageError> {
        Self::builder().locale(locale).build()
    }

    /// Pass names in application order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Repair `text`. On any pass failure, logs it and returns `text`
    /// unmodified.
    pub fn repair(&self, text: &str) -> String {
        match self.try_repair(text) {
            Ok(repaired) => repaired,
            Err(e) => {
                warn!("Text repair failed, returning unrepaired text: {}", e);
                text.to_string()
            }
        }
    }

    /// Repair `text`, surfacing the first pass failure.
    pub fn try_repair(&self, text: &str) -> Result<String, RepairError> {
        let mut current = text.trim().to_string();
        for round in 1..=self.max_rounds {
            let mut next = current.clone();
            for pass in self.passes.iter() {
                let out = pass.apply(&next)?;
                if out != next {
                    debug!("repair round {}: pass '{}' changed text", round, pass.name());
                }
                next = out;
            }
            let next = next.trim().to_string();
            if next == current {
                return Ok(next);
            }
            current = next;
        }
        debug!(
            "repair did not settle within {} rounds",
            self.max_rounds
        );
        Ok(current)
    }
}

/// Builder for [`TextRepairer`].
pub struct TextRepairerBuilder {
    builtins: bool,
    locale: Option<String>,
    dictionary: Option<LocaleDictionary>,
    rules: Vec<RepairRule>,
    passes: Vec<Arc<dyn RepairPass>>,
    max_rounds: usize,
}

impl Default for TextRepairerBuilder {
    fn default() -> Self {
        Self {
            builtins: true,
            locale: None,
            dictionary: None,
            rules: Vec::new(),
            passes: Vec::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl TextRepairerBuilder {
    /// Use the embedded dictionary for this locale.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Use this dictionary instead of an embedded one.
    pub fn dictionary(mut self, dictionary: LocaleDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Add a regex rule.
    pub fn rule(mut self, rule: RepairRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a custom pass.
    pub fn pass(mut self, pass: Arc<dyn RepairPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Leave out the built-in table and regex passes.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn build(self) -> Result<TextRepairer, SalvageError> {
        if self.max_rounds == 0 {
            return Err(SalvageError::InvalidConfig(
                "max_rounds must be at least 1".into(),
            ));
        }

        let mut passes: Vec<Arc<dyn RepairPass>> = Vec::new();
        if self.builtins {
            for pass in rules::table_passes() {
                passes.push(Arc::new(pass));
            }
            for rule in rules::builtin_rules() {
                passes.push(Arc::new(RegexPass::compile(&rule)?));
            }
        }
        for rule in &self.rules {
            passes.push(Arc::new(RegexPass::compile(rule)?));
        }

        let dictionary = match (self.dictionary, self.locale.as_deref()) {
            (Some(dict), _) => Some(dict),
            (None, Some(locale)) => Some(LocaleDictionary::embedded(locale)?),
            (None, None) => None,
        };
        let locale = dictionary.as_ref().map(|d| d.locale.clone());
        if let Some(dict) = &dictionary {
            passes.push(Arc::new(DespacePass::new(dict)));
            passes.push(Arc::new(LiteralPass::new(dict)?));
        }

        passes.extend(self.passes);
        // Stable: equal orders keep insertion order.
        passes.sort_by_key(|p| p.order());

        Ok(TextRepairer {
            passes: passes.into(),
            max_rounds: self.max_rounds,
            locale,
        })
    }
}
