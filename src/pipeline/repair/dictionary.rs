//! Locale dictionaries for letter-despacing and garbled-token fix-ups.
//!
//! A dictionary is versioned JSON:
//!
//! ```json
//! {
//!   "locale": "pt-BR",
//!   "version": 1,
//!   "words":    ["vendas", "chamada"],
//!   "phrases":  { "urboaeeoconxl": "urbano ocorrência" },
//!   "literals": [ { "from": "PaMs", "to": "Páginas" } ]
//! }
//! ```
//!
//! `words` and `phrases` are matched case-sensitively against runs of single
//! letters (`v e n d a s`). `literals` replace every occurrence of their
//! `from` text, including inside longer tokens; whitespace inside `from`
//! matches any whitespace run. Phrases and literals are empirical: they record garbling seen in real documents and
//! are kept verbatim even where the replacement is itself not a word.

use super::RepairPass;
use crate::error::{RepairError, SalvageError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Locale whose dictionary ships inside the binary.
pub const DEFAULT_LOCALE: &str = "pt-BR";

const EMBEDDED: &[(&str, &str)] = &[("pt-BR", include_str!("dictionaries/pt-BR.json"))];

/// An exact garbled-token replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralReplacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleDictionary {
    pub locale: String,
    pub version: u32,
    #[serde(default)]
    pub words: Vec<String>,
    /// Despaced letters → replacement text.
    #[serde(default)]
    pub phrases: BTreeMap<String, String>,
    /// Applied in declared order, so longer tokens go first.
    #[serde(default)]
    pub literals: Vec<LiteralReplacement>,
}

impl LocaleDictionary {
    /// Locales with an embedded dictionary.
    pub fn available_locales() -> Vec<&'static str> {
        EMBEDDED.iter().map(|(locale, _)| *locale).collect()
    }

    /// Load the dictionary embedded for `locale` (case-insensitive).
    pub fn embedded(locale: &str) -> Result<Self, SalvageError> {
        let (_, json) = EMBEDDED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(locale))
            .ok_or_else(|| {
                SalvageError::InvalidConfig(format!(
                    "no dictionary for locale '{}' (available: {})",
                    locale,
                    Self::available_locales().join(", ")
                ))
            })?;
        Self::from_json(json)
    }

    pub fn from_json(json: &str) -> Result<Self, SalvageError> {
        let dict: Self = serde_json::from_str(json)
            .map_err(|e| SalvageError::InvalidConfig(format!("invalid dictionary: {}", e)))?;
        dict.validate()?;
        Ok(dict)
    }

    /// Load a custom dictionary from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SalvageError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SalvageError::InvalidConfig(format!(
                "cannot read dictionary '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), SalvageError> {
        if self.locale.trim().is_empty() {
            return Err(SalvageError::InvalidConfig(
                "dictionary locale must not be empty".into(),
            ));
        }
        if let Some(bad) = self.literals.iter().find(|l| l.from.trim().is_empty()) {
            return Err(SalvageError::InvalidConfig(format!(
                "dictionary literal with empty 'from' (to = '{}')",
                bad.to
            )));
        }
        if let Some(bad) = self
            .words
            .iter()
            .chain(self.phrases.keys())
            .find(|k| letters_key(k).chars().count() < 2)
        {
            return Err(SalvageError::InvalidConfig(format!(
                "dictionary entry '{}' is shorter than two letters",
                bad
            )));
        }
        Ok(())
    }
}

fn letters_key(s: &str) -> String {
    s.split_whitespace().collect()
}

// ── Despacing ────────────────────────────────────────────────────────────────

/// A run of at least two single-letter tokens separated by one space. A token
/// may also be an expanded ligature (`fi`, `fl`, `ff`, `ffi`, `ffl`), since the
/// ligature pass runs first.
static RE_LETTER_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:ff[il]?|f[il]|\p{L})(?: (?:ff[il]?|f[il]|\p{L}))+\b").unwrap()
});

#[derive(Debug, Clone)]
enum Entry {
    /// Rejoin the letters as they appear.
    Word,
    /// Replace with fixed text.
    Phrase(String),
}

/// Collapses letter-spaced runs that spell a dictionary entry.
#[derive(Debug)]
pub(crate) struct DespacePass {
    entries: HashMap<String, Entry>,
    longest_key: usize,
}

impl DespacePass {
    pub(crate) fn new(dict: &LocaleDictionary) -> Self {
        let mut entries = HashMap::new();
        for word in &dict.words {
            entries.insert(letters_key(word), Entry::Word);
        }
        for (letters, replacement) in &dict.phrases {
            entries.insert(letters_key(letters), Entry::Phrase(replacement.clone()));
        }
        let longest_key = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        Self {
            entries,
            longest_key,
        }
    }

    /// Greedy left-to-right scan: at each token take the longest span of two
    /// or more tokens whose letters form a key; otherwise keep the token.
    fn despace_run(&self, run: &str) -> String {
        let tokens: Vec<&str> = run.split(' ').collect();
        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let max_end = tokens.len().min(i + self.longest_key);
            let mut matched = None;
            for end in (i + 2..=max_end).rev() {
                let joined = tokens[i..end].concat();
                if let Some(entry) = self.entries.get(&joined) {
                    let text = match entry {
                        Entry::Word => joined,
                        Entry::Phrase(replacement) => replacement.clone(),
                    };
                    matched = Some((end, text));
                    break;
                }
            }
            match matched {
                Some((end, text)) => {
                    out.push(text);
                    i = end;
                }
                None => {
                    out.push(tokens[i].to_string());
                    i += 1;
                }
            }
        }
        out.join(" ")
    }
}

impl RepairPass for DespacePass {
    fn name(&self) -> &str {
        "despacing"
    }

    fn order(&self) -> u32 {
        60
    }

    fn apply(&self, text: &str) -> Result<String, RepairError> {
        if self.entries.is_empty() {
            return Ok(text.to_string());
        }
        Ok(RE_LETTER_RUN
            .replace_all(text, |caps: &Captures| self.despace_run(&caps[0]))
            .into_owned())
    }
}

// ── Literal tokens ───────────────────────────────────────────────────────────

/// Substring replacements of known garbled tokens.
#[derive(Debug)]
pub(crate) struct LiteralPass {
    literals: Vec<(Regex, String)>,
}

impl LiteralPass {
    pub(crate) fn new(dict: &LocaleDictionary) -> Result<Self, SalvageError> {
        let literals = dict
            .literals
            .iter()
            .map(|lit| {
                let pattern = lit
                    .from
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+");
                Regex::new(&pattern)
                    .map(|re| (re, lit.to.clone()))
                    .map_err(|e| {
                        SalvageError::InvalidConfig(format!(
                            "invalid literal '{}': {}",
                            lit.from, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { literals })
    }
}

impl RepairPass for LiteralPass {
    fn name(&self) -> &str {
        "literals"
    }

    fn order(&self) -> u32 {
        61
    }

    fn apply(&self, text: &str) -> Result<String, RepairError> {
        let mut out = text.to_string();
        for (re, to) in &self.literals {
            out = re.replace_all(&out, regex::NoExpand(to)).into_owned();
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_br() -> LocaleDictionary {
        LocaleDictionary::embedded("pt-BR").unwrap()
    }

    #[test]
    fn embedded_dictionary_loads() {
        let dict = pt_br();
        assert_eq!(dict.locale, "pt-BR");
        assert!(dict.version >= 1);
        assert!(dict.words.iter().any(|w| w == "vendas"));
        assert_eq!(dict.phrases["urboaeeoconxl"], "urbano ocorrência");
        assert_eq!(dict.literals[0].from, "PaMs mMp");
        assert!(LocaleDictionary::embedded("PT-br").is_ok());
    }

    #[test]
    fn unknown_locale_is_config_error() {
        assert!(matches!(
            LocaleDictionary::embedded("xx-YY"),
            Err(SalvageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_malformed_dictionaries() {
        assert!(LocaleDictionary::from_json("{").is_err());
        assert!(LocaleDictionary::from_json(r#"{"locale": "", "version": 1}"#).is_err());
        assert!(LocaleDictionary::from_json(
            r#"{"locale": "en", "version": 1, "words": ["a"]}"#
        )
        .is_err());
        let ok = LocaleDictionary::from_json(r#"{"locale": "en", "version": 2}"#).unwrap();
        assert!(ok.words.is_empty() && ok.phrases.is_empty() && ok.literals.is_empty());
    }

    #[test]
    fn despaces_dictionary_words_only() {
        let pass = DespacePass::new(&pt_br());
        assert_eq!(pass.apply("v e n d a s").unwrap(), "vendas");
        assert_eq!(pass.apply("x y z").unwrap(), "x y z");
        assert_eq!(
            pass.apply("Curso de v e n d a s e f e c h a m e n t o").unwrap(),
            "Curso de vendas e fechamento"
        );
        assert_eq!(pass.apply("V e n d a s").unwrap(), "V e n d a s");
        assert_eq!(pass.apply("V E N D A S").unwrap(), "V E N D A S");
        assert_eq!(pass.apply("r e u n i ã o").unwrap(), "reunião");
    }

    #[test]
    fn prefers_longest_entry() {
        let pass = DespacePass::new(&pt_br());
        assert_eq!(pass.apply("f e c h a m e n t o").unwrap(), "fechamento");
        assert_eq!(pass.apply("f e c h o").unwrap(), "fecho");
    }

    #[test]
    fn phrases_match_after_ligature_expansion() {
        let pass = DespacePass::new(&pt_br());
        assert_eq!(
            pass.apply("u r b o a e e o c o n x l").unwrap(),
            "urbano ocorrência"
        );
        assert_eq!(
            pass.apply("r m e h r fi c i d s m").unwrap(),
            "reme hr ficidade"
        );
        // Phrase output survives a second application.
        let once = pass.apply("g a z o e ç n e a").unwrap();
        assert_eq!(once, "gaz o e ç ne a");
        assert_eq!(pass.apply(&once).unwrap(), once);
    }

    #[test]
    fn literals_replace_substrings() {
        let pass = LiteralPass::new(&pt_br()).unwrap();
        assert_eq!(pass.apply("2 PaMs mMp").unwrap(), "2 Páginas");
        assert_eq!(pass.apply("2 PaMs\n  mMp").unwrap(), "2 Páginas");
        assert_eq!(pass.apply("PaMs").unwrap(), "Páginas");
        assert_eq!(pass.apply("PaMsX").unwrap(), "PáginasX");
        assert_eq!(pass.apply("xmMpy").unwrap(), "xy");
    }

    #[test]
    fn embedded_words_are_single_spelling() {
        let dict = pt_br();
        assert!(dict.words.iter().any(|w| w == "telefónica"));
        assert!(!dict.words.iter().any(|w| w == "telefônica"));
    }
}
