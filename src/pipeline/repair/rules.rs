//! Built-in repair passes, in application order.
//!
//! Literal tables and regex rules are plain data; the engine compiles the
//! regex rules once when it is built.

use super::{RepairPass, RepairRule};
use crate::error::RepairError;

// ── Pass 10: Encoding fix-ups ────────────────────────────────────────────────
//
// UTF-8 bytes of accented Latin letters that were decoded as Latin-1.
// `Ã` + NBSP is `à`; `Ã` followed by a plain space is left untouched.

const ENCODING_FIXES: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã\u{a0}", "à"),
    ("Ã¢", "â"),
    ("Ã£", "ã"),
    ("Ã¤", "ä"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ãª", "ê"),
    ("Ã«", "ë"),
    ("Ã\u{ad}", "í"),
    ("Ã¬", "ì"),
    ("Ã®", "î"),
    ("Ã¯", "ï"),
    ("Ã³", "ó"),
    ("Ã²", "ò"),
    ("Ã´", "ô"),
    ("Ãµ", "õ"),
    ("Ã¶", "ö"),
    ("Ãº", "ú"),
    ("Ã¹", "ù"),
    ("Ã»", "û"),
    ("Ã¼", "ü"),
    ("Ã§", "ç"),
    ("Ã±", "ñ"),
];

// ── Pass 20: Ligatures ───────────────────────────────────────────────────────

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
];

// ── Pass 25: Invisible characters ────────────────────────────────────────────

const INVISIBLE: &[(&str, &str)] = &[
    ("\u{200B}", ""),
    ("\u{200C}", ""),
    ("\u{200D}", ""),
    ("\u{2060}", ""),
    ("\u{FEFF}", ""),
    ("\u{00AD}", ""),
];

/// Fixed-string substitutions, applied in table order.
#[derive(Debug)]
pub(crate) struct TablePass {
    name: &'static str,
    order: u32,
    table: &'static [(&'static str, &'static str)],
}

impl RepairPass for TablePass {
    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn apply(&self, text: &str) -> Result<String, RepairError> {
        let mut out = text.to_string();
        for (from, to) in self.table {
            if out.contains(from) {
                out = out.replace(from, to);
            }
        }
        Ok(out)
    }
}

pub(crate) fn table_passes() -> Vec<TablePass> {
    vec![
        TablePass {
            name: "encoding",
            order: 10,
            table: ENCODING_FIXES,
        },
        TablePass {
            name: "ligatures",
            order: 20,
            table: LIGATURES,
        },
        TablePass {
            name: "invisible",
            order: 25,
            table: INVISIBLE,
        },
    ]
}

// ── Passes 30–50: Regex rules ────────────────────────────────────────────────

/// Whitespace, punctuation and bullet rules as `(pattern, replacement, order)`.
const REGEX_RULES: &[(&str, &str, u32)] = &[
    // Line endings.
    (r"\r\n?", "\n", 30),
    // Horizontal whitespace runs (tabs, NBSP, …) → one space.
    (r"[^\S\n]+", " ", 31),
    // Leading/trailing spaces on each line.
    (r"(?m)^ +| +$", "", 32),
    // Paragraph breaks: at most one blank line.
    (r"\n{3,}", "\n\n", 33),
    // No whitespace, line breaks included, before punctuation.
    (r"\s+([.,;:!?])", "${1}", 40),
    // One space after punctuation followed by a letter.
    (r"([.,;:!?])(\p{L})", "${1} ${2}", 41),
    // Spurious bullet glyphs, singly or in runs.
    ("\u{25CF}+", "", 50),
];

pub(crate) fn builtin_rules() -> Vec<RepairRule> {
    REGEX_RULES
        .iter()
        .map(|(pattern, replacement, order)| RepairRule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            order: *order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(name: &str) -> TablePass {
        table_passes()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn encoding_table_has_every_entry() {
        assert_eq!(ENCODING_FIXES.len(), 24);
        let p = pass("encoding");
        assert_eq!(p.apply("AvaliaÃ§Ã£o").unwrap(), "Avaliação");
        assert_eq!(p.apply("Ã\u{a0} tarde").unwrap(), "à tarde");
        assert_eq!(p.apply("prÃ³ximo").unwrap(), "próximo");
        assert_eq!(p.apply("Ã plain").unwrap(), "Ã plain");
    }

    #[test]
    fn ligatures_expand() {
        let p = pass("ligatures");
        assert_eq!(p.apply("\u{FB01}nal \u{FB02}ow").unwrap(), "final flow");
        assert_eq!(p.apply("o\u{FB03}ce e\u{FB00}ort").unwrap(), "office effort");
        assert_eq!(p.apply("ba\u{FB04}e").unwrap(), "baffle");
    }

    #[test]
    fn invisible_characters_removed() {
        let p = pass("invisible");
        assert_eq!(p.apply("\u{FEFF}zero\u{200B}width soft\u{AD}hyphen").unwrap(), "zerowidth softhyphen");
    }

    #[test]
    fn builtin_rules_are_ordered() {
        let rules = builtin_rules();
        assert!(rules.windows(2).all(|w| w[0].order < w[1].order));
    }
}
