//! Name canonicalization for comparison.
//!
//! Normalized names are comparison keys only; reports always carry the
//! original spelling next to them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ResolveError;

/// Generic settlement-type words that carry no identity.
pub const DEFAULT_BOILERPLATE: &[&str] = &["UPT", "DESA", "KAMPUNG", "GAMPONG", "KELURAHAN", "DUSUN"];

// Numbered sub-unit markers: "SP 2", "SP.3", "SP. 3A", "UNIT 2", "BLOK 4".
static RE_SUB_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:SP|UNIT|BLOK)\.?\s*\d+\w*").expect("invalid RE_SUB_UNIT")
});
static RE_NON_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z\s]+").expect("invalid RE_NON_LETTER"));
static RE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid RE_WHITESPACE"));

static DEFAULT_NORMALIZER: Lazy<Normalizer> = Lazy::new(|| {
    Normalizer::with_boilerplate(&[]).expect("default boilerplate table must compile")
});

#[derive(Debug, Clone)]
pub struct Normalizer {
    boilerplate: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

impl Normalizer {
    /// Build a normalizer that strips the default boilerplate plus `extra` words.
    pub fn with_boilerplate(extra: &[String]) -> Result<Self, ResolveError> {
        let mut words: Vec<String> = DEFAULT_BOILERPLATE.iter().map(|w| w.to_string()).collect();
        for word in extra {
            let word = word.trim().to_uppercase();
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ResolveError::ConfigValidation(format!(
                    "boilerplate word must be non-empty A-Z letters, got '{word}'"
                )));
            }
            if !words.contains(&word) {
                words.push(word);
            }
        }

        let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
        let boilerplate = Regex::new(&format!(r"\b(?:{alternation})\b"))
            .map_err(|e| ResolveError::ConfigValidation(format!("boilerplate table: {e}")))?;

        Ok(Self { boilerplate })
    }

    pub fn normalize(&self, name: &str) -> String {
        let upper = name.trim().to_uppercase();
        if upper.is_empty() {
            return String::new();
        }

        let without_units = RE_SUB_UNIT.replace_all(&upper, " ");
        let without_words = self.boilerplate.replace_all(&without_units, " ");
        let letters_only = RE_NON_LETTER.replace_all(&without_words, "");
        RE_WHITESPACE.replace_all(&letters_only, " ").trim().to_string()
    }
}

/// Normalize with the default boilerplate table.
pub fn normalize(name: &str) -> String {
    DEFAULT_NORMALIZER.normalize(name)
}

/// Case and edge-whitespace folding used by the exact tier.
pub fn fold_case(name: &str) -> String {
    name.trim().to_uppercase()
}
