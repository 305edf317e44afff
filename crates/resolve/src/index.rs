//! Province-scoped candidate lookup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;

use crate::error::ResolveError;
use crate::model::GazetteerRecord;
use crate::normalize::{fold_case, Normalizer};

/// Canonical Indonesian provinces with the alternate spellings seen in
/// gazetteers and registers.
const INDONESIA: &[(&str, &[&str])] = &[
    ("Aceh", &["NANGGROE ACEH DARUSSALAM", "NAD", "DI ACEH", "DAERAH ISTIMEWA ACEH"]),
    ("Sumatera Utara", &["SUMATRA UTARA", "SUMUT"]),
    ("Sumatera Barat", &["SUMATRA BARAT", "SUMBAR"]),
    ("Riau", &[]),
    ("Jambi", &[]),
    ("Sumatera Selatan", &["SUMATRA SELATAN", "SUMSEL"]),
    ("Bengkulu", &[]),
    ("Lampung", &[]),
    ("Kepulauan Bangka Belitung", &["BANGKA BELITUNG", "KEP BANGKA BELITUNG", "BABEL"]),
    ("Kepulauan Riau", &["KEP RIAU", "KEPRI"]),
    ("DKI Jakarta", &["JAKARTA", "DAERAH KHUSUS IBUKOTA JAKARTA"]),
    ("Jawa Barat", &["JABAR"]),
    ("Jawa Tengah", &["JATENG"]),
    ("Daerah Istimewa Yogyakarta", &["DI YOGYAKARTA", "YOGYAKARTA", "DIY"]),
    ("Jawa Timur", &["JATIM"]),
    ("Banten", &[]),
    ("Bali", &[]),
    ("Nusa Tenggara Barat", &["NTB"]),
    ("Nusa Tenggara Timur", &["NTT"]),
    ("Kalimantan Barat", &["KALBAR"]),
    ("Kalimantan Tengah", &["KALTENG"]),
    ("Kalimantan Selatan", &["KALSEL"]),
    ("Kalimantan Timur", &["KALTIM"]),
    ("Kalimantan Utara", &["KALTARA"]),
    ("Sulawesi Utara", &["SULUT"]),
    ("Sulawesi Tengah", &["SULTENG"]),
    ("Sulawesi Selatan", &["SULSEL"]),
    ("Sulawesi Tenggara", &["SULTRA"]),
    ("Gorontalo", &[]),
    ("Sulawesi Barat", &["SULBAR"]),
    ("Maluku", &[]),
    ("Maluku Utara", &["MALUT"]),
    ("Papua", &[]),
    ("Papua Barat", &["IRIAN JAYA BARAT"]),
    ("Papua Selatan", &[]),
    ("Papua Tengah", &[]),
    ("Papua Pegunungan", &[]),
    ("Papua Barat Daya", &[]),
];

/// Lookup form of a province label: uppercase, punctuation to spaces,
/// whitespace collapsed.
pub fn fold_province(label: &str) -> String {
    let upper: String = label
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Bidirectional province alias table.
///
/// Every spelling (the canonical label included) maps to exactly one
/// canonical label; `insert` rejects a spelling already owned by another.
#[derive(Debug, Clone, Default)]
pub struct ProvinceAliases {
    spellings: BTreeMap<String, BTreeSet<String>>,
    lookup: HashMap<String, String>,
}

impl ProvinceAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of the 38 Indonesian provinces.
    pub fn indonesia() -> Self {
        let mut aliases = Self::new();
        for (canonical, spellings) in INDONESIA {
            let spellings: Vec<String> = spellings.iter().map(|s| s.to_string()).collect();
            aliases
                .insert(canonical, &spellings)
                .expect("built-in province table has no conflicting spellings");
        }
        aliases
    }

    /// Register `canonical` and its alternate `spellings`.
    ///
    /// A canonical label that folds to an existing canonical extends that
    /// entry instead of creating a new one.
    pub fn insert(&mut self, canonical: &str, spellings: &[String]) -> Result<(), ResolveError> {
        let folded_canonical = fold_province(canonical);
        let label = match self.lookup.get(&folded_canonical) {
            Some(existing) if fold_province(existing) == folded_canonical => existing.clone(),
            Some(existing) => {
                return Err(ResolveError::AliasConflict {
                    spelling: folded_canonical,
                    first: existing.clone(),
                    second: canonical.to_string(),
                })
            }
            None => canonical.trim().to_string(),
        };

        let mut folded: Vec<String> = vec![folded_canonical];
        folded.extend(spellings.iter().map(|s| fold_province(s)).filter(|s| !s.is_empty()));

        for spelling in &folded {
            if let Some(owner) = self.lookup.get(spelling) {
                if *owner != label {
                    return Err(ResolveError::AliasConflict {
                        spelling: spelling.clone(),
                        first: owner.clone(),
                        second: label,
                    });
                }
            }
        }

        let entry = self.spellings.entry(label.clone()).or_default();
        for spelling in folded {
            entry.insert(spelling.clone());
            self.lookup.insert(spelling, label.clone());
        }
        Ok(())
    }

    /// Canonical label for any known spelling.
    pub fn resolve(&self, spelling: &str) -> Option<&str> {
        self.lookup.get(&fold_province(spelling)).map(String::as_str)
    }

    /// Folded spellings registered for a canonical label.
    pub fn spellings(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.spellings.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.spellings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spellings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Candidate index
// ---------------------------------------------------------------------------

/// A gazetteer record with its comparison keys precomputed.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub record: GazetteerRecord,
    /// Uppercased, trimmed raw name (exact tier).
    pub folded: String,
    /// Fully normalized name (contains and fuzzy tiers).
    pub normalized: String,
}

/// Gazetteer partitioned by canonical province, each partition in
/// gazetteer order.
#[derive(Debug)]
pub struct CandidateIndex {
    aliases: ProvinceAliases,
    groups: HashMap<String, Vec<Candidate>>,
    unrecognized: BTreeMap<String, usize>,
    total: usize,
}

impl CandidateIndex {
    pub fn build(
        records: Vec<GazetteerRecord>,
        aliases: ProvinceAliases,
        normalizer: &Normalizer,
    ) -> Self {
        let total = records.len();
        let candidates: Vec<Candidate> = records
            .into_par_iter()
            .map(|record| Candidate {
                folded: fold_case(&record.name),
                normalized: normalizer.normalize(&record.name),
                record,
            })
            .collect();

        let mut groups: HashMap<String, Vec<Candidate>> = HashMap::new();
        let mut unrecognized: BTreeMap<String, usize> = BTreeMap::new();

        for candidate in candidates {
            let key = match aliases.resolve(&candidate.record.province) {
                Some(canonical) => canonical.to_string(),
                None => {
                    let folded = fold_province(&candidate.record.province);
                    *unrecognized.entry(folded.clone()).or_insert(0) += 1;
                    folded
                }
            };
            groups.entry(key).or_default().push(candidate);
        }

        for (spelling, count) in &unrecognized {
            log::warn!(
                "gazetteer province '{spelling}' is not in the alias table ({count} records indexed under it)"
            );
        }
        log::info!("indexed {total} gazetteer records into {} provinces", groups.len());

        Self {
            aliases,
            groups,
            unrecognized,
            total,
        }
    }

    /// Partition key for a province label: its canonical label when the
    /// alias table knows it, otherwise its folded spelling.
    pub fn province_key(&self, province: &str) -> String {
        match self.aliases.resolve(province) {
            Some(canonical) => canonical.to_string(),
            None => fold_province(province),
        }
    }

    /// Candidates for `province` in gazetteer order; empty when the
    /// province is unknown or has no records.
    pub fn candidates_for(&self, province: &str) -> &[Candidate] {
        self.candidates_for_key(&self.province_key(province))
    }

    /// Candidates for a key already produced by [`province_key`](Self::province_key).
    pub fn candidates_for_key(&self, key: &str) -> &[Candidate] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gazetteer spellings missing from the alias table, with record counts.
    pub fn unrecognized_provinces(&self) -> &BTreeMap<String, usize> {
        &self.unrecognized
    }

    pub fn group_sizes(&self) -> BTreeMap<String, usize> {
        self.groups.iter().map(|(k, v)| (k.clone(), v.len())).collect()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
