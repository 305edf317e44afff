//! Tiered resolution of one query against its province's candidates.
//!
//! Tiers run in trust order and the first acceptance wins:
//! exact (case/whitespace folding only) → contains (normalized substring,
//! best similarity) → fuzzy (best similarity over a bounded deterministic
//! sample). Nothing is re-ranked after acceptance.

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::index::{fold_province, Candidate};
use crate::model::{MatchResult, MatchTier, NoMatchReason, QueryName, ScoredCandidate};
use crate::normalize::{fold_case, Normalizer};
use crate::sample::{derive_seed, sample_positions};
use crate::similarity::similarity;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchParams {
    pub contains_threshold: f64,
    pub fuzzy_threshold: f64,
    pub min_contains_len: usize,
    pub sample_cap: usize,
    pub seed: u64,
    pub top_candidates: usize,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            contains_threshold: 0.5,
            fuzzy_threshold: 0.7,
            min_contains_len: 4,
            sample_cap: 5000,
            seed: 42,
            top_candidates: 3,
        }
    }
}

impl MatchParams {
    pub fn from_config(config: &ResolveConfig) -> Self {
        Self {
            contains_threshold: config.thresholds.contains,
            fuzzy_threshold: config.thresholds.fuzzy,
            min_contains_len: config.thresholds.min_contains_len,
            sample_cap: config.sampling.cap,
            seed: config.sampling.seed,
            top_candidates: config.report.top_candidates,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    params: MatchParams,
    normalizer: Normalizer,
}

impl Matcher {
    pub fn new(params: MatchParams, normalizer: Normalizer) -> Self {
        Self { params, normalizer }
    }

    pub fn from_config(config: &ResolveConfig) -> Result<Self, ResolveError> {
        Ok(Self::new(MatchParams::from_config(config), config.normalizer()?))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Resolve `query` against its province's `candidates` (gazetteer order).
    ///
    /// Never fails: a missing province, an empty candidate set and a name
    /// that normalizes to nothing all come back as `NoMatch` with a reason.
    /// The sample is keyed on the query's folded province label; use
    /// [`resolve_in`](Self::resolve_in) to key it on the index's canonical label.
    pub fn resolve(&self, query: &QueryName, candidates: &[Candidate]) -> MatchResult {
        let scope = query.province().map(fold_province).unwrap_or_default();
        self.resolve_in(query, &scope, candidates)
    }

    /// Resolve with the fuzzy sample keyed on `province_key`, so every
    /// spelling of one province draws the same sample for the same name.
    pub fn resolve_in(&self, query: &QueryName, province_key: &str, candidates: &[Candidate]) -> MatchResult {
        if query.province().is_none() {
            return MatchResult::no_match(NoMatchReason::MissingProvince, 0, Vec::new());
        }
        if candidates.is_empty() {
            return MatchResult::no_match(NoMatchReason::ProvinceNotFound, 0, Vec::new());
        }

        // Boilerplate-only names ("SP 3", "UPT") identify nothing, not even
        // a candidate spelled the same way.
        let normalized = self.normalizer.normalize(&query.raw_name);
        if normalized.is_empty() {
            return MatchResult::no_match(NoMatchReason::DegenerateName, candidates.len(), Vec::new());
        }

        if let Some(result) = self.exact(query, candidates) {
            return result;
        }
        if let Some(result) = self.contains(&normalized, candidates) {
            return result;
        }
        self.fuzzy(province_key, &normalized, candidates)
    }

    fn exact(&self, query: &QueryName, candidates: &[Candidate]) -> Option<MatchResult> {
        let folded = fold_case(&query.raw_name);
        // First in gazetteer order wins a tie.
        candidates
            .iter()
            .find(|c| c.folded == folded)
            .map(|c| MatchResult::accepted(MatchTier::Exact, &c.record, None, candidates.len()))
    }

    fn contains(&self, normalized: &str, candidates: &[Candidate]) -> Option<MatchResult> {
        if normalized.chars().count() < self.params.min_contains_len {
            return None;
        }

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in candidates.iter().filter(|c| c.normalized.contains(normalized)) {
            let score = similarity(normalized, &candidate.normalized);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        let (candidate, score) = best?;
        if score < self.params.contains_threshold {
            return None;
        }
        Some(MatchResult::accepted(
            MatchTier::Contains,
            &candidate.record,
            Some(score),
            candidates.len(),
        ))
    }

    fn fuzzy(&self, province_key: &str, normalized: &str, candidates: &[Candidate]) -> MatchResult {
        let seed = derive_seed(self.params.seed, province_key, normalized);
        let scored: Vec<(usize, f64)> = sample_positions(candidates.len(), self.params.sample_cap, seed)
            .into_iter()
            .filter(|&pos| !candidates[pos].normalized.is_empty())
            .map(|pos| (pos, similarity(normalized, &candidates[pos].normalized)))
            .collect();

        let mut best: Option<(usize, f64)> = None;
        for &(pos, score) in &scored {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }

        if let Some((pos, score)) = best {
            if score >= self.params.fuzzy_threshold {
                return MatchResult::accepted(
                    MatchTier::Fuzzy,
                    &candidates[pos].record,
                    Some(score),
                    scored.len(),
                );
            }
        }

        let considered = scored.len();
        let mut ranked = scored;
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let top = ranked
            .into_iter()
            .take(self.params.top_candidates)
            .map(|(pos, score)| ScoredCandidate {
                name: candidates[pos].record.name.clone(),
                code: candidates[pos].record.code.clone(),
                score,
            })
            .collect();

        MatchResult::no_match(NoMatchReason::BelowThreshold, considered, top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GazetteerRecord;
    use crate::normalize::normalize;

    fn cand(code: &str, name: &str) -> Candidate {
        Candidate {
            record: GazetteerRecord {
                code: code.into(),
                name: name.into(),
                province: "Kalimantan Timur".into(),
                regency: "Paser".into(),
                district: "Batu Sopang".into(),
                area_km2: None,
            },
            folded: fold_case(name),
            normalized: normalize(name),
        }
    }

    fn query(name: &str) -> QueryName {
        QueryName::new("Kalimantan Timur", name)
    }

    fn code(result: &MatchResult) -> &str {
        result.matched.as_ref().map(|r| r.code.as_str()).unwrap_or("")
    }

    #[test]
    fn exact_match() {
        let c = vec![cand("33.01.001", "DADAHUP"), cand("33.01.002", "KAHINGAI")];
        let r = Matcher::default().resolve(&query("dadahup "), &c);
        assert_eq!(r.tier, MatchTier::Exact);
        assert_eq!(code(&r), "33.01.001");
        assert_eq!(r.similarity, None);
        assert_eq!(r.score(), Some(1.0));
        assert_eq!(r.candidates_considered, 2);
    }

    #[test]
    fn exact_beats_better_contains_candidate() {
        // "SP 1 DADAHUP" normalizes to an identical key but is only a contains hit.
        let c = vec![cand("1", "SP 1 DADAHUP"), cand("2", "Dadahup")];
        let r = Matcher::default().resolve(&query("DADAHUP"), &c);
        assert_eq!(r.tier, MatchTier::Exact);
        assert_eq!(code(&r), "2");
    }

    #[test]
    fn exact_tie_goes_to_first_in_order() {
        let c = vec![cand("A", "TOKALA"), cand("B", "TOKALA")];
        let r = Matcher::default().resolve(&query("TOKALA"), &c);
        assert_eq!(code(&r), "A");
    }

    #[test]
    fn exact_uses_folding_not_normalization() {
        // Normalization would strip "UPT"; exact must not.
        let c = vec![cand("1", "SEPINTUN")];
        let r = Matcher::default().resolve(&query("UPT SEPINTUN"), &c);
        assert_ne!(r.tier, MatchTier::Exact);
        assert_eq!(r.tier, MatchTier::Contains);
    }

    #[test]
    fn contains_match_on_sub_unit_name() {
        let c = vec![cand("1", "KELADEN BARU"), cand("2", "SP 2 KELADEN")];
        let r = Matcher::default().resolve(&query("KELADEN"), &c);
        assert_eq!(r.tier, MatchTier::Contains);
        assert_eq!(code(&r), "2");
        assert!(r.similarity.unwrap() >= 0.5);
    }

    #[test]
    fn contains_picks_highest_similarity() {
        let c = vec![cand("1", "BATU AMPAR HULU SELATAN"), cand("2", "BATU AMPAR BARU")];
        let r = Matcher::default().resolve(&query("BATU AMPAR"), &c);
        assert_eq!(r.tier, MatchTier::Contains);
        assert_eq!(code(&r), "2");
    }

    #[test]
    fn short_query_skips_contains() {
        // "TOK" is inside "TOKALA" (similarity 0.67) but too short for contains,
        // and 0.67 is below the fuzzy threshold.
        let c = vec![cand("1", "TOKALA")];
        let r = Matcher::default().resolve(&query("TOK"), &c);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::BelowThreshold));
        assert_eq!(r.top_candidates[0].code, "1");

        let relaxed = MatchParams { min_contains_len: 3, ..MatchParams::default() };
        let r = Matcher::new(relaxed, Normalizer::default()).resolve(&query("TOK"), &c);
        assert_eq!(r.tier, MatchTier::Contains);
    }

    #[test]
    fn weak_contains_falls_through() {
        let c = vec![cand("1", "BATUKARAS SELATAN JAYA")];
        let r = Matcher::default().resolve(&query("BATU"), &c);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::BelowThreshold));
    }

    #[test]
    fn fuzzy_match_on_spelling_variant() {
        let c = vec![cand("1", "PASER BELENGKONG"), cand("2", "KELADEN")];
        let r = Matcher::default().resolve(&query("KLADEN"), &c);
        assert_eq!(r.tier, MatchTier::Fuzzy);
        assert_eq!(code(&r), "2");
        assert!(r.similarity.unwrap() >= 0.7);
        assert_eq!(r.candidates_considered, 2);
    }

    #[test]
    fn no_match_keeps_top_candidates() {
        let c = vec![
            cand("1", "LAGADING"),
            cand("2", "MAHALONA"),
            cand("3", "BEKKAE"),
            cand("4", "SUPI"),
        ];
        let r = Matcher::default().resolve(&query("TANAKEKE"), &c);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::BelowThreshold));
        assert!(r.matched.is_none());
        assert_eq!(r.top_candidates.len(), 3);
        assert!(r.top_candidates.iter().all(|t| t.score < 0.7));
        assert!(r.top_candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn empty_candidate_set_is_province_not_found() {
        let r = Matcher::default().resolve(&query("DADAHUP"), &[]);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::ProvinceNotFound));
        assert_eq!(r.candidates_considered, 0);
    }

    #[test]
    fn missing_province_has_its_own_reason() {
        let c = vec![cand("1", "DADAHUP")];
        let q = QueryName { raw_name: "DADAHUP".into(), province: Some("  ".into()) };
        let r = Matcher::default().resolve(&q, &c);
        assert_eq!(r.reason, Some(NoMatchReason::MissingProvince));
        assert_eq!(r.candidates_considered, 0);
    }

    #[test]
    fn degenerate_name_never_matches() {
        let c = vec![cand("1", "UPT"), cand("2", "DADAHUP")];
        let r = Matcher::default().resolve(&query("SP 3"), &c);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::DegenerateName));
        assert!(r.top_candidates.is_empty());
    }

    #[test]
    fn degenerate_name_does_not_exact_match_same_spelling() {
        let c = vec![cand("1", "UPT"), cand("2", "SP 3")];
        let r = Matcher::default().resolve(&query("SP 3"), &c);
        assert_eq!(r.tier, MatchTier::NoMatch);
        assert_eq!(r.reason, Some(NoMatchReason::DegenerateName));
        assert!(r.matched.is_none());
        assert_eq!(r.candidates_considered, 2);

        let r = Matcher::default().resolve(&query(" upt "), &c);
        assert_eq!(r.reason, Some(NoMatchReason::DegenerateName));
    }

    #[test]
    fn sample_follows_province_key_not_label() {
        let letter = |n: usize| char::from(b'A' + (n % 26) as u8);
        let c: Vec<Candidate> = (0..200)
            .map(|i| cand(&format!("{i}"), &format!("KAMPUNG {}{}", letter(i / 26), letter(i))))
            .collect();
        let params = MatchParams { sample_cap: 20, ..MatchParams::default() };
        let m = Matcher::new(params, Normalizer::default());

        let a = m.resolve_in(&QueryName::new("Sumatra Barat", "NOMOR BETA"), "Sumatera Barat", &c);
        let b = m.resolve_in(&QueryName::new("SUMATERA BARAT", "NOMOR BETA"), "Sumatera Barat", &c);
        assert_eq!(a, b);
        assert_eq!(a.candidates_considered, 20);
    }

    #[test]
    fn empty_normalized_candidates_are_not_scored() {
        let c = vec![cand("1", "UPT"), cand("2", "SP 2"), cand("3", "ZZZZZZ")];
        let r = Matcher::default().resolve(&query("KLADEN"), &c);
        assert_eq!(r.candidates_considered, 1);
        assert_eq!(r.top_candidates.len(), 1);
        assert_eq!(r.top_candidates[0].code, "3");
    }

    #[test]
    fn sampling_is_bounded_and_reproducible() {
        let c: Vec<Candidate> = (0..300).map(|i| cand(&format!("{i}"), &format!("DESA NOMOR {i} ALPHA"))).collect();
        let params = MatchParams { sample_cap: 25, ..MatchParams::default() };
        let m = Matcher::new(params, Normalizer::default());
        let first = m.resolve(&query("NOMOR BETA"), &c);
        let second = m.resolve(&query("NOMOR BETA"), &c);
        assert_eq!(first.candidates_considered, 25);
        assert_eq!(first, second);
    }
}
