//! Pure reductions from completed resolutions to report sections.
//!
//! Every function here accepts resolutions in any order and emits entries
//! in input order.

use std::collections::BTreeMap;

use crate::index::CandidateIndex;
use crate::model::{
    AuditEntry, Diagnostics, MatchTier, MatchedCode, NoMatchReason, ReportSummary, Resolution,
    UnmatchedEntry,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TierCounts {
    exact: usize,
    contains: usize,
    fuzzy: usize,
    no_match: usize,
}

impl TierCounts {
    fn add(mut self, tier: MatchTier) -> Self {
        match tier {
            MatchTier::Exact => self.exact += 1,
            MatchTier::Contains => self.contains += 1,
            MatchTier::Fuzzy => self.fuzzy += 1,
            MatchTier::NoMatch => self.no_match += 1,
        }
        self
    }
}

/// Share of matched queries in percent, one decimal. Zero for an empty run.
pub fn match_rate_percent(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (matched as f64 * 1000.0 / total as f64).round() / 10.0
}

pub fn compute_summary(resolutions: &[Resolution]) -> ReportSummary {
    let counts = resolutions
        .iter()
        .fold(TierCounts::default(), |acc, r| acc.add(r.result.tier));
    let matched = counts.exact + counts.contains + counts.fuzzy;

    ReportSummary {
        total_queries: resolutions.len(),
        exact_count: counts.exact,
        contains_count: counts.contains,
        fuzzy_count: counts.fuzzy,
        no_match_count: counts.no_match,
        matched_count: matched,
        match_rate_percent: match_rate_percent(matched, resolutions.len()),
    }
}

fn in_input_order(resolutions: &[Resolution]) -> Vec<&Resolution> {
    let mut ordered: Vec<&Resolution> = resolutions.iter().collect();
    ordered.sort_by_key(|r| r.position);
    ordered
}

/// Linkage records for every resolved query.
pub fn matched_codes(resolutions: &[Resolution]) -> Vec<MatchedCode> {
    in_input_order(resolutions)
        .into_iter()
        .filter_map(|r| {
            let record = r.result.matched.as_ref()?;
            Some(MatchedCode {
                query: r.query.raw_name.clone(),
                code: record.code.clone(),
                matched_name: record.name.clone(),
                province: r
                    .query
                    .province()
                    .map(str::to_string)
                    .unwrap_or_else(|| record.province.clone()),
                regency: record.regency.clone(),
                district: record.district.clone(),
                area_km2: record.area_km2,
                match_tier: r.result.tier,
                similarity: r.result.similarity,
            })
        })
        .collect()
}

/// Review list: every unresolved query with its nearest candidates.
pub fn unmatched(resolutions: &[Resolution]) -> Vec<UnmatchedEntry> {
    in_input_order(resolutions)
        .into_iter()
        .filter(|r| !r.result.tier.is_match())
        .map(|r| UnmatchedEntry {
            query: r.query.raw_name.clone(),
            province: r.query.province.clone(),
            normalized_query: r.normalized_query.clone(),
            reason: r.result.reason.unwrap_or(NoMatchReason::BelowThreshold),
            top_candidates: r.result.top_candidates.clone(),
        })
        .collect()
}

/// One line per query, whatever its outcome.
pub fn audit_trail(resolutions: &[Resolution]) -> Vec<AuditEntry> {
    in_input_order(resolutions)
        .into_iter()
        .map(|r| AuditEntry {
            position: r.position,
            query: r.query.raw_name.clone(),
            province: r.query.province.clone(),
            normalized_query: r.normalized_query.clone(),
            tier: r.result.tier,
            matched_name: r.result.matched.as_ref().map(|m| m.name.clone()),
            code: r.result.matched.as_ref().map(|m| m.code.clone()),
            similarity: r.result.score(),
            candidates_considered: r.result.candidates_considered,
            reason: r.result.reason,
        })
        .collect()
}

pub fn diagnostics(index: &CandidateIndex, resolutions: &[Resolution]) -> Diagnostics {
    let mut unresolved_query_provinces: BTreeMap<String, usize> = BTreeMap::new();
    for r in resolutions {
        if r.result.reason == Some(NoMatchReason::ProvinceNotFound) {
            let label = r.query.province().unwrap_or_default().to_string();
            *unresolved_query_provinces.entry(label).or_insert(0) += 1;
        }
    }

    Diagnostics {
        unrecognized_gazetteer_provinces: index.unrecognized_provinces().clone(),
        unresolved_query_provinces,
        province_candidates: index.group_sizes(),
    }
}
