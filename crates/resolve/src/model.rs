use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One authoritative settlement from the gazetteer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GazetteerRecord {
    pub code: String,
    pub name: String,
    pub province: String,
    pub regency: String,
    pub district: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_km2: Option<f64>,
}

/// One settlement name to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryName {
    pub raw_name: String,
    pub province: Option<String>,
}

impl QueryName {
    pub fn new(province: impl Into<String>, raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            province: Some(province.into()),
        }
    }

    /// The province label, if present and not blank.
    pub fn province(&self) -> Option<&str> {
        self.province
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Pre-loaded gazetteer and query list.
pub struct ResolveInput {
    pub gazetteer: Vec<GazetteerRecord>,
    pub queries: Vec<QueryName>,
}

// ---------------------------------------------------------------------------
// Per-query outcome
// ---------------------------------------------------------------------------

/// Match strategy that produced a result, most trusted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Contains,
    Fuzzy,
    NoMatch,
}

impl MatchTier {
    pub fn is_match(self) -> bool {
        self != Self::NoMatch
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Contains => write!(f, "contains"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::NoMatch => write!(f, "no_match"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// Query carries no province label.
    MissingProvince,
    /// Province label resolved to no gazetteer records.
    ProvinceNotFound,
    /// Query normalizes to an empty name.
    DegenerateName,
    /// Candidates were scored but none crossed a threshold.
    BelowThreshold,
}

impl std::fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProvince => write!(f, "missing province"),
            Self::ProvinceNotFound => write!(f, "province not found"),
            Self::DegenerateName => write!(f, "degenerate name"),
            Self::BelowThreshold => write!(f, "below threshold"),
        }
    }
}

/// A near miss kept for human review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub name: String,
    pub code: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub tier: MatchTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<GazetteerRecord>,
    /// Set for Contains and Fuzzy; Exact implies 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub candidates_considered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoMatchReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_candidates: Vec<ScoredCandidate>,
}

impl MatchResult {
    pub(crate) fn accepted(
        tier: MatchTier,
        record: &GazetteerRecord,
        similarity: Option<f64>,
        candidates_considered: usize,
    ) -> Self {
        Self {
            tier,
            matched: Some(record.clone()),
            similarity,
            candidates_considered,
            reason: None,
            top_candidates: Vec::new(),
        }
    }

    pub(crate) fn no_match(
        reason: NoMatchReason,
        candidates_considered: usize,
        top_candidates: Vec<ScoredCandidate>,
    ) -> Self {
        Self {
            tier: MatchTier::NoMatch,
            matched: None,
            similarity: None,
            candidates_considered,
            reason: Some(reason),
            top_candidates,
        }
    }

    /// Effective similarity of the accepted candidate.
    pub fn score(&self) -> Option<f64> {
        match self.tier {
            MatchTier::Exact => Some(1.0),
            MatchTier::NoMatch => None,
            MatchTier::Contains | MatchTier::Fuzzy => self.similarity,
        }
    }
}

/// A query paired with its outcome and input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub position: usize,
    pub query: QueryName,
    pub normalized_query: String,
    pub result: MatchResult,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Downstream linkage record for one resolved query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedCode {
    pub query: String,
    pub code: String,
    pub matched_name: String,
    pub province: String,
    pub regency: String,
    pub district: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_km2: Option<f64>,
    pub match_tier: MatchTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedEntry {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub normalized_query: String,
    pub reason: NoMatchReason,
    pub top_candidates: Vec<ScoredCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub position: usize,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub normalized_query: String,
    pub tier: MatchTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub candidates_considered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoMatchReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_queries: usize,
    pub exact_count: usize,
    pub contains_count: usize,
    pub fuzzy_count: usize,
    pub no_match_count: usize,
    pub matched_count: usize,
    pub match_rate_percent: f64,
}

/// Data-quality findings that do not stop a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Gazetteer province spellings missing from the alias table, with record counts.
    pub unrecognized_gazetteer_provinces: BTreeMap<String, usize>,
    /// Query province labels with no candidates, with query counts.
    pub unresolved_query_provinces: BTreeMap<String, usize>,
    /// Candidate-set size per canonical province.
    pub province_candidates: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub gazetteer_records: usize,
    pub query_provinces: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    pub matched_codes: Vec<MatchedCode>,
    pub unmatched: Vec<UnmatchedEntry>,
    pub audit: Vec<AuditEntry>,
    pub diagnostics: Diagnostics,
}
