use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::index::CandidateIndex;
use crate::matcher::Matcher;
use crate::model::{MatchReport, QueryName, ReportMeta, Resolution, ResolveInput};
use crate::report::{audit_trail, compute_summary, diagnostics, matched_codes, unmatched};

/// Resolve every query against the gazetteer. Returns the full report.
///
/// Fails only on invalid configuration; individual queries never abort a run.
pub fn run(config: &ResolveConfig, input: ResolveInput) -> Result<MatchReport, ResolveError> {
    config.check_ranges()?;
    let matcher = Matcher::from_config(config)?;
    let aliases = config.province_aliases()?;

    let gazetteer_records = input.gazetteer.len();
    log::info!(
        "{}: resolving {} queries against {} gazetteer records",
        config.name,
        input.queries.len(),
        gazetteer_records
    );

    let index = CandidateIndex::build(input.gazetteer, aliases, matcher.normalizer());
    let resolutions = resolve_all(&matcher, &index, &input.queries, config.engine.parallel);

    let summary = compute_summary(&resolutions);
    let diagnostics = diagnostics(&index, &resolutions);
    for (province, count) in &diagnostics.unresolved_query_provinces {
        log::warn!("province '{province}' has no gazetteer candidates ({count} queries unmatched)");
    }
    log::info!(
        "{} exact, {} contains, {} fuzzy, {} unmatched ({:.1}% matched)",
        summary.exact_count,
        summary.contains_count,
        summary.fuzzy_count,
        summary.no_match_count,
        summary.match_rate_percent
    );

    let query_provinces: BTreeSet<String> = input
        .queries
        .iter()
        .filter_map(|q| q.province())
        .map(|p| index.province_key(p))
        .collect();

    Ok(MatchReport {
        meta: ReportMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            gazetteer_records,
            query_provinces: query_provinces.len(),
        },
        summary,
        matched_codes: matched_codes(&resolutions),
        unmatched: unmatched(&resolutions),
        audit: audit_trail(&resolutions),
        diagnostics,
    })
}

/// Resolve one query through the index.
pub fn resolve_query(
    matcher: &Matcher,
    index: &CandidateIndex,
    position: usize,
    query: &QueryName,
) -> Resolution {
    let province_key = query.province().map(|p| index.province_key(p)).unwrap_or_default();
    let candidates = index.candidates_for_key(&province_key);
    let result = matcher.resolve_in(query, &province_key, candidates);

    log::debug!(
        "[{position}] '{}' ({}) -> {} ({} candidates)",
        query.raw_name,
        query.province().unwrap_or("-"),
        result.tier,
        result.candidates_considered
    );

    Resolution {
        position,
        query: query.clone(),
        normalized_query: matcher.normalizer().normalize(&query.raw_name),
        result,
    }
}

/// Resolve all queries, one result per query, in input order.
///
/// Parallel and sequential runs produce identical output: each resolution
/// reads only the shared index and seeds its sample from its own inputs.
pub fn resolve_all(
    matcher: &Matcher,
    index: &CandidateIndex,
    queries: &[QueryName],
    parallel: bool,
) -> Vec<Resolution> {
    if parallel {
        queries
            .par_iter()
            .enumerate()
            .map(|(position, query)| resolve_query(matcher, index, position, query))
            .collect()
    } else {
        queries
            .iter()
            .enumerate()
            .map(|(position, query)| resolve_query(matcher, index, position, query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GazetteerRecord, MatchTier, NoMatchReason};

    fn rec(code: &str, name: &str, province: &str) -> GazetteerRecord {
        GazetteerRecord {
            code: code.into(),
            name: name.into(),
            province: province.into(),
            regency: "Kab".into(),
            district: "Kec".into(),
            area_km2: None,
        }
    }

    fn input() -> ResolveInput {
        ResolveInput {
            gazetteer: vec![
                rec("33.01.001", "DADAHUP", "KALIMANTAN TENGAH"),
                rec("64.01.002", "SP 2 KELADEN", "KALIMANTAN TIMUR"),
                rec("73.01.003", "MAHALONA", "SULAWESI SELATAN"),
                rec("73.01.004", "LAGADING", "SULAWESI SELATAN"),
            ],
            queries: vec![
                QueryName::new("Kalimantan Tengah", "DADAHUP"),
                QueryName::new("Kalimantan Timur", "KELADEN"),
                QueryName::new("Sulawesi Selatan", "TANAKEKE"),
                QueryName::new("Atlantis", "DADAHUP"),
                QueryName { raw_name: "LITO".into(), province: None },
            ],
        }
    }

    #[test]
    fn integration_small_run() {
        let report = run(&ResolveConfig::default(), input()).unwrap();

        assert_eq!(report.summary.total_queries, 5);
        assert_eq!(report.summary.exact_count, 1);
        assert_eq!(report.summary.contains_count, 1);
        assert_eq!(report.summary.no_match_count, 3);
        assert_eq!(report.summary.match_rate_percent, 40.0);

        assert_eq!(report.matched_codes[0].code, "33.01.001");
        assert_eq!(report.matched_codes[1].match_tier, MatchTier::Contains);

        let reasons: Vec<NoMatchReason> = report.unmatched.iter().map(|u| u.reason).collect();
        assert_eq!(
            reasons,
            vec![
                NoMatchReason::BelowThreshold,
                NoMatchReason::ProvinceNotFound,
                NoMatchReason::MissingProvince
            ]
        );
        assert_eq!(report.unmatched[0].normalized_query, "TANAKEKE");
        assert_eq!(report.unmatched[0].top_candidates.len(), 2);

        assert_eq!(report.audit.len(), 5);
        assert_eq!(report.diagnostics.unresolved_query_provinces.get("Atlantis"), Some(&1));
        assert_eq!(report.diagnostics.province_candidates.get("Sulawesi Selatan"), Some(&2));
        assert_eq!(report.meta.gazetteer_records, 4);
        assert_eq!(report.meta.query_provinces, 4);
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = ResolveConfig::default();
        let matcher = Matcher::from_config(&config).unwrap();
        let data = input();
        let index = CandidateIndex::build(data.gazetteer, config.province_aliases().unwrap(), matcher.normalizer());

        let par = resolve_all(&matcher, &index, &data.queries, true);
        let seq = resolve_all(&matcher, &index, &data.queries, false);
        assert_eq!(par, seq);
        assert_eq!(par.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn province_spellings_share_one_sample() {
        let letter = |n: usize| char::from(b'A' + (n % 26) as u8);
        let gazetteer: Vec<GazetteerRecord> = (0..120)
            .map(|i| {
                let name = format!("NAGARI {}{}", letter(i / 26), letter(i));
                rec(&format!("13.01.{i:03}"), &name, "SUMATERA BARAT")
            })
            .collect();
        let mut config = ResolveConfig::default();
        config.sampling.cap = 15;
        let queries = vec![
            QueryName::new("Sumatra Barat", "TANAKEKE"),
            QueryName::new("Sumatera Barat", "TANAKEKE"),
            QueryName::new("SUMBAR", "TANAKEKE"),
        ];
        let report = run(&config, ResolveInput { gazetteer, queries }).unwrap();

        assert_eq!(report.unmatched.len(), 3);
        assert_eq!(report.unmatched[0].top_candidates, report.unmatched[1].top_candidates);
        assert_eq!(report.unmatched[1].top_candidates, report.unmatched[2].top_candidates);
        assert!(report.audit.iter().all(|a| a.candidates_considered == 15));
    }

    #[test]
    fn run_validates_configs_built_in_code() {
        let mut config = ResolveConfig::default();
        config.normalize.extra_boilerplate = vec!["DUKUH 2".into()];
        assert!(matches!(run(&config, input()), Err(ResolveError::ConfigValidation(_))));

        let mut config = ResolveConfig::default();
        config.provinces.aliases.insert("Riau".into(), vec!["JAMBI".into()]);
        assert!(matches!(run(&config, input()), Err(ResolveError::AliasConflict { .. })));

        let mut config = ResolveConfig::default();
        config.sampling.cap = 0;
        assert!(matches!(run(&config, input()), Err(ResolveError::ConfigValidation(_))));
    }

    #[test]
    fn empty_run() {
        let report = run(
            &ResolveConfig::default(),
            ResolveInput { gazetteer: Vec::new(), queries: Vec::new() },
        )
        .unwrap();
        assert_eq!(report.summary.total_queries, 0);
        assert_eq!(report.summary.match_rate_percent, 0.0);
        assert!(report.matched_codes.is_empty());
    }
}
