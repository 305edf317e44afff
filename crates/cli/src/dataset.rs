//! Combined dataset document consumed by the overlay generator.

use serde::Serialize;

use desalink_resolve::model::{MatchReport, MatchTier, MatchedCode};

#[derive(Debug, Serialize)]
pub struct MatchStats {
    pub exact: usize,
    pub contains: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
}

#[derive(Debug, Serialize)]
pub struct DatasetMeta {
    pub source: String,
    pub total_matched: usize,
    pub total_provinces: usize,
    pub match_stats: MatchStats,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub generated: String,
}

/// One linked village, keyed the way the overlay generator reads it
/// (`kdepum` is the boundary join key).
#[derive(Debug, Serialize)]
pub struct DatasetVillage<'a> {
    #[serde(rename = "kdepum")]
    pub code: &'a str,
    #[serde(rename = "nama_desa")]
    pub name: &'a str,
    #[serde(rename = "provinsi")]
    pub province: &'a str,
    #[serde(rename = "kabupaten")]
    pub regency: &'a str,
    #[serde(rename = "kecamatan")]
    pub district: &'a str,
    #[serde(rename = "match_type")]
    pub tier: MatchTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl<'a> From<&'a MatchedCode> for DatasetVillage<'a> {
    fn from(m: &'a MatchedCode) -> Self {
        Self {
            code: &m.code,
            name: &m.matched_name,
            province: &m.province,
            regency: &m.regency,
            district: &m.district,
            tier: m.match_tier,
            similarity: m.similarity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dataset<'a> {
    pub metadata: DatasetMeta,
    #[serde(rename = "desa_transmigrasi")]
    pub villages: Vec<DatasetVillage<'a>>,
}

pub fn build_dataset<'a>(report: &'a MatchReport, source: Option<&str>, generated: String) -> Dataset<'a> {
    let s = &report.summary;
    Dataset {
        metadata: DatasetMeta {
            source: source.unwrap_or(&report.meta.config_name).to_string(),
            total_matched: report.matched_codes.len(),
            total_provinces: report.meta.query_provinces,
            match_stats: MatchStats {
                exact: s.exact_count,
                contains: s.contains_count,
                fuzzy: s.fuzzy_count,
                unmatched: s.no_match_count,
            },
            generated,
        },
        villages: report.matched_codes.iter().map(DatasetVillage::from).collect(),
    }
}

pub fn generated_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
