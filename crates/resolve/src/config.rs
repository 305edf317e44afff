use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ResolveError;
use crate::index::ProvinceAliases;
use crate::normalize::Normalizer;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Treat any unmatched query as a failed run (CLI exit code).
    #[serde(default)]
    pub fail_on_unmatched: bool,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub provinces: ProvinceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "village resolution".into()
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            fail_on_unmatched: false,
            input: InputConfig::default(),
            thresholds: ThresholdConfig::default(),
            sampling: SamplingConfig::default(),
            report: ReportConfig::default(),
            engine: EngineConfig::default(),
            normalize: NormalizeConfig::default(),
            provinces: ProvinceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub gazetteer: Option<String>,
    /// `.json` province-grouped document or `.csv` with `province,name`.
    #[serde(default)]
    pub queries: Option<String>,
    #[serde(default)]
    pub columns: GazetteerColumns,
}

/// Gazetteer CSV header names. Defaults follow the BIG village boundary
/// attribute table.
#[derive(Debug, Clone, Deserialize)]
pub struct GazetteerColumns {
    #[serde(default = "default_code_column")]
    pub code: String,
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_province_column")]
    pub province: String,
    #[serde(default = "default_regency_column")]
    pub regency: String,
    #[serde(default = "default_district_column")]
    pub district: String,
    #[serde(default)]
    pub area: Option<String>,
}

fn default_code_column() -> String {
    "KDEPUM".into()
}
fn default_name_column() -> String {
    "NAMOBJ".into()
}
fn default_province_column() -> String {
    "WADMPR".into()
}
fn default_regency_column() -> String {
    "WADMKK".into()
}
fn default_district_column() -> String {
    "WADMKC".into()
}

impl Default for GazetteerColumns {
    fn default() -> Self {
        Self {
            code: default_code_column(),
            name: default_name_column(),
            province: default_province_column(),
            regency: default_regency_column(),
            district: default_district_column(),
            area: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Matching parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_contains")]
    pub contains: f64,
    #[serde(default = "default_fuzzy")]
    pub fuzzy: f64,
    /// Shortest normalized query allowed into the contains tier.
    #[serde(default = "default_min_contains_len")]
    pub min_contains_len: usize,
}

fn default_contains() -> f64 {
    0.5
}
fn default_fuzzy() -> f64 {
    0.7
}
fn default_min_contains_len() -> usize {
    4
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            contains: default_contains(),
            fuzzy: default_fuzzy(),
            min_contains_len: default_min_contains_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Largest candidate set scored in full by the fuzzy tier.
    #[serde(default = "default_cap")]
    pub cap: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_cap() -> usize {
    5000
}
fn default_seed() -> u64 {
    42
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cap: default_cap(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_candidates")]
    pub top_candidates: usize,
}

fn default_top_candidates() -> usize {
    3
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_candidates: default_top_candidates(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub extra_boilerplate: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvinceConfig {
    /// Canonical province label → additional spellings.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub matched: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub unmatched: Option<String>,
    /// Combined metadata + matched villages document.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Provenance label written into the dataset metadata.
    #[serde(default)]
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ResolveConfig {
    pub fn from_toml(input: &str) -> Result<Self, ResolveError> {
        let config: ResolveConfig =
            toml::from_str(input).map_err(|e| ResolveError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Full validation, including compiling the normalizer and alias table.
    pub fn validate(&self) -> Result<(), ResolveError> {
        self.check_ranges()?;
        self.normalizer()?;
        self.province_aliases()?;
        Ok(())
    }

    /// Numeric checks only. Callers that go on to build the normalizer and
    /// alias table get the remaining checks from those constructors.
    pub(crate) fn check_ranges(&self) -> Result<(), ResolveError> {
        for (label, value) in [
            ("thresholds.contains", self.thresholds.contains),
            ("thresholds.fuzzy", self.thresholds.fuzzy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResolveError::ConfigValidation(format!(
                    "{label} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.thresholds.min_contains_len == 0 {
            return Err(ResolveError::ConfigValidation(
                "thresholds.min_contains_len must be at least 1".into(),
            ));
        }

        if self.sampling.cap == 0 {
            return Err(ResolveError::ConfigValidation(
                "sampling.cap must be at least 1".into(),
            ));
        }

        Ok(())
    }

    pub fn normalizer(&self) -> Result<Normalizer, ResolveError> {
        Normalizer::with_boilerplate(&self.normalize.extra_boilerplate)
    }

    /// Built-in province table extended with the configured aliases.
    pub fn province_aliases(&self) -> Result<ProvinceAliases, ResolveError> {
        let mut aliases = ProvinceAliases::indonesia();
        for (canonical, spellings) in &self.provinces.aliases {
            aliases.insert(canonical, spellings)?;
        }
        Ok(aliases)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
