//! `desalink run` / `desalink validate`: config-driven village resolution.

use std::path::{Path, PathBuf};

use desalink_resolve::load::{load_gazetteer_csv, load_queries_csv, load_queries_json};
use desalink_resolve::model::{MatchReport, QueryName, ResolveInput};
use desalink_resolve::{ResolveConfig, ResolveError};
use serde::Serialize;

use crate::dataset::{build_dataset, generated_now};
use crate::exit_codes::{
    resolve_exit_code, EXIT_RESOLVE_INVALID_CONFIG, EXIT_RESOLVE_RUNTIME, EXIT_RESOLVE_UNMATCHED, EXIT_USAGE,
};
use crate::CliError;

fn resolve_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: ResolveError) -> CliError {
    CliError { code: resolve_exit_code(&err), message: err.to_string(), hint: None }
}

fn read_config(config_path: &Path) -> Result<ResolveConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| resolve_err(EXIT_RESOLVE_RUNTIME, format!("cannot read config: {e}")))?;
    ResolveConfig::from_toml(&config_str).map_err(engine_err)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| resolve_err(EXIT_RESOLVE_RUNTIME, format!("cannot read {}: {e}", path.display())))
}

fn load_queries(path: &Path) -> Result<Vec<QueryName>, CliError> {
    let data = read_input(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => load_queries_json(&data).map_err(engine_err),
        Some("csv") => load_queries_csv(&data).map_err(engine_err),
        _ => Err(resolve_err(
            EXIT_USAGE,
            format!("cannot infer query format from {}", path.display()),
        )
        .with_hint("use a .json province-grouped document or a .csv with province,name columns")),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, quiet: bool) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| resolve_err(EXIT_RESOLVE_RUNTIME, format!("JSON serialization error: {e}")))?;
    std::fs::write(path, json_str)
        .map_err(|e| resolve_err(EXIT_RESOLVE_RUNTIME, format!("cannot write {}: {e}", path.display())))?;
    if !quiet {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn write_outputs(
    config: &ResolveConfig,
    report: &MatchReport,
    out_dir: &Path,
    quiet: bool,
) -> Result<(), CliError> {
    let out = &config.output;
    if out.matched.is_some() || out.report.is_some() || out.unmatched.is_some() || out.dataset.is_some() {
        std::fs::create_dir_all(out_dir).map_err(|e| {
            resolve_err(EXIT_RESOLVE_RUNTIME, format!("cannot create {}: {e}", out_dir.display()))
        })?;
    }

    if let Some(ref name) = out.matched {
        write_json(&out_dir.join(name), &report.matched_codes, quiet)?;
    }
    if let Some(ref name) = out.report {
        write_json(&out_dir.join(name), report, quiet)?;
    }
    if let Some(ref name) = out.unmatched {
        write_json(&out_dir.join(name), &report.unmatched, quiet)?;
    }
    if let Some(ref name) = out.dataset {
        let dataset = build_dataset(report, out.source.as_deref(), generated_now());
        write_json(&out_dir.join(name), &dataset, quiet)?;
    }
    Ok(())
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Resolve file paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let gazetteer_file = config.input.gazetteer.as_ref().ok_or_else(|| {
        resolve_err(EXIT_RESOLVE_INVALID_CONFIG, "config has no [input] gazetteer file")
            .with_hint("add `gazetteer = \"<file>.csv\"` under [input]")
    })?;
    let queries_file = config.input.queries.as_ref().ok_or_else(|| {
        resolve_err(EXIT_RESOLVE_INVALID_CONFIG, "config has no [input] queries file")
            .with_hint("add `queries = \"<file>.json\"` under [input]")
    })?;

    let gazetteer_data = read_input(&base_dir.join(gazetteer_file))?;
    let gazetteer = load_gazetteer_csv(&gazetteer_data, &config.input.columns).map_err(engine_err)?;
    let queries = load_queries(&base_dir.join(queries_file))?;
    log::info!(
        "loaded {} gazetteer rows from {}, {} queries from {}",
        gazetteer.len(),
        gazetteer_file,
        queries.len(),
        queries_file
    );

    let report = desalink_resolve::run(&config, ResolveInput { gazetteer, queries }).map_err(engine_err)?;

    let out_dir = output_dir.unwrap_or_else(|| base_dir.to_path_buf());
    write_outputs(&config, &report, &out_dir, quiet)?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| resolve_err(EXIT_RESOLVE_RUNTIME, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &report.summary;
    if !quiet {
        eprintln!(
            "{}: {} queries in {} provinces: {} exact, {} contains, {} fuzzy, {} unmatched ({:.1}% matched)",
            report.meta.config_name,
            s.total_queries,
            report.meta.query_provinces,
            s.exact_count,
            s.contains_count,
            s.fuzzy_count,
            s.no_match_count,
            s.match_rate_percent,
        );
        let d = &report.diagnostics;
        if !d.unrecognized_gazetteer_provinces.is_empty() {
            let names: Vec<&str> = d.unrecognized_gazetteer_provinces.keys().map(String::as_str).collect();
            eprintln!("unrecognized gazetteer provinces: {}", names.join(", "));
        }
        if !d.unresolved_query_provinces.is_empty() {
            let names: Vec<&str> = d.unresolved_query_provinces.keys().map(String::as_str).collect();
            eprintln!("query provinces with no candidates: {}", names.join(", "));
        }
    }

    if s.no_match_count > 0 && config.fail_on_unmatched {
        return Err(resolve_err(
            EXIT_RESOLVE_UNMATCHED,
            format!("{} queries unmatched (fail_on_unmatched)", s.no_match_count),
        ));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let aliases = config.province_aliases().map_err(engine_err)?;
    eprintln!(
        "valid: '{}' with {} provinces, thresholds contains {} / fuzzy {}, sampling cap {}",
        config.name,
        aliases.len(),
        config.thresholds.contains,
        config.thresholds.fuzzy,
        config.sampling.cap,
    );
    Ok(())
}
