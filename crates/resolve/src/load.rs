//! Tabular loaders for the gazetteer and the query list.
//!
//! Loaders take the file contents, not paths; reading files is the
//! caller's job.

use crate::config::GazetteerColumns;
use crate::error::ResolveError;
use crate::model::{GazetteerRecord, QueryName};

fn column_index(headers: &[String], source: &str, name: &str) -> Result<usize, ResolveError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ResolveError::MissingColumn {
            source: source.into(),
            column: name.into(),
        })
}

fn read_headers(reader: &mut csv::Reader<&[u8]>) -> Result<Vec<String>, ResolveError> {
    Ok(reader
        .headers()
        .map_err(|e| ResolveError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect())
}

/// Load gazetteer rows, mapping header names through `columns`.
///
/// An empty area cell is `None`; a non-numeric one is an error.
pub fn load_gazetteer_csv(
    csv_data: &str,
    columns: &GazetteerColumns,
) -> Result<Vec<GazetteerRecord>, ResolveError> {
    const SOURCE: &str = "gazetteer";

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader)?;

    let code_idx = column_index(&headers, SOURCE, &columns.code)?;
    let name_idx = column_index(&headers, SOURCE, &columns.name)?;
    let province_idx = column_index(&headers, SOURCE, &columns.province)?;
    let regency_idx = column_index(&headers, SOURCE, &columns.regency)?;
    let district_idx = column_index(&headers, SOURCE, &columns.district)?;
    let area_idx = match columns.area {
        Some(ref area) => Some(column_index(&headers, SOURCE, area)?),
        None => None,
    };

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ResolveError::Io(e.to_string()))?;
        let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();

        let area_km2 = match area_idx {
            Some(idx) => {
                let raw = field(idx);
                if raw.is_empty() {
                    None
                } else {
                    let value = raw.parse::<f64>().map_err(|_| ResolveError::ValueParse {
                        source: SOURCE.into(),
                        // header is row 1
                        row: i + 2,
                        column: columns.area.clone().unwrap_or_default(),
                        value: raw.clone(),
                    })?;
                    Some(value)
                }
            }
            None => None,
        };

        records.push(GazetteerRecord {
            code: field(code_idx),
            name: field(name_idx),
            province: field(province_idx),
            regency: field(regency_idx),
            district: field(district_idx),
            area_km2,
        });
    }

    log::debug!("loaded {} gazetteer rows", records.len());
    Ok(records)
}

/// Load queries from a CSV with `province` and `name` columns.
pub fn load_queries_csv(csv_data: &str) -> Result<Vec<QueryName>, ResolveError> {
    const SOURCE: &str = "queries";

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader)?;

    let province_idx = column_index(&headers, SOURCE, "province")?;
    let name_idx = column_index(&headers, SOURCE, "name")?;

    let mut queries = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ResolveError::Io(e.to_string()))?;
        let province = row.get(province_idx).unwrap_or("").trim();
        let name = row.get(name_idx).unwrap_or("").trim();
        if name.is_empty() && province.is_empty() {
            continue;
        }
        queries.push(QueryName {
            raw_name: name.to_string(),
            province: (!province.is_empty()).then(|| province.to_string()),
        });
    }
    Ok(queries)
}

/// Load queries from a province-grouped JSON document:
/// `{"Aceh": ["ALUE KEUMUNENG", ...], "Riau": ["MAKERUH"]}`.
///
/// Document order is preserved.
pub fn load_queries_json(json_data: &str) -> Result<Vec<QueryName>, ResolveError> {
    let value: serde_json::Value =
        serde_json::from_str(json_data).map_err(|e| ResolveError::QueryParse(e.to_string()))?;
    let groups = value
        .as_object()
        .ok_or_else(|| ResolveError::QueryParse("expected an object keyed by province".into()))?;

    let mut queries = Vec::new();
    for (province, names) in groups {
        let names = names.as_array().ok_or_else(|| {
            ResolveError::QueryParse(format!("province '{province}': expected an array of names"))
        })?;
        for name in names {
            let name = name.as_str().ok_or_else(|| {
                ResolveError::QueryParse(format!("province '{province}': names must be strings"))
            })?;
            queries.push(QueryName::new(province.as_str(), name));
        }
    }
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAZETTEER: &str = "\
KDEPUM,NAMOBJ,WADMPR,WADMKK,WADMKC,LUASWH
62.03.01.2001,DADAHUP,Kalimantan Tengah,Kapuas,Dadahup,41.2
64.01.02.2003,SP 2 KELADEN,Kalimantan Timur,Paser,Batu Sopang,
";

    #[test]
    fn load_gazetteer_default_columns() {
        let records = load_gazetteer_csv(GAZETTEER, &GazetteerColumns::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "62.03.01.2001");
        assert_eq!(records[0].name, "DADAHUP");
        assert_eq!(records[1].regency, "Paser");
        assert_eq!(records[0].area_km2, None);
    }

    #[test]
    fn load_gazetteer_with_area() {
        let columns = GazetteerColumns { area: Some("LUASWH".into()), ..GazetteerColumns::default() };
        let records = load_gazetteer_csv(GAZETTEER, &columns).unwrap();
        assert_eq!(records[0].area_km2, Some(41.2));
        assert_eq!(records[1].area_km2, None);
    }

    #[test]
    fn load_gazetteer_bad_area() {
        let csv = "KDEPUM,NAMOBJ,WADMPR,WADMKK,WADMKC,LUASWH\n1,A,Riau,K,C,wide\n";
        let columns = GazetteerColumns { area: Some("LUASWH".into()), ..GazetteerColumns::default() };
        let err = load_gazetteer_csv(csv, &columns).unwrap_err();
        match err {
            ResolveError::ValueParse { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "wide");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_gazetteer_missing_column() {
        let csv = "KDEPUM,NAMOBJ,WADMPR\n1,A,Riau\n";
        let err = load_gazetteer_csv(csv, &GazetteerColumns::default()).unwrap_err();
        assert_eq!(err.to_string(), "gazetteer: missing column 'WADMKK'");
    }

    #[test]
    fn load_queries_from_csv() {
        let csv = "province,name\nKalimantan Tengah,DADAHUP\n,ORPHAN\n\nRiau,MAKERUH\n";
        let queries = load_queries_csv(csv).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], QueryName::new("Kalimantan Tengah", "DADAHUP"));
        assert_eq!(queries[1].province, None);
        assert_eq!(queries[2].raw_name, "MAKERUH");
    }

    #[test]
    fn load_queries_from_grouped_json() {
        let json = r#"{"Sulawesi Tengah": ["TORIRE", "KABERA"], "Aceh": ["TEGET"]}"#;
        let queries = load_queries_json(json).unwrap();
        let names: Vec<&str> = queries.iter().map(|q| q.raw_name.as_str()).collect();
        assert_eq!(names, vec!["TORIRE", "KABERA", "TEGET"]);
        assert_eq!(queries[2].province.as_deref(), Some("Aceh"));
    }

    #[test]
    fn load_queries_json_rejects_bad_shape() {
        assert!(matches!(load_queries_json("[1, 2]"), Err(ResolveError::QueryParse(_))));
        assert!(matches!(load_queries_json(r#"{"Aceh": "TEGET"}"#), Err(ResolveError::QueryParse(_))));
        assert!(matches!(load_queries_json(r#"{"Aceh": [1]}"#), Err(ResolveError::QueryParse(_))));
    }
}
