use std::fmt;

#[derive(Debug)]
pub enum ResolveError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty cap, etc.).
    ConfigValidation(String),
    /// One spelling claimed by two canonical provinces.
    AliasConflict {
        spelling: String,
        first: String,
        second: String,
    },
    /// Missing required column in the gazetteer or query CSV.
    MissingColumn { source: String, column: String },
    /// A cell that must hold a number does not.
    ValueParse {
        source: String,
        row: usize,
        column: String,
        value: String,
    },
    /// Malformed query list document.
    QueryParse(String),
    /// IO error (file read, CSV framing, etc.).
    Io(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::AliasConflict { spelling, first, second } => write!(
                f,
                "province spelling '{spelling}' is claimed by both '{first}' and '{second}'"
            ),
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column '{column}'")
            }
            Self::ValueParse { source, row, column, value } => {
                write!(f, "{source}, row {row}: cannot parse '{column}' value '{value}'")
            }
            Self::QueryParse(msg) => write!(f, "query list error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}
