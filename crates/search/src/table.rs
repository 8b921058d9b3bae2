//! Reference records and the embedded country table.

use crate::{Result, SearchError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of a reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Table key (ISO 3166-1 alpha-2 for the country table)
    pub id: String,
    /// Localized label, often in a non-Latin script
    pub primary_name: String,
    /// Latin/English label
    pub alternate_name: String,
    /// Short code, e.g. a dialling prefix such as `+49`
    pub code: String,
    /// Display token passed through unchanged (a flag emoji for countries)
    pub marker: String,
}

impl Record {
    /// Creates a new record.
    pub fn new(
        id: impl Into<String>,
        primary_name: impl Into<String>,
        alternate_name: impl Into<String>,
        code: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            primary_name: primary_name.into(),
            alternate_name: alternate_name.into(),
            code: code.into(),
            marker: marker.into(),
        }
    }
}

const COUNTRIES_JSON: &str = include_str!("../data/countries.json");

static COUNTRIES: Lazy<Vec<Record>> = Lazy::new(|| {
    let table = parse_table(COUNTRIES_JSON).expect("embedded country table is valid");
    tracing::debug!(records = table.len(), "Loaded country table");
    table
});

/// The built-in country table, in display order.
pub fn countries() -> &'static [Record] {
    &COUNTRIES
}

/// Look up a country by its ISO alpha-2 id (case-insensitive).
pub fn find_by_id(id: &str) -> Option<&'static Record> {
    countries()
        .iter()
        .find(|record| record.id.eq_ignore_ascii_case(id.trim()))
}

/// All countries sharing a dialling code.
///
/// The leading `+` is optional, so `"49"` and `"+49"` are equivalent.
pub fn find_by_code(code: &str) -> Vec<&'static Record> {
    let code = code.trim();
    let code = code.strip_prefix('+').unwrap_or(code);
    countries()
        .iter()
        .filter(|record| record.code.strip_prefix('+').unwrap_or(&record.code) == code)
        .collect()
}

/// Parse and validate a reference table from a JSON array.
///
/// Ids must be unique and codes non-empty.
pub fn parse_table(json: &str) -> Result<Vec<Record>> {
    let table: Vec<Record> = serde_json::from_str(json)?;
    validate_table(&table)?;
    Ok(table)
}

/// Check the table invariants the ranker's callers rely on.
pub fn validate_table(table: &[Record]) -> Result<()> {
    let mut seen = HashSet::with_capacity(table.len());
    for record in table {
        if record.code.trim().is_empty() {
            return Err(SearchError::EmptyCode(record.id.clone()));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(SearchError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}
