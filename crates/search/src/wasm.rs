//! WASM bindings for the country picker.
//!
//! These bindings let the survey widgets call the ranker from
//! JavaScript/TypeScript in the browser.

use crate::{countries, parse_table, Ranker};
use wasm_bindgen::prelude::*;

/// Calculate the weighted edit distance between two strings.
#[wasm_bindgen]
pub fn edit_distance(a: &str, b: &str) -> f64 {
    crate::edit_distance(a, b)
}

/// Rank the built-in country table against a search query.
///
/// # Arguments
/// * `query` - Raw search input
/// * `limit` - Maximum results to return (0 for all)
///
/// # Returns
/// JSON array of `{record, distance, useAlternateName}` objects
#[wasm_bindgen]
pub fn rank_countries(query: &str, limit: u32) -> Result<String, JsValue> {
    let results = ranker(limit).rank(query, countries());

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Rank a caller-supplied table against a search query.
///
/// # Arguments
/// * `query` - Raw search input
/// * `records_json` - JSON array of records (`id`, `primaryName`, `alternateName`, `code`, `marker`)
/// * `limit` - Maximum results to return (0 for all)
///
/// # Returns
/// JSON array of ranked results
#[wasm_bindgen]
pub fn rank_records(query: &str, records_json: &str, limit: u32) -> Result<String, JsValue> {
    let table = parse_table(records_json)
        .map_err(|e| JsValue::from_str(&format!("Table error: {}", e)))?;

    let results = ranker(limit).rank(query, &table);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

fn ranker(limit: u32) -> Ranker {
    let limit = if limit == 0 { None } else { Some(limit as usize) };
    Ranker::new().limit(limit)
}
