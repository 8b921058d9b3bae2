//! Ranking of reference records against a search query.
//!
//! Every record is scored against the query on three fields (primary name,
//! alternate name and code). The best of the three is the record's distance;
//! records whose name or code starts with the query get a strong discount so
//! that prefix matches float to the top.

use crate::fuzzy::edit_distance_chars;
use crate::Record;
use serde::Serialize;
use std::time::Instant;

/// Multiplier applied to the distance of a prefix match.
pub const PREFIX_BONUS: f64 = 0.3;

/// A record scored against one query.
///
/// Results borrow from the table and are meant to be thrown away on the next
/// keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult<'a> {
    /// The matched record
    pub record: &'a Record,
    /// Match distance (lower is better)
    pub distance: f64,
    /// Show the alternate name instead of the primary one
    pub use_alternate_name: bool,
}

impl<'a> MatchResult<'a> {
    /// Label to display for this match.
    pub fn display_name(&self) -> &'a str {
        if self.use_alternate_name {
            &self.record.alternate_name
        } else {
            &self.record.primary_name
        }
    }

    /// The `(marker, code)` pair handed back when the user picks this entry.
    pub fn selection(&self) -> (&'a str, &'a str) {
        (&self.record.marker, &self.record.code)
    }
}

/// Configurable ranker.
///
/// # Example
/// ```
/// use survey_search::{countries, Ranker};
///
/// let top = Ranker::new().limit(Some(3)).rank("fra", countries());
/// assert_eq!(top.len(), 3);
/// assert_eq!(top[0].record.alternate_name, "France");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ranker {
    limit: Option<usize>,
    trim_query: bool,
}

impl Ranker {
    /// Create a ranker that returns every record and scores the query as typed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` results after ordering (`None` keeps all).
    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Strip surrounding whitespace from the query before scoring.
    ///
    /// Off by default: a query of only spaces is non-empty and gets sorted.
    #[must_use]
    pub fn trim_query(mut self, trim: bool) -> Self {
        self.trim_query = trim;
        self
    }

    /// Score every record in `table` and order the results.
    ///
    /// A non-empty query sorts ascending by distance; ties keep table order.
    /// An empty query leaves the table order untouched.
    pub fn rank<'a>(&self, query: &str, table: &'a [Record]) -> Vec<MatchResult<'a>> {
        let started = Instant::now();
        let query = if self.trim_query { query.trim() } else { query };
        let scorer = Scorer::new(query);

        let mut results = score_all(&scorer, table);

        if !query.is_empty() {
            results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        tracing::debug!(
            query_len = scorer.query.len(),
            records = table.len(),
            returned = results.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Ranked records"
        );

        results
    }
}

/// Rank every record in `table` against `query` exactly as typed.
///
/// # Example
/// ```
/// use survey_search::{countries, rank};
///
/// let results = rank("ger", countries());
/// assert_eq!(results[0].record.alternate_name, "Germany");
/// assert!(results[0].use_alternate_name);
/// ```
pub fn rank<'a>(query: &str, table: &'a [Record]) -> Vec<MatchResult<'a>> {
    Ranker::new().rank(query, table)
}

/// Rank and keep at most `limit` results (`None` keeps all).
pub fn rank_with_limit<'a>(
    query: &str,
    table: &'a [Record],
    limit: Option<usize>,
) -> Vec<MatchResult<'a>> {
    Ranker::new().limit(limit).rank(query, table)
}

/// Score a single record without any ordering or trimming.
pub fn score_record<'a>(query: &str, record: &'a Record) -> MatchResult<'a> {
    Scorer::new(query).score(record)
}

/// Query split into the forms each field is compared against.
struct Scorer<'q> {
    query: &'q str,
    query_chars: Vec<char>,
    folded: String,
    folded_chars: Vec<char>,
}

impl<'q> Scorer<'q> {
    fn new(query: &'q str) -> Self {
        let folded = query.to_lowercase();
        Self {
            query,
            query_chars: query.chars().collect(),
            folded_chars: folded.chars().collect(),
            folded,
        }
    }

    fn score<'a>(&self, record: &'a Record) -> MatchResult<'a> {
        let primary = record.primary_name.to_lowercase();
        let alternate = record.alternate_name.to_lowercase();

        let dist_primary = self.folded_distance(&primary);
        let dist_alternate = self.folded_distance(&alternate);
        let code_chars: Vec<char> = record.code.chars().collect();
        let dist_code = edit_distance_chars(&self.query_chars, &code_chars);

        let mut distance = dist_primary.min(dist_alternate).min(dist_code);

        // A closer code match takes the display away from the alternate name.
        let use_alternate_name = dist_alternate < dist_primary && dist_code >= dist_alternate;

        if primary.starts_with(&self.folded)
            || alternate.starts_with(&self.folded)
            || code_has_prefix(&record.code, self.query)
        {
            distance *= PREFIX_BONUS;
        }

        MatchResult {
            record,
            distance,
            use_alternate_name,
        }
    }

    fn folded_distance(&self, folded_label: &str) -> f64 {
        let label: Vec<char> = folded_label.chars().collect();
        edit_distance_chars(&self.folded_chars, &label)
    }
}

/// True if `code` starts with `query`, or would once its leading symbol is
/// dropped (so `49` matches `+49`).
fn code_has_prefix(code: &str, query: &str) -> bool {
    if code.starts_with(query) {
        return true;
    }
    let mut chars = code.chars();
    match chars.next() {
        Some(symbol) if !symbol.is_alphanumeric() => chars.as_str().starts_with(query),
        _ => false,
    }
}

fn score_all<'a>(scorer: &Scorer<'_>, table: &'a [Record]) -> Vec<MatchResult<'a>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        table.par_iter().map(|record| scorer.score(record)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        table.iter().map(|record| scorer.score(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{countries, edit_distance};
    use proptest::prelude::*;

    fn record(id: &str, primary: &str, alternate: &str, code: &str) -> Record {
        Record::new(id, primary, alternate, code, id)
    }

    fn sample_table() -> Vec<Record> {
        vec![
            record("AT", "Österreich", "Austria", "+43"),
            record("CG", "Congo", "Congo (Congo-Brazzaville)", "+242"),
            record("CD", "Congo", "Congo (Congo-Kinshasa)", "+243"),
            record("DE", "Deutschland", "Germany", "+49"),
            record("FR", "France", "France", "+33"),
            record("GE", "საქართველო", "Georgia", "+995"),
            record("SD", "السودان", "Sudan", "+249"),
        ]
    }

    /// Distance before any prefix bonus, recomputed from the public metric.
    fn base_distance(query: &str, record: &Record) -> f64 {
        let folded = query.to_lowercase();
        edit_distance(&folded, &record.primary_name.to_lowercase())
            .min(edit_distance(&folded, &record.alternate_name.to_lowercase()))
            .min(edit_distance(query, &record.code))
    }

    fn ids<'a>(results: &[MatchResult<'a>]) -> Vec<&'a str> {
        results.iter().map(|m| m.record.id.as_str()).collect()
    }

    #[test]
    fn test_alternate_name_prefix_wins() {
        let results = rank("ger", countries());
        let first = &results[0];
        assert_eq!(first.record.id, "DE");
        assert!(first.use_alternate_name);
        assert_eq!(first.display_name(), "Germany");
    }

    #[test]
    fn test_code_match_forces_primary_name() {
        let results = rank("+49", countries());
        let first = &results[0];
        assert_eq!(first.record.id, "DE");
        assert_eq!(first.distance, 0.0);
        assert!(!first.use_alternate_name);
        assert_eq!(first.display_name(), "Deutschland");
        assert_eq!(first.selection(), ("🇩🇪", "+49"));
    }

    #[test]
    fn test_code_prefix_without_symbol() {
        let table = sample_table();
        let results = rank("49", &table);
        assert_eq!(results[0].record.id, "DE");
        let de = &table[3];
        assert!((results[0].distance - base_distance("49", de) * PREFIX_BONUS).abs() < 1e-12);
    }

    #[test]
    fn test_empty_query_keeps_table_order() {
        let results = rank("", countries());
        assert_eq!(results.len(), countries().len());
        assert_eq!(results[0].record, &countries()[0]);
        assert!(results
            .iter()
            .zip(countries())
            .all(|(m, r)| std::ptr::eq(m.record, r)));
    }

    #[test]
    fn test_trimmed_whitespace_query_behaves_as_empty() {
        let table = sample_table();
        let results = Ranker::new().trim_query(true).rank("   ", &table);
        assert_eq!(ids(&results), ids(&rank("", &table)));
    }

    #[test]
    fn test_whitespace_query_is_sorted() {
        let table = sample_table();
        let results = rank(" ", &table);
        // Three-character codes cost 1.51, four-character ones 2.01.
        assert_eq!(ids(&results), ["AT", "DE", "FR", "CG", "CD", "GE", "SD"]);
        assert!(results
            .windows(2)
            .all(|w| w[0].distance <= w[1].distance));
        for m in &results {
            assert_eq!(m.distance, score_record(" ", m.record).distance);
        }
    }

    #[test]
    fn test_rank_scores_like_score_record() {
        let table = sample_table();
        let de = &table[3];
        let ranked = rank(" ger", &table)
            .into_iter()
            .find(|m| m.record.id == "DE")
            .unwrap();
        assert_eq!(ranked.distance, score_record(" ger", de).distance);
        assert_ne!(
            ranked.distance,
            Ranker::new().trim_query(true).rank(" ger", &table)[0].distance
        );
    }

    #[test]
    fn test_empty_query_applies_tie_break_rule() {
        let table = sample_table();
        for m in rank("", &table) {
            let primary = edit_distance("", &m.record.primary_name.to_lowercase());
            let alternate = edit_distance("", &m.record.alternate_name.to_lowercase());
            let code = edit_distance("", &m.record.code);
            let expected = alternate < primary && code >= alternate;
            assert_eq!(m.use_alternate_name, expected, "record {}", m.record.id);
        }
    }

    #[test]
    fn test_query_is_case_insensitive_for_names() {
        let table = sample_table();
        assert_eq!(ids(&rank("GER", &table)), ids(&rank("ger", &table)));
        assert_eq!(rank("ÖSTER", &table)[0].record.id, "AT");
    }

    #[test]
    fn test_prefix_discount_is_exact() {
        let table = sample_table();
        let de = &table[3];
        let scored = score_record("ger", de);
        assert_eq!(scored.distance, base_distance("ger", de) * PREFIX_BONUS);
    }

    #[test]
    fn test_primary_name_prefix_discount() {
        let table = sample_table();
        for (query, index) in [("deu", 3), ("öst", 0), ("ÖST", 0)] {
            let target = &table[index];
            let scored = score_record(query, target);
            assert_eq!(scored.distance, base_distance(query, target) * PREFIX_BONUS);
        }
        let first = rank("deu", &table)[0];
        assert_eq!(first.record.id, "DE");
        assert_eq!(first.display_name(), "Deutschland");
    }

    #[test]
    fn test_no_discount_without_prefix() {
        let table = sample_table();
        let fr = &table[4];
        let scored = score_record("ger", fr);
        assert_eq!(scored.distance, base_distance("ger", fr));
    }

    #[test]
    fn test_homonyms_are_kept_in_table_order() {
        let table = sample_table();
        let results = rank("congo", &table);
        assert_eq!(&ids(&results)[..2], &["CG", "CD"]);
    }

    #[test]
    fn test_deterministic() {
        let first = ids(&rank("gu", countries()));
        let second = ids(&rank("gu", countries()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_table() {
        assert!(rank("ger", &[]).is_empty());
        assert!(rank("", &[]).is_empty());
    }

    #[test]
    fn test_limit() {
        let results = rank_with_limit("ger", countries(), Some(3));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].record.id, "DE");

        let table = sample_table();
        assert_eq!(rank_with_limit("ger", &table, Some(100)).len(), table.len());
        assert_eq!(rank_with_limit("ger", &table, None).len(), table.len());
        assert!(rank_with_limit("ger", &table, Some(0)).is_empty());
    }

    #[test]
    fn test_limit_applies_to_empty_query() {
        let results = rank_with_limit("", countries(), Some(2));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record, &countries()[0]);
    }

    #[test]
    fn test_table_is_not_mutated() {
        let table = sample_table();
        let before = table.clone();
        let _ = rank("ger", &table);
        let _ = rank("+49", &table);
        assert_eq!(table, before);
        assert_eq!(rank("", &table)[3].display_name(), "Deutschland");
    }

    #[test]
    fn test_combining_characters() {
        let table = vec![record("XX", "Cafe\u{301}", "Cafe", "+0")];
        let results = rank("cafe\u{301}", &table);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_results_serialize_camel_case() {
        let table = sample_table();
        let results = rank("ger", &table);
        let json = serde_json::to_value(results[0]).unwrap();
        assert_eq!(json["record"]["id"], "DE");
        assert_eq!(json["useAlternateName"], true);
        assert!(json["distance"].is_number());
    }

    proptest! {
        #[test]
        fn prop_results_are_a_permutation(query in "\\PC{0,8}") {
            let table = sample_table();
            let results = rank(&query, &table);
            prop_assert_eq!(results.len(), table.len());
            let mut seen = ids(&results);
            seen.sort_unstable();
            let mut expected: Vec<&str> = table.iter().map(|r| r.id.as_str()).collect();
            expected.sort_unstable();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn prop_sorted_for_non_empty_query(query in "[a-z+0-9]{1,6}") {
            let results = rank(&query, countries());
            prop_assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        }

        #[test]
        fn prop_prefix_discount(index in 0usize..7, len in 1usize..6, primary in any::<bool>()) {
            let table = sample_table();
            let target = &table[index];
            let name = if primary { &target.primary_name } else { &target.alternate_name };
            let query: String = name.to_lowercase().chars().take(len).collect();
            let scored = score_record(&query, target);
            prop_assert_eq!(scored.distance, base_distance(&query, target) * PREFIX_BONUS);
        }

        #[test]
        fn prop_stable_across_calls(query in "[a-z]{1,5}") {
            prop_assert_eq!(ids(&rank(&query, countries())), ids(&rank(&query, countries())));
        }

        #[test]
        fn prop_distance_non_negative(query in "\\PC{0,8}") {
            prop_assert!(rank(&query, countries()).iter().all(|m| m.distance >= 0.0));
        }
    }
}
