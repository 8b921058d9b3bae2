//! Fuzzy country-code search for survey widgets.
//!
//! This crate provides:
//! - A weighted, prefix-friendly edit distance
//! - Ranking of reference records by name, alternate name and code
//! - The embedded country/dialling-code table
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use survey_search::{countries, rank};
//!
//! let results = rank("+49", countries());
//! let best = &results[0];
//! assert_eq!(best.display_name(), "Deutschland");
//! assert_eq!(best.selection(), ("🇩🇪", "+49"));
//! ```

mod error;
mod fuzzy;
mod rank;
mod table;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::{Result, SearchError, SearchErrorCode};
pub use fuzzy::{
    edit_distance, DELETION_COST, INSERTION_COST, SUBSTITUTION_COST, TAIL_INSERTION_COST,
};
pub use rank::{rank, rank_with_limit, score_record, MatchResult, Ranker, PREFIX_BONUS};
pub use table::{countries, find_by_code, find_by_id, parse_table, validate_table, Record};
