//! Weighted edit distance.
//!
//! A Levenshtein variant whose insertion cost depends on where the inserted
//! character lands in the target: appending past the end of the target is
//! almost free, inserting anywhere else costs half an edit. Deletions and
//! substitutions cost one edit each.
//!
//! The metric is deliberately asymmetric, so `edit_distance(a, b)` and
//! `edit_distance(b, a)` generally differ.

/// Cost of inserting the last character of the target.
pub const TAIL_INSERTION_COST: f64 = 0.01;

/// Cost of inserting a character anywhere before the end of the target.
pub const INSERTION_COST: f64 = 0.5;

/// Cost of deleting a character from the source.
pub const DELETION_COST: f64 = 1.0;

/// Cost of replacing one character with another.
pub const SUBSTITUTION_COST: f64 = 1.0;

/// Calculate the weighted edit distance needed to turn `a` into `b`.
///
/// # Arguments
/// * `a` - Source string (usually the search query)
/// * `b` - Target string (usually a candidate label)
///
/// # Returns
/// Non-negative edit cost; `0.0` means the strings are identical.
///
/// # Example
/// ```
/// use survey_search::edit_distance;
///
/// assert_eq!(edit_distance("germany", "germany"), 0.0);
/// // Completing a prefix is cheap, deleting is not.
/// assert!(edit_distance("ger", "germany") < edit_distance("germany", "ger"));
/// ```
pub fn edit_distance(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    edit_distance_chars(&a_chars, &b_chars)
}

/// Same as [`edit_distance`] over pre-split character slices.
pub(crate) fn edit_distance_chars(a: &[char], b: &[char]) -> f64 {
    let m = a.len();
    let n = b.len();

    // First row is D[0][j] = j: the plain insertion count, not the weighted one.
    let mut prev: Vec<f64> = (0..=n).map(|j| j as f64).collect();
    let mut curr = vec![0.0; n + 1];

    for i in 1..=m {
        curr[0] = i as f64;
        for j in 1..=n {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                let insertion = if j == n { TAIL_INSERTION_COST } else { INSERTION_COST };
                (prev[j] + DELETION_COST)
                    .min(prev[j - 1] + SUBSTITUTION_COST)
                    .min(curr[j - 1] + insertion)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
