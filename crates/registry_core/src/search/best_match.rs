//! Best-match selection for name search highlighting.
//!
//! Scoring, case-insensitive:
//! - name starts with the text: `1000 - name length`, so shorter names win;
//! - text occurs later in the name: `500 - position of the first occurrence`;
//! - otherwise no score.
//!
//! Lengths and positions are counted in characters. The first row wins ties.

use crate::db::collation::fold_case;
use crate::model::student::StudentRow;

const PREFIX_BASE_SCORE: i64 = 1000;
const SUBSTRING_BASE_SCORE: i64 = 500;

/// Scores one name against a search text; `None` when it does not match.
pub fn match_score(name: &str, search_text: &str) -> Option<i64> {
    let needle = fold_case(search_text.trim());
    if needle.is_empty() {
        return None;
    }
    let haystack = fold_case(name);

    if haystack.starts_with(&needle) {
        return Some(PREFIX_BASE_SCORE - char_len(&haystack));
    }

    haystack
        .find(&needle)
        .map(|byte_index| SUBSTRING_BASE_SCORE - char_len(&haystack[..byte_index]))
}

/// Returns the highest-scoring row for `search_text`, if any row matches.
pub fn best_match<'a>(rows: &'a [StudentRow], search_text: &str) -> Option<&'a StudentRow> {
    let mut best: Option<(i64, &StudentRow)> = None;
    for row in rows {
        let Some(score) = match_score(&row.full_name, search_text) else {
            continue;
        };
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, row));
        }
    }
    best.map(|(_, row)| row)
}

fn char_len(value: &str) -> i64 {
    i64::try_from(value.chars().count()).unwrap_or(i64::MAX)
}
