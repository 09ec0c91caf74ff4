//! Grouping of report rows by street name.

use crate::model::student::StudentRow;
use serde::Serialize;
use std::collections::HashMap;

/// All students of one street name, in query order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreetGroup {
    pub street_name: String,
    pub rows: Vec<StudentRow>,
    /// Share of all report rows, in percent, one decimal place.
    pub share_percent: f64,
}

impl StreetGroup {
    pub fn student_count(&self) -> usize {
        self.rows.len()
    }
}

/// Grouped report handed to an export renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    /// Groups in order of first appearance in the input rows.
    pub groups: Vec<StreetGroup>,
    /// Total number of rows across all groups.
    pub total: usize,
}

/// Groups rows by `name_street`, preserving input order within and across
/// groups.
pub fn group_by_street(rows: Vec<StudentRow>) -> ReportDocument {
    let total = rows.len();
    let mut groups: Vec<StreetGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match positions.get(&row.name_street) {
            Some(&index) => groups[index].rows.push(row),
            None => {
                positions.insert(row.name_street.clone(), groups.len());
                groups.push(StreetGroup {
                    street_name: row.name_street.clone(),
                    rows: vec![row],
                    share_percent: 0.0,
                });
            }
        }
    }

    for group in &mut groups {
        group.share_percent = share_percent(group.rows.len(), total);
    }

    ReportDocument { groups, total }
}

/// `count / total` as a percentage rounded to one decimal place.
///
/// Returns `0.0` for an empty total.
pub fn share_percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}
