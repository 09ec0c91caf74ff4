//! Export renderer seam and a plain-text implementation.

use super::aggregate::ReportDocument;
use std::fmt::Write;

/// Turns a grouped report into a document body.
pub trait ReportRenderer {
    fn render(&self, document: &ReportDocument) -> String;
}

/// Plain-text renderer used for terminal output and quick exports.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    pub title: String,
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self {
            title: "Students by street".to_string(),
        }
    }
}

impl ReportRenderer for PlainTextRenderer {
    fn render(&self, document: &ReportDocument) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));

        if document.groups.is_empty() {
            let _ = writeln!(out, "\nNo students found.");
        }

        for group in &document.groups {
            let _ = writeln!(
                out,
                "\n{} ({}, {:.1}%)",
                group.street_name,
                student_count_label(group.student_count()),
                group.share_percent
            );
            for row in &group.rows {
                let _ = writeln!(
                    out,
                    "  house {}, apt. {}: {} ({})",
                    row.house_number,
                    row.apartment_number,
                    row.full_name,
                    row.date_of_birth.format("%d.%m.%Y")
                );
            }
        }

        let _ = writeln!(out, "\nTotal: {}", document.total);
        out
    }
}

fn student_count_label(count: usize) -> String {
    match count {
        1 => "1 student".to_string(),
        n => format!("{n} students"),
    }
}
