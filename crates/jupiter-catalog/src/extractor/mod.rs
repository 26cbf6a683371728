//! Curriculum extractor: captured page content → [`Course`].
//!
//! Extraction always yields a course. A field that cannot be read stays
//! unset, a malformed row is skipped, and the rest of the page is still
//! processed. [`ParseFailure`] records why a single field or row was dropped;
//! it is logged and never returned to callers.
//!
//! The `scraper` DOM types are `!Send`, so everything here is synchronous and
//! the parsed document never lives across an `.await`.

pub mod duration;
pub mod tables;

use crate::types::{Course, DisciplineCategory};
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Why one duration field or one discipline row was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The duration label does not occur.
    MissingLabel,
    /// The label occurs but no value follows it.
    MissingValue,
    /// A discipline row with fewer than two cells.
    TooFewCells(usize),
    /// Code or name mentions credits: a header row taken for data.
    HeaderLike,
    /// Code or name is blank.
    EmptyIdentity,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::MissingLabel => write!(f, "label not found"),
            ParseFailure::MissingValue => write!(f, "no value after label"),
            ParseFailure::TooFewCells(n) => write!(f, "row has {n} cells, need 2"),
            ParseFailure::HeaderLike => write!(f, "row looks like a header"),
            ParseFailure::EmptyIdentity => write!(f, "row has empty code or name"),
        }
    }
}

/// Parse a captured curriculum page into a course of `unit`.
pub fn extract_course(html: &str, course_name: &str, unit_name: &str) -> Course {
    let document = Html::parse_document(html);
    let durations = duration::extract_durations(&document);

    let mut mandatory = Vec::new();
    let mut elective = Vec::new();
    let mut free_elective = Vec::new();

    if let Ok(table_sel) = Selector::parse("table") {
        for table in document.select(&table_sel) {
            let Some(parsed) = tables::parse_table(&table) else {
                continue;
            };
            let list = match parsed.category {
                DisciplineCategory::Mandatory => &mut mandatory,
                DisciplineCategory::Elective => &mut elective,
                DisciplineCategory::FreeElective => &mut free_elective,
            };
            list.extend(parsed.disciplines);
        }
    }

    tracing::debug!(
        course = course_name,
        unit = unit_name,
        mandatory = mandatory.len(),
        elective = elective.len(),
        free_elective = free_elective.len(),
        "curriculum parsed"
    );

    Course {
        name: course_name.to_string(),
        unit: unit_name.to_string(),
        duration_ideal: durations.ideal,
        duration_min: durations.min,
        duration_max: durations.max,
        mandatory,
        elective,
        free_elective,
    }
}

// ── Shared DOM helpers ───────────────────────────────────────────────────────

/// All visible text of an element, whitespace-collapsed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattened text of `<body>`, or of the whole document without one.
pub(crate) fn body_text(document: &Html) -> String {
    if let Ok(sel) = Selector::parse("body") {
        if let Some(body) = document.select(&sel).next() {
            return element_text(&body);
        }
    }
    element_text(&document.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_page_yields_bare_course() {
        let course = extract_course("", "Geologia", "IGc");
        assert_eq!(course, Course::new("Geologia", "IGc"));
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<div>  Duração\n\t<b>Ideal</b>:   8 </div>");
        let sel = Selector::parse("div").unwrap();
        let div = html.select(&sel).next().unwrap();
        assert_eq!(element_text(&div), "Duração Ideal : 8");
    }
}
