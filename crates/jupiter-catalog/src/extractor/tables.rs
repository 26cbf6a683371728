//! Discipline tables.
//!
//! A discipline table has a title row naming its category, an optional header
//! row, then one row per discipline. Tables with fewer than
//! [`MIN_TABLE_ROWS`] rows cannot hold title, header and data, and are skipped.
//!
//! Only a table's own rows and cells count; rows of tables nested inside it
//! are left to those tables.

use super::{element_text, ParseFailure};
use crate::types::{Discipline, DisciplineCategory};
use scraper::{ElementRef, Selector};

/// Title + header + one data row.
pub const MIN_TABLE_ROWS: usize = 3;

/// Title-row markers, checked in order.
const CATEGORY_MARKERS: [(&str, DisciplineCategory); 3] = [
    ("Obrigatórias", DisciplineCategory::Mandatory),
    ("Optativas Eletivas", DisciplineCategory::Elective),
    ("Optativas Livres", DisciplineCategory::FreeElective),
];

/// Lowercase fragments marking a header row.
const HEADER_KEYWORDS: [&str; 4] = ["crédito", "hora", "semestre", "carga"];

/// Lowercase fragment that disqualifies a code or name cell.
const CREDIT_FRAGMENT: &str = "créd";

/// What a table's title row says it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Disciplines(DisciplineCategory),
    Unrecognized,
}

/// Classify a table by the text of its first row.
pub fn classify(title: &str) -> TableKind {
    CATEGORY_MARKERS
        .iter()
        .find(|(marker, _)| title.contains(marker))
        .map(|&(_, category)| TableKind::Disciplines(category))
        .unwrap_or(TableKind::Unrecognized)
}

/// Whether a row's text looks like a column header.
pub fn is_header_row(text: &str) -> bool {
    let lower = text.to_lowercase();
    HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Parse the cell texts of one data row.
///
/// Cells 1–2 are code and name; cells 3–5 class credits, work credits and
/// hours; cells 6–8 internship, PCC and ATPA hours. Missing or non-numeric
/// counts become 0.
pub fn parse_row(cells: &[String]) -> Result<Discipline, ParseFailure> {
    if cells.len() < 2 {
        return Err(ParseFailure::TooFewCells(cells.len()));
    }
    let code = cells[0].trim();
    let name = cells[1].trim();
    if [code, name]
        .iter()
        .any(|c| c.to_lowercase().contains(CREDIT_FRAGMENT))
    {
        return Err(ParseFailure::HeaderLike);
    }
    if code.is_empty() || name.is_empty() {
        return Err(ParseFailure::EmptyIdentity);
    }

    let number = |i: usize| cells.get(i).map(|c| parse_count(c)).unwrap_or(0);
    Ok(Discipline {
        code: code.to_string(),
        name: name.to_string(),
        class_credits: number(2),
        work_credits: number(3),
        hours: number(4),
        internship_hours: number(5),
        pcc_hours: number(6),
        atpa_hours: number(7),
    })
}

fn parse_count(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

/// Disciplines parsed from one table, with the category it was filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub category: DisciplineCategory,
    pub disciplines: Vec<Discipline>,
    pub rejected_rows: usize,
}

/// Parse a `<table>` element. `None` for short or unrecognized tables.
pub fn parse_table(table: &ElementRef<'_>) -> Option<ParsedTable> {
    let tr = Selector::parse("tr").ok()?;
    let rows: Vec<ElementRef<'_>> = table
        .select(&tr)
        .filter(|row| belongs_to(row, table))
        .collect();
    if rows.len() < MIN_TABLE_ROWS {
        return None;
    }
    let TableKind::Disciplines(category) = classify(&element_text(&rows[0])) else {
        return None;
    };

    let data_start = if is_header_row(&element_text(&rows[1])) {
        2
    } else {
        1
    };

    let mut disciplines = Vec::new();
    let mut rejected_rows = 0;
    for row in &rows[data_start..] {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "td")
            .map(|c| element_text(&c))
            .collect();
        match parse_row(&cells) {
            Ok(d) => disciplines.push(d),
            Err(e) => {
                rejected_rows += 1;
                tracing::debug!(?category, reason = %e, "discipline row skipped");
            }
        }
    }

    Some(ParsedTable {
        category,
        disciplines,
        rejected_rows,
    })
}

/// Whether `table` is the nearest enclosing table of `row`.
pub(crate) fn belongs_to(row: &ElementRef<'_>, table: &ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .is_some_and(|owner| owner.id() == table.id())
}
