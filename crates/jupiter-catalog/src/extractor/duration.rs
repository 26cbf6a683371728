//! Course duration fields.
//!
//! Two sources, tried in order:
//!
//! - the course information table (caption "Dados do Curso"): among that
//!   table's own cells, the one right after the cell holding the label;
//! - when that table is absent, the flattened page text, read with a fixed
//!   grammar: `LABEL [':'] TOKEN TOKEN`. The two whitespace-separated tokens
//!   following the label are the value, reproducing the "N semestres" shape.
//!   Fewer than two tokens after the label leaves the field unset.

use super::tables::belongs_to;
use super::{element_text, ParseFailure};
use scraper::{ElementRef, Html, Selector};

/// Caption text identifying the course information table.
pub const INFO_TABLE_CAPTION: &str = "Dados do Curso";

/// The three duration bounds of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    Ideal,
    Minimum,
    Maximum,
}

impl DurationKind {
    pub const ALL: [DurationKind; 3] = [
        DurationKind::Ideal,
        DurationKind::Minimum,
        DurationKind::Maximum,
    ];

    /// Label preceding the value on the page.
    pub fn label(self) -> &'static str {
        match self {
            DurationKind::Ideal => "Duração Ideal",
            DurationKind::Minimum => "Duração Mínima",
            DurationKind::Maximum => "Duração Máxima",
        }
    }
}

/// Extracted durations; `None` where a field could not be isolated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Durations {
    pub ideal: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl Durations {
    fn set(&mut self, kind: DurationKind, value: Option<String>) {
        match kind {
            DurationKind::Ideal => self.ideal = value,
            DurationKind::Minimum => self.min = value,
            DurationKind::Maximum => self.max = value,
        }
    }
}

/// Extract the three durations from a parsed page.
pub fn extract_durations(document: &Html) -> Durations {
    let mut durations = Durations::default();
    let info_table = find_info_table(document);
    let body_text = if info_table.is_none() {
        Some(super::body_text(document))
    } else {
        None
    };

    for kind in DurationKind::ALL {
        let outcome = match (&info_table, &body_text) {
            (Some(table), _) => from_info_table(table, kind),
            (None, Some(text)) => from_text(text, kind),
            (None, None) => Err(ParseFailure::MissingLabel),
        };
        match outcome {
            Ok(value) => durations.set(kind, Some(value)),
            Err(e) => tracing::debug!(label = kind.label(), reason = %e, "duration left unset"),
        }
    }
    durations
}

/// Own cell texts, row by row, of the table captioned [`INFO_TABLE_CAPTION`].
///
/// The caption's parent is the table, so a layout table wrapping it is never
/// picked. Rows of tables nested inside it are not its own.
fn find_info_table(document: &Html) -> Option<Vec<Vec<String>>> {
    let caption = Selector::parse("caption").ok()?;
    let tr = Selector::parse("tr").ok()?;

    let table = document
        .select(&caption)
        .filter(|c| element_text(c).contains(INFO_TABLE_CAPTION))
        .find_map(|c| {
            c.parent()
                .and_then(ElementRef::wrap)
                .filter(|parent| parent.value().name() == "table")
        })?;

    let rows = table
        .select(&tr)
        .filter(|row| belongs_to(row, &table))
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| element_text(&cell))
                .collect()
        })
        .collect();
    Some(rows)
}

/// Value cell adjacent to the label cell. The last row mentioning the label wins.
fn from_info_table(rows: &[Vec<String>], kind: DurationKind) -> Result<String, ParseFailure> {
    let (row, label_at) = rows
        .iter()
        .rev()
        .find_map(|row| {
            row.iter()
                .position(|cell| cell.contains(kind.label()))
                .map(|i| (row, i))
        })
        .ok_or(ParseFailure::MissingLabel)?;
    row.get(label_at + 1)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(ParseFailure::MissingValue)
}

/// Apply the `LABEL [':'] TOKEN TOKEN` grammar to flattened text.
pub fn from_text(text: &str, kind: DurationKind) -> Result<String, ParseFailure> {
    let label = kind.label();
    let start = text.find(label).ok_or(ParseFailure::MissingLabel)? + label.len();
    let rest = text[start..].trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);

    let tokens: Vec<&str> = rest.split_whitespace().take(2).collect();
    if tokens.len() < 2 {
        return Err(ParseFailure::MissingValue);
    }
    Ok(tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = "Curso: Ciência da Computação Duração Ideal: 8 semestres \
                        Duração Mínima: 6 semestres Duração Máxima: 12 semestres Período: Integral";

    #[test]
    fn test_text_grammar_reads_two_tokens() {
        assert_eq!(from_text(FLAT, DurationKind::Ideal).unwrap(), "8 semestres");
        assert_eq!(from_text(FLAT, DurationKind::Minimum).unwrap(), "6 semestres");
        assert_eq!(from_text(FLAT, DurationKind::Maximum).unwrap(), "12 semestres");
    }

    #[test]
    fn test_text_grammar_without_colon() {
        let text = "Duração Ideal 10 semestres";
        assert_eq!(from_text(text, DurationKind::Ideal).unwrap(), "10 semestres");
    }

    #[test]
    fn test_text_grammar_keeps_observed_token_count() {
        // Longer values are cut to two tokens.
        let text = "Duração Ideal: 4 anos e meio";
        assert_eq!(from_text(text, DurationKind::Ideal).unwrap(), "4 anos");
    }

    #[test]
    fn test_text_grammar_failures() {
        assert_eq!(
            from_text("nothing here", DurationKind::Ideal),
            Err(ParseFailure::MissingLabel)
        );
        assert_eq!(
            from_text("Duração Máxima: 12", DurationKind::Maximum),
            Err(ParseFailure::MissingValue)
        );
    }

    #[test]
    fn test_info_table_rows() {
        let rows = vec![
            vec!["Curso".to_string(), "Física".to_string()],
            vec!["Duração Ideal".to_string(), "8 semestres".to_string()],
        ];
        assert_eq!(
            from_info_table(&rows, DurationKind::Ideal).unwrap(),
            "8 semestres"
        );
        assert_eq!(
            from_info_table(&rows, DurationKind::Maximum),
            Err(ParseFailure::MissingLabel)
        );
    }

    #[test]
    fn test_info_table_adjacent_cell() {
        let html = r#"<html><body>
            <table><caption>Dados do Curso</caption>
              <tr><td>Duração Ideal</td><td>8 semestres</td></tr>
              <tr><td>Duração Mínima</td><td>6 semestres</td></tr>
              <tr><td>Duração Máxima</td><td></td></tr>
            </table>
            <p>Duração Máxima: 99 semestres</p>
        </body></html>"#;
        let d = extract_durations(&Html::parse_document(html));
        assert_eq!(d.ideal.as_deref(), Some("8 semestres"));
        assert_eq!(d.min.as_deref(), Some("6 semestres"));
        // The table is present, so the text is not consulted.
        assert_eq!(d.max, None);
    }

    #[test]
    fn test_info_table_inside_layout_table() {
        let html = r#"<html><body>
            <table id="layout"><tr><td>
              <table><caption>Dados do Curso</caption>
                <tr><th>Duração Ideal</th><td>8 semestres</td></tr>
                <tr><td>Duração Mínima</td><td>6 semestres</td></tr>
                <tr><td>Duração Máxima</td><td>12 semestres</td></tr>
              </table>
            </td><td>menu</td></tr></table>
        </body></html>"#;
        let d = extract_durations(&Html::parse_document(html));
        assert_eq!(d.ideal.as_deref(), Some("8 semestres"));
        assert_eq!(d.min.as_deref(), Some("6 semestres"));
        assert_eq!(d.max.as_deref(), Some("12 semestres"));
    }

    #[test]
    fn test_repeated_label_takes_last_row() {
        let rows = vec![
            vec!["Duração Ideal (antiga)".to_string(), "10 semestres".to_string()],
            vec!["Duração Ideal".to_string(), "8 semestres".to_string()],
        ];
        assert_eq!(
            from_info_table(&rows, DurationKind::Ideal).unwrap(),
            "8 semestres"
        );
    }

    #[test]
    fn test_falls_back_to_text_without_table() {
        let html = format!("<html><body><div>{FLAT}</div></body></html>");
        let d = extract_durations(&Html::parse_document(&html));
        assert_eq!(
            d,
            Durations {
                ideal: Some("8 semestres".into()),
                min: Some("6 semestres".into()),
                max: Some("12 semestres".into()),
            }
        );
    }

    #[test]
    fn test_split_markup_still_flattens() {
        let html = "<html><body><span>Duração Ideal:</span><b>8</b> <i>semestres</i></body></html>";
        let d = extract_durations(&Html::parse_document(html));
        assert_eq!(d.ideal.as_deref(), Some("8 semestres"));
        assert_eq!(d.min, None);
    }
}
