//! CSV and JSON export, and catalog persistence.
//!
//! The JSON document is also the on-disk catalog: [`load_catalog`] reads it
//! back, ignoring the derived count fields.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jupiter_catalog::{Catalog, Course, DisciplineCategory, Unit};

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 8] = [
    "Unit",
    "Course",
    "Category",
    "Code",
    "Name",
    "Class_Credits",
    "Work_Credits",
    "Hours",
];

/// File written by `/export` without an argument.
pub const DEFAULT_CSV_FILE: &str = "catalog_export.csv";

// ── CSV ──────────────────────────────────────────────────────────────────────

/// One discipline as a CSV record, columns in [`CSV_HEADER`] order.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    unit: &'a str,
    course: &'a str,
    category: &'static str,
    code: &'a str,
    name: &'a str,
    class_credits: u32,
    work_credits: u32,
    hours: u32,
}

/// Write one row per discipline: unit, then course, then category order.
///
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(catalog: &Catalog, writer: W) -> anyhow::Result<usize> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    out.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for unit in catalog {
        for course in &unit.courses {
            for (category, d) in course.all_disciplines() {
                out.serialize(CsvRow {
                    unit: &unit.name,
                    course: &course.name,
                    category: category.export_label(),
                    code: &d.code,
                    name: &d.name,
                    class_credits: d.class_credits,
                    work_credits: d.work_credits,
                    hours: d.hours,
                })?;
                rows += 1;
            }
        }
    }
    out.flush()?;
    Ok(rows)
}

/// Export path for a user-supplied name: default when blank, `.csv` appended
/// when missing.
pub fn csv_path(name: &str) -> PathBuf {
    let name = name.trim();
    if name.is_empty() {
        return PathBuf::from(DEFAULT_CSV_FILE);
    }
    if name.ends_with(".csv") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.csv"))
    }
}

/// Write the CSV export to `path`.
pub fn export_csv(catalog: &Catalog, path: &Path) -> anyhow::Result<usize> {
    let file = create(path)?;
    let rows = write_csv(catalog, BufWriter::new(file))
        .with_context(|| format!("failed to write CSV {}", path.display()))?;
    tracing::info!(path = %path.display(), rows, "CSV exported");
    Ok(rows)
}

// ── JSON ─────────────────────────────────────────────────────────────────────

/// Top-level JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub unit_count: usize,
    pub units: Vec<UnitDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDocument {
    pub name: String,
    #[serde(default)]
    pub course_count: usize,
    pub courses: Vec<CourseDocument>,
}

/// A course with its derived per-category counts alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default)]
    pub mandatory_count: usize,
    #[serde(default)]
    pub elective_count: usize,
    #[serde(default)]
    pub free_elective_count: usize,
    #[serde(default)]
    pub total_disciplines: usize,
}

impl CourseDocument {
    fn new(course: &Course) -> Self {
        Self {
            mandatory_count: course.disciplines(DisciplineCategory::Mandatory).len(),
            elective_count: course.disciplines(DisciplineCategory::Elective).len(),
            free_elective_count: course.disciplines(DisciplineCategory::FreeElective).len(),
            total_disciplines: course.discipline_count(),
            course: course.clone(),
        }
    }
}

impl CatalogDocument {
    pub fn new(catalog: &Catalog, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            unit_count: catalog.len(),
            units: catalog
                .iter()
                .map(|unit| UnitDocument {
                    name: unit.name.clone(),
                    course_count: unit.courses.len(),
                    courses: unit.courses.iter().map(CourseDocument::new).collect(),
                })
                .collect(),
        }
    }

    /// Drop the derived fields.
    pub fn into_catalog(self) -> Catalog {
        Catalog::new(
            self.units
                .into_iter()
                .map(|u| Unit {
                    name: u.name,
                    courses: u.courses.into_iter().map(|c| c.course).collect(),
                })
                .collect(),
        )
    }
}

pub fn write_json<W: Write>(catalog: &Catalog, writer: W) -> anyhow::Result<()> {
    let document = CatalogDocument::new(catalog, Utc::now());
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Persist the catalog as its JSON export.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> anyhow::Result<()> {
    let mut out = BufWriter::new(create(path)?);
    write_json(catalog, &mut out)
        .and_then(|()| out.flush().map_err(Into::into))
        .with_context(|| format!("failed to write catalog {}", path.display()))?;
    tracing::info!(path = %path.display(), units = catalog.len(), "catalog saved");
    Ok(())
}

/// Read a catalog written by [`save_catalog`].
pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let document: CatalogDocument = serde_json::from_str(&raw)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    Ok(document.into_catalog())
}

fn create(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}
