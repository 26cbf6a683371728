//! Read-only queries over a finished catalog.
//!
//! All matching is case-insensitive substring matching.

use std::collections::BTreeMap;

use jupiter_catalog::{Catalog, Course, DisciplineCategory, Unit};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Units in traversal order.
pub fn list_units(catalog: &Catalog) -> &[Unit] {
    catalog.units()
}

/// Units whose name contains `filter`; every unit for a blank filter.
pub fn list_courses<'a>(catalog: &'a Catalog, filter: &str) -> Vec<&'a Unit> {
    let filter = filter.trim();
    catalog
        .iter()
        .filter(|u| filter.is_empty() || contains_ci(&u.name, filter))
        .collect()
}

/// Courses whose name contains `term`. A blank term matches nothing.
pub fn search_courses<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a Course> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }
    catalog.courses().filter(|c| contains_ci(&c.name, term)).collect()
}

/// A discipline found by [`search_disciplines`], with every course listing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisciplineHit {
    /// `"code - name"`.
    pub key: String,
    pub courses: Vec<String>,
}

/// Disciplines whose code or name contains `term`, grouped by code and name.
///
/// Hits are sorted by key; each hit's courses keep catalog order.
pub fn search_disciplines(catalog: &Catalog, term: &str) -> Vec<DisciplineHit> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for course in catalog.courses() {
        for (_, d) in course.all_disciplines() {
            if contains_ci(&d.code, term) || contains_ci(&d.name, term) {
                grouped
                    .entry(d.to_string())
                    .or_default()
                    .push(course.name.clone());
            }
        }
    }

    grouped
        .into_iter()
        .map(|(key, courses)| DisciplineHit { key, courses })
        .collect()
}

/// First course whose name contains `term`.
pub fn course_details<'a>(catalog: &'a Catalog, term: &str) -> Option<&'a Course> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    catalog.courses().find(|c| contains_ci(&c.name, term))
}

/// Aggregate counts over a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub units: usize,
    pub courses: usize,
    pub mandatory: usize,
    pub elective: usize,
    pub free_elective: usize,
}

impl Statistics {
    pub fn total_disciplines(&self) -> usize {
        self.mandatory + self.elective + self.free_elective
    }

    /// `None` until at least one course exists.
    pub fn avg_courses_per_unit(&self) -> Option<f64> {
        (self.courses > 0 && self.units > 0).then(|| self.courses as f64 / self.units as f64)
    }

    /// `None` until at least one course exists.
    pub fn avg_disciplines_per_course(&self) -> Option<f64> {
        (self.courses > 0).then(|| self.total_disciplines() as f64 / self.courses as f64)
    }
}

pub fn statistics(catalog: &Catalog) -> Statistics {
    let mut stats = Statistics {
        units: catalog.len(),
        ..Statistics::default()
    };
    for course in catalog.courses() {
        stats.courses += 1;
        stats.mandatory += course.disciplines(DisciplineCategory::Mandatory).len();
        stats.elective += course.disciplines(DisciplineCategory::Elective).len();
        stats.free_elective += course.disciplines(DisciplineCategory::FreeElective).len();
    }
    stats
}
