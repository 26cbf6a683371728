//! Plain-text renderings shared by the subcommands and the shell.

use std::fmt::Write;

use jupiter_catalog::{Catalog, Course, DisciplineCategory};

use crate::query::{DisciplineHit, Statistics};

const NOT_AVAILABLE: &str = "N/A";

fn heading(category: DisciplineCategory) -> &'static str {
    match category {
        DisciplineCategory::Mandatory => "Mandatory disciplines",
        DisciplineCategory::Elective => "Elective disciplines",
        DisciplineCategory::FreeElective => "Free elective disciplines",
    }
}

/// Post-scrape summary: every unit with its courses' mandatory and elective counts.
pub fn scrape_summary(catalog: &Catalog) -> String {
    let mut out = String::new();
    for unit in catalog {
        let _ = writeln!(out, "{unit}");
        for course in &unit.courses {
            let _ = writeln!(out, "  - {}", course.name);
            let _ = writeln!(out, "      mandatory: {}", course.mandatory.len());
            let _ = writeln!(out, "      elective:  {}", course.elective.len());
        }
    }
    out
}

/// Durations and the three discipline lists of one course.
pub fn course_details(course: &Course) -> String {
    let mut out = String::new();
    let duration = |d: &Option<String>| d.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let _ = writeln!(out, "Course:           {}", course.name);
    let _ = writeln!(out, "Unit:             {}", course.unit);
    let _ = writeln!(out, "Ideal duration:   {}", duration(&course.duration_ideal));
    let _ = writeln!(out, "Minimum duration: {}", duration(&course.duration_min));
    let _ = writeln!(out, "Maximum duration: {}", duration(&course.duration_max));

    for category in DisciplineCategory::ALL {
        let list = course.disciplines(category);
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({}):", heading(category), list.len());
        for d in list {
            let _ = writeln!(out, "  - {d}");
        }
    }
    out
}

pub fn statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Units:              {}", stats.units);
    let _ = writeln!(out, "Courses:            {}", stats.courses);
    let _ = writeln!(out, "Disciplines:        {}", stats.total_disciplines());
    let _ = writeln!(out, "  mandatory:        {}", stats.mandatory);
    let _ = writeln!(out, "  elective:         {}", stats.elective);
    let _ = writeln!(out, "  free elective:    {}", stats.free_elective);
    if let Some(avg) = stats.avg_courses_per_unit() {
        let _ = writeln!(out, "Courses per unit:   {avg:.1}");
    }
    if let Some(avg) = stats.avg_disciplines_per_course() {
        let _ = writeln!(out, "Disciplines/course: {avg:.1}");
    }
    out
}

pub fn discipline_hits(hits: &[DisciplineHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "  - {}", hit.key);
        let _ = writeln!(out, "    found in: {}", hit.courses.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use jupiter_catalog::{Discipline, Unit};

    #[test]
    fn test_course_details_marks_missing_durations() {
        let mut course = Course::new("Bacharelado em Física", "IF");
        course.duration_ideal = Some("8 semestres".into());
        course.elective.push(Discipline::new("4300356", "Elementos de Astronomia"));

        let text = course_details(&course);
        assert!(text.contains("Ideal duration:   8 semestres"));
        assert!(text.contains("Minimum duration: N/A"));
        assert!(text.contains("Elective disciplines (1):\n  - 4300356 - Elementos de Astronomia"));
        assert!(text.contains("Mandatory disciplines (0):"));
    }

    #[test]
    fn test_statistics_omits_averages_without_courses() {
        let catalog = Catalog::new(vec![Unit::new("IF")]);
        let text = statistics(&query::statistics(&catalog));
        assert!(text.contains("Units:              1"));
        assert!(!text.contains("per unit"));
    }

    #[test]
    fn test_scrape_summary_lists_counts() {
        let mut unit = Unit::new("IF");
        let mut course = Course::new("Bacharelado em Física", "IF");
        course.mandatory.push(Discipline::new("4302111", "Física I"));
        unit.courses.push(course);

        let text = scrape_summary(&Catalog::new(vec![unit]));
        assert_eq!(
            text,
            "IF (1 courses)\n  - Bacharelado em Física\n      mandatory: 1\n      elective:  0\n"
        );
    }
}
