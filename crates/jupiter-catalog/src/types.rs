//! Core data types for the extracted catalog.

use serde::{Deserialize, Serialize};

/// One curriculum item of a course.
///
/// Disciplines carry no identity beyond `(code, name)`; the same discipline
/// appearing in several courses is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub class_credits: u32,
    #[serde(default)]
    pub work_credits: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub internship_hours: u32,
    #[serde(default)]
    pub pcc_hours: u32,
    #[serde(default)]
    pub atpa_hours: u32,
}

impl Discipline {
    /// Create a discipline with every numeric field zeroed.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            class_credits: 0,
            work_credits: 0,
            hours: 0,
            internship_hours: 0,
            pcc_hours: 0,
            atpa_hours: 0,
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}

/// The three discipline lists tracked per course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineCategory {
    Mandatory,
    Elective,
    FreeElective,
}

impl DisciplineCategory {
    /// All categories, in the order they are reported and exported.
    pub const ALL: [DisciplineCategory; 3] = [
        DisciplineCategory::Mandatory,
        DisciplineCategory::Elective,
        DisciplineCategory::FreeElective,
    ];

    /// Label used in the CSV export.
    pub fn export_label(self) -> &'static str {
        match self {
            DisciplineCategory::Mandatory => "Mandatory",
            DisciplineCategory::Elective => "Elective",
            DisciplineCategory::FreeElective => "Free_Elective",
        }
    }
}

/// A degree program owned by one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    /// Name of the owning unit. A back-reference, not ownership.
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ideal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<String>,
    #[serde(default)]
    pub mandatory: Vec<Discipline>,
    #[serde(default)]
    pub elective: Vec<Discipline>,
    #[serde(default)]
    pub free_elective: Vec<Discipline>,
}

impl Course {
    /// Create a course with no durations and empty discipline lists.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            duration_ideal: None,
            duration_min: None,
            duration_max: None,
            mandatory: Vec::new(),
            elective: Vec::new(),
            free_elective: Vec::new(),
        }
    }

    /// The discipline list for a category.
    pub fn disciplines(&self, category: DisciplineCategory) -> &[Discipline] {
        match category {
            DisciplineCategory::Mandatory => &self.mandatory,
            DisciplineCategory::Elective => &self.elective,
            DisciplineCategory::FreeElective => &self.free_elective,
        }
    }

    /// Every discipline of the course with its category, in export order.
    pub fn all_disciplines(&self) -> impl Iterator<Item = (DisciplineCategory, &Discipline)> {
        DisciplineCategory::ALL
            .into_iter()
            .flat_map(move |c| self.disciplines(c).iter().map(move |d| (c, d)))
    }

    /// Total number of disciplines across the three lists.
    pub fn discipline_count(&self) -> usize {
        self.mandatory.len() + self.elective.len() + self.free_elective.len()
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.unit)
    }
}

/// A top-level academic division and the courses extracted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            courses: Vec::new(),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} courses)", self.name, self.courses.len())
    }
}
