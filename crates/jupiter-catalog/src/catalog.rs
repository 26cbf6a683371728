//! The finished catalog and the accumulator that builds it.

use crate::types::{Course, Unit};
use serde::{Deserialize, Serialize};

/// Every unit produced by one traversal run, in traversal order.
///
/// Read-only once built: consumers get slices and iterators, never `&mut`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    units: Vec<Unit>,
}

impl Catalog {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<Unit> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// All courses across units, unit order first.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.units.iter().flat_map(|u| u.courses.iter())
    }

    pub fn course_count(&self) -> usize {
        self.units.iter().map(|u| u.courses.len()).sum()
    }

    pub fn discipline_count(&self) -> usize {
        self.courses().map(Course::discipline_count).sum()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Collects units as the traversal finishes them.
#[derive(Debug, Default)]
pub struct CatalogAccumulator {
    units: Vec<Unit>,
}

impl CatalogAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished unit. Units with no courses are kept.
    pub fn push(&mut self, unit: Unit) {
        tracing::debug!(unit = %unit.name, courses = unit.courses.len(), "unit recorded");
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn finish(self) -> Catalog {
        Catalog::new(self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Discipline;

    fn unit(name: &str, courses: &[&str]) -> Unit {
        let mut unit = Unit::new(name);
        for course in courses {
            let mut c = Course::new(*course, name);
            c.mandatory.push(Discipline::new("MAC0110", "Introdução à Computação"));
            unit.courses.push(c);
        }
        unit
    }

    #[test]
    fn test_accumulator_keeps_order_and_empty_units() {
        let mut acc = CatalogAccumulator::new();
        acc.push(unit("IME", &["Matemática", "Estatística"]));
        acc.push(unit("IF", &[]));
        acc.push(unit("IQ", &["Química"]));
        let catalog = acc.finish();

        let names: Vec<&str> = catalog.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["IME", "IF", "IQ"]);
        assert!(catalog.units()[1].courses.is_empty());
        assert_eq!(catalog.course_count(), 3);
        assert_eq!(catalog.discipline_count(), 3);
    }

    #[test]
    fn test_serializes_as_plain_unit_list() {
        let catalog = Catalog::new(vec![unit("IF", &[])]);
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());
        let back: Catalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }
}
