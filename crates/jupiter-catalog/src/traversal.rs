//! Traversal controller: drives the form through every unit and course.
//!
//! Each course attempt walks the states
//! `Base → UnitSelected → CourseSelected → Submitted → TabActive → Captured`
//! from a freshly loaded base page; the form keeps no deep link, so nothing
//! carries over between courses. A failure at any state omits that course and
//! the run continues with the next one. A unit whose label cannot be selected
//! is kept with no courses.
//!
//! Everything runs sequentially on the one session handed to [`Traversal`],
//! which closes it exactly once when [`Traversal::run`] returns.

use crate::catalog::{Catalog, CatalogAccumulator};
use crate::config::{ScraperConfig, Timeouts};
use crate::error::{ScrapeError, ScrapeResult};
use crate::extractor;
use crate::locator::Locator;
use crate::resolver;
use crate::session::FormDriver;
use crate::types::{Course, Unit};
use std::fmt;

/// Index 0 of both dropdowns is the empty placeholder.
const PLACEHOLDER_OPTIONS: usize = 1;

/// Progress of one course attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CourseState {
    Base,
    UnitSelected,
    CourseSelected,
    Submitted,
    TabActive,
    Captured,
}

impl fmt::Display for CourseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CourseState::Base => "base",
            CourseState::UnitSelected => "unit_selected",
            CourseState::CourseSelected => "course_selected",
            CourseState::Submitted => "submitted",
            CourseState::TabActive => "tab_active",
            CourseState::Captured => "captured",
        };
        f.write_str(name)
    }
}

/// A course attempt that stopped short of capture.
#[derive(Debug)]
pub struct CourseFailure {
    /// Last state reached before the error.
    pub state: CourseState,
    pub error: ScrapeError,
}

/// Fixed number of attempts around the reload-resolve-select step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether another attempt follows a failed attempt number `attempt` (1-based).
    pub fn retries_after(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }
}

/// Element locators for the parts of the form the traversal touches.
#[derive(Debug, Clone)]
struct FormTargets {
    unit_select: Locator,
    course_select: Locator,
    submit: Locator,
    curriculum_tab: Locator,
}

impl FormTargets {
    fn from_config(config: &ScraperConfig) -> Self {
        let form = &config.form;
        Self {
            unit_select: Locator::id(&form.unit_select),
            course_select: Locator::id(&form.course_select),
            submit: Locator::id(&form.submit),
            curriculum_tab: Locator::AnyOf(vec![
                Locator::id(&form.curriculum_tab),
                Locator::Text {
                    selector: form.tab_text_selector.clone(),
                    needles: form.tab_text_needles.clone(),
                },
            ]),
        }
    }
}

/// One extraction run over a session.
pub struct Traversal<D: FormDriver> {
    driver: D,
    targets: FormTargets,
    timeouts: Timeouts,
    retry: RetryPolicy,
}

impl<D: FormDriver> Traversal<D> {
    pub fn new(driver: D, config: &ScraperConfig) -> Self {
        Self {
            driver,
            targets: FormTargets::from_config(config),
            timeouts: config.timeouts.clone(),
            retry: RetryPolicy::new(config.unit_select_attempts),
        }
    }

    /// Visit the first `unit_limit` units and build the catalog.
    ///
    /// The session is closed before returning, whatever the outcome. The only
    /// error is failing to read the unit dropdown at all; everything after
    /// that is recovered per unit or per course.
    pub async fn run(mut self, unit_limit: usize) -> ScrapeResult<Catalog> {
        let outcome = self.traverse(unit_limit).await;
        if let Err(e) = self.driver.close().await {
            tracing::warn!(error = %e, "closing browser session failed");
        }
        outcome
    }

    async fn traverse(&mut self, unit_limit: usize) -> ScrapeResult<Catalog> {
        let labels = self.unit_labels(unit_limit).await?;
        tracing::info!(units = labels.len(), unit_limit, "traversal started");

        let mut catalog = CatalogAccumulator::new();
        for (position, label) in labels.iter().enumerate() {
            tracing::info!(unit = %label, position = position + 1, of = labels.len(), "visiting unit");
            let unit = self.visit_unit(label).await;
            catalog.push(unit);
        }

        let catalog = catalog.finish();
        tracing::info!(
            units = catalog.len(),
            courses = catalog.course_count(),
            disciplines = catalog.discipline_count(),
            "traversal finished"
        );
        Ok(catalog)
    }

    async fn unit_labels(&mut self, unit_limit: usize) -> ScrapeResult<Vec<String>> {
        self.driver.navigate_to_base().await?;
        let options = self
            .driver
            .wait_until_populated(&self.targets.unit_select, self.timeouts.element())
            .await?;
        Ok(real_options(options).take(unit_limit).collect())
    }

    async fn visit_unit(&mut self, label: &str) -> Unit {
        let mut unit = Unit::new(label);

        let courses = match self.course_labels(label).await {
            Ok(courses) => courses,
            Err(e) => {
                tracing::warn!(
                    unit = %label,
                    state = %CourseState::Base,
                    error = %e,
                    "unit could not be selected, keeping it without courses"
                );
                return unit;
            }
        };

        for course in &courses {
            match self.attempt_course(label, course).await {
                Ok(captured) => {
                    tracing::info!(
                        unit = %label,
                        course = %course,
                        disciplines = captured.discipline_count(),
                        "course captured"
                    );
                    unit.courses.push(captured);
                }
                Err(failure) => tracing::warn!(
                    unit = %label,
                    course = %course,
                    state = %failure.state,
                    error = %failure.error,
                    "course skipped"
                ),
            }
        }

        if unit.courses.len() < courses.len() {
            tracing::info!(
                unit = %label,
                captured = unit.courses.len(),
                listed = courses.len(),
                "unit finished with omitted courses"
            );
        }
        unit
    }

    /// Course labels offered once `unit` is selected.
    async fn course_labels(&mut self, unit: &str) -> ScrapeResult<Vec<String>> {
        self.select_unit(unit).await?;
        let options = self
            .driver
            .wait_until_populated(&self.targets.course_select, self.timeouts.element())
            .await?;
        Ok(real_options(options).collect())
    }

    /// `Base → UnitSelected`, under the retry policy.
    async fn select_unit(&mut self, unit: &str) -> ScrapeResult<()> {
        let mut attempt = 1;
        loop {
            match self.try_select_unit(unit).await {
                Ok(()) => return Ok(()),
                Err(e) if !e.is_fatal() && self.retry.retries_after(attempt) => {
                    tracing::debug!(unit = %unit, attempt, error = %e, "unit selection failed, reloading");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_select_unit(&mut self, unit: &str) -> ScrapeResult<()> {
        self.driver.navigate_to_base().await?;
        let options = self
            .driver
            .wait_until_populated(&self.targets.unit_select, self.timeouts.element())
            .await?;
        let resolved = resolver::resolve_from(unit, &options, PLACEHOLDER_OPTIONS)?;
        self.driver
            .select_index(&self.targets.unit_select, resolved.index)
            .await
    }

    async fn attempt_course(&mut self, unit: &str, course: &str) -> Result<Course, CourseFailure> {
        let mut state = CourseState::Base;
        match self.drive_course(unit, course, &mut state).await {
            Ok(page) => Ok(extractor::extract_course(&page, course, unit)),
            Err(error) => Err(CourseFailure { state, error }),
        }
    }

    /// Walk one course from a fresh base page to captured content.
    async fn drive_course(
        &mut self,
        unit: &str,
        course: &str,
        state: &mut CourseState,
    ) -> ScrapeResult<String> {
        let element = self.timeouts.element();
        let tab = self.timeouts.tab();

        self.select_unit(unit).await?;
        *state = CourseState::UnitSelected;

        let options = self
            .driver
            .wait_until_populated(&self.targets.course_select, element)
            .await?;
        let resolved = resolver::resolve_from(course, &options, PLACEHOLDER_OPTIONS)?;
        self.driver
            .select_index(&self.targets.course_select, resolved.index)
            .await?;
        *state = CourseState::CourseSelected;

        self.driver
            .wait_until_clickable(&self.targets.submit, element)
            .await?;
        self.driver.click(&self.targets.submit).await?;
        *state = CourseState::Submitted;

        self.driver.wait_for(&self.targets.curriculum_tab, tab).await?;
        self.driver.wait_until_overlay_gone(tab).await?;
        self.driver
            .wait_until_clickable(&self.targets.curriculum_tab, element)
            .await?;
        self.driver.click(&self.targets.curriculum_tab).await?;
        *state = CourseState::TabActive;

        self.driver.settle(self.timeouts.settle()).await;
        let page = self.driver.page_source().await?;
        *state = CourseState::Captured;
        Ok(page)
    }
}

/// Option texts past the placeholder, trimmed.
fn real_options(options: Vec<String>) -> impl Iterator<Item = String> {
    options
        .into_iter()
        .skip(PLACEHOLDER_OPTIONS)
        .map(|o| o.trim().to_string())
}
