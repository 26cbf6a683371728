//! Scraper configuration loading and resolution.
//!
//! Defaults describe the live JupiterWeb form. A JSON file can override any
//! subset of fields, and a few environment variables override the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Entry page of the course-catalog form.
pub const DEFAULT_BASE_URL: &str =
    "https://uspdigital.usp.br/jupiterweb/jupCarreira.jsp?codmnu=8275";

/// Complete configuration for one traversal run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub headless: bool,
    pub chromium_path: Option<PathBuf>,
    pub timeouts: Timeouts,
    pub form: FormLocators,
    /// Attempts at selecting a unit, counting the first one.
    pub unit_select_attempts: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            chromium_path: None,
            timeouts: Timeouts::default(),
            form: FormLocators::default(),
            unit_select_attempts: 2,
        }
    }
}

/// Bounds for every blocking wait, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub navigation_ms: u64,
    pub element_ms: u64,
    pub tab_ms: u64,
    pub poll_interval_ms: u64,
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            element_ms: 10_000,
            tab_ms: 15_000,
            poll_interval_ms: 250,
            settle_ms: 1_000,
        }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn tab(&self) -> Duration {
        Duration::from_millis(self.tab_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Element identifiers and text markers of the form.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormLocators {
    pub unit_select: String,
    pub course_select: String,
    pub submit: String,
    pub curriculum_tab: String,
    pub tab_text_selector: String,
    pub tab_text_needles: Vec<String>,
    pub overlay_selector: String,
}

impl Default for FormLocators {
    fn default() -> Self {
        Self {
            unit_select: "comboUnidade".to_string(),
            course_select: "comboCurso".to_string(),
            submit: "enviar".to_string(),
            curriculum_tab: "step4-tab".to_string(),
            tab_text_selector: "a, li, button".to_string(),
            tab_text_needles: vec!["Grade".to_string(), "Curricular".to_string()],
            overlay_selector: ".blockUI, .blockOverlay, .ui-widget-overlay".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration: defaults, then an optional JSON file, then the
    /// `JUPITER_*` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a JSON configuration file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Apply `JUPITER_BASE_URL`, `JUPITER_CHROMIUM_PATH` and `JUPITER_HEADLESS`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("JUPITER_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(path) = lookup("JUPITER_CHROMIUM_PATH").filter(|p| !p.trim().is_empty()) {
            self.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup("JUPITER_HEADLESS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "no" | "off" => self.headless = false,
                "1" | "true" | "yes" | "on" => self.headless = true,
                other => tracing::warn!("ignoring JUPITER_HEADLESS={other:?}"),
            }
        }
    }
}
