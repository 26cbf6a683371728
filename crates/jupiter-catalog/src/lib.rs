//! Jupiter Catalog: extraction engine for the JupiterWeb course catalog: browser-driven form traversal and resilient curriculum parsing.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod renderer;
pub mod resolver;
pub mod session;
pub mod traversal;
pub mod types;

pub use catalog::{Catalog, CatalogAccumulator};
pub use config::ScraperConfig;
pub use error::{ScrapeError, ScrapeResult};
pub use extractor::extract_course;
pub use locator::Locator;
pub use resolver::{resolve, resolve_from, MatchTier, Resolved};
pub use session::{BrowserSession, FormDriver};
pub use traversal::{CourseState, RetryPolicy, Traversal};
pub use types::*;

/// Start a browser session and traverse the first `unit_limit` units.
///
/// Fails before visiting any unit when the browser cannot start.
pub async fn run(config: &ScraperConfig, unit_limit: usize) -> ScrapeResult<Catalog> {
    let session = BrowserSession::init(config).await?;
    Traversal::new(session, config).run(unit_limit).await
}
