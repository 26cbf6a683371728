//! Jupiter Catalog CLI: scrape, query and export the JupiterWeb course catalog.

pub mod config;
pub mod export;
pub mod logging;
pub mod query;
pub mod repl;
pub mod report;

pub use config::resolve_catalog_path;
pub use export::{export_csv, load_catalog, save_catalog};
pub use logging::{setup_logging, LogFormat};
