//! Error taxonomy for the extraction engine.
//!
//! Every variant except [`ScrapeError::SessionInit`] is recoverable: the
//! traversal catches it at the course or unit boundary, logs it and moves on.
//! Field- and row-level parse problems never reach this type; the extractor
//! absorbs them locally.

use std::time::Duration;

/// All errors that can surface from the session driver or the traversal.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// The target label is absent among the dropdown options.
    #[error("no option matches {label:?} among {} candidates", candidates.len())]
    Resolution {
        label: String,
        candidates: Vec<String>,
    },

    /// An expected element did not appear or become ready within its bound.
    #[error("timed out after {}ms waiting for {what}", timeout.as_millis())]
    NavigationTimeout { what: String, timeout: Duration },

    /// A click or selection was rejected even after the script-level retry.
    #[error("interaction with {target} failed: {reason}")]
    Interaction { target: String, reason: String },

    /// The browser rejected a protocol command or a script evaluation.
    #[error("browser error: {0}")]
    Browser(String),

    /// The automation engine could not start. Fatal.
    #[error("browser session could not start: {0}")]
    SessionInit(String),
}

impl ScrapeError {
    /// Whether the run must abort instead of recovering at a boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::SessionInit(_))
    }

    pub(crate) fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        ScrapeError::NavigationTimeout {
            what: what.into(),
            timeout,
        }
    }

    pub(crate) fn interaction(target: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::Interaction {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(e: anyhow::Error) -> Self {
        ScrapeError::Browser(format!("{e:#}"))
    }
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
