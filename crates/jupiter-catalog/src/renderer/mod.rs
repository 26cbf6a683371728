//! Browser engine abstraction.
//!
//! The session driver only talks to [`Renderer`] and [`RenderContext`];
//! [`chromium`] implements both over the DevTools protocol.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A launched browser engine.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new tab.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Close the browser and stop its event loop.
    async fn shutdown(&self) -> Result<()>;
}

/// One browser tab.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Load `url`, giving up after `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// Evaluate a script and return its JSON result (`null` when it has none).
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Serialized DOM of the current page.
    async fn get_html(&self) -> Result<String>;
    /// Input-level mouse click at viewport coordinates.
    async fn click_at(&self, x: f64, y: f64) -> Result<()>;
    async fn close(self: Box<Self>) -> Result<()>;
}
