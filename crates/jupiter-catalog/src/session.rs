//! Session driver: one interactive browsing session and its bounded waits.
//!
//! The traversal is written against [`FormDriver`]. [`BrowserSession`] is the
//! real implementation on top of a [`RenderContext`]; every wait is a polling
//! loop over a page predicate with a fixed deadline.

use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::locator::{self, Locator};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderContext, Renderer};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};

const SESSION_CLOSED: &str = "session already closed";

/// Operations the traversal needs from a browsing session.
#[async_trait]
pub trait FormDriver: Send {
    /// Load the fixed entry page.
    async fn navigate_to_base(&mut self) -> ScrapeResult<()>;

    /// Block until an element matching `locator` exists.
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> ScrapeResult<()>;

    /// Block until the element exists, is displayed and is enabled.
    async fn wait_until_clickable(&mut self, locator: &Locator, timeout: Duration)
        -> ScrapeResult<()>;

    /// Block until no blocking overlay is displayed.
    async fn wait_until_overlay_gone(&mut self, timeout: Duration) -> ScrapeResult<()>;

    /// Block until a `<select>` holds more than its placeholder option, then
    /// return the option texts.
    async fn wait_until_populated(
        &mut self,
        select: &Locator,
        timeout: Duration,
    ) -> ScrapeResult<Vec<String>>;

    /// Display texts of a `<select>`'s options, in order.
    async fn options(&mut self, select: &Locator) -> ScrapeResult<Vec<String>>;

    /// Select option `index` of a `<select>`.
    async fn select_index(&mut self, select: &Locator, index: usize) -> ScrapeResult<()>;

    /// Click an element, retrying once through a script-level click.
    async fn click(&mut self, locator: &Locator) -> ScrapeResult<()>;

    /// Full rendered page content.
    async fn page_source(&mut self) -> ScrapeResult<String>;

    /// Release the session.
    async fn close(&mut self) -> ScrapeResult<()>;

    /// Give a freshly activated view time to finish rendering.
    async fn settle(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Where a click probe says the element can be clicked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ProbeOutcome {
    Missing,
    Intercepted,
    At { x: f64, y: f64 },
}

pub(crate) fn probe_outcome(probe: &Value) -> ProbeOutcome {
    if probe.is_null() {
        return ProbeOutcome::Missing;
    }
    let hit = probe.get("hit").and_then(Value::as_bool).unwrap_or(false);
    match (
        hit,
        probe.get("x").and_then(Value::as_f64),
        probe.get("y").and_then(Value::as_f64),
    ) {
        (true, Some(x), Some(y)) => ProbeOutcome::At { x, y },
        _ => ProbeOutcome::Intercepted,
    }
}

fn option_texts(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    }
}

/// A browser-backed session on the catalog form.
pub struct BrowserSession {
    renderer: Box<dyn Renderer>,
    context: Option<Box<dyn RenderContext>>,
    base_url: String,
    navigation_timeout_ms: u64,
    poll_interval: Duration,
    overlay_selector: String,
}

impl BrowserSession {
    /// Launch Chromium and open exactly one tab.
    ///
    /// Any failure here is [`ScrapeError::SessionInit`], the only fatal error
    /// of a run.
    pub async fn init(config: &ScraperConfig) -> ScrapeResult<Self> {
        let renderer = ChromiumRenderer::launch(config.chromium_path.as_deref(), config.headless)
            .await
            .map_err(|e| ScrapeError::SessionInit(format!("{e:#}")))?;
        let context = match renderer.new_context().await {
            Ok(context) => context,
            Err(e) => {
                let _ = renderer.shutdown().await;
                return Err(ScrapeError::SessionInit(format!("{e:#}")));
            }
        };
        tracing::info!(headless = config.headless, "browser session started");
        Ok(Self::with_renderer(Box::new(renderer), context, config))
    }

    /// Wrap an already-open context of any renderer.
    pub fn with_renderer(
        renderer: Box<dyn Renderer>,
        context: Box<dyn RenderContext>,
        config: &ScraperConfig,
    ) -> Self {
        Self {
            renderer,
            context: Some(context),
            base_url: config.base_url.clone(),
            navigation_timeout_ms: config.timeouts.navigation_ms,
            poll_interval: config.timeouts.poll_interval(),
            overlay_selector: config.form.overlay_selector.clone(),
        }
    }

    fn context(&self) -> ScrapeResult<&dyn RenderContext> {
        self.context
            .as_deref()
            .ok_or_else(|| ScrapeError::Browser(SESSION_CLOSED.to_string()))
    }

    async fn eval(&self, script: &str) -> ScrapeResult<Value> {
        Ok(self.context()?.execute_js(script).await?)
    }

    /// Evaluate `script` until it yields `true` or `timeout` elapses.
    ///
    /// Evaluation errors while polling count as "not yet"; the page may be
    /// mid-navigation.
    async fn poll_until(&self, what: &str, script: &str, timeout: Duration) -> ScrapeResult<()> {
        let deadline = Instant::now() + timeout;
        let mut last_error = None;
        loop {
            match self.eval(script).await {
                Ok(Value::Bool(true)) => return Ok(()),
                Ok(_) => {}
                Err(ScrapeError::Browser(e)) if e == SESSION_CLOSED => {
                    return Err(ScrapeError::Browser(e));
                }
                Err(e) => last_error = Some(e),
            }
            if Instant::now() >= deadline {
                if let Some(e) = last_error {
                    tracing::debug!(what, error = %e, "last evaluation error before timeout");
                }
                return Err(ScrapeError::timeout(what, timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl FormDriver for BrowserSession {
    async fn navigate_to_base(&mut self) -> ScrapeResult<()> {
        let timeout_ms = self.navigation_timeout_ms;
        let url = self.base_url.clone();
        let context = self
            .context
            .as_mut()
            .ok_or_else(|| ScrapeError::Browser(SESSION_CLOSED.to_string()))?;
        context.navigate(&url, timeout_ms).await?;
        tracing::debug!(url = %url, "base page loaded");
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> ScrapeResult<()> {
        self.poll_until(
            &format!("element {locator}"),
            &locator::present_script(locator),
            timeout,
        )
        .await
    }

    async fn wait_until_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> ScrapeResult<()> {
        self.poll_until(
            &format!("clickable {locator}"),
            &locator::clickable_script(locator),
            timeout,
        )
        .await
    }

    async fn wait_until_overlay_gone(&mut self, timeout: Duration) -> ScrapeResult<()> {
        let script = locator::overlay_gone_script(&self.overlay_selector);
        self.poll_until("overlay to clear", &script, timeout).await
    }

    async fn wait_until_populated(
        &mut self,
        select: &Locator,
        timeout: Duration,
    ) -> ScrapeResult<Vec<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.options(select).await {
                Ok(options) if options.len() > 1 => return Ok(options),
                Ok(_) => {}
                Err(e) => tracing::trace!(select = %select, error = %e, "options not readable yet"),
            }
            if Instant::now() >= deadline {
                return Err(ScrapeError::timeout(
                    format!("options of {select}"),
                    timeout,
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn options(&mut self, select: &Locator) -> ScrapeResult<Vec<String>> {
        let value = self.eval(&locator::options_script(select)).await?;
        option_texts(value)
            .ok_or_else(|| ScrapeError::interaction(select.to_string(), "not a select element"))
    }

    async fn select_index(&mut self, select: &Locator, index: usize) -> ScrapeResult<()> {
        match self.eval(&locator::select_index_script(select, index)).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(ScrapeError::interaction(
                select.to_string(),
                format!("option {index} could not be selected"),
            )),
        }
    }

    async fn click(&mut self, locator: &Locator) -> ScrapeResult<()> {
        let probe = self.eval(&locator::click_probe_script(locator)).await?;
        let direct = match probe_outcome(&probe) {
            ProbeOutcome::Missing => {
                return Err(ScrapeError::interaction(
                    locator.to_string(),
                    "element not found",
                ))
            }
            ProbeOutcome::Intercepted => Err("click intercepted by another element".to_string()),
            ProbeOutcome::At { x, y } => self
                .context()?
                .click_at(x, y)
                .await
                .map_err(|e| format!("{e:#}")),
        };

        let reason = match direct {
            Ok(()) => return Ok(()),
            Err(reason) => reason,
        };
        tracing::debug!(target_element = %locator, %reason, "direct click failed, retrying via script");

        match self.eval(&locator::script_click_script(locator)).await {
            Ok(Value::Bool(true)) => Ok(()),
            Ok(_) => Err(ScrapeError::interaction(
                locator.to_string(),
                format!("{reason}; element vanished before script click"),
            )),
            Err(e) => Err(ScrapeError::interaction(
                locator.to_string(),
                format!("{reason}; script click failed: {e}"),
            )),
        }
    }

    async fn page_source(&mut self) -> ScrapeResult<String> {
        Ok(self.context()?.get_html().await?)
    }

    async fn close(&mut self) -> ScrapeResult<()> {
        let Some(context) = self.context.take() else {
            return Ok(());
        };
        let closed = context.close().await;
        let shutdown = self.renderer.shutdown().await;
        tracing::info!("browser session closed");
        closed?;
        shutdown?;
        Ok(())
    }
}
