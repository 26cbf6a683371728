//! Chromium over the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{RenderContext, Renderer};

/// Environment variable naming an explicit browser binary.
pub const CHROMIUM_PATH_ENV: &str = "JUPITER_CHROMIUM_PATH";

const SYSTEM_BINARIES: &[&str] = &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"];

const LAUNCH_FLAGS: &[&str] = &[
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--lang=pt-BR",
];

const WINDOW: (u32, u32) = (1366, 900);

/// Locate a browser binary.
///
/// Order: the explicit path, `JUPITER_CHROMIUM_PATH`, a Chrome-for-Testing
/// install under `~/.jupiter-catalog/chromium`, system binaries on `PATH`,
/// then the default macOS application bundle. Paths that do not exist are
/// skipped.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    let env = std::env::var_os(CHROMIUM_PATH_ENV).map(PathBuf::from);
    let preferred = explicit.map(Path::to_path_buf).into_iter().chain(env);

    preferred
        .chain(managed_installs())
        .find(|path| path.exists())
        .or_else(|| SYSTEM_BINARIES.iter().find_map(|name| which::which(name).ok()))
        .or_else(|| {
            let bundle = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
            (cfg!(target_os = "macos") && bundle.exists()).then_some(bundle)
        })
}

fn managed_installs() -> Vec<PathBuf> {
    let Some(root) = dirs::home_dir().map(|home| home.join(".jupiter-catalog").join("chromium")) else {
        return Vec::new();
    };
    let testing_app = "Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing";
    let mut paths = if cfg!(target_os = "macos") {
        vec![
            root.join("chrome-mac-arm64").join(testing_app),
            root.join("chrome-mac-x64").join(testing_app),
        ]
    } else {
        vec![root.join("chrome-linux64").join("chrome")]
    };
    paths.push(root.join("chrome"));
    paths
}

fn headless_mode(headless: bool) -> HeadlessMode {
    if headless {
        HeadlessMode::New
    } else {
        HeadlessMode::False
    }
}

/// A running browser plus the task pumping its CDP events.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    events: JoinHandle<()>,
}

impl ChromiumRenderer {
    pub async fn launch(chrome_path: Option<&Path>, headless: bool) -> Result<Self> {
        let executable = find_chromium(chrome_path).with_context(|| {
            format!("Chromium not found. Set {CHROMIUM_PATH_ENV} or install Chrome/Chromium.")
        })?;
        tracing::debug!(path = %executable.display(), headless, "launching chromium");

        let config = LAUNCH_FLAGS
            .iter()
            .fold(BrowserConfig::builder().chrome_executable(executable), |b, flag| b.arg(*flag))
            .headless_mode(headless_mode(headless))
            .window_size(WINDOW.0, WINDOW.1)
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "cdp event");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            events,
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a tab")?;
        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.context("failed to close Chromium");
        let _ = browser.wait().await;
        self.events.abort();
        closed.map(drop)
    }
}

/// One tab of a [`ChromiumRenderer`].
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        tokio::time::timeout(Duration::from_millis(timeout_ms), load)
            .await
            .map_err(|_| anyhow!("loading {url} timed out after {timeout_ms}ms"))?
            .with_context(|| format!("failed to load {url}"))
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let evaluation = self
            .page
            .evaluate(script)
            .await
            .context("script evaluation failed")?;
        Ok(evaluation.value().cloned().unwrap_or_default())
    }

    async fn get_html(&self) -> Result<String> {
        self.page.content().await.context("failed to read page source")
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.page
            .click(Point { x, y })
            .await
            .map(drop)
            .with_context(|| format!("mouse click at ({x:.0}, {y:.0}) failed"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("failed to close tab")
    }
}
