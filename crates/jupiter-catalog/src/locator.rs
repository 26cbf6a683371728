//! Element locators and the page scripts built from them.
//!
//! A [`Locator`] compiles to a JavaScript expression that evaluates to the
//! matching element or `null`. Every string coming from configuration or from
//! the page is escaped before it is placed inside a script literal.

use std::fmt;

/// How to find one element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// `document.getElementById`.
    Id(String),
    /// First match of a CSS selector.
    Css(String),
    /// First element matching `selector` whose text contains any needle.
    Text {
        selector: String,
        needles: Vec<String>,
    },
    /// First locator that resolves to an element.
    AnyOf(Vec<Locator>),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// JS expression evaluating to the element or `null`.
    pub fn to_js(&self) -> String {
        match self {
            Locator::Id(id) => format!("document.getElementById('{}')", sanitize_js_string(id)),
            Locator::Css(sel) => format!("document.querySelector('{}')", sanitize_js_string(sel)),
            Locator::Text { selector, needles } => {
                let needles = needles
                    .iter()
                    .map(|n| format!("'{}'", sanitize_js_string(n)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "(Array.from(document.querySelectorAll('{}')).find(e => [{}].some(n => (e.textContent || '').includes(n))) || null)",
                    sanitize_js_string(selector),
                    needles
                )
            }
            Locator::AnyOf(locators) => {
                if locators.is_empty() {
                    return "null".to_string();
                }
                let parts = locators
                    .iter()
                    .map(|l| l.to_js())
                    .collect::<Vec<_>>()
                    .join(" || ");
                format!("({parts} || null)")
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{id}"),
            Locator::Css(sel) => write!(f, "{sel}"),
            Locator::Text { selector, needles } => {
                write!(f, "{selector} containing {}", needles.join("|"))
            }
            Locator::AnyOf(locators) => {
                let parts: Vec<String> = locators.iter().map(|l| l.to_string()).collect();
                write!(f, "{}", parts.join(" or "))
            }
        }
    }
}

// ── Page scripts ─────────────────────────────────────────────────────────────

/// `true` when the element exists.
pub(crate) fn present_script(locator: &Locator) -> String {
    format!("(() => !!{})()", locator.to_js())
}

/// `true` when the element exists, is enabled and is rendered with a
/// non-empty box.
pub(crate) fn clickable_script(locator: &Locator) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el || el.disabled) return false;
            const s = window.getComputedStyle(el);
            if (s.display === 'none' || s.visibility === 'hidden') return false;
            const r = el.getBoundingClientRect();
            return r.width > 0 && r.height > 0;
        }})()"#,
        locator.to_js()
    )
}

/// `true` when no element matching `selector` is displayed.
pub(crate) fn overlay_gone_script(selector: &str) -> String {
    format!(
        r#"(() => Array.from(document.querySelectorAll('{}')).every(e => {{
            const s = window.getComputedStyle(e);
            return s.display === 'none' || s.visibility === 'hidden' || e.offsetParent === null;
        }}))()"#,
        sanitize_js_string(selector)
    )
}

/// Display texts of a `<select>`'s options, or `null` if it is missing.
pub(crate) fn options_script(locator: &Locator) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el || !el.options) return null;
            return Array.from(el.options).map(o => o.text);
        }})()"#,
        locator.to_js()
    )
}

/// Select option `index` and fire a bubbling `change` event.
pub(crate) fn select_index_script(locator: &Locator, index: usize) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el || !el.options || {index} >= el.options.length) return false;
            el.selectedIndex = {index};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()"#,
        locator.to_js()
    )
}

/// Scroll the element into view and report its centre and whether it would
/// receive a click there.
pub(crate) fn click_probe_script(locator: &Locator) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el) return null;
            el.scrollIntoView({{ block: 'center', inline: 'center' }});
            const r = el.getBoundingClientRect();
            const x = r.left + r.width / 2;
            const y = r.top + r.height / 2;
            const top = document.elementFromPoint(x, y);
            return {{ x, y, hit: !!top && (top === el || el.contains(top)) }};
        }})()"#,
        locator.to_js()
    )
}

/// Invoke `element.click()` directly.
pub(crate) fn script_click_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
        locator.to_js()
    )
}

/// Sanitize a string for safe injection into a JavaScript string literal.
///
/// Escapes all characters that could break out of a JS string context:
/// - Backslashes, single/double quotes, backticks
/// - Newlines, carriage returns, tabs
/// - Angle brackets (so a value can never close a `<script>`)
/// - Null bytes are dropped
pub(crate) fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}
