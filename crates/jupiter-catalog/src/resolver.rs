//! Map a target label to an index among a dropdown's option texts.
//!
//! Option texts drift between page loads (stray whitespace, appended
//! suffixes), so matching runs in three tiers and the first hit wins:
//!
//! 1. exact equality;
//! 2. equality after trimming both sides;
//! 3. segment-prefix containment: the text before the first `" - "` of either
//!    string, when longer than [`MIN_SEGMENT_CHARS`], contained in the other.
//!
//! Each tier scans every option before the next tier is tried. Resolution
//! never touches the page.

use crate::error::{ScrapeError, ScrapeResult};

/// Delimiter between a label's name and its qualifiers.
pub const SEGMENT_DELIMITER: &str = " - ";

/// Segments this short or shorter never match on containment.
pub const MIN_SEGMENT_CHARS: usize = 10;

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Trimmed,
    Segment,
}

/// A resolved option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub index: usize,
    pub tier: MatchTier,
}

/// Resolve `label` among all `options`.
pub fn resolve<S: AsRef<str>>(label: &str, options: &[S]) -> ScrapeResult<Resolved> {
    resolve_from(label, options, 0)
}

/// Resolve `label` ignoring the first `skip` options (placeholders).
///
/// The returned index is still relative to the full `options` slice.
pub fn resolve_from<S: AsRef<str>>(
    label: &str,
    options: &[S],
    skip: usize,
) -> ScrapeResult<Resolved> {
    let candidates = || {
        options
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, o)| (i, o.as_ref()))
    };

    let tiers: [(MatchTier, &dyn Fn(&str) -> bool); 3] = [
        (MatchTier::Exact, &|text: &str| text == label),
        (MatchTier::Trimmed, &|text: &str| text.trim() == label.trim()),
        (MatchTier::Segment, &|text: &str| segment_match(label, text)),
    ];

    for (tier, matches) in tiers {
        if let Some((index, _)) = candidates().find(|&(_, text)| matches(text)) {
            return Ok(Resolved { index, tier });
        }
    }

    Err(ScrapeError::Resolution {
        label: label.to_string(),
        candidates: options.iter().map(|o| o.as_ref().to_string()).collect(),
    })
}

/// First segment of `text`, trimmed.
fn first_segment(text: &str) -> &str {
    text.split(SEGMENT_DELIMITER).next().unwrap_or(text).trim()
}

fn segment_match(label: &str, candidate: &str) -> bool {
    let contained = |segment: &str, other: &str| {
        segment.chars().count() > MIN_SEGMENT_CHARS && other.contains(segment)
    };
    contained(first_segment(label), candidate) || contained(first_segment(candidate), label)
}
