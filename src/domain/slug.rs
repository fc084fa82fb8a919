//! Slug helpers shared by routing and heading anchors.
//!
//! [`slugify`] is the one canonical transform: lowercase, drop everything that
//! is not a word character, whitespace or hyphen, then collapse whitespace
//! runs into single hyphens. Heading anchors and the table of contents both go
//! through [`AnchorSlugger`] so ids stay identical between the two.

use std::collections::HashMap;

use thiserror::Error;

/// Maximum slug length accepted from a route parameter.
pub const MAX_SLUG_LEN: usize = 96;

const FALLBACK_ANCHOR: &str = "section";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug exceeds {max} characters")]
    TooLong { max: usize },
    #[error("slug contains invalid character `{ch}`")]
    InvalidCharacter { ch: char },
}

/// Derive a URL-safe slug from human-readable text.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-' || ch.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Validate a slug received from a route before it is used as a query parameter.
pub fn validate_route_slug(raw: &str) -> Result<&str, SlugError> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong { max: MAX_SLUG_LEN });
    }
    if let Some(ch) = slug
        .chars()
        .find(|ch| ch.is_whitespace() || ch.is_control() || matches!(ch, '/' | '"' | '\\'))
    {
        return Err(SlugError::InvalidCharacter { ch });
    }
    Ok(slug)
}

/// Deterministically generate unique anchor ids within a single document.
///
/// Headings processed in order receive monotonic suffixes when duplicates
/// occur (`innings`, `innings-2`, `innings-3`).
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor_for(&mut self, heading: &str) -> String {
        let mut base = slugify(heading);
        if base.is_empty() {
            base = FALLBACK_ANCHOR.to_string();
        }

        let count = self.occurrences.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base
        } else {
            format!("{base}-{}", *count)
        }
    }
}
