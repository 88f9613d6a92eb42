//! Query intent detection.
//!
//! Each rule is checked independently, so a query can carry several intents.
//! Intents only steer which column a source filters on; they never exclude a
//! source from the fan-out.

use regex::Regex;
use shared_types::{Intent, IntentSet};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s()-]{7,}$").expect("phone pattern"));

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([a-z0-9-]+\.)+[a-z]{2,}(:\d+)?(/\S*)?$").expect("url pattern")
});

/// Classify `query`. Never returns an empty set.
pub fn classify(query: &str) -> IntentSet {
    let trimmed = query.trim();
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    let mut matches = Vec::new();
    if EMAIL.is_match(trimmed) {
        matches.push(Intent::Email);
    }
    if PHONE.is_match(&compact) {
        matches.push(Intent::Phone);
    }
    if UUID.is_match(trimmed) {
        matches.push(Intent::Id);
    }
    if URL.is_match(trimmed) {
        matches.push(Intent::Url);
    }
    IntentSet::from_matches(matches)
}
