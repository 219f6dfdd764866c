//! Two-tier notification routing
//!
//! Partitions a scored batch into "immediate" and "maybe" buckets. A
//! listing already routed to immediate never also appears in maybe —
//! identity is the URL, not value equality. Both buckets are sorted by
//! descending score (urgency breaking ties) and truncated to a cap
//! before being handed to the notifier.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;

use crate::models::Listing;

/// Routing thresholds. Environment variables override the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Minimum urgency for the immediate bucket.
    pub immediate_urgency_min: u8,
    /// Closed score interval for the maybe bucket.
    pub maybe_score_min: f64,
    pub maybe_score_max: f64,
    /// Maximum listings per bucket after sorting.
    pub max_per_bucket: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            immediate_urgency_min: 4,
            maybe_score_min: 70.0,
            maybe_score_max: 84.9,
            max_per_bucket: 5,
        }
    }
}

impl RouterConfig {
    /// Defaults overlaid with `IMMEDIATE_URGENCY_MIN`, `MAYBE_SCORE_MIN`,
    /// and `MAYBE_SCORE_MAX` when set. Unparseable values are ignored
    /// with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_parse::<u8>("IMMEDIATE_URGENCY_MIN") {
            config.immediate_urgency_min = value;
        }
        if let Some(value) = env_parse::<f64>("MAYBE_SCORE_MIN") {
            config.maybe_score_min = value;
        }
        if let Some(value) = env_parse::<f64>("MAYBE_SCORE_MAX") {
            config.maybe_score_max = value;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparseable {name}={raw}");
            None
        }
    }
}

/// Partition a scored batch into (immediate, maybe).
///
/// Immediate: urgency at or above the configured minimum.
/// Maybe: urgency exactly 3 OR score inside the configured interval —
/// the union of both conditions — minus anything already immediate.
pub fn route(scored: &[Listing], config: &RouterConfig) -> (Vec<Listing>, Vec<Listing>) {
    let mut immediate: Vec<Listing> = scored
        .iter()
        .filter(|l| l.urgency >= config.immediate_urgency_min)
        .cloned()
        .collect();

    let immediate_urls: HashSet<&str> = immediate.iter().map(|l| l.url.as_str()).collect();

    let mut maybe: Vec<Listing> = scored
        .iter()
        .filter(|l| {
            l.urgency == 3
                || (l.score >= config.maybe_score_min && l.score <= config.maybe_score_max)
        })
        .filter(|l| !immediate_urls.contains(l.url.as_str()))
        .cloned()
        .collect();

    sort_bucket(&mut immediate);
    sort_bucket(&mut maybe);
    immediate.truncate(config.max_per_bucket);
    maybe.truncate(config.max_per_bucket);

    (immediate, maybe)
}

fn sort_bucket(bucket: &mut [Listing]) {
    bucket.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.urgency.cmp(&a.urgency))
    });
}
