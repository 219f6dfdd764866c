//! Core data models for Dealscout
//!
//! A `RawListing` is what the scrape layer hands us; a `Listing` is the
//! same record as it flows through the assessment pipeline, enriched in
//! place by the classifier, field extractor, predictor, and scorer.

use serde::{Deserialize, Serialize};

/// A raw listing record as ingested (one JSON object per line in a dump
/// file, or constructed directly by an embedding caller).
///
/// Identity is the source URL; records without one are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub site: String,
    /// Detail-page text, present only when the scrape layer fetched it
    /// (typically for low-confidence classifications).
    #[serde(default)]
    pub detail_text: Option<String>,
    /// Grade / trim string when the source exposed one.
    #[serde(default)]
    pub grade: String,
}

/// One vehicle-for-sale listing.
///
/// Extracted numeric fields use 0 as the "unknown" sentinel; downstream
/// stages must never treat 0 as a real price, year, or mileage.
/// Mutated in place by classification, extraction, prediction, and
/// scoring, in that order; frozen before entering the tier router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub title: String,
    /// Stable identity, used for cross-tier deduplication.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub site: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_text: Option<String>,

    /// Canonical model name from the classifier (or the generic label).
    #[serde(default)]
    pub model_name: String,
    /// Classification confidence in [0, 1].
    #[serde(default)]
    pub confidence: f64,

    /// Price in yen; 0 = unknown.
    #[serde(default)]
    pub price: u64,
    /// Model year (Gregorian); 0 = unknown.
    #[serde(default)]
    pub year: i32,
    /// Mileage in km; 0 = unknown.
    #[serde(default)]
    pub mileage: u64,
    /// Repair-history / accident / flood indicator found in the text.
    #[serde(default)]
    pub has_repair: bool,
    /// Grade / trim string when the source exposed one.
    #[serde(default)]
    pub grade: String,

    /// Price divided by the batch median (1.0 when no baseline existed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_ratio: Option<f64>,
    /// Held-out p50 price prediction for this listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_p50: Option<f64>,
    /// Held-out p20 price prediction for this listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_p20: Option<f64>,
    /// predicted_p50 − price; positive means underpriced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_gap: Option<i64>,

    /// Deal-quality score in [0, 100].
    #[serde(default)]
    pub score: f64,
    /// Urgency tier 1–5; 0 = not scorable (unknown price).
    #[serde(default)]
    pub urgency: u8,
}

impl Listing {
    /// Seed a pipeline listing from a raw record. Classification and
    /// extraction fields start at their "unknown" defaults.
    pub fn from_raw(raw: RawListing) -> Self {
        Self {
            title: raw.title,
            url: raw.url,
            site: raw.site,
            detail_text: raw.detail_text,
            grade: raw.grade,
            ..Default::default()
        }
    }

    /// Title plus detail text, the haystack for field extraction.
    pub fn combined_text(&self) -> String {
        match &self.detail_text {
            Some(detail) => format!("{} {}", self.title, detail),
            None => self.title.clone(),
        }
    }
}
