//! Fixed-width feature vectors for the price regressor
//!
//! Feature groups:
//!   0..4   — Numerics (year, mileage, vehicle age, classification confidence)
//!   4..11  — Equipment flags from title substrings (sunroof, leather,
//!            premium audio, AWD, hybrid, turbo, repair flag)
//!  11..16  — One-hot flags for high-frequency nameplates
//!
//! Unknown numeric fields encode as 0 (except age, which falls back to a
//! fixed pessimistic value). No sentinel handling downstream — the
//! vector shape is stable for every listing in a batch.

use chrono::{Datelike, Utc};

use crate::models::Listing;

/// Number of features produced per listing.
pub const NUM_FEATURES: usize = 16;

/// Human-readable names for each feature, in extraction order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "year",
    "mileage",
    "age",
    "confidence",
    "has_sunroof",
    "has_leather",
    "has_premium_audio",
    "has_awd",
    "has_hybrid",
    "has_turbo",
    "has_repair",
    "model_harrier",
    "model_rav4",
    "model_cx5",
    "model_forester",
    "model_xtrail",
];

/// Age assigned when the model year is unknown.
const UNKNOWN_AGE: f64 = 15.0;

/// Nameplates frequent enough to deserve their own one-hot column.
const HIGH_FREQUENCY_MODELS: [&str; 5] =
    ["ハリアー", "RAV4", "CX-5", "フォレスター", "エクストレイル"];

const SUNROOF: &[&str] = &["サンルーフ"];
const LEATHER: &[&str] = &["レザー", "革シート", "本革"];
const PREMIUM_AUDIO: &[&str] = &["BOSE", "JBL", "マークレビンソン"];
const ALL_WHEEL_DRIVE: &[&str] = &["4WD", "AWD", "四駆"];
const HYBRID: &[&str] = &["ハイブリッド"];
const TURBO: &[&str] = &["ターボ"];

/// Builds feature vectors against a fixed reference year, so a batch's
/// vectors (and tests) don't shift under a running clock.
pub struct FeatureBuilder {
    current_year: i32,
}

impl FeatureBuilder {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn from_clock() -> Self {
        Self::new(Utc::now().year())
    }

    pub fn build(&self, listing: &Listing) -> Vec<f64> {
        let title = listing.title.as_str();
        let mut values = Vec::with_capacity(NUM_FEATURES);

        values.push(listing.year as f64);
        values.push(listing.mileage as f64);
        values.push(if listing.year > 0 {
            (self.current_year - listing.year) as f64
        } else {
            UNKNOWN_AGE
        });
        values.push(listing.confidence);

        values.push(flag(title, SUNROOF));
        values.push(flag(title, LEATHER));
        values.push(flag(title, PREMIUM_AUDIO));
        values.push(flag(title, ALL_WHEEL_DRIVE));
        values.push(flag(title, HYBRID));
        values.push(flag(title, TURBO));
        values.push(if listing.has_repair { 1.0 } else { 0.0 });

        for model in HIGH_FREQUENCY_MODELS {
            values.push(if title.contains(model) { 1.0 } else { 0.0 });
        }

        debug_assert_eq!(values.len(), NUM_FEATURES);
        values
    }
}

fn flag(title: &str, keywords: &[&str]) -> f64 {
    if keywords.iter().any(|kw| title.contains(kw)) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_width_is_stable() {
        let builder = FeatureBuilder::new(2025);
        let empty = builder.build(&Listing::default());
        assert_eq!(empty.len(), NUM_FEATURES);
        assert_eq!(FEATURE_NAMES.len(), NUM_FEATURES);
    }

    #[test]
    fn test_unknowns_encode_as_zero_except_age() {
        let builder = FeatureBuilder::new(2025);
        let values = builder.build(&Listing::default());
        assert_eq!(values[0], 0.0); // year unknown
        assert_eq!(values[1], 0.0); // mileage unknown
        assert_eq!(values[2], UNKNOWN_AGE);
    }

    #[test]
    fn test_age_derives_from_reference_year() {
        let builder = FeatureBuilder::new(2025);
        let listing = Listing {
            year: 2019,
            ..Default::default()
        };
        assert_eq!(builder.build(&listing)[2], 6.0);
    }

    #[test]
    fn test_equipment_and_model_flags() {
        let builder = FeatureBuilder::new(2025);
        let listing = Listing {
            title: "ハリアー サンルーフ 本革 4WD ターボ".into(),
            has_repair: true,
            ..Default::default()
        };
        let values = builder.build(&listing);
        assert_eq!(values[4], 1.0); // sunroof
        assert_eq!(values[5], 1.0); // leather
        assert_eq!(values[6], 0.0); // no premium audio
        assert_eq!(values[7], 1.0); // awd
        assert_eq!(values[9], 1.0); // turbo
        assert_eq!(values[10], 1.0); // repair
        assert_eq!(values[11], 1.0); // ハリアー one-hot
        assert_eq!(values[12], 0.0);
    }
}
