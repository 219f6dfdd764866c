//! Vehicle category classifier
//!
//! Decides whether a listing belongs to the target category and which
//! nameplate it is, with a confidence in [0, 1].
//!
//! Decision order:
//! 1. Restricted-class exclusion — checked first, always wins. A listing
//!    mentioning a kei nameplate or displacement marker is rejected even
//!    when a positive alias also appears.
//! 2. Positive nameplate pass over the catalog in insertion order; the
//!    first entry whose alias alternation matches the raw title or
//!    detail text is the hit.
//! 3. Weak generic-keyword fallback at a fixed low confidence.
//!
//! Always returns a well-formed result; classification never fails.

pub mod normalize;

use std::sync::Arc;

use crate::catalog::{VehicleCatalog, VehicleSpec};
use crate::models::Listing;

/// Label reported for a generic-keyword hit with no specific nameplate.
pub const GENERIC_MODEL: &str = "不明SUV";
/// Label reported for a restricted-class rejection.
pub const RESTRICTED_LABEL: &str = "軽自動車";

/// Category-indicative terms for the weak fallback, in folded form.
const GENERIC_KEYWORDS: &[&str] = &["SUV", "クロスオーバー", "クロカン", "4WD", "AWD", "オフロード"];

const GENERIC_CONFIDENCE: f64 = 0.3;
const BASE_CONFIDENCE: f64 = 0.7;
const MAKER_BONUS: f64 = 0.15;
const BODY_TAG_BONUS: f64 = 0.1;
const ALIAS_BONUS_STEP: f64 = 0.05;
const ALIAS_BONUS_CAP: f64 = 0.15;

/// Result of classifying one listing's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_match: bool,
    pub model_name: String,
    pub confidence: f64,
}

impl Classification {
    fn no_match() -> Self {
        Self {
            is_match: false,
            model_name: String::new(),
            confidence: 0.0,
        }
    }

    fn restricted() -> Self {
        Self {
            is_match: false,
            model_name: RESTRICTED_LABEL.to_string(),
            confidence: 0.0,
        }
    }
}

/// Classifier over a shared immutable catalog.
pub struct VehicleClassifier {
    catalog: Arc<VehicleCatalog>,
}

impl VehicleClassifier {
    pub fn new(catalog: Arc<VehicleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    /// Classify a title plus optional detail text.
    pub fn classify(&self, title: &str, detail_text: Option<&str>) -> Classification {
        let detail = detail_text.unwrap_or("");
        let folded = if detail.is_empty() {
            normalize::fold(title)
        } else {
            normalize::fold(&format!("{title} {detail}"))
        };

        // Exclusion before any positive pattern.
        if self.catalog.is_excluded(&folded) {
            return Classification::restricted();
        }

        // First matching entry wins (insertion order).
        for (spec, pattern) in self.catalog.matchers() {
            if pattern.is_match(title) || (!detail.is_empty() && pattern.is_match(detail)) {
                return Classification {
                    is_match: true,
                    model_name: spec.name.clone(),
                    confidence: self.confidence(title, detail, spec),
                };
            }
        }

        // Weak generic check: category-indicative terms without a nameplate.
        if GENERIC_KEYWORDS.iter().any(|kw| folded.contains(kw)) {
            return Classification {
                is_match: true,
                model_name: GENERIC_MODEL.to_string(),
                confidence: GENERIC_CONFIDENCE,
            };
        }

        Classification::no_match()
    }

    /// Classify a listing in place.
    pub fn classify_listing(&self, listing: &mut Listing) -> bool {
        let classification = self.classify(&listing.title, listing.detail_text.as_deref());
        listing.model_name = classification.model_name;
        listing.confidence = classification.confidence;
        classification.is_match
    }

    /// Confidence for a specific nameplate hit: a fixed base plus
    /// corroboration bonuses, clamped to [0, 1]. Monotone non-decreasing
    /// as more corroborating signals appear in the text.
    fn confidence(&self, title: &str, detail: &str, spec: &VehicleSpec) -> f64 {
        let mut confidence = BASE_CONFIDENCE;

        if title.contains(&spec.maker) || detail.contains(&spec.maker) {
            confidence += MAKER_BONUS;
        }

        // At most one body-tag bonus, first tag found.
        for tag in &spec.body_tags {
            if title.contains(tag.as_str()) || detail.contains(tag.as_str()) {
                confidence += BODY_TAG_BONUS;
                break;
            }
        }

        let folded_title = normalize::fold(title);
        let alias_hits = spec
            .aliases
            .iter()
            .filter(|alias| folded_title.contains(&normalize::fold(alias)))
            .count();
        confidence += (alias_hits as f64 * ALIAS_BONUS_STEP).min(ALIAS_BONUS_CAP);

        confidence.min(1.0)
    }
}
