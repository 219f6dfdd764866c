//! Campaign assessment pipeline
//!
//! Orchestrates one campaign's batch end to end:
//! 1. Skip malformed records (no identity)
//! 2. Classify; drop non-matches and sub-floor confidence
//! 3. Extract price / year / mileage / repair flag
//! 4. Apply campaign ceilings, floors, and keyword filters
//! 5. Compute market statistics over the surviving batch
//! 6. Predict held-out p50/p20 prices
//! 7. Score every listing
//! 8. Route into the two notification tiers
//!
//! Synchronous and batch-scoped: derived statistics and predictions are
//! local to one call and discarded with it. A malformed or unparseable
//! record never aborts the batch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::VehicleCatalog;
use crate::classifier::VehicleClassifier;
use crate::config::CampaignConfig;
use crate::extract::FieldExtractor;
use crate::models::{Listing, RawListing};
use crate::predictor::{QuantilePredictor, DEFAULT_QUANTILES};
use crate::router::{route, RouterConfig};
use crate::scoring::{score_listing, ScoringPolicy};
use crate::stats::MarketStats;

/// Classification confidence below this never enters the batch.
const MIN_CONFIDENCE: f64 = 0.3;

/// Everything one campaign run produced.
#[derive(Debug, Serialize)]
pub struct CampaignAssessment {
    pub campaign: String,
    /// Full scored batch, sorted by (urgency, score) descending — the
    /// archival output.
    pub listings: Vec<Listing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketStats>,
    pub immediate: Vec<Listing>,
    pub maybe: Vec<Listing>,
}

/// The assessment engine for one process. Holds the shared catalog and
/// stage components; per-campaign state lives on the stack of `assess`.
pub struct AssessmentPipeline {
    classifier: VehicleClassifier,
    extractor: FieldExtractor,
    predictor: QuantilePredictor,
    policy: ScoringPolicy,
    router_config: RouterConfig,
}

impl AssessmentPipeline {
    pub fn new(catalog: Arc<VehicleCatalog>) -> Self {
        Self {
            classifier: VehicleClassifier::new(catalog),
            extractor: FieldExtractor::new(),
            predictor: QuantilePredictor::default(),
            policy: ScoringPolicy::default(),
            router_config: RouterConfig::default(),
        }
    }

    pub fn with_predictor(mut self, predictor: QuantilePredictor) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    /// Assess one campaign's raw records.
    pub fn assess(&self, raw: Vec<RawListing>, campaign: &CampaignConfig) -> CampaignAssessment {
        let mut listings = Vec::new();

        for record in raw {
            if record.url.trim().is_empty() {
                warn!(title = %record.title, "skipping listing without identity");
                continue;
            }

            let mut listing = Listing::from_raw(record);
            if !self.classifier.classify_listing(&mut listing)
                || listing.confidence < MIN_CONFIDENCE
            {
                debug!(title = %listing.title, "not a target-category listing");
                continue;
            }

            let text = listing.combined_text();
            listing.price = self.extractor.extract_price(&text);
            listing.year = self.extractor.extract_year(&text);
            listing.mileage = self.extractor.extract_mileage(&text);
            listing.has_repair = self.extractor.detect_repair(&text);

            if !passes_campaign_filters(&listing, campaign) {
                continue;
            }
            listings.push(listing);
        }

        let market = MarketStats::compute(&listings);
        if let Some(stats) = &market {
            info!(
                campaign = %campaign.name,
                median = stats.median,
                samples = stats.samples,
                "market baseline"
            );
        }

        let tracks = self.predictor.predict(&listings, &DEFAULT_QUANTILES);
        for track in &tracks {
            for (listing, value) in listings.iter_mut().zip(track.values.iter()) {
                if (track.quantile - 0.5).abs() < f64::EPSILON {
                    listing.predicted_p50 = *value;
                } else if (track.quantile - 0.2).abs() < f64::EPSILON {
                    listing.predicted_p20 = *value;
                }
            }
        }

        for listing in &mut listings {
            score_listing(listing, market.as_ref(), campaign, &self.policy);
        }

        listings.sort_by(|a, b| {
            b.urgency
                .cmp(&a.urgency)
                .then_with(|| b.score.total_cmp(&a.score))
        });

        let (immediate, maybe) = route(&listings, &self.router_config);
        info!(
            campaign = %campaign.name,
            total = listings.len(),
            immediate = immediate.len(),
            maybe = maybe.len(),
            "campaign assessed"
        );

        CampaignAssessment {
            campaign: campaign.name.clone(),
            listings,
            market,
            immediate,
            maybe,
        }
    }

    /// Route an aggregate of already-scored listings (cross-campaign
    /// notification pass).
    pub fn route_aggregate(&self, listings: &[Listing]) -> (Vec<Listing>, Vec<Listing>) {
        route(listings, &self.router_config)
    }
}

/// Ceilings and floors only reject on a known value; 0 is "unknown",
/// never a real price, year, or mileage.
fn passes_campaign_filters(listing: &Listing, campaign: &CampaignConfig) -> bool {
    if listing.price > 0 && listing.price > campaign.price_max {
        return false;
    }
    if listing.year > 0 && listing.year < campaign.year_min {
        return false;
    }
    if listing.mileage > 0 && listing.mileage > campaign.mileage_max {
        return false;
    }
    if campaign
        .exclude_keywords
        .iter()
        .any(|kw| listing.title.contains(kw.as_str()))
    {
        return false;
    }
    if !campaign.include_keywords.is_empty()
        && !campaign
            .include_keywords
            .iter()
            .any(|kw| listing.title.contains(kw.as_str()))
    {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> AssessmentPipeline {
        AssessmentPipeline::new(Arc::new(VehicleCatalog::japan_suv()))
    }

    fn campaign() -> CampaignConfig {
        CampaignConfig {
            name: "テスト".into(),
            price_max: 5_000_000,
            year_min: 2015,
            mileage_max: 100_000,
            ..Default::default()
        }
    }

    fn raw(title: &str, url: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            url: url.to_string(),
            site: "carsensor".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let assessment = pipeline().assess(
            vec![
                raw("トヨタ ハリアー 2019年式 298万円 3.2万km", ""),
                raw("トヨタ ハリアー 2019年式 298万円 3.2万km", "https://example.com/ok"),
            ],
            &campaign(),
        );
        assert_eq!(assessment.listings.len(), 1);
        assert_eq!(assessment.listings[0].url, "https://example.com/ok");
    }

    #[test]
    fn test_non_target_listings_are_dropped() {
        let assessment = pipeline().assess(
            vec![
                raw("プリウス 2019年式 198万円", "https://example.com/1"),
                raw("スズキ ハスラー 2020年式 120万円", "https://example.com/2"),
                raw("マツダ CX-5 2019年式 248万円 4.1万km", "https://example.com/3"),
            ],
            &campaign(),
        );
        assert_eq!(assessment.listings.len(), 1);
        assert_eq!(assessment.listings[0].model_name, "CX-5");
    }

    #[test]
    fn test_extraction_populates_fields() {
        let assessment = pipeline().assess(
            vec![raw(
                "トヨタ ハリアー 2019年式 298万円 3.2万km 修復歴あり",
                "https://example.com/1",
            )],
            &campaign(),
        );
        let listing = &assessment.listings[0];
        assert_eq!(listing.price, 2_980_000);
        assert_eq!(listing.year, 2019);
        assert_eq!(listing.mileage, 32_000);
        assert!(listing.has_repair);
    }

    #[test]
    fn test_ceilings_reject_only_known_values() {
        let campaign = campaign();
        let over = Listing {
            price: 6_000_000,
            ..Default::default()
        };
        assert!(!passes_campaign_filters(&over, &campaign));

        let unknown_price = Listing::default();
        assert!(passes_campaign_filters(&unknown_price, &campaign));

        let old = Listing {
            year: 2010,
            ..Default::default()
        };
        assert!(!passes_campaign_filters(&old, &campaign));

        let unknown_year = Listing::default();
        assert!(passes_campaign_filters(&unknown_year, &campaign));
    }

    #[test]
    fn test_keyword_filters() {
        let mut campaign = campaign();
        campaign.exclude_keywords = vec!["部品取り".into()];
        campaign.include_keywords = vec!["4WD".into()];

        let excluded = Listing {
            title: "ハリアー 部品取り 4WD".into(),
            ..Default::default()
        };
        assert!(!passes_campaign_filters(&excluded, &campaign));

        let missing_include = Listing {
            title: "ハリアー 2WD".into(),
            ..Default::default()
        };
        assert!(!passes_campaign_filters(&missing_include, &campaign));

        let ok = Listing {
            title: "ハリアー 4WD".into(),
            ..Default::default()
        };
        assert!(passes_campaign_filters(&ok, &campaign));
    }

    #[test]
    fn test_archival_batch_sorted_by_urgency_then_score() {
        let assessment = pipeline().assess(
            vec![
                raw("トヨタ ハリアー 2019年式 150万円 3.2万km", "https://example.com/cheap"),
                raw("トヨタ ハリアー 2019年式 310万円 3.5万km", "https://example.com/mid1"),
                raw("トヨタ ハリアー 2018年式 290万円 4.2万km", "https://example.com/mid2"),
                raw("トヨタ ハリアー 2019年式 350万円 2.9万km", "https://example.com/mid3"),
            ],
            &campaign(),
        );
        let urgencies: Vec<u8> = assessment.listings.iter().map(|l| l.urgency).collect();
        let mut sorted = urgencies.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(urgencies, sorted);
        assert_eq!(assessment.listings[0].url, "https://example.com/cheap");
    }
}
