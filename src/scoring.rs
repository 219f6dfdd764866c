//! Deal-quality scoring and urgency derivation
//!
//! Combines market ratio, age, mileage, equipment keywords, repair
//! history, and the predicted-price gap into a 0–100 score and a 1–5
//! urgency tier. Pure per-listing computation over batch-scoped inputs
//! passed in explicitly; nothing is retained between listings.

use chrono::{Datelike, Utc};

use crate::config::CampaignConfig;
use crate::models::Listing;
use crate::stats::MarketStats;

/// Premium-equipment keywords; each title hit adds an independent bonus.
pub const PREMIUM_KEYWORDS: &[&str] = &[
    "サンルーフ",
    "レザー",
    "革シート",
    "BOSE",
    "JBL",
    "マークレビンソン",
    "360度",
    "プロパイロット",
    "アイサイト",
    "ハンズフリー",
    "電動リアゲート",
    "マトリクスLED",
];

/// Tunable scoring policy: uncapped per-keyword bonuses with
/// confidence weighting on by default.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// Bonus per premium-keyword hit.
    pub premium_bonus: f64,
    /// Optional cap on the accumulated keyword bonus per listing.
    pub premium_bonus_cap: Option<f64>,
    /// Penalty when a repair/accident/flood indicator is present.
    pub repair_penalty: f64,
    /// Scale the accumulated score by (0.7 + 0.3 × confidence).
    pub confidence_weighting: bool,
    /// Deal-gap thresholds and bonuses (p50 − price, yen).
    pub gap_high: f64,
    pub gap_mid: f64,
    pub gap_high_bonus: f64,
    pub gap_mid_bonus: f64,
    /// Flat bonus when the price is at or under the p20 prediction.
    pub strong_discount_bonus: f64,
    /// Reference year for vehicle age.
    pub current_year: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            premium_bonus: 2.0,
            premium_bonus_cap: None,
            repair_penalty: 25.0,
            confidence_weighting: true,
            gap_high: 500_000.0,
            gap_mid: 300_000.0,
            gap_high_bonus: 10.0,
            gap_mid_bonus: 7.0,
            strong_discount_bonus: 8.0,
            current_year: Utc::now().year(),
        }
    }
}

impl ScoringPolicy {
    /// Policy pinned to a reference year (tests, replays).
    pub fn with_year(current_year: i32) -> Self {
        Self {
            current_year,
            ..Default::default()
        }
    }
}

/// Score a listing in place against its batch's market baseline.
///
/// A listing with an unknown price is unscorable: score 0, urgency 0.
pub fn score_listing(
    listing: &mut Listing,
    market: Option<&MarketStats>,
    campaign: &CampaignConfig,
    policy: &ScoringPolicy,
) {
    if listing.price == 0 {
        listing.score = 0.0;
        listing.urgency = 0;
        return;
    }

    let ratio = match market {
        Some(stats) => listing.price as f64 / stats.median,
        None => 1.0,
    };
    listing.price_ratio = Some(round2(ratio));

    let mut score = base_from_ratio(ratio);

    let age = if listing.year > 0 {
        (policy.current_year - listing.year).max(0)
    } else {
        99
    };
    score += age_adjustment(age);

    if listing.mileage > 0 {
        let annual = listing.mileage as f64 / age.max(1) as f64;
        score += mileage_adjustment(annual);
    }

    if policy.confidence_weighting {
        score *= 0.7 + 0.3 * listing.confidence;
    }

    let mut equipment = 0.0;
    for keyword in PREMIUM_KEYWORDS {
        if listing.title.contains(keyword) {
            equipment += policy.premium_bonus;
        }
    }
    if let Some(cap) = policy.premium_bonus_cap {
        equipment = equipment.min(cap);
    }
    score += equipment;

    if listing.has_repair {
        score -= policy.repair_penalty;
    }

    let mut gap = None;
    if let Some(p50) = listing.predicted_p50 {
        let g = p50 - listing.price as f64;
        listing.deal_gap = Some(g.round() as i64);
        gap = Some(g);
        if g > policy.gap_high {
            score += policy.gap_high_bonus;
        } else if g > policy.gap_mid {
            score += policy.gap_mid_bonus;
        }
    }
    // Strong-discount signal, independent of the p50 gap bonus.
    if let Some(p20) = listing.predicted_p20 {
        if listing.price as f64 <= p20 {
            score += policy.strong_discount_bonus;
        }
    }

    let score = score.clamp(0.0, 100.0);
    let mut urgency = urgency_from_score(score);
    if ratio <= 0.6 {
        urgency = (urgency + 1).min(5);
    }
    if gap.is_some_and(|g| g > policy.gap_high) {
        urgency = (urgency + 1).min(5);
    }

    listing.score = round1(score);
    listing.urgency = urgency;

    // Ratio scoring is meaningless without a baseline; still surface
    // listings that are obviously good against the campaign's own
    // ceilings. Unknown year or mileage cannot satisfy the gate.
    if market.is_none() && strong_without_baseline(listing, campaign) {
        listing.score = listing.score.max(80.0);
        listing.urgency = listing.urgency.max(4);
    }
}

/// Base score from the price ratio step table; monotone non-increasing,
/// first bound satisfied wins.
fn base_from_ratio(ratio: f64) -> f64 {
    if ratio <= 0.6 {
        95.0
    } else if ratio <= 0.7 {
        85.0
    } else if ratio <= 0.8 {
        75.0
    } else if ratio <= 0.9 {
        65.0
    } else if ratio <= 1.0 {
        45.0
    } else {
        30.0
    }
}

fn age_adjustment(age: i32) -> f64 {
    if age <= 3 {
        15.0
    } else if age <= 5 {
        10.0
    } else if age <= 8 {
        5.0
    } else if age >= 15 {
        -10.0
    } else {
        0.0
    }
}

fn mileage_adjustment(annual_km: f64) -> f64 {
    if annual_km <= 5_000.0 {
        15.0
    } else if annual_km <= 8_000.0 {
        10.0
    } else if annual_km <= 12_000.0 {
        5.0
    } else if annual_km >= 20_000.0 {
        -10.0
    } else {
        0.0
    }
}

fn urgency_from_score(score: f64) -> u8 {
    if score >= 90.0 {
        5
    } else if score >= 80.0 {
        4
    } else if score >= 70.0 {
        3
    } else if score >= 60.0 {
        2
    } else {
        1
    }
}

/// All three conditions must hold on known values.
fn strong_without_baseline(listing: &Listing, campaign: &CampaignConfig) -> bool {
    (listing.price as f64) < campaign.price_max as f64 * 0.8
        && listing.year > 0
        && listing.year >= campaign.year_min + 2
        && listing.mileage > 0
        && (listing.mileage as f64) < campaign.mileage_max as f64 * 0.7
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;

    fn campaign() -> CampaignConfig {
        CampaignConfig {
            name: "test".into(),
            price_max: 5_000_000,
            year_min: 2015,
            mileage_max: 100_000,
            ..Default::default()
        }
    }

    fn market(median: f64) -> MarketStats {
        MarketStats {
            median,
            q25: median * 0.75,
            samples: 10,
        }
    }

    fn base_listing() -> Listing {
        Listing {
            title: "ハリアー".into(),
            url: "https://example.com/1".into(),
            price: 1_500_000,
            year: 2015, // age 10: no age adjustment
            mileage: 0,
            confidence: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_price_is_unscorable() {
        let mut listing = base_listing();
        listing.price = 0;
        score_listing(
            &mut listing,
            Some(&market(3_000_000.0)),
            &campaign(),
            &ScoringPolicy::with_year(YEAR),
        );
        assert_eq!(listing.score, 0.0);
        assert_eq!(listing.urgency, 0);
        assert!(listing.price_ratio.is_none());
    }

    #[test]
    fn test_half_ratio_scores_at_least_95() {
        let mut listing = base_listing();
        score_listing(
            &mut listing,
            Some(&market(3_000_000.0)),
            &campaign(),
            &ScoringPolicy::with_year(YEAR),
        );
        assert_eq!(listing.price_ratio, Some(0.5));
        assert!(listing.score >= 95.0, "score {}", listing.score);
        assert_eq!(listing.urgency, 5);
    }

    #[test]
    fn test_near_median_scores_baseline_45() {
        let mut listing = base_listing();
        listing.price = 2_900_000;
        score_listing(
            &mut listing,
            Some(&market(3_000_000.0)),
            &campaign(),
            &ScoringPolicy::with_year(YEAR),
        );
        assert_eq!(listing.price_ratio, Some(0.97));
        assert_eq!(listing.score, 45.0);
        assert_eq!(listing.urgency, 1);
    }

    #[test]
    fn test_repair_flag_costs_exactly_the_penalty() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut clean = base_listing();
        clean.price = 2_400_000; // ratio 0.8 → base 75, away from the clamp
        let mut flagged = clean.clone();
        flagged.has_repair = true;

        score_listing(&mut clean, Some(&market(3_000_000.0)), &campaign(), &policy);
        score_listing(&mut flagged, Some(&market(3_000_000.0)), &campaign(), &policy);
        assert_eq!(clean.score - flagged.score, policy.repair_penalty);
    }

    #[test]
    fn test_premium_keywords_add_per_hit() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut plain = base_listing();
        plain.price = 2_400_000;
        let mut equipped = plain.clone();
        equipped.title = "ハリアー サンルーフ レザー JBL".into();

        score_listing(&mut plain, Some(&market(3_000_000.0)), &campaign(), &policy);
        score_listing(&mut equipped, Some(&market(3_000_000.0)), &campaign(), &policy);
        assert_eq!(equipped.score - plain.score, 3.0 * policy.premium_bonus);
    }

    #[test]
    fn test_premium_cap_limits_accumulation() {
        let mut policy = ScoringPolicy::with_year(YEAR);
        policy.premium_bonus_cap = Some(4.0);
        let mut plain = base_listing();
        plain.price = 2_400_000;
        let mut equipped = plain.clone();
        equipped.title = "ハリアー サンルーフ レザー JBL アイサイト".into();

        score_listing(&mut plain, Some(&market(3_000_000.0)), &campaign(), &policy);
        score_listing(&mut equipped, Some(&market(3_000_000.0)), &campaign(), &policy);
        assert_eq!(equipped.score - plain.score, 4.0);
    }

    #[test]
    fn test_confidence_scales_accumulated_score() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut full = base_listing();
        full.price = 2_400_000;
        let mut weak = full.clone();
        weak.confidence = 0.0;

        score_listing(&mut full, Some(&market(3_000_000.0)), &campaign(), &policy);
        score_listing(&mut weak, Some(&market(3_000_000.0)), &campaign(), &policy);
        // base 75 × 1.0 vs 75 × 0.7
        assert_eq!(full.score, 75.0);
        assert_eq!(weak.score, 52.5);
    }

    #[test]
    fn test_gap_bonus_tiers_and_p20_stack() {
        let policy = ScoringPolicy::with_year(YEAR);
        let market = market(3_000_000.0);

        let mut mid_gap = base_listing();
        mid_gap.price = 2_400_000;
        mid_gap.predicted_p50 = Some(2_800_000.0); // gap 400k → mid tier
        score_listing(&mut mid_gap, Some(&market), &campaign(), &policy);
        assert_eq!(mid_gap.deal_gap, Some(400_000));
        assert_eq!(mid_gap.score, 75.0 + policy.gap_mid_bonus);

        let mut stacked = base_listing();
        stacked.price = 2_400_000;
        stacked.predicted_p50 = Some(3_000_000.0); // gap 600k → high tier
        stacked.predicted_p20 = Some(2_500_000.0); // price under p20
        score_listing(&mut stacked, Some(&market), &campaign(), &policy);
        assert_eq!(
            stacked.score,
            75.0 + policy.gap_high_bonus + policy.strong_discount_bonus
        );
    }

    #[test]
    fn test_urgency_boosts_stack_but_cap_at_5() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut listing = base_listing();
        listing.price = 1_500_000; // ratio 0.5 → boost
        listing.predicted_p50 = Some(2_200_000.0); // gap 700k → boost
        score_listing(&mut listing, Some(&market(3_000_000.0)), &campaign(), &policy);
        // score ≥ 90 puts base urgency at 5 already; both boosts apply
        // and the cap holds at 5 rather than summing past it.
        assert_eq!(listing.urgency, 5);
    }

    #[test]
    fn test_both_boosts_lift_a_mid_score() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut listing = base_listing();
        listing.confidence = 0.0; // drags 95+15(gap) → mid-range score
        listing.price = 1_500_000; // ratio 0.5
        listing.predicted_p50 = Some(2_100_000.0); // gap 600k
        score_listing(&mut listing, Some(&market(3_000_000.0)), &campaign(), &policy);
        // 95 × 0.7 = 66.5, +10 gap = 76.5 → base urgency 3, +1 ratio
        // boost, +1 gap boost = 5.
        assert_eq!(listing.score, 76.5);
        assert_eq!(listing.urgency, 5);
    }

    #[test]
    fn test_no_baseline_fallback_forces_strong_candidate() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut listing = base_listing();
        listing.price = 3_500_000; // under 80% of 5M
        listing.year = 2019; // ≥ year_min + 2
        listing.mileage = 40_000; // under 70% of 100k
        score_listing(&mut listing, None, &campaign(), &policy);
        assert!(listing.score >= 80.0);
        assert!(listing.urgency >= 4);
    }

    #[test]
    fn test_no_baseline_fallback_requires_known_fields() {
        let policy = ScoringPolicy::with_year(YEAR);
        let mut listing = base_listing();
        listing.price = 3_500_000;
        listing.year = 2019;
        listing.mileage = 0; // unknown — cannot satisfy the gate
        score_listing(&mut listing, None, &campaign(), &policy);
        assert!(listing.urgency < 4);
    }

    #[test]
    fn test_age_and_mileage_steps() {
        let policy = ScoringPolicy::with_year(YEAR);
        let market = market(3_000_000.0);

        let mut young = base_listing();
        young.price = 2_900_000; // ratio 0.97 → base 45, leaves clamp headroom
        young.year = 2023; // age 2 → +15
        young.mileage = 8_000; // 4000/yr → +15
        score_listing(&mut young, Some(&market), &campaign(), &policy);
        assert_eq!(young.score, 45.0 + 15.0 + 15.0);

        let mut old = base_listing();
        old.price = 2_900_000;
        old.year = 2005; // age 20 → −10
        old.mileage = 450_000; // 22.5k/yr → −10
        score_listing(&mut old, Some(&market), &campaign(), &policy);
        assert_eq!(old.score, 45.0 - 10.0 - 10.0);
    }
}
