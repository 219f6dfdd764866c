//! Batch market statistics
//!
//! Order statistics over one campaign batch's prices. Recomputed per
//! batch and passed by value; never persisted across runs.

use serde::Serialize;

use crate::models::Listing;

/// A baseline needs at least this many strictly-positive prices.
const MIN_SAMPLES: usize = 4;

/// Median and lower quartile of a batch's valid prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketStats {
    pub median: f64,
    pub q25: f64,
    /// Number of strictly-positive prices that fed the statistics.
    pub samples: usize,
}

impl MarketStats {
    /// Compute batch statistics, or `None` when fewer than 4 listings
    /// carry a known price. Zero prices are unknown, never real zeros.
    pub fn compute(listings: &[Listing]) -> Option<Self> {
        let mut prices: Vec<f64> = listings
            .iter()
            .filter(|l| l.price > 0)
            .map(|l| l.price as f64)
            .collect();
        if prices.len() < MIN_SAMPLES {
            return None;
        }
        prices.sort_by(f64::total_cmp);
        Some(Self {
            median: percentile(&prices, 0.5),
            q25: percentile(&prices, 0.25),
            samples: prices.len(),
        })
    }
}

/// Interpolated-rank percentile over a sorted slice: rank = (n−1)·p; an
/// integral rank selects that element, otherwise linearly interpolate
/// between the neighbouring elements. `sorted` must be non-empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}
