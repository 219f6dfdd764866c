//! Out-of-fold quantile price prediction
//!
//! Trains one quantile regressor per requested probability level and
//! produces a held-out prediction for every listing in the batch: the
//! valid (known-price) subset is partitioned into k folds, each fold's
//! predictions come from a model trained only on the other folds, so no
//! listing's price ever influences its own prediction.
//!
//! Degenerate batches (too small, too few known prices) yield "absent"
//! for every listing — the predictor never fabricates a number on
//! insufficient data. A fold that fails to fit degrades the entire
//! quantile to absent (all-or-nothing), logged and non-fatal.

pub mod features;
pub mod folds;
pub mod regressor;

pub use features::{FeatureBuilder, FEATURE_NAMES, NUM_FEATURES};
pub use regressor::{FitError, GbdtQuantileRegressor, QuantileRegressor};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::models::Listing;
use folds::KFold;

/// Probability levels the pipeline requests by default.
pub const DEFAULT_QUANTILES: [f64; 2] = [0.5, 0.2];

type RegressorFactory = dyn Fn(f64) -> Box<dyn QuantileRegressor> + Send + Sync;

/// Tuning knobs for the prediction stage.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Minimum batch size before any training is attempted.
    pub min_batch: usize,
    /// Minimum number of listings with a known positive price.
    pub min_valid: usize,
    /// Upper bound on fold count; actual k = min(this, valid/3).
    pub max_folds: usize,
    /// Seed for the fold shuffle; fixed so reruns partition identically.
    pub fold_seed: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_batch: 20,
            min_valid: 15,
            max_folds: 5,
            fold_seed: 42,
        }
    }
}

/// Held-out predictions for one probability level, one slot per input
/// listing in input order. `None` = absent.
#[derive(Debug, Clone)]
pub struct QuantilePredictions {
    pub quantile: f64,
    pub values: Vec<Option<f64>>,
}

impl QuantilePredictions {
    fn absent(quantile: f64, len: usize) -> Self {
        Self {
            quantile,
            values: vec![None; len],
        }
    }
}

/// Out-of-fold predictor over a replaceable regressor.
pub struct QuantilePredictor {
    config: PredictorConfig,
    builder: FeatureBuilder,
    factory: Box<RegressorFactory>,
}

impl Default for QuantilePredictor {
    fn default() -> Self {
        Self::new(PredictorConfig::default(), FeatureBuilder::from_clock())
    }
}

impl QuantilePredictor {
    /// Predictor backed by the default gbdt regressor.
    pub fn new(config: PredictorConfig, builder: FeatureBuilder) -> Self {
        Self {
            config,
            builder,
            factory: Box::new(|quantile| Box::new(GbdtQuantileRegressor::new(quantile))),
        }
    }

    /// Substitute the regressor behind the fit/predict seam.
    pub fn with_regressor_factory(
        mut self,
        factory: impl Fn(f64) -> Box<dyn QuantileRegressor> + Send + Sync + 'static,
    ) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Predict each requested quantile for every listing, in input order.
    pub fn predict(&self, listings: &[Listing], quantiles: &[f64]) -> Vec<QuantilePredictions> {
        let absent_all = || {
            quantiles
                .iter()
                .map(|&q| QuantilePredictions::absent(q, listings.len()))
                .collect()
        };

        if listings.len() < self.config.min_batch {
            debug!(
                batch = listings.len(),
                min = self.config.min_batch,
                "batch too small for quantile prediction"
            );
            return absent_all();
        }

        // Listings with an unknown price are excluded from training and
        // receive absent predictions.
        let valid: Vec<usize> = listings
            .iter()
            .enumerate()
            .filter(|(_, l)| l.price > 0)
            .map(|(idx, _)| idx)
            .collect();
        if valid.len() < self.config.min_valid {
            debug!(
                valid = valid.len(),
                min = self.config.min_valid,
                "too few priced listings for quantile prediction"
            );
            return absent_all();
        }

        let rows: Vec<Vec<f64>> = listings.iter().map(|l| self.builder.build(l)).collect();
        let targets: Vec<f64> = listings.iter().map(|l| l.price as f64).collect();

        let k = (valid.len() / 3).min(self.config.max_folds).max(2);
        let splits = KFold::new(k, self.config.fold_seed).split(&valid);

        quantiles
            .iter()
            .map(|&quantile| {
                // Folds are independent and write disjoint output slots,
                // so fold-wise training parallelizes safely.
                let fold_results: Vec<Result<(Vec<usize>, Vec<f64>), FitError>> = splits
                    .par_iter()
                    .map(|(train, held)| {
                        let train_rows: Vec<Vec<f64>> =
                            train.iter().map(|&idx| rows[idx].clone()).collect();
                        let train_targets: Vec<f64> =
                            train.iter().map(|&idx| targets[idx]).collect();
                        let held_rows: Vec<Vec<f64>> =
                            held.iter().map(|&idx| rows[idx].clone()).collect();

                        let mut model = (self.factory)(quantile);
                        model.fit(&train_rows, &train_targets)?;
                        Ok((held.clone(), model.predict(&held_rows)))
                    })
                    .collect();

                let mut values = vec![None; listings.len()];
                for result in fold_results {
                    match result {
                        Ok((held, preds)) => {
                            for (&idx, &pred) in held.iter().zip(preds.iter()) {
                                values[idx] = Some(pred);
                            }
                        }
                        Err(e) => {
                            // All-or-nothing per quantile per batch.
                            warn!(quantile, error = %e, "quantile fit failed; dropping level");
                            return QuantilePredictions::absent(quantile, listings.len());
                        }
                    }
                }
                QuantilePredictions { quantile, values }
            })
            .collect()
    }
}
