//! Quantile regressor seam
//!
//! The out-of-fold cross-validation discipline lives in the predictor;
//! the regressor behind it is a replaceable black box with a
//! `fit`/`predict` contract, so any quantile-capable regression library
//! can be substituted (and tests can inject a recording stand-in).
//!
//! The default implementation wraps the `gbdt` crate. gbdt-rs exposes
//! LAD loss (the pinball loss at 0.5) but no arbitrary-alpha pinball
//! loss, so non-median quantiles are approximated by shifting the LAD
//! fit by the requested quantile of its training residuals.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`) while the
//! feature vectors are `f64`. Conversions happen at the crate boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use thiserror::Error;

use crate::stats;

/// Why a regressor could not be fitted.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("no training samples provided")]
    EmptyTrainingSet,
    #[error("feature count ({features}) does not match target count ({targets})")]
    ShapeMismatch { features: usize, targets: usize },
    #[error("model fit failed: {0}")]
    FitFailed(String),
}

/// Minimal capability interface for a quantile-loss regressor.
pub trait QuantileRegressor: Send {
    /// Fit on feature rows and their targets. Lengths must match.
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<(), FitError>;

    /// Predict one value per feature row. An unfitted regressor returns
    /// zeros; the predictor always fits before predicting.
    fn predict(&self, features: &[Vec<f64>]) -> Vec<f64>;
}

/// Gradient-boosted quantile regressor backed by the `gbdt` crate.
pub struct GbdtQuantileRegressor {
    quantile: f64,
    iterations: usize,
    max_depth: u32,
    shrinkage: f64,
    model: Option<GBDT>,
    /// Training-residual quantile, added to raw predictions to bend the
    /// median fit toward the requested level.
    offset: f64,
}

impl GbdtQuantileRegressor {
    /// `quantile` is the target probability level in (0, 1).
    pub fn new(quantile: f64) -> Self {
        Self {
            quantile,
            iterations: 100,
            max_depth: 4,
            shrinkage: 0.1,
            model: None,
            offset: 0.0,
        }
    }
}

#[inline]
fn row_to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

impl QuantileRegressor for GbdtQuantileRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<(), FitError> {
        if features.is_empty() {
            return Err(FitError::EmptyTrainingSet);
        }
        if features.len() != targets.len() {
            return Err(FitError::ShapeMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(features[0].len());
        cfg.set_max_depth(self.max_depth);
        cfg.set_iterations(self.iterations);
        cfg.set_shrinkage(self.shrinkage as f32);
        cfg.set_loss("LAD");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(1);

        let mut model = GBDT::new(&cfg);
        let mut training_data: Vec<Data> = features
            .iter()
            .zip(targets.iter())
            .map(|(row, &target)| {
                Data::new_training_data(row_to_f32(row), 1.0_f32, target as f32, None)
            })
            .collect();
        model.fit(&mut training_data);

        // Residual shift for non-median levels; the LAD fit already
        // targets the conditional median.
        self.offset = if (self.quantile - 0.5).abs() < f64::EPSILON {
            0.0
        } else {
            let test_data: Vec<Data> = features
                .iter()
                .map(|row| Data::new_test_data(row_to_f32(row), None))
                .collect();
            let fitted = model.predict(&test_data);
            let mut residuals: Vec<f64> = targets
                .iter()
                .zip(fitted.iter())
                .map(|(&target, &fit)| target - fit as f64)
                .collect();
            residuals.sort_by(f64::total_cmp);
            stats::percentile(&residuals, self.quantile)
        };

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        let Some(model) = &self.model else {
            return vec![0.0; features.len()];
        };
        if features.is_empty() {
            return Vec::new();
        }
        let data: Vec<Data> = features
            .iter()
            .map(|row| Data::new_test_data(row_to_f32(row), None))
            .collect();
        model
            .predict(&data)
            .into_iter()
            .map(|value| value as f64 + self.offset)
            .collect()
    }
}
