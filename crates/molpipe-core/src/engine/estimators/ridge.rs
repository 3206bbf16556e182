use super::{Estimator, TrainError};
use crate::core::models::dataset::Dataset;
use nalgebra::{DMatrix, DVector};

/// Linear least-squares regression with L2 regularization, solved in closed
/// form via the normal equations.
///
/// The design matrix gains a trailing bias column; the bias weight is not
/// regularized. `alpha = 0` degrades to ordinary least squares, where a
/// rank-deficient system surfaces as [`TrainError::SingularSystem`].
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    weights: Option<DVector<f64>>,
    feature_len: usize,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Result<Self, TrainError> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(TrainError::InvalidParameter {
                name: "alpha",
                message: format!("must be a finite non-negative number, got {alpha}"),
            });
        }
        Ok(Self {
            alpha,
            weights: None,
            feature_len: 0,
        })
    }
}

impl Estimator for RidgeRegression {
    fn fit(&mut self, train: &Dataset) -> Result<(), TrainError> {
        if train.is_empty() {
            return Err(TrainError::EmptyTrainingSet);
        }
        let n = train.len();
        let d = train.feature_len();

        let design = DMatrix::from_fn(n, d + 1, |i, j| {
            if j == d { 1.0 } else { train.features(i)[j] }
        });
        let labels = DVector::from_fn(n, |i, _| train.labels()[i]);

        let mut gram = design.transpose() * &design;
        for j in 0..d {
            gram[(j, j)] += self.alpha;
        }
        let rhs = design.transpose() * labels;

        let solution = gram
            .cholesky()
            .ok_or(TrainError::SingularSystem)?
            .solve(&rhs);

        self.weights = Some(solution);
        self.feature_len = d;
        Ok(())
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64, TrainError> {
        let weights = self.weights.as_ref().ok_or(TrainError::NotFitted)?;
        if features.len() != self.feature_len {
            return Err(TrainError::FeatureLengthMismatch {
                expected: self.feature_len,
                got: features.len(),
            });
        }
        let bias = weights[self.feature_len];
        let dot: f64 = features
            .iter()
            .enumerate()
            .map(|(j, &x)| x * weights[j])
            .sum();
        Ok(dot + bias)
    }
}
