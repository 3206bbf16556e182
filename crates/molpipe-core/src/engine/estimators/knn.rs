use super::{Estimator, TrainError};
use crate::core::models::dataset::Dataset;
use std::str::FromStr;

/// How neighbour labels are combined into a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Plain average of the k nearest labels.
    #[default]
    Uniform,
    /// Inverse-distance weighted average; an exact match dominates.
    Distance,
}

impl FromStr for Weighting {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Weighting::Uniform),
            "distance" => Ok(Weighting::Distance),
            _ => Err(()),
        }
    }
}

/// k-nearest-neighbour regression over the raw training rows.
///
/// Neighbour search is a linear scan; the feature vectors this pipeline
/// produces have runtime-chosen length and the datasets are small enough
/// that an index structure would not pay for itself.
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    k: usize,
    weighting: Weighting,
    train_features: Vec<Vec<f64>>,
    train_labels: Vec<f64>,
    feature_len: usize,
}

const DISTANCE_EPSILON: f64 = 1e-12;

impl KnnRegressor {
    pub fn new(k: usize, weighting: Weighting) -> Result<Self, TrainError> {
        if k == 0 {
            return Err(TrainError::InvalidParameter {
                name: "k",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            k,
            weighting,
            train_features: Vec::new(),
            train_labels: Vec::new(),
            feature_len: 0,
        })
    }

    fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
    }
}

impl Estimator for KnnRegressor {
    fn fit(&mut self, train: &Dataset) -> Result<(), TrainError> {
        if train.is_empty() {
            return Err(TrainError::EmptyTrainingSet);
        }
        if self.k > train.len() {
            return Err(TrainError::InvalidParameter {
                name: "k",
                message: format!(
                    "{} exceeds the training set size of {}",
                    self.k,
                    train.len()
                ),
            });
        }

        self.train_features = (0..train.len()).map(|i| train.features(i).to_vec()).collect();
        self.train_labels = train.labels().to_vec();
        self.feature_len = train.feature_len();
        Ok(())
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64, TrainError> {
        if self.train_features.is_empty() {
            return Err(TrainError::NotFitted);
        }
        if features.len() != self.feature_len {
            return Err(TrainError::FeatureLengthMismatch {
                expected: self.feature_len,
                got: features.len(),
            });
        }

        let mut neighbours: Vec<(f64, f64)> = self
            .train_features
            .iter()
            .zip(&self.train_labels)
            .map(|(x, &y)| (Self::squared_distance(features, x), y))
            .collect();
        neighbours.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        neighbours.truncate(self.k);

        let prediction = match self.weighting {
            Weighting::Uniform => {
                neighbours.iter().map(|(_, y)| y).sum::<f64>() / neighbours.len() as f64
            }
            Weighting::Distance => {
                let mut weighted = 0.0;
                let mut total = 0.0;
                for (d2, y) in &neighbours {
                    let w = 1.0 / (d2.sqrt() + DISTANCE_EPSILON);
                    weighted += w * y;
                    total += w;
                }
                weighted / total
            }
        };
        Ok(prediction)
    }
}
