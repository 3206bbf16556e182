use crate::core::models::dataset::Dataset;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("Cannot fit normalization statistics on an empty dataset")]
    EmptyDataset,

    #[error("Dataset feature length {got} does not match fitted statistics ({expected})")]
    FeatureLengthMismatch { expected: usize, got: usize },
}

/// Which parts of a dataset the standardizer rescales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeTargets {
    pub features: bool,
    pub label: bool,
}

impl Default for NormalizeTargets {
    fn default() -> Self {
        Self {
            features: true,
            label: true,
        }
    }
}

/// Frozen normalization statistics.
///
/// Fitted once from a training partition and applied unchanged everywhere
/// after that; [`NormalizationStats::apply`] never refits. Columns with zero
/// variance store a scale of 1.0, so their values are centered but never
/// divided by a vanishing standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationStats {
    feature_means: Vec<f64>,
    feature_scales: Vec<f64>,
    label_mean: f64,
    label_scale: f64,
    targets: NormalizeTargets,
}

const MIN_SCALE: f64 = 1e-12;

fn mean_and_scale(values: impl Iterator<Item = f64> + Clone, n: f64) -> (f64, f64) {
    let mean = values.clone().sum::<f64>() / n;
    // Population standard deviation.
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std < MIN_SCALE { 1.0 } else { std };
    (mean, scale)
}

impl NormalizationStats {
    pub fn feature_means(&self) -> &[f64] {
        &self.feature_means
    }

    pub fn feature_scales(&self) -> &[f64] {
        &self.feature_scales
    }

    pub fn label_mean(&self) -> f64 {
        self.label_mean
    }

    pub fn label_scale(&self) -> f64 {
        self.label_scale
    }

    pub fn targets(&self) -> NormalizeTargets {
        self.targets
    }

    /// Produces a new dataset with every targeted value replaced by
    /// `(x - mean) / scale`.
    ///
    /// Pure and deterministic: the same statistics applied to the same
    /// dataset always produce the same values.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, TransformError> {
        if dataset.feature_len() != self.feature_means.len() {
            return Err(TransformError::FeatureLengthMismatch {
                expected: self.feature_means.len(),
                got: dataset.feature_len(),
            });
        }

        let mut out = Dataset::new(dataset.feature_len());
        for row in dataset.rows() {
            let features: Vec<f64> = if self.targets.features {
                row.features
                    .iter()
                    .enumerate()
                    .map(|(j, &x)| (x - self.feature_means[j]) / self.feature_scales[j])
                    .collect()
            } else {
                row.features.to_vec()
            };
            let label = if self.targets.label {
                (row.label - self.label_mean) / self.label_scale
            } else {
                row.label
            };
            out.push(row.id, features, label)
                .map_err(|_| TransformError::FeatureLengthMismatch {
                    expected: self.feature_means.len(),
                    got: dataset.feature_len(),
                })?;
        }
        Ok(out)
    }

    /// Maps a normalized label back to the original scale.
    pub fn denormalize_label(&self, value: f64) -> f64 {
        if self.targets.label {
            value * self.label_scale + self.label_mean
        } else {
            value
        }
    }
}

/// Computes per-column normalization statistics from a training partition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Standardizer {
    targets: NormalizeTargets,
}

impl Standardizer {
    pub fn new(targets: NormalizeTargets) -> Self {
        Self { targets }
    }

    /// Fits mean/standard-deviation pairs for every feature column and the
    /// label. Must only ever see the training partition; validation and test
    /// data are normalized with the statistics returned here.
    pub fn fit(&self, train: &Dataset) -> Result<NormalizationStats, TransformError> {
        if train.is_empty() {
            return Err(TransformError::EmptyDataset);
        }
        let n = train.len() as f64;

        let mut feature_means = Vec::with_capacity(train.feature_len());
        let mut feature_scales = Vec::with_capacity(train.feature_len());
        for j in 0..train.feature_len() {
            let column = (0..train.len()).map(|i| train.features(i)[j]);
            let (mean, scale) = mean_and_scale(column, n);
            feature_means.push(mean);
            feature_scales.push(scale);
        }

        let (label_mean, label_scale) = mean_and_scale(train.labels().iter().copied(), n);

        Ok(NormalizationStats {
            feature_means,
            feature_scales,
            label_mean,
            label_scale,
            targets: self.targets,
        })
    }
}
