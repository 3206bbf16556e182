pub mod knn;
pub mod ridge;

use crate::core::models::dataset::Dataset;
use crate::engine::grid::{ParamError, ParamPoint, ParamPointExt};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrainError {
    #[error("Invalid hyperparameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Hyperparameter error: {0}")]
    Param(#[from] ParamError),

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature length {got} does not match the fitted model ({expected})")]
    FeatureLengthMismatch { expected: usize, got: usize },

    #[error("Normal equations are singular; increase the regularization strength")]
    SingularSystem,

    #[error("Model has not been fitted")]
    NotFitted,
}

/// A trainable regression model.
///
/// `fit` consumes a training dataset and freezes the model's parameters;
/// `predict_row` maps one feature vector to a label estimate. Implementations
/// are `Send` so grid-search trials can run on worker threads.
pub trait Estimator: Send + fmt::Debug {
    fn fit(&mut self, train: &Dataset) -> Result<(), TrainError>;

    fn predict_row(&self, features: &[f64]) -> Result<f64, TrainError>;

    fn predict(&self, dataset: &Dataset) -> Result<Vec<f64>, TrainError> {
        dataset
            .rows()
            .map(|row| self.predict_row(row.features))
            .collect()
    }
}

/// The model families the pipeline can search over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Ridge,
    Knn,
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelFamily::Ridge => "ridge",
            ModelFamily::Knn => "knn",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ModelFamily {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ridge" => Ok(ModelFamily::Ridge),
            "knn" | "k-nearest-neighbors" => Ok(ModelFamily::Knn),
            _ => Err(()),
        }
    }
}

/// Constructs an unfitted estimator for a family from one grid point.
///
/// Missing or ill-typed parameters surface as [`TrainError`]s, which the
/// search records as failed trials rather than aborting.
pub fn build_model(
    family: ModelFamily,
    point: &ParamPoint,
) -> Result<Box<dyn Estimator>, TrainError> {
    match family {
        ModelFamily::Ridge => {
            let alpha = point.float_param("alpha")?;
            Ok(Box::new(ridge::RidgeRegression::new(alpha)?))
        }
        ModelFamily::Knn => {
            let k = point.usize_param("k")?;
            let weighting = match point.str_param("weighting") {
                Ok(name) => name.parse().map_err(|()| TrainError::InvalidParameter {
                    name: "weighting",
                    message: "expected 'uniform' or 'distance'".to_string(),
                })?,
                Err(ParamError::Missing(_)) => knn::Weighting::Uniform,
                Err(error) => return Err(error.into()),
            };
            Ok(Box::new(knn::KnnRegressor::new(k, weighting)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::ParamValue;

    #[test]
    fn family_parses_from_config_names() {
        assert_eq!("ridge".parse::<ModelFamily>(), Ok(ModelFamily::Ridge));
        assert_eq!("KNN".parse::<ModelFamily>(), Ok(ModelFamily::Knn));
        assert!("forest".parse::<ModelFamily>().is_err());
        assert_eq!(ModelFamily::Ridge.to_string(), "ridge");
    }

    #[test]
    fn build_model_reports_missing_parameters() {
        let empty = ParamPoint::new();
        let err = build_model(ModelFamily::Ridge, &empty).unwrap_err();
        assert_eq!(err, TrainError::Param(ParamError::Missing("alpha".into())));
    }

    #[test]
    fn build_model_constructs_each_family() {
        let mut ridge_point = ParamPoint::new();
        ridge_point.insert("alpha".into(), ParamValue::Float(0.1));
        assert!(build_model(ModelFamily::Ridge, &ridge_point).is_ok());

        let mut knn_point = ParamPoint::new();
        knn_point.insert("k".into(), ParamValue::Int(3));
        knn_point.insert("weighting".into(), ParamValue::Str("distance".into()));
        assert!(build_model(ModelFamily::Knn, &knn_point).is_ok());
    }

    #[test]
    fn build_model_rejects_unknown_weighting() {
        let mut point = ParamPoint::new();
        point.insert("k".into(), ParamValue::Int(3));
        point.insert("weighting".into(), ParamValue::Str("cosine".into()));
        assert!(matches!(
            build_model(ModelFamily::Knn, &point).unwrap_err(),
            TrainError::InvalidParameter {
                name: "weighting",
                ..
            }
        ));
    }
}
