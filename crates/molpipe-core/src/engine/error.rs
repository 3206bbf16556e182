use thiserror::Error;

use crate::core::featurize::FeaturizeError;
use crate::core::io::xyz::XyzError;
use crate::engine::config::ConfigError;
use crate::engine::search::SearchError;
use crate::engine::split::SplitError;
use crate::engine::transform::TransformError;

/// Errors surfaced by the end-to-end pipeline workflows.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to read input: {source}")]
    Input {
        #[from]
        source: XyzError,
    },

    #[error("Featurization failed: {source}")]
    Featurize {
        #[from]
        source: FeaturizeError,
    },

    #[error("Record '{id}' has no numeric '{field}' property to use as the label")]
    MissingLabel { id: String, field: String },

    #[error("All {total} record(s) were skipped during featurization; nothing to train on")]
    AllRecordsSkipped { total: usize },

    #[error("Dataset split failed: {source}")]
    Split {
        #[from]
        source: SplitError,
    },

    #[error("Normalization failed: {source}")]
    Transform {
        #[from]
        source: TransformError,
    },

    #[error("Hyperparameter search failed: {source}")]
    Search {
        #[from]
        source: SearchError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
