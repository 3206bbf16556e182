use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use molpipe::engine::config::{FailurePolicy, PipelineConfig, PipelineConfigBuilder, SplitMethod};
use molpipe::engine::estimators::ModelFamily;
use molpipe::engine::grid::{ParamGrid, ParamValue};
use molpipe::engine::metric::Metric;
use molpipe::engine::split::SplitFractions;
use molpipe::engine::transform::NormalizeTargets;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// The pipeline configuration as it appears in a TOML file. Everything the
/// file leaves out falls back to a sensible default; the input path always
/// comes from the command line.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub loader: FileLoader,

    pub featurizer: FileFeaturizer,

    #[serde(default)]
    pub split: FileSplit,

    #[serde(default)]
    pub normalize: FileNormalize,

    pub search: FileSearch,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileLoader {
    #[serde(rename = "label-field", default = "default_label_field")]
    pub label_field: String,

    /// "skip" or "abort".
    #[serde(rename = "on-featurize-error", default = "default_failure_policy")]
    pub on_featurize_error: String,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self {
            label_field: default_label_field(),
            on_featurize_error: default_failure_policy(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileFeaturizer {
    #[serde(rename = "max-atoms")]
    pub max_atoms: usize,

    #[serde(rename = "remove-hydrogens", default)]
    pub remove_hydrogens: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileSplit {
    #[serde(default = "default_train_fraction")]
    pub train: f64,
    #[serde(default = "default_valid_fraction")]
    pub valid: f64,
    #[serde(default = "default_test_fraction")]
    pub test: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// "random" or "identifier-hash".
    #[serde(default = "default_split_method")]
    pub method: String,
}

impl Default for FileSplit {
    fn default() -> Self {
        Self {
            train: default_train_fraction(),
            valid: default_valid_fraction(),
            test: default_test_fraction(),
            seed: default_seed(),
            method: default_split_method(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileNormalize {
    #[serde(default = "default_true")]
    pub features: bool,
    #[serde(default = "default_true")]
    pub label: bool,
}

impl Default for FileNormalize {
    fn default() -> Self {
        Self {
            features: true,
            label: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileSearch {
    /// "rmse", "mae" or "r2".
    #[serde(default = "default_metric")]
    pub metric: String,

    pub ridge: Option<FileRidgeGrid>,
    pub knn: Option<FileKnnGrid>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileRidgeGrid {
    pub alpha: Vec<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileKnnGrid {
    pub k: Vec<i64>,
    pub weighting: Option<Vec<String>>,
}

fn default_label_field() -> String {
    "energy".to_string()
}
fn default_failure_policy() -> String {
    "skip".to_string()
}
fn default_train_fraction() -> f64 {
    0.8
}
fn default_valid_fraction() -> f64 {
    0.1
}
fn default_test_fraction() -> f64 {
    0.1
}
fn default_seed() -> u64 {
    42
}
fn default_split_method() -> String {
    "random".to_string()
}
fn default_metric() -> String {
    "rmse".to_string()
}
fn default_true() -> bool {
    true
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
        debug!("Parsed configuration file {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Combines the file configuration with the command-line arguments into
    /// the final pipeline configuration. CLI overrides win over file values.
    pub fn merge_with_cli(&self, args: &RunArgs) -> Result<PipelineConfig> {
        let failure_policy: FailurePolicy =
            self.loader.on_featurize_error.parse().map_err(|_| {
                CliError::Config(format!(
                    "Unknown failure policy '{}', expected 'skip' or 'abort'",
                    self.loader.on_featurize_error
                ))
            })?;
        let split_method: SplitMethod = self.split.method.parse().map_err(|_| {
            CliError::Config(format!(
                "Unknown split method '{}', expected 'random' or 'identifier-hash'",
                self.split.method
            ))
        })?;

        let metric_name = args.metric.as_deref().unwrap_or(&self.search.metric);
        let metric: Metric = metric_name.parse().map_err(|_| {
            CliError::Config(format!(
                "Unknown metric '{}', expected 'rmse', 'mae' or 'r2'",
                metric_name
            ))
        })?;

        let mut builder = PipelineConfigBuilder::new()
            .input_path(args.input.clone())
            .label_field(self.loader.label_field.clone())
            .on_featurize_error(failure_policy)
            .max_atoms(args.max_atoms.unwrap_or(self.featurizer.max_atoms))
            .remove_hydrogens(self.featurizer.remove_hydrogens)
            .fractions(SplitFractions::new(
                self.split.train,
                self.split.valid,
                self.split.test,
            ))
            .seed(args.seed.unwrap_or(self.split.seed))
            .split_method(split_method)
            .normalize(NormalizeTargets {
                features: self.normalize.features,
                label: self.normalize.label,
            })
            .metric(metric);

        if let Some(ridge) = &self.search.ridge {
            builder = builder.model(ModelFamily::Ridge, ridge.to_grid());
        }
        if let Some(knn) = &self.search.knn {
            builder = builder.model(ModelFamily::Knn, knn.to_grid());
        }

        builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}

impl FileRidgeGrid {
    fn to_grid(&self) -> ParamGrid {
        ParamGrid::new().add(
            "alpha",
            self.alpha.iter().map(|&v| ParamValue::Float(v)).collect(),
        )
    }
}

impl FileKnnGrid {
    fn to_grid(&self) -> ParamGrid {
        let mut grid = ParamGrid::new().add(
            "k",
            self.k.iter().map(|&v| ParamValue::Int(v)).collect(),
        );
        if let Some(weighting) = &self.weighting {
            grid = grid.add(
                "weighting",
                weighting
                    .iter()
                    .map(|w| ParamValue::Str(w.clone()))
                    .collect(),
            );
        }
        grid
    }
}
