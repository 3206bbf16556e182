use crate::engine::estimators::ModelFamily;
use crate::engine::grid::ParamGrid;
use crate::engine::metric::Metric;
use crate::engine::split::SplitFractions;
use crate::engine::transform::NormalizeTargets;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("No model grids configured; the search needs at least one family")]
    NoModels,
}

/// Whether a record that cannot be featurized is skipped with a warning or
/// aborts the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log a warning for the offending record and continue.
    #[default]
    Skip,
    /// Abort the whole load, surfacing the offending record.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub input_path: PathBuf,
    /// Name of the record property holding the regression label.
    pub label_field: String,
    pub on_featurize_error: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeaturizerConfig {
    pub max_atoms: usize,
    pub remove_hydrogens: bool,
}

/// How the dataset rows are assigned to partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMethod {
    #[default]
    Random,
    IdentifierHash,
}

impl FromStr for SplitMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SplitMethod::Random),
            "hash" | "identifier-hash" => Ok(SplitMethod::IdentifierHash),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub fractions: SplitFractions,
    pub seed: u64,
    pub method: SplitMethod,
}

/// One model family together with its hyperparameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub family: ModelFamily,
    pub grid: ParamGrid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub metric: Metric,
    pub models: Vec<ModelSpec>,
}

/// Complete configuration for the end-to-end training workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub loader: LoaderConfig,
    pub featurizer: FeaturizerConfig,
    pub split: SplitConfig,
    pub normalize: NormalizeTargets,
    pub search: SearchConfig,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    label_field: Option<String>,
    on_featurize_error: FailurePolicy,
    max_atoms: Option<usize>,
    remove_hydrogens: bool,
    fractions: Option<SplitFractions>,
    seed: Option<u64>,
    split_method: SplitMethod,
    normalize: NormalizeTargets,
    metric: Metric,
    models: Vec<ModelSpec>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_path(mut self, path: PathBuf) -> Self {
        self.input_path = Some(path);
        self
    }
    pub fn label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = Some(field.into());
        self
    }
    pub fn on_featurize_error(mut self, policy: FailurePolicy) -> Self {
        self.on_featurize_error = policy;
        self
    }
    pub fn max_atoms(mut self, max_atoms: usize) -> Self {
        self.max_atoms = Some(max_atoms);
        self
    }
    pub fn remove_hydrogens(mut self, remove: bool) -> Self {
        self.remove_hydrogens = remove;
        self
    }
    pub fn fractions(mut self, fractions: SplitFractions) -> Self {
        self.fractions = Some(fractions);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn split_method(mut self, method: SplitMethod) -> Self {
        self.split_method = method;
        self
    }
    pub fn normalize(mut self, targets: NormalizeTargets) -> Self {
        self.normalize = targets;
        self
    }
    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
    pub fn model(mut self, family: ModelFamily, grid: ParamGrid) -> Self {
        self.models.push(ModelSpec { family, grid });
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        Ok(PipelineConfig {
            loader: LoaderConfig {
                input_path: self
                    .input_path
                    .ok_or(ConfigError::MissingParameter("input_path"))?,
                label_field: self
                    .label_field
                    .ok_or(ConfigError::MissingParameter("label_field"))?,
                on_featurize_error: self.on_featurize_error,
            },
            featurizer: FeaturizerConfig {
                max_atoms: self
                    .max_atoms
                    .ok_or(ConfigError::MissingParameter("max_atoms"))?,
                remove_hydrogens: self.remove_hydrogens,
            },
            split: SplitConfig {
                fractions: self
                    .fractions
                    .ok_or(ConfigError::MissingParameter("fractions"))?,
                seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
                method: self.split_method,
            },
            normalize: self.normalize,
            search: SearchConfig {
                metric: self.metric,
                models: self.models,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::ParamValue;

    fn ridge_grid() -> ParamGrid {
        ParamGrid::new().add("alpha", vec![ParamValue::Float(0.1)])
    }

    fn complete_builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
            .input_path(PathBuf::from("input.xyz"))
            .label_field("energy")
            .max_atoms(23)
            .fractions(SplitFractions::new(0.8, 0.1, 0.1))
            .seed(123)
            .model(ModelFamily::Ridge, ridge_grid())
    }

    #[test]
    fn builder_produces_complete_config() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.loader.label_field, "energy");
        assert_eq!(config.loader.on_featurize_error, FailurePolicy::Skip);
        assert_eq!(config.featurizer.max_atoms, 23);
        assert!(!config.featurizer.remove_hydrogens);
        assert_eq!(config.split.seed, 123);
        assert_eq!(config.split.method, SplitMethod::Random);
        assert_eq!(config.search.metric, Metric::Rmse);
        assert_eq!(config.search.models.len(), 1);
    }

    #[test]
    fn builder_reports_missing_parameters() {
        let err = PipelineConfigBuilder::new()
            .label_field("energy")
            .max_atoms(10)
            .fractions(SplitFractions::default())
            .seed(0)
            .model(ModelFamily::Ridge, ridge_grid())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("input_path"));
    }

    #[test]
    fn builder_rejects_empty_model_list() {
        let err = PipelineConfigBuilder::new()
            .input_path(PathBuf::from("input.xyz"))
            .label_field("energy")
            .max_atoms(10)
            .fractions(SplitFractions::default())
            .seed(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoModels);
    }

    #[test]
    fn enum_settings_parse_from_config_names() {
        assert_eq!("skip".parse::<FailurePolicy>(), Ok(FailurePolicy::Skip));
        assert_eq!("Abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert!("ignore".parse::<FailurePolicy>().is_err());

        assert_eq!("random".parse::<SplitMethod>(), Ok(SplitMethod::Random));
        assert_eq!(
            "identifier-hash".parse::<SplitMethod>(),
            Ok(SplitMethod::IdentifierHash)
        );
        assert!("scaffold".parse::<SplitMethod>().is_err());
    }
}
