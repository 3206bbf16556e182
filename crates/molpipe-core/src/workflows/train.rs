use crate::core::featurize::Featurizer;
use crate::core::featurize::coulomb::CoulombMatrixEig;
use crate::core::io::traits::ChemicalFile;
use crate::core::io::xyz::XyzFile;
use crate::core::models::dataset::Dataset;
use crate::engine::config::{
    FailurePolicy, FeaturizerConfig, LoaderConfig, PipelineConfig, SplitMethod,
};
use crate::engine::error::PipelineError;
use crate::engine::estimators::{ModelFamily, build_model};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search::{self, SearchResult};
use crate::engine::split::{DatasetSplit, HashSplitter, RandomSplitter, Splitter};
use crate::engine::transform::{NormalizationStats, Standardizer};
use tracing::{info, instrument, warn};

/// The search result for one configured model family.
#[derive(Debug)]
pub struct FamilyOutcome {
    pub family: ModelFamily,
    pub result: SearchResult,
}

/// The overall winner across all configured families.
#[derive(Debug, Clone, PartialEq)]
pub struct BestSelection {
    pub family: ModelFamily,
    pub trial_index: usize,
    pub score: f64,
}

/// Everything the training workflow produces: the normalized partitions, the
/// frozen normalization statistics, the per-family score tables (with trained
/// model handles on the best trials), and the cross-family winner.
#[derive(Debug)]
pub struct TrainOutcome {
    /// The transformed partitions the models were trained and scored on; the
    /// test partition is held out here for downstream evaluation.
    pub partitions: DatasetSplit,
    pub skipped_records: usize,
    pub stats: NormalizationStats,
    pub families: Vec<FamilyOutcome>,
    pub best: Option<BestSelection>,
}

impl TrainOutcome {
    pub fn sizes(&self) -> (usize, usize, usize) {
        self.partitions.sizes()
    }
}

/// Runs the complete pipeline: load and featurize, split, normalize, then
/// grid-search every configured model family on the shared partitions.
#[instrument(skip_all, name = "train_workflow")]
pub fn run(
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<TrainOutcome, PipelineError> {
    // === Phase 1: Load and featurize ===
    let (dataset, skipped_records) =
        load_dataset(&config.loader, &config.featurizer, reporter)?;

    // === Phase 2: Split ===
    reporter.report(Progress::StageStart { name: "Splitting" });
    let split = split_dataset(config, &dataset)?;
    let sizes = split.sizes();
    info!(
        "Split {} record(s) into {}/{}/{} (train/valid/test).",
        dataset.len(),
        sizes.0,
        sizes.1,
        sizes.2
    );
    reporter.report(Progress::StageFinish);

    // === Phase 3: Normalize ===
    reporter.report(Progress::StageStart {
        name: "Normalization",
    });
    let stats = Standardizer::new(config.normalize).fit(&split.train)?;
    let partitions = DatasetSplit {
        train: stats.apply(&split.train)?,
        valid: stats.apply(&split.valid)?,
        test: stats.apply(&split.test)?,
    };
    reporter.report(Progress::StageFinish);

    // === Phase 4: Hyperparameter search per family ===
    let mut families = Vec::with_capacity(config.search.models.len());
    for spec in &config.search.models {
        reporter.report(Progress::Note(format!(
            "Searching {} configurations for '{}'",
            spec.grid.len(),
            spec.family
        )));
        let result = search::run(
            &spec.grid,
            |point| build_model(spec.family, point),
            &partitions.train,
            &partitions.valid,
            config.search.metric,
            reporter,
        )?;
        families.push(FamilyOutcome {
            family: spec.family,
            result,
        });
    }

    // === Phase 5: Select the overall winner ===
    let best = select_best(config, &families);
    match &best {
        Some(selection) => info!(
            "Best model: {} (trial {}) with {} = {:.6}.",
            selection.family,
            selection.trial_index,
            config.search.metric,
            selection.score
        ),
        None => warn!("No model family produced a successful trial."),
    }

    Ok(TrainOutcome {
        partitions,
        skipped_records,
        stats,
        families,
        best,
    })
}

/// Reads the input file and featurizes every record into a dataset.
///
/// Records that cannot be featurized follow the loader's failure policy:
/// `Skip` logs a warning and drops the record, `Abort` fails the load with
/// the offending record's identity. A record without the configured label
/// property always aborts.
#[instrument(skip_all, name = "load_dataset")]
pub fn load_dataset(
    loader: &LoaderConfig,
    featurizer_config: &FeaturizerConfig,
    reporter: &ProgressReporter,
) -> Result<(Dataset, usize), PipelineError> {
    reporter.report(Progress::StageStart { name: "Loading" });
    info!("Reading records from {:?}.", loader.input_path);

    let molecules = XyzFile::read_from_path(&loader.input_path)?;
    let featurizer =
        CoulombMatrixEig::new(featurizer_config.max_atoms, featurizer_config.remove_hydrogens);

    reporter.report(Progress::CountedStart {
        total: molecules.len() as u64,
    });

    let mut dataset = Dataset::new(featurizer.feature_len());
    let mut skipped = 0usize;
    for molecule in &molecules {
        let label = molecule
            .numeric_property(&loader.label_field)
            .ok_or_else(|| PipelineError::MissingLabel {
                id: molecule.id.clone(),
                field: loader.label_field.clone(),
            })?;

        match featurizer.featurize(molecule) {
            Ok(features) => {
                dataset
                    .push(molecule.id.clone(), features, label)
                    .map_err(|e| PipelineError::Internal(e.to_string()))?;
            }
            Err(error) => match loader.on_featurize_error {
                FailurePolicy::Abort => return Err(error.into()),
                FailurePolicy::Skip => {
                    warn!("Skipping record: {}", error);
                    skipped += 1;
                }
            },
        }
        reporter.report(Progress::CountedStep);
    }
    reporter.report(Progress::CountedFinish);

    if dataset.is_empty() {
        return Err(PipelineError::AllRecordsSkipped {
            total: molecules.len(),
        });
    }
    info!(
        "Featurized {} record(s) ({} skipped) into vectors of length {}.",
        dataset.len(),
        skipped,
        dataset.feature_len()
    );
    reporter.report(Progress::StageFinish);
    Ok((dataset, skipped))
}

fn split_dataset(
    config: &PipelineConfig,
    dataset: &Dataset,
) -> Result<DatasetSplit, PipelineError> {
    let split = match config.split.method {
        SplitMethod::Random => {
            RandomSplitter::new(config.split.fractions, config.split.seed).split(dataset)?
        }
        SplitMethod::IdentifierHash => {
            HashSplitter::new(config.split.fractions, config.split.seed).split(dataset)?
        }
    };
    Ok(split)
}

fn select_best(config: &PipelineConfig, families: &[FamilyOutcome]) -> Option<BestSelection> {
    let mut best: Option<BestSelection> = None;
    for outcome in families {
        let Some(trial) = &outcome.result.best else {
            continue;
        };
        let improves = match &best {
            Some(current) => config.search.metric.is_better(trial.score, current.score),
            None => true,
        };
        if improves {
            best = Some(BestSelection {
                family: outcome.family,
                trial_index: trial.index,
                score: trial.score,
            });
        }
    }
    best
}
