use crate::core::models::dataset::Dataset;
use crate::engine::estimators::{Estimator, TrainError};
use crate::engine::grid::{ParamGrid, ParamPoint, format_point};
use crate::engine::metric::Metric;
use crate::engine::progress::{Progress, ProgressReporter};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("Hyperparameter grid is empty")]
    EmptyGrid,

    #[error("The {name} dataset is empty")]
    EmptyDataset { name: &'static str },
}

/// The outcome of one grid configuration.
#[derive(Debug)]
pub enum TrialOutcome {
    /// Validation score of the fitted model.
    Scored(f64),
    /// Training failed; the search continued without this configuration.
    Failed(String),
}

/// One entry of the search's score table.
#[derive(Debug)]
pub struct TrialRecord {
    pub index: usize,
    pub point: ParamPoint,
    pub outcome: TrialOutcome,
}

/// The winning configuration, carrying its trained model.
#[derive(Debug)]
pub struct BestTrial {
    pub index: usize,
    pub point: ParamPoint,
    pub score: f64,
    pub model: Box<dyn Estimator>,
}

/// The full result of a grid search: the score table has exactly one entry
/// per grid point; `best` is `None` only when every trial failed.
#[derive(Debug)]
pub struct SearchResult {
    pub best: Option<BestTrial>,
    pub trials: Vec<TrialRecord>,
}

impl SearchResult {
    pub fn failed_count(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| matches!(t.outcome, TrialOutcome::Failed(_)))
            .count()
    }
}

type FittedTrial = Result<(Box<dyn Estimator>, f64), TrainError>;

fn run_trial<B>(
    builder: &B,
    point: &ParamPoint,
    train: &Dataset,
    valid: &Dataset,
    metric: Metric,
) -> FittedTrial
where
    B: Fn(&ParamPoint) -> Result<Box<dyn Estimator>, TrainError>,
{
    let mut model = builder(point)?;
    model.fit(train)?;
    let predictions = model.predict(valid)?;
    let score = metric.score(&predictions, valid.labels());
    Ok((model, score))
}

/// Trains one model per grid configuration and selects the one with the best
/// validation score.
///
/// Trials run in enumeration order (in parallel when the `parallel` feature
/// is enabled); selection is sequential, so ties always go to the first
/// configuration encountered. A trial whose construction or training fails is
/// recorded in the table and skipped, never propagated.
#[instrument(skip_all, name = "grid_search", fields(trials = grid.len()))]
pub fn run<B>(
    grid: &ParamGrid,
    builder: B,
    train: &Dataset,
    valid: &Dataset,
    metric: Metric,
    reporter: &ProgressReporter,
) -> Result<SearchResult, SearchError>
where
    B: Fn(&ParamPoint) -> Result<Box<dyn Estimator>, TrainError> + Sync,
{
    if grid.is_empty() {
        return Err(SearchError::EmptyGrid);
    }
    if train.is_empty() {
        return Err(SearchError::EmptyDataset { name: "training" });
    }
    if valid.is_empty() {
        return Err(SearchError::EmptyDataset { name: "validation" });
    }

    let points = grid.points();
    info!(
        "Starting grid search over {} configuration(s) scored by {}.",
        points.len(),
        metric
    );
    reporter.report(Progress::CountedStart {
        total: points.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = points.iter();

    #[cfg(feature = "parallel")]
    let iterator = points.par_iter();

    let fitted: Vec<FittedTrial> = iterator
        .map(|point| {
            let outcome = run_trial(&builder, point, train, valid, metric);
            reporter.report(Progress::CountedStep);
            outcome
        })
        .collect();

    reporter.report(Progress::CountedFinish);

    let mut trials = Vec::with_capacity(points.len());
    let mut best: Option<BestTrial> = None;
    for (index, (point, outcome)) in points.into_iter().zip(fitted).enumerate() {
        match outcome {
            Ok((model, score)) => {
                debug!("Trial {} ({}) scored {:.6}.", index, format_point(&point), score);
                let improves = match &best {
                    Some(current) => metric.is_better(score, current.score),
                    None => true,
                };
                if improves {
                    best = Some(BestTrial {
                        index,
                        point: point.clone(),
                        score,
                        model,
                    });
                }
                trials.push(TrialRecord {
                    index,
                    point,
                    outcome: TrialOutcome::Scored(score),
                });
            }
            Err(error) => {
                warn!(
                    "Trial {} ({}) failed: {}. Continuing with remaining configurations.",
                    index,
                    format_point(&point),
                    error
                );
                trials.push(TrialRecord {
                    index,
                    point,
                    outcome: TrialOutcome::Failed(error.to_string()),
                });
            }
        }
    }

    match &best {
        Some(winner) => info!(
            "Grid search finished: best trial {} ({}) with {} = {:.6}.",
            winner.index,
            format_point(&winner.point),
            metric,
            winner.score
        ),
        None => warn!("Grid search finished with no successful trial."),
    }

    Ok(SearchResult { best, trials })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::estimators::ridge::RidgeRegression;
    use crate::engine::estimators::{ModelFamily, build_model};
    use crate::engine::grid::{ParamPointExt, ParamValue};

    fn line_dataset(n: usize) -> Dataset {
        let mut ds = Dataset::new(1);
        for i in 0..n {
            let x = i as f64;
            ds.push(format!("p{i}"), vec![x], 2.0 * x + 1.0).unwrap();
        }
        ds
    }

    fn alpha_grid(values: &[f64]) -> ParamGrid {
        ParamGrid::new().add(
            "alpha",
            values.iter().map(|&v| ParamValue::Float(v)).collect(),
        )
    }

    fn ridge_builder(point: &ParamPoint) -> Result<Box<dyn Estimator>, TrainError> {
        build_model(ModelFamily::Ridge, point)
    }

    #[test]
    fn table_has_one_entry_per_grid_point() {
        let grid = alpha_grid(&[0.0, 0.1, 1.0, 10.0]);
        let result = run(
            &grid,
            ridge_builder,
            &line_dataset(8),
            &line_dataset(4),
            Metric::Rmse,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.trials.len(), 4);
        assert_eq!(result.failed_count(), 0);
        for (i, trial) in result.trials.iter().enumerate() {
            assert_eq!(trial.index, i);
        }
    }

    #[test]
    fn best_score_beats_every_scored_trial() {
        let grid = alpha_grid(&[0.0, 1.0, 100.0]);
        let result = run(
            &grid,
            ridge_builder,
            &line_dataset(10),
            &line_dataset(5),
            Metric::Rmse,
            &ProgressReporter::new(),
        )
        .unwrap();

        let best = result.best.as_ref().unwrap();
        for trial in &result.trials {
            if let TrialOutcome::Scored(score) = trial.outcome {
                assert!(best.score <= score);
            }
        }
        // Unregularized ridge nails the exact linear data.
        assert_eq!(best.point.float_param("alpha").unwrap(), 0.0);
        assert!(best.score < 1e-8);
    }

    #[test]
    fn ties_go_to_the_first_configuration() {
        // A builder that ignores its parameters entirely: every trial scores
        // identically, so the winner must be index 0.
        let grid = alpha_grid(&[5.0, 6.0, 7.0]);
        let constant_builder = |_: &ParamPoint| -> Result<Box<dyn Estimator>, TrainError> {
            Ok(Box::new(RidgeRegression::new(1.0)?))
        };
        let result = run(
            &grid,
            constant_builder,
            &line_dataset(8),
            &line_dataset(4),
            Metric::Rmse,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.best.unwrap().index, 0);
    }

    #[test]
    fn failed_trials_are_recorded_and_search_continues() {
        let grid = alpha_grid(&[-1.0, 0.5]);
        let result = run(
            &grid,
            ridge_builder,
            &line_dataset(8),
            &line_dataset(4),
            Metric::Rmse,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.trials.len(), 2);
        assert_eq!(result.failed_count(), 1);
        assert!(matches!(result.trials[0].outcome, TrialOutcome::Failed(_)));
        assert!(matches!(result.trials[1].outcome, TrialOutcome::Scored(_)));
        assert_eq!(result.best.unwrap().index, 1);
    }

    #[test]
    fn all_failures_yield_no_best() {
        let grid = alpha_grid(&[-1.0, -2.0]);
        let result = run(
            &grid,
            ridge_builder,
            &line_dataset(8),
            &line_dataset(4),
            Metric::Rmse,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(result.best.is_none());
        assert_eq!(result.failed_count(), 2);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = run(
            &ParamGrid::new(),
            ridge_builder,
            &line_dataset(8),
            &line_dataset(4),
            Metric::Rmse,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(SearchError::EmptyGrid)));
    }

    #[test]
    fn empty_partitions_are_rejected() {
        let grid = alpha_grid(&[0.1]);
        let empty = Dataset::new(1);
        assert!(matches!(
            run(
                &grid,
                ridge_builder,
                &empty,
                &line_dataset(4),
                Metric::Rmse,
                &ProgressReporter::new(),
            ),
            Err(SearchError::EmptyDataset { name: "training" })
        ));
        assert!(matches!(
            run(
                &grid,
                ridge_builder,
                &line_dataset(4),
                &empty,
                Metric::Rmse,
                &ProgressReporter::new(),
            ),
            Err(SearchError::EmptyDataset { name: "validation" })
        ));
    }

    #[test]
    fn maximized_metrics_select_the_highest_score() {
        let grid = alpha_grid(&[0.0, 1000.0]);
        let result = run(
            &grid,
            ridge_builder,
            &line_dataset(10),
            &line_dataset(5),
            Metric::RSquared,
            &ProgressReporter::new(),
        )
        .unwrap();

        let best = result.best.unwrap();
        assert_eq!(best.point.float_param("alpha").unwrap(), 0.0);
        assert!((best.score - 1.0).abs() < 1e-8);
    }
}
