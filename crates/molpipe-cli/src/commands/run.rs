use crate::cli::RunArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molpipe::engine::grid::format_point;
use molpipe::engine::progress::ProgressReporter;
use molpipe::engine::search::TrialOutcome;
use molpipe::workflows::train::{self, TrainOutcome};
use std::path::Path;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let file_config = FileConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = file_config.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting pipeline run on {}...", args.input.display());
    let outcome = train::run(&config, &reporter)?;

    print_summary(&outcome, &config.search.metric.to_string());

    if let Some(table_path) = &args.table {
        write_trial_table(&outcome, table_path)?;
        println!("Trial table written to: {}", table_path.display());
    }

    Ok(())
}

fn print_summary(outcome: &TrainOutcome, metric_name: &str) {
    let (train, valid, test) = outcome.sizes();
    println!(
        "Partitioned into {} train / {} valid / {} test record(s) ({} skipped during loading).",
        train, valid, test, outcome.skipped_records
    );

    for family in &outcome.families {
        match &family.result.best {
            Some(best) => println!(
                "  {}: best trial {} ({}) with {} = {:.6}, {} of {} trial(s) failed",
                family.family,
                best.index,
                format_point(&best.point),
                metric_name,
                best.score,
                family.result.failed_count(),
                family.result.trials.len()
            ),
            None => println!(
                "  {}: every trial failed ({} total)",
                family.family,
                family.result.trials.len()
            ),
        }
    }

    match &outcome.best {
        Some(best) => println!(
            "✓ Best model: {} (trial {}) with {} = {:.6}",
            best.family, best.trial_index, metric_name, best.score
        ),
        None => println!("Warning: no model family produced a successful trial."),
    }
}

/// Writes the full score table as CSV: one row per trial across every family,
/// with an empty score and a message for failed trials.
fn write_trial_table(outcome: &TrainOutcome, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    writer
        .write_record(["family", "trial", "params", "score", "error"])
        .map_err(|e| CliError::Output {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    for family in &outcome.families {
        for trial in &family.result.trials {
            let (score, error) = match &trial.outcome {
                TrialOutcome::Scored(score) => (format!("{score}"), String::new()),
                TrialOutcome::Failed(message) => (String::new(), message.clone()),
            };
            writer
                .write_record([
                    family.family.to_string(),
                    trial.index.to_string(),
                    format_point(&trial.point),
                    score,
                    error,
                ])
                .map_err(|e| CliError::Output {
                    path: path.to_path_buf(),
                    source: e.into(),
                })?;
        }
    }

    writer.flush().map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(())
}
