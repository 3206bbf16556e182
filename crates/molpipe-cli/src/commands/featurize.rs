use crate::cli::FeaturizeArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molpipe::engine::config::{FailurePolicy, FeaturizerConfig, LoaderConfig};
use molpipe::engine::progress::ProgressReporter;
use molpipe::workflows::train;
use tracing::info;

pub fn run(args: FeaturizeArgs) -> Result<()> {
    let loader = LoaderConfig {
        input_path: args.input.clone(),
        label_field: args.label_field.clone(),
        on_featurize_error: FailurePolicy::Skip,
    };
    let featurizer = FeaturizerConfig {
        max_atoms: args.max_atoms,
        remove_hydrogens: !args.keep_hydrogens,
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Featurizing {}...", args.input.display());
    let (dataset, skipped) = train::load_dataset(&loader, &featurizer, &reporter)?;
    info!(
        "Featurized {} record(s), {} skipped.",
        dataset.len(),
        skipped
    );

    let mut writer = csv::Writer::from_path(&args.output).map_err(|e| CliError::Output {
        path: args.output.clone(),
        source: e.into(),
    })?;

    let mut header = vec!["id".to_string(), "label".to_string()];
    header.extend((0..dataset.feature_len()).map(|i| format!("f{i}")));
    writer.write_record(&header).map_err(|e| CliError::Output {
        path: args.output.clone(),
        source: e.into(),
    })?;

    for row in dataset.rows() {
        let mut record = vec![row.id.to_string(), row.label.to_string()];
        record.extend(row.features.iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(|e| CliError::Output {
            path: args.output.clone(),
            source: e.into(),
        })?;
    }
    writer.flush().map_err(|e| CliError::Output {
        path: args.output.clone(),
        source: e.into(),
    })?;

    println!(
        "✓ Feature table with {} record(s) written to: {}",
        dataset.len(),
        args.output.display()
    );
    if skipped > 0 {
        println!("  {} record(s) were skipped during featurization.", skipped);
    }

    Ok(())
}
