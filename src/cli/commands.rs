use crate::analyzers::GasAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::Table;
use crate::processors::{
    ConcentrationCalculator, Formatter, QualityChecker, SaturationCalculator, SdgPipeline,
};
use crate::readers::TableReader;
use crate::utils::filename::generate_default_output_filename;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_table, CsvWriter, ParquetWriter};
use std::path::Path;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Format {
            input_dir,
            output_file,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("formatted"));
            println!("Formatting stacked tables...");
            println!("Input directory: {}", input_dir.display());

            let formatted = Formatter::new()
                .with_volume_defaults(settings.volume_defaults.clone())
                .format_directory(&input_dir)
                .await?;

            write_output(&formatted, &output_file, &settings)?;
        }

        Commands::Concentration {
            input_file,
            output_file,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("concentration"));
            println!("Calculating dissolved concentrations...");
            println!("Input file: {}", input_file.display());

            let table = ConcentrationCalculator::new()
                .with_columns(settings.concentration_columns.clone())
                .calculate(input_file.as_path())?;

            write_output(&table, &output_file, &settings)?;
        }

        Commands::Saturation {
            input_file,
            output_file,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("saturation"));
            println!("Calculating percent saturation...");
            println!("Input file: {}", input_file.display());

            let table = SaturationCalculator::new()
                .with_columns(settings.saturation_columns.clone())
                .calculate(input_file.as_path())?;

            write_output(&table, &output_file, &settings)?;
        }

        Commands::Process {
            input_dir,
            output_file,
            compression,
            validate_only,
            max_workers,
        } => {
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("saturation"));
            let mut settings = settings;
            if let Some(compression) = compression {
                settings.output.compression = compression;
                settings.validate()?;
            }

            println!("Processing dissolved gas data...");
            println!("Input directory: {}", input_dir.display());
            println!("Output file: {}", output_file.display());
            println!("Workers: {}", max_workers);

            let progress = ProgressReporter::new_spinner("Processing data...", false);

            let pipeline = SdgPipeline::new(max_workers)
                .with_volume_defaults(settings.volume_defaults.clone())
                .with_concentration_columns(settings.concentration_columns.clone())
                .with_saturation_columns(settings.saturation_columns.clone());

            let (table, report) = pipeline
                .process_directory(&input_dir, Some(&progress))
                .await?;

            let checker = QualityChecker::new();
            println!("\n{}", checker.generate_summary(&report));

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            if table.is_empty() {
                println!("No samples to write");
                return Ok(());
            }

            write_output(&table, &output_file, &settings)?;
            println!("Processing complete!");
        }

        Commands::Info { file, sample, json } => {
            let table = TableReader::new()
                .with_text_columns(&["waterSampleID", "stationID", "collectDate"])
                .read_table(&file)?;
            let stats = GasAnalyzer::new().analyze_table(&table)?;

            if json {
                let text = serde_json::to_string_pretty(&stats)
                    .map_err(|e| ProcessingError::InvalidFormat(e.to_string()))?;
                println!("{}", text);
                return Ok(());
            }

            println!("Analyzing result file: {}", file.display());
            println!("\n{}", stats.detailed_summary());

            if is_parquet(&file) {
                let file_info = ParquetWriter::new().get_file_info(&file)?;
                println!("\nFile Details:");
                println!("{}", file_info.summary());
            }

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(table.num_rows()));
                CsvWriter::new().write_to(&table.head(sample), std::io::stdout())?;
            }
        }
    }

    Ok(())
}

fn write_output(table: &Table, path: &Path, settings: &Settings) -> Result<()> {
    let parquet = ParquetWriter::new()
        .with_compression(&settings.output.compression)?
        .with_row_group_size(settings.output.row_group_size);
    write_table(table, path, &parquet)?;

    info!("Wrote {} rows to {}", table.num_rows(), path.display());
    println!(
        "Wrote {} samples x {} columns to {}",
        table.num_rows(),
        table.num_columns(),
        path.display()
    );
    Ok(())
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"))
}
