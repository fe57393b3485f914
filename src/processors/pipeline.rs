use crate::error::{ProcessingError, Result};
use crate::models::{ConcentrationColumns, SaturationColumns, Table};
use crate::processors::{
    ConcentrationCalculator, Formatter, QualityChecker, QualityReport, SaturationCalculator,
    VolumeDefaults,
};
use crate::readers::{StackedReader, StackedTables};
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::info;

/// Runs format, concentration and saturation over one download, then
/// checks the result.
pub struct SdgPipeline {
    max_workers: usize,
    volume_defaults: VolumeDefaults,
    concentration_columns: ConcentrationColumns,
    saturation_columns: SaturationColumns,
}

impl SdgPipeline {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            volume_defaults: VolumeDefaults::default(),
            concentration_columns: ConcentrationColumns::default(),
            saturation_columns: SaturationColumns::default(),
        }
    }

    pub fn with_volume_defaults(mut self, volume_defaults: VolumeDefaults) -> Self {
        self.volume_defaults = volume_defaults;
        self
    }

    pub fn with_concentration_columns(mut self, columns: ConcentrationColumns) -> Self {
        self.concentration_columns = columns;
        self
    }

    pub fn with_saturation_columns(mut self, columns: SaturationColumns) -> Self {
        self.saturation_columns = columns;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Read the stacked tables under `source` and run every stage.
    pub async fn process_directory(
        &self,
        source: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Table, QualityReport)> {
        if let Some(p) = progress {
            p.set_message("Reading stacked tables...");
        }

        let tables = StackedReader::new().read_all(source).await?;
        self.process_tables(&tables, progress)
    }

    /// Run every stage over tables that are already loaded.
    pub fn process_tables(
        &self,
        tables: &StackedTables,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Table, QualityReport)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        pool.install(|| {
            if let Some(p) = progress {
                p.set_message("Formatting samples...");
            }
            let formatted = Formatter::new()
                .with_volume_defaults(self.volume_defaults.clone())
                .format_tables(tables)?;

            if let Some(p) = progress {
                p.set_message("Calculating dissolved concentrations...");
            }
            let concentrations = ConcentrationCalculator::new()
                .with_columns(self.concentration_columns.clone())
                .calculate(formatted.clone())?;

            if let Some(p) = progress {
                p.set_message("Calculating percent saturation...");
            }
            let result = SaturationCalculator::new()
                .with_columns(self.saturation_columns.clone())
                .calculate(concentrations)?;

            if let Some(p) = progress {
                p.set_message("Checking data quality...");
            }
            let report = QualityChecker::new().check(&formatted, &result)?;

            info!(
                "Processed {} samples on {} workers",
                result.num_rows(),
                self.max_workers
            );
            if let Some(p) = progress {
                p.finish_with_message(&format!("Processed {} samples", result.num_rows()));
            }

            Ok((result.with_name("sdg_saturation"), report))
        })
    }
}

impl Default for SdgPipeline {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
