use crate::error::{ProcessingError, Result};
use crate::models::{Gas, Table};
use crate::readers::TableReader;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SdgStatistics {
    pub total_samples: usize,
    pub unique_stations: usize,
    pub date_range: Option<(String, String)>,
    pub gases: Vec<GasStatistics>,
}

#[derive(Debug, Serialize)]
pub struct GasStatistics {
    pub gas: Gas,
    pub dissolved: Option<ValueStats>,
    pub percent_saturation: Option<ValueStats>,
    /// Rows above 100% saturation
    pub supersaturated: usize,
    pub undersaturated: usize,
    /// Rows whose percent saturation is infinite or NaN
    pub indeterminate: usize,
}

/// Statistics over the finite values of one column.
#[derive(Debug, Clone, Serialize)]
pub struct ValueStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub min_sample: Option<String>,
    pub max_sample: Option<String>,
}

impl ValueStats {
    fn from_values(values: &[Option<f64>], samples: &[Option<String>]) -> Option<Self> {
        let mut stats: Option<ValueStats> = None;
        let mut sum = 0.0;

        for (row, value) in values.iter().enumerate() {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            let sample = samples.get(row).cloned().flatten();
            sum += value;

            match stats.as_mut() {
                None => {
                    stats = Some(ValueStats {
                        count: 1,
                        min: value,
                        max: value,
                        mean: value,
                        min_sample: sample.clone(),
                        max_sample: sample,
                    })
                }
                Some(s) => {
                    s.count += 1;
                    if value < s.min {
                        s.min = value;
                        s.min_sample = sample.clone();
                    }
                    if value > s.max {
                        s.max = value;
                        s.max_sample = sample;
                    }
                }
            }
        }

        stats.map(|mut s| {
            s.mean = sum / s.count as f64;
            s
        })
    }
}

pub struct GasAnalyzer;

impl GasAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a result file written as CSV, TSV or Parquet.
    pub fn analyze_file(&self, path: &Path) -> Result<SdgStatistics> {
        let table = TableReader::new()
            .with_text_columns(&["waterSampleID", "stationID", "collectDate"])
            .read_table(path)?;
        self.analyze_table(&table)
    }

    pub fn analyze_table(&self, table: &Table) -> Result<SdgStatistics> {
        if table.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No samples to analyze in '{}'",
                table.name()
            )));
        }

        let rows = table.num_rows();
        let samples = optional_text(table, "waterSampleID", rows)?;

        let stations: HashSet<String> = optional_text(table, "stationID", rows)?
            .into_iter()
            .flatten()
            .collect();

        let dates: Vec<String> = optional_text(table, "collectDate", rows)?
            .into_iter()
            .flatten()
            .collect();
        let date_range = match (dates.iter().min(), dates.iter().max()) {
            (Some(first), Some(last)) => Some((first.clone(), last.clone())),
            _ => None,
        };

        let mut gases = Vec::with_capacity(Gas::ALL.len());
        for gas in Gas::ALL {
            let dissolved = optional_float(table, &gas.dissolved_column(), rows)?;
            let percent = optional_float(table, &gas.percent_saturation_column(), rows)?;

            gases.push(GasStatistics {
                gas,
                dissolved: ValueStats::from_values(&dissolved, &samples),
                percent_saturation: ValueStats::from_values(&percent, &samples),
                supersaturated: percent
                    .iter()
                    .flatten()
                    .filter(|v| v.is_finite() && **v > 100.0)
                    .count(),
                undersaturated: percent
                    .iter()
                    .flatten()
                    .filter(|v| v.is_finite() && **v < 100.0)
                    .count(),
                indeterminate: percent.iter().flatten().filter(|v| !v.is_finite()).count(),
            });
        }

        Ok(SdgStatistics {
            total_samples: rows,
            unique_stations: stations.len(),
            date_range,
            gases,
        })
    }
}

impl Default for GasAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SdgStatistics {
    pub fn summary(&self) -> String {
        let date_range = self
            .date_range
            .as_ref()
            .map(|(first, last)| format!("{} to {}", first, last))
            .unwrap_or_else(|| "unknown".to_string());

        let mut summary = format!(
            "Gases: CO2, CH4, N2O (dissolved concentration, percent saturation)\n\
            Stations: {} stations\n\
            Collected: {}\n\
            Samples: {} total",
            self.unique_stations, date_range, self.total_samples
        );

        for stats in &self.gases {
            summary.push_str(&format!(
                "\n{}: {} super, {} under saturated, {} indeterminate",
                stats.gas, stats.supersaturated, stats.undersaturated, stats.indeterminate
            ));
        }

        summary
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = self.summary();

        for stats in &self.gases {
            summary.push_str(&format!("\n\n{} ({}):", stats.gas.display_name(), stats.gas));
            summary.push_str(&format!(
                "\n- Dissolved (mol/L): {}",
                describe(stats.dissolved.as_ref(), true)
            ));
            summary.push_str(&format!(
                "\n- Saturation (%): {}",
                describe(stats.percent_saturation.as_ref(), false)
            ));
        }

        summary
    }
}

fn describe(stats: Option<&ValueStats>, scientific: bool) -> String {
    let Some(s) = stats else {
        return "No valid measurements".to_string();
    };
    let value = |v: f64| {
        if scientific {
            format!("{:.3e}", v)
        } else {
            format!("{:.1}", v)
        }
    };
    let sample = |id: &Option<String>| id.clone().unwrap_or_else(|| "?".to_string());

    format!(
        "min {} ({}), max {} ({}), mean {} over {} samples",
        value(s.min),
        sample(&s.min_sample),
        value(s.max),
        sample(&s.max_sample),
        value(s.mean),
        s.count
    )
}

fn optional_text(table: &Table, name: &str, rows: usize) -> Result<Vec<Option<String>>> {
    if table.has_column(name) {
        table.text_column(name)
    } else {
        Ok(vec![None; rows])
    }
}

fn optional_float(table: &Table, name: &str, rows: usize) -> Result<Vec<Option<f64>>> {
    if table.has_column(name) {
        table.float_column(name)
    } else {
        Ok(vec![None; rows])
    }
}
