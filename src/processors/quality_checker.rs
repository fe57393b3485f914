use crate::error::Result;
use crate::models::table::present;
use crate::models::{Gas, PhysicalInputs, Table};
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub total_samples: usize,
    pub complete_samples: usize,
    pub defaulted_water_volumes: usize,
    pub defaulted_gas_volumes: usize,
    pub gas_quality: Vec<GasQuality>,
    pub input_violations: Vec<InputViolation>,
}

/// Per-gas coverage of one processed batch.
#[derive(Debug, Clone, Serialize)]
pub struct GasQuality {
    pub gas: Gas,
    /// Rows whose reference air sample was found in the lab table
    pub reference_air_matched: usize,
    /// Rows that fell back to the background mixing ratio
    pub reference_air_defaulted: usize,
    pub equilibrated_matched: usize,
    pub dissolved_null: usize,
    pub percent_saturation_null: usize,
    pub non_finite: usize,
}

/// A row whose physical readings are outside their plausible range.
#[derive(Debug, Clone, Serialize)]
pub struct InputViolation {
    pub row: usize,
    pub water_sample_id: Option<String>,
    pub fields: Vec<String>,
    pub details: String,
}

/// Summarises join coverage, defaulted inputs and suspicious readings.
///
/// Nothing found here fails the batch.
pub struct QualityChecker {
    max_reported_violations: usize,
}

impl QualityChecker {
    pub fn new() -> Self {
        Self {
            max_reported_violations: 10,
        }
    }

    pub fn with_max_reported_violations(mut self, max: usize) -> Self {
        self.max_reported_violations = max;
        self
    }

    /// Compare the formatted table with the fully calculated one.
    ///
    /// Columns absent from either table are counted as empty.
    pub fn check(&self, formatted: &Table, result: &Table) -> Result<QualityReport> {
        let rows = result.num_rows();
        let mut report = QualityReport {
            total_samples: rows,
            defaulted_water_volumes: count_flags(result, "volH2OSource")?,
            defaulted_gas_volumes: count_flags(result, "volGasSource")?,
            ..QualityReport::default()
        };

        for gas in Gas::ALL {
            let air = optional_floats(formatted, &gas.air_column(), rows)?;
            let equilibrated = optional_floats(result, &gas.equilibrated_column(), rows)?;
            let dissolved = optional_floats(result, &gas.dissolved_column(), rows)?;
            let percent = optional_floats(result, &gas.percent_saturation_column(), rows)?;

            let reference_air_matched = air.iter().filter(|v| present(**v).is_some()).count();
            report.gas_quality.push(GasQuality {
                gas,
                reference_air_matched,
                reference_air_defaulted: rows - reference_air_matched,
                equilibrated_matched: equilibrated.iter().filter(|v| v.is_some()).count(),
                dissolved_null: dissolved.iter().filter(|v| v.is_none()).count(),
                percent_saturation_null: percent.iter().filter(|v| v.is_none()).count(),
                non_finite: dissolved
                    .iter()
                    .chain(percent.iter())
                    .flatten()
                    .filter(|v| !v.is_finite())
                    .count(),
            });
        }

        for (row, inputs) in physical_inputs(result)?.into_iter().enumerate() {
            if inputs.has_all_readings() {
                report.complete_samples += 1;
            }
            if let Err(errors) = inputs.validate() {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                report.input_violations.push(InputViolation {
                    row,
                    water_sample_id: inputs.water_sample_id.clone(),
                    fields,
                    details: errors.to_string(),
                });
            }
        }

        Ok(report)
    }

    pub fn generate_summary(&self, report: &QualityReport) -> String {
        let mut summary = String::new();
        let total = report.total_samples.max(1) as f64;

        summary.push_str("=== Quality Check Report ===\n");
        summary.push_str(&format!("Total Samples: {}\n", report.total_samples));
        summary.push_str(&format!(
            "Complete Physical Readings: {} ({:.1}%)\n",
            report.complete_samples,
            100.0 * report.complete_samples as f64 / total
        ));
        summary.push_str(&format!(
            "Defaulted Volumes: {} water, {} gas\n",
            report.defaulted_water_volumes, report.defaulted_gas_volumes
        ));

        summary.push_str("\nLab Matches:\n");
        for quality in &report.gas_quality {
            summary.push_str(&format!(
                "  {}: reference air {} (defaulted {}), equilibrated {}, no result {}, non-finite {}\n",
                quality.gas,
                quality.reference_air_matched,
                quality.reference_air_defaulted,
                quality.equilibrated_matched,
                quality.percent_saturation_null,
                quality.non_finite
            ));
        }

        summary.push_str(&format!(
            "\nImplausible Readings: {}\n",
            report.input_violations.len()
        ));
        if !report.input_violations.is_empty() {
            summary.push_str(&format!(
                "\nFirst {} Violations:\n",
                self.max_reported_violations.min(report.input_violations.len())
            ));
            for (i, violation) in report
                .input_violations
                .iter()
                .take(self.max_reported_violations)
                .enumerate()
            {
                summary.push_str(&format!(
                    "  {}. {} (row {}): {}\n",
                    i + 1,
                    violation.water_sample_id.as_deref().unwrap_or("unknown sample"),
                    violation.row,
                    violation.fields.join(", ")
                ));
            }
        }

        summary
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_floats(table: &Table, name: &str, rows: usize) -> Result<Vec<Option<f64>>> {
    if table.has_column(name) {
        table.float_column(name)
    } else {
        Ok(vec![None; rows])
    }
}

fn count_flags(table: &Table, name: &str) -> Result<usize> {
    Ok(optional_floats(table, name, table.num_rows())?
        .iter()
        .filter(|flag| **flag == Some(1.0))
        .count())
}

fn physical_inputs(table: &Table) -> Result<Vec<PhysicalInputs>> {
    let rows = table.num_rows();
    let ids = if table.has_column("waterSampleID") {
        table.text_column("waterSampleID")?
    } else {
        vec![None; rows]
    };
    let baro = optional_floats(table, "barometricPressure", rows)?;
    let water_temp = optional_floats(table, "waterTemp", rows)?;
    let headspace_temp = optional_floats(table, "headspaceTemp", rows)?;
    let water_volume = optional_floats(table, "waterVolume", rows)?;
    let gas_volume = optional_floats(table, "gasVolume", rows)?;

    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(row, id)| PhysicalInputs {
            water_sample_id: id,
            barometric_pressure: present(baro[row]),
            water_temp: present(water_temp[row]),
            headspace_temp: present(headspace_temp[row]),
            water_volume: present(water_volume[row]),
            gas_volume: present(gas_volume[row]),
        })
        .collect())
}
