use crate::error::Result;
use crate::models::{percent_saturation, Gas, SaturationColumns, Table};
use crate::readers::TableSource;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Appends `satConc<Gas>` (mol/L) and `<Gas>PercSat` for every gas.
///
/// Reference air defaulting is applied again here, so a table written by
/// some other tool can be passed in directly.
pub struct SaturationCalculator {
    columns: SaturationColumns,
}

impl SaturationCalculator {
    pub fn new() -> Self {
        Self {
            columns: SaturationColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: SaturationColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn columns(&self) -> &SaturationColumns {
        &self.columns
    }

    pub fn calculate(&self, source: impl Into<TableSource>) -> Result<Table> {
        let mut table = source.into().resolve()?;
        let columns = &self.columns;

        let baro = table.float_column(&columns.baro)?;
        let water_temp = table.float_column(&columns.water_temp)?;

        let mut results = Vec::with_capacity(Gas::ALL.len());
        for gas in Gas::ALL {
            let dissolved = table.float_column(columns.dissolved(gas))?;
            let source_air = gas.fill_missing_source(table.float_column(columns.source(gas))?);

            let saturation: Vec<Option<f64>> = (0..table.num_rows())
                .into_par_iter()
                .map(|row| {
                    Some(gas.saturation_concentration(water_temp[row]?, source_air[row]?, baro[row]?))
                })
                .collect();

            let percent: Vec<Option<f64>> = dissolved
                .par_iter()
                .zip(saturation.par_iter())
                .map(|(dissolved, saturation)| {
                    Some(percent_saturation((*dissolved)?, (*saturation)?))
                })
                .collect();

            let non_finite = percent
                .iter()
                .flatten()
                .filter(|v| !v.is_finite())
                .count();
            if non_finite > 0 {
                warn!(
                    "{}: {} rows have an indeterminate percent saturation",
                    gas, non_finite
                );
            }
            debug!(
                "{}: {} of {} rows have a percent saturation",
                gas,
                percent.iter().filter(|v| v.is_some()).count(),
                percent.len()
            );

            results.push((gas, source_air, saturation, percent));
        }

        for (gas, source_air, saturation, percent) in results {
            table.set_float_column(columns.source(gas), source_air)?;
            table.set_float_column(gas.saturation_column(), saturation)?;
            table.set_float_column(gas.percent_saturation_column(), percent)?;
        }

        Ok(table)
    }
}

impl Default for SaturationCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Append saturation concentrations and percent saturation to `source`.
pub fn calc_saturation(source: impl Into<TableSource>, columns: &SaturationColumns) -> Result<Table> {
    SaturationCalculator::new()
        .with_columns(columns.clone())
        .calculate(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::Column;
    use crate::processors::concentration::tests::formatted_table;
    use crate::processors::ConcentrationCalculator;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be present");
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs(),
            "actual {} differs from expected {}",
            actual,
            expected
        );
    }

    fn concentration_table() -> Table {
        ConcentrationCalculator::new()
            .calculate(formatted_table())
            .unwrap()
    }

    #[test]
    fn test_saturation_reference_values() {
        let table = SaturationCalculator::new()
            .calculate(concentration_table())
            .unwrap();

        assert_close(table.float_column("satConcCO2").unwrap()[0], 1.731879822154731e-05);
        assert_close(table.float_column("satConcCH4").unwrap()[0], 3.166452576278388e-09);
        assert_close(table.float_column("satConcN2O").unwrap()[0], 1.0627700573937451e-08);
        assert_close(table.float_column("CO2PercSat").unwrap()[0], 334.8428138501325);
    }

    #[test]
    fn test_percent_saturation_is_ratio_of_columns() {
        let table = SaturationCalculator::new()
            .calculate(concentration_table())
            .unwrap();

        for gas in Gas::ALL {
            let dissolved = table.float_column(&gas.dissolved_column()).unwrap()[0].unwrap();
            let saturation = table.float_column(&gas.saturation_column()).unwrap()[0].unwrap();
            assert_close(
                table.float_column(&gas.percent_saturation_column()).unwrap()[0],
                dissolved / saturation * 100.0,
            );
        }
    }

    #[test]
    fn test_defaulting_is_self_contained() {
        let table = Table::from_columns(
            "external",
            vec![
                Column::float("barometricPressure", vec![Some(98.0)]),
                Column::float("waterTemp", vec![Some(15.0)]),
                Column::float("headspaceTemp", vec![Some(22.0)]),
                Column::float("dissolvedCO2", vec![Some(5.799075129005572e-05)]),
                Column::float("concentrationCO2Air", vec![None]),
                Column::float("dissolvedCH4", vec![None]),
                Column::float("concentrationCH4Air", vec![Some(f64::NAN)]),
                Column::float("dissolvedN2O", vec![Some(1.6288290544059294e-08)]),
                Column::float("concentrationN2OAir", vec![None]),
            ],
        )
        .unwrap();

        let result = calc_saturation(table, &SaturationColumns::default()).unwrap();

        assert_eq!(result.float_column("concentrationCO2Air").unwrap(), vec![Some(405.0)]);
        assert_eq!(result.float_column("concentrationCH4Air").unwrap(), vec![Some(1.85)]);
        assert_close(result.float_column("CO2PercSat").unwrap()[0], 334.8428138501325);
        assert_close(result.float_column("satConcCH4").unwrap()[0], 3.166452576278388e-09);
        assert_eq!(result.float_column("CH4PercSat").unwrap(), vec![None]);
    }

    #[test]
    fn test_zero_saturation_is_non_finite() {
        let table = Table::from_columns(
            "zero",
            vec![
                Column::float("barometricPressure", vec![Some(0.0)]),
                Column::float("waterTemp", vec![Some(15.0)]),
                Column::float("dissolvedCO2", vec![Some(1e-5)]),
                Column::float("concentrationCO2Air", vec![Some(405.0)]),
                Column::float("dissolvedCH4", vec![Some(1e-8)]),
                Column::float("concentrationCH4Air", vec![Some(1.85)]),
                Column::float("dissolvedN2O", vec![Some(1e-8)]),
                Column::float("concentrationN2OAir", vec![Some(0.33)]),
            ],
        )
        .unwrap();

        let result = SaturationCalculator::new().calculate(table).unwrap();
        for gas in Gas::ALL {
            let percent = result.float_column(&gas.percent_saturation_column()).unwrap()[0];
            assert!(matches!(percent, Some(v) if v.is_infinite()));
        }
    }

    #[test]
    fn test_missing_water_temp_propagates_null() {
        let mut table = concentration_table();
        table.set_float_column("waterTemp", vec![None, Some(15.0)]).unwrap();

        let result = SaturationCalculator::new().calculate(table).unwrap();
        assert_eq!(result.float_column("satConcCO2").unwrap()[0], None);
        assert_eq!(result.float_column("CO2PercSat").unwrap()[0], None);
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let calculator = SaturationCalculator::new();
        let once = calculator.calculate(concentration_table()).unwrap();
        let twice = calculator.calculate(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_dissolved_column_is_fatal() {
        let err = SaturationCalculator::new()
            .calculate(formatted_table())
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::MissingColumn { ref column, .. } if column == "dissolvedCO2"
        ));
    }
}
