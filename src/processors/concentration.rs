use crate::error::Result;
use crate::models::{ConcentrationColumns, Gas, HeadspaceInputs, Table};
use crate::readers::TableSource;
use rayon::prelude::*;
use tracing::debug;

/// Appends `dissolvedCO2`, `dissolvedCH4` and `dissolvedN2O` (mol/L).
///
/// Missing reference air concentrations are replaced by the global
/// background value of each gas and written back to the table. Any other
/// missing input leaves the dissolved concentration of that row null.
pub struct ConcentrationCalculator {
    columns: ConcentrationColumns,
}

impl ConcentrationCalculator {
    pub fn new() -> Self {
        Self {
            columns: ConcentrationColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: ConcentrationColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn columns(&self) -> &ConcentrationColumns {
        &self.columns
    }

    pub fn calculate(&self, source: impl Into<TableSource>) -> Result<Table> {
        let mut table = source.into().resolve()?;
        let columns = &self.columns;

        let baro = table.float_column(&columns.baro)?;
        let vol_gas = table.float_column(&columns.vol_gas)?;
        let vol_h2o = table.float_column(&columns.vol_h2o)?;
        let headspace_temp = table.float_column(&columns.headspace_temp)?;

        let mut results = Vec::with_capacity(Gas::ALL.len());
        for gas in Gas::ALL {
            let equilibrated = table.float_column(columns.equilibrated(gas))?;
            let source_air = gas.fill_missing_source(table.float_column(columns.source(gas))?);

            let dissolved: Vec<Option<f64>> = (0..table.num_rows())
                .into_par_iter()
                .map(|row| {
                    let inputs = HeadspaceInputs {
                        barometric_pressure_kpa: baro[row]?,
                        gas_volume_ml: vol_gas[row]?,
                        water_volume_ml: vol_h2o[row]?,
                        headspace_temp_c: headspace_temp[row]?,
                        equilibrated_ppmv: equilibrated[row]?,
                        source_ppmv: source_air[row]?,
                    };
                    Some(gas.dissolved_concentration(&inputs))
                })
                .collect();

            debug!(
                "{}: {} of {} rows have a dissolved concentration",
                gas,
                dissolved.iter().filter(|v| v.is_some()).count(),
                dissolved.len()
            );
            results.push((gas, source_air, dissolved));
        }

        for (gas, source_air, dissolved) in results {
            table.set_float_column(columns.source(gas), source_air)?;
            table.set_float_column(gas.dissolved_column(), dissolved)?;
        }
        table.set_float_column(&columns.vol_gas, vol_gas)?;
        table.set_float_column(&columns.vol_h2o, vol_h2o)?;

        Ok(table)
    }
}

impl Default for ConcentrationCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Append dissolved gas concentrations to `source`.
pub fn calc_concentration(
    source: impl Into<TableSource>,
    columns: &ConcentrationColumns,
) -> Result<Table> {
    ConcentrationCalculator::new()
        .with_columns(columns.clone())
        .calculate(source)
}
