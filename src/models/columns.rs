use crate::models::Gas;
use serde::{Deserialize, Serialize};

/// Column names read by the concentration calculation.
///
/// Defaults are the names produced by the formatter, so a formatted table
/// needs no overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcentrationColumns {
    /// Volume of air equilibrated with the water (mL)
    pub vol_gas: String,
    /// Volume of water equilibrated with the air (mL)
    pub vol_h2o: String,
    /// Barometric pressure at equilibration (kPa)
    pub baro: String,
    /// Water body temperature when sampled (°C)
    pub water_temp: String,
    /// Water sample temperature during equilibration (°C)
    pub headspace_temp: String,
    pub eq_co2: String,
    pub source_co2: String,
    pub eq_ch4: String,
    pub source_ch4: String,
    pub eq_n2o: String,
    pub source_n2o: String,
}

impl Default for ConcentrationColumns {
    fn default() -> Self {
        Self {
            vol_gas: "gasVolume".to_string(),
            vol_h2o: "waterVolume".to_string(),
            baro: "barometricPressure".to_string(),
            water_temp: "waterTemp".to_string(),
            headspace_temp: "headspaceTemp".to_string(),
            eq_co2: Gas::CO2.equilibrated_column(),
            source_co2: Gas::CO2.air_column(),
            eq_ch4: Gas::CH4.equilibrated_column(),
            source_ch4: Gas::CH4.air_column(),
            eq_n2o: Gas::N2O.equilibrated_column(),
            source_n2o: Gas::N2O.air_column(),
        }
    }
}

impl ConcentrationColumns {
    pub fn equilibrated(&self, gas: Gas) -> &str {
        match gas {
            Gas::CO2 => &self.eq_co2,
            Gas::CH4 => &self.eq_ch4,
            Gas::N2O => &self.eq_n2o,
        }
    }

    pub fn source(&self, gas: Gas) -> &str {
        match gas {
            Gas::CO2 => &self.source_co2,
            Gas::CH4 => &self.source_ch4,
            Gas::N2O => &self.source_n2o,
        }
    }
}

/// Column names read by the percent saturation calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaturationColumns {
    /// Barometric pressure (kPa)
    pub baro: String,
    /// Water body temperature when sampled (°C)
    pub water_temp: String,
    /// Water sample temperature during equilibration (°C)
    pub headspace_temp: String,
    /// Dissolved concentrations (mol/L)
    pub conc_co2: String,
    pub source_co2: String,
    pub conc_ch4: String,
    pub source_ch4: String,
    pub conc_n2o: String,
    pub source_n2o: String,
}

impl Default for SaturationColumns {
    fn default() -> Self {
        Self {
            baro: "barometricPressure".to_string(),
            water_temp: "waterTemp".to_string(),
            headspace_temp: "headspaceTemp".to_string(),
            conc_co2: Gas::CO2.dissolved_column(),
            source_co2: Gas::CO2.air_column(),
            conc_ch4: Gas::CH4.dissolved_column(),
            source_ch4: Gas::CH4.air_column(),
            conc_n2o: Gas::N2O.dissolved_column(),
            source_n2o: Gas::N2O.air_column(),
        }
    }
}

impl SaturationColumns {
    pub fn dissolved(&self, gas: Gas) -> &str {
        match gas {
            Gas::CO2 => &self.conc_co2,
            Gas::CH4 => &self.conc_ch4,
            Gas::N2O => &self.conc_n2o,
        }
    }

    pub fn source(&self, gas: Gas) -> &str {
        match gas {
            Gas::CO2 => &self.source_co2,
            Gas::CH4 => &self.source_ch4,
            Gas::N2O => &self.source_n2o,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_concentration_columns() {
        let columns = ConcentrationColumns::default();
        assert_eq!(columns.vol_gas, "gasVolume");
        assert_eq!(columns.source(Gas::N2O), "concentrationN2OAir");
        assert_eq!(columns.equilibrated(Gas::CH4), "concentrationCH4Gas");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let columns: SaturationColumns =
            serde_json::from_str(r#"{"water_temp": "streamTemp"}"#).unwrap();
        assert_eq!(columns.water_temp, "streamTemp");
        assert_eq!(columns.dissolved(Gas::CO2), "dissolvedCO2");
        assert_eq!(columns.baro, "barometricPressure");
    }
}
