//! Dissolved gas species and the closed-form equations applied to them.
//!
//! Henry's law constants and their temperature dependence follow
//! Sander (2015), DOI: 10.5194/acp-15-4399-2015.

use crate::utils::constants::{
    GAS_CONSTANT, HENRY_REFERENCE_TEMP, KELVIN_OFFSET, PERCENT, PRESSURE_CONVERSION,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gas {
    CO2,
    CH4,
    N2O,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::CO2, Gas::CH4, Gas::N2O];

    pub fn label(&self) -> &'static str {
        match self {
            Gas::CO2 => "CO2",
            Gas::CH4 => "CH4",
            Gas::N2O => "N2O",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Gas::CO2 => "Carbon dioxide",
            Gas::CH4 => "Methane",
            Gas::N2O => "Nitrous oxide",
        }
    }

    /// Henry's law constant at 298.15 K (mol m-3 Pa-1)
    pub fn henry_constant(&self) -> f64 {
        match self {
            Gas::CO2 => 0.00033,  // range: 0.00031 - 0.00045
            Gas::CH4 => 0.000014, // range: 0.0000096 - 0.000092
            Gas::N2O => 0.00024,  // range: 0.00018 - 0.00025
        }
    }

    /// Temperature dependence d(ln kH)/d(1/T) (K)
    pub fn temperature_dependence(&self) -> f64 {
        match self {
            Gas::CO2 => 2400.0, // range: 2300 - 2600
            Gas::CH4 => 1900.0, // range: 1400 - 2400
            Gas::N2O => 2700.0, // range: 2600 - 3600
        }
    }

    /// Global mean atmospheric mixing ratio (ppmv), used when no reference
    /// air sample was analysed.
    ///
    /// Sources: NOAA ESRL global trends for CO2 and CH4, NOAA HATS combined N2O.
    pub fn background_mixing_ratio(&self) -> f64 {
        match self {
            Gas::CO2 => 405.0,
            Gas::CH4 => 1.85,
            Gas::N2O => 0.330,
        }
    }

    /// Replace missing reference air values with the background mixing ratio.
    pub fn fill_missing_source(&self, values: Vec<Option<f64>>) -> Vec<Option<f64>> {
        let background = self.background_mixing_ratio();
        values
            .into_iter()
            .map(|v| Some(v.filter(|v| !v.is_nan()).unwrap_or(background)))
            .collect()
    }

    /// Gas column of the external lab table, e.g. `concentrationCO2`.
    pub fn lab_column(&self) -> String {
        format!("concentration{}", self.label())
    }

    /// Reference (source) air concentration, e.g. `concentrationCO2Air`.
    pub fn air_column(&self) -> String {
        format!("concentration{}Air", self.label())
    }

    /// Equilibrated headspace concentration, e.g. `concentrationCO2Gas`.
    pub fn equilibrated_column(&self) -> String {
        format!("concentration{}Gas", self.label())
    }

    pub fn dissolved_column(&self) -> String {
        format!("dissolved{}", self.label())
    }

    pub fn saturation_column(&self) -> String {
        format!("satConc{}", self.label())
    }

    pub fn percent_saturation_column(&self) -> String {
        format!("{}PercSat", self.label())
    }

    /// Temperature-corrected Henry's law constant at `temp_c` (°C).
    pub fn henry_solubility(&self, temp_c: f64) -> f64 {
        let temp_k = temp_c + KELVIN_OFFSET;
        self.henry_constant()
            * (self.temperature_dependence() * (1.0 / temp_k - 1.0 / HENRY_REFERENCE_TEMP)).exp()
    }

    /// Dissolved concentration (mol/L) in the original water sample.
    ///
    /// Mass balance over the headspace: gas gained by the headspace air
    /// (ideal gas law) plus gas left in the equilibrated water (Henry's law).
    pub fn dissolved_concentration(&self, inputs: &HeadspaceInputs) -> f64 {
        let temp_k = inputs.headspace_temp_c + KELVIN_OFFSET;
        let headspace_gain = inputs.gas_volume_ml
            * (inputs.equilibrated_ppmv - inputs.source_ppmv)
            / (GAS_CONSTANT * temp_k * inputs.water_volume_ml);
        let retained =
            self.henry_solubility(inputs.headspace_temp_c) * inputs.equilibrated_ppmv;

        inputs.barometric_pressure_kpa * PRESSURE_CONVERSION * (headspace_gain + retained)
    }

    /// Concentration (mol/L) of water in equilibrium with air at `source_ppmv`.
    pub fn saturation_concentration(
        &self,
        water_temp_c: f64,
        source_ppmv: f64,
        barometric_pressure_kpa: f64,
    ) -> f64 {
        self.henry_solubility(water_temp_c)
            * source_ppmv
            * barometric_pressure_kpa
            * PRESSURE_CONVERSION
    }
}

impl std::fmt::Display for Gas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Physical readings of one headspace equilibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadspaceInputs {
    pub barometric_pressure_kpa: f64,
    pub gas_volume_ml: f64,
    pub water_volume_ml: f64,
    pub headspace_temp_c: f64,
    pub equilibrated_ppmv: f64,
    pub source_ppmv: f64,
}

/// Not clamped: values above and below 100 are both physical. A zero
/// saturation concentration yields a non-finite result.
pub fn percent_saturation(dissolved: f64, saturation: f64) -> f64 {
    dissolved / saturation * PERCENT
}
