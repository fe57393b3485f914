use serde::{Deserialize, Serialize};
use validator::Validate;

/// Physical readings of one water sample, checked for plausibility.
///
/// Absent readings are skipped by the range rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PhysicalInputs {
    pub water_sample_id: Option<String>,

    #[validate(range(min = 50.0, max = 110.0))]
    pub barometric_pressure: Option<f64>,

    #[validate(range(min = -5.0, max = 50.0))]
    pub water_temp: Option<f64>,

    #[validate(range(min = -5.0, max = 50.0))]
    pub headspace_temp: Option<f64>,

    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub water_volume: Option<f64>,

    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub gas_volume: Option<f64>,
}

impl PhysicalInputs {
    pub fn has_all_readings(&self) -> bool {
        self.barometric_pressure.is_some()
            && self.headspace_temp.is_some()
            && self.water_volume.is_some()
            && self.gas_volume.is_some()
    }
}
