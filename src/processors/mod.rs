pub mod concentration;
pub mod formatter;
pub mod pipeline;
pub mod quality_checker;
pub mod saturation;

pub use concentration::{calc_concentration, ConcentrationCalculator};
pub use formatter::{format, Formatter, KeyIndex, VolumeDefaultPolicy, VolumeDefaults, OUTPUT_COLUMNS};
pub use pipeline::SdgPipeline;
pub use quality_checker::{GasQuality, InputViolation, QualityChecker, QualityReport};
pub use saturation::{calc_saturation, SaturationCalculator};
