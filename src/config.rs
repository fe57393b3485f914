use crate::error::{ProcessingError, Result};
use crate::models::{ConcentrationColumns, SaturationColumns};
use crate::processors::VolumeDefaults;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment variables read into [`Settings`], e.g.
/// `SDG_OUTPUT__COMPRESSION=zstd` or `SDG_VOLUME_DEFAULTS__POLICY=disabled`.
pub const ENV_PREFIX: &str = "SDG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub concentration_columns: ConcentrationColumns,
    pub saturation_columns: SaturationColumns,
    pub volume_defaults: VolumeDefaults,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub compression: String,
    pub row_group_size: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, overridden by `SDG_*`
    /// environment variables. Anything not given keeps its default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let compressions = [
            COMPRESSION_SNAPPY,
            COMPRESSION_GZIP,
            COMPRESSION_LZ4,
            COMPRESSION_ZSTD,
            COMPRESSION_NONE,
        ];
        if !compressions.contains(&self.output.compression.to_lowercase().as_str()) {
            return Err(ProcessingError::Config(format!(
                "Unsupported compression '{}', expected one of {}",
                self.output.compression,
                compressions.join(", ")
            )));
        }
        if self.output.row_group_size == 0 {
            return Err(ProcessingError::Config(
                "output.row_group_size must be positive".to_string(),
            ));
        }
        for (name, volume) in [
            ("water_volume_ml", self.volume_defaults.water_volume_ml),
            ("gas_volume_ml", self.volume_defaults.gas_volume_ml),
        ] {
            if !(volume.is_finite() && volume > 0.0) {
                return Err(ProcessingError::Config(format!(
                    "volume_defaults.{} must be a positive volume, got {}",
                    name, volume
                )));
            }
        }
        Ok(())
    }
}
