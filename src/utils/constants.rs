/// Stacked table file names
pub const EXTERNAL_LAB_DATA_FILE: &str = "sdg_externalLabData.csv";
pub const FIELD_DATA_PROC_FILE: &str = "sdg_fieldDataProc.csv";
pub const FIELD_SUPER_PARENT_FILE: &str = "sdg_fieldSuperParent.csv";

/// Directory written by the table-stacking step
pub const STACKED_FILES_DIR: &str = "stackedFiles";

/// Table names used in diagnostics
pub const EXTERNAL_LAB_DATA_TABLE: &str = "externalLabData";
pub const FIELD_DATA_PROC_TABLE: &str = "fieldDataProc";
pub const FIELD_SUPER_PARENT_TABLE: &str = "fieldSuperParent";

/// Syringe volume defaults (mL)
pub const DEFAULT_WATER_VOLUME_ML: f64 = 40.0;
pub const DEFAULT_GAS_VOLUME_ML: f64 = 20.0;

/// Universal gas constant (J K-1 mol-1)
pub const GAS_CONSTANT: f64 = 8.3144598;
/// Celsius to Kelvin offset
pub const KELVIN_OFFSET: f64 = 273.15;
/// Reference temperature of the Henry's law constants (K)
pub const HENRY_REFERENCE_TEMP: f64 = 298.15;
/// ppmv to mol/mol. The kPa to Pa and m^3 to L conversions cancel out.
pub const PRESSURE_CONVERSION: f64 = 0.000001;
pub const PERCENT: f64 = 100.0;

/// Cell values read as null
pub const NULL_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "NULL", "null"];

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
