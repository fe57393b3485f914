use crate::error::Result;
use crate::models::table::present;
use crate::models::{ColumnData, Gas, Table};
use crate::readers::{StackedReader, StackedTables};
use crate::utils::constants::{DEFAULT_GAS_VOLUME_ML, DEFAULT_WATER_VOLUME_ML};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns of the formatted table, in output order.
pub const OUTPUT_COLUMNS: [&str; 19] = [
    "waterSampleID",
    "referenceAirSampleID",
    "equilibratedAirSampleID",
    "collectDate",
    "processedDate",
    "stationID",
    "barometricPressure",
    "headspaceTemp",
    "waterTemp",
    "concentrationCO2Air",
    "concentrationCO2Gas",
    "concentrationCH4Air",
    "concentrationCH4Gas",
    "concentrationN2OAir",
    "concentrationN2OGas",
    "waterVolume",
    "gasVolume",
    "volH2OSource",
    "volGasSource",
];

const TEXT_COLUMNS: [&str; 6] = [
    "waterSampleID",
    "referenceAirSampleID",
    "equilibratedAirSampleID",
    "collectDate",
    "processedDate",
    "stationID",
];

/// Output columns filled from differently named field columns.
const RENAMED_COLUMNS: [(&str, &str); 3] = [
    ("headspaceTemp", "storageWaterTemp"),
    ("barometricPressure", "ptBarometricPressure"),
    ("stationID", "namedLocation"),
];

/// When a missing syringe volume is replaced by its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeDefaultPolicy {
    /// Each row with a missing volume gets the default and a source flag of 1.
    #[default]
    PerRow,
    /// Volumes are passed through untouched and every source flag is 0.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeDefaults {
    pub policy: VolumeDefaultPolicy,
    pub water_volume_ml: f64,
    pub gas_volume_ml: f64,
}

impl Default for VolumeDefaults {
    fn default() -> Self {
        Self {
            policy: VolumeDefaultPolicy::PerRow,
            water_volume_ml: DEFAULT_WATER_VOLUME_ML,
            gas_volume_ml: DEFAULT_GAS_VOLUME_ML,
        }
    }
}

impl VolumeDefaults {
    /// Returns the volumes to use and the per-row source flags.
    fn apply(&self, volumes: Vec<Option<f64>>, default: f64) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        match self.policy {
            VolumeDefaultPolicy::Disabled => {
                let flags = vec![Some(0.0); volumes.len()];
                (volumes, flags)
            }
            VolumeDefaultPolicy::PerRow => volumes
                .into_iter()
                .map(|volume| match present(volume) {
                    Some(v) => (Some(v), Some(0.0)),
                    None => (Some(default), Some(1.0)),
                })
                .unzip(),
        }
    }
}

/// Row lookup by an identifier column.
pub struct KeyIndex {
    rows: HashMap<String, Vec<usize>>,
}

impl KeyIndex {
    pub fn build(keys: &[Option<String>]) -> Self {
        let mut rows: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                rows.entry(key.clone()).or_default().push(row);
            }
        }
        Self { rows }
    }

    /// The row carrying `key`, if exactly one does.
    pub fn unique(&self, key: &str) -> Option<usize> {
        match self.rows.get(key).map(Vec::as_slice) {
            Some([row]) => Some(*row),
            _ => None,
        }
    }

    pub fn is_ambiguous(&self, key: &str) -> bool {
        self.rows.get(key).is_some_and(|rows| rows.len() > 1)
    }
}

/// Joins the stacked field, lab and super-parent tables into one row per
/// water sample.
pub struct Formatter {
    volume_defaults: VolumeDefaults,
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            volume_defaults: VolumeDefaults::default(),
        }
    }

    pub fn with_volume_defaults(mut self, volume_defaults: VolumeDefaults) -> Self {
        self.volume_defaults = volume_defaults;
        self
    }

    /// Read the stacked tables under `source` and format them.
    pub async fn format_directory(&self, source: &Path) -> Result<Table> {
        let tables = StackedReader::new().read_all(source).await?;
        self.format_tables(&tables)
    }

    /// Format tables that are already loaded.
    pub fn format_tables(&self, tables: &StackedTables) -> Result<Table> {
        let field = &tables.field_data_proc;
        field.require("waterSampleID")?;

        let mut columns = self.field_columns(field)?;
        let mut output = Table::new("sdg_formatted");
        for name in OUTPUT_COLUMNS {
            let data = columns
                .remove(name)
                .unwrap_or_else(|| empty_column(name, field.num_rows()));
            output.set_column(name, data)?;
        }

        self.join_lab_data(&mut output, &tables.external_lab_data)?;
        self.join_super_parent(&mut output, &tables.field_super_parent)?;

        for name in OUTPUT_COLUMNS {
            if !TEXT_COLUMNS.contains(&name) {
                output.coerce_float(name)?;
            }
        }

        info!("Formatted {} water samples", output.num_rows());
        Ok(output)
    }

    /// Output columns taken from the field table, keyed by output name.
    fn field_columns(&self, field: &Table) -> Result<HashMap<&'static str, ColumnData>> {
        let mut columns = HashMap::new();

        for name in OUTPUT_COLUMNS {
            if let Some(column) = field.column(name) {
                columns.insert(name, column.data.clone());
            }
        }

        for (output_name, field_name) in RENAMED_COLUMNS {
            columns.insert(output_name, field.require(field_name)?.data.clone());
        }

        let (water_volume, water_flags) = self.volume_defaults.apply(
            field.float_column("waterVolumeSyringe")?,
            self.volume_defaults.water_volume_ml,
        );
        let (gas_volume, gas_flags) = self.volume_defaults.apply(
            field.float_column("gasVolumeSyringe")?,
            self.volume_defaults.gas_volume_ml,
        );

        let defaulted = water_flags.iter().filter(|f| **f == Some(1.0)).count()
            + gas_flags.iter().filter(|f| **f == Some(1.0)).count();
        if defaulted > 0 {
            debug!("Substituted {} default syringe volumes", defaulted);
        }

        columns.insert("waterVolume", ColumnData::Float64(water_volume));
        columns.insert("gasVolume", ColumnData::Float64(gas_volume));
        columns.insert("volH2OSource", ColumnData::Float64(water_flags));
        columns.insert("volGasSource", ColumnData::Float64(gas_flags));

        Ok(columns)
    }

    /// Fill the air and equilibrated gas concentrations from the lab table.
    /// Unmatched or ambiguous sample IDs leave the cell null.
    fn join_lab_data(&self, output: &mut Table, lab: &Table) -> Result<()> {
        let index = KeyIndex::build(&lab.text_column("sampleID")?);
        let reference_ids = output.text_column("referenceAirSampleID")?;
        let equilibrated_ids = output.text_column("equilibratedAirSampleID")?;

        let ambiguous = reference_ids
            .iter()
            .chain(equilibrated_ids.iter())
            .flatten()
            .filter(|id| index.is_ambiguous(id))
            .count();
        if ambiguous > 0 {
            warn!(
                "{} air sample IDs match more than one {} record; left null",
                ambiguous,
                lab.name()
            );
        }

        for gas in Gas::ALL {
            let lab_column = gas.lab_column();
            if !lab.has_column(&lab_column) {
                warn!("{} has no {} column; {} left null", lab.name(), lab_column, gas);
                continue;
            }
            let values = lab.float_column(&lab_column)?;

            let air = lookup_values(&index, &reference_ids, &values);
            let equilibrated = lookup_values(&index, &equilibrated_ids, &values);

            debug!(
                "{}: matched {} reference air and {} equilibrated samples",
                gas,
                air.iter().filter(|v| v.is_some()).count(),
                equilibrated.iter().filter(|v| v.is_some()).count()
            );

            output.set_float_column(gas.air_column(), air)?;
            output.set_float_column(gas.equilibrated_column(), equilibrated)?;
        }

        Ok(())
    }

    /// Take water temperature from the super-parent record of each sample,
    /// and use it for the headspace temperature where none was recorded.
    fn join_super_parent(&self, output: &mut Table, parent: &Table) -> Result<()> {
        let index = KeyIndex::build(&parent.text_column("parentSampleID")?);
        if !parent.has_column("waterTemp") {
            warn!("{} has no waterTemp column", parent.name());
            return Ok(());
        }
        let parent_temps = parent.float_column("waterTemp")?;

        let sample_ids = output.text_column("waterSampleID")?;
        let mut water_temp = output.float_column("waterTemp")?;
        let mut headspace_temp = output.float_column("headspaceTemp")?;

        for (row, sample_id) in sample_ids.iter().enumerate() {
            let Some(parent_row) = sample_id.as_deref().and_then(|id| index.unique(id)) else {
                continue;
            };
            let temp = parent_temps[parent_row];

            if temp.is_some() {
                water_temp[row] = temp;
            }
            if present(headspace_temp[row]).is_none() {
                headspace_temp[row] = temp;
            }
        }

        output.set_float_column("waterTemp", water_temp)?;
        output.set_float_column("headspaceTemp", headspace_temp)?;
        Ok(())
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format the stacked tables found under `source_directory`.
pub fn format(source_directory: impl AsRef<Path>) -> Result<Table> {
    let tables = StackedReader::new().read_all_blocking(source_directory.as_ref())?;
    Formatter::new().format_tables(&tables)
}

fn lookup_values(index: &KeyIndex, keys: &[Option<String>], values: &[Option<f64>]) -> Vec<Option<f64>> {
    keys.iter()
        .map(|key| {
            key.as_deref()
                .and_then(|k| index.unique(k))
                .and_then(|row| values[row])
        })
        .collect()
}

fn empty_column(name: &str, rows: usize) -> ColumnData {
    if TEXT_COLUMNS.contains(&name) {
        ColumnData::Utf8(vec![None; rows])
    } else {
        ColumnData::Float64(vec![None; rows])
    }
}

/// Build a table from literal text cells. Used by tests across the crate.
#[cfg(test)]
pub(crate) fn text_table(name: &str, headers: &[&str], rows: &[&[&str]]) -> Table {
    let columns = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let values = rows
                .iter()
                .map(|row| {
                    let cell = row[index];
                    if crate::models::table::is_null_token(cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            crate::models::Column::text(*header, values)
        })
        .collect();
    Table::from_columns(name, columns).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIELD_HEADERS: [&str; 11] = [
        "waterSampleID",
        "referenceAirSampleID",
        "equilibratedAirSampleID",
        "collectDate",
        "processedDate",
        "namedLocation",
        "storageWaterTemp",
        "ptBarometricPressure",
        "waterVolumeSyringe",
        "gasVolumeSyringe",
        "sampleCode",
    ];

    fn stacked() -> StackedTables {
        let field = text_table(
            "fieldDataProc",
            &FIELD_HEADERS,
            &[
                &["W1", "R1", "E1", "2019-05-14", "2019-05-15", "ARIK.AOS.S1", "18.5", "85.1", "40", "20", "x"],
                &["W2", "R2", "E2", "2019-05-14", "2019-05-15", "ARIK.AOS.S2", "NA", "85.3", "", "", "y"],
                &["W3", "RX", "E3", "2019-05-14", "2019-05-15", "ARIK.AOS.S2", "17.0", "85.2", "60", "30", "z"],
            ],
        );
        let lab = text_table(
            "externalLabData",
            &["sampleID", "concentrationCO2", "concentrationCH4", "concentrationN2O"],
            &[
                &["R1", "410", "1.9", "0.33"],
                &["E1", "1200", "5.0", "0.5"],
                &["R2", "405", "1.8", "0.32"],
                &["E2", "900", "NA", "0.4"],
                &["E3", "800", "3.0", "0.4"],
                &["E3", "810", "3.1", "0.41"],
            ],
        );
        let parent = text_table(
            "fieldSuperParent",
            &["parentSampleID", "waterTemp"],
            &[&["W1", "14.2"], &["W2", "13.1"]],
        );

        StackedTables {
            external_lab_data: lab,
            field_data_proc: field,
            field_super_parent: parent,
        }
    }

    #[test]
    fn test_output_columns_in_order() {
        let table = Formatter::new().format_tables(&stacked()).unwrap();
        assert_eq!(table.column_names(), OUTPUT_COLUMNS.to_vec());
        assert_eq!(table.num_rows(), 3);
    }

    #[test]
    fn test_renamed_columns() {
        let table = Formatter::new().format_tables(&stacked()).unwrap();

        assert_eq!(
            table.float_column("barometricPressure").unwrap(),
            vec![Some(85.1), Some(85.3), Some(85.2)]
        );
        assert_eq!(
            table.text_column("stationID").unwrap()[0].as_deref(),
            Some("ARIK.AOS.S1")
        );
        assert_eq!(
            table.text_column("collectDate").unwrap()[1].as_deref(),
            Some("2019-05-14")
        );
        assert!(!table.has_column("sampleCode"));
    }

    #[test]
    fn test_lab_join_per_gas() {
        let table = Formatter::new().format_tables(&stacked()).unwrap();

        assert_eq!(
            table.float_column("concentrationCO2Air").unwrap(),
            vec![Some(410.0), Some(405.0), None]
        );
        assert_eq!(
            table.float_column("concentrationCO2Gas").unwrap(),
            vec![Some(1200.0), Some(900.0), None]
        );
        // Null lab value for one gas does not affect the others.
        assert_eq!(
            table.float_column("concentrationCH4Gas").unwrap(),
            vec![Some(5.0), None, None]
        );
        assert_eq!(
            table.float_column("concentrationN2OGas").unwrap(),
            vec![Some(0.5), Some(0.4), None]
        );
    }

    #[test]
    fn test_super_parent_backfill() {
        let table = Formatter::new().format_tables(&stacked()).unwrap();

        assert_eq!(
            table.float_column("waterTemp").unwrap(),
            vec![Some(14.2), Some(13.1), None]
        );
        // Missing storage temperature falls back to the stream temperature.
        assert_eq!(
            table.float_column("headspaceTemp").unwrap(),
            vec![Some(18.5), Some(13.1), Some(17.0)]
        );
    }

    #[test]
    fn test_per_row_volume_defaults() {
        let table = Formatter::new().format_tables(&stacked()).unwrap();

        assert_eq!(
            table.float_column("waterVolume").unwrap(),
            vec![Some(40.0), Some(40.0), Some(60.0)]
        );
        assert_eq!(
            table.float_column("gasVolume").unwrap(),
            vec![Some(20.0), Some(20.0), Some(30.0)]
        );
        assert_eq!(
            table.float_column("volH2OSource").unwrap(),
            vec![Some(0.0), Some(1.0), Some(0.0)]
        );
        assert_eq!(
            table.float_column("volGasSource").unwrap(),
            vec![Some(0.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn test_disabled_volume_defaults_pass_through() {
        let formatter = Formatter::new().with_volume_defaults(VolumeDefaults {
            policy: VolumeDefaultPolicy::Disabled,
            ..VolumeDefaults::default()
        });
        let table = formatter.format_tables(&stacked()).unwrap();

        assert_eq!(
            table.float_column("waterVolume").unwrap(),
            vec![Some(40.0), None, Some(60.0)]
        );
        assert_eq!(
            table.float_column("volH2OSource").unwrap(),
            vec![Some(0.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_missing_field_column_is_fatal() {
        let mut tables = stacked();
        tables.field_data_proc = text_table(
            "fieldDataProc",
            &["waterSampleID", "namedLocation"],
            &[&["W1", "ARIK.AOS.S1"]],
        );

        let err = Formatter::new().format_tables(&tables).unwrap_err();
        assert!(err.to_string().contains("storageWaterTemp"));
    }

    #[test]
    fn test_lab_table_without_gas_column() {
        let mut tables = stacked();
        tables.external_lab_data = text_table(
            "externalLabData",
            &["sampleID", "concentrationCO2"],
            &[&["R1", "410"]],
        );

        let table = Formatter::new().format_tables(&tables).unwrap();
        assert_eq!(
            table.float_column("concentrationCO2Air").unwrap(),
            vec![Some(410.0), None, None]
        );
        assert_eq!(
            table.float_column("concentrationN2OAir").unwrap(),
            vec![None, None, None]
        );
    }

    #[test]
    fn test_key_index() {
        let keys = vec![
            Some("A".to_string()),
            Some("B".to_string()),
            Some("B".to_string()),
            None,
        ];
        let index = KeyIndex::build(&keys);

        assert_eq!(index.unique("A"), Some(0));
        assert_eq!(index.unique("B"), None);
        assert!(index.is_ambiguous("B"));
        assert_eq!(index.unique("C"), None);
    }
}
