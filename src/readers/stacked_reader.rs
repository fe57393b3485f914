use crate::error::{ProcessingError, Result};
use crate::models::Table;
use crate::readers::TableReader;
use crate::utils::constants::{
    EXTERNAL_LAB_DATA_FILE, EXTERNAL_LAB_DATA_TABLE, FIELD_DATA_PROC_FILE, FIELD_DATA_PROC_TABLE,
    FIELD_SUPER_PARENT_FILE, FIELD_SUPER_PARENT_TABLE, STACKED_FILES_DIR,
};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::info;

/// Identifier columns that must never be inferred as numbers.
const KEY_COLUMNS: [&str; 5] = [
    "sampleID",
    "parentSampleID",
    "waterSampleID",
    "referenceAirSampleID",
    "equilibratedAirSampleID",
];

/// The three stacked tables the formatter joins.
#[derive(Debug, Clone)]
pub struct StackedTables {
    pub external_lab_data: Table,
    pub field_data_proc: Table,
    pub field_super_parent: Table,
}

/// Loads the stacked dissolved-gas tables from a download directory.
pub struct StackedReader;

impl StackedReader {
    pub fn new() -> Self {
        Self
    }

    /// Directory holding the three stacked files.
    ///
    /// A path ending in `.zip` refers to the directory the archive was
    /// unpacked into. Files are looked up in its `stackedFiles/`
    /// subdirectory first, then in the directory itself.
    pub fn locate(&self, source: &Path) -> Result<PathBuf> {
        let base = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zip") => source.with_extension(""),
            _ => source.to_path_buf(),
        };

        let candidates = [base.join(STACKED_FILES_DIR), base.clone()];
        for dir in &candidates {
            if Self::has_all_tables(dir) {
                return Ok(dir.clone());
            }
        }

        Err(ProcessingError::MissingData(format!(
            "Stacked tables {}, {} and {} not found in {} or {}",
            EXTERNAL_LAB_DATA_FILE,
            FIELD_DATA_PROC_FILE,
            FIELD_SUPER_PARENT_FILE,
            candidates[0].display(),
            candidates[1].display()
        )))
    }

    fn has_all_tables(dir: &Path) -> bool {
        [
            EXTERNAL_LAB_DATA_FILE,
            FIELD_DATA_PROC_FILE,
            FIELD_SUPER_PARENT_FILE,
        ]
        .iter()
        .all(|file| dir.join(file).is_file())
    }

    /// Read the three tables concurrently.
    pub async fn read_all(&self, source: &Path) -> Result<StackedTables> {
        let dir = self.locate(source)?;
        info!("Reading stacked tables from {}", dir.display());

        let lab_handle = Self::spawn_read(dir.join(EXTERNAL_LAB_DATA_FILE), EXTERNAL_LAB_DATA_TABLE);
        let field_handle = Self::spawn_read(dir.join(FIELD_DATA_PROC_FILE), FIELD_DATA_PROC_TABLE);
        let parent_handle =
            Self::spawn_read(dir.join(FIELD_SUPER_PARENT_FILE), FIELD_SUPER_PARENT_TABLE);

        let (lab, field, parent) = tokio::try_join!(lab_handle, field_handle, parent_handle)?;

        let tables = StackedTables {
            external_lab_data: lab?,
            field_data_proc: field?,
            field_super_parent: parent?,
        };

        info!(
            "Loaded {} field records, {} lab records, {} super-parent records",
            tables.field_data_proc.num_rows(),
            tables.external_lab_data.num_rows(),
            tables.field_super_parent.num_rows()
        );

        Ok(tables)
    }

    /// Read the three tables on the calling thread.
    pub fn read_all_blocking(&self, source: &Path) -> Result<StackedTables> {
        let dir = self.locate(source)?;
        Ok(StackedTables {
            external_lab_data: Self::read_one(&dir.join(EXTERNAL_LAB_DATA_FILE), EXTERNAL_LAB_DATA_TABLE)?,
            field_data_proc: Self::read_one(&dir.join(FIELD_DATA_PROC_FILE), FIELD_DATA_PROC_TABLE)?,
            field_super_parent: Self::read_one(&dir.join(FIELD_SUPER_PARENT_FILE), FIELD_SUPER_PARENT_TABLE)?,
        })
    }

    fn spawn_read(path: PathBuf, name: &'static str) -> JoinHandle<Result<Table>> {
        tokio::task::spawn_blocking(move || Self::read_one(&path, name))
    }

    fn read_one(path: &Path, name: &str) -> Result<Table> {
        let table = TableReader::new()
            .with_text_columns(&KEY_COLUMNS)
            .read_delimited(path)?;
        Ok(table.with_name(name))
    }
}

impl Default for StackedReader {
    fn default() -> Self {
        Self::new()
    }
}
