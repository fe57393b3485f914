pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use parquet_writer::{table_to_batch, ParquetFileInfo, ParquetWriter};

use crate::error::Result;
use crate::models::Table;
use std::path::Path;

/// Write `table` as Parquet or delimited text, chosen by the extension of
/// `path`. Parent directories are created as needed.
pub fn write_table(table: &Table, path: &Path, parquet: &ParquetWriter) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => parquet.write_table(table, path),
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => {
            CsvWriter::new().with_delimiter(b'\t').write_table(table, path)
        }
        _ => CsvWriter::new().write_table(table, path),
    }
}
