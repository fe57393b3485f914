use crate::error::Result;
use crate::models::Table;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Writes a table as delimited text with a header row.
///
/// Nulls are written as empty cells. Non-finite values keep their textual
/// form (`inf`, `-inf`, `NaN`).
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_table(&self, table: &Table, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(table, file)?;
        debug!("Wrote {} rows to {}", table.num_rows(), path.display());
        Ok(())
    }

    pub fn write_to<W: std::io::Write>(&self, table: &Table, sink: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        writer.write_record(table.column_names())?;
        for row in 0..table.num_rows() {
            writer.write_record(table.columns().iter().map(|c| c.data.display_cell(row)))?;
        }
        writer.flush()?;

        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
