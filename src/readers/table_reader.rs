use crate::error::{ProcessingError, Result};
use crate::models::table::{parse_float_cell, Column, ColumnData, Table};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads delimited text and Parquet files into a [`Table`].
///
/// Column types are inferred: a column whose non-null cells all parse as
/// numbers becomes `Float64`, anything else stays text.
pub struct TableReader {
    delimiter: u8,
    text_columns: Vec<String>,
}

impl TableReader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            text_columns: Vec::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Keep these columns as text even when every value looks numeric.
    pub fn with_text_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.text_columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Read a table, choosing the format from the file extension.
    pub fn read_table(&self, path: &Path) -> Result<Table> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => self.read_parquet(path),
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => {
                TableReader {
                    delimiter: b'\t',
                    text_columns: self.text_columns.clone(),
                }
                .read_delimited(path)
            }
            _ => self.read_delimited(path),
        }
    }

    /// Read a delimited text file with a header row.
    pub fn read_delimited(&self, path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path)?;
        let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
        if had_errors {
            warn!(
                "{} contains invalid UTF-8; offending bytes were replaced",
                path.display()
            );
        }

        let table = self.parse_delimited(&text, table_name(path))?;
        debug!(
            "Read {} rows x {} columns from {}",
            table.num_rows(),
            table.num_columns(),
            path.display()
        );
        Ok(table)
    }

    /// Parse delimited text already held in memory.
    pub fn parse_delimited(&self, text: &str, name: String) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (index, column) in cells.iter_mut().enumerate() {
                let cell = record.get(index).unwrap_or("");
                column.push(if crate::models::table::is_null_token(cell) {
                    None
                } else {
                    Some(cell.trim().to_string())
                });
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(header, values)| {
                let data = if self.text_columns.contains(&header) {
                    ColumnData::Utf8(values)
                } else {
                    infer_column(values)
                };
                Column::new(header, data)
            })
            .collect();

        Table::from_columns(name, columns)
    }

    /// Read a Parquet file. Numeric columns become `Float64`, all others text.
    pub fn read_parquet(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let fields: Vec<(String, bool)> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| {
                let numeric = f.data_type().is_numeric() || *f.data_type() == DataType::Boolean;
                let numeric = numeric && !self.text_columns.contains(f.name());
                (f.name().clone(), numeric)
            })
            .collect();
        let reader = builder.build()?;

        let mut data: Vec<ColumnData> = fields
            .iter()
            .map(|(_, numeric)| {
                if *numeric {
                    ColumnData::Float64(Vec::new())
                } else {
                    ColumnData::Utf8(Vec::new())
                }
            })
            .collect();

        for batch in reader {
            let batch = batch?;
            for (index, column) in data.iter_mut().enumerate() {
                let array = batch.column(index);
                match column {
                    ColumnData::Float64(values) => {
                        let converted = cast(array, &DataType::Float64)?;
                        let converted = converted
                            .as_any()
                            .downcast_ref::<Float64Array>()
                            .ok_or_else(|| {
                                ProcessingError::InvalidFormat(format!(
                                    "Column '{}' could not be read as float",
                                    fields[index].0
                                ))
                            })?;
                        values.extend(converted.iter());
                    }
                    ColumnData::Utf8(values) => {
                        let converted = cast(array, &DataType::Utf8)?;
                        let converted = converted
                            .as_any()
                            .downcast_ref::<StringArray>()
                            .ok_or_else(|| {
                                ProcessingError::InvalidFormat(format!(
                                    "Column '{}' could not be read as text",
                                    fields[index].0
                                ))
                            })?;
                        values.extend(converted.iter().map(|v| v.map(str::to_string)));
                    }
                }
            }
        }

        let columns = fields
            .into_iter()
            .zip(data)
            .map(|((name, _), data)| Column::new(name, data))
            .collect();

        Table::from_columns(table_name(path), columns)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn infer_column(values: Vec<Option<String>>) -> ColumnData {
    let parsed: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|cell| match cell {
            Some(text) => parse_float_cell(text).ok(),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(floats) => ColumnData::Float64(floats),
        None => ColumnData::Utf8(values),
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// A table handed to a calculator: already in memory, or a file to load.
#[derive(Debug, Clone)]
pub enum TableSource {
    InMemory(Table),
    File(PathBuf),
}

impl TableSource {
    pub fn resolve(self) -> Result<Table> {
        match self {
            TableSource::InMemory(table) => Ok(table),
            TableSource::File(path) => TableReader::new().read_table(&path),
        }
    }
}

impl From<Table> for TableSource {
    fn from(table: Table) -> Self {
        TableSource::InMemory(table)
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        TableSource::File(path)
    }
}

impl From<&Path> for TableSource {
    fn from(path: &Path) -> Self {
        TableSource::File(path.to_path_buf())
    }
}

impl From<&str> for TableSource {
    fn from(path: &str) -> Self {
        TableSource::File(PathBuf::from(path))
    }
}
