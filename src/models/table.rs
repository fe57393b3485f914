use crate::error::{ProcessingError, Result};
use crate::utils::constants::NULL_TOKENS;

/// Values of a single column. Every cell is nullable.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float64(values) => values.len(),
            ColumnData::Utf8(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Float64(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Utf8(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Float64(_) => "float64",
            ColumnData::Utf8(_) => "utf8",
        }
    }

    /// Float view of the column. Text cells are parsed; null tokens become null.
    pub fn to_float(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        match self {
            ColumnData::Float64(values) => Ok(values.clone()),
            ColumnData::Utf8(values) => values
                .iter()
                .map(|cell| match cell {
                    Some(text) => parse_float_cell(text).map_err(|_| {
                        ProcessingError::InvalidFormat(format!(
                            "Column '{}' holds non-numeric value '{}'",
                            column_name, text
                        ))
                    }),
                    None => Ok(None),
                })
                .collect(),
        }
    }

    /// Text view of the column. Floats use their shortest round-trip form.
    pub fn to_text(&self) -> Vec<Option<String>> {
        match self {
            ColumnData::Float64(values) => values
                .iter()
                .map(|v| v.map(|v| v.to_string()))
                .collect(),
            ColumnData::Utf8(values) => values.clone(),
        }
    }

    pub fn display_cell(&self, row: usize) -> String {
        match self {
            ColumnData::Float64(values) => values
                .get(row)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            ColumnData::Utf8(values) => values.get(row).cloned().flatten().unwrap_or_default(),
        }
    }

    fn slice(&self, len: usize) -> ColumnData {
        match self {
            ColumnData::Float64(values) => {
                ColumnData::Float64(values.iter().take(len).copied().collect())
            }
            ColumnData::Utf8(values) => ColumnData::Utf8(values.iter().take(len).cloned().collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float64(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Utf8(values))
    }
}

/// Named, ordered collection of equally long columns.
///
/// Stages of the pipeline only ever append or replace whole columns, so a
/// table can be passed by value from one stage to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.set_column(column.name, column.data)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column that the caller cannot proceed without.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| ProcessingError::missing_column(name, self.describe()))
    }

    pub fn float_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.require(name)?.data.to_float(name)
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(self.require(name)?.data.to_text())
    }

    /// Replace the column with this name, or append it if it is new.
    pub fn set_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();

        if self.columns.is_empty() {
            self.num_rows = data.len();
        } else if data.len() != self.num_rows {
            return Err(ProcessingError::InvalidFormat(format!(
                "Column '{}' has {} rows but {} has {}",
                name,
                data.len(),
                self.describe(),
                self.num_rows
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => self.columns.push(Column::new(name, data)),
        }

        Ok(())
    }

    pub fn set_float_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        self.set_column(name, ColumnData::Float64(values))
    }

    /// Convert a column to floating point in place.
    pub fn coerce_float(&mut self, name: &str) -> Result<()> {
        let values = self.float_column(name)?;
        self.set_float_column(name, values)
    }

    /// First `n` rows of every column.
    pub fn head(&self, n: usize) -> Table {
        let len = n.min(self.num_rows);
        Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.slice(len)))
                .collect(),
            num_rows: len,
        }
    }

    fn describe(&self) -> String {
        if self.name.is_empty() {
            "input table".to_string()
        } else {
            format!("table '{}'", self.name)
        }
    }
}

pub fn is_null_token(cell: &str) -> bool {
    let trimmed = cell.trim();
    NULL_TOKENS.iter().any(|token| *token == trimmed)
}

/// Parse a delimited-text cell. Null tokens yield `Ok(None)`.
pub fn parse_float_cell(cell: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    if is_null_token(cell) {
        Ok(None)
    } else {
        cell.trim().parse::<f64>().map(Some)
    }
}

/// Treats NaN the same as an absent value.
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::from_columns(
            "samples",
            vec![
                Column::text(
                    "waterSampleID",
                    vec![Some("W1".to_string()), Some("W2".to_string())],
                ),
                Column::text("waterTemp", vec![Some("12.5".to_string()), Some("NA".to_string())]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_require_missing_column() {
        let table = sample_table();
        let err = table.require("barometricPressure").unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::MissingColumn { ref column, .. } if column == "barometricPressure"
        ));
        assert!(err.to_string().contains("samples"));
    }

    #[test]
    fn test_coerce_float_parses_text() {
        let mut table = sample_table();
        table.coerce_float("waterTemp").unwrap();

        let column = table.column("waterTemp").unwrap();
        assert_eq!(column.data, ColumnData::Float64(vec![Some(12.5), None]));
    }

    #[test]
    fn test_coerce_float_rejects_text() {
        let mut table = sample_table();
        assert!(table.coerce_float("waterSampleID").is_err());
    }

    #[test]
    fn test_set_column_replaces_and_appends() {
        let mut table = sample_table();
        table
            .set_float_column("waterTemp", vec![Some(1.0), Some(2.0)])
            .unwrap();
        table
            .set_float_column("headspaceTemp", vec![Some(3.0), None])
            .unwrap();

        assert_eq!(
            table.column_names(),
            vec!["waterSampleID", "waterTemp", "headspaceTemp"]
        );
        assert!(table.set_float_column("bad", vec![Some(1.0)]).is_err());
    }

    #[test]
    fn test_head_and_text_view() {
        let table = Table::from_columns("t", vec![Column::float("x", vec![Some(1.5), None, Some(3.0)])])
            .unwrap();
        let head = table.head(2);

        assert_eq!(head.num_rows(), 2);
        assert_eq!(
            head.text_column("x").unwrap(),
            vec![Some("1.5".to_string()), None]
        );
    }

    #[test]
    fn test_present_filters_nan() {
        assert_eq!(present(Some(f64::NAN)), None);
        assert_eq!(present(Some(4.0)), Some(4.0));
        assert_eq!(present(None), None);
    }
}
