use serde::{Deserialize, Serialize};

/// A single table cell as sent by the queue API: either a label or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Number(f64),
    Text(String),
}

impl From<f64> for TableCell {
    fn from(value: f64) -> Self {
        TableCell::Number(value)
    }
}

impl From<&str> for TableCell {
    fn from(value: &str) -> Self {
        TableCell::Text(value.to_string())
    }
}

/// Tabular payload as received; either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Vec<TableCell>>>,
}

/// Display-ready table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub categories: Vec<String>,
    pub values: Vec<Vec<TableCell>>,
}

impl TableData {
    /// Rows whose width differs from the header.
    pub fn ragged_rows(&self) -> usize {
        self.values
            .iter()
            .filter(|row| row.len() != self.categories.len())
            .count()
    }
}
