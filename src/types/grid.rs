use serde::{Deserialize, Serialize};

/// A single input cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum GridValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl GridValue {
    /// String form used for column names and row values. `Null` is empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for GridValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for GridValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for GridValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for GridValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// How the first row and the column names of a grid are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Use the first row as column names.
    pub promote_headers: bool,
    /// Fill empty header names and renumber duplicates instead of failing.
    pub adjust_column_names: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            promote_headers: false,
            adjust_column_names: true,
        }
    }
}

/// Rectangular input data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub data: Vec<Vec<GridValue>>,
    #[serde(default)]
    pub config: GridConfig,
}

impl Grid {
    #[must_use]
    pub fn new(data: Vec<Vec<GridValue>>) -> Self {
        Self {
            data,
            config: GridConfig::default(),
        }
    }

    /// Build a grid from string rows.
    #[must_use]
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|s| GridValue::Text(s.into())).collect())
                .collect(),
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }
}

/// Column names plus stringified rows, derived once from a [`Grid`].
///
/// Every range string written to the workbook is computed from this value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
