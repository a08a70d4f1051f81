use serde::{Deserialize, Serialize};

use crate::naming::DEFAULT_QUERY_NAME;

/// A Power Query to embed in a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInfo {
    /// Body of the query (the `let … in …` expression); treated as opaque text.
    pub query_mashup: String,
    /// Query name; [`DEFAULT_QUERY_NAME`] when absent.
    #[serde(default)]
    pub query_name: Option<String>,
    /// Refresh the query when the workbook is opened.
    #[serde(default)]
    pub refresh_on_open: bool,
}

impl QueryInfo {
    #[must_use]
    pub fn new(query_mashup: impl Into<String>) -> Self {
        Self {
            query_mashup: query_mashup.into(),
            query_name: None,
            refresh_on_open: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_refresh_on_open(mut self, refresh: bool) -> Self {
        self.refresh_on_open = refresh;
        self
    }

    /// The effective query name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.query_name.as_deref().unwrap_or(DEFAULT_QUERY_NAME)
    }
}

/// The identifiers a connection must agree on across connections.xml and
/// the query table or pivot cache bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionBinding {
    pub connection_id: String,
    pub query_name: String,
    pub refresh_on_load: bool,
}
