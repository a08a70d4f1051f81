//! Structured error types for xlconnect.
//!
//! Every fallible operation returns [`XlconnectError`]. Callers that only care
//! about the broad category use [`XlconnectError::kind`].

/// Broad error categories. No category is retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Binary framing of the mashup container is inconsistent.
    MalformedContainer,
    /// A part, package entry or element the template must provide is absent.
    PartNotFound,
    /// Caller-supplied grid, query or configuration breaks a rule.
    Validation,
    /// No query table or pivot cache is bound to the resolved connection id.
    CrossReferenceNotFound,
    /// Lower-level XML, ZIP, I/O or serialization failure.
    Io,
}

/// Parts and package entries the generator depends on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Part {
    #[error("Connections were not found in template")]
    Connections,
    #[error("SharedStrings were not found in template")]
    SharedStrings,
    #[error("Sheets were not found in template")]
    Sheet,
    #[error("Table was not found in template")]
    Table,
    #[error("Query table was not found in template")]
    QueryTable,
    #[error("Workbook was not found in template")]
    Workbook,
    #[error("DocProps core.xml was not found in template")]
    DocProps,
    /// `Formulas/Section1.m` inside the mashup package.
    #[error("Formula section wasn't found in template")]
    FormulaSection,
    /// The `customXml` part carrying the `DataMashup` document.
    #[error("DataMashup XML was not found in template")]
    Mashup,
    /// A required element inside an otherwise present part.
    #[error("Element <{element}> was not found in {part}")]
    Element { part: String, element: String },
}

/// Rule violations in caller input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Array isn't MxN")]
    ArrayIsntMxN,

    #[error("Cannot promote headers for an empty grid")]
    PromoteHeadersUnsupportedForEmptyGrid,

    #[error("Headers cannot be promoted without adjusting column names")]
    HeadersCannotBePromotedWithoutAdjustingNames,

    #[error("Invalid column name: {0:?}")]
    InvalidColumnName(String),

    #[error("Query name cannot be empty")]
    EmptyQueryName,

    #[error("Query names are limited to {max} characters")]
    QueryNameTooLong { max: usize },

    #[error("Query names cannot contain periods or quotation marks. (. \")")]
    QueryNameInvalidChars,

    #[error("Query name {0:?} is used more than once")]
    DuplicateQueryName(String),

    #[error("Query mashup is empty")]
    EmptyQueryMashup,

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Invalid sheet name: {0:?}")]
    InvalidSheetName(String),

    #[error("Cannot use a template file with initial data")]
    TemplateWithInitialData,
}

/// All errors that can occur while generating or editing a connected workbook.
#[derive(Debug, thiserror::Error)]
pub enum XlconnectError {
    /// Mashup container framing or encoding error.
    #[error("Malformed mashup container: {0}")]
    MalformedContainer(String),

    /// Expected template part or element is missing.
    #[error("{0}")]
    PartNotFound(Part),

    /// Caller input rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Connection id matched neither a query table nor a pivot cache.
    #[error("No query table or pivot table found for connection {connection_id} in given template")]
    CrossReferenceNotFound { connection_id: String },

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl XlconnectError {
    /// The broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedContainer(_) => ErrorKind::MalformedContainer,
            Self::PartNotFound(_) => ErrorKind::PartNotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::CrossReferenceNotFound { .. } => ErrorKind::CrossReferenceNotFound,
            Self::Xml(_) | Self::Zip(_) | Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn missing_element(part: &str, element: &str) -> Self {
        Self::PartNotFound(Part::Element {
            part: part.to_string(),
            element: element.to_string(),
        })
    }
}

impl From<Part> for XlconnectError {
    fn from(part: Part) -> Self {
        Self::PartNotFound(part)
    }
}

impl From<quick_xml::events::attributes::AttrError> for XlconnectError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::InvalidAttr(e))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlconnectError>;

impl From<XlconnectError> for wasm_bindgen::JsValue {
    fn from(e: XlconnectError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
