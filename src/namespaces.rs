//! Part paths, XML namespaces and fixed strings used by connected workbooks.

// =============================================================================
// Host package part paths
// =============================================================================

pub const CONNECTIONS_XML: &str = "xl/connections.xml";
pub const SHARED_STRINGS_XML: &str = "xl/sharedStrings.xml";
pub const SHEET_XML: &str = "xl/worksheets/sheet1.xml";
pub const TABLE_XML: &str = "xl/tables/table1.xml";
pub const QUERY_TABLE_XML: &str = "xl/queryTables/queryTable1.xml";
pub const WORKBOOK_XML: &str = "xl/workbook.xml";
pub const DOC_PROPS_CORE_XML: &str = "docProps/core.xml";

/// Folder holding query table parts.
pub const QUERY_TABLES_DIR: &str = "xl/queryTables/";
/// Folder holding pivot cache parts.
pub const PIVOT_CACHES_DIR: &str = "xl/pivotCache/";
/// File-name prefix of pivot cache definitions (records live next to them).
pub const PIVOT_CACHE_DEFINITION_PREFIX: &str = "pivotCacheDefinition";

/// Folder and default item of the custom XML parts carrying the mashup.
pub const CUSTOM_XML_DIR: &str = "customXml/";
pub const CUSTOM_XML_ITEM: &str = "customXml/item1.xml";

// =============================================================================
// Mashup package
// =============================================================================

/// Formula file inside the mashup's nested package.
pub const SECTION1_M_PATH: &str = "Formulas/Section1.m";
/// Prefix of metadata item paths that carry the query name.
pub const SECTION1_PATH_PREFIX: &str = "Section1/";

// =============================================================================
// Namespaces
// =============================================================================

/// Main spreadsheet namespace (Transitional conformance)
pub const NS_SPREADSHEET: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Relationships namespace used by `r:id`
pub const NS_OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Package relationships namespace
pub const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Content types namespace
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Root namespace of the custom XML part holding the mashup
pub const NS_DATA_MASHUP: &str = "http://schemas.microsoft.com/DataMashup";

/// Revision namespace whose `xr3:uid` attribute tags table columns
pub const NS_XR3: &str = "http://schemas.microsoft.com/office/spreadsheetml/2016/revision3";

pub const NS_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
pub const NS_DCTERMS: &str = "http://purl.org/dc/terms/";
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

// =============================================================================
// Relationship types
// =============================================================================

pub const REL_WORKBOOK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const REL_CONNECTIONS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/connections";
pub const REL_TABLE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
pub const REL_QUERY_TABLE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/queryTable";
pub const REL_CUSTOM_XML: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXml";
pub const REL_CUSTOM_XML_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXmlProps";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
