//! Test fixtures for generating connected-workbook templates in memory.
//!
//! [`TemplateBuilder`] starts from the smallest template the generator
//! accepts and lets a test swap individual parts.
//!
//! # Example
//!
//! ```rust
//! use fixtures::TemplateBuilder;
//!
//! let xlsx = TemplateBuilder::new()
//!     .connection_id("3")
//!     .query_table("xl/queryTables/queryTable1.xml", "3")
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

use xlconnect::mashup::carrier::{encode_utf16le_with_bom, mashup_xml};
use xlconnect::mashup::MashupContainer;
use xlconnect::template::{build_mashup_container, build_package_zip};

pub const CONNECTIONS_XML: &str = "xl/connections.xml";
pub const SHARED_STRINGS_XML: &str = "xl/sharedStrings.xml";
pub const SHEET_XML: &str = "xl/worksheets/sheet1.xml";
pub const TABLE_XML: &str = "xl/tables/table1.xml";
pub const WORKBOOK_XML: &str = "xl/workbook.xml";
pub const CORE_XML: &str = "docProps/core.xml";
pub const MASHUP_XML: &str = "customXml/item1.xml";

const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Builder for minimal connected-workbook templates.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    connection_id: String,
    query_tables: Vec<(String, String)>,
    pivot_caches: Vec<(String, String)>,
    with_section1: bool,
    extra: Vec<(String, String)>,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    /// Template with connection `1` feeding `xl/queryTables/queryTable1.xml`.
    pub fn new() -> Self {
        Self {
            connection_id: "1".into(),
            query_tables: vec![("xl/queryTables/queryTable1.xml".into(), "1".into())],
            pivot_caches: Vec::new(),
            with_section1: true,
            extra: Vec::new(),
        }
    }

    pub fn connection_id(mut self, id: &str) -> Self {
        self.connection_id = id.to_string();
        self
    }

    pub fn without_query_tables(mut self) -> Self {
        self.query_tables.clear();
        self
    }

    pub fn query_table(mut self, path: &str, connection_id: &str) -> Self {
        self.query_tables.push((path.into(), connection_id.into()));
        self
    }

    pub fn pivot_cache(mut self, path: &str, connection_id: &str) -> Self {
        self.pivot_caches.push((path.into(), connection_id.into()));
        self
    }

    /// Mashup whose nested package lacks `Formulas/Section1.m`.
    pub fn without_section1(mut self) -> Self {
        self.with_section1 = false;
        self
    }

    /// Add or replace an arbitrary text part.
    pub fn part(mut self, path: &str, xml: &str) -> Self {
        self.extra.retain(|(p, _)| p != path);
        self.extra.push((path.into(), xml.into()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = vec![
            (WORKBOOK_XML.into(), workbook_xml()),
            (SHEET_XML.into(), sheet_xml()),
            (SHARED_STRINGS_XML.into(), shared_strings_xml()),
            (TABLE_XML.into(), table_xml()),
            (CONNECTIONS_XML.into(), connections_xml(&self.connection_id)),
            (CORE_XML.into(), core_xml()),
        ];
        for (path, id) in &self.query_tables {
            parts.push((path.clone(), query_table_xml(id)));
        }
        for (path, id) in &self.pivot_caches {
            parts.push((path.clone(), pivot_cache_xml(id)));
        }
        for (path, xml) in self.extra {
            parts.retain(|(p, _)| *p != path);
            parts.push((path, xml));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, xml) in &parts {
            writer.start_file(path.as_str(), FileOptions::default()).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.start_file(MASHUP_XML, FileOptions::default()).unwrap();
        let base64 = mashup(self.with_section1).encode().unwrap();
        writer
            .write_all(&encode_utf16le_with_bom(&mashup_xml(&base64)))
            .unwrap();
        writer.finish().unwrap().into_inner()
    }
}

/// A mashup container for `Query1`, optionally without its formula file.
pub fn mashup(with_section1: bool) -> MashupContainer {
    let container = build_mashup_container("Query1").unwrap();
    if with_section1 {
        return container;
    }
    MashupContainer {
        package: build_package_zip(&[("Config/Package.xml", "<Package/>")]).unwrap(),
        ..container
    }
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data Sheet" sheetId="1" r:id="rId1"/></sheets><definedNames><definedName name="ExternalData_1" localSheetId="0" hidden="1">'Data Sheet'!$A$1:$A$2</definedName><definedName name="Other">Elsewhere!$A$1</definedName></definedNames></workbook>"#
    )
}

fn sheet_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{NS}"><dimension ref="A1:A2"/><sheetData><row r="1" spans="1:1"><c r="A1" t="s"><v>0</v></c></row></sheetData></worksheet>"#
    )
}

fn shared_strings_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="{NS}" count="1" uniqueCount="1"><si><t>Query1</t></si></sst>"#
    )
}

fn table_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="{NS}" id="1" name="Query1" displayName="Query1" ref="A1:A2" tableType="queryTable" totalsRowShown="0"><autoFilter ref="A1:A2"/><tableColumns count="1"><tableColumn id="1" uniqueName="1" name="Query1" queryTableFieldId="1"/></tableColumns></table>"#
    )
}

fn connections_xml(id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<connections xmlns="{NS}"><connection id="{id}" keepAlive="1" name="Query - Query1" type="5" refreshedVersion="7" background="1"><dbPr connection="Provider=Microsoft.Mashup.OleDb.1;Data Source=$Workbook$;Location=Query1;" command="SELECT * FROM [Query1]"/></connection></connections>"#
    )
}

fn query_table_xml(connection_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<queryTable xmlns="{NS}" name="ExternalData_1" connectionId="{connection_id}" autoFormatId="16"><queryTableRefresh nextId="2"><queryTableFields count="1"><queryTableField id="1" name="Query1" tableColumnId="1"/></queryTableFields><queryTableDeletedFields count="1"><deletedField name="Old"/></queryTableDeletedFields></queryTableRefresh></queryTable>"#
    )
}

fn pivot_cache_xml(connection_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<pivotCacheDefinition xmlns="{NS}" refreshedBy="x" recordCount="0"><cacheSource type="external" connectionId="{connection_id}"/><cacheFields count="0"/></pivotCacheDefinition>"#
    )
}

fn core_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Old title</dc:title></cp:coreProperties>"#
        .to_string()
}
