//! Built-in workbook templates.
//!
//! Both templates hold one sheet with one table at `A1`. The query template
//! adds the connection, query table and `DataMashup` part for a single query
//! named [`DEFAULT_QUERY_NAME`]; the blank template is a plain table.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::byte_framer::{concat, int32_le_bytes, size_field};
use crate::error::Result;
use crate::mashup::carrier::{encode_utf16le_with_bom, mashup_xml};
use crate::mashup::container::MashupContainer;
use crate::mashup::script::generate_single_query_mashup;
use crate::namespaces::{
    CONNECTIONS_XML, CUSTOM_XML_ITEM, DOC_PROPS_CORE_XML, NS_CONTENT_TYPES, NS_CORE_PROPERTIES,
    NS_DC, NS_DCTERMS, NS_OFFICE_RELATIONSHIPS, NS_RELATIONSHIPS, NS_SPREADSHEET, NS_XR3, NS_XSI,
    QUERY_TABLE_XML, REL_CONNECTIONS, REL_CORE_PROPERTIES, REL_CUSTOM_XML, REL_CUSTOM_XML_PROPS,
    REL_QUERY_TABLE, REL_SHARED_STRINGS, REL_STYLES, REL_TABLE, REL_WORKBOOK, REL_WORKSHEET,
    SECTION1_M_PATH, SHARED_STRINGS_XML, SHEET_XML, TABLE_XML, WORKBOOK_XML,
};
use crate::naming::DEFAULT_QUERY_NAME;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const UTF8_BOM: &str = "\u{feff}";

const DEFAULT_SHEET_NAME: &str = "Sheet1";
const DEFAULT_TABLE_NAME: &str = "Table1";

/// Body of the placeholder query in the built-in template.
const PLACEHOLDER_QUERY_BODY: &str = "let\r\n    Source = \"\"\r\nin\r\n    Source";

const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

/// Zip the given `(path, text)` entries in order, deflated.
pub fn build_package_zip(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(body.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Template with one query table bound to a single Power Query.
pub fn single_query_template() -> Result<Vec<u8>> {
    let mashup = build_mashup_container(DEFAULT_QUERY_NAME)?.encode()?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let text_parts = [
        ("[Content_Types].xml", content_types(true)),
        ("_rels/.rels", root_rels()),
        ("docProps/app.xml", app_props()),
        (DOC_PROPS_CORE_XML, core_props()),
        (WORKBOOK_XML, workbook_xml(true)),
        ("xl/_rels/workbook.xml.rels", workbook_rels(true)),
        ("xl/styles.xml", styles_xml()),
        (SHARED_STRINGS_XML, shared_strings_xml(DEFAULT_QUERY_NAME)),
        (SHEET_XML, sheet_xml()),
        ("xl/worksheets/_rels/sheet1.xml.rels", sheet_rels()),
        (TABLE_XML, table_xml(DEFAULT_QUERY_NAME, DEFAULT_QUERY_NAME, true)),
        ("xl/tables/_rels/table1.xml.rels", table_rels()),
        (QUERY_TABLE_XML, query_table_xml()),
        (CONNECTIONS_XML, connections_xml()),
        ("customXml/itemProps1.xml", custom_xml_props()),
        ("customXml/_rels/item1.xml.rels", custom_xml_rels()),
    ];
    for (name, body) in &text_parts {
        writer.start_file(*name, options)?;
        writer.write_all(body.as_bytes())?;
    }
    writer.start_file(CUSTOM_XML_ITEM, options)?;
    writer.write_all(&encode_utf16le_with_bom(&mashup_xml(&mashup)))?;

    Ok(writer.finish()?.into_inner())
}

/// Template with a plain table and no query.
pub fn blank_table_template() -> Result<Vec<u8>> {
    build_package_zip(&[
        ("[Content_Types].xml", &content_types(false)),
        ("_rels/.rels", &root_rels()),
        ("docProps/app.xml", &app_props()),
        (DOC_PROPS_CORE_XML, &core_props()),
        (WORKBOOK_XML, &workbook_xml(false)),
        ("xl/_rels/workbook.xml.rels", &workbook_rels(false)),
        ("xl/styles.xml", &styles_xml()),
        (SHARED_STRINGS_XML, &shared_strings_xml("Column1")),
        (SHEET_XML, &sheet_xml()),
        ("xl/worksheets/_rels/sheet1.xml.rels", &sheet_rels()),
        (TABLE_XML, &table_xml(DEFAULT_TABLE_NAME, "Column1", false)),
    ])
}

/// A mashup container holding one query with a placeholder body.
///
/// The metadata carries the entries Excel writes for a query loaded to a
/// worksheet table.
pub fn build_mashup_container(query_name: &str) -> Result<MashupContainer> {
    let section = generate_single_query_mashup(query_name, PLACEHOLDER_QUERY_BODY);
    let package = build_package_zip(&[
        ("[Content_Types].xml", MASHUP_CONTENT_TYPES),
        ("Config/Package.xml", MASHUP_PACKAGE_CONFIG),
        (SECTION1_M_PATH, &section),
    ])?;

    let permissions = format!("{UTF8_BOM}{MASHUP_PERMISSIONS}");
    let xml = format!("{UTF8_BOM}{}", mashup_metadata_xml(query_name));
    let metadata = concat(&[
        &int32_le_bytes(0),
        &size_field(xml.len())?,
        xml.as_bytes(),
        &int32_le_bytes(0),
    ]);

    Ok(MashupContainer {
        version: int32_le_bytes(0),
        package,
        permissions: permissions.into_bytes(),
        metadata,
        trailer: int32_le_bytes(0).to_vec(),
    })
}

const MASHUP_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="utf-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="text/xml" /><Default Extension="m" ContentType="application/x-ms-m" /></Types>"#;

const MASHUP_PACKAGE_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?><Package xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><Version>2.72.0</Version><MinVersion>2.21.0</MinVersion><Culture>en-US</Culture></Package>"#;

const MASHUP_PERMISSIONS: &str = r#"<?xml version="1.0" encoding="utf-8"?><PermissionList xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema"><CanEvaluateFuturePackages>false</CanEvaluateFuturePackages><FirewallEnabled>true</FirewallEnabled><WorkbookGroupType xsi:nil="true" /></PermissionList>"#;

fn mashup_metadata_xml(query_name: &str) -> String {
    let name = escape(query_name);
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<LocalPackageMetadataFile xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">"#,
            r#"<Items>"#,
            r#"<Item><ItemLocation><ItemType>AllFormulas</ItemType><ItemPath /></ItemLocation><StableEntries /></Item>"#,
            r#"<Item><ItemLocation><ItemType>Formula</ItemType><ItemPath>Section1/{name}</ItemPath></ItemLocation><StableEntries>"#,
            r#"<Entry Type="IsPrivate" Value="l0" />"#,
            r#"<Entry Type="FillEnabled" Value="l1" />"#,
            r#"<Entry Type="FillObjectType" Value="sTable" />"#,
            r#"<Entry Type="FillToDataModelEnabled" Value="l0" />"#,
            r#"<Entry Type="BufferNextRefresh" Value="l1" />"#,
            r#"<Entry Type="ResultType" Value="sTable" />"#,
            r#"<Entry Type="NameUpdatedAfterFill" Value="l0" />"#,
            r#"<Entry Type="FillTarget" Value="s{name}" />"#,
            r#"<Entry Type="FilledCompleteResultToWorksheet" Value="l1" />"#,
            r#"<Entry Type="AddedToDataModel" Value="l0" />"#,
            r#"<Entry Type="FillCount" Value="l0" />"#,
            r#"<Entry Type="FillErrorCode" Value="sUnknown" />"#,
            r#"<Entry Type="FillErrorCount" Value="l0" />"#,
            r#"<Entry Type="FillLastUpdated" Value="d2023-01-01T00:00:00.0000000Z" />"#,
            r#"<Entry Type="FillStatus" Value="sComplete" />"#,
            r#"</StableEntries></Item>"#,
            r#"<Item><ItemLocation><ItemType>Formula</ItemType><ItemPath>Section1/{name}/Source</ItemPath></ItemLocation><StableEntries /></Item>"#,
            r#"</Items></LocalPackageMetadataFile>"#,
        ),
        name = name
    )
}

fn content_types(with_query: bool) -> String {
    let query_parts = if with_query {
        concat!(
            r#"<Override PartName="/xl/queryTables/queryTable1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.queryTable+xml"/>"#,
            r#"<Override PartName="/xl/connections.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.connections+xml"/>"#,
            r#"<Override PartName="/customXml/itemProps1.xml" ContentType="application/vnd.openxmlformats-officedocument.customXmlProperties+xml"/>"#,
        )
    } else {
        ""
    };
    format!(
        concat!(
            "{decl}\r\n",
            r#"<Types xmlns="{ns}">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            r#"<Override PartName="/xl/tables/table1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#,
            "{query_parts}",
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
            "</Types>",
        ),
        decl = XML_DECL,
        ns = NS_CONTENT_TYPES,
        query_parts = query_parts,
    )
}

fn root_rels() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<Relationships xmlns="{ns}">"#,
            r#"<Relationship Id="rId3" Type="{ext}" Target="docProps/app.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{core}" Target="docProps/core.xml"/>"#,
            r#"<Relationship Id="rId1" Type="{wb}" Target="xl/workbook.xml"/>"#,
            "</Relationships>",
        ),
        decl = XML_DECL,
        ns = NS_RELATIONSHIPS,
        ext = REL_EXTENDED_PROPERTIES,
        core = REL_CORE_PROPERTIES,
        wb = REL_WORKBOOK,
    )
}

fn app_props() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>Microsoft Excel</Application><DocSecurity>0</DocSecurity><ScaleCrop>false</ScaleCrop>",
            "<LinksUpToDate>false</LinksUpToDate><SharedDoc>false</SharedDoc><HyperlinksChanged>false</HyperlinksChanged>",
            "<AppVersion>16.0300</AppVersion></Properties>",
        ),
        decl = XML_DECL,
    )
}

fn core_props() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<cp:coreProperties xmlns:cp="{cp}" xmlns:dc="{dc}" xmlns:dcterms="{dcterms}" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="{xsi}">"#,
            "<dc:creator></dc:creator><cp:lastModifiedBy></cp:lastModifiedBy>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">2023-01-01T00:00:00Z</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">2023-01-01T00:00:00Z</dcterms:modified>"#,
            "</cp:coreProperties>",
        ),
        decl = XML_DECL,
        cp = NS_CORE_PROPERTIES,
        dc = NS_DC,
        dcterms = NS_DCTERMS,
        xsi = NS_XSI,
    )
}

fn workbook_xml(with_query: bool) -> String {
    let defined_names = if with_query {
        format!(
            r#"<definedNames><definedName name="ExternalData_1" localSheetId="0" hidden="1">{DEFAULT_SHEET_NAME}!$A$1:$A$2</definedName></definedNames>"#
        )
    } else {
        String::new()
    };
    format!(
        concat!(
            "{decl}\r\n",
            r#"<workbook xmlns="{ns}" xmlns:r="{r}">"#,
            r#"<bookViews><workbookView xWindow="0" yWindow="0" windowWidth="28800" windowHeight="12300"/></bookViews>"#,
            r#"<sheets><sheet name="{sheet}" sheetId="1" r:id="rId1"/></sheets>"#,
            "{defined_names}",
            r#"<calcPr calcId="191029"/>"#,
            "</workbook>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
        r = NS_OFFICE_RELATIONSHIPS,
        sheet = DEFAULT_SHEET_NAME,
        defined_names = defined_names,
    )
}

fn workbook_rels(with_query: bool) -> String {
    let query_rels = if with_query {
        format!(
            concat!(
                r#"<Relationship Id="rId4" Type="{conn}" Target="connections.xml"/>"#,
                r#"<Relationship Id="rId5" Type="{custom}" Target="../customXml/item1.xml"/>"#,
            ),
            conn = REL_CONNECTIONS,
            custom = REL_CUSTOM_XML,
        )
    } else {
        String::new()
    };
    format!(
        concat!(
            "{decl}\r\n",
            r#"<Relationships xmlns="{ns}">"#,
            r#"<Relationship Id="rId1" Type="{ws}" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{styles}" Target="styles.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{sst}" Target="sharedStrings.xml"/>"#,
            "{query_rels}",
            "</Relationships>",
        ),
        decl = XML_DECL,
        ns = NS_RELATIONSHIPS,
        ws = REL_WORKSHEET,
        styles = REL_STYLES,
        sst = REL_SHARED_STRINGS,
        query_rels = query_rels,
    )
}

fn styles_xml() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<styleSheet xmlns="{ns}">"#,
            r#"<fonts count="1"><font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            r#"<dxfs count="0"/><tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>"#,
            "</styleSheet>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
    )
}

fn shared_strings_xml(first: &str) -> String {
    format!(
        r#"{XML_DECL}{}<sst xmlns="{NS_SPREADSHEET}" count="1" uniqueCount="1"><si><t>{}</t></si></sst>"#,
        "\r\n",
        escape(first)
    )
}

fn sheet_xml() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<worksheet xmlns="{ns}" xmlns:r="{r}">"#,
            r#"<dimension ref="A1:A2"/>"#,
            r#"<sheetViews><sheetView tabSelected="1" workbookViewId="0"><selection activeCell="A1" sqref="A1"/></sheetView></sheetViews>"#,
            r#"<sheetFormatPr defaultRowHeight="15"/>"#,
            r#"<sheetData><row r="1" spans="1:1"><c r="A1" t="s"><v>0</v></c></row></sheetData>"#,
            r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
            r#"<tableParts count="1"><tablePart r:id="rId1"/></tableParts>"#,
            "</worksheet>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
        r = NS_OFFICE_RELATIONSHIPS,
    )
}

fn sheet_rels() -> String {
    format!(
        r#"{XML_DECL}{}<Relationships xmlns="{NS_RELATIONSHIPS}"><Relationship Id="rId1" Type="{REL_TABLE}" Target="../tables/table1.xml"/></Relationships>"#,
        "\r\n"
    )
}

fn table_xml(table_name: &str, column_name: &str, with_query: bool) -> String {
    let (table_type, unique_name, field_id) = if with_query {
        (r#" tableType="queryTable""#, r#" uniqueName="1""#, r#" queryTableFieldId="1""#)
    } else {
        ("", "", "")
    };
    format!(
        concat!(
            "{decl}\r\n",
            r#"<table xmlns="{ns}" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="xr xr3" "#,
            r#"xmlns:xr="http://schemas.microsoft.com/office/spreadsheetml/2014/revision" xmlns:xr3="{xr3}" "#,
            r#"id="1" xr:uid="{{D8E5C3B1-6F2A-4E47-9C1D-3B7A2F0E9C11}}" name="{name}" displayName="{name}" ref="A1:A2"{table_type} totalsRowShown="0">"#,
            r#"<autoFilter ref="A1:A2" xr:uid="{{5A1E1E2B-8C3D-4F5A-9B6C-7D8E9F0A1B2C}}"/>"#,
            r#"<tableColumns count="1"><tableColumn id="1" xr3:uid="{{0C9B3E9A-2F1D-4D6B-8E7A-5C4B3A291807}}"{unique_name} name="{column}"{field_id}/></tableColumns>"#,
            r#"<tableStyleInfo name="TableStyleMedium2" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="0"/>"#,
            "</table>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
        xr3 = NS_XR3,
        name = escape(table_name),
        column = escape(column_name),
        table_type = table_type,
        unique_name = unique_name,
        field_id = field_id,
    )
}

fn table_rels() -> String {
    format!(
        r#"{XML_DECL}{}<Relationships xmlns="{NS_RELATIONSHIPS}"><Relationship Id="rId1" Type="{REL_QUERY_TABLE}" Target="../queryTables/queryTable1.xml"/></Relationships>"#,
        "\r\n"
    )
}

fn query_table_xml() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<queryTable xmlns="{ns}" name="ExternalData_1" connectionId="1" autoFormatId="16" applyNumberFormats="0" applyBorderFormats="0" applyFontFormats="0" applyPatternFormats="0" applyAlignmentFormats="0" applyWidthHeightFormats="0">"#,
            r#"<queryTableRefresh nextId="2"><queryTableFields count="1"><queryTableField id="1" name="{name}" tableColumnId="1"/></queryTableFields></queryTableRefresh>"#,
            "</queryTable>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
        name = DEFAULT_QUERY_NAME,
    )
}

fn connections_xml() -> String {
    format!(
        concat!(
            "{decl}\r\n",
            r#"<connections xmlns="{ns}">"#,
            r#"<connection id="1" keepAlive="1" name="Query - {name}" description="Connection to the '{name}' query in the workbook." type="5" refreshedVersion="7" background="1" saveData="1">"#,
            r#"<dbPr connection="Provider=Microsoft.Mashup.OleDb.1;Data Source=$Workbook$;Location={name};" command="SELECT * FROM [{name}]"/>"#,
            "</connection></connections>",
        ),
        decl = XML_DECL,
        ns = NS_SPREADSHEET,
        name = DEFAULT_QUERY_NAME,
    )
}

fn custom_xml_props() -> String {
    format!(
        r#"{XML_DECL}{}<ds:datastoreItem ds:itemID="{{B4F2C0C8-1F6E-4C7B-9B0F-2D3E4F5A6B7C}}" xmlns:ds="http://schemas.openxmlformats.org/officeDocument/2006/customXml"><ds:schemaRefs/></ds:datastoreItem>"#,
        "\r\n"
    )
}

fn custom_xml_rels() -> String {
    format!(
        r#"{XML_DECL}{}<Relationships xmlns="{NS_RELATIONSHIPS}"><Relationship Id="rId1" Type="{REL_CUSTOM_XML_PROPS}" Target="itemProps1.xml"/></Relationships>"#,
        "\r\n"
    )
}
