//! End-to-end generation against the built-in and fixture templates.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod fixtures;

use chrono::{TimeZone, Utc};
use fixtures::{
    TemplateBuilder, CONNECTIONS_XML, CORE_XML, SHARED_STRINGS_XML, SHEET_XML, TABLE_XML,
    WORKBOOK_XML,
};
use xlconnect::id_gen::SequentialIdGenerator;
use xlconnect::mashup::{read_mashup_part, MashupContainer};
use xlconnect::package::{Archive, ZipPackage};
use xlconnect::xml_dom::XmlDocument;
use xlconnect::{
    generate_single_query_workbook, generate_table_workbook_from_grid, DocProps, ErrorKind,
    FileConfigs, Grid, GridConfig, Part, QueryInfo, TemplateSettings, ValidationError,
    WorkbookGenerator, XlconnectError,
};

const BODY: &str = "let\r\n    Source = Csv.Document(\"a,b\")\r\nin\r\n    Source";

fn open(bytes: Vec<u8>) -> ZipPackage {
    ZipPackage::load(bytes).unwrap()
}

fn part(pkg: &mut ZipPackage, path: &str) -> XmlDocument {
    XmlDocument::parse(&pkg.read_text(path).unwrap().unwrap()).unwrap()
}

fn with_template(template: Vec<u8>) -> FileConfigs {
    FileConfigs {
        template_file: Some(template),
        ..FileConfigs::default()
    }
}

#[test]
fn test_query_name_agrees_across_parts() {
    let query = QueryInfo::new(BODY).with_name("Sales Data").with_refresh_on_open(true);
    let bytes = generate_single_query_workbook(&query, None, &FileConfigs::default()).unwrap();
    let mut pkg = open(bytes);

    let mashup = read_mashup_part(&mut pkg).unwrap();
    let container = MashupContainer::decode(&mashup.base64).unwrap();
    let formula = container.formula().unwrap();
    assert!(formula.contains("shared #\"Sales Data\" = "));
    assert!(formula.contains("Csv.Document"));
    let metadata = container.metadata_block().unwrap();
    assert!(metadata.xml.contains("<ItemPath>Section1/Sales%20Data</ItemPath>"));
    assert!(metadata.xml.contains(r#"Value="sSales Data""#));

    let connections = part(&mut pkg, CONNECTIONS_XML);
    let db_pr = connections.root.find("dbPr").unwrap();
    assert_eq!(db_pr.attr("command"), Some("SELECT * FROM [Sales Data]"));
    assert_eq!(db_pr.attr("refreshOnLoad"), Some("1"));

    let table = part(&mut pkg, TABLE_XML);
    assert_eq!(
        table.root.find("tableColumn").unwrap().attr("name"),
        Some("Sales Data")
    );
    // the table keeps its template name; FillTarget carries the query name
    assert_eq!(table.root.attr("name"), Some("Query1"));

    let sst = part(&mut pkg, SHARED_STRINGS_XML);
    let sheet = part(&mut pkg, SHEET_XML);
    let a1 = sheet.root.find("c").unwrap();
    let index: usize = a1.child("v").unwrap().text().parse().unwrap();
    assert_eq!(
        sst.root.child_elements().nth(index).unwrap().text(),
        "Sales Data"
    );
}

#[test]
fn test_bracket_in_name_is_escaped_in_command() {
    let query = QueryInfo::new(BODY).with_name("na]me");
    let bytes = generate_single_query_workbook(&query, None, &FileConfigs::default()).unwrap();
    let mut pkg = open(bytes);
    let xml = pkg.read_text(CONNECTIONS_XML).unwrap().unwrap();
    assert!(xml.contains("[na]]me]"));
}

#[test]
fn test_initial_data_projected() {
    let ids = SequentialIdGenerator::default();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let grid = Grid::from_strings([
        ["Region", "Total", "When"],
        ["North", "12.5", "1/2/1900"],
        ["South", "", "1:00 AM"],
    ])
    .with_config(GridConfig {
        promote_headers: true,
        adjust_column_names: true,
    });
    let query = QueryInfo::new(BODY).with_name("Sales");
    let bytes = WorkbookGenerator::new(&ids, now)
        .single_query(&query, Some(&grid), &FileConfigs::default())
        .unwrap();
    let mut pkg = open(bytes);

    let sheet = part(&mut pkg, SHEET_XML);
    assert_eq!(sheet.root.find("dimension").unwrap().attr("ref"), Some("A1:C3"));
    let cells: Vec<_> = sheet.root.find_all("c");
    let by_ref = |r: &str| *cells.iter().find(|c| c.attr("r") == Some(r)).unwrap();
    assert_eq!(by_ref("B2").child("v").unwrap().text(), "12.5");
    assert_eq!(by_ref("C2").child("v").unwrap().text(), "2");
    let time: f64 = by_ref("C3").child("v").unwrap().text().parse().unwrap();
    assert!((time - 1.0 / 24.0).abs() < 1e-9);
    assert!(cells.iter().all(|c| c.attr("r") != Some("B3")));

    let table = part(&mut pkg, TABLE_XML);
    assert_eq!(table.root.attr("ref"), Some("A1:C3"));
    let names: Vec<_> = table
        .root
        .find_all("tableColumn")
        .iter()
        .map(|c| c.attr("name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Region", "Total", "When"]);

    let workbook = part(&mut pkg, WORKBOOK_XML);
    assert_eq!(
        workbook.root.find("definedName").unwrap().text(),
        "Sheet1!$A$1:$C$3"
    );

    let mashup = read_mashup_part(&mut pkg).unwrap();
    let metadata = MashupContainer::decode(&mashup.base64)
        .unwrap()
        .metadata_block()
        .unwrap();
    assert!(metadata.xml.contains("d2024-06-01T08:00:00.0000000Z"));
}

#[test]
fn test_custom_template_wired_without_projection() {
    let template = TemplateBuilder::new().connection_id("4").query_table(
        "xl/queryTables/queryTable2.xml",
        "4",
    );
    // the default query table points at connection 1; the added one matches
    let bytes = generate_single_query_workbook(
        &QueryInfo::new(BODY).with_name("Orders"),
        None,
        &with_template(template.build()),
    )
    .unwrap();
    let mut pkg = open(bytes);

    let qt1 = pkg.read_text("xl/queryTables/queryTable1.xml").unwrap().unwrap();
    assert!(!qt1.contains("refreshOnLoad"));
    let qt2 = pkg.read_text("xl/queryTables/queryTable2.xml").unwrap().unwrap();
    assert!(qt2.contains(r#"refreshOnLoad="0""#));

    // layout untouched
    let table = part(&mut pkg, TABLE_XML);
    assert_eq!(table.root.attr("ref"), Some("A1:A2"));
    let workbook = part(&mut pkg, WORKBOOK_XML);
    assert_eq!(
        workbook.root.find("definedName").unwrap().text(),
        "'Data Sheet'!$A$1:$A$2"
    );
}

#[test]
fn test_pivot_cache_binding() {
    let template = TemplateBuilder::new()
        .without_query_tables()
        .pivot_cache("xl/pivotCache/pivotCacheDefinition1.xml", "1");
    let query = QueryInfo::new(BODY).with_refresh_on_open(true);
    let bytes = generate_single_query_workbook(&query, None, &with_template(template.build())).unwrap();
    let mut pkg = open(bytes);
    let pivot = part(&mut pkg, "xl/pivotCache/pivotCacheDefinition1.xml");
    assert_eq!(pivot.root.attr("refreshOnLoad"), Some("1"));
}

#[test]
fn test_unbound_connection_is_cross_reference_error() {
    let template = TemplateBuilder::new()
        .connection_id("2")
        .pivot_cache("xl/pivotCache/pivotCacheDefinition1.xml", "3");
    let err = generate_single_query_workbook(
        &QueryInfo::new(BODY),
        None,
        &with_template(template.build()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CrossReferenceNotFound);
    assert!(matches!(
        err,
        XlconnectError::CrossReferenceNotFound { ref connection_id } if connection_id == "2"
    ));
}

#[test]
fn test_missing_section1_is_part_not_found() {
    let template = TemplateBuilder::new().without_section1().build();
    let err = generate_single_query_workbook(&QueryInfo::new(BODY), None, &with_template(template))
        .unwrap_err();
    assert!(matches!(err, XlconnectError::PartNotFound(Part::FormulaSection)));
}

#[test]
fn test_missing_connections_part() {
    let template = TemplateBuilder::new()
        .part(CONNECTIONS_XML, "<connections/>")
        .build();
    let err = generate_single_query_workbook(&QueryInfo::new(BODY), None, &with_template(template))
        .unwrap_err();
    assert!(matches!(err, XlconnectError::PartNotFound(Part::Connections)));
}

#[test]
fn test_doc_props_and_template_settings() {
    let configs = FileConfigs {
        doc_props: Some(DocProps {
            title: Some("Quarterly".into()),
            category: Some("Finance".into()),
            ..DocProps::default()
        }),
        template_settings: Some(TemplateSettings {
            table_name: Some("Quarterly_Table".into()),
            sheet_name: Some("Q3".into()),
        }),
        ..FileConfigs::default()
    };
    let grid = Grid::from_strings([["1", "2"], ["3", "4"]]);
    let bytes = generate_table_workbook_from_grid(&grid, &configs).unwrap();
    let mut pkg = open(bytes);

    let core = part(&mut pkg, CORE_XML);
    assert_eq!(core.root.child("title").unwrap().text(), "Quarterly");
    assert_eq!(core.root.child("category").unwrap().name, "cp:category");
    assert!(core.root.child("modified").unwrap().text().ends_with('Z'));

    let table = part(&mut pkg, TABLE_XML);
    assert_eq!(table.root.attr("displayName"), Some("Quarterly_Table"));
    assert_eq!(table.root.attr("ref"), Some("A1:B3"));

    let workbook = part(&mut pkg, WORKBOOK_XML);
    assert_eq!(workbook.root.find("sheet").unwrap().attr("name"), Some("Q3"));
}

#[test]
fn test_table_workbook_validation_errors() {
    let ragged = Grid::from_strings(vec![vec!["A", "B", "A"], vec!["1", "2"]]).with_config(
        GridConfig {
            promote_headers: true,
            adjust_column_names: false,
        },
    );
    let err = generate_table_workbook_from_grid(&ragged, &FileConfigs::default()).unwrap_err();
    assert!(matches!(
        err,
        XlconnectError::Validation(ValidationError::ArrayIsntMxN)
    ));

    let err = generate_table_workbook_from_grid(
        &Grid::from_strings([["a"]]),
        &with_template(TemplateBuilder::new().build()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        XlconnectError::Validation(ValidationError::TemplateWithInitialData)
    ));
}

#[test]
fn test_unrelated_parts_survive_untouched() {
    let template = TemplateBuilder::new()
        .part("xl/theme/theme1.xml", "<a:theme xmlns:a=\"t\" name=\"Office\"/>")
        .build();
    let bytes =
        generate_single_query_workbook(&QueryInfo::new(BODY), None, &with_template(template)).unwrap();
    let mut pkg = open(bytes);
    assert_eq!(
        pkg.read_text("xl/theme/theme1.xml").unwrap().as_deref(),
        Some("<a:theme xmlns:a=\"t\" name=\"Office\"/>")
    );
}
