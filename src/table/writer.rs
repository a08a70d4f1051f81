//! Writes a [`TableData`] into the sheet, table, query table and defined names.

use tracing::{debug, warn};

use crate::cell_ref::{absolute_table_range, cell_reference, column_count, quote_sheet_name, table_range};
use crate::error::{Part, Result, XlconnectError};
use crate::id_gen::{braced, IdGenerator};
use crate::namespaces::{QUERY_TABLE_XML, SHEET_XML, TABLE_XML, WORKBOOK_XML};
use crate::package::Archive;
use crate::sync::settings::first_sheet_name;
use crate::sync::shared_strings::SharedStrings;
use crate::sync::worksheet::set_shared_string_value;
use crate::sync::{load_part, save_part};
use crate::types::TableData;
use crate::xml_dom::Element;

use super::cell::CellValue;

/// Project `table` into every part that describes the table's extent.
pub fn project_table<A: Archive + ?Sized>(
    archive: &mut A,
    table: &TableData,
    ids: &dyn IdGenerator,
) -> Result<()> {
    let mut strings = SharedStrings::load(archive)?;
    let header_indices: Vec<usize> = table
        .column_names
        .iter()
        .map(|name| strings.intern(name))
        .collect();
    strings.save(archive)?;

    write_sheet_data(archive, table, &header_indices)?;
    let bound_to_query = write_table(archive, table, ids)?;
    if bound_to_query {
        write_query_table_fields(archive, table)?;
    }
    write_defined_names(archive, table)?;

    debug!(
        range = %table_range(table),
        bound_to_query,
        "projected table data"
    );
    Ok(())
}

/// Rewrite `sheetData`: header row 1, then one row per data row.
pub fn write_sheet_data<A: Archive + ?Sized>(
    archive: &mut A,
    table: &TableData,
    header_indices: &[usize],
) -> Result<()> {
    let mut doc = load_part(archive, SHEET_XML, Part::Sheet)?;
    let spans = format!("1:{}", column_count(table));

    if let Some(dimension) = doc.root.find_mut("dimension") {
        dimension.set_attr("ref", table_range(table));
    }

    let sheet_data = doc.root.find_mut("sheetData").ok_or(Part::Sheet)?;
    sheet_data.children.clear();

    let mut header = Element::new("row").with_attr("r", "1").with_attr("spans", spans.as_str());
    for (col, index) in (0u32..).zip(header_indices) {
        let mut cell = Element::new("c").with_attr("r", cell_reference(col, 1));
        set_shared_string_value(&mut cell, index.saturating_sub(1));
        header.push_child(cell);
    }
    sheet_data.push_child(header);

    for (row_number, values) in (2u32..).zip(&table.rows) {
        let mut row = Element::new("row")
            .with_attr("r", row_number.to_string())
            .with_attr("spans", spans.as_str());
        for (col, value) in (0u32..).zip(values) {
            if let Some(typed) = CellValue::from_text(value) {
                row.push_child(typed.to_cell(&cell_reference(col, row_number)));
            }
        }
        sheet_data.push_child(row);
    }

    save_part(archive, SHEET_XML, &doc)
}

/// Update the table range and regenerate its columns.
///
/// Returns whether the table is fed by a query table.
pub fn write_table<A: Archive + ?Sized>(
    archive: &mut A,
    table: &TableData,
    ids: &dyn IdGenerator,
) -> Result<bool> {
    let mut doc = load_part(archive, TABLE_XML, Part::Table)?;
    let range = table_range(table);

    let root = doc.root.find_mut("table").ok_or(Part::Table)?;
    let bound_to_query = root.attr("tableType") == Some("queryTable");
    let tags_columns = root.attributes().iter().any(|(k, _)| k == "xmlns:xr3");
    root.set_attr("ref", range.as_str());

    if let Some(auto_filter) = root.child_mut("autoFilter") {
        auto_filter.set_attr("ref", range.as_str());
    }

    let columns = root
        .child_mut("tableColumns")
        .ok_or_else(|| XlconnectError::missing_element(TABLE_XML, "tableColumns"))?;
    columns.children.clear();
    columns.set_attr("count", table.column_names.len().to_string());
    for (id, name) in (1usize..).zip(&table.column_names) {
        let mut column = Element::new("tableColumn").with_attr("id", id.to_string());
        if tags_columns {
            column.set_attr("xr3:uid", braced(&ids.new_uuid()));
        }
        if bound_to_query {
            column.set_attr("uniqueName", id.to_string());
        }
        column.set_attr("name", name.as_str());
        if bound_to_query {
            column.set_attr("queryTableFieldId", id.to_string());
        }
        columns.push_child(column);
    }

    save_part(archive, TABLE_XML, &doc)?;
    Ok(bound_to_query)
}

/// Regenerate `queryTableFields` to match the table columns one to one.
pub fn write_query_table_fields<A: Archive + ?Sized>(
    archive: &mut A,
    table: &TableData,
) -> Result<()> {
    let mut doc = load_part(archive, QUERY_TABLE_XML, Part::QueryTable)?;

    let refresh = doc
        .root
        .find_mut("queryTableRefresh")
        .ok_or_else(|| XlconnectError::missing_element(QUERY_TABLE_XML, "queryTableRefresh"))?;
    let count = table.column_names.len();
    refresh.set_attr("nextId", (count + 1).to_string());
    refresh.remove_children("queryTableDeletedFields");

    let mut fields = Element::new("queryTableFields").with_attr("count", count.to_string());
    for (id, name) in (1usize..).zip(&table.column_names) {
        fields.push_child(
            Element::new("queryTableField")
                .with_attr("id", id.to_string())
                .with_attr("name", name.as_str())
                .with_attr("tableColumnId", id.to_string()),
        );
    }
    match refresh.child_mut("queryTableFields") {
        Some(existing) => *existing = fields,
        None => refresh.push_child(fields),
    }

    save_part(archive, QUERY_TABLE_XML, &doc)
}

/// Point every defined name on the table's sheet at the table range.
pub fn write_defined_names<A: Archive + ?Sized>(archive: &mut A, table: &TableData) -> Result<()> {
    let sheet = first_sheet_name(archive)?;
    let mut doc = load_part(archive, WORKBOOK_XML, Part::Workbook)?;
    let target = format!("{}!{}", quote_sheet_name(&sheet), absolute_table_range(table));

    let mut updated = 0usize;
    doc.root.for_each_mut("definedName", &mut |defined| {
        let text = defined.text();
        let on_sheet = text
            .rsplit_once('!')
            .is_some_and(|(prefix, _)| unquote_sheet_name(prefix) == sheet);
        if on_sheet {
            defined.set_text(target.as_str());
            updated += 1;
        } else {
            warn!(name = ?defined.attr("name"), "defined name does not reference the table sheet");
        }
    });

    if updated > 0 {
        save_part(archive, WORKBOOK_XML, &doc)?;
    }
    Ok(())
}

fn unquote_sheet_name(prefix: &str) -> String {
    prefix
        .strip_prefix('\'')
        .and_then(|p| p.strip_suffix('\''))
        .map_or_else(|| prefix.to_string(), |inner| inner.replace("''", "'"))
}
