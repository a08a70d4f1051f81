//! `xl/worksheets/sheet1.xml`: the cell showing the query name.

use crate::error::{Part, Result, XlconnectError};
use crate::namespaces::SHEET_XML;
use crate::package::Archive;
use crate::xml_dom::Element;

use super::{load_part, save_part};

/// Point the sheet's query-name cell at the 1-based shared string `index`.
///
/// The target is the first shared-string cell in `sheetData`, or the first
/// cell with a value when none is typed as a shared string.
pub fn set_query_name_cell<A: Archive + ?Sized>(archive: &mut A, index: usize) -> Result<()> {
    let mut doc = load_part(archive, SHEET_XML, Part::Sheet)?;
    let sheet_data = doc.root.find_mut("sheetData").ok_or(Part::Sheet)?;

    let has_shared_cell = sheet_data
        .find_all("c")
        .into_iter()
        .any(is_shared_string);
    let pred: fn(&Element) -> bool = if has_shared_cell {
        is_shared_string
    } else {
        has_value
    };
    let cell = first_cell_mut(sheet_data, pred)
        .ok_or_else(|| XlconnectError::missing_element(SHEET_XML, "c"))?;
    set_shared_string_value(cell, index.saturating_sub(1));

    save_part(archive, SHEET_XML, &doc)
}

/// Make `cell` a shared-string cell holding the 0-based `index`.
pub(crate) fn set_shared_string_value(cell: &mut Element, index: usize) {
    cell.set_attr("t", "s");
    cell.remove_children("f");
    cell.remove_children("is");
    match cell.child_mut("v") {
        Some(v) => v.set_text(index.to_string()),
        None => cell.push_child(Element::new("v").with_text(index.to_string())),
    }
}

fn is_shared_string(cell: &Element) -> bool {
    cell.attr("t") == Some("s")
}

fn has_value(cell: &Element) -> bool {
    cell.child("v").is_some()
}

fn first_cell_mut(sheet_data: &mut Element, pred: fn(&Element) -> bool) -> Option<&mut Element> {
    sheet_data
        .child_elements_mut()
        .filter(|row| row.matches("row"))
        .flat_map(|row| row.child_elements_mut())
        .find(|c| c.matches("c") && pred(c))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::package::ZipPackage;
    use crate::template::build_package_zip;

    fn run(sheet: &str, index: usize) -> Result<String> {
        let mut pkg = ZipPackage::load(build_package_zip(&[(SHEET_XML, sheet)])?)?;
        set_query_name_cell(&mut pkg, index)?;
        Ok(pkg.read_text(SHEET_XML)?.unwrap_or_default())
    }

    #[test]
    fn test_shared_string_cell_preferred() {
        let out = run(
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>5</v></c><c r="B1" t="s"><v>0</v></c></row></sheetData></worksheet>"#,
            3,
        )
        .unwrap();
        assert!(out.contains(r#"<c r="A1"><v>5</v></c>"#));
        assert!(out.contains(r#"<c r="B1" t="s"><v>2</v></c>"#));
    }

    #[test]
    fn test_falls_back_to_first_valued_cell() {
        let out = run(
            r#"<worksheet><sheetData><row r="1"><c r="A1"/><c r="B1" t="str"><v>x</v></c></row></sheetData></worksheet>"#,
            1,
        )
        .unwrap();
        assert!(out.contains(r#"<c r="B1" t="s"><v>0</v></c>"#));
    }

    #[test]
    fn test_no_cell_or_no_sheet_data() {
        let err = run("<worksheet><sheetData/></worksheet>", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartNotFound);
        let err = run("<worksheet/>", 1).unwrap_err();
        assert!(matches!(err, XlconnectError::PartNotFound(Part::Sheet)));
    }
}
