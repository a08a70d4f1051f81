//! Table and sheet renames requested through [`TemplateSettings`].

use tracing::debug;

use crate::cell_ref::quote_sheet_name;
use crate::error::{Part, Result, ValidationError};
use crate::namespaces::{TABLE_XML, WORKBOOK_XML};
use crate::package::Archive;
use crate::types::TemplateSettings;

use super::{load_part, save_part};

/// Characters Excel rejects in sheet names.
const SHEET_NAME_FORBIDDEN: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];
const MAX_SHEET_NAME_LENGTH: usize = 31;

pub fn validate_table_name(name: &str) -> Result<()> {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '\\');
    let body_ok = name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '\\'));
    if starts_ok && body_ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidTableName(name.to_string()).into())
    }
}

pub fn validate_sheet_name(name: &str) -> Result<()> {
    let valid = !name.trim().is_empty()
        && name.chars().count() <= MAX_SHEET_NAME_LENGTH
        && !name.contains(SHEET_NAME_FORBIDDEN)
        && !name.starts_with('\'')
        && !name.ends_with('\'');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidSheetName(name.to_string()).into())
    }
}

/// Name of the first sheet in `xl/workbook.xml`.
pub fn first_sheet_name<A: Archive + ?Sized>(archive: &mut A) -> Result<String> {
    let doc = load_part(archive, WORKBOOK_XML, Part::Workbook)?;
    doc.root
        .find("sheet")
        .and_then(|sheet| sheet.attr("name"))
        .map(str::to_string)
        .ok_or_else(|| crate::error::XlconnectError::missing_element(WORKBOOK_XML, "sheet"))
}

/// Apply the requested renames. Both names are validated before anything is written.
pub fn apply_template_settings<A: Archive + ?Sized>(
    archive: &mut A,
    settings: &TemplateSettings,
) -> Result<()> {
    if let Some(name) = &settings.table_name {
        validate_table_name(name)?;
    }
    if let Some(name) = &settings.sheet_name {
        validate_sheet_name(name)?;
    }

    if let Some(name) = &settings.table_name {
        rename_table(archive, name)?;
        debug!(table = %name, "renamed table");
    }
    if let Some(name) = &settings.sheet_name {
        rename_sheet(archive, name)?;
        debug!(sheet = %name, "renamed sheet");
    }
    Ok(())
}

fn rename_table<A: Archive + ?Sized>(archive: &mut A, name: &str) -> Result<()> {
    let mut doc = load_part(archive, TABLE_XML, Part::Table)?;
    let table = doc.root.find_mut("table").ok_or(Part::Table)?;
    table.set_attr("name", name);
    table.set_attr("displayName", name);
    save_part(archive, TABLE_XML, &doc)
}

fn rename_sheet<A: Archive + ?Sized>(archive: &mut A, name: &str) -> Result<()> {
    let mut doc = load_part(archive, WORKBOOK_XML, Part::Workbook)?;
    let sheet = doc
        .root
        .find_mut("sheet")
        .ok_or_else(|| crate::error::XlconnectError::missing_element(WORKBOOK_XML, "sheet"))?;
    let old = sheet.attr("name").unwrap_or_default().to_string();
    sheet.set_attr("name", name);

    let old_prefixes = [format!("{}!", quote_sheet_name(&old)), format!("{old}!")];
    let new_prefix = format!("{}!", quote_sheet_name(name));
    doc.root.for_each_mut("definedName", &mut |defined| {
        let text = defined.text();
        if let Some(rest) = old_prefixes.iter().find_map(|p| text.strip_prefix(p.as_str())) {
            let renamed = format!("{new_prefix}{rest}");
            defined.set_text(renamed);
        }
    });

    save_part(archive, WORKBOOK_XML, &doc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::package::ZipPackage;
    use crate::template::single_query_template;
    use crate::xml_dom::XmlDocument;
    use test_case::test_case;

    #[test_case("Sales", true)]
    #[test_case("_tbl1", true)]
    #[test_case("1abc", false)]
    #[test_case("my table", false)]
    #[test_case("", false)]
    fn test_table_name_rules(name: &str, ok: bool) {
        assert_eq!(validate_table_name(name).is_ok(), ok);
    }

    #[test_case("Data", true)]
    #[test_case("My Data", true)]
    #[test_case("a/b", false)]
    #[test_case("'quoted'", false)]
    #[test_case("", false)]
    fn test_sheet_name_rules(name: &str, ok: bool) {
        assert_eq!(validate_sheet_name(name).is_ok(), ok);
    }

    #[test]
    fn test_renames_table_sheet_and_defined_names() {
        let mut pkg = ZipPackage::load(single_query_template().unwrap()).unwrap();
        let settings = TemplateSettings {
            table_name: Some("SalesTable".into()),
            sheet_name: Some("My Data".into()),
        };
        apply_template_settings(&mut pkg, &settings).unwrap();

        let table = XmlDocument::parse(&pkg.read_text(TABLE_XML).unwrap().unwrap()).unwrap();
        assert_eq!(table.root.attr("name"), Some("SalesTable"));
        assert_eq!(table.root.attr("displayName"), Some("SalesTable"));

        assert_eq!(first_sheet_name(&mut pkg).unwrap(), "My Data");
        let wb = XmlDocument::parse(&pkg.read_text(WORKBOOK_XML).unwrap().unwrap()).unwrap();
        assert_eq!(
            wb.root.find("definedName").unwrap().text(),
            "'My Data'!$A$1:$A$2"
        );
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let mut pkg = ZipPackage::load(single_query_template().unwrap()).unwrap();
        let before = pkg.read_text(TABLE_XML).unwrap();
        let settings = TemplateSettings {
            table_name: Some("Good".into()),
            sheet_name: Some("bad[name]".into()),
        };
        let err = apply_template_settings(&mut pkg, &settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(pkg.read_text(TABLE_XML).unwrap(), before);
    }
}
