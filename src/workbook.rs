//! End-to-end workbook generation.
//!
//! One [`WorkbookGenerator`] call owns one archive from load to `finish`.
//! Any error discards the archive, so callers never see a half-edited file.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::id_gen::{IdGenerator, UuidV4Generator};
use crate::mashup::{
    generate_single_query_mashup, read_mashup_part, replace_single_query, write_mashup_part,
    MetadataUpdate,
};
use crate::naming::validate_query_name;
use crate::package::ZipPackage;
use crate::sync::{apply_template_settings, update_doc_props, wire_query_to_sheet};
use crate::table::{parse_to_table_data, project_table};
use crate::template::{blank_table_template, single_query_template};
use crate::types::{FileConfigs, Grid, QueryInfo, TableData};

/// Builds workbooks with an injected clock and id source.
pub struct WorkbookGenerator<'a> {
    ids: &'a dyn IdGenerator,
    now: DateTime<Utc>,
}

impl std::fmt::Debug for WorkbookGenerator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookGenerator")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl<'a> WorkbookGenerator<'a> {
    #[must_use]
    pub fn new(ids: &'a dyn IdGenerator, now: DateTime<Utc>) -> Self {
        Self { ids, now }
    }

    /// Workbook whose table is loaded by a single Power Query.
    pub fn single_query(
        &self,
        query: &QueryInfo,
        initial_grid: Option<&Grid>,
        file_configs: &FileConfigs,
    ) -> Result<Vec<u8>> {
        let query_name = query.name();
        validate_query_name(query_name)?;
        if query.query_mashup.trim().is_empty() {
            return Err(ValidationError::EmptyQueryMashup.into());
        }
        if file_configs.template_file.is_some() && initial_grid.is_some() {
            return Err(ValidationError::TemplateWithInitialData.into());
        }

        let table_data = initial_grid.map(parse_to_table_data).transpose()?;
        let template = match &file_configs.template_file {
            Some(bytes) => bytes.clone(),
            None => single_query_template()?,
        };
        let mut package = ZipPackage::load(template)?;

        let part = read_mashup_part(&mut package)?;
        let script = generate_single_query_mashup(query_name, &query.query_mashup);
        let mut update = MetadataUpdate::new(query_name, self.now);
        if let Some(table) = &table_data {
            update = update.with_columns(&table.column_names);
        }
        let mashup = replace_single_query(&part.base64, &script, &update)?;
        write_mashup_part(&mut package, &part.path, &mashup);
        debug!(path = %part.path, "rewrote mashup part");

        let binding = wire_query_to_sheet(&mut package, query_name, query.refresh_on_open)?;

        if let Some(settings) = &file_configs.template_settings {
            apply_template_settings(&mut package, settings)?;
        }

        // A custom template keeps its own layout unless data was supplied.
        let projection = match table_data {
            Some(table) => Some(table),
            None if file_configs.template_file.is_none() => Some(TableData {
                column_names: vec![query_name.to_string()],
                rows: Vec::new(),
            }),
            None => None,
        };
        if let Some(table) = &projection {
            project_table(&mut package, table, self.ids)?;
        }

        update_doc_props(&mut package, file_configs.doc_props.as_ref(), self.now)?;

        let bytes = package.finish()?;
        info!(
            query = query_name,
            connection_id = %binding.connection_id,
            bytes = bytes.len(),
            "generated single-query workbook"
        );
        Ok(bytes)
    }

    /// Workbook holding `grid` as a plain table.
    pub fn table_from_grid(&self, grid: &Grid, file_configs: &FileConfigs) -> Result<Vec<u8>> {
        if file_configs.template_file.is_some() {
            return Err(ValidationError::TemplateWithInitialData.into());
        }
        let table = parse_to_table_data(grid)?;
        let mut package = ZipPackage::load(blank_table_template()?)?;

        if let Some(settings) = &file_configs.template_settings {
            apply_template_settings(&mut package, settings)?;
        }
        project_table(&mut package, &table, self.ids)?;
        update_doc_props(&mut package, file_configs.doc_props.as_ref(), self.now)?;

        let bytes = package.finish()?;
        info!(
            columns = table.column_names.len(),
            rows = table.rows.len(),
            bytes = bytes.len(),
            "generated table workbook"
        );
        Ok(bytes)
    }
}

/// Generate a workbook whose table is loaded by `query`.
///
/// `initial_grid` seeds the table so the workbook shows data before the first
/// refresh. It cannot be combined with a custom template.
pub fn generate_single_query_workbook(
    query: &QueryInfo,
    initial_grid: Option<&Grid>,
    file_configs: &FileConfigs,
) -> Result<Vec<u8>> {
    WorkbookGenerator::new(&UuidV4Generator, Utc::now()).single_query(
        query,
        initial_grid,
        file_configs,
    )
}

/// Generate a workbook holding `grid` as a table, without a query.
pub fn generate_table_workbook_from_grid(grid: &Grid, file_configs: &FileConfigs) -> Result<Vec<u8>> {
    WorkbookGenerator::new(&UuidV4Generator, Utc::now()).table_from_grid(grid, file_configs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, XlconnectError};
    use crate::id_gen::SequentialIdGenerator;
    use crate::mashup::MashupContainer;
    use crate::namespaces::{CONNECTIONS_XML, TABLE_XML};
    use crate::package::Archive;
    use chrono::TimeZone;

    fn generator(ids: &SequentialIdGenerator) -> WorkbookGenerator<'_> {
        WorkbookGenerator::new(ids, Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap())
    }

    #[test]
    fn test_single_query_defaults() {
        let ids = SequentialIdGenerator::default();
        let query = QueryInfo::new("let\r\n    Source = 1\r\nin\r\n    Source");
        let bytes = generator(&ids)
            .single_query(&query, None, &FileConfigs::default())
            .unwrap();

        let mut pkg = ZipPackage::load(bytes).unwrap();
        let part = read_mashup_part(&mut pkg).unwrap();
        let container = MashupContainer::decode(&part.base64).unwrap();
        assert!(container.formula().unwrap().contains("shared #\"Query1\" = "));
        let table = pkg.read_text(TABLE_XML).unwrap().unwrap();
        assert!(table.contains(r#"name="Query1" queryTableFieldId="1""#));
    }

    #[test]
    fn test_validation_before_any_work() {
        let ids = SequentialIdGenerator::default();
        let gen = generator(&ids);

        let err = gen
            .single_query(&QueryInfo::new("  "), None, &FileConfigs::default())
            .unwrap_err();
        assert!(matches!(
            err,
            XlconnectError::Validation(ValidationError::EmptyQueryMashup)
        ));

        let err = gen
            .single_query(
                &QueryInfo::new("1").with_name("a.b"),
                None,
                &FileConfigs::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let configs = FileConfigs {
            template_file: Some(vec![1, 2, 3]),
            ..FileConfigs::default()
        };
        let grid = Grid::from_strings([["a"]]);
        let err = gen
            .single_query(&QueryInfo::new("1"), Some(&grid), &configs)
            .unwrap_err();
        assert!(matches!(
            err,
            XlconnectError::Validation(ValidationError::TemplateWithInitialData)
        ));
    }

    #[test]
    fn test_table_from_grid() {
        let ids = SequentialIdGenerator::default();
        let grid = Grid::from_strings([["a", "b"], ["1", "2"]]);
        let bytes = generator(&ids)
            .table_from_grid(&grid, &FileConfigs::default())
            .unwrap();
        let mut pkg = ZipPackage::load(bytes).unwrap();
        assert!(!pkg.contains(CONNECTIONS_XML));
        let table = pkg.read_text(TABLE_XML).unwrap().unwrap();
        assert!(table.contains(r#"ref="A1:B3""#));
    }
}
