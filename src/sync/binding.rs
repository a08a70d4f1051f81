//! Finds the query table or pivot cache fed by a connection.
//!
//! Every query table carrying the connection id is updated. Pivot caches are
//! only consulted when no query table matched, and the first match wins.

use tracing::{debug, warn};

use crate::error::{Result, XlconnectError};
use crate::namespaces::{PIVOT_CACHES_DIR, PIVOT_CACHE_DEFINITION_PREFIX, QUERY_TABLES_DIR};
use crate::package::Archive;

use super::{load_optional_part, save_part, xml_bool};

/// Set `refreshOnLoad` on whatever consumes `connection_id`.
pub fn bind_connection<A: Archive + ?Sized>(
    archive: &mut A,
    connection_id: &str,
    refresh_on_load: bool,
) -> Result<()> {
    if bind_query_tables(archive, connection_id, refresh_on_load)? > 0 {
        return Ok(());
    }
    if bind_pivot_cache(archive, connection_id, refresh_on_load)? {
        return Ok(());
    }
    Err(XlconnectError::CrossReferenceNotFound {
        connection_id: connection_id.to_string(),
    })
}

/// Parts directly inside `dir` whose file name starts with `prefix`.
fn parts_in(names: Vec<String>, dir: &str, prefix: &str) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| {
            name.strip_prefix(dir).is_some_and(|file| {
                !file.contains('/') && file.starts_with(prefix) && file.ends_with(".xml")
            })
        })
        .collect()
}

fn bind_query_tables<A: Archive + ?Sized>(
    archive: &mut A,
    connection_id: &str,
    refresh_on_load: bool,
) -> Result<usize> {
    let mut matched = 0usize;
    for path in parts_in(archive.entry_names(), QUERY_TABLES_DIR, "") {
        let Some(mut doc) = load_optional_part(archive, &path)? else {
            continue;
        };
        let Some(query_table) = doc.root.find_mut("queryTable") else {
            warn!(path = %path, "query table part has no queryTable element");
            continue;
        };
        if query_table.attr("connectionId") != Some(connection_id) {
            continue;
        }
        query_table.set_attr("refreshOnLoad", xml_bool(refresh_on_load));
        save_part(archive, &path, &doc)?;
        debug!(path = %path, "bound query table");
        matched += 1;
    }
    Ok(matched)
}

fn bind_pivot_cache<A: Archive + ?Sized>(
    archive: &mut A,
    connection_id: &str,
    refresh_on_load: bool,
) -> Result<bool> {
    let paths = parts_in(
        archive.entry_names(),
        PIVOT_CACHES_DIR,
        PIVOT_CACHE_DEFINITION_PREFIX,
    );
    for path in paths {
        let Some(mut doc) = load_optional_part(archive, &path)? else {
            continue;
        };
        let bound = doc
            .root
            .find("cacheSource")
            .is_some_and(|source| source.attr("connectionId") == Some(connection_id));
        if !bound {
            continue;
        }
        if let Some(definition) = doc.root.find_parent_mut("cacheSource") {
            definition.set_attr("refreshOnLoad", xml_bool(refresh_on_load));
        }
        save_part(archive, &path, &doc)?;
        debug!(path = %path, "bound pivot cache");
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::package::ZipPackage;
    use crate::template::build_package_zip;

    fn package(entries: &[(&str, &str)]) -> ZipPackage {
        ZipPackage::load(build_package_zip(entries).unwrap()).unwrap()
    }

    const PIVOT_1: &str = r#"<pivotCacheDefinition r:id="rId1" xmlns:r="r"><cacheSource type="external" connectionId="1"/></pivotCacheDefinition>"#;

    #[test]
    fn test_every_matching_query_table_updated() {
        let mut pkg = package(&[
            ("xl/queryTables/queryTable1.xml", r#"<queryTable name="A" connectionId="1"/>"#),
            ("xl/queryTables/queryTable2.xml", r#"<queryTable name="B" connectionId="2"/>"#),
            ("xl/queryTables/queryTable3.xml", r#"<queryTable name="C" connectionId="1"/>"#),
            ("xl/pivotCache/pivotCacheDefinition1.xml", PIVOT_1),
        ]);
        bind_connection(&mut pkg, "1", true).unwrap();

        for (path, expected) in [
            ("xl/queryTables/queryTable1.xml", true),
            ("xl/queryTables/queryTable2.xml", false),
            ("xl/queryTables/queryTable3.xml", true),
        ] {
            let xml = pkg.read_text(path).unwrap().unwrap();
            assert_eq!(xml.contains(r#"refreshOnLoad="1""#), expected, "{path}");
        }
        // query tables matched, so pivot caches are left alone
        let pivot = pkg.read_text("xl/pivotCache/pivotCacheDefinition1.xml").unwrap().unwrap();
        assert!(!pivot.contains("refreshOnLoad"));
    }

    #[test]
    fn test_pivot_cache_first_match_wins() {
        let mut pkg = package(&[
            ("xl/pivotCache/pivotCacheDefinition1.xml", PIVOT_1),
            ("xl/pivotCache/pivotCacheRecords1.xml", r#"<pivotCacheRecords count="0"/>"#),
            ("xl/pivotCache/pivotCacheDefinition2.xml", PIVOT_1),
        ]);
        bind_connection(&mut pkg, "1", false).unwrap();

        let first = pkg.read_text("xl/pivotCache/pivotCacheDefinition1.xml").unwrap().unwrap();
        assert!(first.contains(r#"<pivotCacheDefinition r:id="rId1" xmlns:r="r" refreshOnLoad="0">"#));
        let second = pkg.read_text("xl/pivotCache/pivotCacheDefinition2.xml").unwrap().unwrap();
        assert!(!second.contains("refreshOnLoad"));
    }

    #[test]
    fn test_no_match_is_cross_reference_error() {
        let mut pkg = package(&[
            ("xl/queryTables/queryTable1.xml", r#"<queryTable connectionId="2"/>"#),
            ("xl/pivotCache/pivotCacheDefinition1.xml", PIVOT_1),
        ]);
        let err = bind_connection(&mut pkg, "9", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossReferenceNotFound);
        assert!(err.to_string().contains("connection 9"));
    }
}
