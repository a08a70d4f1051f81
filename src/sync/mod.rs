//! Keeps the OOXML parts around an embedded query in agreement.
//!
//! [`wire_query_to_sheet`] runs the four steps in order against one owned
//! archive: connection, shared string, worksheet cell, query table or pivot
//! cache binding. A failing step leaves earlier writes in the archive; callers
//! discard the archive on error.

pub mod binding;
pub mod connections;
pub mod doc_props;
pub mod settings;
pub mod shared_strings;
pub mod worksheet;

use tracing::debug;

use crate::error::{Part, Result};
use crate::package::Archive;
use crate::types::ConnectionBinding;
use crate::xml_dom::XmlDocument;

pub use binding::bind_connection;
pub use connections::update_connection;
pub use doc_props::update_doc_props;
pub use settings::apply_template_settings;
pub use shared_strings::{add_shared_string, SharedStrings};
pub use worksheet::set_query_name_cell;

/// Point the template's single connection, its query table (or pivot cache)
/// and the sheet's query-name cell at `query_name`.
pub fn wire_query_to_sheet<A: Archive + ?Sized>(
    archive: &mut A,
    query_name: &str,
    refresh_on_load: bool,
) -> Result<ConnectionBinding> {
    let connection_id = update_connection(archive, query_name, refresh_on_load)?;
    debug!(connection_id = %connection_id, "updated connection");

    let index = add_shared_string(archive, query_name)?;
    debug!(index, "resolved shared string");

    set_query_name_cell(archive, index)?;

    bind_connection(archive, &connection_id, refresh_on_load)?;
    debug!(connection_id = %connection_id, "bound connection");

    Ok(ConnectionBinding {
        connection_id,
        query_name: query_name.to_string(),
        refresh_on_load,
    })
}

/// Parse a required part, mapping absence to `missing`.
pub(crate) fn load_part<A: Archive + ?Sized>(
    archive: &mut A,
    path: &str,
    missing: Part,
) -> Result<XmlDocument> {
    let xml = archive.read_text(path)?.ok_or(missing)?;
    XmlDocument::parse(&xml)
}

/// Parse a part that may be absent.
pub(crate) fn load_optional_part<A: Archive + ?Sized>(
    archive: &mut A,
    path: &str,
) -> Result<Option<XmlDocument>> {
    archive
        .read_text(path)?
        .map(|xml| XmlDocument::parse(&xml))
        .transpose()
}

pub(crate) fn save_part<A: Archive + ?Sized>(
    archive: &mut A,
    path: &str,
    doc: &XmlDocument,
) -> Result<()> {
    archive.write_text(path, &doc.to_xml_string()?);
    Ok(())
}

/// `"1"` / `"0"` as used by boolean OOXML attributes.
pub(crate) fn xml_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
