//! `xl/connections.xml`: the OLE DB connection that evaluates the query.

use crate::error::{Part, Result};
use crate::namespaces::CONNECTIONS_XML;
use crate::package::Archive;

use super::{load_part, save_part, xml_bool};

const MASHUP_PROVIDER: &str = "Microsoft.Mashup.OleDb.1";

/// Connection string addressing a query inside the workbook's own mashup.
#[must_use]
pub fn connection_string(query_name: &str) -> String {
    let location = if query_name.contains(';') {
        format!("\"{}\"", query_name.replace('"', "\"\""))
    } else {
        query_name.to_string()
    };
    format!("Provider={MASHUP_PROVIDER};Data Source=$Workbook$;Location={location};")
}

/// `SELECT` command for a query, with `]` doubled inside the bracketed name.
#[must_use]
pub fn select_command(query_name: &str) -> String {
    format!("SELECT * FROM [{}]", query_name.replace(']', "]]"))
}

/// Rewrite the single `dbPr` for `query_name` and return the connection id.
pub fn update_connection<A: Archive + ?Sized>(
    archive: &mut A,
    query_name: &str,
    refresh_on_load: bool,
) -> Result<String> {
    let mut doc = load_part(archive, CONNECTIONS_XML, Part::Connections)?;

    let connection = doc
        .root
        .find_parent_mut("dbPr")
        .ok_or(Part::Connections)?;
    let connection_id = connection
        .attr("id")
        .ok_or(Part::Connections)?
        .to_string();
    connection.set_attr("name", format!("Query - {query_name}"));
    connection.set_attr(
        "description",
        format!("Connection to the '{query_name}' query in the workbook."),
    );

    let db_pr = connection.child_mut("dbPr").ok_or(Part::Connections)?;
    db_pr.set_attr("connection", connection_string(query_name));
    db_pr.set_attr("command", select_command(query_name));
    db_pr.set_attr("refreshOnLoad", xml_bool(refresh_on_load));

    save_part(archive, CONNECTIONS_XML, &doc)?;
    Ok(connection_id)
}
