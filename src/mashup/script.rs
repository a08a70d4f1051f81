//! Section document text for a single shared query.

/// Wrap a query body into the `Section1` document Excel expects.
///
/// The name is emitted as a quoted identifier (`#"name"`) so any characters
/// that passed name validation are safe.
#[must_use]
pub fn generate_single_query_mashup(query_name: &str, query_body: &str) -> String {
    format!(
        "section Section1;\r\n\r\nshared #\"{}\" = \r\n{};",
        query_name.replace('"', "\"\""),
        query_body
    )
}
