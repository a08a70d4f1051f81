//! The metadata block of the mashup container.
//!
//! Layout: 4-byte version, `i32` XML size `X`, `X` bytes of UTF-8 XML, trailer.
//! The XML lists `Item`s addressed by `ItemPath` (`Section1/<query>[/<step>]`)
//! and `Entry Type=… Value=…` settings that bind the query result to the sheet.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::byte_framer::{concat, size_field, ByteReader};
use crate::error::{Result, XlconnectError};
use crate::namespaces::SECTION1_PATH_PREFIX;
use crate::xml_dom::XmlDocument;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `Entry` types rewritten for a renamed query.
pub mod entry_type {
    pub const RESULT_TYPE: &str = "ResultType";
    pub const FILL_TARGET: &str = "FillTarget";
    pub const FILL_COLUMN_NAMES: &str = "FillColumnNames";
    pub const FILL_LAST_UPDATED: &str = "FillLastUpdated";
    pub const RELATIONSHIP_INFO: &str = "RelationshipInfoContainer";
}

/// Value written to the `ResultType` entry: the query loads into a table.
pub const RESULT_TYPE_TABLE: &str = "sTable";

static QUERY_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"Section1/[^/]+/").ok());

/// What to write into the metadata for the current query.
#[derive(Debug, Clone, Copy)]
pub struct MetadataUpdate<'a> {
    pub query_name: &'a str,
    /// Result columns, when known from the initial data.
    pub column_names: Option<&'a [String]>,
    /// Stamp for `FillLastUpdated`.
    pub now: DateTime<Utc>,
}

impl<'a> MetadataUpdate<'a> {
    #[must_use]
    pub fn new(query_name: &'a str, now: DateTime<Utc>) -> Self {
        Self {
            query_name,
            column_names: None,
            now,
        }
    }

    #[must_use]
    pub fn with_columns(mut self, column_names: &'a [String]) -> Self {
        self.column_names = Some(column_names);
        self
    }
}

/// Decoded metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    pub version: [u8; 4],
    pub xml: String,
    /// Whether the XML bytes started with a UTF-8 byte-order mark.
    pub xml_bom: bool,
    pub trailer: Vec<u8>,
}

impl MetadataBlock {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_array4()?;
        let xml_bytes = reader.read_sized()?;
        let trailer = reader.read_to_end().to_vec();

        let (xml_bom, body) = match xml_bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, xml_bytes),
        };
        let xml = std::str::from_utf8(body)
            .map_err(|e| {
                XlconnectError::MalformedContainer(format!("metadata XML is not UTF-8: {e}"))
            })?
            .to_string();
        Ok(Self {
            version,
            xml,
            xml_bom,
            trailer,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bom: &[u8] = if self.xml_bom { UTF8_BOM } else { &[] };
        let xml = concat(&[bom, self.xml.as_bytes()]);
        Ok(concat(&[
            &self.version,
            &size_field(xml.len())?,
            &xml,
            &self.trailer,
        ]))
    }

    /// Rewrite item paths and entries for the query in `update`.
    pub fn apply(&mut self, update: &MetadataUpdate<'_>) -> Result<()> {
        let mut doc = XmlDocument::parse(&self.xml)?;
        let encoded_name = encode_uri_component(update.query_name);

        let mut paths = 0usize;
        doc.root.for_each_mut("ItemPath", &mut |item| {
            let content = item.text();
            if !content.starts_with(SECTION1_PATH_PREFIX) {
                return;
            }
            let mut segments: Vec<&str> = content.split('/').collect();
            if let Some(segment) = segments.get_mut(1) {
                *segment = encoded_name.as_str();
                let rewritten = segments.join("/");
                item.set_text(rewritten);
                paths += 1;
            }
        });

        let mut entries = 0usize;
        let mut failure = None;
        doc.root.for_each_mut("Entry", &mut |entry| {
            let value: Option<serde_json::Result<String>> = match entry.attr("Type") {
                Some(entry_type::FILL_LAST_UPDATED) => Some(Ok(fill_last_updated(update.now))),
                Some(entry_type::RESULT_TYPE) => Some(Ok(RESULT_TYPE_TABLE.to_string())),
                Some(entry_type::FILL_TARGET) => Some(Ok(format!("s{}", update.query_name))),
                Some(entry_type::FILL_COLUMN_NAMES) => update
                    .column_names
                    .map(|names| serde_json::to_string(names).map(|json| format!("s{json}"))),
                Some(entry_type::RELATIONSHIP_INFO) => match update.column_names {
                    Some(names) => Some(relationship_info(update.query_name, names)),
                    None => entry
                        .attr("Value")
                        .map(|v| Ok(rename_query_segments(v, update.query_name))),
                },
                _ => None,
            };
            match value {
                Some(Ok(v)) => {
                    entry.set_attr("Value", v);
                    entries += 1;
                }
                Some(Err(e)) => failure = Some(e),
                None => {}
            }
        });
        if let Some(e) = failure {
            return Err(e.into());
        }

        if paths == 0 {
            warn!("metadata has no Section1 item paths");
        }
        if entries == 0 {
            warn!("metadata has no fill entries to update");
        }
        debug!(paths, entries, "updated mashup metadata");

        self.xml = doc.to_xml_string()?;
        Ok(())
    }
}

fn fill_last_updated(now: DateTime<Utc>) -> String {
    now.format("d%Y-%m-%dT%H:%M:%S%.3f0000Z").to_string()
}

fn rename_query_segments(value: &str, query_name: &str) -> String {
    let pattern: &Option<Regex> = &QUERY_SEGMENT;
    match pattern {
        Some(re) => re
            .replace_all(value, regex::NoExpand(&format!("Section1/{query_name}/")))
            .into_owned(),
        None => value.to_string(),
    }
}

#[derive(Serialize)]
struct RelationshipInfo<'a> {
    #[serde(rename = "columnCount")]
    column_count: usize,
    #[serde(rename = "keyColumnNames")]
    key_column_names: [&'a str; 0],
    #[serde(rename = "queryRelationships")]
    query_relationships: [&'a str; 0],
    #[serde(rename = "columnIdentities")]
    column_identities: &'a [String],
    #[serde(rename = "ColumnCount")]
    column_count_legacy: usize,
    #[serde(rename = "KeyColumnNames")]
    key_column_names_legacy: [&'a str; 0],
    #[serde(rename = "ColumnIdentities")]
    column_identities_legacy: &'a [String],
    #[serde(rename = "RelationshipInfo")]
    relationship_info: [&'a str; 0],
}

fn relationship_info(query_name: &str, column_names: &[String]) -> serde_json::Result<String> {
    let identities: Vec<String> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("Section1/{query_name}/AutoRemovedColumns1.{{{name},{i}}}"))
        .collect();
    let info = RelationshipInfo {
        column_count: column_names.len(),
        key_column_names: [],
        query_relationships: [],
        column_identities: &identities,
        column_count_legacy: column_names.len(),
        key_column_names_legacy: [],
        column_identities_legacy: &identities,
        relationship_info: [],
    };
    serde_json::to_string(&info).map(|json| format!("s{json}"))
}

/// Percent-encode like JavaScript's `encodeURIComponent`.
#[must_use]
pub fn encode_uri_component(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}
