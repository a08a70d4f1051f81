//! The custom XML part that carries the base64 mashup.
//!
//! Excel writes it as UTF-16LE with a byte-order mark:
//! `<?xml version="1.0" encoding="utf-16"?><DataMashup xmlns="…">BASE64</DataMashup>`.
//! UTF-8 parts are accepted on read.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use tracing::debug;

use crate::error::{Part, Result};
use crate::namespaces::{CUSTOM_XML_DIR, NS_DATA_MASHUP};
use crate::package::{Archive, EntryOptions};
use crate::xml_dom::XmlDocument;

/// Location and payload of the mashup part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MashupPart {
    pub path: String,
    pub base64: String,
}

/// Find the `customXml/item*.xml` part whose root is `DataMashup`.
pub fn read_mashup_part<A: Archive + ?Sized>(archive: &mut A) -> Result<MashupPart> {
    let candidates: Vec<String> = archive
        .entry_names()
        .into_iter()
        .filter(|name| is_custom_xml_item(name))
        .collect();

    for path in candidates {
        let Some(bytes) = archive.read_bytes(&path)? else {
            continue;
        };
        let xml = decode_xml_bytes(&bytes);
        let Ok(doc) = XmlDocument::parse(&xml) else {
            continue;
        };
        if doc.root.matches("DataMashup") {
            debug!(path = %path, "found DataMashup part");
            let base64: String = doc.root.text().split_whitespace().collect();
            return Ok(MashupPart { path, base64 });
        }
    }
    Err(Part::Mashup.into())
}

/// Write `base64` back as a UTF-16LE `DataMashup` document at `path`.
pub fn write_mashup_part<A: Archive + ?Sized>(archive: &mut A, path: &str, base64: &str) {
    let xml = mashup_xml(base64);
    archive.write_entry(path, encode_utf16le_with_bom(&xml), EntryOptions::default());
}

/// The `DataMashup` document text for a base64 payload.
#[must_use]
pub fn mashup_xml(base64: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-16"?><DataMashup xmlns="{NS_DATA_MASHUP}">{base64}</DataMashup>"#
    )
}

fn is_custom_xml_item(name: &str) -> bool {
    name.strip_prefix(CUSTOM_XML_DIR)
        .is_some_and(|file| file.starts_with("item") && !file.contains('/') && file.ends_with(".xml"))
        && !name.contains("itemProps")
}

/// Decode XML bytes by byte-order mark, falling back to a UTF-16 sniff, then UTF-8.
#[must_use]
pub fn decode_xml_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = bytes.get(bom_len..).unwrap_or_default();
        return encoding.decode_without_bom_handling(body).0.into_owned();
    }
    let encoding = match bytes {
        [b'<', 0, b'?', 0, ..] => UTF_16LE,
        [0, b'<', 0, b'?', ..] => UTF_16BE,
        _ => UTF_8,
    };
    encoding.decode_without_bom_handling(bytes).0.into_owned()
}

/// UTF-16LE bytes with a leading byte-order mark.
#[must_use]
pub fn encode_utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFF, 0xFE]);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, XlconnectError};
    use crate::package::ZipPackage;
    use crate::template::build_package_zip;

    #[test]
    fn test_utf16_roundtrip() {
        let xml = mashup_xml("QUJD");
        let bytes = encode_utf16le_with_bom(&xml);
        assert_eq!(&bytes[..4], &[0xFF, 0xFE, b'<', 0]);
        assert_eq!(decode_xml_bytes(&bytes), xml);
    }

    #[test]
    fn test_utf16_without_bom_is_sniffed() {
        let bytes = encode_utf16le_with_bom("<?xml version=\"1.0\"?><a/>");
        assert_eq!(decode_xml_bytes(&bytes[2..]), "<?xml version=\"1.0\"?><a/>");
    }

    #[test]
    fn test_read_and_write_part() {
        let zip = build_package_zip(&[
            ("customXml/item1.xml", "<b:Sources xmlns:b=\"x\"/>"),
            ("customXml/itemProps2.xml", "<ds:datastoreItem xmlns:ds=\"y\"/>"),
            ("customXml/item2.xml", "<DataMashup xmlns=\"http://schemas.microsoft.com/DataMashup\">QU\n JD</DataMashup>"),
        ])
        .unwrap();
        let mut pkg = ZipPackage::load(zip).unwrap();
        let part = read_mashup_part(&mut pkg).unwrap();
        assert_eq!(part.path, "customXml/item2.xml");
        assert_eq!(part.base64, "QUJD");

        write_mashup_part(&mut pkg, &part.path, "REVG");
        let again = read_mashup_part(&mut pkg).unwrap();
        assert_eq!(again.base64, "REVG");
        let raw = pkg.read_bytes(&part.path).unwrap().unwrap();
        assert_eq!(&raw[..2], &[0xFF, 0xFE]);
    }

    #[test]
    fn test_missing_part() {
        let zip = build_package_zip(&[("xl/workbook.xml", "<workbook/>")]).unwrap();
        let mut pkg = ZipPackage::load(zip).unwrap();
        let err = read_mashup_part(&mut pkg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartNotFound);
        assert!(matches!(err, XlconnectError::PartNotFound(Part::Mashup)));
    }
}
