//! `docProps/core.xml`: document properties and timestamps.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Part, Result};
use crate::namespaces::DOC_PROPS_CORE_XML;
use crate::package::Archive;
use crate::types::DocProps;
use crate::xml_dom::Element;

use super::{load_part, save_part};

/// Write the provided properties and stamp `created`/`modified` with `now`.
pub fn update_doc_props<A: Archive + ?Sized>(
    archive: &mut A,
    doc_props: Option<&DocProps>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut doc = load_part(archive, DOC_PROPS_CORE_XML, Part::DocProps)?;
    let root = &mut doc.root;

    let entries = doc_props.map(DocProps::entries).unwrap_or_default();
    for (name, value) in &entries {
        if let Some(element) = upsert(root, name) {
            element.set_text(*value);
        }
    }

    let stamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    for name in ["dcterms:created", "dcterms:modified"] {
        if let Some(element) = upsert(root, name) {
            if element.attr("xsi:type").is_none() {
                element.set_attr("xsi:type", "dcterms:W3CDTF");
            }
            element.set_text(stamp.as_str());
        }
    }
    debug!(properties = entries.len(), "updated document properties");

    save_part(archive, DOC_PROPS_CORE_XML, &doc)
}

/// Existing child named exactly `name`, or a new one appended to `root`.
fn upsert<'a>(root: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    if !root.child_elements().any(|e| e.name == name) {
        root.push_child(Element::new(name));
    }
    root.child_elements_mut().find(|e| e.name == name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::package::ZipPackage;
    use crate::template::single_query_template;
    use crate::xml_dom::XmlDocument;
    use chrono::TimeZone;

    #[test]
    fn test_props_written_and_timestamps_refreshed() {
        let mut pkg = ZipPackage::load(single_query_template().unwrap()).unwrap();
        let props = DocProps {
            title: Some("Sales & Costs".into()),
            created_by: Some("Finance".into()),
            revision: Some("3".into()),
            ..DocProps::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
        update_doc_props(&mut pkg, Some(&props), now).unwrap();

        let xml = pkg.read_text(DOC_PROPS_CORE_XML).unwrap().unwrap();
        let doc = XmlDocument::parse(&xml).unwrap();
        assert_eq!(doc.root.child("title").unwrap().text(), "Sales & Costs");
        assert_eq!(doc.root.child("creator").unwrap().text(), "Finance");
        assert_eq!(doc.root.child("revision").unwrap().name, "cp:revision");
        assert_eq!(doc.root.count_children("creator"), 1);
        for name in ["created", "modified"] {
            let el = doc.root.child(name).unwrap();
            assert_eq!(el.text(), "2024-02-29T12:30:00Z");
            assert_eq!(el.attr("xsi:type"), Some("dcterms:W3CDTF"));
        }
    }

    #[test]
    fn test_missing_core_part() {
        let mut pkg = ZipPackage::load(
            crate::template::build_package_zip(&[("a.xml", "<a/>")]).unwrap(),
        )
        .unwrap();
        let err = update_doc_props(&mut pkg, None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::XlconnectError::PartNotFound(Part::DocProps)
        ));
    }
}
