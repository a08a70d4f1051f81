//! `xl/sharedStrings.xml` lookups and appends.

use crate::error::{Part, Result};
use crate::namespaces::SHARED_STRINGS_XML;
use crate::package::Archive;
use crate::xml_dom::{Element, XmlDocument};

use super::{load_part, save_part};

/// The shared string table of a package, loaded for editing.
#[derive(Debug, Clone)]
pub struct SharedStrings {
    doc: XmlDocument,
    added: usize,
}

impl SharedStrings {
    pub fn load<A: Archive + ?Sized>(archive: &mut A) -> Result<Self> {
        let doc = load_part(archive, SHARED_STRINGS_XML, Part::SharedStrings)?;
        Ok(Self { doc, added: 0 })
    }

    /// 1-based position of an item whose text equals `text`.
    #[must_use]
    pub fn position(&self, text: &str) -> Option<usize> {
        self.doc
            .root
            .child_elements()
            .filter(|e| e.matches("si"))
            .position(|si| si.text() == text)
            .map(|i| i + 1)
    }

    /// 1-based position of `text`, appending a new item when it is absent.
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(index) = self.position(text) {
            return index;
        }
        self.doc
            .root
            .push_child(Element::new("si").with_child(Element::new("t").with_text(text)));
        self.added += 1;
        self.doc.root.count_children("si")
    }

    /// Write the table back when anything was appended.
    pub fn save<A: Archive + ?Sized>(mut self, archive: &mut A) -> Result<()> {
        if self.added == 0 {
            return Ok(());
        }
        let unique = self.doc.root.count_children("si");
        let count = self
            .doc
            .root
            .attr("count")
            .and_then(|c| c.parse::<usize>().ok())
            .map_or(unique, |c| c + self.added);
        self.doc.root.set_attr("count", count.to_string());
        self.doc.root.set_attr("uniqueCount", unique.to_string());
        save_part(archive, SHARED_STRINGS_XML, &self.doc)
    }
}

/// 1-based index of `text` in the shared string table, appending it if needed.
pub fn add_shared_string<A: Archive + ?Sized>(archive: &mut A, text: &str) -> Result<usize> {
    let mut table = SharedStrings::load(archive)?;
    let index = table.intern(text);
    table.save(archive)?;
    Ok(index)
}
