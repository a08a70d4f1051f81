//! Owned XML tree built on quick-xml.
//!
//! Template parts are parsed into an [`XmlDocument`], mutated in place and
//! serialized back. Element lookups match on the local name, so `x:sheet`
//! and `sheet` are the same element for every helper here.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, XlconnectError};

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed document: optional declaration plus a single root element.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    decl: Option<BytesDecl<'static>>,
    pub root: Element,
}

/// Local part of a possibly prefixed name.
#[inline]
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style text setter.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by exact (qualified) key.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.attributes.push((key.to_string(), value));
        }
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First direct child with the given local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.matches(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.matches(local))
    }

    /// First element with the given local name in document order, `self` included.
    #[must_use]
    pub fn find(&self, local: &str) -> Option<&Element> {
        if self.matches(local) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find(local))
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        if self.matches(local) {
            return Some(self);
        }
        self.child_elements_mut().find_map(|c| c.find_mut(local))
    }

    /// Parent of the first element with the given local name.
    pub fn find_parent_mut(&mut self, local: &str) -> Option<&mut Element> {
        let idx = self.children.iter().position(|n| match n {
            Node::Element(e) => e.find(local).is_some(),
            _ => false,
        })?;
        let holds_directly = matches!(self.children.get(idx), Some(Node::Element(e)) if e.matches(local));
        if holds_directly {
            return Some(self);
        }
        match self.children.get_mut(idx) {
            Some(Node::Element(e)) => e.find_parent_mut(local),
            _ => None,
        }
    }

    /// All elements with the given local name in document order, `self` included.
    #[must_use]
    pub fn find_all(&self, local: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(local, &mut out);
        out
    }

    fn collect<'a>(&'a self, local: &str, out: &mut Vec<&'a Element>) {
        if self.matches(local) {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect(local, out);
        }
    }

    /// Visit every element with the given local name, `self` included.
    pub fn for_each_mut<F: FnMut(&mut Element)>(&mut self, local: &str, f: &mut F) {
        if self.matches(local) {
            f(self);
        }
        for child in self.child_elements_mut() {
            child.for_each_mut(local, f);
        }
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Comment(_) | Node::ProcessingInstruction(_) => {}
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Remove every direct child element with the given local name.
    pub fn remove_children(&mut self, local: &str) {
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.matches(local)));
    }

    /// Number of direct child elements with the given local name.
    #[must_use]
    pub fn count_children(&self, local: &str) -> usize {
        self.child_elements().filter(|e| e.matches(local)).count()
    }
}

impl XmlDocument {
    /// Parse a complete document with a single root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut decl = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Decl(d) => decl = Some(d.into_owned()),
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        XlconnectError::Xml(quick_xml::Error::UnexpectedToken(
                            "unbalanced end tag".into(),
                        ))
                    })?;
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Event::Text(t) => {
                    if !stack.is_empty() {
                        let text = t.unescape()?.into_owned();
                        attach(&mut stack, &mut root, Node::Text(text))?;
                    }
                }
                Event::CData(c) => {
                    if !stack.is_empty() {
                        let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                        attach(&mut stack, &mut root, Node::CData(text))?;
                    }
                }
                Event::Comment(c) => {
                    if !stack.is_empty() {
                        let text = String::from_utf8_lossy(&c).into_owned();
                        attach(&mut stack, &mut root, Node::Comment(text))?;
                    }
                }
                Event::PI(p) => {
                    if !stack.is_empty() {
                        let text = String::from_utf8_lossy(&p).into_owned();
                        attach(&mut stack, &mut root, Node::ProcessingInstruction(text))?;
                    }
                }
                Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(XlconnectError::Xml(quick_xml::Error::UnexpectedEof(
                "unclosed element".into(),
            )));
        }
        let root = root.ok_or_else(|| {
            XlconnectError::Xml(quick_xml::Error::UnexpectedEof("no root element".into()))
        })?;
        Ok(Self { decl, root })
    }

    /// Document with a standard `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>` header.
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self {
            decl: Some(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
            root,
        }
    }

    /// Serialize back to a string, declaration first.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        if let Some(decl) = &self.decl {
            writer.write_event(Event::Decl(decl.clone()))?;
            writer.get_mut().extend_from_slice(b"\r\n");
        }
        write_element(&mut writer, &self.root)?;
        String::from_utf8(writer.into_inner()).map_err(|e| {
            XlconnectError::Xml(quick_xml::Error::NonDecodable(Some(e.utf8_error())))
        })
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element> {
    let mut el = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<str> = attr.unescape_value()?;
        el.attributes.push((key, value.into_owned()));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(el) if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        Node::Element(_) => Err(XlconnectError::Xml(quick_xml::Error::UnexpectedToken(
            "multiple root elements".into(),
        ))),
        _ => Ok(()),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(c) => writer.write_event(Event::CData(BytesCData::new(c.as_str())))?,
            Node::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
            }
            Node::ProcessingInstruction(p) => {
                writer.write_event(Event::PI(BytesText::from_escaped(p.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
