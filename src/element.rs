//! XML element trees
//!
//! The output unit of every builder: a qualified name, an ordered attribute
//! list, optional text content and an ordered child sequence. Child and
//! attribute order is insertion order and is never re-sorted; the assemblers
//! rely on this to reproduce the schema-declared sequence order exactly.

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::Result;
use crate::namespaces::{split_qualified, QName};

/// XML element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified element name
    pub qname: QName,
    /// Ordered attributes; names may be prefixed (`gml:id`) or plain
    /// (`codeSpace`, `uom`), xmlns declarations included
    pub attributes: Vec<(String, String)>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements in schema order
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder-style: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder-style: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute
    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Add a child element, taking ownership of its subtree
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Position of the first direct child with the given local name
    pub fn child_position(&self, local_name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.local_name() == local_name)
    }

    /// First direct child with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local_name)
    }

    /// Insert a child at the given position, shifting later children
    pub fn insert_child(&mut self, index: usize, child: Element) {
        self.children.insert(index, child);
    }

    /// Pre-order mutable walk over this element and all descendants
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// First element (self included, pre-order) matching the predicate
    pub fn find_mut(&mut self, pred: &impl Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Whether any element in the subtree (self included) matches
    pub fn any(&self, pred: &impl Fn(&Element) -> bool) -> bool {
        pred(self) || self.children.iter().any(|c| c.any(pred))
    }

    /// Serialize the subtree to UTF-8 XML, indented with 2 spaces
    pub fn to_bytes(&self, xml_decl: bool) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        if xml_decl {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        self.write_into(&mut writer)?;
        Ok(writer.into_inner())
    }

    /// Serialize and write to a file in one scoped operation
    ///
    /// The handle is released on every exit path; nothing is written when
    /// serialization fails.
    pub fn write_to_file(&self, path: impl AsRef<Path>, xml_decl: bool) -> Result<()> {
        let bytes = self.to_bytes(xml_decl)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn write_into<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let name = self.qname.qualified();
        let mut start = BytesStart::new(name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }

    /// Parse a serialized document back into an element tree
    ///
    /// Used by the delete transform. Prefixes and the full ordered attribute
    /// list (xmlns declarations included) are kept as-is so a re-serialize
    /// is faithful to the input document.
    pub fn parse(xml: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    stack.push(Self::from_start(&e)?);
                }
                Event::End(_) => {
                    if let Some(current) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            root = Some(current);
                        }
                    }
                }
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        root = Some(element);
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e.unescape()?.to_string();
                        if !text.trim().is_empty() {
                            current.set_text(text);
                        }
                    }
                }
                Event::Eof => break,
                _ => {} // comments, processing instructions, declarations
            }
            buf.clear();
        }

        root.ok_or_else(|| {
            quick_xml::Error::UnexpectedEof("no root element in document".to_string()).into()
        })
    }

    fn from_start(start: &BytesStart) -> Result<Element> {
        let tag = decode_utf8(start.name().as_ref())?;
        let (prefix, local) = split_qualified(&tag);
        let qname = match prefix {
            Some(p) => QName::prefixed(p, local),
            None => QName::local(local),
        };

        let mut element = Element::new(qname);
        for attr_result in start.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::from)?;
            let name = decode_utf8(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?.to_string();
            element.push_attr(name, value);
        }
        Ok(element)
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|e| quick_xml::Error::NonDecodable(Some(e)).into())
}
