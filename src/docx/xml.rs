//! Lossless XML element tree for package parts.
//!
//! Parts are parsed into owned elements so paragraphs and runs can be
//! edited in place, then written back. Names keep their namespace prefix
//! (`w:p`, `w:r`) exactly as found in the source part.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Character data (unescaped)
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content (raw)
    Comment(String),
    /// Processing instruction content (raw)
    ProcessingInstruction(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name, e.g. `w:p`
    pub name: String,
    /// Attributes in source order (values unescaped)
    pub attributes: Vec<(String, String)>,
    /// Child nodes in source order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`push_child`](Self::push_child).
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_child(child);
        self
    }

    /// Builder form adding a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or overwrite an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// First direct child element with the given name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct child elements, mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Direct child elements with the given name, mutably.
    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |e| e.name == name)
    }

    /// Positions in `children` of direct child elements named `name`.
    pub fn positions_of(&self, name: &str) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                XmlNode::Element(e) if e.name == name => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Remove every direct child element named `name`.
    pub fn remove_children_named(&mut self, name: &str) {
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.name == name));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            _ => {}
        }
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Root element
    pub root: XmlElement,
}

impl XmlDocument {
    /// Wrap a root element.
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse a part from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::Xml(format!("part is not UTF-8: {}", e)))?;
        // Word writes a BOM-less declaration, but tolerate one.
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = Reader::from_str(text);
        reader.trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(e.unescape()?.into_owned()));
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::CData(content));
                    }
                }
                Event::Comment(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&e).into_owned();
                        parent.children.push(XmlNode::Comment(content));
                    }
                }
                Event::PI(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let content = String::from_utf8_lossy(&e).into_owned();
                        parent
                            .children
                            .push(XmlNode::ProcessingInstruction(content));
                    }
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        root.map(Self::new)
            .ok_or_else(|| Error::Xml("part has no root element".to_string()))
    }

    /// Serialize the part, always with a standalone UTF-8 declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.get_mut().extend_from_slice(b"\r\n");
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlNode::CData(text) => writer.write_event(Event::CData(BytesCData::new(text)))?,
            XmlNode::Comment(raw) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
            }
            XmlNode::ProcessingInstruction(raw) => {
                writer.write_event(Event::PI(BytesText::from_escaped(raw.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(xml: &str) -> XmlDocument {
        let doc = XmlDocument::parse(xml.as_bytes()).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let reparsed = XmlDocument::parse(&bytes).unwrap();
        assert_eq!(doc, reparsed);
        reparsed
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = XmlDocument::parse(
            br#"<?xml version="1.0" encoding="UTF-8"?><w:p a="1"><w:r><w:t>Hi</w:t></w:r><w:r/></w:p>"#,
        )
        .unwrap();

        assert_eq!(doc.root.name, "w:p");
        assert_eq!(doc.root.attr("a"), Some("1"));
        assert_eq!(doc.root.children_named("w:r").count(), 2);
        assert_eq!(doc.root.text_content(), "Hi");
    }

    #[test]
    fn test_entities_are_unescaped_and_reescaped() {
        let doc = roundtrip(r#"<root k="a &amp; &quot;b&quot;"><t>x &lt; y &amp; z</t></root>"#);
        assert_eq!(doc.root.attr("k"), Some("a & \"b\""));
        assert_eq!(doc.root.text_content(), "x < y & z");

        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(out.contains("x &lt; y &amp; z"));
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    }

    #[test]
    fn test_whitespace_and_comments_preserved() {
        let doc = roundtrip("<root><!-- note --><t xml:space=\"preserve\">  two  </t></root>");
        assert!(matches!(doc.root.children[0], XmlNode::Comment(_)));
        assert_eq!(doc.root.text_content(), "  two  ");
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(XmlDocument::parse(b"<root><a></root>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
        assert!(XmlDocument::parse(b"<a/><b/>").is_err());
    }

    #[test]
    fn test_child_helpers() {
        let mut e = XmlElement::new("w:r")
            .with_child(XmlElement::new("w:rPr"))
            .with_child(XmlElement::new("w:t").with_text("a"))
            .with_child(XmlElement::new("w:t").with_text("b"));

        assert_eq!(e.positions_of("w:t"), vec![1, 2]);
        e.remove_children_named("w:t");
        assert_eq!(e.children.len(), 1);
        e.set_attr("k", "1");
        e.set_attr("k", "2");
        assert_eq!(e.attr("k"), Some("2"));
        assert_eq!(e.attributes.len(), 1);
    }
}
