//! Package relationships (`_rels/*.rels` parts).

use super::xml::{XmlDocument, XmlElement};
use crate::error::Result;

pub(crate) const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

/// One relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id (`rId1`)
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target as written in the part
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Relationships of one source part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty relationship set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse(data)?;
        let items = doc
            .root
            .elements()
            .filter(|e| e.name == "Relationship" || e.name.ends_with(":Relationship"))
            .filter_map(|e| {
                Some(Relationship {
                    id: e.attr("Id")?.to_string(),
                    rel_type: e.attr("Type")?.to_string(),
                    target: e.attr("Target")?.to_string(),
                    external: e.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self { items })
    }

    /// Add a relationship.
    pub fn push(&mut self, id: impl Into<String>, rel_type: &str, target: impl Into<String>) {
        self.items.push(Relationship {
            id: id.into(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        });
    }

    /// Relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First internal relationship of the given type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items
            .iter()
            .find(|r| r.rel_type == rel_type && !r.external)
    }

    /// Serialize as a `.rels` part.
    pub fn to_xml(&self) -> XmlDocument {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", RELS_NS);
        for rel in &self.items {
            let mut e = XmlElement::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                e.set_attr("TargetMode", "External");
            }
            root.push_child(e);
        }
        XmlDocument::new(root)
    }
}

/// Name of the relationships part belonging to `part`.
///
/// `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if base.is_empty() {
        normalize(target)
    } else {
        normalize(&format!("{}/{}", base, target))
    }
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::parse(
            br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
  <Relationship Id="rId2" Type="http://example.com/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#,
        )
        .unwrap();

        assert_eq!(rels.get("rId1").unwrap().target, "footer1.xml");
        assert!(rels.get("rId2").unwrap().external);
        assert!(rels.first_of_type(REL_FOOTER).is_some());
        assert!(rels.get("rId9").is_none());
    }

    #[test]
    fn test_rels_part_for() {
        assert_eq!(rels_part_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_part_for(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word/document.xml", "footer1.xml"), "word/footer1.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/footer2.xml"), "word/footer2.xml");
        assert_eq!(resolve_target("word/document.xml", "../customXml/item1.xml"), "customXml/item1.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }

    #[test]
    fn test_to_xml_roundtrip() {
        let mut rels = Relationships::new();
        rels.push("rId1", REL_OFFICE_DOCUMENT, "word/document.xml");
        let bytes = rels.to_xml().to_bytes().unwrap();
        assert_eq!(Relationships::parse(&bytes).unwrap(), rels);
    }
}
