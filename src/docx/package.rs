//! Zip package holding the parts of a DOCX file.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// An ordered collection of package parts.
///
/// Parts keep their original order and bytes; only parts that were
/// explicitly replaced change on save.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from zip bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            parts.push((name, bytes));
        }
        log::debug!("Read package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Write the package as zip bytes.
    ///
    /// Media parts are stored, everything else is deflated, which is the
    /// layout Word itself produces.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in &self.parts {
            let options = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Part bytes by name.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_slice())
    }

    /// Part bytes by name, or [`Error::MissingPart`].
    pub fn require(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Check whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replace a part's bytes, appending it if absent.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Part names in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the package has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_roundtrip_keeps_order() {
        let mut package = Package::new();
        package.set_part("[Content_Types].xml", b"<Types/>".to_vec());
        package.set_part("word/document.xml", b"<w:document/>".to_vec());
        package.set_part("word/media/image1.png", vec![0x89, 0x50, 0x4e, 0x47]);

        let bytes = package.to_bytes().unwrap();
        let reread = Package::from_bytes(&bytes).unwrap();

        let names: Vec<_> = reread.part_names().collect();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", "word/document.xml", "word/media/image1.png"]
        );
        assert_eq!(reread.part("word/document.xml"), Some(&b"<w:document/>"[..]));
    }

    #[test]
    fn test_set_part_replaces_in_place() {
        let mut package = Package::new();
        package.set_part("a", b"1".to_vec());
        package.set_part("b", b"2".to_vec());
        package.set_part("a", b"3".to_vec());

        assert_eq!(package.len(), 2);
        assert_eq!(package.part("a"), Some(&b"3"[..]));
        assert!(matches!(package.require("c"), Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(Package::from_bytes(b"definitely not a zip").is_err());
    }
}
