//! DOCX format detection and candidate-file filtering.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Zip local file header: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE compound file header used by legacy `.doc` files.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extension of the documents a batch picks up.
pub const DOCX_EXTENSION: &str = "docx";

/// Prefix Word uses for owner/lock files next to an open document.
const LOCK_FILE_PREFIX: &str = "~$";

/// Detect a DOCX container from a file path.
///
/// # Example
/// ```no_run
/// use docflow::detect::detect_format_from_path;
///
/// detect_format_from_path("report.docx").unwrap();
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::UnknownFormat)?;
    detect_format_from_bytes(&header)
}

/// Detect a DOCX container from its leading bytes.
///
/// Only the zip signature is checked here; a zip that lacks the main
/// document part is rejected later, when the package is opened.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<()> {
    if data.starts_with(ZIP_MAGIC) {
        return Ok(());
    }
    if data.starts_with(OLE_MAGIC) {
        log::debug!("Legacy binary .doc detected; only OOXML packages are supported");
    }
    Err(Error::UnknownFormat)
}

/// Check if bytes start like a DOCX container.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Check if a path has the `.docx` extension (case-insensitive).
pub fn has_docx_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCX_EXTENSION))
}

/// Check if a path is a Word lock file (`~$name.docx`).
pub fn is_lock_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX))
}

/// Check if a path should be picked up by a batch.
pub fn is_candidate<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    has_docx_extension(path) && !is_lock_file(path)
}
