//! PDF header sniffing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the header of a file and return its PDF version (e.g. "1.7").
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = [0u8; 16];
    let mut file = File::open(path)?;
    let n = file.read(&mut header)?;
    pdf_version_from_bytes(&header[..n])
}

/// Return the PDF version from the leading bytes of a document.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).into_owned())
        }
        _ => Err(Error::UnknownFormat),
    }
}

/// Check whether a file looks like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    pdf_version_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_bytes() {
        assert_eq!(pdf_version_from_bytes(b"%PDF-1.7\n%\xe2\xe3").unwrap(), "1.7");
        assert_eq!(pdf_version_from_bytes(b"%PDF-2.0\n").unwrap(), "2.0");
    }

    #[test]
    fn test_not_pdf() {
        assert!(matches!(
            pdf_version_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            pdf_version_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
        assert!(pdf_version_from_bytes(b"%PDF-x.y").is_err());
    }

    #[test]
    fn test_is_pdf_missing_file() {
        assert!(!is_pdf("/nonexistent/file.pdf"));
    }
}
