//! Fixture helpers shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use tempfile::TempDir;
use zip::{write::SimpleFileOptions, ZipWriter};

pub const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Zip `(name, contents)` pairs into memory
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// A scratch directory holding book files
pub struct Library {
    dir: TempDir,
}

impl Library {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write raw bytes under `file_name` and return the full path
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(file_name);
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Write a zip archive built from `entries`
    pub fn write_zip(&self, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        self.write(file_name, &zip_bytes(entries))
    }

    /// Write an EPUB with the standard container, the given package document
    /// at `OEBPS/content.opf`, and extra entries
    pub fn write_epub(&self, file_name: &str, opf: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let mut entries: Vec<(&str, &[u8])> = vec![
            ("mimetype", &b"application/epub+zip"[..]),
            ("META-INF/container.xml", CONTAINER.as_bytes()),
            ("OEBPS/content.opf", opf.as_bytes()),
        ];
        entries.extend_from_slice(files);
        self.write_zip(file_name, &entries)
    }
}

/// Package document with the given metadata, manifest and spine bodies
pub fn package(metadata: &str, manifest: &str, spine: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{}</metadata>
  <manifest>{}</manifest>
  <spine>{}</spine>
</package>"#,
        metadata, manifest, spine
    )
}

/// Minimal XHTML document wrapping `body`
pub fn xhtml(head: &str, body: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head>{}</head><body>{}</body></html>"#,
        head, body
    )
    .into_bytes()
}
