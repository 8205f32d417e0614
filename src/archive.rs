//! Read-only access to zip containers
//!
//! Entries are looked up by name and always read whole. Lookups retry with a
//! percent-decoded name, since manifests and archives disagree on encoding.

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ExtractError, Result};

/// Leading bytes of a RAR archive
const RAR_SIGNATURE: &[u8] = b"Rar!";

/// An opened zip container
pub struct Archive<R> {
    zip: ZipArchive<R>,
}

impl Archive<Cursor<Vec<u8>>> {
    /// Load a container fully into memory and open it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Open a container held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.starts_with(RAR_SIGNATURE) {
            return Err(ExtractError::RarArchive);
        }
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> Archive<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
        })
    }

    /// Read an entry, trying the name as given and then its percent-decoded form.
    ///
    /// Returns `Ok(None)` when neither name exists.
    pub fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        if let Some(bytes) = self.read_exact_name(name)? {
            return Ok(Some(bytes));
        }

        match urlencoding::decode(name) {
            Ok(decoded) if decoded != name => self.read_exact_name(&decoded),
            _ => Ok(None),
        }
    }

    /// Read an entry as text, replacing invalid UTF-8 and dropping a byte-order mark
    pub fn read_string(&mut self, name: &str) -> Result<Option<String>> {
        Ok(self.read(name)?.map(|bytes| {
            let text = String::from_utf8_lossy(&bytes);
            text.trim_start_matches('\u{feff}').to_string()
        }))
    }

    fn read_exact_name(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    /// Names of all file entries (directories excluded), in archive order
    pub fn file_names(&self) -> Vec<String> {
        (0..self.zip.len())
            .filter_map(|i| self.zip.name_for_index(i))
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory zip from `(name, contents)` pairs
    pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);

            for (name, contents) in entries {
                if name.ends_with('/') {
                    zip.add_directory(*name, options).unwrap();
                } else {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(contents).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        buffer
    }
}
