//! In-memory ZIP package with entry overrides.
//!
//! Parts are read from the original archive on demand. Written parts are
//! held in memory until [`ZipPackage::finish`], which raw-copies every
//! untouched entry (zero recompression cost) and writes only the overrides.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;

/// How a written entry is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Stored without compression.
    Stored,
    #[default]
    Deflated,
}

/// Options for a written entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryOptions {
    pub compression: Compression,
}

impl EntryOptions {
    #[must_use]
    pub fn stored() -> Self {
        Self {
            compression: Compression::Stored,
        }
    }
}

/// Read/write access to the parts of a package.
pub trait Archive {
    /// Entry names in archive order, written-only entries last.
    fn entry_names(&self) -> Vec<String>;

    /// Raw bytes of an entry, `None` when absent.
    fn read_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Replace or add an entry.
    fn write_entry(&mut self, path: &str, data: Vec<u8>, options: EntryOptions);

    /// UTF-8 text of an entry (byte-order mark stripped), `None` when absent.
    fn read_text(&mut self, path: &str) -> Result<Option<String>> {
        let Some(bytes) = self.read_bytes(path)? else {
            return Ok(None);
        };
        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        let text = std::str::from_utf8(body).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{path}: {e}"))
        })?;
        Ok(Some(text.to_string()))
    }

    /// Write a UTF-8 text entry with default (deflate) compression.
    fn write_text(&mut self, path: &str, text: &str) {
        self.write_entry(path, text.as_bytes().to_vec(), EntryOptions::default());
    }
}

/// ZIP archive loaded from bytes.
pub struct ZipPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    names: Vec<String>,
    overrides: HashMap<String, (Vec<u8>, EntryOptions)>,
    added: Vec<String>,
}

impl std::fmt::Debug for ZipPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipPackage")
            .field("names", &self.names)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ZipPackage {
    /// Open an archive from its bytes.
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        // file_names() iterates a hash map; keep central directory order instead
        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            names.push(archive.by_index_raw(i)?.name().to_string());
        }
        Ok(Self {
            archive,
            names,
            overrides: HashMap::new(),
            added: Vec::new(),
        })
    }

    /// Whether an entry exists (original or written).
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.overrides.contains_key(path) || self.names.iter().any(|n| n == path)
    }

    /// Serialize the package, raw-copying every entry that was not overwritten.
    pub fn finish(self) -> Result<Vec<u8>> {
        let Self {
            mut archive,
            names,
            mut overrides,
            added,
        } = self;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name().to_string();
            if let Some((data, options)) = overrides.remove(&name) {
                drop(entry);
                write_entry(&mut writer, &name, &data, options)?;
                continue;
            }
            // Pass through unmodified entry (raw copy, no re-compression)
            writer.raw_copy_file(entry)?;
        }

        for name in added {
            if names.contains(&name) {
                continue;
            }
            if let Some((data, options)) = overrides.remove(&name) {
                write_entry(&mut writer, &name, &data, options)?;
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: EntryOptions,
) -> Result<()> {
    let method = match options.compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
    };
    writer.start_file(name, FileOptions::default().compression_method(method))?;
    writer.write_all(data)?;
    Ok(())
}

impl Archive for ZipPackage {
    fn entry_names(&self) -> Vec<String> {
        let mut names = self.names.clone();
        names.extend(
            self.added
                .iter()
                .filter(|n| !self.names.contains(n))
                .cloned(),
        );
        names
    }

    fn read_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        if let Some((data, _)) = self.overrides.get(path) {
            return Ok(Some(data.clone()));
        }
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }

    fn write_entry(&mut self, path: &str, data: Vec<u8>, options: EntryOptions) {
        if !self.names.iter().any(|n| n == path) && !self.added.iter().any(|n| n == path) {
            self.added.push(path.to_string());
        }
        self.overrides.insert(path.to_string(), (data, options));
    }
}
