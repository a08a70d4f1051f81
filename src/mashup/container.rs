//! Binary framing of the mashup container.
//!
//! ```text
//! [0:4)       version (opaque)
//! [4:8)       i32 package size P
//! [8:8+P)     package (zip holding Formulas/Section1.m)
//! ...         i32 permissions size R, permissions (opaque)
//! ...         i32 metadata size M, metadata block
//! ...         trailer (opaque, to end of buffer)
//! ```
//!
//! Edits never patch bytes in place; they build a new container and re-frame it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::byte_framer::{concat, size_field, ByteReader};
use crate::error::{Part, Result, XlconnectError};
use crate::namespaces::SECTION1_M_PATH;
use crate::package::{Archive, EntryOptions, ZipPackage};

use super::metadata::{MetadataBlock, MetadataUpdate};

/// Decoded mashup container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MashupContainer {
    pub version: [u8; 4],
    /// Nested OPC package (zip).
    pub package: Vec<u8>,
    pub permissions: Vec<u8>,
    /// Raw metadata block; see [`MetadataBlock`].
    pub metadata: Vec<u8>,
    pub trailer: Vec<u8>,
}

impl MashupContainer {
    /// Frame-read a decoded container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_array4()?;
        let package = reader.read_sized()?.to_vec();
        let permissions = reader.read_sized()?.to_vec();
        let metadata = reader.read_sized()?.to_vec();
        let trailer = reader.read_to_end().to_vec();
        debug!(
            package = package.len(),
            permissions = permissions.len(),
            metadata = metadata.len(),
            trailer = trailer.len(),
            "decoded mashup container"
        );
        Ok(Self {
            version,
            package,
            permissions,
            metadata,
            trailer,
        })
    }

    /// Base64-decode and frame-read. Whitespace in the text is ignored.
    pub fn decode(base64: &str) -> Result<Self> {
        let cleaned: String = base64.split_whitespace().collect();
        let bytes = STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| XlconnectError::MalformedContainer(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Re-frame with fresh size fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(concat(&[
            &self.version,
            &size_field(self.package.len())?,
            &self.package,
            &size_field(self.permissions.len())?,
            &self.permissions,
            &size_field(self.metadata.len())?,
            &self.metadata,
            &self.trailer,
        ]))
    }

    /// Re-frame and base64-encode.
    pub fn encode(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Text of `Formulas/Section1.m`.
    pub fn formula(&self) -> Result<String> {
        let mut package = ZipPackage::load(self.package.clone())?;
        package
            .read_text(SECTION1_M_PATH)?
            .ok_or_else(|| Part::FormulaSection.into())
    }

    /// New container whose `Section1.m` holds `script` verbatim.
    ///
    /// The formula entry is stored uncompressed; every other package entry is
    /// copied unchanged.
    pub fn with_formula(&self, script: &str) -> Result<Self> {
        let mut package = ZipPackage::load(self.package.clone())?;
        if package.read_bytes(SECTION1_M_PATH)?.is_none() {
            return Err(Part::FormulaSection.into());
        }
        package.write_entry(
            SECTION1_M_PATH,
            script.as_bytes().to_vec(),
            EntryOptions::stored(),
        );
        Ok(Self {
            package: package.finish()?,
            ..self.clone()
        })
    }

    /// Parsed metadata block.
    pub fn metadata_block(&self) -> Result<MetadataBlock> {
        MetadataBlock::from_bytes(&self.metadata)
    }

    /// New container with `block` as its metadata.
    pub fn with_metadata(&self, block: &MetadataBlock) -> Result<Self> {
        Ok(Self {
            metadata: block.to_bytes()?,
            ..self.clone()
        })
    }
}

/// Replace the query formula and rename the query throughout the metadata.
///
/// Returns the new base64 container. Either every layer is rewritten or an
/// error is returned; the input is never partially updated.
pub fn replace_single_query(base64: &str, script: &str, update: &MetadataUpdate<'_>) -> Result<String> {
    let container = MashupContainer::decode(base64)?;
    let with_formula = container.with_formula(script)?;
    let mut block = with_formula.metadata_block()?;
    block.apply(update)?;
    let updated = with_formula.with_metadata(&block)?;
    debug!(query = update.query_name, "replaced single query in mashup");
    updated.encode()
}
