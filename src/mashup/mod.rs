//! The Power Query `DataMashup` container.
//!
//! Layers, outermost first:
//! - [`carrier`]: the UTF-16 `customXml` part whose text is base64;
//! - [`container`]: the binary frame of package, permissions, metadata and trailer;
//! - [`metadata`]: the metadata block wrapping the XML that binds the query result;
//! - [`script`]: the `Section1.m` text stored in the nested package.

pub mod carrier;
pub mod container;
pub mod metadata;
pub mod script;

pub use carrier::{read_mashup_part, write_mashup_part, MashupPart};
pub use container::{replace_single_query, MashupContainer};
pub use metadata::{MetadataBlock, MetadataUpdate};
pub use script::generate_single_query_mashup;
