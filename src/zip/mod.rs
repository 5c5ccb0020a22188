//! ZIP archive listing and payload access.
//!
//! This is the archive codec side of the crate: it turns a ZIP's central
//! directory into [`ArchiveEntryRecord`](crate::tree::ArchiveEntryRecord)s
//! for the tree builder, and fetches entry bytes by path when projected
//! files are materialized.
//!
//! - [`structures`]: on-disk records (EOCD, ZIP64 EOCD, central directory entries)
//! - [`parser`]: reads those records through any [`ReadAt`](crate::io::ReadAt) source
//! - [`extractor`]: [`ZipArchive`], decoding and writing selected files
//!
//! Supported: ZIP and ZIP64 central directories, STORED and DEFLATE data.
//! Not supported: encryption, multi-disk archives, other compression methods.

mod extractor;
mod parser;
mod structures;

pub use extractor::{Materialized, OverwritePolicy, ZipArchive};
pub use parser::ZipParser;
pub use structures::*;
