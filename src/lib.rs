//! # ziptree
//!
//! Browse an archive as a directory tree, select entries, and extract only
//! the selected subset.
//!
//! The core is three synchronous, allocation-only pieces:
//!
//! - [`tree`]: builds an ordered [`ArchiveTree`] from a flat list of
//!   [`ArchiveEntryRecord`]s, inferring missing directories
//! - [`selection`]: a [`Selection`] of paths with cascading directory toggles
//! - [`projection`]: turns tree + selection into [`ExtractedFile`]s whose
//!   destination paths are re-rooted under a caller-chosen prefix
//!
//! [`BrowseSession`] ties one tree to one selection. Around the core, the
//! [`zip`] and [`io`] modules read ZIP central directories from local files,
//! memory, or HTTP servers supporting Range requests, and write selected
//! entries to disk.
//!
//! ## Example
//!
//! ```
//! use ziptree::{ArchiveEntryRecord, BrowseSession};
//!
//! let mut session = BrowseSession::open(vec![
//!     ArchiveEntryRecord::file(&["src", "components", "Button.tsx"], 2048),
//!     ArchiveEntryRecord::file(&["src", "components", "Card.tsx"], 3072),
//!     ArchiveEntryRecord::file(&["README.md"], 2560),
//! ])?;
//!
//! session.toggle("src/components")?;
//! let files = session.extract("dest");
//!
//! let destinations: Vec<_> = files.iter().map(|f| f.destination_path.as_str()).collect();
//! assert_eq!(destinations, ["dest/Button.tsx", "dest/Card.tsx"]);
//! # Ok::<(), ziptree::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod projection;
pub mod render;
pub mod selection;
pub mod session;
pub mod tree;
pub mod zip;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
pub use projection::{ContentKinds, ExtractedFile, SelectionSummary, project};
pub use selection::{Selection, Toggled};
pub use session::BrowseSession;
pub use tree::{ArchiveEntryRecord, ArchiveTree, NodeKind, TreeNode};
pub use zip::{Materialized, OverwritePolicy, ZipArchive, ZipFileEntry};
