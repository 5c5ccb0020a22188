/// One file-or-directory entry as reported by an archive codec.
///
/// `path` holds the slash-free segments of the entry name; `size` is only
/// meaningful for files and is ignored on directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntryRecord {
    pub path: Vec<String>,
    pub is_directory: bool,
    pub size: Option<u64>,
}

impl ArchiveEntryRecord {
    pub fn file<S: AsRef<str>>(path: &[S], size: u64) -> Self {
        Self {
            path: path.iter().map(|s| s.as_ref().to_string()).collect(),
            is_directory: false,
            size: Some(size),
        }
    }

    pub fn directory<S: AsRef<str>>(path: &[S]) -> Self {
        Self {
            path: path.iter().map(|s| s.as_ref().to_string()).collect(),
            is_directory: true,
            size: None,
        }
    }

    /// Split a slash-delimited archive name such as `src/utils/` into a record.
    ///
    /// Backslashes written by some Windows archivers are read as `/`. One
    /// trailing `/` (the ZIP directory marker) is dropped; anything else is kept
    /// verbatim so the tree builder can reject malformed names.
    pub fn from_archive_name(name: &str, is_directory: bool, size: Option<u64>) -> Self {
        let name = name.replace('\\', "/");
        let name = name.strip_suffix('/').unwrap_or(&name);
        let path = if name.is_empty() {
            Vec::new()
        } else {
            name.split('/').map(str::to_string).collect()
        };
        Self {
            path,
            is_directory,
            size: if is_directory { None } else { size },
        }
    }

    /// Canonical `/`-joined form of the path.
    pub fn joined(&self) -> String {
        self.path.join("/")
    }
}
