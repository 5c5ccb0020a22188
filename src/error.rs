use thiserror::Error;

/// Failures raised while building an archive tree or mutating a selection.
///
/// All variants are local and recoverable: a failed build returns no tree,
/// and a failed toggle leaves the selection untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid entry path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("path '{path}' is declared as both a file and a directory")]
    PathKindConflict { path: String },

    #[error("path '{path}' does not exist in the archive")]
    UnknownPath { path: String },
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// The offending path, whichever variant this is.
    pub fn path(&self) -> &str {
        match self {
            Error::InvalidPath { path, .. }
            | Error::PathKindConflict { path }
            | Error::UnknownPath { path } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
