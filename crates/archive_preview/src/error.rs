//! Error types for the archive_preview crate

/// Result type for preview operations
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Error type for a whole preview request.
///
/// These are failures of the archive reader itself. When one of them occurs no
/// tree or summary is produced at all.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// I/O error while reading the archive or its listing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown or unsupported archive format
    #[error("Unsupported archive format for file: {filename}")]
    UnsupportedFormat { filename: String },

    /// Error reading the entries of a tar archive
    #[error("Failed to read tar archive: {message}")]
    TarRead { message: String },

    /// Error reading the entries of a zip archive
    #[error("Failed to read zip archive: {message}")]
    ZipRead { message: String },
}

impl PreviewError {
    /// Create a new unsupported format error
    pub fn unsupported_format(filename: &str) -> Self {
        Self::UnsupportedFormat {
            filename: filename.to_string(),
        }
    }

    /// Create a new tar read error
    pub fn tar_read(message: impl Into<String>) -> Self {
        Self::TarRead {
            message: message.into(),
        }
    }

    /// Create a new zip read error
    pub fn zip_read(message: impl Into<String>) -> Self {
        Self::ZipRead {
            message: message.into(),
        }
    }
}

/// Error inserting a single entry into a [`crate::FileTree`].
///
/// Only the offending entry is affected; the tree stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The path has no segments left once empty ones are dropped
    #[error("Invalid entry path: {path:?}")]
    InvalidPath { path: String },

    /// A file and a directory compete for the same position in the tree
    #[error("Conflicting entry {path}: '{segment}' is a file and cannot have children")]
    ConflictingEntry { path: String, segment: String },
}

impl TreeError {
    /// Create a new invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create a new conflicting entry error
    pub fn conflicting_entry(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::ConflictingEntry {
            path: path.into(),
            segment: segment.into(),
        }
    }
}
