//! Archive previews from archive listings
//!
//! This crate turns the textual listing of an archive (as printed by
//! `tar -tv`, `gzip -l` or `zipinfo`) into a file tree plus size and
//! compression statistics, ready to be shown by a user interface.
//!
//! # Features
//!
//! - Tolerant parsing of tar and zip listings, noise lines are skipped
//! - Disambiguation of the abbreviated dates used in listings
//! - An arena backed file tree with intermediate directory synthesis
//! - Summaries from entries or from the trailing summary line
//! - Listings rendered from tar, tar.gz, tar.bz2, tar.xz, tar.zst and zip
//!   archives on disk
//!
//! # Examples
//!
//! ## Preview an archive on disk
//!
//! ```no_run
//! use archive_preview::PreviewerBuilder;
//! use std::path::Path;
//!
//! let previewer = PreviewerBuilder::new().build();
//! let preview = previewer.preview(Path::new("archive.tar.gz"))?;
//! println!("{}", preview.label);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Preview a listing
//!
//! ```
//! use archive_preview::{ArchiveFormat, PreviewerBuilder};
//!
//! let listing = "\
//! drwxr-xr-x 0 user staff 0 Dec 29 2018 my-archive/
//! -rw-r--r-- 0 user staff 642 Dec 29 2018 my-archive/file.ext";
//!
//! let preview = PreviewerBuilder::new()
//!     .build()
//!     .assemble(ArchiveFormat::Tar, listing, None);
//! assert_eq!(preview.root_nodes[0].name, "my-archive");
//! assert_eq!(preview.root_nodes[0].children[0].size_bytes, Some(642));
//! ```

pub mod date;
pub mod error;
pub mod extract;
pub mod format;
pub mod grammar;
pub mod listing;
pub mod preview;
pub mod summary;
pub mod tree;

pub use date::{DateInterpreter, DateStyle};
pub use error::{PreviewError, Result, TreeError};
pub use extract::{ArchiveEntry, EntryExtractor};
pub use format::{ArchiveFormat, ListingStyle};
pub use grammar::LineGrammar;
pub use preview::{OutlineNode, Preview, Previewer, PreviewerBuilder};
pub use summary::ArchiveSummary;
pub use tree::{FileTree, FileTreeNode, NodeId};

/// Check if a filename has a known archive extension
pub fn is_archive(filename: &str) -> bool {
    ArchiveFormat::detect_from_filename(filename).is_some()
}

/// Check if a filename is a tarball
pub fn is_tarball(filename: &str) -> bool {
    ArchiveFormat::detect_from_filename(filename).is_some_and(|format| format.is_tar_based())
}
