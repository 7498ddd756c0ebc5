//! Archive format detection and the listing style of each format

use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    /// Plain tar archive
    Tar,
    /// Gzip-compressed tar archive (.tar.gz, .tgz)
    TarGz,
    /// Bzip2-compressed tar archive (.tar.bz2, .tbz, .tbz2)
    #[cfg(feature = "bzip2")]
    TarBz2,
    /// XZ-compressed tar archive (.tar.xz, .txz)
    #[cfg(feature = "xz")]
    TarXz,
    /// Zstd-compressed tar archive (.tar.zst, .tzst)
    #[cfg(feature = "zstd")]
    TarZst,
    /// ZIP archive and the formats built on it (.zip, .jar, .war, .ear)
    Zip,
}

/// The shape of the textual listing an archive format is described by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStyle {
    /// `tar -tv` style lines: permissions, links, owner, group, size, date, path
    Tar,
    /// `zipinfo` style lines: permissions, version, host, size, method, date, path
    Zip,
}

/// File name suffixes and the format they map to, most specific first.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::TarGz),
    (".tgz", ArchiveFormat::TarGz),
    #[cfg(feature = "bzip2")]
    (".tar.bz2", ArchiveFormat::TarBz2),
    #[cfg(feature = "bzip2")]
    (".tbz", ArchiveFormat::TarBz2),
    #[cfg(feature = "bzip2")]
    (".tbz2", ArchiveFormat::TarBz2),
    #[cfg(feature = "xz")]
    (".tar.xz", ArchiveFormat::TarXz),
    #[cfg(feature = "xz")]
    (".txz", ArchiveFormat::TarXz),
    #[cfg(feature = "zstd")]
    (".tar.zst", ArchiveFormat::TarZst),
    #[cfg(feature = "zstd")]
    (".tzst", ArchiveFormat::TarZst),
    (".tar", ArchiveFormat::Tar),
    (".zip", ArchiveFormat::Zip),
    (".jar", ArchiveFormat::Zip),
    (".war", ArchiveFormat::Zip),
    (".ear", ArchiveFormat::Zip),
];

impl ArchiveFormat {
    /// Detect archive format from filename
    ///
    /// A bare `.gz` file is only accepted when it is a gzipped tarball.
    pub fn detect_from_filename(filename: &str) -> Option<Self> {
        let filename = filename.to_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| filename.ends_with(suffix))
            .map(|&(_, format)| format)
    }

    /// Detect archive format from file path
    pub fn detect_from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .file_name()
            .and_then(OsStr::to_str)
            .and_then(Self::detect_from_filename)
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tar => "TAR",
            Self::TarGz => "TAR.GZ",
            #[cfg(feature = "bzip2")]
            Self::TarBz2 => "TAR.BZ2",
            #[cfg(feature = "xz")]
            Self::TarXz => "TAR.XZ",
            #[cfg(feature = "zstd")]
            Self::TarZst => "TAR.ZST",
            Self::Zip => "ZIP",
        }
    }

    /// Check if this is a tar-based format
    pub fn is_tar_based(&self) -> bool {
        self.listing_style() == ListingStyle::Tar
    }

    /// Whether the archive bytes on disk are compressed, i.e. a compression
    /// ratio is meaningful for it
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::Tar)
    }

    /// The listing style entries of this format are rendered in
    pub fn listing_style(&self) -> ListingStyle {
        match self {
            Self::Zip => ListingStyle::Zip,
            _ => ListingStyle::Tar,
        }
    }

    /// Get the typical file extensions for this format
    pub fn extensions(&self) -> Vec<&'static str> {
        SUFFIXES
            .iter()
            .filter(|(_, format)| format == self)
            .map(|&(suffix, _)| suffix)
            .collect()
    }
}
