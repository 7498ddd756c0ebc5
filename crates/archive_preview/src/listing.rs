//! Rendering archives on disk into listing text
//!
//! The preview pipeline only ever looks at listing text. This module produces
//! that text from real archives, in the same layout `tar -tv` + `gzip -l` and
//! `zipinfo` use, so the parser works the same on generated listings and on
//! listings captured from those tools.
//!
//! Zip dates are written with a two digit year like `zipinfo` does. Years
//! `69` to `99` read back as 19xx, so entries dated 2069 or later come back a
//! century early.

use crate::{
    date::{DateInterpreter, DateStyle},
    error::{PreviewError, Result},
    format::ArchiveFormat,
    summary::{compression_ratio, EMPTY_ZIP_SENTINEL},
};
use chrono::{DateTime, NaiveDate};
use std::{
    io::{self, BufReader, Read},
    path::Path,
};

const DEFAULT_DIRECTORY_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Render the listing of an archive, trailing summary line included.
pub fn render_listing(
    archive_path: &Path,
    format: ArchiveFormat,
    dates: &DateInterpreter,
) -> Result<String> {
    match format {
        ArchiveFormat::Tar => render_tar(archive_path, TarCompression::Plain, dates),
        ArchiveFormat::TarGz => render_tar(archive_path, TarCompression::Gzip, dates),
        #[cfg(feature = "bzip2")]
        ArchiveFormat::TarBz2 => render_tar(archive_path, TarCompression::Bzip2, dates),
        #[cfg(feature = "xz")]
        ArchiveFormat::TarXz => render_tar(archive_path, TarCompression::Xz, dates),
        #[cfg(feature = "zstd")]
        ArchiveFormat::TarZst => render_tar(archive_path, TarCompression::Zstd, dates),
        ArchiveFormat::Zip => render_zip(archive_path, dates),
    }
}

/// Render the entries of a tar archive, followed by a gzip style summary
/// when the tarball is compressed
fn render_tar(
    archive_path: &Path,
    compression: TarCompression,
    dates: &DateInterpreter,
) -> Result<String> {
    let file = fs_err::File::open(archive_path)?;
    let compressed_bytes = file.metadata()?.len();
    let buf_reader = BufReader::new(file);

    let reader: Box<dyn Read> = match compression {
        TarCompression::Plain => Box::new(buf_reader),
        TarCompression::Gzip => Box::new(flate2::read::GzDecoder::new(buf_reader)),
        #[cfg(feature = "bzip2")]
        TarCompression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(buf_reader)),
        #[cfg(feature = "xz")]
        TarCompression::Xz => Box::new(xz2::read::XzDecoder::new(buf_reader)),
        #[cfg(feature = "zstd")]
        TarCompression::Zstd => Box::new(zstd::stream::read::Decoder::new(buf_reader)?),
    };

    let mut archive = tar::Archive::new(CountingReader::new(reader));
    let mut listing = String::new();
    let entries = archive
        .entries()
        .map_err(|e| PreviewError::tar_read(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| PreviewError::tar_read(e.to_string()))?;
        if is_metadata_entry(entry.header().entry_type()) {
            tracing::trace!("skipping tar metadata entry {:?}", entry.header().entry_type());
            continue;
        }
        let header = entry.header();
        let is_directory = header.entry_type().is_dir();
        let modified = header
            .mtime()
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0))
            .unwrap_or_else(|| dates.reference());
        let mut path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if is_directory && !path.ends_with('/') {
            path.push('/');
        }

        listing.push_str(&format!(
            "{} 0 user staff {} {} {}\n",
            permission_string(is_directory, header.mode().ok()),
            entry.size(),
            dates.render(modified, DateStyle::Tar),
            path
        ));
    }

    if compression != TarCompression::Plain {
        // the end of archive marker and padding count towards the size
        let mut reader = archive.into_inner();
        io::copy(&mut reader, &mut io::sink())?;
        let uncompressed_bytes = reader.bytes_read();
        let name = archive_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive.tar".to_string());

        listing.push_str(" compressed uncompressed ratio uncompressed_name\n");
        listing.push_str(&format!(
            " {compressed_bytes} {uncompressed_bytes} {:.1}% {name}",
            compression_ratio(compressed_bytes, uncompressed_bytes)
        ));
    }

    tracing::debug!(
        "rendered tar listing of {} ({} lines)",
        archive_path.display(),
        listing.lines().count()
    );
    Ok(listing)
}

/// Render the entries of a zip archive in `zipinfo` layout
fn render_zip(archive_path: &Path, dates: &DateInterpreter) -> Result<String> {
    let file = fs_err::File::open(archive_path)?;
    let file_size = file.metadata()?.len();
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| PreviewError::zip_read(e.to_string()))?;

    let name = archive_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut listing = format!(
        "Archive: {name}\nZip file size: {file_size} bytes, number of entries: {}\n",
        archive.len()
    );
    if archive.len() == 0 {
        listing.push_str(EMPTY_ZIP_SENTINEL);
        return Ok(listing);
    }

    let mut uncompressed_bytes = 0u64;
    let mut compressed_bytes = 0u64;
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| PreviewError::zip_read(e.to_string()))?;
        let modified = entry
            .last_modified()
            .and_then(|dt| {
                NaiveDate::from_ymd_opt(dt.year().into(), dt.month().into(), dt.day().into())?
                    .and_hms_opt(dt.hour().into(), dt.minute().into(), dt.second().into())
            })
            .and_then(|naive| dates.localize(&naive))
            .unwrap_or_else(|| dates.reference());

        listing.push_str(&format!(
            "{} 2.0 unx {} bx stor {} {}\n",
            permission_string(entry.is_dir(), entry.unix_mode()),
            entry.size(),
            dates.render(modified, DateStyle::Zip),
            entry.name()
        ));
        uncompressed_bytes = uncompressed_bytes.saturating_add(entry.size());
        compressed_bytes = compressed_bytes.saturating_add(entry.compressed_size());
    }

    listing.push_str(&format!(
        "{} files, {uncompressed_bytes} bytes uncompressed, {compressed_bytes} bytes compressed:  {:.1}%",
        archive.len(),
        compression_ratio(compressed_bytes, uncompressed_bytes)
    ));
    Ok(listing)
}

/// Header-only entries that `tar -tv` does not list
fn is_metadata_entry(entry_type: tar::EntryType) -> bool {
    entry_type.is_pax_global_extensions()
        || entry_type.is_pax_local_extensions()
        || entry_type.is_gnu_longname()
        || entry_type.is_gnu_longlink()
}

/// `ls -l` style permission string, e.g. `drwxr-xr-x`
fn permission_string(is_directory: bool, mode: Option<u32>) -> String {
    let default_mode = if is_directory {
        DEFAULT_DIRECTORY_MODE
    } else {
        DEFAULT_FILE_MODE
    };
    let mode = mode.unwrap_or(default_mode);

    let mut permissions = String::with_capacity(10);
    permissions.push(if is_directory { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        permissions.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        permissions.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        permissions.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    permissions
}

/// Tar compression types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TarCompression {
    Plain,
    Gzip,
    #[cfg(feature = "bzip2")]
    Bzip2,
    #[cfg(feature = "xz")]
    Xz,
    #[cfg(feature = "zstd")]
    Zstd,
}

/// A wrapper around a reader that counts the bytes passing through it
pub struct CountingReader<R: Read> {
    inner: R,
    bytes_read: u64,
}

impl<R: Read> CountingReader<R> {
    /// Create a new counting reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
        }
    }

    /// Get the total bytes read
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let bytes_read = self.inner.read(buf)?;
        self.bytes_read += bytes_read as u64;
        Ok(bytes_read)
    }
}
