//! Assembling previews out of listings

use crate::{
    date::DateInterpreter,
    error::{PreviewError, Result},
    extract::EntryExtractor,
    format::{ArchiveFormat, ListingStyle},
    listing::render_listing,
    summary::{ArchiveSummary, EntryTotals, TarSummaryLine},
    tree::{FileTree, NodeId},
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use humansize::{format_size, DECIMAL};
use serde::Serialize;
use std::path::Path;

/// Shown in the label for figures that are not known
const PLACEHOLDER: &str = "--";

/// Owned copy of a tree node, handed to whatever renders the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub name: String,
    pub is_directory: bool,
    pub size_bytes: Option<u64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Copy the subtree below `id`
    pub fn from_node(tree: &FileTree, id: NodeId) -> Self {
        let node = &tree[id];
        Self {
            name: node.name().to_string(),
            is_directory: node.is_directory(),
            size_bytes: node.size_bytes(),
            modified_at: node.modified_at(),
            children: node
                .children()
                .map(|child| Self::from_node(tree, child))
                .collect(),
        }
    }

    /// Copy the top level entries of a tree
    pub fn roots(tree: &FileTree) -> Vec<Self> {
        tree.root_children()
            .map(|id| Self::from_node(tree, id))
            .collect()
    }
}

/// Everything the rendering layer needs to show an archive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub format: ArchiveFormat,
    pub root_nodes: Vec<OutlineNode>,
    pub summary: ArchiveSummary,
    pub label: String,
}

/// Builder for configuring previews
#[derive(Debug, Clone)]
pub struct PreviewerBuilder {
    time_zone: FixedOffset,
    reference_time: Option<DateTime<Utc>>,
    format: Option<ArchiveFormat>,
}

impl PreviewerBuilder {
    /// Create a new previewer builder
    pub fn new() -> Self {
        Self {
            time_zone: Utc.fix(),
            reference_time: None,
            format: None,
        }
    }

    /// The zone listing dates are written in, UTC by default
    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// The instant that decides which year undated listing entries belong to,
    /// the time of building by default
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Set the archive format explicitly (bypassing auto-detection)
    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Build the previewer
    pub fn build(self) -> Previewer {
        let reference = self.reference_time.unwrap_or_else(Utc::now);
        Previewer {
            dates: DateInterpreter::new(self.time_zone, reference),
            format: self.format,
        }
    }
}

impl Default for PreviewerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Archive previewer
#[derive(Debug, Clone)]
pub struct Previewer {
    dates: DateInterpreter,
    format: Option<ArchiveFormat>,
}

impl Previewer {
    /// The date interpreter listings are parsed with
    pub fn dates(&self) -> &DateInterpreter {
        &self.dates
    }

    /// Preview an archive on disk
    pub fn preview(&self, archive_path: &Path) -> Result<Preview> {
        let format = match self.format {
            Some(format) => format,
            None => ArchiveFormat::detect_from_path(archive_path).ok_or_else(|| {
                PreviewError::unsupported_format(&archive_path.display().to_string())
            })?,
        };

        let archive_size = fs_err::metadata(archive_path)?.len();
        let listing = render_listing(archive_path, format, &self.dates)?;
        Ok(self.assemble(format, &listing, Some(archive_size)))
    }

    /// Build a preview from listing text.
    ///
    /// `archive_size` is the size of the archive on disk. Entries that cannot
    /// be placed in the tree are logged and left out.
    pub fn assemble(
        &self,
        format: ArchiveFormat,
        listing: &str,
        archive_size: Option<u64>,
    ) -> Preview {
        let extractor = EntryExtractor::new(format.listing_style(), self.dates);
        let mut tree = FileTree::new();
        let mut totals = EntryTotals::default();
        for entry in extractor.entries(listing) {
            totals.add(&entry);
            if let Err(err) = tree.insert_entry(&entry) {
                tracing::warn!("skipping archive entry: {err}");
            }
        }

        let (summary, compressed_bytes) = summarize(format, listing, totals, archive_size);
        Preview {
            format,
            root_nodes: OutlineNode::roots(&tree),
            label: label_text(format, &summary, archive_size, compressed_bytes),
            summary,
        }
    }
}

/// Pick the summary source for the format. A summary line printed by the
/// listing generator takes precedence over the aggregated entries.
///
/// Also returns the compressed size when it is known, either from the
/// archive on disk or from the summary line.
fn summarize(
    format: ArchiveFormat,
    listing: &str,
    totals: EntryTotals,
    archive_size: Option<u64>,
) -> (ArchiveSummary, Option<u64>) {
    match format.listing_style() {
        ListingStyle::Zip => match ArchiveSummary::parse_zip_summary(listing) {
            Some(summary) => {
                if summary.entry_count != totals.entry_count {
                    tracing::debug!(
                        "zip summary reports {} entries, {} were extracted",
                        summary.entry_count,
                        totals.entry_count
                    );
                }
                let compressed_bytes = archive_size.or(Some(summary.compressed_bytes));
                (summary, compressed_bytes)
            }
            None => (totals.into_summary(archive_size), archive_size),
        },
        ListingStyle::Tar => {
            let mut summary = totals.into_summary(archive_size);
            if format.is_compressed() {
                if let Some(line) = TarSummaryLine::parse(listing) {
                    line.apply(&mut summary);
                }
            }
            (summary, archive_size)
        }
    }
}

/// The text shown next to the tree
fn label_text(
    format: ArchiveFormat,
    summary: &ArchiveSummary,
    archive_size: Option<u64>,
    compressed_bytes: Option<u64>,
) -> String {
    if !format.is_compressed() {
        return format!("Size: {}", format_bytes(archive_size));
    }

    format!(
        "Compressed: {}\nUncompressed: {}\nCompression ratio: {} %",
        format_bytes(compressed_bytes),
        format_bytes(Some(summary.uncompressed_bytes)),
        format_ratio(summary.compression_ratio_percent)
    )
}

fn format_bytes(bytes: Option<u64>) -> String {
    bytes.map_or_else(|| PLACEHOLDER.to_string(), |bytes| format_size(bytes, DECIMAL))
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| PLACEHOLDER.to_string(), |ratio| format!("{ratio:.1}"))
}
