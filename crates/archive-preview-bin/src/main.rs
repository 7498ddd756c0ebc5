use anyhow::Context;
use archive_preview::{OutlineNode, Preview, PreviewerBuilder};
use chrono::FixedOffset;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Print the file tree and compression statistics of an archive
#[derive(Debug, Parser)]
#[command(name = "archive-preview", author, version, about)]
struct Opt {
    /// The archive to preview (tar, tar.gz, tgz, tar.bz2, tar.xz, tar.zst, zip, jar, war, ear)
    path: PathBuf,

    /// Print the preview as JSON
    #[arg(long)]
    json: bool,

    /// Offset from UTC, in minutes, that listing dates are interpreted in
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    utc_offset: i32,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(opt.verbose.tracing_level_filter().into())
        .from_env()
        .context("invalid RUST_LOG filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let time_zone = opt
        .utc_offset
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("{} minutes is not a valid UTC offset", opt.utc_offset))?;

    let preview = PreviewerBuilder::new()
        .with_time_zone(time_zone)
        .build()
        .preview(&opt.path)
        .with_context(|| format!("failed to preview {}", opt.path.display()))?;
    tracing::info!(
        "previewed {} entries of {}",
        preview.summary.entry_count,
        opt.path.display()
    );

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_preview(&preview);
    }

    Ok(())
}

fn print_preview(preview: &Preview) {
    for node in &preview.root_nodes {
        print_node(node, 0);
    }
    if !preview.root_nodes.is_empty() {
        println!();
    }
    println!("{}", preview.label);
}

fn print_node(node: &OutlineNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_directory {
        println!("{indent}{}/", console::style(&node.name).bold().blue());
    } else {
        println!("{indent}{}", node.name);
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
