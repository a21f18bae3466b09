/// Inspector: prints a summary of .shp, .dbf and .asc files.
///
/// Usage:
///     cargo run --bin geoinfo -- <file> [<file> ...]
///
/// Set RUST_LOG=debug for decoder diagnostics.

use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use geofile::io::asc::AscReader;
use geofile::io::dbf::DbfReader;
use geofile::io::shp::ShpReader;
use geofile::NotificationCollection;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: geoinfo <file.shp|file.dbf|file.asc> [...]");
        std::process::exit(1);
    }

    let mut failed = 0;
    for path in &paths {
        if let Err(e) = inspect(Path::new(path)) {
            eprintln!("{path}: {e:#}");
            failed += 1;
        }
        println!();
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) could not be read", paths.len());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "shp" => inspect_shp(path),
        "dbf" => inspect_dbf(path),
        "asc" | "xyz" | "txt" => inspect_asc(path),
        other => bail!("unsupported extension '{other}'"),
    }
}

fn inspect_shp(path: &Path) -> Result<()> {
    let file = ShpReader::from_file(path)
        .and_then(|r| r.read())
        .with_context(|| format!("reading {}", path.display()))?;

    let header = &file.header;
    println!("{} (shapefile)", path.display());
    println!("  shape type:   {}", header.shape_type);
    println!("  version:      {}", header.version);
    println!("  file length:  {} bytes", header.file_length_bytes());
    println!("  bounding box: {}", header.bounding_box);
    println!("  records:      {}", file.records.len());
    println!(
        "  points:       {}",
        file.shapes().map(|s| s.point_count()).sum::<usize>()
    );
    print_notifications(&file.notifications);
    Ok(())
}

fn inspect_dbf(path: &Path) -> Result<()> {
    let table = DbfReader::from_file(path)
        .and_then(|r| r.read())
        .with_context(|| format!("reading {}", path.display()))?;

    let header = &table.header;
    println!("{} (dBase)", path.display());
    println!("  version:      {}", header.version);
    println!("  layout:       {:?}", header.strategy);
    println!("  last update:  {}", header.last_update);
    println!(
        "  records:      {} ({} deleted)",
        table.records.len(),
        table.records.len() - table.active_records().count()
    );
    println!("  fields:");
    for field in &header.fields {
        println!(
            "    {:<32} {} {:>3}.{}",
            field.name, field.field_type, field.length, field.decimal_count
        );
    }
    print_notifications(&table.notifications);
    Ok(())
}

fn inspect_asc(path: &Path) -> Result<()> {
    let summary = AscReader::from_file(path)
        .and_then(|r| r.read_into(&mut DiscardSink))
        .with_context(|| format!("reading {}", path.display()))?;

    println!("{} (ASCII point cloud)", path.display());
    println!("  bytes:        {}", summary.bytes_read);
    println!("  lines:        {}", summary.line_count);
    println!("  points:       {}", summary.point_count);
    println!("  batches:      {}", summary.batch_count);
    println!("  attributes:   {:?}", summary.attributes);
    println!("  offset:       {}", summary.offset);
    if let Some(bbox) = summary.bounding_box {
        println!("  bounding box: {bbox}");
    }
    print_notifications(&summary.notifications);
    Ok(())
}

/// Drops the batches; only the summary is printed.
struct DiscardSink;

impl geofile::PointBatchSink for DiscardSink {
    fn accept(&mut self, _batch: geofile::PointBatch) -> geofile::Result<()> {
        Ok(())
    }
}

fn print_notifications(notifications: &NotificationCollection) {
    if notifications.is_empty() {
        return;
    }
    println!("  notifications: {}", notifications.len());
    for notification in notifications.iter().take(10) {
        println!("    {notification}");
    }
    if notifications.len() > 10 {
        println!("    ... {} more", notifications.len() - 10);
    }
}
