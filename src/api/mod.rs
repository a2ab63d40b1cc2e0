//! High-level, ergonomic library API: read a product's metadata through the sensor
//! parsers, export it as geom, JSON or text, and batch helpers for directories.
//! Prefer these entrypoints over wiring suppliers and parsers by hand.
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::params::ExportParams;
use crate::error::{Error, Result};
use crate::io::geom::split_bands;
use crate::io::{
    GdalMetadataSupplier, KeywordlistSupplier, MetadataSupplier, XmlMetadataSupplier,
    write_geom_file, write_json_sidecar, write_text,
};
use crate::metadata::ImageMetadata;
use crate::sensors::{DefaultImageMetadataInterface, create_imi};
use crate::types::ExportFormat;

/// How an input path is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Geom keyword-list file
    Geom,
    /// Product XML document (DIMAP `.DIM`, `.XML`)
    Xml,
    /// Anything GDAL can open
    Raster,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "geom" => InputKind::Geom,
            "xml" | "dim" => InputKind::Xml,
            _ => InputKind::Raster,
        }
    }
}

/// Run the parser registry over `mds` and return the filled metadata with the name
/// of the parser that produced it
pub fn parse_with_supplier(mds: &dyn MetadataSupplier) -> Result<(ImageMetadata, &'static str)> {
    let mut imd = ImageMetadata::with_band_count(mds.nb_bands());
    let parser = create_imi(&mut imd, mds)?;
    Ok((imd, parser.name()))
}

/// Read the metadata of `input`, apply `params` (compaction, band count check)
pub fn read_image_metadata(input: &Path, params: &ExportParams) -> Result<ImageMetadata> {
    let kind = InputKind::from_path(input);
    debug!("Reading {:?} as {:?}", input, kind);
    let mut imd = match kind {
        InputKind::Geom => {
            let mds = KeywordlistSupplier::from_geom_file(input)?;
            let (imd, parser) = parse_with_supplier(&mds)?;
            if parser == DefaultImageMetadataInterface::NAME {
                // Not a sensor geom: read it as a stored metadata dump
                let mut stored = ImageMetadata::new();
                stored.from_keywordlists(&split_bands(mds.keywordlist()))?;
                stored
            } else {
                imd
            }
        }
        InputKind::Xml => {
            let mds = XmlMetadataSupplier::open(input)?;
            parse_with_supplier(&mds)?.0
        }
        InputKind::Raster => {
            let mds = GdalMetadataSupplier::open(input)?;
            let (mut imd, _) = parse_with_supplier(&mds)?;
            mds.add_projection(&mut imd);
            imd
        }
    };

    if params.compact {
        imd.compact();
    }
    if let Some(expected) = params.expected_bands {
        if imd.band_count() != expected {
            return Err(Error::InvalidArgument {
                arg: "expected_bands",
                value: format!("{expected} (product has {})", imd.band_count()),
            });
        }
    }
    info!(
        "Read metadata of {:?}: {} keys, {} bands",
        input,
        imd.size(),
        imd.band_count()
    );
    Ok(imd)
}

/// Write `imd` to `output` in the format selected by `params`
pub fn export_image_metadata(imd: &ImageMetadata, output: &Path, params: &ExportParams) -> Result<()> {
    match params.format {
        ExportFormat::Geom => write_geom_file(imd, output),
        ExportFormat::Json => write_json_sidecar(imd, output),
        ExportFormat::Text => write_text(imd, output, params.multiline),
    }
}

/// Read `input` and export its metadata to `output`
pub fn process_to_path(input: &Path, output: &Path, params: &ExportParams) -> Result<()> {
    let imd = read_image_metadata(input, params)?;
    export_image_metadata(&imd, output, params)
}

/// Batch processing report
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Files directly under `input_dir` that look like readable products, sorted by name
pub fn iterate_products(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Export the metadata of every product in `input_dir` into `output_dir`, one file per
/// product named after it. If `continue_on_error` is true, failures are counted in the
/// report and processing continues; otherwise, the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &ExportParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    for path in iterate_products(input_dir)? {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            report.skipped += 1;
            continue;
        };
        let output_path = output_dir.join(format!("{}.{}", stem, params.format.extension()));
        if output_path == path {
            debug!("Skipping {:?}: output would overwrite the input", path);
            report.skipped += 1;
            continue;
        }

        match process_to_path(&path, &output_path, params) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }
    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
