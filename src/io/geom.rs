//! Metadata persistence: geom keyword-list files, JSON sidecars and plain text dumps.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::io::supplier::parse_geom_text;
use crate::metadata::{ImageMetadata, Keywordlist};

/// Geom text for `imd`: whole-image keys first, then `Band_<n>.` prefixed band keys
pub fn geom_text(imd: &ImageMetadata) -> String {
    let mut out = String::new();
    for (k, v) in imd.base.to_keywordlist() {
        let _ = writeln!(out, "{k}:{v}");
    }
    for (i, band) in imd.bands.iter().enumerate() {
        for (k, v) in band.to_keywordlist() {
            let _ = writeln!(out, "Band_{}.{k}:{v}", i + 1);
        }
    }
    out
}

/// Split a flat geom keyword-list into whole-image and per-band lists
pub fn split_bands(kwl: &Keywordlist) -> Vec<Keywordlist> {
    let mut image = Keywordlist::new();
    let mut bands: BTreeMap<usize, Keywordlist> = BTreeMap::new();
    for (k, v) in kwl {
        let band_key = k
            .strip_prefix("Band_")
            .and_then(|rest| rest.split_once('.'))
            .and_then(|(n, key)| n.parse::<usize>().ok().map(|n| (n, key)));
        match band_key {
            Some((n, key)) if n > 0 => {
                bands.entry(n).or_default().insert(key.to_string(), v.clone());
            }
            _ => {
                image.insert(k.clone(), v.clone());
            }
        }
    }
    let band_count = bands.keys().next_back().copied().unwrap_or(0);
    let mut kwls = Vec::with_capacity(band_count + 1);
    kwls.push(image);
    for n in 1..=band_count {
        kwls.push(bands.remove(&n).unwrap_or_default());
    }
    kwls
}

pub fn write_geom_file<P: AsRef<Path>>(imd: &ImageMetadata, path: P) -> Result<()> {
    std::fs::write(path.as_ref(), geom_text(imd))?;
    info!("Wrote geom file: {:?}", path.as_ref());
    Ok(())
}

pub fn read_geom_file<P: AsRef<Path>>(path: P) -> Result<ImageMetadata> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let mut imd = ImageMetadata::new();
    imd.from_keywordlists(&split_bands(&parse_geom_text(&text)))?;
    info!("Read geom file {:?} ({} bands)", path.as_ref(), imd.band_count());
    Ok(imd)
}

/// Strict JSON sidecar
pub fn write_json_sidecar<P: AsRef<Path>>(imd: &ImageMetadata, path: P) -> Result<()> {
    let json_string = serde_json::to_string_pretty(&imd.to_json_value())?;
    std::fs::write(path.as_ref(), json_string)?;
    info!("Created metadata sidecar: {:?}", path.as_ref());
    Ok(())
}

pub fn write_text<P: AsRef<Path>>(imd: &ImageMetadata, path: P, multiline: bool) -> Result<()> {
    std::fs::write(path.as_ref(), imd.to_json(multiline))?;
    info!("Wrote metadata dump: {:?}", path.as_ref());
    Ok(())
}
