//! Field tables shared by the SAR parsers.
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{MetadataSupplier, MetadataSupplierExt};
use crate::metadata::values::parse_time;
use crate::metadata::{ImageMetadata, NumKey, StrKey, TimeKey};
use crate::sensors::ensure_bands;

#[derive(Debug, Clone, Copy)]
pub enum Target {
    Str(StrKey),
    Num(NumKey),
    Time(TimeKey),
}

/// Supplier path copied into a metadata key
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub path: &'static str,
    pub target: Target,
    pub required: bool,
}

pub const fn req(path: &'static str, target: Target) -> Field {
    Field {
        path,
        target,
        required: true,
    }
}

pub const fn opt(path: &'static str, target: Target) -> Field {
    Field {
        path,
        target,
        required: false,
    }
}

/// Mission identifier at `path`, `MissingMetadata` unless `accept` holds
pub fn check_mission<F: Fn(&str) -> bool>(
    mds: &dyn MetadataSupplier,
    path: &str,
    sensor: &str,
    accept: F,
) -> Result<String> {
    let mission: String = mds.get_as(path)?;
    if !accept(&mission) {
        return Err(Error::missing(format!("Not a {sensor} product")));
    }
    Ok(mission)
}

pub fn read_fields(mds: &dyn MetadataSupplier, imd: &mut ImageMetadata, fields: &[Field]) -> Result<()> {
    for field in fields {
        let Some(value) = mds.metadata_value(field.path, None) else {
            if field.required {
                return Err(Error::missing(field.path));
            }
            continue;
        };
        let value = value.trim();
        match field.target {
            Target::Str(key) => imd.add(key, value.to_string()),
            Target::Num(key) => {
                let v = value.parse::<f64>().map_err(|_| Error::LexicalCast {
                    value: value.to_string(),
                    target: "f64",
                })?;
                imd.add(key, v);
            }
            Target::Time(key) => imd.add(key, parse_time(value)?),
        }
    }
    Ok(())
}

/// Per-band polarisation from `band_path`, or the image-level `image_path` value for
/// every band. Without bands the image-level value is stored on the image.
pub fn read_polarizations(
    mds: &dyn MetadataSupplier,
    imd: &mut ImageMetadata,
    band_path: &str,
    image_path: Option<&str>,
) {
    ensure_bands(imd, mds.nb_bands());
    let fallback = image_path
        .and_then(|p| mds.metadata_value(p, None))
        .map(|p| p.trim().to_string());
    if imd.bands.is_empty() {
        if let Some(pol) = fallback {
            imd.add(StrKey::Polarization, pol);
        }
        return;
    }
    for (i, band) in imd.bands.iter_mut().enumerate() {
        let pol = mds
            .metadata_value(band_path, Some(i + 1))
            .map(|p| p.trim().to_string())
            .or_else(|| fallback.clone());
        if let Some(pol) = pol {
            band.add(StrKey::Polarization, pol);
        }
    }
}

/// Space separated polarisation list (`"HH HV"`), one entry per band in order
pub fn read_polarization_list(mds: &dyn MetadataSupplier, imd: &mut ImageMetadata, path: &str) {
    let Some(list) = mds.metadata_value(path, None) else {
        return;
    };
    let pols: Vec<&str> = list.split_whitespace().collect();
    ensure_bands(imd, pols.len());
    if imd.bands.len() != pols.len() {
        debug!(
            "{} polarisations for {} bands, keeping them on the image",
            pols.len(),
            imd.bands.len()
        );
        imd.add(StrKey::Polarization, pols.join(" "));
        return;
    }
    for (band, pol) in imd.bands.iter_mut().zip(pols) {
        band.add(StrKey::Polarization, pol.to_string());
    }
}
