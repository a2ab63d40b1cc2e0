use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::io::supplier::MetadataSupplier;
use crate::io::xml::find_resource;
use crate::metadata::{GeomKey, GeomValue, ImageMetadata, SpatialReference};
use crate::types::SupplierFormat;

/// Errors encountered when using GDAL
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<i32> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    let idx = wkt.rfind(KEY)?;
    let start = idx + KEY.len();
    let end = wkt[start..].find('"')?;
    wkt[start..start + end].parse().ok()
}

fn domain_map<M: Metadata>(object: &M, domain: &str) -> BTreeMap<String, String> {
    object
        .metadata_domain(domain)
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Metadata supplier over a GDAL dataset: default-domain items of the dataset and of
/// each raster band, plus the dataset projection.
#[derive(Debug, Clone)]
pub struct GdalMetadataSupplier {
    path: PathBuf,
    size: (usize, usize),
    projection: String,
    image: BTreeMap<String, String>,
    bands: Vec<BTreeMap<String, String>>,
}

impl GdalMetadataSupplier {
    /// Open a GDAL-supported dataset (e.g., GeoTIFF, JP2, SAFE, RS2 product.xml)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let band_count = dataset.raster_count() as usize;
        if band_count == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let (size_x, size_y) = dataset.raster_size();

        let mut projection = dataset.projection();
        if projection.is_empty() {
            // Fallback to GCP projection if available
            if let Some(gcp_proj) = dataset.gcp_projection() {
                projection = gcp_proj;
            }
        }

        let image = domain_map(&dataset, "");
        let mut bands = Vec::with_capacity(band_count);
        for index in 1..=band_count {
            let band = dataset.rasterband(index)?;
            bands.push(domain_map(&band, ""));
        }
        debug!(
            "Opened {:?}: {} dataset items, {} bands",
            path.as_ref(),
            image.len(),
            band_count
        );

        Ok(GdalMetadataSupplier {
            path: path.as_ref().to_path_buf(),
            size: (size_x as usize, size_y as usize),
            projection,
            image,
            bands,
        })
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    /// Raster size as (columns, lines)
    pub fn raster_size(&self) -> (usize, usize) {
        self.size
    }

    /// Record the dataset projection on `imd`, WKT and EPSG code when the WKT names one
    pub fn add_projection(&self, imd: &mut ImageMetadata) {
        if self.projection.is_empty() {
            return;
        }
        if let Some(code) = parse_epsg(&self.projection) {
            imd.add(GeomKey::ProjectionEpsg, GeomValue::Epsg(code));
        }
        imd.add(GeomKey::ProjectionWkt, GeomValue::Wkt(self.projection.clone()));
    }
}

impl MetadataSupplier for GdalMetadataSupplier {
    fn metadata_value(&self, path: &str, band: Option<usize>) -> Option<String> {
        match band {
            Some(b) => self.bands.get(b.checked_sub(1)?)?.get(path).cloned(),
            None => self.image.get(path).cloned(),
        }
    }

    /// Files of the product directory, e.g. the DIMAP document next to a JP2 tile
    fn resource_file(&self, pattern: &str) -> Option<PathBuf> {
        let dir = if self.path.is_dir() {
            self.path.as_path()
        } else {
            self.path.parent()?
        };
        find_resource(dir, pattern)
    }

    fn nb_bands(&self) -> usize {
        self.bands.len()
    }

    fn format(&self) -> SupplierFormat {
        SupplierFormat::Gdal
    }
}

/// Projection conversions through GDAL/OSR
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalSpatialReference;

impl SpatialReference for GdalSpatialReference {
    fn to_wkt(&self, description: &str) -> crate::error::Result<String> {
        let description = description.trim();
        let srs = match description.parse::<u32>() {
            Ok(code) => SpatialRef::from_epsg(code),
            Err(_) => SpatialRef::from_definition(description),
        }
        .map_err(GdalError::from)?;
        Ok(srs.to_wkt().map_err(GdalError::from)?)
    }
}
