//! Sensor metadata parsers and the registry that picks one for a product.
//!
//! Each parser fills an [`ImageMetadata`] from a [`MetadataSupplier`]. A parser that
//! does not recognise the product fails with [`Error::MissingMetadata`], which the
//! registry reads as "try the next one".
//!
//! [`Error::MissingMetadata`]: crate::error::Error::MissingMetadata
pub mod dimap;
pub mod factory;
pub mod optical;
pub mod sar;

pub mod cosmo;
pub mod radarsat2;
pub mod sentinel1;
pub mod terrasarx;

use crate::error::Result;
use crate::io::MetadataSupplier;
use crate::metadata::ImageMetadata;
use crate::types::SupplierFormat;

pub use factory::{
    ParserFactory, ParserRegistry, create_imi, register_built_in_factories, register_factory,
    registered_parser_names,
};
pub use optical::{
    Formosat2ImageMetadataInterface, PleiadesImageMetadataInterface, Spot5ImageMetadataInterface,
    Spot6ImageMetadataInterface,
};
pub use cosmo::CosmoImageMetadataInterface;
pub use radarsat2::Radarsat2ImageMetadataInterface;
pub use sentinel1::Sentinel1ImageMetadataInterface;
pub use terrasarx::TerraSarXImageMetadataInterface;

/// Sensor-specific metadata parser
pub trait ImageMetadataInterface: Send + Sync {
    fn name(&self) -> &'static str;

    /// Parse from format-native metadata (GDAL domains or the product XML)
    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()>;

    /// Parse from a geom keyword-list
    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()>;

    fn parse(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        match mds.format() {
            SupplierFormat::Geom => self.parse_geom(mds, imd),
            SupplierFormat::Gdal | SupplierFormat::Xml => self.parse_gdal(mds, imd),
        }
    }
}

/// Fallback when no sensor parser applies. Leaves the metadata untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultImageMetadataInterface;

impl DefaultImageMetadataInterface {
    pub const NAME: &'static str = "Default";
}

impl ImageMetadataInterface for DefaultImageMetadataInterface {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse_gdal(&self, _mds: &dyn MetadataSupplier, _imd: &mut ImageMetadata) -> Result<()> {
        Ok(())
    }

    fn parse_geom(&self, _mds: &dyn MetadataSupplier, _imd: &mut ImageMetadata) -> Result<()> {
        Ok(())
    }
}

/// Grow an empty band list to `n` entries. Non-empty lists are left alone.
pub(crate) fn ensure_bands(imd: &mut ImageMetadata, n: usize) {
    if imd.bands.is_empty() && n > 0 {
        imd.bands = vec![Default::default(); n];
    }
}
