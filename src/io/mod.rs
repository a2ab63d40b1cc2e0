//! I/O layer: metadata suppliers the sensor parsers read from (`supplier`, `xml`,
//! `gdal`) and the `geom` persistence of parsed metadata.
pub mod supplier;
pub use supplier::{KeywordlistSupplier, MetadataSupplier, MetadataSupplierExt};

pub mod xml;
pub use xml::XmlMetadataSupplier;

pub mod gdal;
pub use gdal::{GdalError, GdalMetadataSupplier, GdalSpatialReference};

pub mod geom;
pub use geom::{read_geom_file, write_geom_file, write_json_sidecar, write_text};
