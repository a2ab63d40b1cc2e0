//! Shared types and enums used across the crate.
//! Includes `ExportFormat`, `SupplierFormat` and `SensorFamily`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output layout for exported metadata
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Flat `key:value` geom file, band keys prefixed with `Band_<n>.`
    Geom,
    /// Strict JSON sidecar
    Json,
    /// Human readable dump (same layout as `Display`)
    Text,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Geom => write!(f, "Geom"),
            ExportFormat::Json => write!(f, "Json"),
            ExportFormat::Text => write!(f, "Text"),
        }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Geom => "geom",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

/// Where a metadata supplier reads its values from. Parsers use it to pick between
/// `parse_gdal` and `parse_geom`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub enum SupplierFormat {
    Gdal,
    #[default]
    Geom,
    Xml,
}

impl std::fmt::Display for SupplierFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupplierFormat::Gdal => write!(f, "Gdal"),
            SupplierFormat::Geom => write!(f, "Geom"),
            SupplierFormat::Xml => write!(f, "Xml"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum SensorFamily {
    Optical,
    Sar,
}

impl std::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorFamily::Optical => write!(f, "Optical"),
            SensorFamily::Sar => write!(f, "Sar"),
        }
    }
}
