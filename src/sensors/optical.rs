//! Optical DIMAP sensors: SPOT 5, Pleiades, SPOT 6/7 and Formosat 2.
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{MetadataSupplier, XmlMetadataSupplier};
use crate::metadata::values::parse_time;
use crate::metadata::{ImageMetadata, NumKey, StrKey, TimeKey};
use crate::sensors::dimap::{DIMAP_PREFIX, DimapData};
use crate::sensors::{ImageMetadataInterface, ensure_bands};
use crate::types::SupplierFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimapVersion {
    V1,
    V2,
}

/// A sensor delivered with a DIMAP document
pub trait DimapSensor: Send + Sync {
    const NAME: &'static str;
    const VERSION: DimapVersion;
    /// File name of the DIMAP document inside the product directory
    const DOCUMENT: &'static str;

    fn accepts(data: &DimapData) -> bool;
}

fn read_document(mds: &dyn MetadataSupplier, version: DimapVersion) -> Result<DimapData> {
    match version {
        DimapVersion::V1 => DimapData::from_dimap_v1(mds, DIMAP_PREFIX),
        DimapVersion::V2 => DimapData::from_dimap_v2(mds, DIMAP_PREFIX),
    }
}

fn read_dimap(mds: &dyn MetadataSupplier, version: DimapVersion, document: &str) -> Result<DimapData> {
    if mds.format() == SupplierFormat::Xml {
        return read_document(mds, version);
    }
    let path = mds
        .resource_file(document)
        .ok_or_else(|| Error::missing(format!("DIMAP document matching {document}")))?;
    let xml = XmlMetadataSupplier::open(path)?.with_nb_bands(mds.nb_bands());
    read_document(&xml, version)
}

/// Store DIMAP values as image and band metadata
pub fn fill_optical_metadata(d: &DimapData, imd: &mut ImageMetadata, nb_bands: usize) -> Result<()> {
    imd.add(StrKey::SensorId, format!("{} {}", d.mission, d.mission_index));
    imd.add(StrKey::Mission, d.mission.clone());
    imd.add(StrKey::Instrument, d.instrument.clone());
    imd.add(StrKey::InstrumentIndex, d.instrument_index.clone());
    imd.add(StrKey::GeometricLevel, d.processing_level.clone());

    if let Some(v) = d.sun_elevation.first() {
        imd.add(NumKey::SunElevation, *v);
    }
    if let Some(v) = d.sun_azimuth.first() {
        imd.add(NumKey::SunAzimuth, *v);
    }
    if let Some(v) = d.incidence_angle.first() {
        imd.add(NumKey::SatElevation, 90.0 - v);
    }
    let sat_azimuth = if d.mission == "FORMOSAT" {
        Some(d.sat_azimuth)
    } else {
        d.azimuth_angle
            .first()
            .or(d.scene_orientation.first())
            .copied()
    };
    if let Some(v) = sat_azimuth {
        imd.add(NumKey::SatAzimuth, v);
    }

    imd.add(TimeKey::ProductionDate, parse_time(&d.production_date)?);
    if !d.acquisition_date.is_empty() {
        imd.add(TimeKey::AcquisitionDate, parse_time(&d.acquisition_date)?);
    }

    let band_count = if d.band_ids.is_empty() {
        nb_bands
    } else {
        d.band_ids.len()
    };
    ensure_bands(imd, band_count);
    for (band, name) in imd.bands.iter_mut().zip(&d.band_ids) {
        band.add(StrKey::BandName, name.clone());
    }
    for (band, v) in imd.bands.iter_mut().zip(&d.physical_gain) {
        band.add(NumKey::PhysicalGain, *v);
    }
    for (band, v) in imd.bands.iter_mut().zip(&d.physical_bias) {
        band.add(NumKey::PhysicalBias, *v);
    }
    for (band, v) in imd.bands.iter_mut().zip(&d.solar_irradiance) {
        band.add(NumKey::SolarIrradiance, *v);
    }

    let extras = [
        ("ImageID", d.image_id.as_str()),
        ("SoftwareVersion", d.software_version.as_str()),
        ("SpectralProcessing", d.spectral_processing.as_str()),
        ("TimeRangeStart", d.time_range_start.as_str()),
        ("TimeRangeEnd", d.time_range_end.as_str()),
        ("LinePeriod", d.line_period.as_str()),
        ("SwathFirstCol", d.swath_first_col.as_str()),
        ("SwathLastCol", d.swath_last_col.as_str()),
    ];
    for (key, value) in extras {
        if !value.is_empty() {
            imd.add_extra(key, value);
        }
    }
    if d.step_count != 0 {
        imd.add_extra("StepCount", d.step_count.to_string());
    }

    // PHR bands come as B0 (blue), B1 (green), B2 (red), B3 (NIR)
    if d.mission == "PHR" && imd.bands.len() == 4 {
        imd.add(NumKey::RedDisplayChannel, 2.0);
        imd.add(NumKey::GreenDisplayChannel, 1.0);
        imd.add(NumKey::BlueDisplayChannel, 0.0);
    }
    Ok(())
}

impl<S: DimapSensor> ImageMetadataInterface for S {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let data = read_dimap(mds, S::VERSION, S::DOCUMENT)?;
        if !S::accepts(&data) {
            return Err(Error::missing(format!("Not a {} product", S::NAME)));
        }
        debug!("{} product {} {}", S::NAME, data.mission, data.mission_index);
        fill_optical_metadata(&data, imd, mds.nb_bands())
    }

    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let data = DimapData::from_geom(mds)?;
        if !S::accepts(&data) {
            return Err(Error::missing(format!("Not a {} product", S::NAME)));
        }
        fill_optical_metadata(&data, imd, mds.nb_bands())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Spot5ImageMetadataInterface;

impl DimapSensor for Spot5ImageMetadataInterface {
    const NAME: &'static str = "SPOT5";
    const VERSION: DimapVersion = DimapVersion::V1;
    const DOCUMENT: &'static str = r"METADATA\.DIM";

    fn accepts(data: &DimapData) -> bool {
        data.mission == "SPOT" && data.mission_index == "5"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PleiadesImageMetadataInterface;

impl DimapSensor for PleiadesImageMetadataInterface {
    const NAME: &'static str = "Pleiades";
    const VERSION: DimapVersion = DimapVersion::V2;
    const DOCUMENT: &'static str = r"DIM_PHR.*\.XML";

    fn accepts(data: &DimapData) -> bool {
        data.mission == "PHR"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Spot6ImageMetadataInterface;

impl DimapSensor for Spot6ImageMetadataInterface {
    const NAME: &'static str = "SPOT6";
    const VERSION: DimapVersion = DimapVersion::V2;
    const DOCUMENT: &'static str = r"DIM_SPOT[67].*\.XML";

    fn accepts(data: &DimapData) -> bool {
        data.mission == "SPOT" && matches!(data.mission_index.as_str(), "6" | "7")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Formosat2ImageMetadataInterface;

impl DimapSensor for Formosat2ImageMetadataInterface {
    const NAME: &'static str = "Formosat2";
    const VERSION: DimapVersion = DimapVersion::V1;
    const DOCUMENT: &'static str = r"METADATA\.DIM";

    fn accepts(data: &DimapData) -> bool {
        data.mission == "FORMOSAT" && data.mission_index == "2"
    }
}
