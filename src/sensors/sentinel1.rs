//! Sentinel-1 SAFE products
use tracing::debug;

use crate::error::Result;
use crate::io::MetadataSupplier;
use crate::metadata::{ImageMetadata, NumKey, StrKey, TimeKey};
use crate::sensors::ImageMetadataInterface;
use crate::sensors::sar::{Field, Target, check_mission, opt, read_fields, read_polarizations, req};

const GDAL_FIELDS: &[Field] = &[
    req("PRODUCT_TYPE", Target::Str(StrKey::ProductType)),
    req("MODE", Target::Str(StrKey::Mode)),
    req("ACQUISITION_START_TIME", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("ACQUISITION_STOP_TIME", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("SWATH", Target::Str(StrKey::Swath)),
    opt("ORBIT_DIRECTION", Target::Str(StrKey::OrbitDirection)),
    opt("ORBIT_NUMBER", Target::Num(NumKey::OrbitNumber)),
];

const GEOM_FIELDS: &[Field] = &[
    req("manifest_data.product_type", Target::Str(StrKey::ProductType)),
    req("manifest_data.acquisition_start_time", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("manifest_data.acquisition_stop_time", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("manifest_data.instrument_mode", Target::Str(StrKey::Mode)),
    opt("header.swath", Target::Str(StrKey::Swath)),
    opt("support_data.orbit_pass", Target::Str(StrKey::OrbitDirection)),
    opt("support_data.abs_orbit", Target::Num(NumKey::OrbitNumber)),
    opt("support_data.radar_frequency", Target::Num(NumKey::RadarFrequency)),
    opt("support_data.range_sampling_rate", Target::Num(NumKey::Rsf)),
];

/// `S1A` -> `SENTINEL-1A`
fn mission_name(mission_id: &str) -> String {
    format!("SENTINEL-1{}", mission_id.trim().trim_start_matches("S1"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sentinel1ImageMetadataInterface;

impl ImageMetadataInterface for Sentinel1ImageMetadataInterface {
    fn name(&self) -> &'static str {
        "Sentinel1"
    }

    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let mission = check_mission(mds, "MISSION_ID", "Sentinel-1", |m| m.trim().starts_with("S1"))?;
        debug!("Sentinel-1 mission {}", mission);
        imd.add(StrKey::SensorId, "SENTINEL-1".to_string());
        imd.add(StrKey::Mission, mission_name(&mission));
        read_fields(mds, imd, GDAL_FIELDS)?;
        read_polarizations(mds, imd, "POLARISATION", None);
        Ok(())
    }

    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let sensor = check_mission(mds, "sensor", "Sentinel-1", |s| {
            s.trim().starts_with("SENTINEL-1")
        })?;
        imd.add(StrKey::SensorId, "SENTINEL-1".to_string());
        imd.add(StrKey::Mission, sensor.trim().to_string());
        read_fields(mds, imd, GEOM_FIELDS)?;
        read_polarizations(mds, imd, "header.polarisation", Some("header.polarisation"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::KeywordlistSupplier;
    use crate::types::SupplierFormat;

    fn supplier(pairs: &[(&str, &str)], format: SupplierFormat) -> KeywordlistSupplier {
        let kwl = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        KeywordlistSupplier::new(kwl, format)
    }

    #[test]
    fn reads_safe_metadata_domain() {
        let mds = supplier(
            &[
                ("MISSION_ID", "S1B"),
                ("PRODUCT_TYPE", "GRD"),
                ("MODE", "IW"),
                ("ACQUISITION_START_TIME", "2019-03-01T05:43:12.123456"),
                ("ORBIT_DIRECTION", "DESCENDING"),
                ("ORBIT_NUMBER", "15123"),
                ("Band_1.POLARISATION", "VV"),
                ("Band_2.POLARISATION", "VH"),
            ],
            SupplierFormat::Gdal,
        );
        let mut imd = ImageMetadata::new();
        Sentinel1ImageMetadataInterface.parse(&mds, &mut imd).unwrap();
        assert_eq!(imd.get(StrKey::Mission).unwrap(), "SENTINEL-1B");
        assert_eq!(imd.get(StrKey::ProductType).unwrap(), "GRD");
        assert_eq!(*imd.get(NumKey::OrbitNumber).unwrap(), 15123.0);
        assert_eq!(imd.bands[1].get(StrKey::Polarization).unwrap(), "VH");
        assert!(imd.has_sar_sensor_metadata());
    }

    #[test]
    fn other_missions_are_not_applicable() {
        let mds = supplier(&[("MISSION_ID", "CSK")], SupplierFormat::Gdal);
        let mut imd = ImageMetadata::new();
        let err = Sentinel1ImageMetadataInterface.parse(&mds, &mut imd).unwrap_err();
        assert!(err.is_missing_metadata());
        assert!(imd.is_empty());
    }
}
