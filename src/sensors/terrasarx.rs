//! TerraSAR-X and TanDEM-X products
use crate::error::Result;
use crate::io::MetadataSupplier;
use crate::metadata::{ImageMetadata, NumKey, StrKey, TimeKey};
use crate::sensors::ImageMetadataInterface;
use crate::sensors::sar::{Field, Target, check_mission, opt, read_fields, read_polarizations, req};

const GDAL_FIELDS: &[Field] = &[
    req("PRODUCT_TYPE", Target::Str(StrKey::ProductType)),
    req("START_TIME", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("STOP_TIME", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("IMAGING_MODE", Target::Str(StrKey::Mode)),
    opt("ORBIT_DIRECTION", Target::Str(StrKey::OrbitDirection)),
    opt("ABSOLUTE_ORBIT", Target::Num(NumKey::OrbitNumber)),
];

const GEOM_FIELDS: &[Field] = &[
    req("product_type", Target::Str(StrKey::ProductType)),
    req("azimuth_start_time", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("azimuth_stop_time", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("acquisitionInfo.imagingMode", Target::Str(StrKey::Mode)),
    opt("orbitDirection", Target::Str(StrKey::OrbitDirection)),
    opt("radarFrequency", Target::Num(NumKey::RadarFrequency)),
    opt("calibration.calibrationConstant.calFactor", Target::Num(NumKey::CalFactor)),
];

fn is_terrasar(mission: &str) -> bool {
    let mission = mission.trim();
    mission.starts_with("TSX") || mission.starts_with("TDX")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TerraSarXImageMetadataInterface;

impl ImageMetadataInterface for TerraSarXImageMetadataInterface {
    fn name(&self) -> &'static str {
        "TerraSarX"
    }

    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let mission = check_mission(mds, "MISSION_ID", "TerraSAR-X", is_terrasar)?;
        imd.add(StrKey::SensorId, mission.trim().to_string());
        imd.add(StrKey::Mission, mission.trim().to_string());
        read_fields(mds, imd, GDAL_FIELDS)?;
        read_polarizations(mds, imd, "POLARIMETRIC_INTERP", Some("POLARISATION"));
        Ok(())
    }

    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let sensor = check_mission(mds, "sensor", "TerraSAR-X", is_terrasar)?;
        imd.add(StrKey::SensorId, sensor.trim().to_string());
        imd.add(StrKey::Mission, sensor.trim().to_string());
        read_fields(mds, imd, GEOM_FIELDS)?;
        read_polarizations(mds, imd, "polarisation", Some("polarisation"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::KeywordlistSupplier;
    use crate::types::SupplierFormat;

    #[test]
    fn geom_cal_factor() {
        let kwl = [
            ("sensor", "TSX-1"),
            ("product_type", "SSC"),
            ("azimuth_start_time", "2008-03-10T16:46:34.5Z"),
            ("calibration.calibrationConstant.calFactor", "1.2e-5"),
            ("polarisation", "HH"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let mds = KeywordlistSupplier::new(kwl, SupplierFormat::Geom).with_nb_bands(1);
        let mut imd = ImageMetadata::new();
        TerraSarXImageMetadataInterface.parse(&mds, &mut imd).unwrap();
        assert_eq!(imd.get(StrKey::Mission).unwrap(), "TSX-1");
        approx::assert_relative_eq!(*imd.get(NumKey::CalFactor).unwrap(), 1.2e-5);
        assert_eq!(imd.bands[0].get(StrKey::Polarization).unwrap(), "HH");
    }
}
