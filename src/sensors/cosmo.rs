//! Cosmo-SkyMed products
use crate::error::Result;
use crate::io::MetadataSupplier;
use crate::metadata::{ImageMetadata, NumKey, StrKey, TimeKey};
use crate::sensors::ImageMetadataInterface;
use crate::sensors::sar::{Field, Target, check_mission, opt, read_fields, read_polarizations, req};

const GDAL_FIELDS: &[Field] = &[
    req("Product_Type", Target::Str(StrKey::ProductType)),
    req("Scene_Sensing_Start_UTC", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("Scene_Sensing_Stop_UTC", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("Acquisition_Mode", Target::Str(StrKey::Mode)),
    opt("Orbit_Direction", Target::Str(StrKey::OrbitDirection)),
    opt("Orbit_Number", Target::Num(NumKey::OrbitNumber)),
    opt("Radar_Frequency", Target::Num(NumKey::RadarFrequency)),
    opt("Rescaling_Factor", Target::Num(NumKey::RescalingFactor)),
];

const GEOM_FIELDS: &[Field] = &[
    req("support_data.product_type", Target::Str(StrKey::ProductType)),
    req("support_data.first_line_time", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("support_data.last_line_time", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("support_data.acquisition_mode", Target::Str(StrKey::Mode)),
    opt("support_data.orbit_pass", Target::Str(StrKey::OrbitDirection)),
    opt("support_data.radar_frequency", Target::Num(NumKey::RadarFrequency)),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CosmoImageMetadataInterface;

impl ImageMetadataInterface for CosmoImageMetadataInterface {
    fn name(&self) -> &'static str {
        "Cosmo"
    }

    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        check_mission(mds, "Mission_ID", "Cosmo-SkyMed", |m| m.trim() == "CSK")?;
        let satellite = mds.metadata_value("Satellite_ID", None).unwrap_or_else(|| "CSK".to_string());
        imd.add(StrKey::SensorId, satellite.trim().to_string());
        imd.add(StrKey::Mission, "CSK".to_string());
        read_fields(mds, imd, GDAL_FIELDS)?;
        read_polarizations(mds, imd, "Polarisation", Some("Polarisation"));
        Ok(())
    }

    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        let sensor = check_mission(mds, "sensor", "Cosmo-SkyMed", |s| s.trim().starts_with("CSK"))?;
        imd.add(StrKey::SensorId, sensor.trim().to_string());
        imd.add(StrKey::Mission, "CSK".to_string());
        read_fields(mds, imd, GEOM_FIELDS)?;
        read_polarizations(mds, imd, "support_data.polarisation", Some("support_data.polarisation"));
        Ok(())
    }
}
