//! Radarsat-2 products, including radiometric calibration lookups
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::io::{MetadataSupplier, MetadataSupplierExt, XmlMetadataSupplier};
use crate::io::supplier::split_vector;
use crate::metadata::{
    CalibrationLookup, GeomKey, GeomValue, ImageMetadata, LookupType, NumKey, SarCalib, StrKey,
    TimeKey,
};
use crate::sensors::ImageMetadataInterface;
use crate::sensors::sar::{
    Field, Target, check_mission, opt, read_fields, read_polarization_list, read_polarizations, req,
};
use crate::types::SupplierFormat;

const MISSION: &str = "RADARSAT-2";

const GDAL_FIELDS: &[Field] = &[
    req("PRODUCT_TYPE", Target::Str(StrKey::ProductType)),
    req("ACQUISITION_START_TIME", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("BEAM_MODE", Target::Str(StrKey::BeamMode)),
    opt("ORBIT_DIRECTION", Target::Str(StrKey::OrbitDirection)),
    opt("LINE_SPACING", Target::Num(NumKey::LineSpacing)),
    opt("PIXEL_SPACING", Target::Num(NumKey::PixelSpacing)),
];

const GEOM_FIELDS: &[Field] = &[
    req("support_data.product_type", Target::Str(StrKey::ProductType)),
    req("support_data.first_line_time", Target::Time(TimeKey::AcquisitionStartTime)),
    opt("support_data.last_line_time", Target::Time(TimeKey::AcquisitionStopTime)),
    opt("support_data.orbit_pass", Target::Str(StrKey::OrbitDirection)),
    opt("support_data.beam_mode", Target::Str(StrKey::BeamMode)),
    opt("support_data.radar_frequency", Target::Num(NumKey::RadarFrequency)),
    opt("support_data.prf", Target::Num(NumKey::Prf)),
];

/// Paths of the product's own `product.xml`
const XML_SATELLITE: &str = "product.sourceAttributes.satellite";
const XML_POLARIZATIONS: &str = "product.sourceAttributes.radarParameters.polarizations";

const XML_FIELDS: &[Field] = &[
    req(
        "product.imageGenerationParameters.generalProcessingInformation.productType",
        Target::Str(StrKey::ProductType),
    ),
    req("product.sourceAttributes.rawDataStartTime", Target::Time(TimeKey::AcquisitionStartTime)),
    opt(
        "product.imageGenerationParameters.sarProcessingInformation.zeroDopplerTimeLastLine",
        Target::Time(TimeKey::AcquisitionStopTime),
    ),
    opt("product.sourceAttributes.beamModeMnemonic", Target::Str(StrKey::BeamMode)),
    opt(
        "product.sourceAttributes.orbitAndAttitude.orbitInformation.passDirection",
        Target::Str(StrKey::OrbitDirection),
    ),
    opt(
        "product.sourceAttributes.radarParameters.radarCenterFrequency",
        Target::Num(NumKey::RadarFrequency),
    ),
    opt(
        "product.imageAttributes.rasterAttributes.sampledLineSpacing",
        Target::Num(NumKey::LineSpacing),
    ),
    opt(
        "product.imageAttributes.rasterAttributes.sampledPixelSpacing",
        Target::Num(NumKey::PixelSpacing),
    ),
];

/// Gain lookup files shipped next to `product.xml`
const LUT_FILES: [(LookupType, &str); 3] = [
    (LookupType::Sigma, r"lutSigma\.xml"),
    (LookupType::Beta, r"lutBeta\.xml"),
    (LookupType::Gamma, r"lutGamma\.xml"),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Radarsat2ImageMetadataInterface;

impl Radarsat2ImageMetadataInterface {
    /// Lookups from the `lut*.xml` files of the product. Types without a file get
    /// the neutral default lookup.
    pub fn lookups_from_lut_files(
        &self,
        mds: &dyn MetadataSupplier,
    ) -> Result<BTreeMap<LookupType, CalibrationLookup>> {
        let mut lookups = BTreeMap::new();
        for (lookup_type, pattern) in LUT_FILES {
            let Some(path) = mds.resource_file(pattern) else {
                continue;
            };
            let lut = XmlMetadataSupplier::open(&path)?;
            let offset = lut.get_as::<f64>("lut.offset")? as i64;
            let gains = lut.get_as_vector::<f32>("lut.gains")?;
            debug!("{} lookup: offset {}, {} gains", lookup_type, offset, gains.len());
            lookups.insert(
                lookup_type,
                CalibrationLookup::Radarsat2 {
                    lookup_type,
                    offset,
                    gains,
                },
            );
        }
        Ok(lookups)
    }

    /// Lookups from `referenceNoiseLevel[i]` geom entries
    pub fn lookups_from_geom(
        &self,
        mds: &dyn MetadataSupplier,
    ) -> Result<BTreeMap<LookupType, CalibrationLookup>> {
        let mut lookups = BTreeMap::new();
        for i in 0.. {
            let prefix = format!("referenceNoiseLevel[{i}].");
            let Some(correction) = mds.metadata_value(&format!("{prefix}incidenceAngleCorrection"), None)
            else {
                break;
            };
            let Some(lookup_type) = LookupType::from_incidence_correction(&correction) else {
                warn!("Unknown incidence angle correction {}", correction);
                continue;
            };
            let offset = mds.get_as::<f64>(&format!("{prefix}pixelFirstNoiseValue"))? as i64;
            let gains = split_vector::<f32>(&mds.get_as::<String>(&format!("{prefix}noiseLevelValues"))?)?;
            lookups.insert(
                lookup_type,
                CalibrationLookup::Radarsat2 {
                    lookup_type,
                    offset,
                    gains,
                },
            );
        }
        Ok(lookups)
    }

    /// Calibration set with one lookup per type; the DN lookup is always neutral
    pub fn create_calibration_lookup_data(
        &self,
        mut lookups: BTreeMap<LookupType, CalibrationLookup>,
        imd: &ImageMetadata,
    ) -> SarCalib {
        for lookup_type in LookupType::ALL {
            lookups
                .entry(lookup_type)
                .or_insert(CalibrationLookup::Default { lookup_type });
        }
        SarCalib {
            calibration_start_time: imd.get(TimeKey::AcquisitionStartTime).ok().copied(),
            calibration_stop_time: imd.get(TimeKey::AcquisitionStopTime).ok().copied(),
            rescaling_factor: 1.0,
            apply_noise_correction: false,
            lookups,
        }
    }

    /// `product.xml` read directly, LUT files from the same directory
    fn parse_product_xml(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        check_mission(mds, XML_SATELLITE, "Radarsat-2", |m| m.trim() == MISSION)?;
        read_fields(mds, imd, XML_FIELDS)?;
        read_polarization_list(mds, imd, XML_POLARIZATIONS);
        let lookups = self.lookups_from_lut_files(mds)?;
        self.finish(imd, lookups);
        Ok(())
    }

    fn finish(&self, imd: &mut ImageMetadata, lookups: BTreeMap<LookupType, CalibrationLookup>) {
        imd.add(StrKey::SensorId, MISSION.to_string());
        imd.add(StrKey::Mission, MISSION.to_string());
        let calib = self.create_calibration_lookup_data(lookups, imd);
        imd.add(GeomKey::SarCalib, GeomValue::SarCalib(calib));
    }
}

impl ImageMetadataInterface for Radarsat2ImageMetadataInterface {
    fn name(&self) -> &'static str {
        "Radarsat2"
    }

    fn parse_gdal(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        if mds.format() == SupplierFormat::Xml {
            return self.parse_product_xml(mds, imd);
        }
        check_mission(mds, "SATELLITE_IDENTIFIER", "Radarsat-2", |m| m.trim() == MISSION)?;
        read_fields(mds, imd, GDAL_FIELDS)?;
        read_polarizations(mds, imd, "POLARIMETRIC_INTERP", None);
        let lookups = self.lookups_from_lut_files(mds)?;
        self.finish(imd, lookups);
        Ok(())
    }

    fn parse_geom(&self, mds: &dyn MetadataSupplier, imd: &mut ImageMetadata) -> Result<()> {
        check_mission(mds, "sensor", "Radarsat-2", |m| m.trim() == MISSION)?;
        read_fields(mds, imd, GEOM_FIELDS)?;
        read_polarizations(mds, imd, "support_data.polarization", Some("support_data.polarization"));
        let lookups = self.lookups_from_geom(mds)?;
        self.finish(imd, lookups);
        Ok(())
    }
}
