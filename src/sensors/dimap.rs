//! DIMAP document reading shared by the SPOT, Pleiades and Formosat parsers.
//!
//! Version 1 (SPOT 5, Formosat 2) and version 2 (Pleiades, SPOT 6/7) documents
//! carry the same concepts under different paths; both are read into [`DimapData`].
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::io::{MetadataSupplier, MetadataSupplierExt};

pub const DIMAP_PREFIX: &str = "Dimap_Document.";

/// Raw values read from a DIMAP document or the equivalent geom keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimapData {
    pub mission: String,
    pub mission_index: String,
    pub image_id: String,
    pub band_ids: Vec<String>,

    pub sun_elevation: Vec<f64>,
    pub sun_azimuth: Vec<f64>,
    pub incidence_angle: Vec<f64>,
    pub along_track_incidence_angle: Vec<f64>,
    pub across_track_incidence_angle: Vec<f64>,
    pub along_track_viewing_angle: Vec<f64>,
    pub across_track_viewing_angle: Vec<f64>,
    pub viewing_angle: Vec<f64>,
    pub azimuth_angle: Vec<f64>,
    pub scene_orientation: Vec<f64>,
    pub sat_azimuth: f64,

    pub physical_bias: Vec<f64>,
    pub physical_gain: Vec<f64>,
    pub solar_irradiance: Vec<f64>,

    pub production_date: String,
    pub acquisition_date: String,
    pub instrument: String,
    pub instrument_index: String,
    pub processing_level: String,
    pub spectral_processing: String,
    pub software_version: String,
    pub step_count: i32,

    // PHR sensor-level products only
    pub time_range_start: String,
    pub time_range_end: String,
    pub line_period: String,
    pub swath_first_col: String,
    pub swath_last_col: String,
}

/// Values of `name` under `path`, or under `path_1`, `path_2`, ... when the
/// element repeats. Fails with `MissingMetadata` when nothing is found.
pub fn parse_vector<T: FromStr>(mds: &dyn MetadataSupplier, path: &str, name: &str) -> Result<Vec<T>> {
    let single = format!("{path}.{name}");
    if mds.has_value(&single) {
        return Ok(vec![mds.get_as(&single)?]);
    }
    let mut values = Vec::new();
    for i in 1.. {
        let indexed = format!("{path}_{i}.{name}");
        if !mds.has_value(&indexed) {
            break;
        }
        values.push(mds.get_as(&indexed)?);
    }
    if values.is_empty() {
        return Err(Error::missing(single));
    }
    Ok(values)
}

/// Like [`parse_vector`], `default` when the values are missing
pub fn parse_vector_or<T: FromStr>(
    mds: &dyn MetadataSupplier,
    path: &str,
    name: &str,
    default: Vec<T>,
) -> Result<Vec<T>> {
    match parse_vector(mds, path, name) {
        Err(e) if e.is_missing_metadata() => Ok(default),
        other => other,
    }
}

fn first_value<T: FromStr>(mds: &dyn MetadataSupplier, path: &str, name: &str) -> Result<T> {
    parse_vector(mds, path, name)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::missing(format!("{path}.{name}")))
}

/// `YYYY-MM-DD HH:MM:SS` to `YYYY-MM-DDTHH:MM:SS`
pub fn fix_date_separator(date: &mut String) {
    if let Some(pos) = date.get(10..).and_then(|rest| rest.find(' ')) {
        date.replace_range(10 + pos..11 + pos, "T");
    }
}

fn read_vector(mds: &dyn MetadataSupplier, path: &str) -> Result<Vec<f64>> {
    mds.get_as_vector(path)
}

impl DimapData {
    pub fn is_phr_sensor(&self) -> bool {
        self.mission == "PHR" && self.processing_level == "SENSOR"
    }

    /// DIMAP v1 document (SPOT 5, Formosat 2)
    pub fn from_dimap_v1(mds: &dyn MetadataSupplier, prefix: &str) -> Result<Self> {
        let sources = format!("{prefix}Dataset_Sources.Source_Information");
        let band_info = format!("{prefix}Image_Interpretation.Spectral_Band_Info");
        let band_parameters = format!("{prefix}Data_Strip.Sensor_Calibration.Calibration.Band_Parameters");

        let mut d = DimapData {
            mission: first_value(mds, &sources, "Scene_Source.MISSION")?,
            mission_index: first_value(mds, &sources, "Scene_Source.MISSION_INDEX")?,
            ..DimapData::default()
        };
        d.band_ids = parse_vector_or(mds, &band_info, "BAND_DESCRIPTION", Vec::new())?;
        d.sun_elevation = parse_vector(mds, &sources, "Scene_Source.SUN_ELEVATION")?;
        d.sun_azimuth = parse_vector(mds, &sources, "Scene_Source.SUN_AZIMUTH")?;

        d.incidence_angle = parse_vector_or(mds, &sources, "Scene_Source.INCIDENCE_ANGLE", Vec::new())?;
        if d.incidence_angle.is_empty() {
            d.incidence_angle = parse_vector(mds, &sources, "Scene_Source.SATELLITE_INCIDENCE_ANGLE")?;
        }
        d.along_track_viewing_angle =
            parse_vector_or(mds, &sources, "Scene_Source.VIEWING_ANGLE_ALONG_TRACK", Vec::new())?;
        d.across_track_viewing_angle =
            parse_vector_or(mds, &sources, "Scene_Source.VIEWING_ANGLE_ACROSS_TRACK", Vec::new())?;

        d.physical_bias = parse_vector_or(
            mds,
            &band_parameters,
            "Gain_Section_List.Gain_Section.PHYSICAL_BIAS",
            Vec::new(),
        )?;
        if d.physical_bias.is_empty() {
            d.physical_bias = parse_vector(mds, &band_info, "PHYSICAL_BIAS")?;
        }
        d.physical_gain = parse_vector_or(
            mds,
            &band_parameters,
            "Gain_Section_List.Gain_Section.PHYSICAL_GAIN",
            Vec::new(),
        )?;
        if d.physical_gain.is_empty() {
            d.physical_gain = parse_vector(mds, &band_info, "PHYSICAL_GAIN")?;
        }

        d.solar_irradiance = parse_vector_or(
            mds,
            &format!("{prefix}Radiometric_Data.Radiometric_Calibration.Instrument_Calibration.Band_Measurement_List.Band_Solar_Irradiance"),
            "VALUE",
            Vec::new(),
        )?;
        if d.solar_irradiance.is_empty() {
            d.solar_irradiance = parse_vector_or(
                mds,
                &format!("{prefix}Data_Strip.Sensor_Calibration.Solar_Irradiance.Band_Solar_Irradiance"),
                "SOLAR_IRRADIANCE_VALUE",
                Vec::new(),
            )?;
        }
        d.scene_orientation = parse_vector(mds, &format!("{prefix}Dataset_Frame"), "SCENE_ORIENTATION")?;

        d.image_id = mds.get_as(&format!("{prefix}Production.JOB_ID"))?;
        d.production_date = mds.get_as(&format!("{prefix}Production.DATASET_PRODUCTION_DATE"))?;
        fix_date_separator(&mut d.production_date);

        d.acquisition_date = mds.get_as_or(
            String::new(),
            &format!("{prefix}Data_Strip.Sensor_Configuration.Time_Stamp.SCENE_CENTER_TIME"),
        );
        if d.acquisition_date.is_empty() {
            d.acquisition_date =
                mds.get_as_or(String::new(), &format!("{prefix}Data_Strip.Time_Stamp.REFERENCE_TIME"));
            fix_date_separator(&mut d.acquisition_date);
        }

        d.instrument = first_value(mds, &sources, "Scene_Source.INSTRUMENT")?;
        d.instrument_index = first_value(mds, &sources, "Scene_Source.INSTRUMENT_INDEX")?;
        d.processing_level = mds.get_as(&format!("{prefix}Data_Processing.PROCESSING_LEVEL"))?;

        if d.mission == "SPOT" && d.mission_index == "5" {
            d.step_count =
                mds.get_as(&format!("{prefix}Data_Strip.Sensor_Configuration.Mirror_Position.STEP_COUNT"))?;
        }
        if d.mission == "FORMOSAT" && d.mission_index == "2" {
            d.software_version =
                mds.get_as(&format!("{prefix}Production.Production_Facility.SOFTWARE_VERSION"))?;
            d.sat_azimuth = mds.get_as(&format!(
                "{prefix}Dataset_Sources.Source_Information.Scene_Source.SATELLITE_AZIMUTH_ANGLE"
            ))?;
        }
        Ok(d)
    }

    /// DIMAP v2 document (Pleiades, SPOT 6/7)
    pub fn from_dimap_v2(mds: &dyn MetadataSupplier, prefix: &str) -> Result<Self> {
        let sources = format!("{prefix}Dataset_Sources.Source_Identification");
        let radiance = format!(
            "{prefix}Radiometric_Data.Radiometric_Calibration.Instrument_Calibration.Band_Measurement_List.Band_Radiance"
        );
        let irradiance = format!(
            "{prefix}Radiometric_Data.Radiometric_Calibration.Instrument_Calibration.Band_Measurement_List.Band_Solar_Irradiance"
        );
        let angles = format!("{prefix}Geometric_Data.Use_Area.Located_Geometric_Values");

        let mut d = DimapData {
            mission: first_value(mds, &sources, "Strip_Source.MISSION")?,
            mission_index: first_value(mds, &sources, "Strip_Source.MISSION_INDEX")?,
            ..DimapData::default()
        };
        d.band_ids = parse_vector(mds, &radiance, "BAND_ID")?;
        d.sun_elevation = parse_vector(mds, &angles, "Solar_Incidences.SUN_ELEVATION")?;
        d.sun_azimuth = parse_vector(mds, &angles, "Solar_Incidences.SUN_AZIMUTH")?;
        d.incidence_angle = parse_vector(mds, &angles, "Acquisition_Angles.INCIDENCE_ANGLE")?;
        d.along_track_incidence_angle =
            parse_vector(mds, &angles, "Acquisition_Angles.INCIDENCE_ANGLE_ALONG_TRACK")?;
        d.across_track_incidence_angle =
            parse_vector(mds, &angles, "Acquisition_Angles.INCIDENCE_ANGLE_ACROSS_TRACK")?;
        d.viewing_angle = parse_vector(mds, &angles, "Acquisition_Angles.VIEWING_ANGLE")?;
        d.azimuth_angle = parse_vector(mds, &angles, "Acquisition_Angles.AZIMUTH_ANGLE")?;
        d.scene_orientation = d.azimuth_angle.clone();

        d.physical_bias = parse_vector_or(mds, &radiance, "BIAS", Vec::new())?;
        d.physical_gain = parse_vector_or(mds, &radiance, "GAIN", Vec::new())?;
        d.solar_irradiance = parse_vector(mds, &irradiance, "VALUE")?;

        d.image_id = mds.get_as(&format!("{prefix}Product_Information.Delivery_Identification.JOB_ID"))?;
        d.production_date =
            mds.get_as(&format!("{prefix}Product_Information.Delivery_Identification.PRODUCTION_DATE"))?;

        let imaging_date: String = first_value(mds, &sources, "Strip_Source.IMAGING_DATE")?;
        let imaging_time: String = first_value(mds, &sources, "Strip_Source.IMAGING_TIME")?;
        d.acquisition_date = format!("{imaging_date}T{imaging_time}");

        d.instrument = first_value(mds, &sources, "Strip_Source.INSTRUMENT")?;
        d.instrument_index = first_value(mds, &sources, "Strip_Source.INSTRUMENT_INDEX")?;
        d.processing_level =
            mds.get_as(&format!("{prefix}Processing_Information.Product_Settings.PROCESSING_LEVEL"))?;
        d.spectral_processing =
            mds.get_as(&format!("{prefix}Processing_Information.Product_Settings.SPECTRAL_PROCESSING"))?;

        if d.is_phr_sensor() {
            let model = format!("{prefix}Geometric_Data.Refined_Model");
            d.time_range_start = mds.get_as(&format!("{model}.Time.Time_Range.START"))?;
            d.time_range_end = mds.get_as(&format!("{model}.Time.Time_Range.END"))?;
            d.line_period = mds.get_as(&format!("{model}.Time.Time_Stamp.LINE_PERIOD"))?;
            d.swath_first_col = mds.get_as(&format!(
                "{model}.Geometric_Calibration.Instrument_Calibration.Swath_Range.FIRST_COL"
            ))?;
            d.swath_last_col = mds.get_as(&format!(
                "{model}.Geometric_Calibration.Instrument_Calibration.Swath_Range.LAST_COL"
            ))?;
        }
        Ok(d)
    }

    /// Geom keyword-list written by the sensor model layer (`sensor`, `support_data.*`)
    pub fn from_geom(mds: &dyn MetadataSupplier) -> Result<Self> {
        let sensor: String = mds.get_as("sensor")?;
        let mut parts = sensor.split(' ');
        let mut d = DimapData {
            mission: parts.next().unwrap_or_default().to_string(),
            mission_index: parts.next().unwrap_or_default().to_string(),
            ..DimapData::default()
        };

        d.image_id = mds.get_as("support_data.image_id")?;
        d.processing_level = mds.get_as_or(String::new(), "support_data.processing_level");
        let band_names: String = mds.get_as_or(String::new(), "support_data.band_name_list");
        d.band_ids = band_names
            .replace('"', " ")
            .split_whitespace()
            .map(str::to_string)
            .collect();

        d.production_date = mds.get_as("support_data.production_date")?;
        fix_date_separator(&mut d.production_date);
        d.acquisition_date = mds.get_as("support_data.image_date")?;
        fix_date_separator(&mut d.acquisition_date);

        d.instrument = mds.get_as("support_data.instrument")?;
        d.instrument_index = mds.get_as("support_data.instrument_index")?;

        d.sun_azimuth = read_vector(mds, "support_data.azimuth_angle")?;
        d.sun_elevation = read_vector(mds, "support_data.elevation_angle")?;
        d.incidence_angle = read_vector(mds, "support_data.incident_angle")?;
        d.scene_orientation = read_vector(mds, "support_data.scene_orientation")?;
        d.step_count = mds.get_as_or(0, "support_data.step_count");
        d.physical_gain = read_vector(mds, "support_data.physical_gain")?;
        d.physical_bias = read_vector(mds, "support_data.physical_bias")?;
        d.solar_irradiance = read_vector(mds, "support_data.solar_irradiance")?;
        d.software_version = mds.get_as_or(String::new(), "support_data.software_version");
        d.sat_azimuth = mds.get_as_or(0.0, "support_data.sat_azimuth_angle");

        if mds.has_value("viewing_angle_across_track") {
            d.across_track_viewing_angle = vec![mds.get_as("viewing_angle_across_track")?];
        }
        if mds.has_value("viewing_angle_along_track") {
            d.along_track_viewing_angle = vec![mds.get_as("viewing_angle_along_track")?];
        }
        if mds.has_value("support_data.along_track_incidence_angle") {
            d.along_track_incidence_angle = read_vector(mds, "support_data.along_track_incidence_angle")?;
        }
        if mds.has_value("support_data.across_track_incidence_angle") {
            d.across_track_incidence_angle = read_vector(mds, "support_data.across_track_incidence_angle")?;
        }

        if d.is_phr_sensor() {
            d.time_range_start = mds.get_as("support_data.time_range_start")?;
            d.time_range_end = mds.get_as("support_data.time_range_end")?;
            d.line_period = mds.get_as("support_data.line_period")?;
            d.swath_first_col = mds.get_as("support_data.swath_first_col")?;
            d.swath_last_col = mds.get_as("support_data.swath_last_col")?;
        }
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::KeywordlistSupplier;
    use crate::types::SupplierFormat;

    fn supplier(pairs: &[(&str, &str)]) -> KeywordlistSupplier {
        let kwl = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        KeywordlistSupplier::new(kwl, SupplierFormat::Xml)
    }

    #[test]
    fn vector_prefers_single_element() {
        let mds = supplier(&[("A.B.V", "1"), ("A.B_1.V", "2")]);
        assert_eq!(parse_vector::<f64>(&mds, "A.B", "V").unwrap(), vec![1.0]);
    }

    #[test]
    fn vector_walks_numbered_siblings() {
        let mds = supplier(&[("A.B_1.V", "1"), ("A.B_2.V", "2"), ("A.B_4.V", "4")]);
        assert_eq!(parse_vector::<f64>(&mds, "A.B", "V").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_vector_is_missing_metadata() {
        let mds = supplier(&[]);
        let err = parse_vector::<f64>(&mds, "A.B", "V").unwrap_err();
        assert!(err.is_missing_metadata());
        assert_eq!(
            parse_vector_or::<f64>(&mds, "A.B", "V", vec![3.0]).unwrap(),
            vec![3.0]
        );
    }

    #[test]
    fn bad_vector_value_is_not_swallowed() {
        let mds = supplier(&[("A.B.V", "abc")]);
        let err = parse_vector_or::<f64>(&mds, "A.B", "V", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::LexicalCast { .. }));
    }

    #[test]
    fn date_separator_only_after_the_date() {
        let mut d = "2012-12-01 10:30:15".to_string();
        fix_date_separator(&mut d);
        assert_eq!(d, "2012-12-01T10:30:15");

        let mut date_only = "2012-12-01".to_string();
        fix_date_separator(&mut date_only);
        assert_eq!(date_only, "2012-12-01");

        let mut short = "2012".to_string();
        fix_date_separator(&mut short);
        assert_eq!(short, "2012");
    }

    #[test]
    fn geom_splits_sensor_name() {
        let mds = supplier(&[
            ("sensor", "SPOT 5"),
            ("support_data.image_id", "J1"),
            ("support_data.band_name_list", "\"XS1 XS2\""),
            ("support_data.production_date", "2004-01-02 03:04:05"),
            ("support_data.image_date", "2004-01-01 10:00:00"),
            ("support_data.instrument", "HRG"),
            ("support_data.instrument_index", "1"),
            ("support_data.azimuth_angle", "150.5"),
            ("support_data.elevation_angle", "40.1"),
            ("support_data.incident_angle", "\"3.5\""),
            ("support_data.scene_orientation", "12"),
            ("support_data.step_count", "48"),
            ("support_data.physical_gain", "1 2"),
            ("support_data.physical_bias", "0 0"),
            ("support_data.solar_irradiance", "1800 1500"),
            ("viewing_angle_across_track", "2.5"),
        ]);
        let d = DimapData::from_geom(&mds).unwrap();
        assert_eq!(d.mission, "SPOT");
        assert_eq!(d.mission_index, "5");
        assert_eq!(d.band_ids, vec!["XS1", "XS2"]);
        assert_eq!(d.production_date, "2004-01-02T03:04:05");
        assert_eq!(d.step_count, 48);
        assert_eq!(d.across_track_viewing_angle, vec![2.5]);
        assert!(d.along_track_viewing_angle.is_empty());
    }
}
