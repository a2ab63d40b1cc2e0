use sensormeta::io::{KeywordlistSupplier, XmlMetadataSupplier};
use sensormeta::metadata::{Lut1d, Lut1dKey};
use sensormeta::types::SupplierFormat;
use sensormeta::{ImageMetadata, NumKey, StrKey, TimeKey, create_imi};

fn phr_document(level: &str) -> String {
    let bands = ["B0", "B1", "B2", "B3"];
    let radiance: String = bands
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "<Band_Radiance><BAND_ID>{b}</BAND_ID><GAIN>{}</GAIN><BIAS>0</BIAS></Band_Radiance>",
                9.0 + i as f64
            )
        })
        .collect();
    let irradiance: String = [1915.0, 1830.0, 1594.0, 1060.0]
        .iter()
        .map(|v| format!("<Band_Solar_Irradiance><VALUE>{v}</VALUE></Band_Solar_Irradiance>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Dimap_Document>
  <Dataset_Sources>
    <Source_Identification>
      <Strip_Source>
        <MISSION>PHR</MISSION>
        <MISSION_INDEX>1A</MISSION_INDEX>
        <INSTRUMENT>PHR</INSTRUMENT>
        <INSTRUMENT_INDEX>1A</INSTRUMENT_INDEX>
        <IMAGING_DATE>2012-01-01</IMAGING_DATE>
        <IMAGING_TIME>10:20:30.5Z</IMAGING_TIME>
      </Strip_Source>
    </Source_Identification>
  </Dataset_Sources>
  <Product_Information>
    <Delivery_Identification>
      <JOB_ID>JOB-42</JOB_ID>
      <PRODUCTION_DATE>2012-01-02T08:00:00Z</PRODUCTION_DATE>
    </Delivery_Identification>
  </Product_Information>
  <Processing_Information>
    <Product_Settings>
      <PROCESSING_LEVEL>{level}</PROCESSING_LEVEL>
      <SPECTRAL_PROCESSING>MS</SPECTRAL_PROCESSING>
    </Product_Settings>
  </Processing_Information>
  <Geometric_Data>
    <Use_Area>
      <Located_Geometric_Values>
        <Solar_Incidences>
          <SUN_ELEVATION>30.5</SUN_ELEVATION>
          <SUN_AZIMUTH>160.25</SUN_AZIMUTH>
        </Solar_Incidences>
        <Acquisition_Angles>
          <INCIDENCE_ANGLE>12</INCIDENCE_ANGLE>
          <INCIDENCE_ANGLE_ALONG_TRACK>3</INCIDENCE_ANGLE_ALONG_TRACK>
          <INCIDENCE_ANGLE_ACROSS_TRACK>-4</INCIDENCE_ANGLE_ACROSS_TRACK>
          <VIEWING_ANGLE>10.5</VIEWING_ANGLE>
          <AZIMUTH_ANGLE>180</AZIMUTH_ANGLE>
        </Acquisition_Angles>
      </Located_Geometric_Values>
    </Use_Area>
    <Refined_Model>
      <Time>
        <Time_Range>
          <START>2012-01-01T10:20:30.0Z</START>
          <END>2012-01-01T10:20:32.0Z</END>
        </Time_Range>
        <Time_Stamp>
          <LINE_PERIOD>0.0736</LINE_PERIOD>
        </Time_Stamp>
      </Time>
      <Geometric_Calibration>
        <Instrument_Calibration>
          <Swath_Range>
            <FIRST_COL>1</FIRST_COL>
            <LAST_COL>7000</LAST_COL>
          </Swath_Range>
        </Instrument_Calibration>
      </Geometric_Calibration>
    </Refined_Model>
  </Geometric_Data>
  <Radiometric_Data>
    <Radiometric_Calibration>
      <Instrument_Calibration>
        <Band_Measurement_List>
          {radiance}
          {irradiance}
        </Band_Measurement_List>
      </Instrument_Calibration>
    </Radiometric_Calibration>
  </Radiometric_Data>
</Dimap_Document>"#
    )
}

#[test]
fn pleiades_sensor_product() {
    let mds = XmlMetadataSupplier::from_xml_str(&phr_document("SENSOR")).unwrap();
    let mut imd = ImageMetadata::new();
    let parser = create_imi(&mut imd, &mds).unwrap();

    assert_eq!(parser.name(), "Pleiades");
    assert_eq!(imd.get(StrKey::SensorId).unwrap(), "PHR 1A");
    assert_eq!(imd.get(StrKey::GeometricLevel).unwrap(), "SENSOR");
    assert_eq!(*imd.get(NumKey::SatElevation).unwrap(), 78.0);
    assert_eq!(*imd.get(NumKey::SatAzimuth).unwrap(), 180.0);
    assert_eq!(imd.band_names(), vec!["B0", "B1", "B2", "B3"]);
    assert_eq!(
        imd.get_as_vector(NumKey::PhysicalGain).unwrap(),
        vec![9.0, 10.0, 11.0, 12.0]
    );
    assert_eq!(*imd.get(NumKey::RedDisplayChannel).unwrap(), 2.0);
    assert_eq!(imd.extra("LinePeriod").unwrap(), "0.0736");
    assert_eq!(imd.extra("SwathLastCol").unwrap(), "7000");
    assert!(imd.has(TimeKey::AcquisitionDate));
}

#[test]
fn pleiades_ortho_product_has_no_sensor_timing() {
    let mds = XmlMetadataSupplier::from_xml_str(&phr_document("ORTHO")).unwrap();
    let mut imd = ImageMetadata::new();
    create_imi(&mut imd, &mds).unwrap();

    assert_eq!(imd.get(StrKey::GeometricLevel).unwrap(), "ORTHO");
    assert!(!imd.has_extra("LinePeriod"));
    assert!(!imd.has_extra("TimeRangeStart"));
    assert_eq!(imd.band_count(), 4);
}

#[test]
fn optical_completeness_needs_spectral_sensitivity() {
    let mds = XmlMetadataSupplier::from_xml_str(&phr_document("ORTHO")).unwrap();
    let mut imd = ImageMetadata::new();
    create_imi(&mut imd, &mds).unwrap();
    assert!(!imd.has_optical_sensor_metadata());

    for band in imd.bands.iter_mut() {
        band.add(Lut1dKey::SpectralSensitivity, Lut1d::default());
    }
    assert!(imd.has_optical_sensor_metadata());
}

#[test]
fn unknown_product_keeps_input_untouched() {
    let kwl = [("MISSION_ID".to_string(), "UNKNOWN".to_string())]
        .into_iter()
        .collect();
    let mds = KeywordlistSupplier::new(kwl, SupplierFormat::Gdal).with_nb_bands(2);
    let mut imd = ImageMetadata::with_band_count(2);
    imd.add(StrKey::ProductType, "RAW".to_string());
    let before = imd.clone();

    let parser = create_imi(&mut imd, &mds).unwrap();
    assert_eq!(parser.name(), "Default");
    assert_eq!(imd, before);
}

#[test]
fn concurrent_registration_is_idempotent() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(sensormeta::register_built_in_factories))
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(sensormeta::sensors::registered_parser_names().len(), 8);
}
