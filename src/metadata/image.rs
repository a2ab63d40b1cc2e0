//! Whole-image metadata plus one dictionary per band.
use std::fmt;
use std::ops::{Deref, DerefMut};

use approx::relative_eq;
use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::base::ImageMetadataBase;
use crate::metadata::keys::{Lut1dKey, MetadataKey, NumKey, StrKey, TimeKey};
use crate::metadata::keywordlist::{Keywordlist, KeywordlistVector};
use crate::metadata::values::julian_day;

/// Relative tolerance used when comparing band values during compaction
const COMPACT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetadata {
    pub base: ImageMetadataBase,
    pub bands: Vec<ImageMetadataBase>,
}

impl Deref for ImageMetadata {
    type Target = ImageMetadataBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for ImageMetadata {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

impl From<ImageMetadataBase> for ImageMetadata {
    fn from(base: ImageMetadataBase) -> Self {
        Self {
            base,
            bands: Vec::new(),
        }
    }
}

/// Keys of band 0 whose value is present and equal in every band
fn uniform_keys<K, V, F>(bands: &[ImageMetadataBase], map: F, eq: fn(&V, &V) -> bool) -> Vec<(K, V)>
where
    K: Ord + Clone,
    V: Clone,
    F: Fn(&ImageMetadataBase) -> &std::collections::BTreeMap<K, V>,
{
    let Some((first, rest)) = bands.split_first() else {
        return Vec::new();
    };
    map(first)
        .iter()
        .filter(|(k, v)| rest.iter().all(|b| map(b).get(*k).is_some_and(|o| eq(v, o))))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl ImageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty whole-image dictionary and `n` empty band dictionaries
    pub fn with_band_count(n: usize) -> Self {
        Self {
            base: ImageMetadataBase::new(),
            bands: vec![ImageMetadataBase::new(); n],
        }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Copy of the whole-image keys with bands `start..=end`
    pub fn slice(&self, start: usize, end: usize) -> Result<ImageMetadata> {
        if start > end || end >= self.bands.len() {
            return Err(Error::InvalidRange {
                start,
                end,
                len: self.bands.len(),
            });
        }
        Ok(ImageMetadata {
            base: self.base.clone(),
            bands: self.bands[start..=end].to_vec(),
        })
    }

    /// Lift numeric, string, time and extra keys shared by every band to the
    /// whole-image dictionary. Geometry and LUT keys stay on the bands.
    pub fn compact(&mut self) {
        if self.bands.len() < 2 {
            debug!("compact needs at least 2 bands, got {}", self.bands.len());
            return;
        }

        let numeric = uniform_keys(&self.bands, |b| &b.numeric_keys, |a, b| {
            relative_eq!(*a, *b, epsilon = COMPACT_EPSILON, max_relative = COMPACT_EPSILON)
        });
        for (k, v) in numeric {
            debug!("Compacting numeric key {}", k);
            self.base.add(k, v);
            self.bands.iter_mut().for_each(|b| {
                b.remove(k);
            });
        }

        let strings = uniform_keys(&self.bands, |b| &b.string_keys, |a, b| a == b);
        for (k, v) in strings {
            debug!("Compacting string key {}", k);
            self.base.add(k, v);
            self.bands.iter_mut().for_each(|b| {
                b.remove(k);
            });
        }

        let times = uniform_keys(&self.bands, |b| &b.time_keys, |a, b| {
            relative_eq!(julian_day(a), julian_day(b))
        });
        for (k, v) in times {
            debug!("Compacting time key {}", k);
            self.base.add(k, v);
            self.bands.iter_mut().for_each(|b| {
                b.remove(k);
            });
        }

        let extras = uniform_keys(&self.bands, |b| &b.extra_keys, |a, b| a == b);
        for (k, v) in extras {
            debug!("Compacting extra key {}", k);
            self.bands.iter_mut().for_each(|b| {
                b.remove_extra(&k);
            });
            self.base.add_extra(k, v);
        }
    }

    /// Concatenate the bands of `other`. Whole-image keys are left alone.
    pub fn append(&mut self, other: &ImageMetadata) {
        self.bands.extend(other.bands.iter().cloned());
    }

    /// Fuse whole-image keys and each aligned band pair; first writer wins.
    pub fn merge(&mut self, other: &ImageMetadata) {
        self.base.fuse(&other.base);
        for (mine, theirs) in self.bands.iter_mut().zip(other.bands.iter()) {
            mine.fuse(theirs);
        }
    }

    /// One value per band. Fails on the first band lacking `key`.
    pub fn get_as_vector(&self, key: NumKey) -> Result<Vec<f64>> {
        self.bands.iter().map(|b| b.get(key).copied()).collect()
    }

    /// True only if every band holds `key`
    pub fn has_band_metadata<K: MetadataKey>(&self, key: K) -> bool {
        self.bands.iter().all(|b| b.has(key))
    }

    pub fn add_band_values(&mut self, key: NumKey, values: &[f64]) -> Result<()> {
        if values.len() != self.bands.len() {
            return Err(Error::InvalidArgument {
                arg: "values",
                value: format!("{} values for {} bands", values.len(), self.bands.len()),
            });
        }
        for (band, value) in self.bands.iter_mut().zip(values) {
            band.add(key, *value);
        }
        Ok(())
    }

    fn band_strings(&self, key: StrKey) -> Vec<String> {
        self.bands
            .iter()
            .map(|b| b.get(key).ok().cloned())
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }

    /// Empty if any band lacks a name
    pub fn band_names(&self) -> Vec<String> {
        self.band_strings(StrKey::BandName)
    }

    pub fn enhanced_band_names(&self) -> Vec<String> {
        self.band_strings(StrKey::EnhancedBandName)
    }

    /// Key count over the whole image and every band
    pub fn size(&self) -> usize {
        self.base.size() + self.bands.iter().map(ImageMetadataBase::size).sum::<usize>()
    }

    /// Band key held by every band, or hoisted to the image by [`compact`](Self::compact)
    fn has_image_or_bands<K: MetadataKey>(&self, key: K) -> bool {
        self.base.has(key) || (!self.bands.is_empty() && self.has_band_metadata(key))
    }

    /// Everything optical radiometric calibration needs. Gain, bias, solar irradiance
    /// and spectral sensitivity are per band, but a value compacted to the image level
    /// counts for every band.
    pub fn has_optical_sensor_metadata(&self) -> bool {
        self.base.has(StrKey::SensorId)
            && [
                NumKey::SunElevation,
                NumKey::SunAzimuth,
                NumKey::SatElevation,
                NumKey::SatAzimuth,
            ]
            .into_iter()
            .all(|k| self.base.has(k))
            && self.base.has(TimeKey::AcquisitionDate)
            && self.base.has(TimeKey::ProductionDate)
            && [
                NumKey::PhysicalBias,
                NumKey::PhysicalGain,
                NumKey::SolarIrradiance,
            ]
            .into_iter()
            .all(|k| self.has_image_or_bands(k))
            && self.has_image_or_bands(Lut1dKey::SpectralSensitivity)
    }

    /// Everything SAR calibration needs. Polarization may be per band or, once
    /// compacted, on the image.
    pub fn has_sar_sensor_metadata(&self) -> bool {
        [
            StrKey::SensorId,
            StrKey::Mission,
            StrKey::ProductType,
            StrKey::OrbitDirection,
        ]
        .into_iter()
        .all(|k| self.base.has(k))
            && self.base.has(TimeKey::AcquisitionStartTime)
            && self.has_image_or_bands(StrKey::Polarization)
    }

    /// Index 0 holds the whole-image keys, then one entry per band
    pub fn to_keywordlists(&self) -> KeywordlistVector {
        let mut kwls = KeywordlistVector::new();
        self.append_to_keywordlists(&mut kwls);
        kwls
    }

    pub fn append_to_keywordlists(&self, kwls: &mut KeywordlistVector) {
        kwls.push(self.base.to_keywordlist());
        kwls.extend(self.bands.iter().map(ImageMetadataBase::to_keywordlist));
    }

    /// Rebuild from [`to_keywordlists`](Self::to_keywordlists) output. Bands are replaced.
    pub fn from_keywordlists(&mut self, kwls: &[Keywordlist]) -> Result<()> {
        let (image, bands) = kwls.split_first().ok_or_else(|| Error::InvalidArgument {
            arg: "keywordlists",
            value: "empty".to_string(),
        })?;
        self.base.from_keywordlist(image)?;
        self.bands = bands
            .iter()
            .map(|kwl| {
                let mut band = ImageMetadataBase::new();
                band.from_keywordlist(kwl)?;
                Ok(band)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// Loose JSON-like dump, whole-image keys then a `Bands[...]` list
    pub fn to_json(&self, multiline: bool) -> String {
        let mut out = format!("{{{}Bands[", self.base.to_json(multiline));
        for band in &self.bands {
            out.push_str(&band.to_json(multiline));
            out.push(',');
        }
        out.push_str("]\n}");
        out
    }

    /// Strict JSON: `{"image": {...}, "bands": [{...}, ...]}`
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "image": self.base.to_json_value(),
            "bands": self.bands.iter().map(ImageMetadataBase::to_json_value).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::values::parse_time;

    fn three_bands() -> ImageMetadata {
        let mut imd = ImageMetadata::with_band_count(3);
        for (i, band) in imd.bands.iter_mut().enumerate() {
            band.add(NumKey::PhysicalGain, 1.5);
            band.add(NumKey::PhysicalBias, i as f64);
            band.add(StrKey::BandName, format!("B{i}"));
            band.add(StrKey::Polarization, "HH".to_string());
            band.add(TimeKey::AcquisitionDate, parse_time("2019-06-01T10:00:00Z").unwrap());
            band.add_extra("Quality", "good");
        }
        imd
    }

    #[test]
    fn compact_lifts_only_uniform_keys() {
        let mut imd = three_bands();
        imd.compact();

        assert_eq!(*imd.get(NumKey::PhysicalGain).unwrap(), 1.5);
        assert_eq!(imd.get(StrKey::Polarization).unwrap(), "HH");
        assert!(imd.has(TimeKey::AcquisitionDate));
        assert_eq!(imd.extra("Quality").unwrap(), "good");
        assert!(!imd.has(NumKey::PhysicalBias));
        assert!(!imd.has(StrKey::BandName));
        for band in &imd.bands {
            assert!(!band.has(NumKey::PhysicalGain));
            assert!(!band.has_extra("Quality"));
            assert!(band.has(NumKey::PhysicalBias));
        }
    }

    #[test]
    fn compact_tolerates_rounding_noise() {
        let mut imd = ImageMetadata::with_band_count(2);
        imd.bands[0].add(NumKey::SolarIrradiance, 0.1 + 0.2);
        imd.bands[1].add(NumKey::SolarIrradiance, 0.3);
        imd.compact();
        assert!(imd.has(NumKey::SolarIrradiance));
    }

    #[test]
    fn compact_is_idempotent() {
        let mut once = three_bands();
        once.compact();
        let mut twice = once.clone();
        twice.compact();
        assert_eq!(once, twice);
    }

    #[test]
    fn compact_single_band_is_a_no_op() {
        let mut imd = three_bands().slice(0, 0).unwrap();
        let before = imd.clone();
        imd.compact();
        assert_eq!(imd, before);
    }

    #[test]
    fn compact_skips_key_missing_from_one_band() {
        let mut imd = three_bands();
        imd.bands[2].remove(NumKey::PhysicalGain);
        imd.compact();
        assert!(!imd.has(NumKey::PhysicalGain));
        assert!(imd.bands[0].has(NumKey::PhysicalGain));
    }

    #[test]
    fn slice_is_inclusive_and_checked() {
        let mut imd = three_bands();
        imd.add(StrKey::Mission, "PHR".to_string());
        let sub = imd.slice(1, 2).unwrap();
        assert_eq!(sub.band_count(), 2);
        assert_eq!(sub.bands[0], imd.bands[1]);
        assert_eq!(sub.base, imd.base);
        assert!(matches!(imd.slice(2, 1), Err(Error::InvalidRange { .. })));
        assert!(matches!(imd.slice(0, 3), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn merge_fuses_aligned_bands_only() {
        let mut a = ImageMetadata::with_band_count(1);
        a.add(StrKey::Mission, "SPOT".to_string());
        a.bands[0].add(NumKey::PhysicalGain, 1.0);

        let mut b = ImageMetadata::with_band_count(2);
        b.add(StrKey::Mission, "PHR".to_string());
        b.add(StrKey::SensorId, "PHR 1A".to_string());
        b.bands[0].add(NumKey::PhysicalGain, 9.0);
        b.bands[0].add(NumKey::PhysicalBias, 0.5);

        a.merge(&b);
        assert_eq!(a.get(StrKey::Mission).unwrap(), "SPOT");
        assert_eq!(a.get(StrKey::SensorId).unwrap(), "PHR 1A");
        assert_eq!(a.band_count(), 1);
        assert_eq!(*a.bands[0].get(NumKey::PhysicalGain).unwrap(), 1.0);
        assert_eq!(*a.bands[0].get(NumKey::PhysicalBias).unwrap(), 0.5);
    }

    #[test]
    fn append_leaves_image_keys_alone() {
        let mut a = ImageMetadata::with_band_count(1);
        let mut b = three_bands();
        b.add(StrKey::Mission, "PHR".to_string());
        a.append(&b);
        assert_eq!(a.band_count(), 4);
        assert!(!a.has(StrKey::Mission));
    }

    #[test]
    fn vector_extraction_needs_every_band() {
        let mut imd = three_bands();
        assert_eq!(imd.get_as_vector(NumKey::PhysicalBias).unwrap(), vec![0.0, 1.0, 2.0]);
        assert!(imd.has_band_metadata(NumKey::PhysicalBias));
        imd.bands[1].remove(NumKey::PhysicalBias);
        assert!(!imd.has_band_metadata(NumKey::PhysicalBias));
        assert!(matches!(
            imd.get_as_vector(NumKey::PhysicalBias),
            Err(Error::KeyNotFound { .. })
        ));
    }

    #[test]
    fn band_values_and_names() {
        let mut imd = three_bands();
        imd.add_band_values(NumKey::SolarIrradiance, &[1900.0, 1800.0, 1500.0]).unwrap();
        assert_eq!(*imd.bands[2].get(NumKey::SolarIrradiance).unwrap(), 1500.0);
        assert!(imd.add_band_values(NumKey::SolarIrradiance, &[1.0]).is_err());

        assert_eq!(imd.band_names(), vec!["B0", "B1", "B2"]);
        assert!(imd.enhanced_band_names().is_empty());
        imd.bands[0].remove(StrKey::BandName);
        assert!(imd.band_names().is_empty());
    }

    #[test]
    fn keywordlists_keep_band_order() {
        let mut imd = three_bands();
        imd.add(StrKey::Mission, "PHR".to_string());
        let kwls = imd.to_keywordlists();
        assert_eq!(kwls.len(), 4);
        assert_eq!(kwls[0]["Mission"], "PHR");
        assert_eq!(kwls[3]["BandName"], "B2");

        let mut back = ImageMetadata::new();
        back.from_keywordlists(&kwls).unwrap();
        assert_eq!(back, imd);
        assert!(back.from_keywordlists(&[]).is_err());
    }

    #[test]
    fn sar_completeness() {
        let mut imd = three_bands();
        assert!(!imd.has_sar_sensor_metadata());
        imd.add(StrKey::SensorId, "RADARSAT-2".to_string());
        imd.add(StrKey::Mission, "RADARSAT-2".to_string());
        imd.add(StrKey::ProductType, "SLC".to_string());
        imd.add(StrKey::OrbitDirection, "ASCENDING".to_string());
        imd.add(TimeKey::AcquisitionStartTime, parse_time("2019-06-01T10:00:00Z").unwrap());
        assert!(imd.has_sar_sensor_metadata());
        assert!(!imd.has_optical_sensor_metadata());
    }

    #[test]
    fn decoding_keywordlists_replaces_bands() {
        let mut source = ImageMetadata::with_band_count(1);
        source.bands[0].add(StrKey::BandName, "XS1".to_string());
        let mut imd = three_bands();
        imd.from_keywordlists(&source.to_keywordlists()).unwrap();
        assert_eq!(imd.band_names(), vec!["XS1"]);
    }

    #[test]
    fn optical_completeness_survives_compaction() {
        let mut imd = three_bands();
        imd.add(StrKey::SensorId, "PHR 1A".to_string());
        for key in [
            NumKey::SunElevation,
            NumKey::SunAzimuth,
            NumKey::SatElevation,
            NumKey::SatAzimuth,
        ] {
            imd.add(key, 45.0);
        }
        imd.add(TimeKey::AcquisitionDate, parse_time("2019-06-01T10:00:00Z").unwrap());
        imd.add(TimeKey::ProductionDate, parse_time("2019-06-02T10:00:00Z").unwrap());
        for band in imd.bands.iter_mut() {
            band.add(NumKey::SolarIrradiance, 1800.0);
            band.add(Lut1dKey::SpectralSensitivity, Default::default());
        }
        assert!(imd.has_optical_sensor_metadata());

        imd.compact();
        assert!(imd.bands.iter().all(|b| !b.has(NumKey::PhysicalGain)));
        assert!(imd.has_optical_sensor_metadata());

        imd.bands[1].remove(NumKey::PhysicalBias);
        assert!(!imd.has_optical_sensor_metadata());
    }

    #[test]
    fn display_lists_bands() {
        let mut imd = ImageMetadata::with_band_count(2);
        imd.add(StrKey::Mission, "PHR".to_string());
        imd.bands[0].add(StrKey::BandName, "P".to_string());
        let text = imd.to_string();
        assert!(text.starts_with("{{\"Mission\": \"PHR\",\n}Bands[{\"BandName\": \"P\",\n},{},"));
        assert!(text.ends_with("]\n}"));
        assert_eq!(imd.size(), 2);
        assert_eq!(imd.to_json_value()["bands"][0]["BandName"], "P");
    }
}
