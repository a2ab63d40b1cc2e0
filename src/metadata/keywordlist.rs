//! Flat keyword-list form of the metadata dictionaries.
//!
//! Geometry payloads that cannot be written as a single string (RPC, GCP, SAR,
//! calibration, generic sensor geometry) are exported as a placeholder tag and
//! skipped on import; the image I/O layer writes and rebuilds them from
//! format-native sources. Only the projection keys survive the round trip.
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::ImageMetadataBase;
use crate::metadata::geometry::GeomValue;
use crate::metadata::keys::{GeomKey, Lut1dKey, Lut2dKey, NumKey, StrKey, TimeKey};
use crate::metadata::values::{Lut1d, Lut2d, format_time, parse_time};

pub type Keywordlist = BTreeMap<String, String>;
pub type KeywordlistVector = Vec<Keywordlist>;

fn geom_text(value: &GeomValue) -> String {
    match value {
        GeomValue::Wkt(s) | GeomValue::Proj(s) => s.clone(),
        GeomValue::Epsg(code) => code.to_string(),
        GeomValue::Rpc(_) => "<RPCParam>".to_string(),
        GeomValue::Gcp(_) => "<GCPParam>".to_string(),
        GeomValue::Sar(_) => "<SARParam>".to_string(),
        GeomValue::SarCalib(_) => "<SARCalib>".to_string(),
        GeomValue::SensorGeometry(g) => format!("<{}>", g.model),
    }
}

fn lexical_cast<T: std::str::FromStr>(text: &str, target: &'static str) -> Result<T> {
    text.trim().parse::<T>().map_err(|_| Error::LexicalCast {
        value: text.to_string(),
        target,
    })
}

/// Key lies under a geometry payload, e.g. `RPC.LineOffset` or `Band_1.GCP.Projection`
fn has_geom_prefix(key: &str) -> bool {
    GeomKey::ALL
        .iter()
        .any(|g| key.contains(&format!("{}.", g.name())))
}

impl ImageMetadataBase {
    /// Every key as `(canonical name, text value)`
    pub fn to_keywordlist(&self) -> Keywordlist {
        let mut kwl = Keywordlist::new();
        for (k, v) in &self.geometry_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| geom_text(v));
        }
        for (k, v) in &self.string_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| v.clone());
        }
        for (k, v) in &self.numeric_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| v.to_string());
        }
        for (k, v) in &self.lut1d_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| v.to_text());
        }
        for (k, v) in &self.lut2d_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| v.to_text());
        }
        for (k, v) in &self.time_keys {
            kwl.entry(k.name().to_string()).or_insert_with(|| format_time(v));
        }
        for (k, v) in &self.extra_keys {
            kwl.entry(k.clone()).or_insert_with(|| v.clone());
        }
        kwl
    }

    /// Reverse of [`to_keywordlist`](Self::to_keywordlist). Names are looked up as
    /// geometry, string, numeric, LUT1D, LUT2D then time keys; anything else lands in
    /// the extra-key bag. Malformed numeric or time text is an error.
    pub fn from_keywordlist(&mut self, kwl: &Keywordlist) -> Result<()> {
        for (name, value) in kwl {
            if let Some(key) = GeomKey::from_name(name) {
                match key {
                    GeomKey::ProjectionEpsg => {
                        self.add(key, GeomValue::Epsg(lexical_cast(value, "i32")?));
                    }
                    GeomKey::ProjectionWkt => self.add(key, GeomValue::Wkt(value.clone())),
                    GeomKey::ProjectionProj => self.add(key, GeomValue::Proj(value.clone())),
                    // rebuilt by the image I/O layer
                    _ => {}
                }
                continue;
            }
            if has_geom_prefix(name) {
                continue;
            }
            if let Some(key) = StrKey::from_name(name) {
                self.add(key, value.clone());
                continue;
            }
            if let Some(key) = NumKey::from_name(name) {
                self.add(key, lexical_cast::<f64>(value, "f64")?);
                continue;
            }
            if let Some(key) = Lut1dKey::from_name(name) {
                self.add(key, Lut1d::from_text(value)?);
                continue;
            }
            if let Some(key) = Lut2dKey::from_name(name) {
                self.add(key, Lut2d::from_text(value)?);
                continue;
            }
            if let Some(key) = TimeKey::from_name(name) {
                self.add(key, parse_time(value)?);
                continue;
            }
            debug!(
                "The metadata named '{}' with value '{}' was added to ExtraKeys.",
                name, value
            );
            self.add_extra(name.clone(), value.clone());
        }
        Ok(())
    }

    /// JSON-like dump of the keyword-list. Every entry, including the last, is followed
    /// by a comma, so strict JSON parsers reject the output; use
    /// [`to_json_value`](Self::to_json_value) for interchange.
    pub fn to_json(&self, multiline: bool) -> String {
        let sep = if multiline { "\n" } else { "" };
        let mut out = String::from("{");
        for (k, v) in self.to_keywordlist() {
            out.push_str(&format!("\"{k}\": \"{v}\",{sep}"));
        }
        out.push('}');
        out
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        let map = self
            .to_keywordlist()
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::geometry::{RpcParam, SensorGeometry};

    #[test]
    fn opaque_geometry_is_a_placeholder() {
        let mut imd = ImageMetadataBase::new();
        imd.add(GeomKey::Rpc, GeomValue::Rpc(RpcParam::default()));
        imd.add(GeomKey::ProjectionEpsg, GeomValue::Epsg(2154));
        imd.add(
            GeomKey::SensorGeometry,
            GeomValue::SensorGeometry(SensorGeometry::new("SarSensorModel")),
        );
        let kwl = imd.to_keywordlist();
        assert_eq!(kwl["RPC"], "<RPCParam>");
        assert_eq!(kwl["ProjectionEPSG"], "2154");
        assert_eq!(kwl["SensorGeometry"], "<SarSensorModel>");
    }

    #[test]
    fn geometry_objects_do_not_come_back() {
        let mut kwl = Keywordlist::new();
        kwl.insert("RPC".into(), "<RPCParam>".into());
        kwl.insert("RPC.LineOffset".into(), "12".into());
        kwl.insert("ProjectionWKT".into(), "PROJCS[...]".into());
        kwl.insert("Mission".into(), "SPOT".into());
        kwl.insert("SomethingElse".into(), "kept".into());

        let mut imd = ImageMetadataBase::new();
        imd.from_keywordlist(&kwl).unwrap();
        assert!(!imd.has(GeomKey::Rpc));
        assert!(!imd.has_extra("RPC.LineOffset"));
        assert_eq!(imd.projected_geometry(), "PROJCS[...]");
        assert_eq!(imd.get(StrKey::Mission).unwrap(), "SPOT");
        assert_eq!(imd.extra("SomethingElse").unwrap(), "kept");
    }

    #[test]
    fn bad_number_is_a_lexical_cast_error() {
        let mut kwl = Keywordlist::new();
        kwl.insert("SunElevation".into(), "high".into());
        let mut imd = ImageMetadataBase::new();
        let err = imd.from_keywordlist(&kwl).unwrap_err();
        assert!(matches!(err, Error::LexicalCast { target: "f64", .. }));
    }

    #[test]
    fn sub_microsecond_times_round_trip() {
        let mut imd = ImageMetadataBase::new();
        imd.add(
            TimeKey::AcquisitionStartTime,
            parse_time("2019-03-01T05:43:12.123456789Z").unwrap(),
        );
        let kwl = imd.to_keywordlist();
        assert_eq!(kwl["AcquisitionStartTime"], "2019-03-01T05:43:12.123456789Z");
        let mut back = ImageMetadataBase::new();
        back.from_keywordlist(&kwl).unwrap();
        assert_eq!(back, imd);
    }

    #[test]
    fn json_keeps_trailing_comma() {
        let mut imd = ImageMetadataBase::new();
        imd.add(StrKey::Mission, "PHR".to_string());
        imd.add(NumKey::SunAzimuth, 12.5);
        assert_eq!(
            imd.to_json(false),
            "{\"Mission\": \"PHR\",\"SunAzimuth\": \"12.5\",}"
        );
        assert_eq!(imd.to_json(true), "{\"Mission\": \"PHR\",\n\"SunAzimuth\": \"12.5\",\n}");
        assert_eq!(imd.to_json_value()["Mission"], "PHR");
    }
}
