//! Single metadata dictionary: whole-image keys or the keys of one band.
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::metadata::calibration::SarCalib;
use crate::metadata::geometry::{GcpParam, GeomValue, RpcParam, SarParam};
use crate::metadata::keys::{
    GeomKey, Lut1dKey, Lut2dKey, MetadataKey, NumKey, StrKey, TimeKey, join_names,
};
use crate::metadata::values::{Lut1d, Lut2d, TimePoint};

/// Converts a projection description (WKT, EPSG code, Proj string) to canonical WKT
pub trait SpatialReference {
    fn to_wkt(&self, description: &str) -> Result<String>;
}

/// Six typed key/value maps plus a free-form bag for keys the model does not name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetadataBase {
    pub geometry_keys: BTreeMap<GeomKey, GeomValue>,
    pub numeric_keys: BTreeMap<NumKey, f64>,
    pub string_keys: BTreeMap<StrKey, String>,
    pub lut1d_keys: BTreeMap<Lut1dKey, Lut1d>,
    pub lut2d_keys: BTreeMap<Lut2dKey, Lut2d>,
    pub time_keys: BTreeMap<TimeKey, TimePoint>,
    pub extra_keys: BTreeMap<String, String>,
}

impl MetadataKey for GeomKey {
    type Value = GeomValue;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.geometry_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.geometry_keys
    }
}

impl MetadataKey for NumKey {
    type Value = f64;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.numeric_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.numeric_keys
    }
}

impl MetadataKey for StrKey {
    type Value = String;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.string_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.string_keys
    }
}

impl MetadataKey for Lut1dKey {
    type Value = Lut1d;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.lut1d_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.lut1d_keys
    }
}

impl MetadataKey for Lut2dKey {
    type Value = Lut2d;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.lut2d_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.lut2d_keys
    }
}

impl MetadataKey for TimeKey {
    type Value = TimePoint;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value> {
        &imd.time_keys
    }

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value> {
        &mut imd.time_keys
    }
}

fn union_into<K: Ord + Clone, V: Clone>(dst: &mut BTreeMap<K, V>, src: &BTreeMap<K, V>) {
    for (k, v) in src {
        dst.entry(k.clone()).or_insert_with(|| v.clone());
    }
}

impl ImageMetadataBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key
    pub fn add<K: MetadataKey>(&mut self, key: K, value: K::Value) {
        K::map_mut(self).insert(key, value);
    }

    /// Number of keys removed (0 or 1)
    pub fn remove<K: MetadataKey>(&mut self, key: K) -> usize {
        usize::from(K::map_mut(self).remove(&key).is_some())
    }

    pub fn has<K: MetadataKey>(&self, key: K) -> bool {
        K::map(self).contains_key(&key)
    }

    /// Indexed read. Fails with `KeyNotFound` when absent; guard optional keys with `has`.
    pub fn get<K: MetadataKey>(&self, key: K) -> Result<&K::Value> {
        K::map(self).get(&key).ok_or_else(|| Error::key_not_found(key))
    }

    pub fn add_extra<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.extra_keys.insert(key.into(), value.into());
    }

    pub fn remove_extra(&mut self, key: &str) -> usize {
        usize::from(self.extra_keys.remove(key).is_some())
    }

    pub fn has_extra(&self, key: &str) -> bool {
        self.extra_keys.contains_key(key)
    }

    pub fn extra(&self, key: &str) -> Result<&String> {
        self.extra_keys
            .get(key)
            .ok_or_else(|| Error::key_not_found(key))
    }


    pub fn rpc_param(&self) -> Result<&RpcParam> {
        match self.get(GeomKey::Rpc)? {
            GeomValue::Rpc(p) => Ok(p),
            other => Err(mismatch(GeomKey::Rpc, other)),
        }
    }

    pub fn sar_param(&self) -> Result<&SarParam> {
        match self.get(GeomKey::Sar)? {
            GeomValue::Sar(p) => Ok(p),
            other => Err(mismatch(GeomKey::Sar, other)),
        }
    }

    pub fn gcp_param(&self) -> Result<&GcpParam> {
        match self.get(GeomKey::Gcp)? {
            GeomValue::Gcp(p) => Ok(p),
            other => Err(mismatch(GeomKey::Gcp, other)),
        }
    }

    pub fn sar_calib(&self) -> Result<&SarCalib> {
        match self.get(GeomKey::SarCalib)? {
            GeomValue::SarCalib(p) => Ok(p),
            other => Err(mismatch(GeomKey::SarCalib, other)),
        }
    }

    /// First projection representation present, in WKT, EPSG, Proj order.
    /// Empty string when the image carries none.
    pub fn projected_geometry(&self) -> String {
        for key in [GeomKey::ProjectionWkt, GeomKey::ProjectionEpsg, GeomKey::ProjectionProj] {
            match self.geometry_keys.get(&key) {
                Some(GeomValue::Wkt(s)) | Some(GeomValue::Proj(s)) => return s.clone(),
                Some(GeomValue::Epsg(code)) => return code.to_string(),
                _ => {}
            }
        }
        String::new()
    }

    /// Projected geometry resolved to canonical WKT
    pub fn projection_wkt(&self, srs: &dyn SpatialReference) -> Result<String> {
        let projection = self.projected_geometry();
        if projection.is_empty() {
            return Ok(String::new());
        }
        srs.to_wkt(&projection)
    }

    pub fn projection_proj(&self) -> String {
        match self.geometry_keys.get(&GeomKey::ProjectionProj) {
            Some(GeomValue::Proj(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn has_sensor_geometry(&self) -> bool {
        self.has(GeomKey::Rpc) || self.has(GeomKey::Sar) || self.has(GeomKey::SensorGeometry)
    }

    pub fn has_projected_geometry(&self) -> bool {
        self.has(GeomKey::ProjectionWkt)
            || self.has(GeomKey::ProjectionEpsg)
            || self.has(GeomKey::ProjectionProj)
    }

    pub fn remove_sensor_geometry(&mut self) -> usize {
        self.remove(GeomKey::Rpc) + self.remove(GeomKey::Sar) + self.remove(GeomKey::SensorGeometry)
    }

    pub fn remove_projected_geometry(&mut self) -> usize {
        self.remove(GeomKey::ProjectionWkt)
            + self.remove(GeomKey::ProjectionEpsg)
            + self.remove(GeomKey::ProjectionProj)
    }


    /// Union with `other`. Keys already present here are kept: first writer wins.
    pub fn fuse(&mut self, other: &ImageMetadataBase) {
        union_into(&mut self.geometry_keys, &other.geometry_keys);
        union_into(&mut self.numeric_keys, &other.numeric_keys);
        union_into(&mut self.string_keys, &other.string_keys);
        union_into(&mut self.lut1d_keys, &other.lut1d_keys);
        union_into(&mut self.lut2d_keys, &other.lut2d_keys);
        union_into(&mut self.time_keys, &other.time_keys);
        union_into(&mut self.extra_keys, &other.extra_keys);
    }

    /// 0-based {red, green, blue} band indices, {0, 1, 2} unless display keys say otherwise
    pub fn default_display(&self) -> [usize; 3] {
        let channel = |key: NumKey, fallback: usize| {
            self.numeric_keys
                .get(&key)
                .map(|v| *v as usize)
                .unwrap_or(fallback)
        };
        [
            channel(NumKey::RedDisplayChannel, 0),
            channel(NumKey::GreenDisplayChannel, 1),
            channel(NumKey::BlueDisplayChannel, 2),
        ]
    }

    pub fn size(&self) -> usize {
        self.geometry_keys.len()
            + self.numeric_keys.len()
            + self.string_keys.len()
            + self.lut1d_keys.len()
            + self.lut2d_keys.len()
            + self.time_keys.len()
            + self.extra_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn key_list_num(&self) -> String {
        join_names(NumKey::ALL)
    }

    pub fn key_list_str(&self) -> String {
        join_names(StrKey::ALL)
    }

    pub fn key_list_l1d(&self) -> String {
        join_names(Lut1dKey::ALL)
    }

    pub fn key_list_time(&self) -> String {
        join_names(TimeKey::ALL)
    }
}

fn mismatch(key: GeomKey, value: &GeomValue) -> Error {
    Error::Parse(format!("Geometry key {} holds a {} payload", key, value.kind()))
}

/// Both dictionaries carry equal RPC models, or neither carries one
pub fn has_same_rpc_model(a: &ImageMetadataBase, b: &ImageMetadataBase) -> bool {
    a.geometry_keys.get(&GeomKey::Rpc) == b.geometry_keys.get(&GeomKey::Rpc)
}

pub fn has_same_sar_model(a: &ImageMetadataBase, b: &ImageMetadataBase) -> bool {
    a.geometry_keys.get(&GeomKey::Sar) == b.geometry_keys.get(&GeomKey::Sar)
}

pub fn has_same_sensor_model(a: &ImageMetadataBase, b: &ImageMetadataBase) -> bool {
    has_same_rpc_model(a, b) && has_same_sar_model(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::geometry::SensorGeometry;
    use crate::metadata::values::{LutAxis, parse_time};

    struct EchoSrs;

    impl SpatialReference for EchoSrs {
        fn to_wkt(&self, description: &str) -> Result<String> {
            Ok(format!("WKT[{description}]"))
        }
    }

    #[test]
    fn add_then_read_every_key_kind() {
        let mut imd = ImageMetadataBase::new();
        let t = parse_time("2020-05-04T03:02:01Z").unwrap();
        let lut1 = Lut1d::new(vec![LutAxis::regular(2, 0.0, 1.0)], vec![0.5, 0.7]).unwrap();
        let lut2 = Lut2d::new(
            vec![LutAxis::regular(1, 0.0, 1.0), LutAxis::regular(2, 0.0, 1.0)],
            vec![1.0, 2.0],
        )
        .unwrap();

        imd.add(GeomKey::ProjectionEpsg, GeomValue::Epsg(32631));
        imd.add(NumKey::SunElevation, 42.5);
        imd.add(StrKey::Mission, "PHR".to_string());
        imd.add(Lut1dKey::SpectralSensitivity, lut1.clone());
        imd.add(Lut2dKey::IncidenceAngleGrid, lut2.clone());
        imd.add(TimeKey::AcquisitionDate, t);
        imd.add_extra("TimeRangeStart", "2012-12-01T10:00:00");

        assert!(imd.has(GeomKey::ProjectionEpsg));
        assert_eq!(imd.get(GeomKey::ProjectionEpsg).unwrap(), &GeomValue::Epsg(32631));
        assert_eq!(*imd.get(NumKey::SunElevation).unwrap(), 42.5);
        assert_eq!(imd.get(StrKey::Mission).unwrap(), "PHR");
        assert_eq!(imd.get(Lut1dKey::SpectralSensitivity).unwrap(), &lut1);
        assert_eq!(imd.get(Lut2dKey::IncidenceAngleGrid).unwrap(), &lut2);
        assert_eq!(imd.get(TimeKey::AcquisitionDate).unwrap(), &t);
        assert_eq!(imd.extra("TimeRangeStart").unwrap(), "2012-12-01T10:00:00");
        assert_eq!(imd.size(), 7);
    }

    #[test]
    fn add_overwrites_within_one_dictionary() {
        let mut imd = ImageMetadataBase::new();
        imd.add(NumKey::PhysicalGain, 1.0);
        imd.add(NumKey::PhysicalGain, 2.0);
        assert_eq!(*imd.get(NumKey::PhysicalGain).unwrap(), 2.0);
    }

    #[test]
    fn remove_counts() {
        let mut imd = ImageMetadataBase::new();
        imd.add(StrKey::SensorId, "SPOT 5".to_string());
        imd.add_extra("StepCount", "12");
        assert_eq!(imd.remove(StrKey::SensorId), 1);
        assert_eq!(imd.remove(StrKey::SensorId), 0);
        assert_eq!(imd.remove_extra("StepCount"), 1);
        assert_eq!(imd.remove_extra("StepCount"), 0);
    }

    #[test]
    fn missing_key_is_an_error() {
        let imd = ImageMetadataBase::new();
        let err = imd.get(NumKey::SunAzimuth).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { ref key } if key == "SunAzimuth"));
        assert!(imd.extra("nope").is_err());
    }

    #[test]
    fn fuse_keeps_first_writer() {
        let mut a = ImageMetadataBase::new();
        a.add(NumKey::SunElevation, 10.0);
        let mut b = ImageMetadataBase::new();
        b.add(NumKey::SunElevation, 20.0);
        b.add(NumKey::SunAzimuth, 150.0);
        b.add_extra("Note", "from b");

        a.fuse(&b);
        assert_eq!(*a.get(NumKey::SunElevation).unwrap(), 10.0);
        assert_eq!(*a.get(NumKey::SunAzimuth).unwrap(), 150.0);
        assert_eq!(a.extra("Note").unwrap(), "from b");
    }

    #[test]
    fn projected_geometry_priority() {
        let mut imd = ImageMetadataBase::new();
        assert_eq!(imd.projected_geometry(), "");
        assert_eq!(imd.projection_wkt(&EchoSrs).unwrap(), "");

        imd.add(GeomKey::ProjectionProj, GeomValue::Proj("+proj=longlat".into()));
        assert_eq!(imd.projected_geometry(), "+proj=longlat");
        imd.add(GeomKey::ProjectionEpsg, GeomValue::Epsg(4326));
        assert_eq!(imd.projected_geometry(), "4326");
        imd.add(GeomKey::ProjectionWkt, GeomValue::Wkt("GEOGCS[...]".into()));
        assert_eq!(imd.projected_geometry(), "GEOGCS[...]");
        assert_eq!(imd.projection_wkt(&EchoSrs).unwrap(), "WKT[GEOGCS[...]]");
        assert_eq!(imd.projection_proj(), "+proj=longlat");

        assert!(imd.has_projected_geometry());
        assert_eq!(imd.remove_projected_geometry(), 3);
        assert!(!imd.has_projected_geometry());
    }

    #[test]
    fn sensor_geometry_is_a_disjunction() {
        let mut imd = ImageMetadataBase::new();
        assert!(!imd.has_sensor_geometry());
        imd.add(GeomKey::SensorGeometry, GeomValue::SensorGeometry(SensorGeometry::new("Dummy")));
        assert!(imd.has_sensor_geometry());
        imd.add(GeomKey::Rpc, GeomValue::Rpc(RpcParam::default()));
        imd.add(GeomKey::Sar, GeomValue::Sar(SarParam::default()));
        assert!(imd.rpc_param().is_ok());
        assert!(imd.sar_param().is_ok());
        assert_eq!(imd.remove_sensor_geometry(), 3);
        assert!(!imd.has_sensor_geometry());
    }

    #[test]
    fn typed_accessor_rejects_wrong_payload() {
        let mut imd = ImageMetadataBase::new();
        imd.add(GeomKey::Rpc, GeomValue::Wkt("oops".into()));
        assert!(matches!(imd.rpc_param(), Err(Error::Parse(_))));
        assert!(matches!(imd.gcp_param(), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn default_display_channels() {
        let mut imd = ImageMetadataBase::new();
        assert_eq!(imd.default_display(), [0, 1, 2]);
        imd.add(NumKey::RedDisplayChannel, 2.0);
        imd.add(NumKey::BlueDisplayChannel, 0.0);
        assert_eq!(imd.default_display(), [2, 1, 0]);
    }

    #[test]
    fn same_model_comparisons() {
        let mut a = ImageMetadataBase::new();
        let mut b = ImageMetadataBase::new();
        assert!(has_same_sensor_model(&a, &b));
        a.add(GeomKey::Rpc, GeomValue::Rpc(RpcParam::default()));
        assert!(!has_same_rpc_model(&a, &b));
        b.add(GeomKey::Rpc, GeomValue::Rpc(RpcParam::default()));
        assert!(has_same_sensor_model(&a, &b));
    }
}
