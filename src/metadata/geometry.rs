//! Geometry payloads stored under [`GeomKey`](crate::metadata::GeomKey).
//!
//! The set of payload kinds is closed, so the geometry map stores a sum type rather
//! than type-erased values. The sensor-model math that consumes these payloads
//! (RPC solving, SAR range/doppler, projections) lives outside this crate.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metadata::calibration::SarCalib;
use crate::metadata::values::TimePoint;

#[derive(Debug, Clone, PartialEq)]
pub enum GeomValue {
    Wkt(String),
    Epsg(i32),
    Proj(String),
    Rpc(RpcParam),
    Sar(SarParam),
    SarCalib(SarCalib),
    Gcp(GcpParam),
    SensorGeometry(SensorGeometry),
}

impl GeomValue {
    pub fn kind(&self) -> &'static str {
        match self {
            GeomValue::Wkt(_) => "Wkt",
            GeomValue::Epsg(_) => "Epsg",
            GeomValue::Proj(_) => "Proj",
            GeomValue::Rpc(_) => "RPCParam",
            GeomValue::Sar(_) => "SARParam",
            GeomValue::SarCalib(_) => "SARCalib",
            GeomValue::Gcp(_) => "GCPParam",
            GeomValue::SensorGeometry(_) => "SensorGeometry",
        }
    }
}

/// Rational polynomial coefficients
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RpcParam {
    pub line_offset: f64,
    pub sample_offset: f64,
    pub lat_offset: f64,
    pub lon_offset: f64,
    pub height_offset: f64,

    pub line_scale: f64,
    pub sample_scale: f64,
    pub lat_scale: f64,
    pub lon_scale: f64,
    pub height_scale: f64,

    pub line_num: [f64; 20],
    pub line_den: [f64; 20],
    pub sample_num: [f64; 20],
    pub sample_den: [f64; 20],
}

/// Ground control point: image position paired with ground coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gcp {
    pub id: String,
    pub info: String,
    pub col: f64,
    pub row: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GcpParam {
    /// Spatial reference of the ground coordinates
    pub projection: String,
    pub gcps: Vec<Gcp>,
}

/// Platform position/velocity at a given time (ECEF, metres and m/s)
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub time: TimePoint,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BurstRecord {
    pub azimuth_start_time: TimePoint,
    pub azimuth_stop_time: TimePoint,
    pub start_line: u64,
    pub end_line: u64,
    pub start_sample: u64,
    pub end_sample: u64,
    pub azimuth_anx_time: f64,
}

/// Radar acquisition geometry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SarParam {
    pub azimuth_time_interval: f64,
    pub near_range_time: f64,
    pub range_sampling_rate: f64,
    pub range_resolution: f64,
    pub number_of_lines_per_burst: u64,
    pub number_of_samples_per_burst: u64,
    pub right_looking_flag: bool,
    pub orbits: Vec<Orbit>,
    pub burst_records: Vec<BurstRecord>,
}

/// Model description for sensors whose geometry is neither RPC nor SAR
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorGeometry {
    pub model: String,
    pub params: BTreeMap<String, String>,
}

impl SensorGeometry {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            params: BTreeMap::new(),
        }
    }
}
