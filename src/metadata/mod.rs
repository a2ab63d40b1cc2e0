//! In-memory metadata model: typed key dictionaries, per-band metadata and the
//! keyword-list codec.
pub mod base;
pub mod calibration;
pub mod geometry;
pub mod image;
pub mod keys;
pub mod keywordlist;
pub mod values;

pub use base::{
    ImageMetadataBase, SpatialReference, has_same_rpc_model, has_same_sar_model,
    has_same_sensor_model,
};
pub use calibration::{CalibrationLookup, LookupType, SarCalib};
pub use geometry::{BurstRecord, Gcp, GcpParam, GeomValue, Orbit, RpcParam, SarParam, SensorGeometry};
pub use image::ImageMetadata;
pub use keys::{GeomKey, Lut1dKey, Lut2dKey, MetadataKey, NumKey, StrKey, TimeKey};
pub use keywordlist::{Keywordlist, KeywordlistVector};
pub use values::{Lut1d, Lut2d, LutAxis, TimePoint};
