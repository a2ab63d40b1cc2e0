//! Enumerated metadata keys. Each key kind is a closed set with a canonical,
//! externally visible name used by the keyword-list codec and the geom files.
use std::collections::BTreeMap;
use std::fmt;

use crate::metadata::ImageMetadataBase;

macro_rules! metadata_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Canonical name
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

metadata_keys! {
    /// Geometry keys. Values are `GeomValue` payloads.
    GeomKey {
        Rpc => "RPC",
        ProjectionWkt => "ProjectionWKT",
        ProjectionEpsg => "ProjectionEPSG",
        ProjectionProj => "ProjectionProj",
        Gcp => "GCP",
        Sar => "SAR",
        SarCalib => "SARCalib",
        SensorGeometry => "SensorGeometry",
    }
}

metadata_keys! {
    /// Numeric keys (`f64` values)
    NumKey {
        TileHintX => "TileHintX",
        TileHintY => "TileHintY",
        DataType => "DataType",
        NoData => "NoData",
        OrbitNumber => "OrbitNumber",
        NumberOfLines => "NumberOfLines",
        NumberOfColumns => "NumberOfColumns",
        AverageSceneHeight => "AverageSceneHeight",
        PhysicalGain => "PhysicalGain",
        PhysicalBias => "PhysicalBias",
        SolarIrradiance => "SolarIrradiance",
        SunElevation => "SunElevation",
        SunAzimuth => "SunAzimuth",
        SatElevation => "SatElevation",
        SatAzimuth => "SatAzimuth",
        FirstWavelength => "FirstWavelength",
        LastWavelength => "LastWavelength",
        SpectralStep => "SpectralStep",
        SpectralMin => "SpectralMin",
        SpectralMax => "SpectralMax",
        CalScale => "CalScale",
        CalFactor => "CalFactor",
        Prf => "PRF",
        Rsf => "RSF",
        RadarFrequency => "RadarFrequency",
        CenterIncidenceAngle => "CenterIncidenceAngle",
        RescalingFactor => "RescalingFactor",
        LineSpacing => "LineSpacing",
        PixelSpacing => "PixelSpacing",
        RangeTimeFirstPixel => "RangeTimeFirstPixel",
        RangeTimeLastPixel => "RangeTimeLastPixel",
        RedDisplayChannel => "RedDisplayChannel",
        GreenDisplayChannel => "GreenDisplayChannel",
        BlueDisplayChannel => "BlueDisplayChannel",
    }
}

metadata_keys! {
    /// String keys
    StrKey {
        SensorId => "SensorID",
        Mission => "Mission",
        Instrument => "Instrument",
        InstrumentIndex => "InstrumentIndex",
        BandName => "BandName",
        EnhancedBandName => "EnhancedBandName",
        ProductType => "ProductType",
        GeometricLevel => "GeometricLevel",
        RadiometricLevel => "RadiometricLevel",
        Polarization => "Polarization",
        Mode => "Mode",
        Swath => "Swath",
        OrbitDirection => "OrbitDirection",
        BeamMode => "BeamMode",
        BeamSwath => "BeamSwath",
        AreaOrPoint => "AreaOrPoint",
        LayerType => "LayerType",
        MetadataType => "MetadataType",
    }
}

metadata_keys! {
    /// One-dimensional lookup table keys
    Lut1dKey {
        SpectralSensitivity => "SpectralSensitivity",
    }
}

metadata_keys! {
    /// Two-dimensional lookup table keys
    Lut2dKey {
        IncidenceAngleGrid => "IncidenceAngleGrid",
    }
}

metadata_keys! {
    /// Timestamp keys
    TimeKey {
        ProductionDate => "ProductionDate",
        AcquisitionDate => "AcquisitionDate",
        AcquisitionStartTime => "AcquisitionStartTime",
        AcquisitionStopTime => "AcquisitionStopTime",
    }
}

/// Ties a key kind to its value type and to the map holding it inside an
/// [`ImageMetadataBase`], so `add`/`get`/`has`/`remove` work for every kind.
pub trait MetadataKey: Copy + Ord + fmt::Display + fmt::Debug + 'static {
    type Value: Clone + fmt::Debug;

    fn map(imd: &ImageMetadataBase) -> &BTreeMap<Self, Self::Value>;

    fn map_mut(imd: &mut ImageMetadataBase) -> &mut BTreeMap<Self, Self::Value>;
}

/// Space-separated canonical names of a key kind
pub fn join_names<K: fmt::Display>(keys: &[K]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
