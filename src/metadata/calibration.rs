//! SAR calibration lookup data.
//!
//! A calibration set holds one lookup per calibration type. Lookups are either the
//! neutral default (every position maps to 1.0) or a sensor gain table.
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::metadata::Keywordlist;
use crate::metadata::values::TimePoint;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum LookupType {
    Sigma,
    Beta,
    Gamma,
    Dn,
    Noise,
}

impl LookupType {
    pub const ALL: [LookupType; 5] = [
        LookupType::Sigma,
        LookupType::Beta,
        LookupType::Gamma,
        LookupType::Dn,
        LookupType::Noise,
    ];

    pub fn code(&self) -> i16 {
        match self {
            LookupType::Sigma => 0,
            LookupType::Beta => 1,
            LookupType::Gamma => 2,
            LookupType::Dn => 3,
            LookupType::Noise => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Match the `incidenceAngleCorrection` labels of Radarsat-2 products
    pub fn from_incidence_correction(label: &str) -> Option<Self> {
        match label.trim() {
            "Sigma Nought" => Some(LookupType::Sigma),
            "Beta Nought" => Some(LookupType::Beta),
            "Gamma" => Some(LookupType::Gamma),
            _ => None,
        }
    }
}

impl std::fmt::Display for LookupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupType::Sigma => write!(f, "Sigma"),
            LookupType::Beta => write!(f, "Beta"),
            LookupType::Gamma => write!(f, "Gamma"),
            LookupType::Dn => write!(f, "DN"),
            LookupType::Noise => write!(f, "Noise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationLookup {
    Default {
        lookup_type: LookupType,
    },
    Radarsat2 {
        lookup_type: LookupType,
        offset: i64,
        gains: Vec<f32>,
    },
}

impl CalibrationLookup {
    pub fn lookup_type(&self) -> LookupType {
        match self {
            CalibrationLookup::Default { lookup_type } => *lookup_type,
            CalibrationLookup::Radarsat2 { lookup_type, .. } => *lookup_type,
        }
    }

    /// Calibration value at image position `(x, y)`. Gain tables depend on the column only;
    /// positions outside the table fall back to 1.0.
    pub fn value(&self, x: i64, _y: i64) -> f64 {
        match self {
            CalibrationLookup::Default { .. } => 1.0,
            CalibrationLookup::Radarsat2 { offset, gains, .. } => {
                let pos = x + offset;
                usize::try_from(pos)
                    .ok()
                    .and_then(|p| gains.get(p))
                    .map(|g| f64::from(*g))
                    .unwrap_or(1.0)
            }
        }
    }

    pub fn to_keywordlist(&self, kwl: &mut Keywordlist, prefix: &str) {
        match self {
            CalibrationLookup::Default { lookup_type } => {
                kwl.insert(format!("{prefix}Sensor"), "Default".to_string());
                kwl.insert(format!("{prefix}Type"), lookup_type.code().to_string());
            }
            CalibrationLookup::Radarsat2 {
                lookup_type,
                offset,
                gains,
            } => {
                kwl.insert(format!("{prefix}Sensor"), "Radarsat2".to_string());
                kwl.insert(format!("{prefix}Type"), lookup_type.code().to_string());
                kwl.insert(format!("{prefix}Offset"), offset.to_string());
                let gains = gains
                    .iter()
                    .map(|g| g.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                kwl.insert(format!("{prefix}Gains"), gains);
            }
        }
    }

    pub fn from_keywordlist(kwl: &Keywordlist, prefix: &str) -> Result<Self> {
        let get = |name: &str| {
            let key = format!("{prefix}{name}");
            kwl.get(&key).ok_or_else(|| Error::key_not_found(key))
        };
        let type_text = get("Type")?;
        let code: i16 = type_text.trim().parse().map_err(|_| Error::LexicalCast {
            value: type_text.clone(),
            target: "i16",
        })?;
        let lookup_type = LookupType::from_code(code)
            .ok_or_else(|| Error::Parse(format!("Unknown calibration lookup type {code}")))?;

        let sensor = kwl
            .get(&format!("{prefix}Sensor"))
            .map(String::as_str)
            .unwrap_or("Default");
        match sensor {
            "Radarsat2" => {
                let offset_text = get("Offset")?;
                let offset = offset_text.trim().parse().map_err(|_| Error::LexicalCast {
                    value: offset_text.clone(),
                    target: "i64",
                })?;
                let gains = get("Gains")?
                    .split_whitespace()
                    .map(|g| {
                        g.parse::<f32>().map_err(|_| Error::LexicalCast {
                            value: g.to_string(),
                            target: "f32",
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CalibrationLookup::Radarsat2 {
                    lookup_type,
                    offset,
                    gains,
                })
            }
            _ => Ok(CalibrationLookup::Default { lookup_type }),
        }
    }
}

/// Radiometric calibration set of a SAR product
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SarCalib {
    pub calibration_start_time: Option<TimePoint>,
    pub calibration_stop_time: Option<TimePoint>,
    pub rescaling_factor: f64,
    pub apply_noise_correction: bool,
    pub lookups: BTreeMap<LookupType, CalibrationLookup>,
}

impl SarCalib {
    pub fn lookup(&self, lookup_type: LookupType) -> Option<&CalibrationLookup> {
        self.lookups.get(&lookup_type)
    }

    pub fn to_keywordlist(&self, kwl: &mut Keywordlist, prefix: &str) {
        for (t, lookup) in &self.lookups {
            lookup.to_keywordlist(kwl, &format!("{prefix}{t}."));
        }
    }

    pub fn from_keywordlist(kwl: &Keywordlist, prefix: &str) -> Result<Self> {
        let mut calib = SarCalib::default();
        for t in LookupType::ALL {
            let lookup_prefix = format!("{prefix}{t}.");
            if kwl.contains_key(&format!("{lookup_prefix}Type")) {
                calib
                    .lookups
                    .insert(t, CalibrationLookup::from_keywordlist(kwl, &lookup_prefix)?);
            }
        }
        Ok(calib)
    }
}
