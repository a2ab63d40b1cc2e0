//! Value types stored in the metadata dictionaries besides plain numbers and
//! strings: timestamps and lookup tables.
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type TimePoint = DateTime<Utc>;

const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// RFC 3339 with a `Z` suffix; the fraction keeps as many digits as the value needs
pub fn format_time(t: &TimePoint) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse the timestamp forms found in geom files and sensor metadata.
/// Naive forms are read as UTC.
pub fn parse_time(text: &str) -> Result<TimePoint> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Ok(t.with_timezone(&Utc));
    }
    let naive = text.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t.and_utc());
        }
    }
    Err(Error::LexicalCast {
        value: text.to_string(),
        target: "TimePoint",
    })
}

pub fn julian_day(t: &TimePoint) -> f64 {
    let secs = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9;
    secs / SECONDS_PER_DAY + UNIX_EPOCH_JULIAN_DAY
}

/// Regular sampling of one lookup-table dimension. When `values` is not empty it
/// lists the explicit abscissae and `origin`/`spacing` are informative only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LutAxis {
    pub size: usize,
    pub origin: f64,
    pub spacing: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
}

impl LutAxis {
    pub fn regular(size: usize, origin: f64, spacing: f64) -> Self {
        Self {
            size,
            origin,
            spacing,
            values: Vec::new(),
        }
    }

    pub fn coordinate(&self, index: usize) -> f64 {
        self.values
            .get(index)
            .copied()
            .unwrap_or(self.origin + self.spacing * index as f64)
    }
}

/// N-dimensional lookup table, values stored row-major (last axis fastest)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lut<const N: usize> {
    pub axes: Vec<LutAxis>,
    pub array: Vec<f64>,
}

pub type Lut1d = Lut<1>;
pub type Lut2d = Lut<2>;

impl<const N: usize> Lut<N> {
    pub fn new(axes: Vec<LutAxis>, array: Vec<f64>) -> Result<Self> {
        let lut = Self { axes, array };
        lut.validate()?;
        Ok(lut)
    }

    fn validate(&self) -> Result<()> {
        if self.axes.len() != N {
            return Err(Error::Parse(format!(
                "LUT expects {} axes, got {}",
                N,
                self.axes.len()
            )));
        }
        let expected: usize = self.axes.iter().map(|a| a.size).product();
        if expected != self.array.len() {
            return Err(Error::Parse(format!(
                "LUT axes describe {} values, array holds {}",
                expected,
                self.array.len()
            )));
        }
        Ok(())
    }

    /// Text form used in keyword-lists
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let lut: Self = serde_json::from_str(text)?;
        lut.validate()?;
        Ok(lut)
    }
}

impl Lut1d {
    pub fn value(&self, i: usize) -> Option<f64> {
        self.array.get(i).copied()
    }
}

impl Lut2d {
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        let cols = self.axes.get(1)?.size;
        if j >= cols {
            return None;
        }
        self.array.get(i * cols + j).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_rfc3339_and_naive_forms() {
        let a = parse_time("2012-12-01T10:30:15Z").unwrap();
        let b = parse_time("2012-12-01T10:30:15.000000").unwrap();
        let c = parse_time("2012-12-01 10:30:15").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(format_time(&a), "2012-12-01T10:30:15Z");
    }

    #[test]
    fn nanoseconds_survive_formatting() {
        let t = parse_time("2019-03-01T05:43:12.123456789Z").unwrap();
        assert_eq!(format_time(&t), "2019-03-01T05:43:12.123456789Z");
        assert_eq!(parse_time(&format_time(&t)).unwrap(), t);
    }

    #[test]
    fn rejects_garbage_time() {
        let err = parse_time("yesterday").unwrap_err();
        assert!(matches!(err, Error::LexicalCast { target: "TimePoint", .. }));
    }

    #[test]
    fn julian_day_of_j2000() {
        let t = parse_time("2000-01-01T12:00:00Z").unwrap();
        assert_relative_eq!(julian_day(&t), 2_451_545.0);
    }

    #[test]
    fn lut_text_form_checks_dimensions() {
        let lut = Lut1d::new(vec![LutAxis::regular(3, 0.4, 0.1)], vec![0.1, 0.9, 0.2]).unwrap();
        let back = Lut1d::from_text(&lut.to_text()).unwrap();
        assert_eq!(lut, back);
        assert!(Lut2d::from_text(&lut.to_text()).is_err());
        assert_relative_eq!(lut.axes[0].coordinate(2), 0.6);
    }

    #[test]
    fn lut2d_indexing_is_row_major() {
        let lut = Lut2d::new(
            vec![LutAxis::regular(2, 0.0, 1.0), LutAxis::regular(3, 0.0, 1.0)],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        assert_eq!(lut.value(1, 2), Some(6.0));
        assert_eq!(lut.value(0, 3), None);
    }
}
