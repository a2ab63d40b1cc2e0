//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, XML, JSON and GDAL errors, and provides the semantic
//! variants the metadata model and the sensor parsers rely on.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Indexed access on a key the dictionary does not hold.
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// A supplier path a parser requires is absent. The dispatch registry reads this
    /// as "this parser does not apply" and moves on to the next candidate.
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    #[error("Cannot convert `{value}` to {target}")]
    LexicalCast { value: String, target: &'static str },

    #[error("Invalid band range [{start}, {end}] for {len} bands")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    pub fn key_not_found<K: std::fmt::Display>(key: K) -> Self {
        Error::KeyNotFound {
            key: key.to_string(),
        }
    }

    pub fn missing<P: Into<String>>(path: P) -> Self {
        Error::MissingMetadata(path.into())
    }

    pub fn is_missing_metadata(&self) -> bool {
        matches!(self, Error::MissingMetadata(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_is_discriminated() {
        assert!(Error::missing("Dimap_Document.Strip_Source.MISSION").is_missing_metadata());
        assert!(!Error::key_not_found("SunElevation").is_missing_metadata());
        assert!(
            !Error::LexicalCast {
                value: "abc".into(),
                target: "f64"
            }
            .is_missing_metadata()
        );
    }

    #[test]
    fn messages_name_the_key() {
        let msg = Error::key_not_found("PhysicalGain").to_string();
        assert_eq!(msg, "Key not found: PhysicalGain");
    }
}
