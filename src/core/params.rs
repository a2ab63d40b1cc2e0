use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ExportFormat;

/// Export parameters suitable for config files and CLI presets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub format: ExportFormat,
    /// Hoist values shared by every band to the whole-image dictionary
    pub compact: bool,
    /// One key per line in text dumps
    pub multiline: bool,
    /// Fail when the parsed product does not carry this many bands
    pub expected_bands: Option<usize>,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: ExportFormat::Geom,
            compact: false,
            multiline: true,
            expected_bands: None,
        }
    }
}

impl ExportParams {
    /// Load a JSON preset; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preset_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        std::fs::write(&path, r#"{"format":"Json","compact":true}"#).unwrap();
        let params = ExportParams::from_json_file(&path).unwrap();
        assert_eq!(params.format, ExportFormat::Json);
        assert!(params.compact);
        assert!(params.multiline);
        assert_eq!(params.expected_bands, None);
    }
}
