//! Metadata suppliers: path-addressed views over whatever a product ships with
//! (GDAL metadata domains, XML documents, geom keyword-lists).
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{Error, Result};
use crate::metadata::Keywordlist;
use crate::types::SupplierFormat;

/// Read-only lookup of metadata values by path.
///
/// `band` is the 1-based band number for band-scoped values, `None` for the
/// dataset level.
pub trait MetadataSupplier {
    fn metadata_value(&self, path: &str, band: Option<usize>) -> Option<String>;

    /// First auxiliary file of the product whose name matches the regex `pattern`
    fn resource_file(&self, _pattern: &str) -> Option<PathBuf> {
        None
    }

    fn nb_bands(&self) -> usize;

    fn format(&self) -> SupplierFormat;
}

/// Typed access on top of [`MetadataSupplier`]
pub trait MetadataSupplierExt: MetadataSupplier {
    /// Fails with `MissingMetadata` if the path is absent, `LexicalCast` if it does not parse
    fn get_as<T: FromStr>(&self, path: &str) -> Result<T> {
        self.get_band_as(path, None)
    }

    fn get_band_as<T: FromStr>(&self, path: &str, band: Option<usize>) -> Result<T> {
        let value = self
            .metadata_value(path, band)
            .ok_or_else(|| Error::missing(path))?;
        value.trim().parse::<T>().map_err(|_| Error::LexicalCast {
            value,
            target: std::any::type_name::<T>(),
        })
    }

    /// `default` when the path is absent or does not parse
    fn get_as_or<T: FromStr>(&self, default: T, path: &str) -> T {
        self.get_as(path).unwrap_or(default)
    }

    /// Whitespace-separated list; double quotes are ignored
    fn get_as_vector<T: FromStr>(&self, path: &str) -> Result<Vec<T>> {
        let value = self
            .metadata_value(path, None)
            .ok_or_else(|| Error::missing(path))?;
        split_vector(&value)
    }

    fn has_value(&self, path: &str) -> bool {
        self.metadata_value(path, None).is_some()
    }
}

impl<S: MetadataSupplier + ?Sized> MetadataSupplierExt for S {}

pub(crate) fn split_vector<T: FromStr>(value: &str) -> Result<Vec<T>> {
    value
        .replace('"', " ")
        .split_whitespace()
        .map(|item| {
            item.parse::<T>().map_err(|_| Error::LexicalCast {
                value: item.to_string(),
                target: std::any::type_name::<T>(),
            })
        })
        .collect()
}

/// Flat in-memory supplier. Band values live under `Band_<n>.` prefixes.
#[derive(Debug, Clone, Default)]
pub struct KeywordlistSupplier {
    kwl: Keywordlist,
    format: SupplierFormat,
    nb_bands: usize,
}

impl KeywordlistSupplier {
    pub fn new(kwl: Keywordlist, format: SupplierFormat) -> Self {
        let nb_bands = kwl
            .keys()
            .filter_map(|k| k.strip_prefix("Band_"))
            .filter_map(|rest| rest.split_once('.'))
            .filter_map(|(n, _)| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        Self {
            kwl,
            format,
            nb_bands,
        }
    }

    pub fn with_nb_bands(mut self, nb_bands: usize) -> Self {
        self.nb_bands = nb_bands;
        self
    }

    /// Parse a geom file: one `key:value` per line, split at the first colon
    pub fn from_geom_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        info!("Reading geom file {:?}", path.as_ref());
        Ok(Self::new(parse_geom_text(&text), SupplierFormat::Geom))
    }

    pub fn keywordlist(&self) -> &Keywordlist {
        &self.kwl
    }
}

pub(crate) fn parse_geom_text(text: &str) -> Keywordlist {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

impl MetadataSupplier for KeywordlistSupplier {
    fn metadata_value(&self, path: &str, band: Option<usize>) -> Option<String> {
        match band {
            Some(b) => self.kwl.get(&format!("Band_{b}.{path}")).cloned(),
            None => self.kwl.get(path).cloned(),
        }
    }

    fn nb_bands(&self) -> usize {
        self.nb_bands
    }

    fn format(&self) -> SupplierFormat {
        self.format
    }
}
