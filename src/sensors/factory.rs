//! Parser registry: first registered parser that recognises the product wins.
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::io::MetadataSupplier;
use crate::metadata::ImageMetadata;
use crate::sensors::{
    CosmoImageMetadataInterface, DefaultImageMetadataInterface, Formosat2ImageMetadataInterface,
    ImageMetadataInterface, PleiadesImageMetadataInterface, Radarsat2ImageMetadataInterface,
    Sentinel1ImageMetadataInterface, Spot5ImageMetadataInterface, Spot6ImageMetadataInterface,
    TerraSarXImageMetadataInterface,
};
use crate::types::SensorFamily;

pub type ParserFactory = fn() -> Box<dyn ImageMetadataInterface>;

/// Ordered parser factories, optical ones tried before SAR ones
#[derive(Default)]
pub struct ParserRegistry {
    optical: Vec<ParserFactory>,
    sar: Vec<ParserFactory>,
    built_ins_registered: bool,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, family: SensorFamily, factory: ParserFactory) {
        match family {
            SensorFamily::Optical => self.optical.push(factory),
            SensorFamily::Sar => self.sar.push(factory),
        }
    }

    /// Register the shipped parsers once; later calls do nothing
    pub fn register_built_ins(&mut self) {
        if self.built_ins_registered {
            return;
        }
        self.register(SensorFamily::Optical, || Box::new(Spot5ImageMetadataInterface));
        self.register(SensorFamily::Optical, || Box::new(PleiadesImageMetadataInterface));
        self.register(SensorFamily::Optical, || Box::new(Spot6ImageMetadataInterface));
        self.register(SensorFamily::Optical, || Box::new(Formosat2ImageMetadataInterface));
        self.register(SensorFamily::Sar, || Box::new(TerraSarXImageMetadataInterface));
        self.register(SensorFamily::Sar, || Box::new(Sentinel1ImageMetadataInterface));
        self.register(SensorFamily::Sar, || Box::new(CosmoImageMetadataInterface));
        self.register(SensorFamily::Sar, || Box::new(Radarsat2ImageMetadataInterface));
        self.built_ins_registered = true;
        debug!("Registered {} built-in sensor parsers", self.len());
    }

    pub fn len(&self) -> usize {
        self.optical.len() + self.sar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the registered parsers in trial order
    pub fn names(&self) -> Vec<&'static str> {
        self.factories().map(|f| f().name()).collect()
    }

    fn factories(&self) -> impl Iterator<Item = &ParserFactory> {
        self.optical.iter().chain(self.sar.iter())
    }

    /// Try each parser in order on a scratch copy of `imd`. The first parser that
    /// does not report missing metadata commits its result and is returned; any
    /// other error aborts the scan. With no match, `imd` is left as it was and the
    /// default parser is returned.
    pub fn create_imi(
        &self,
        imd: &mut ImageMetadata,
        mds: &dyn MetadataSupplier,
    ) -> Result<Box<dyn ImageMetadataInterface>> {
        for factory in self.factories() {
            let parser = factory();
            let mut scratch = imd.clone();
            match parser.parse(mds, &mut scratch) {
                Ok(()) => {
                    info!("Metadata parsed by the {} parser", parser.name());
                    *imd = scratch;
                    return Ok(parser);
                }
                Err(e) if e.is_missing_metadata() => {
                    debug!("{} parser not applicable: {}", parser.name(), e);
                }
                Err(e) => return Err(e),
            }
        }
        warn!("No sensor parser recognised the product, using the default parser");
        let parser: Box<dyn ImageMetadataInterface> = Box::new(DefaultImageMetadataInterface);
        parser.parse(mds, imd)?;
        Ok(parser)
    }
}

static REGISTRY: Lazy<Mutex<ParserRegistry>> = Lazy::new(|| Mutex::new(ParserRegistry::new()));

/// Register the built-in parsers in the process-wide registry. Safe to call from
/// several threads; registration happens once.
pub fn register_built_in_factories() {
    let mut registry = REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.register_built_ins();
}

/// Register an extra parser in the process-wide registry, after the built-in ones
/// of the same family
pub fn register_factory(family: SensorFamily, factory: ParserFactory) {
    register_built_in_factories();
    let mut registry = REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.register(family, factory);
}

pub fn registered_parser_names() -> Vec<&'static str> {
    let registry = REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.names()
}

/// Pick a parser for `mds` using the process-wide registry and fill `imd` with it
pub fn create_imi(
    imd: &mut ImageMetadata,
    mds: &dyn MetadataSupplier,
) -> Result<Box<dyn ImageMetadataInterface>> {
    register_built_in_factories();
    let registry = REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.create_imi(imd, mds)
}
