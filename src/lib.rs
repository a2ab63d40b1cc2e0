#![doc = r#"
sensormeta: a band-aware metadata model for remote-sensing images.

This crate reads the metadata of optical and SAR products (DIMAP documents, GDAL
datasets, geom keyword-lists), normalises it into a typed [`ImageMetadata`] with one
dictionary for the whole image and one per band, and writes it back as geom files,
JSON sidecars or text dumps. It powers the `sensormeta` CLI and can be embedded in
your own Rust applications.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start: read a product and export its metadata
---------------------------------------------------
```rust,no_run
use std::path::Path;
use sensormeta::{ExportFormat, ExportParams, read_image_metadata, export_image_metadata};

fn main() -> sensormeta::Result<()> {
    let params = ExportParams {
        format: ExportFormat::Json,
        compact: true,
        ..Default::default()
    };
    let imd = read_image_metadata(Path::new("/data/DIM_PHR1A_P_201201011200.XML"), &params)?;
    export_image_metadata(&imd, Path::new("/out/product.json"), &params)
}
```

Building metadata by hand
-------------------------
```rust
use sensormeta::{ImageMetadata, NumKey, StrKey};

let mut imd = ImageMetadata::with_band_count(3);
imd.add(StrKey::SensorId, "PHR 1A".to_string());
imd.add_band_values(NumKey::PhysicalGain, &[10.0, 10.0, 10.0]).unwrap();
imd.compact();
assert_eq!(*imd.get(NumKey::PhysicalGain).unwrap(), 10.0);
```

Parsing with your own supplier
------------------------------
```rust
use sensormeta::io::KeywordlistSupplier;
use sensormeta::types::SupplierFormat;
use sensormeta::{ImageMetadata, create_imi};

let kwl = [("MISSION_ID", "S1A"), ("PRODUCT_TYPE", "GRD"), ("MODE", "IW"),
           ("ACQUISITION_START_TIME", "2020-01-01T00:00:00.000000")]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
let mds = KeywordlistSupplier::new(kwl, SupplierFormat::Gdal);
let mut imd = ImageMetadata::new();
let parser = create_imi(&mut imd, &mds).unwrap();
assert_eq!(parser.name(), "Sentinel1");
```

Error handling
--------------
All public functions return `sensormeta::Result<T>`. Sensor parsers report a product
they do not recognise with [`Error::MissingMetadata`]; the registry then tries the
next parser.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`metadata`]: keys, value types and the metadata dictionaries.
- [`sensors`]: sensor parsers and the parser registry.
- [`io`]: metadata suppliers (GDAL, XML, keyword-list) and writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod metadata;
pub mod sensors;
pub mod types;

// Curated public API surface
// Types
pub use core::params::ExportParams;
pub use error::{Error, Result};
pub use types::{ExportFormat, SensorFamily, SupplierFormat};

// Metadata model
pub use metadata::{
    GeomKey, GeomValue, ImageMetadata, ImageMetadataBase, Keywordlist, Lut1d, Lut2d, MetadataKey,
    NumKey, StrKey, TimeKey, TimePoint,
};

// Parsers
pub use sensors::{
    DefaultImageMetadataInterface, ImageMetadataInterface, ParserRegistry, create_imi,
    register_built_in_factories,
};

// High-level API re-exports
pub use api::{
    BatchReport, export_image_metadata, process_directory_to_path, process_to_path,
    read_image_metadata,
};
