//! Export settings shared by the library API and the CLI.
pub mod params;
