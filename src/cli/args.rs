use clap::Parser;
use std::path::PathBuf;

use sensormeta::types::ExportFormat;

#[derive(Parser)]
#[command(name = "sensormeta", version, about = "Read and export remote-sensing image metadata")]
pub struct CliArgs {
    /// Input product: geom file, DIMAP/product XML or any GDAL raster (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory of products (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single file mode); prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Export format (geom, json or text)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Hoist values shared by all bands to the whole-image metadata
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Single-line text dump
    #[arg(long, default_value_t = false)]
    pub single_line: bool,

    /// Fail unless the product has this many bands
    #[arg(long)]
    pub bands: Option<usize>,

    /// JSON preset with export parameters; command line flags override it
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// List the registered sensor parsers and exit
    #[arg(long, default_value_t = false)]
    pub list_parsers: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with the other products when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
